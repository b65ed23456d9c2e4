//! Detection records and the per-subject timeline they are merged into.
mod record;
mod timeline;
mod video;

pub use record::*;
pub use timeline::*;
pub use video::*;
