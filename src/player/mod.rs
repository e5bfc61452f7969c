pub mod commander;
pub mod device;

pub use commander::{PlaybackCommander, PlaybackRequest};
pub use device::{select_device, Selection};
