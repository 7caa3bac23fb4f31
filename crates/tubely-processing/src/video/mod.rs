//! ffprobe/ffmpeg wrappers

mod probe;
mod remux;

pub use probe::{MediaProber, VideoDimensions};
pub use remux::FastStartRemuxer;
