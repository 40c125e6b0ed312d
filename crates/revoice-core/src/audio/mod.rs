mod player;
mod wav;

pub use player::SegmentPlayer;
pub use wav::WavInfo;
