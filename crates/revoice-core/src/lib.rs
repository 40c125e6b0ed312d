pub mod archive;
pub mod audio;
pub mod config;
pub mod error;
pub mod memory;
pub mod monitor;
pub mod probe;
pub mod sequencer;
pub mod timing;

pub use archive::{AfsEntry, AfsIndex};
pub use audio::{SegmentPlayer, WavInfo};
pub use config::Config;
pub use error::{Error, Result};
pub use memory::{MemoryReader, ProcessHandle, ReadMemory};
pub use monitor::Monitor;
pub use probe::{AddressMap, GameStateProbe, ProbeSnapshot};
pub use sequencer::{Action, Sequencer, SequencerState};
pub use timing::{Locale, Segment, TimingTable};
