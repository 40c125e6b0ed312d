//! Monitor loop.
//!
//! A single thread owns everything mutable here: the sequencer, the player
//! and its device handle, and the loaded archive index. Each tick probes the
//! game, feeds the snapshot to the sequencer, performs the resulting action,
//! and sleeps for the interval the sequencer asks for. The loop only ends
//! when the game process goes away.

use std::thread;
use std::time::Duration;

use tracing::{debug, info, warn};

use crate::archive::{self, AfsIndex};
use crate::audio::SegmentPlayer;
use crate::config::{retry, timing, Config};
use crate::error::Result;
use crate::memory::{MemoryReader, ProcessHandle, ReadMemory};
use crate::probe::{AddressMap, GameStateProbe};
use crate::sequencer::{Action, Sequencer};
use crate::timing::Segment;

pub struct Monitor {
    config: Config,
    index: AfsIndex,
    addresses: AddressMap,
    player: SegmentPlayer,
    sequencer: Sequencer,
}

impl Monitor {
    pub fn new(config: Config, index: AfsIndex) -> Self {
        Self::with_addresses(config, index, AddressMap::default())
    }

    pub fn with_addresses(config: Config, index: AfsIndex, addresses: AddressMap) -> Self {
        let player = SegmentPlayer::new(config.volume_level, config.enable_master_volume);
        Self {
            config,
            index,
            addresses,
            player,
            sequencer: Sequencer::new(),
        }
    }

    pub fn sequencer(&self) -> &Sequencer {
        &self.sequencer
    }

    /// Run until the game process exits.
    pub fn run(&mut self, process: &ProcessHandle) -> Result<()> {
        let reader = MemoryReader::new(process);

        info!(
            "Monitor starting ({} archive entries, voice index {})",
            self.index.len(),
            self.config.voice_index
        );
        thread::sleep(timing::STARTUP_DELAY);

        loop {
            if !process_alive(&reader) {
                break;
            }

            let interval = self.tick(&reader);
            thread::sleep(interval);
        }

        self.player.stop();
        info!("Game process exited, monitor stopped");
        Ok(())
    }

    /// One probe/decide/act cycle. Returns the sleep interval until the next
    /// tick.
    pub fn tick<R: ReadMemory>(&mut self, reader: &R) -> Duration {
        let probe = GameStateProbe::with_addresses(reader, self.addresses);
        let snap = probe.snapshot();

        match self.sequencer.observe(&snap) {
            Action::None => {}
            Action::Stop => self.player.stop(),
            Action::Play(segment) => self.play_segment(segment),
        }

        self.sequencer.tick_interval()
    }

    /// Fetch the voice entry's bytes and hand them to the player. Failures
    /// abort this segment only, never the loop.
    fn play_segment(&mut self, segment: Segment) {
        let entry = match self.index.entry(self.config.voice_index) {
            Ok(entry) => entry,
            Err(e) => {
                warn!("Cannot play segment: {}", e);
                return;
            }
        };

        let block = match archive::read_entry(&self.config.archive, entry) {
            Ok(block) => block,
            Err(e) => {
                warn!("Failed to read voice entry from archive: {}", e);
                return;
            }
        };

        self.player.play(&block, segment.start, segment.end);
    }
}

/// Check that the game process is still readable, with a short bounded
/// retry so one transient read failure is not mistaken for process exit.
fn process_alive<R: ReadMemory>(reader: &R) -> bool {
    for attempt in 0..retry::MAX_READ_RETRIES {
        match reader.read_bytes(reader.base_address(), 4) {
            Ok(_) => return true,
            Err(e) => {
                if attempt < retry::MAX_READ_RETRIES - 1 {
                    let delay = retry::RETRY_DELAYS_MS[attempt as usize];
                    debug!(
                        "Alive check failed (attempt {}/{}, retry in {}ms): {}",
                        attempt + 1,
                        retry::MAX_READ_RETRIES,
                        delay,
                        e
                    );
                    thread::sleep(Duration::from_millis(delay));
                } else {
                    info!(
                        "Process unreadable after {} retries: {}",
                        retry::MAX_READ_RETRIES, e
                    );
                }
            }
        }
    }
    false
}
