//! Cutscene playback sequencer.
//!
//! A pure state machine: each tick consumes one probe snapshot and emits the
//! action the monitor loop should perform. No I/O happens here, which keeps
//! the activation and sequencing rules testable against mock snapshots.
//!
//! ## States
//!
//! - `Idle` — target room not active; coarse polling.
//! - `Armed` — in the target room, waiting for the activation conditions
//!   (cutscene id, both fade flags, minimum elapsed time) to hold at once.
//! - `Initializing` — activated; the baseline counter has been captured but
//!   nothing has played yet.
//! - `Playing` — counter changes drive sequential segment playback.
//! - `Draining` — the final segment has been issued; counter changes are
//!   ignored until the cutscene context is lost.

use std::time::Duration;

use strum::Display;
use tracing::{debug, info};

use crate::config::timing;
use crate::probe::{expected, ProbeSnapshot};
use crate::timing::{Segment, TimingTable};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
pub enum SequencerState {
    Idle,
    Armed,
    Initializing,
    Playing,
    Draining,
}

/// What the monitor loop should do after a tick.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Action {
    None,
    /// Release any playing segment and its buffer.
    Stop,
    /// Play this window of the voice recording, pre-empting the current one.
    Play(Segment),
}

pub struct Sequencer {
    state: SequencerState,
    sequence_index: usize,
    last_counter: u16,
    table: Option<&'static TimingTable>,
}

impl Sequencer {
    pub fn new() -> Self {
        Self {
            state: SequencerState::Idle,
            sequence_index: 0,
            last_counter: 0,
            table: None,
        }
    }

    pub fn state(&self) -> SequencerState {
        self.state
    }

    pub fn sequence_index(&self) -> usize {
        self.sequence_index
    }

    /// How long the monitor loop should sleep before the next tick.
    pub fn tick_interval(&self) -> Duration {
        match self.state {
            SequencerState::Idle => timing::IDLE_POLL,
            _ => timing::FINE_TICK,
        }
    }

    /// Consume one probe snapshot and decide the next action.
    pub fn observe(&mut self, snap: &ProbeSnapshot) -> Action {
        if snap.room != expected::TARGET_ROOM {
            return self.reset(SequencerState::Idle);
        }

        // The target room alone arms the sequencer; activation conditions are
        // evaluated on the same tick.
        if self.state == SequencerState::Idle {
            debug!("Target room {} observed, arming", snap.room);
            self.state = SequencerState::Armed;
        }

        match self.state {
            SequencerState::Armed => self.observe_armed(snap),
            SequencerState::Initializing | SequencerState::Playing => self.observe_tracking(snap),
            SequencerState::Draining => self.observe_draining(snap),
            SequencerState::Idle => unreachable!("armed above"),
        }
    }

    fn observe_armed(&mut self, snap: &ProbeSnapshot) -> Action {
        if !activation_holds(snap) {
            // Any single mismatched condition keeps the sequencer waiting.
            self.clear_sequence();
            return Action::Stop;
        }

        let table = TimingTable::for_locale(snap.locale);
        info!(
            "Cutscene {} activated (locale {}, {} segments, counter baseline {})",
            snap.cutscene,
            snap.locale,
            table.len(),
            snap.counter
        );

        self.table = Some(table);
        self.sequence_index = 0;
        // The activation read is the baseline; it never triggers playback.
        self.last_counter = snap.counter;
        self.state = SequencerState::Initializing;
        Action::None
    }

    fn observe_tracking(&mut self, snap: &ProbeSnapshot) -> Action {
        if !stability_holds(snap) {
            debug!("Cutscene context lost, re-arming");
            return self.reset(SequencerState::Armed);
        }

        let Some(table) = self.table else {
            return self.reset(SequencerState::Armed);
        };

        // Stabilization: until the first segment has played, the cutscene
        // timer must re-confirm the minimum as well, rejecting transient
        // readings from a restarted cutscene.
        if self.state == SequencerState::Initializing && snap.elapsed < timing::MIN_CUTSCENE_SECS {
            return Action::None;
        }

        // Failed probe reads surface as zero; treat them as "unchanged".
        if snap.counter == 0 {
            return Action::None;
        }

        // Counter back at the locale's resting value: the dialogue track
        // restarted, so the sequence does too.
        if snap.counter == table.resting_counter() {
            debug!("Counter returned to resting value, sequence reset");
            self.sequence_index = 0;
            self.last_counter = snap.counter;
            self.state = SequencerState::Initializing;
            return Action::Stop;
        }

        if snap.counter == self.last_counter {
            return Action::None;
        }
        self.last_counter = snap.counter;

        let segment = table.get(self.sequence_index);
        debug!(
            "Counter changed to {}, playing segment {} ({:.1}s-{:.1}s)",
            snap.counter, self.sequence_index, segment.start, segment.end
        );

        self.sequence_index += 1;
        self.state = if self.sequence_index > table.max_index() {
            SequencerState::Draining
        } else {
            SequencerState::Playing
        };

        Action::Play(segment)
    }

    fn observe_draining(&mut self, snap: &ProbeSnapshot) -> Action {
        if !stability_holds(snap) {
            info!("Sequence complete, cutscene context lost, re-arming");
            return self.reset(SequencerState::Armed);
        }
        // Counter changes past the final segment are ignored.
        Action::None
    }

    /// Drop all sequence state and request a playback stop.
    fn reset(&mut self, to: SequencerState) -> Action {
        self.clear_sequence();
        self.state = to;
        Action::Stop
    }

    fn clear_sequence(&mut self) {
        self.sequence_index = 0;
        self.last_counter = 0;
        self.table = None;
    }
}

impl Default for Sequencer {
    fn default() -> Self {
        Self::new()
    }
}

/// Activation requires the exact room + cutscene + fade + elapsed-time
/// combination; no partial matches.
fn activation_holds(snap: &ProbeSnapshot) -> bool {
    snap.cutscene == expected::TARGET_CUTSCENE
        && snap.fade_primary == expected::FADE_PRIMARY
        && snap.fade_secondary == expected::FADE_SECONDARY
        && snap.elapsed >= timing::MIN_CUTSCENE_SECS
}

/// Once active, the sequence survives as long as the cutscene and fade
/// state keep matching.
fn stability_holds(snap: &ProbeSnapshot) -> bool {
    snap.cutscene == expected::TARGET_CUTSCENE
        && snap.fade_primary == expected::FADE_PRIMARY
        && snap.fade_secondary == expected::FADE_SECONDARY
}
