//! Game state probe.
//!
//! Reads the handful of sh2pc.exe state variables the sequencer keys off:
//! current room, cutscene id, transition/fade state, locale, the rolling
//! dialogue counter, and the cutscene timer. Probe reads never error; a
//! failed read yields the zero default so the loop simply sees "no change".

use crate::memory::ReadMemory;
use crate::timing::Locale;

/// Module-relative offsets of the probed state variables.
///
/// These match the known sh2pc.exe layout; they are data, not derivable.
#[derive(Debug, Clone, Copy)]
pub struct AddressMap {
    /// Current room id (byte).
    pub room: u64,
    /// Current cutscene id (byte).
    pub cutscene: u64,
    /// Primary transition/fade flag (byte).
    pub fade_primary: u64,
    /// Secondary transition/fade flag (byte).
    pub fade_secondary: u64,
    /// Language setting (byte).
    pub language: u64,
    /// Subtitle toggle (byte, zero = off).
    pub subtitles: u64,
    /// Dialogue counter used by non-Japanese locales (word).
    pub dialogue_english: u64,
    /// Dialogue counter used by the Japanese locale (word).
    pub dialogue_japanese: u64,
    /// Elapsed cutscene time in seconds (float).
    pub cutscene_timer: u64,
}

impl Default for AddressMap {
    fn default() -> Self {
        Self {
            room: 0x006C_7228,
            cutscene: 0x01B7_A944,
            fade_primary: 0x01B8_0BC0,
            fade_secondary: 0x0064_4198,
            language: 0x0053_2B5C,
            subtitles: 0x019B_C007,
            dialogue_english: 0x01B5_FEC4,
            dialogue_japanese: 0x01B6_03EC,
            cutscene_timer: 0x01FB_2E04,
        }
    }
}

/// Values the activation conditions compare against.
pub mod expected {
    /// Hotel restaurant room id.
    pub const TARGET_ROOM: u8 = 152;
    /// The letter-reading cutscene.
    pub const TARGET_CUTSCENE: u8 = 3;
    pub const FADE_PRIMARY: u8 = 96;
    pub const FADE_SECONDARY: u8 = 100;
    /// Language byte value for Japanese.
    pub const LANGUAGE_JAPANESE: u8 = 232;
}

/// One tick's worth of probed state.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ProbeSnapshot {
    pub room: u8,
    pub cutscene: u8,
    pub fade_primary: u8,
    pub fade_secondary: u8,
    /// Elapsed cutscene time in seconds.
    pub elapsed: f32,
    /// Rolling dialogue counter for the active locale.
    pub counter: u16,
    pub locale: Locale,
}

pub struct GameStateProbe<'a, R: ReadMemory> {
    reader: &'a R,
    addresses: AddressMap,
}

impl<'a, R: ReadMemory> GameStateProbe<'a, R> {
    pub fn new(reader: &'a R) -> Self {
        Self::with_addresses(reader, AddressMap::default())
    }

    pub fn with_addresses(reader: &'a R, addresses: AddressMap) -> Self {
        Self { reader, addresses }
    }

    pub fn room_id(&self) -> u8 {
        self.read_u8(self.addresses.room)
    }

    pub fn cutscene_id(&self) -> u8 {
        self.read_u8(self.addresses.cutscene)
    }

    pub fn fade_state(&self) -> (u8, u8) {
        (
            self.read_u8(self.addresses.fade_primary),
            self.read_u8(self.addresses.fade_secondary),
        )
    }

    pub fn elapsed_secs(&self) -> f32 {
        let base = self.reader.base_address();
        self.reader
            .read_f32(base + self.addresses.cutscene_timer)
            .unwrap_or(0.0)
    }

    /// Locale from the language byte and subtitle toggle. The Japanese
    /// locale uses a different counter location and resting value, and its
    /// table differs with subtitles off.
    pub fn locale(&self) -> Locale {
        if self.read_u8(self.addresses.language) != expected::LANGUAGE_JAPANESE {
            Locale::English
        } else if self.read_u8(self.addresses.subtitles) == 0 {
            Locale::JapaneseUnsubtitled
        } else {
            Locale::JapaneseSubtitled
        }
    }

    /// The rolling dialogue counter for the given locale.
    pub fn dialogue_counter(&self, locale: Locale) -> u16 {
        let address = match locale {
            Locale::English => self.addresses.dialogue_english,
            Locale::JapaneseSubtitled | Locale::JapaneseUnsubtitled => {
                self.addresses.dialogue_japanese
            }
        };
        let base = self.reader.base_address();
        self.reader.read_u16(base + address).unwrap_or(0)
    }

    /// Read every probed value once.
    pub fn snapshot(&self) -> ProbeSnapshot {
        let locale = self.locale();
        let (fade_primary, fade_secondary) = self.fade_state();
        ProbeSnapshot {
            room: self.room_id(),
            cutscene: self.cutscene_id(),
            fade_primary,
            fade_secondary,
            elapsed: self.elapsed_secs(),
            counter: self.dialogue_counter(locale),
            locale,
        }
    }

    fn read_u8(&self, offset: u64) -> u8 {
        let base = self.reader.base_address();
        self.reader.read_u8(base + offset).unwrap_or(0)
    }
}
