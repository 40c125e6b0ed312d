//! Segment playback through the default output device.
//!
//! At most one segment plays at a time: a new request pre-empts the old one.
//! Playback problems never surface as errors to the monitor loop; they are
//! logged and the current request is dropped.

use rodio::buffer::SamplesBuffer;
use rodio::{OutputStream, OutputStreamHandle, Sink};
use tracing::{debug, warn};

use crate::audio::wav::WavInfo;
use crate::config::MAX_VOLUME_LEVEL;
use crate::error::Error;

pub struct SegmentPlayer {
    volume: f32,
    stream: Option<(OutputStream, OutputStreamHandle)>,
    sink: Option<Sink>,
}

impl SegmentPlayer {
    pub fn new(volume_level: u8, enable_master_volume: bool) -> Self {
        Self {
            volume: volume_for_level(volume_level, enable_master_volume),
            stream: None,
            sink: None,
        }
    }

    /// Play the `[start_secs, end_secs)` window of a WAVE buffer, replacing
    /// any segment currently playing. Fire and forget.
    pub fn play(&mut self, buffer: &[u8], start_secs: f32, end_secs: f32) {
        self.stop();

        let info = match WavInfo::parse(buffer) {
            Ok(info) => info,
            Err(e) => {
                warn!("Invalid WAV buffer: {}", e);
                return;
            }
        };

        let (start, end) = info.byte_range(start_secs, end_secs);
        if start >= end {
            debug!(
                "Empty playback range {:.1}s-{:.1}s, nothing to play",
                start_secs, end_secs
            );
            return;
        }

        let payload = &buffer[info.data_offset + start..info.data_offset + end];
        let samples = match decode_samples(payload, info.bits_per_sample) {
            Some(samples) => samples,
            None => {
                warn!(
                    "Unsupported sample width: {} bits",
                    info.bits_per_sample
                );
                return;
            }
        };

        // The output device opens lazily on the first segment and is reused
        // afterwards. A failed open leaves the player without a device; the
        // next play() retries.
        if self.stream.is_none() {
            match OutputStream::try_default() {
                Ok(stream) => {
                    debug!("Audio output device opened");
                    self.stream = Some(stream);
                }
                Err(e) => {
                    warn!("{}", Error::DeviceOpenFailed(e.to_string()));
                    return;
                }
            }
        }
        let Some((_, handle)) = &self.stream else {
            return;
        };

        let sink = match Sink::try_new(handle) {
            Ok(sink) => sink,
            Err(e) => {
                warn!("Failed to create playback sink: {}", e);
                return;
            }
        };
        sink.set_volume(self.volume);

        debug!(
            "Playing segment {:.1}s-{:.1}s ({} bytes)",
            start_secs,
            end_secs,
            end - start
        );
        sink.append(SamplesBuffer::new(
            info.channels,
            info.sample_rate,
            samples,
        ));
        self.sink = Some(sink);
    }

    /// Release the active segment, if any. Safe to call repeatedly.
    pub fn stop(&mut self) {
        if let Some(sink) = self.sink.take() {
            sink.stop();
            debug!("Segment stopped");
        }
    }

    /// True while a segment sink is held.
    pub fn has_active_session(&self) -> bool {
        self.sink.is_some()
    }
}

impl Drop for SegmentPlayer {
    fn drop(&mut self) {
        self.stop();
    }
}

/// Map the in-game master volume level (0-15) onto the device volume range.
/// With master-volume control disabled the level is ignored and segments play
/// at full volume.
fn volume_for_level(level: u8, enable_master_volume: bool) -> f32 {
    if !enable_master_volume {
        return 1.0;
    }
    let level = level.min(MAX_VOLUME_LEVEL);
    level as f32 / MAX_VOLUME_LEVEL as f32
}

fn decode_samples(payload: &[u8], bits_per_sample: u16) -> Option<Vec<i16>> {
    match bits_per_sample {
        16 => Some(
            payload
                .chunks_exact(2)
                .map(|pair| i16::from_le_bytes([pair[0], pair[1]]))
                .collect(),
        ),
        8 => Some(
            payload
                .iter()
                .map(|&b| ((b as i16) - 128) << 8)
                .collect(),
        ),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_volume_mapping() {
        assert_eq!(volume_for_level(0, true), 0.0);
        assert_eq!(volume_for_level(15, true), 1.0);
        assert!((volume_for_level(8, true) - 8.0 / 15.0).abs() < f32::EPSILON);
    }

    #[test]
    fn test_volume_level_clamped() {
        assert_eq!(volume_for_level(200, true), 1.0);
    }

    #[test]
    fn test_volume_disabled_is_full() {
        assert_eq!(volume_for_level(0, false), 1.0);
        assert_eq!(volume_for_level(3, false), 1.0);
    }

    #[test]
    fn test_decode_16bit() {
        let payload = [0x34, 0x12, 0x00, 0x80];
        let samples = decode_samples(&payload, 16).unwrap();
        assert_eq!(samples, vec![0x1234, i16::MIN]);
    }

    #[test]
    fn test_decode_8bit() {
        let samples = decode_samples(&[128, 255, 0], 8).unwrap();
        assert_eq!(samples, vec![0, 127 << 8, -128 << 8]);
    }

    #[test]
    fn test_decode_unsupported_width() {
        assert!(decode_samples(&[0; 6], 24).is_none());
    }

    fn test_wav() -> Vec<u8> {
        let mut buf = Vec::new();
        buf.extend_from_slice(b"RIFF");
        buf.extend_from_slice(&(36u32 + 400).to_le_bytes());
        buf.extend_from_slice(b"WAVE");
        buf.extend_from_slice(b"fmt ");
        buf.extend_from_slice(&16u32.to_le_bytes());
        buf.extend_from_slice(&1u16.to_le_bytes());
        buf.extend_from_slice(&2u16.to_le_bytes());
        buf.extend_from_slice(&44100u32.to_le_bytes());
        buf.extend_from_slice(&176400u32.to_le_bytes());
        buf.extend_from_slice(&4u16.to_le_bytes());
        buf.extend_from_slice(&16u16.to_le_bytes());
        buf.extend_from_slice(b"data");
        buf.extend_from_slice(&400u32.to_le_bytes());
        buf.resize(buf.len() + 400, 0);
        buf
    }

    #[test]
    fn test_back_to_back_play_holds_at_most_one_session() {
        let mut player = SegmentPlayer::new(15, true);
        let wav = test_wav();

        // With a device the second play pre-empts the first; headless, the
        // failed device open leaves no session. Either way there is never
        // more than one.
        player.play(&wav, 0.0, 1.0);
        let after_first = player.has_active_session();
        player.play(&wav, 0.0, 1.0);
        assert_eq!(player.has_active_session(), after_first);

        player.stop();
        assert!(!player.has_active_session());
    }

    #[test]
    fn test_device_open_failure_message() {
        let e = Error::DeviceOpenFailed("no output device".to_string());
        assert_eq!(
            e.to_string(),
            "Failed to open audio output device: no output device"
        );
    }

    #[test]
    fn test_stop_is_idempotent() {
        let mut player = SegmentPlayer::new(15, true);
        player.stop();
        player.stop();
        assert!(!player.has_active_session());
    }

    #[test]
    fn test_invalid_buffer_leaves_no_session() {
        let mut player = SegmentPlayer::new(15, true);
        player.play(&[0u8; 10], 0.0, 1.0);
        assert!(!player.has_active_session());
    }
}
