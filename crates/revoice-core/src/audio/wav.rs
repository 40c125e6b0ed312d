//! Canonical WAVE header parsing.
//!
//! The voice archive stores plain little-endian RIFF/WAVE payloads: the fmt
//! chunk size sits at byte 16, the format descriptor at byte 20, and the data
//! payload begins at `20 + fmt_size + 8`. All field reads are bounds checked.

use crate::error::{Error, Result};

/// Minimal canonical WAVE header size.
const MIN_WAV_LEN: usize = 44;

/// Parsed format descriptor plus the location of the data payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WavInfo {
    pub format_tag: u16,
    pub channels: u16,
    pub sample_rate: u32,
    pub bits_per_sample: u16,
    /// Byte offset of the data payload within the buffer.
    pub data_offset: usize,
    /// Length of the data payload in bytes.
    pub data_len: usize,
}

impl WavInfo {
    /// Parse the header of a WAVE buffer.
    pub fn parse(buffer: &[u8]) -> Result<Self> {
        if buffer.len() < MIN_WAV_LEN {
            return Err(Error::InvalidFormat(format!(
                "WAV buffer too small: {} bytes",
                buffer.len()
            )));
        }

        let fmt_size = read_u32(buffer, 16) as usize;
        let data_offset = 20 + fmt_size + 8;
        if data_offset >= buffer.len() {
            return Err(Error::InvalidFormat(format!(
                "data chunk offset {} beyond buffer length {}",
                data_offset,
                buffer.len()
            )));
        }

        Ok(Self {
            format_tag: read_u16(buffer, 20),
            channels: read_u16(buffer, 22),
            sample_rate: read_u32(buffer, 24),
            bits_per_sample: read_u16(buffer, 34),
            data_offset,
            data_len: buffer.len() - data_offset,
        })
    }

    /// Bytes per sample frame across all channels.
    pub fn bytes_per_sample(&self) -> u32 {
        (self.bits_per_sample as u32 / 8) * self.channels as u32
    }

    /// Convert a time window into a byte range relative to the data payload.
    ///
    /// A start offset beyond the payload resets to 0; the end offset clamps
    /// to the payload length. The playable range is `[start, end)`.
    pub fn byte_range(&self, start_secs: f32, end_secs: f32) -> (usize, usize) {
        let stride = self.sample_rate as f64 * self.bytes_per_sample() as f64;

        let mut start = (start_secs as f64 * stride) as usize;
        let mut end = (end_secs as f64 * stride) as usize;

        if start > self.data_len {
            start = 0;
        }
        if end > self.data_len {
            end = self.data_len;
        }

        (start, end)
    }
}

fn read_u16(buffer: &[u8], offset: usize) -> u16 {
    u16::from_le_bytes([buffer[offset], buffer[offset + 1]])
}

fn read_u32(buffer: &[u8], offset: usize) -> u32 {
    u32::from_le_bytes([
        buffer[offset],
        buffer[offset + 1],
        buffer[offset + 2],
        buffer[offset + 3],
    ])
}
