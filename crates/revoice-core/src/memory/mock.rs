//! Mock memory reader for testing
//!
//! Provides a configurable mock implementation of ReadMemory trait
//! that reads from an in-memory buffer instead of a real process.

use crate::error::{Error, Result};
use crate::memory::ReadMemory;

/// Mock memory reader for testing
///
/// Reads from an in-memory buffer, allowing tests to verify probe and loop
/// logic without requiring access to a real process.
#[derive(Debug, Clone)]
pub struct MockMemoryReader {
    data: Vec<u8>,
    base: u64,
}

impl MockMemoryReader {
    /// Create a new mock reader with the given data at base address 0x400000
    pub fn new(data: Vec<u8>) -> Self {
        Self {
            data,
            base: 0x400000,
        }
    }

    /// Create a new mock reader with custom base address
    pub fn with_base(data: Vec<u8>, base: u64) -> Self {
        Self { data, base }
    }

    /// Get the size of the underlying buffer
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Check if the buffer is empty
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}

impl ReadMemory for MockMemoryReader {
    fn read_bytes(&self, address: u64, size: usize) -> Result<Vec<u8>> {
        if address < self.base {
            return Err(Error::MemoryReadFailed {
                address,
                message: format!("Address below base (base=0x{:X})", self.base),
            });
        }
        let offset = (address - self.base) as usize;
        if offset + size > self.data.len() {
            return Err(Error::MemoryReadFailed {
                address,
                message: format!(
                    "Out of bounds: offset={}, size={}, len={}",
                    offset,
                    size,
                    self.data.len()
                ),
            });
        }
        Ok(self.data[offset..offset + size].to_vec())
    }

    fn base_address(&self) -> u64 {
        self.base
    }
}

/// Builder for creating test memory buffers
///
/// Provides a fluent API for constructing memory layouts for testing.
#[derive(Debug, Clone, Default)]
pub struct MockMemoryBuilder {
    data: Vec<u8>,
    base: u64,
}

impl MockMemoryBuilder {
    /// Create a new builder with default base address (0x400000)
    pub fn new() -> Self {
        Self {
            data: Vec::new(),
            base: 0x400000,
        }
    }

    /// Set the base address for the mock reader
    pub fn base(mut self, base: u64) -> Self {
        self.base = base;
        self
    }

    /// Pre-allocate buffer with zeros up to the specified size
    pub fn with_size(mut self, size: usize) -> Self {
        self.data.resize(size, 0);
        self
    }

    /// Write an unsigned byte at the specified offset from base
    pub fn write_u8(mut self, offset: usize, value: u8) -> Self {
        self.ensure_size(offset + 1);
        self.data[offset] = value;
        self
    }

    /// Write an unsigned 16-bit integer at the specified offset from base
    pub fn write_u16(mut self, offset: usize, value: u16) -> Self {
        self.ensure_size(offset + 2);
        self.data[offset..offset + 2].copy_from_slice(&value.to_le_bytes());
        self
    }

    /// Write an unsigned 32-bit integer at the specified offset from base
    pub fn write_u32(mut self, offset: usize, value: u32) -> Self {
        self.ensure_size(offset + 4);
        self.data[offset..offset + 4].copy_from_slice(&value.to_le_bytes());
        self
    }

    /// Write a 32-bit float at the specified offset from base
    pub fn write_f32(mut self, offset: usize, value: f32) -> Self {
        self.ensure_size(offset + 4);
        self.data[offset..offset + 4].copy_from_slice(&value.to_le_bytes());
        self
    }

    /// Write raw bytes at the specified offset from base
    pub fn write_bytes(mut self, offset: usize, bytes: &[u8]) -> Self {
        self.ensure_size(offset + bytes.len());
        self.data[offset..offset + bytes.len()].copy_from_slice(bytes);
        self
    }

    /// Build the MockMemoryReader
    pub fn build(self) -> MockMemoryReader {
        MockMemoryReader {
            data: self.data,
            base: self.base,
        }
    }

    fn ensure_size(&mut self, required: usize) {
        if self.data.len() < required {
            self.data.resize(required, 0);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mock_reader_basic() {
        let data = vec![0x78, 0x56, 0x34, 0x12];
        let reader = MockMemoryReader::new(data);

        let value = reader.read_u32(0x400000).unwrap();
        assert_eq!(value, 0x12345678);
    }

    #[test]
    fn test_mock_reader_with_base() {
        let data = vec![0x01, 0x02, 0x03, 0x04];
        let reader = MockMemoryReader::with_base(data, 0x140000000);

        let bytes = reader.read_bytes(0x140000000, 4).unwrap();
        assert_eq!(bytes, vec![0x01, 0x02, 0x03, 0x04]);
    }

    #[test]
    fn test_mock_reader_out_of_bounds() {
        let data = vec![0x01, 0x02];
        let reader = MockMemoryReader::new(data);

        let result = reader.read_u32(0x400000);
        assert!(result.is_err());
    }

    #[test]
    fn test_mock_reader_below_base() {
        let data = vec![0x01, 0x02, 0x03, 0x04];
        let reader = MockMemoryReader::with_base(data, 0x500000);

        let result = reader.read_bytes(0x400000, 4);
        assert!(result.is_err());
    }

    #[test]
    fn test_builder_narrow_widths() {
        let reader = MockMemoryBuilder::new()
            .write_u8(0, 152)
            .write_u16(2, 44906)
            .write_f32(4, 1.5)
            .build();

        assert_eq!(reader.read_u8(0x400000).unwrap(), 152);
        assert_eq!(reader.read_u16(0x400002).unwrap(), 44906);
        assert_eq!(reader.read_f32(0x400004).unwrap(), 1.5);
    }

    #[test]
    fn test_builder_with_size() {
        let reader = MockMemoryBuilder::new()
            .with_size(100)
            .write_u32(96, 123)
            .build();

        assert_eq!(reader.len(), 100);
        assert_eq!(reader.read_u32(0x400000 + 96).unwrap(), 123);
    }

    #[test]
    fn test_builder_raw_bytes() {
        let reader = MockMemoryBuilder::new()
            .write_bytes(0, &[0xDE, 0xAD, 0xBE, 0xEF])
            .build();

        let bytes = reader.read_bytes(0x400000, 4).unwrap();
        assert_eq!(bytes, vec![0xDE, 0xAD, 0xBE, 0xEF]);
    }
}
