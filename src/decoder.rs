//! Cursor-based decoding of a block's raw register words.
//!
//! 32-bit values span two registers with the low word first.

use crate::error::{Eg4Error, Result};

/// Sequential reader over the words returned by one block read.
///
/// A failed decode leaves the cursor where it was before the call.
#[derive(Debug)]
pub struct RegisterDecoder<'a> {
    words: &'a [u16],
    position: usize,
}

impl<'a> RegisterDecoder<'a> {
    pub fn new(words: &'a [u16]) -> Self {
        Self { words, position: 0 }
    }

    pub fn position(&self) -> usize {
        self.position
    }

    pub fn remaining(&self) -> usize {
        self.words.len().saturating_sub(self.position)
    }

    fn take(&mut self, width: usize) -> Result<&'a [u16]> {
        let end = self.position + width;
        if end > self.words.len() {
            return Err(Eg4Error::DecodeUnderflow {
                position: self.position,
                requested: width,
                available: self.remaining(),
            });
        }
        let slice = &self.words[self.position..end];
        self.position = end;
        Ok(slice)
    }

    pub fn decode_u16(&mut self) -> Result<u16> {
        Ok(self.take(1)?[0])
    }

    pub fn decode_i16(&mut self) -> Result<i16> {
        Ok(self.decode_u16()? as i16)
    }

    pub fn decode_u32(&mut self) -> Result<u32> {
        let words = self.take(2)?;
        Ok(((words[1] as u32) << 16) | words[0] as u32)
    }

    pub fn decode_i32(&mut self) -> Result<i32> {
        Ok(self.decode_u32()? as i32)
    }

    /// Step over reserved registers. Overrunning the block is reported by
    /// the next decode, not here.
    pub fn skip(&mut self, count: usize) {
        self.position = self.position.saturating_add(count);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn signed_16_bit() {
        let mut decoder = RegisterDecoder::new(&[0xFFFF, 0x8000, 0x7FFF]);
        assert_eq!(decoder.decode_i16().unwrap(), -1);
        assert_eq!(decoder.decode_i16().unwrap(), -32768);
        assert_eq!(decoder.decode_i16().unwrap(), 32767);
    }

    #[test]
    fn low_word_first_32_bit() {
        let mut decoder = RegisterDecoder::new(&[0x0001, 0x0000, 0x0000, 0x0001]);
        assert_eq!(decoder.decode_u32().unwrap(), 1);
        assert_eq!(decoder.decode_u32().unwrap(), 65536);
    }

    #[test]
    fn signed_32_bit() {
        let mut decoder = RegisterDecoder::new(&[0xFFFE, 0xFFFF, 0x0000, 0x8000]);
        assert_eq!(decoder.decode_i32().unwrap(), -2);
        assert_eq!(decoder.decode_i32().unwrap(), i32::MIN);
    }

    #[test]
    fn skip_advances_without_output() {
        let mut decoder = RegisterDecoder::new(&[1, 2, 3, 4]);
        decoder.skip(3);
        assert_eq!(decoder.decode_u16().unwrap(), 4);
        assert_eq!(decoder.remaining(), 0);
    }

    #[test]
    fn underflow_keeps_position() {
        let mut decoder = RegisterDecoder::new(&[7, 8, 9]);
        decoder.decode_u16().unwrap();
        decoder.decode_u16().unwrap();

        let err = decoder.decode_u32().unwrap_err();
        assert!(matches!(
            err,
            Eg4Error::DecodeUnderflow {
                position: 2,
                requested: 2,
                available: 1
            }
        ));
        assert_eq!(decoder.position(), 2);
        assert_eq!(decoder.decode_u16().unwrap(), 9);
        assert!(decoder.decode_u16().is_err());
        assert_eq!(decoder.position(), 3);
    }

    #[test]
    fn decode_after_skip_past_end_fails() {
        let mut decoder = RegisterDecoder::new(&[1]);
        decoder.skip(5);
        assert!(matches!(
            decoder.decode_u16(),
            Err(Eg4Error::DecodeUnderflow { available: 0, .. })
        ));
        assert_eq!(decoder.position(), 5);
    }
}
