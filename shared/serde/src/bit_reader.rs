use crate::error::SerdeErr;

/// Reads bits written by a `BitWriter`, least-significant first
pub struct BitReader<'b> {
    buffer: &'b [u8],
    bit_index: u32,
}

impl<'b> BitReader<'b> {
    pub fn new(buffer: &'b [u8]) -> Self {
        Self {
            buffer,
            bit_index: 0,
        }
    }

    pub fn read_bit(&mut self) -> Result<bool, SerdeErr> {
        let byte_index = (self.bit_index / 8) as usize;
        let Some(byte) = self.buffer.get(byte_index) else {
            return Err(SerdeErr::EndOfBuffer {
                bits_read: self.bit_index,
            });
        };
        let bit = (byte >> (self.bit_index % 8)) & 1 != 0;
        self.bit_index += 1;
        Ok(bit)
    }

    pub fn read_byte(&mut self) -> Result<u8, SerdeErr> {
        let mut output: u8 = 0;
        for i in 0..8 {
            if self.read_bit()? {
                output |= 1 << i;
            }
        }
        Ok(output)
    }

    pub fn bits_read(&self) -> u32 {
        self.bit_index
    }

    /// Bits left before the end of the buffer, counting padding of the last byte
    pub fn bits_remaining(&self) -> u32 {
        (self.buffer.len() as u32 * 8).saturating_sub(self.bit_index)
    }
}

#[cfg(test)]
mod tests {
    use crate::{BitWrite, BitWriter};

    use super::*;

    #[test]
    fn reads_what_was_written() {
        let mut writer = BitWriter::new();
        writer.write_bit(true);
        writer.write_byte(0xAB);
        writer.write_bit(false);
        writer.write_bit(true);
        let bytes = writer.to_bytes();

        let mut reader = BitReader::new(&bytes);
        assert!(reader.read_bit().unwrap());
        assert_eq!(reader.read_byte().unwrap(), 0xAB);
        assert!(!reader.read_bit().unwrap());
        assert!(reader.read_bit().unwrap());
        assert_eq!(reader.bits_read(), 11);
    }

    #[test]
    fn end_of_buffer_is_an_error() {
        let bytes = [0xFFu8];
        let mut reader = BitReader::new(&bytes);

        assert_eq!(reader.read_byte().unwrap(), 0xFF);
        assert_eq!(
            reader.read_bit(),
            Err(SerdeErr::EndOfBuffer { bits_read: 8 })
        );
    }
}
