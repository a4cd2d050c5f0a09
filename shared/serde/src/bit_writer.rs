/// Sink for individual bits, implemented by writers and counters
pub trait BitWrite {
    fn write_bit(&mut self, bit: bool);
    fn write_byte(&mut self, byte: u8);
    fn count_bits(&mut self, bits: u32);
    fn is_counter(&self) -> bool;
}

/// A growable bit writer. Bits are packed least-significant first.
pub struct BitWriter {
    scratch: u8,
    scratch_index: u8,
    buffer: Vec<u8>,
    bits_written: u32,
}

impl BitWriter {
    pub fn new() -> Self {
        Self {
            scratch: 0,
            scratch_index: 0,
            buffer: Vec::with_capacity(64),
            bits_written: 0,
        }
    }

    fn flush_scratch(&mut self) {
        if self.scratch_index > 0 {
            let byte = (self.scratch << (8 - self.scratch_index)).reverse_bits();
            self.buffer.push(byte);
            self.scratch = 0;
            self.scratch_index = 0;
        }
    }

    pub fn to_bytes(mut self) -> Vec<u8> {
        self.flush_scratch();
        self.buffer
    }

    pub fn bits_written(&self) -> u32 {
        self.bits_written
    }
}

impl Default for BitWriter {
    fn default() -> Self {
        Self::new()
    }
}

impl BitWrite for BitWriter {
    fn write_bit(&mut self, bit: bool) {
        self.scratch <<= 1;

        if bit {
            self.scratch |= 1;
        }

        self.scratch_index += 1;
        self.bits_written += 1;

        if self.scratch_index >= 8 {
            self.buffer.push(self.scratch.reverse_bits());
            self.scratch_index = 0;
            self.scratch = 0;
        }
    }

    fn write_byte(&mut self, byte: u8) {
        let mut temp = byte;
        for _ in 0..8 {
            self.write_bit(temp & 1 != 0);
            temp >>= 1;
        }
    }

    fn count_bits(&mut self, _bits: u32) {
        // growable, nothing to reserve
    }

    fn is_counter(&self) -> bool {
        false
    }
}

/// Counts bits without storing them, used to measure a message before
/// committing it
pub struct BitCounter {
    bits: u32,
}

impl BitCounter {
    pub fn new() -> Self {
        Self { bits: 0 }
    }

    pub fn bits_needed(&self) -> u32 {
        self.bits
    }
}

impl Default for BitCounter {
    fn default() -> Self {
        Self::new()
    }
}

impl BitWrite for BitCounter {
    fn write_bit(&mut self, _bit: bool) {
        self.bits += 1;
    }

    fn write_byte(&mut self, _byte: u8) {
        self.bits += 8;
    }

    fn count_bits(&mut self, bits: u32) {
        self.bits += bits;
    }

    fn is_counter(&self) -> bool {
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn writes_byte() {
        let mut writer = BitWriter::new();

        writer.write_byte(0b10101010);

        let bytes = writer.to_bytes();
        assert_eq!(bytes.len(), 1);
        assert_eq!(bytes[0], 0b10101010);
    }

    #[test]
    fn writes_bits_lsb_first() {
        let mut writer = BitWriter::new();

        for i in 0..8 {
            writer.write_bit(i % 2 == 1);
        }

        let bytes = writer.to_bytes();
        assert_eq!(bytes.len(), 1);
        assert_eq!(bytes[0], 0b10101010);
    }

    #[test]
    fn partial_byte_is_flushed() {
        let mut writer = BitWriter::new();

        writer.write_bit(true);
        writer.write_bit(true);
        writer.write_bit(false);

        assert_eq!(writer.bits_written(), 3);
        let bytes = writer.to_bytes();
        assert_eq!(bytes, vec![0b0000_0011]);
    }

    #[test]
    fn counter_matches_writer() {
        let mut writer = BitWriter::new();
        let mut counter = BitCounter::new();

        for byte in [0x12u8, 0x34, 0x56] {
            writer.write_byte(byte);
            counter.write_byte(byte);
        }
        writer.write_bit(true);
        counter.write_bit(true);

        assert_eq!(writer.bits_written(), counter.bits_needed());
        assert!(counter.is_counter());
    }
}
