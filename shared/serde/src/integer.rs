use crate::{bit_reader::BitReader, bit_writer::BitWrite, error::SerdeErr, serde::Serde, ConstBitLength};

pub trait SerdeIntegerConversion<const SIGNED: bool, const VARIABLE: bool, const BITS: u8> {
    fn from(value: &SerdeInteger<SIGNED, VARIABLE, BITS>) -> Self;
}

pub type UnsignedInteger<const BITS: u8> = SerdeInteger<false, false, BITS>;
pub type SignedInteger<const BITS: u8> = SerdeInteger<true, false, BITS>;
pub type UnsignedVariableInteger<const BITS: u8> = SerdeInteger<false, true, BITS>;
pub type SignedVariableInteger<const BITS: u8> = SerdeInteger<true, true, BITS>;

/// An integer encoded with a fixed number of bits, or in `BITS`-sized chunks
/// each preceded by a continuation bit when `VARIABLE` is set.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Hash)]
pub struct SerdeInteger<const SIGNED: bool, const VARIABLE: bool, const BITS: u8> {
    value: i64,
}

impl<const SIGNED: bool, const VARIABLE: bool, const BITS: u8> SerdeInteger<SIGNED, VARIABLE, BITS> {
    /// # Panics
    ///
    /// Panics if `BITS` is 0 or above 63, if a negative value is given to an
    /// unsigned integer, or if a fixed-width integer cannot hold the value.
    pub fn new<T: Into<i64>>(value: T) -> Self {
        let value = value.into();
        if BITS == 0 || BITS > 63 {
            panic!("integer bit width must be in 1..=63, got {}", BITS);
        }
        if !SIGNED && value < 0 {
            panic!("can't encode a negative number with an unsigned integer");
        }
        if !VARIABLE && value.unsigned_abs() >= (1_u64 << BITS) {
            panic!("with {} bits, can't encode {}", BITS, value);
        }
        Self { value }
    }

    pub fn get(&self) -> i64 {
        self.value
    }

    pub fn to<T: SerdeIntegerConversion<SIGNED, VARIABLE, BITS>>(&self) -> T {
        T::from(self)
    }
}

impl<const SIGNED: bool, const VARIABLE: bool, const BITS: u8> Serde
    for SerdeInteger<SIGNED, VARIABLE, BITS>
{
    fn ser(&self, writer: &mut dyn BitWrite) {
        if SIGNED {
            writer.write_bit(self.value < 0);
        }
        let mut magnitude = self.value.unsigned_abs();

        if VARIABLE {
            loop {
                let proceed = magnitude >= (1_u64 << BITS);
                writer.write_bit(proceed);
                for _ in 0..BITS {
                    writer.write_bit(magnitude & 1 != 0);
                    magnitude >>= 1;
                }
                if !proceed {
                    return;
                }
            }
        } else {
            for _ in 0..BITS {
                writer.write_bit(magnitude & 1 != 0);
                magnitude >>= 1;
            }
        }
    }

    fn de(reader: &mut BitReader) -> Result<Self, SerdeErr> {
        let negative = if SIGNED { reader.read_bit()? } else { false };

        let mut magnitude: u64 = 0;
        let mut shift: u32 = 0;
        loop {
            let proceed = if VARIABLE { reader.read_bit()? } else { false };
            for _ in 0..BITS {
                let bit = reader.read_bit()?;
                if bit {
                    if shift >= 63 {
                        return Err(SerdeErr::OutOfRange {
                            type_name: "SerdeInteger",
                        });
                    }
                    magnitude |= 1 << shift;
                }
                shift += 1;
            }
            if !proceed {
                break;
            }
        }

        let value = magnitude as i64;
        Ok(Self {
            value: if negative { -value } else { value },
        })
    }

    fn bit_length(&self) -> u32 {
        let mut output: u32 = if SIGNED { 1 } else { 0 };

        if VARIABLE {
            let mut magnitude = self.value.unsigned_abs();
            loop {
                let proceed = magnitude >= (1_u64 << BITS);
                output += 1 + BITS as u32;
                magnitude >>= BITS;
                if !proceed {
                    break;
                }
            }
        } else {
            output += BITS as u32;
        }
        output
    }
}

impl<const SIGNED: bool, const BITS: u8> ConstBitLength for SerdeInteger<SIGNED, false, BITS> {
    fn const_bit_length() -> u32 {
        BITS as u32 + if SIGNED { 1 } else { 0 }
    }
}

impl<const SIGNED: bool, const VARIABLE: bool, const BITS: u8, T: TryFrom<i64>>
    SerdeIntegerConversion<SIGNED, VARIABLE, BITS> for T
{
    fn from(value: &SerdeInteger<SIGNED, VARIABLE, BITS>) -> Self {
        let Ok(t_value) = T::try_from(value.value) else {
            panic!("SerdeInteger's value is out of range to convert to this type.");
        };
        t_value
    }
}
