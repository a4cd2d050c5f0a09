use crate::{
    bit_reader::BitReader, bit_writer::BitWrite, error::SerdeErr, integer::UnsignedVariableInteger,
    serde::Serde, ConstBitLength,
};

// Primitives

impl Serde for bool {
    fn ser(&self, writer: &mut dyn BitWrite) {
        writer.write_bit(*self);
    }

    fn de(reader: &mut BitReader) -> Result<Self, SerdeErr> {
        reader.read_bit()
    }

    fn bit_length(&self) -> u32 {
        1
    }
}

impl ConstBitLength for bool {
    fn const_bit_length() -> u32 {
        1
    }
}

macro_rules! impl_serde_for_bytes {
    ($($t:ty),*) => {$(
        impl Serde for $t {
            fn ser(&self, writer: &mut dyn BitWrite) {
                for byte in self.to_le_bytes() {
                    writer.write_byte(byte);
                }
            }

            fn de(reader: &mut BitReader) -> Result<Self, SerdeErr> {
                let mut bytes = [0u8; std::mem::size_of::<$t>()];
                for byte in bytes.iter_mut() {
                    *byte = reader.read_byte()?;
                }
                Ok(<$t>::from_le_bytes(bytes))
            }

            fn bit_length(&self) -> u32 {
                <$t as ConstBitLength>::const_bit_length()
            }
        }

        impl ConstBitLength for $t {
            fn const_bit_length() -> u32 {
                (std::mem::size_of::<$t>() * 8) as u32
            }
        }
    )*};
}

impl_serde_for_bytes!(u8, u16, u32, u64, i8, i16, i32, i64, f32);

// Containers

impl Serde for String {
    fn ser(&self, writer: &mut dyn BitWrite) {
        let length = UnsignedVariableInteger::<9>::new(self.len() as i64);
        length.ser(writer);
        for byte in self.as_bytes() {
            writer.write_byte(*byte);
        }
    }

    fn de(reader: &mut BitReader) -> Result<Self, SerdeErr> {
        let length: usize = UnsignedVariableInteger::<9>::de(reader)?.get() as usize;
        if length > reader.bits_remaining() as usize / 8 {
            return Err(SerdeErr::EndOfBuffer {
                bits_read: reader.bits_read(),
            });
        }
        let mut bytes = Vec::with_capacity(length);
        for _ in 0..length {
            bytes.push(reader.read_byte()?);
        }
        String::from_utf8(bytes).map_err(|_| SerdeErr::InvalidUtf8)
    }

    fn bit_length(&self) -> u32 {
        UnsignedVariableInteger::<9>::new(self.len() as i64).bit_length() + self.len() as u32 * 8
    }
}

impl<T: Serde> Serde for Option<T> {
    fn ser(&self, writer: &mut dyn BitWrite) {
        match self {
            Some(value) => {
                writer.write_bit(true);
                value.ser(writer);
            }
            None => writer.write_bit(false),
        }
    }

    fn de(reader: &mut BitReader) -> Result<Self, SerdeErr> {
        if reader.read_bit()? {
            Ok(Some(T::de(reader)?))
        } else {
            Ok(None)
        }
    }

    fn bit_length(&self) -> u32 {
        1 + self.as_ref().map(|value| value.bit_length()).unwrap_or(0)
    }
}

impl<T: Serde> Serde for Vec<T> {
    fn ser(&self, writer: &mut dyn BitWrite) {
        UnsignedVariableInteger::<5>::new(self.len() as i64).ser(writer);
        for item in self {
            item.ser(writer);
        }
    }

    fn de(reader: &mut BitReader) -> Result<Self, SerdeErr> {
        let length = UnsignedVariableInteger::<5>::de(reader)?.get() as usize;
        let mut output = Vec::with_capacity(length.min(1024));
        for _ in 0..length {
            output.push(T::de(reader)?);
        }
        Ok(output)
    }

    fn bit_length(&self) -> u32 {
        let header = UnsignedVariableInteger::<5>::new(self.len() as i64).bit_length();
        self.iter().fold(header, |acc, item| acc + item.bit_length())
    }
}

impl<T: Serde, const N: usize> Serde for [T; N] {
    fn ser(&self, writer: &mut dyn BitWrite) {
        for item in self {
            item.ser(writer);
        }
    }

    fn de(reader: &mut BitReader) -> Result<Self, SerdeErr> {
        let mut items = Vec::with_capacity(N);
        for _ in 0..N {
            items.push(T::de(reader)?);
        }
        items.try_into().map_err(|_| SerdeErr::OutOfRange {
            type_name: "array",
        })
    }

    fn bit_length(&self) -> u32 {
        self.iter().map(|item| item.bit_length()).sum()
    }
}

impl<A: Serde, B: Serde> Serde for (A, B) {
    fn ser(&self, writer: &mut dyn BitWrite) {
        self.0.ser(writer);
        self.1.ser(writer);
    }

    fn de(reader: &mut BitReader) -> Result<Self, SerdeErr> {
        Ok((A::de(reader)?, B::de(reader)?))
    }

    fn bit_length(&self) -> u32 {
        self.0.bit_length() + self.1.bit_length()
    }
}

#[cfg(test)]
mod tests {
    use crate::{BitReader, BitWriter, Serde};

    #[test]
    fn mixed_values_read_back_in_order() {
        let mut writer = BitWriter::new();

        true.ser(&mut writer);
        42u8.ser(&mut writer);
        (-7i16).ser(&mut writer);
        1.5f32.ser(&mut writer);
        String::from("Player").ser(&mut writer);
        Some(9u32).ser(&mut writer);
        vec![(String::from("Door"), 3u16)].ser(&mut writer);
        [1.0f32, 2.0, 3.0].ser(&mut writer);

        let bytes = writer.to_bytes();
        let mut reader = BitReader::new(&bytes);

        assert!(bool::de(&mut reader).unwrap());
        assert_eq!(u8::de(&mut reader).unwrap(), 42);
        assert_eq!(i16::de(&mut reader).unwrap(), -7);
        assert_eq!(f32::de(&mut reader).unwrap(), 1.5);
        assert_eq!(String::de(&mut reader).unwrap(), "Player");
        assert_eq!(Option::<u32>::de(&mut reader).unwrap(), Some(9));
        assert_eq!(
            Vec::<(String, u16)>::de(&mut reader).unwrap(),
            vec![(String::from("Door"), 3u16)]
        );
        assert_eq!(<[f32; 3]>::de(&mut reader).unwrap(), [1.0, 2.0, 3.0]);
    }

    #[test]
    fn bit_length_matches_written_bits() {
        let value = vec![String::from("abc"), String::new()];
        let mut writer = BitWriter::new();
        value.ser(&mut writer);
        assert_eq!(writer.bits_written(), value.bit_length());
    }

    #[test]
    fn truncated_string_fails() {
        let mut writer = BitWriter::new();
        String::from("truncate me").ser(&mut writer);
        let mut bytes = writer.to_bytes();
        bytes.truncate(4);

        let mut reader = BitReader::new(&bytes);
        assert!(String::de(&mut reader).is_err());
    }
}
