use thiserror::Error;

/// Returned when a reader runs out of bits or meets a value it cannot decode
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SerdeErr {
    /// The buffer ended before the value was fully read
    #[error("Unexpected end of buffer after {bits_read} bits")]
    EndOfBuffer { bits_read: u32 },

    /// A decoded value is outside of the range of its type
    #[error("Decoded value is out of range for {type_name}")]
    OutOfRange { type_name: &'static str },

    /// A decoded string is not valid UTF-8
    #[error("Decoded string is not valid UTF-8")]
    InvalidUtf8,
}
