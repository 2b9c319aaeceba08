use thiserror::Error;

/// Errors that can occur while decoding a bit stream
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SerdeErr {
    /// The stream ended before the value was fully read
    #[error("Unexpected end of stream: needed {bits_needed} bits but only {bits_remaining} remain")]
    UnexpectedEnd {
        bits_needed: usize,
        bits_remaining: usize,
    },

    /// A string payload was not valid UTF-8
    #[error("String payload is not valid UTF-8")]
    InvalidUtf8,

    /// A decoded value is outside the range of the target type
    #[error("Decoded value {value} is out of range for {type_name}")]
    InvalidValue {
        type_name: &'static str,
        value: u64,
    },

    /// A packed integer header byte is not a known length marker
    #[error("Invalid packed integer header byte {header}")]
    InvalidPackedHeader { header: u8 },
}
