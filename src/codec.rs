use crate::{BitBuffer, BitSlice, CodecError};

/// A successful decode of a single value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Decoded<T> {
    /// The decoded value.
    pub value: T,
    /// Bits consumed from the front of the input.
    pub consumed: usize,
}

/// Decodes a single value from the front of a bit slice.
///
/// Implementations must return [`CodecError::InsufficientBits`], and only
/// that, when the slice is too short to hold a whole value, so that the
/// interpreter can buffer and retry once more input arrives. Any other error
/// is treated as a genuine decode failure.
pub trait Decode {
    /// The decoded value type.
    type Item;

    /// Decode one value, reporting how many bits it consumed.
    fn decode(&self, bits: &BitSlice) -> Result<Decoded<Self::Item>, CodecError>;
}

/// Encodes a single value into a bit buffer.
pub trait Encode {
    /// The encoded value type.
    type Item;

    /// Encode one value into its bit representation.
    fn encode(&self, item: &Self::Item) -> Result<BitBuffer, CodecError>;
}

impl<D: Decode + ?Sized> Decode for &D {
    type Item = D::Item;

    fn decode(&self, bits: &BitSlice) -> Result<Decoded<Self::Item>, CodecError> {
        (**self).decode(bits)
    }
}

impl<E: Encode + ?Sized> Encode for &E {
    type Item = E::Item;

    fn encode(&self, item: &Self::Item) -> Result<BitBuffer, CodecError> {
        (**self).encode(item)
    }
}
