//! Byte View Module
//!
//! Defines the immutable byte payload stored in the cache.

use bytes::Bytes;

use crate::cache::Measured;

// == Byte View ==
/// An immutable view over a cached byte sequence.
///
/// Values are opaque bytes so any payload (strings, serialized structs,
/// images) can be cached. Cloning is cheap (reference counted) and the
/// underlying bytes can never be mutated through a view, so readers are
/// isolated from the stored entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ByteView {
    bytes: Bytes,
}

impl ByteView {
    // == Constructor ==
    /// Creates a view over the given bytes.
    pub fn new(bytes: impl Into<Bytes>) -> Self {
        Self {
            bytes: bytes.into(),
        }
    }

    // == As Bytes ==
    /// Returns the underlying bytes without copying.
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    // == To Vec ==
    /// Returns an independent copy of the bytes.
    pub fn to_vec(&self) -> Vec<u8> {
        self.bytes.to_vec()
    }

    // == To String ==
    /// Renders the bytes as a string, replacing invalid UTF-8.
    pub fn to_string_lossy(&self) -> String {
        String::from_utf8_lossy(&self.bytes).into_owned()
    }
}

impl Measured for ByteView {
    fn byte_len(&self) -> usize {
        self.bytes.len()
    }
}

impl From<Vec<u8>> for ByteView {
    fn from(bytes: Vec<u8>) -> Self {
        Self::new(bytes)
    }
}

impl From<&str> for ByteView {
    fn from(s: &str) -> Self {
        Self::new(s.as_bytes().to_vec())
    }
}
