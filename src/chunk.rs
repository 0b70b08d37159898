#![allow(clippy::len_without_is_empty)]
use bytes::Bytes;

/// A single chunk cut from a byte stream.
///
/// Carries the stream offset where the chunk starts, the Rabin digest at
/// the cut point and the chunk bytes. The bytes are owned by the chunk and
/// reference counted, so cloning is cheap.
#[derive(Debug, Clone, PartialEq)]
pub struct Chunk {
    pub(crate) start: u64,
    pub(crate) cut: u64,
    pub(crate) data: Bytes,
}

impl Chunk {
    /// Offset of the first byte of this chunk within the stream.
    #[inline]
    pub fn start(&self) -> u64 {
        self.start
    }
    /// Size of chunk.
    #[inline]
    pub fn len(&self) -> usize {
        self.data.len()
    }
    /// Digest value at the cut point.
    #[inline]
    pub fn cut(&self) -> u64 {
        self.cut
    }
    /// Chunk data.
    #[inline]
    pub fn data(&self) -> &[u8] {
        &self.data[..]
    }
    #[inline]
    pub fn into_inner(self) -> Bytes {
        self.data
    }
}
