//! Content-defined chunking of byte streams.
//!
//! A chunker consumes a byte source and emits [`Chunk`]s whose boundaries
//! are decided by a rolling Rabin fingerprint of the trailing 64 bytes:
//! wherever the fingerprint matches the split mask, and the chunk size is
//! within the configured window, the stream is cut. Equal content
//! therefore produces equal cuts no matter where it sits in the stream.
mod config;
mod scan;
mod streaming;

pub use config::{
    AverageBits, ChunkerConfig, DEFAULT_AVERAGE_BITS, DEFAULT_MAX_CHUNK_SIZE,
    DEFAULT_MIN_CHUNK_SIZE,
};
pub use streaming::StreamingChunker;

use std::io::Read;

use bytes::BytesMut;

use crate::chunk::Chunk;
use crate::error::Error;
use crate::polynomial::Polynomial;
use scan::BoundaryScanner;

/// Size of the read-ahead buffer, 512 KiB.
const CHUNKER_BUF_SIZE: usize = 512 * 1024;

/// Pull-style content-defined chunker over a blocking byte source.
///
/// Bytes are read ahead into an internal buffer; each call to
/// [`next_chunk`](Self::next_chunk) consumes from the buffer (refilling as
/// needed, which may block in the source) until a chunk boundary is found.
/// The chunker also implements [`Iterator`] over `Result<Chunk, Error>`.
pub struct Chunker<R> {
    scanner: BoundaryScanner,
    source: R,
    buf: Box<[u8]>,
    bpos: usize,
    bmax: usize,
    pending: BytesMut,
    start: u64,
    closed: bool,
}

impl<R: Read> Chunker<R> {
    /// Create a chunker with the default boundaries: 512 KiB minimum,
    /// 8 MiB maximum, 1 MiB average chunk size.
    ///
    /// `pol` must be an irreducible polynomial of degree 53, typically
    /// from [`Polynomial::random`].
    pub fn new(source: R, pol: Polynomial) -> Self {
        Self::with_config(source, pol, ChunkerConfig::default())
    }

    /// Create a chunker with the given minimum and maximum chunk sizes.
    pub fn with_boundaries(source: R, pol: Polynomial, min: usize, max: usize) -> Self {
        Self::with_config(source, pol, ChunkerConfig::with_boundaries(min, max))
    }

    /// Create a chunker with the given configuration.
    pub fn with_config(source: R, pol: Polynomial, config: ChunkerConfig) -> Self {
        Chunker {
            scanner: BoundaryScanner::new(pol, &config),
            source,
            buf: vec![0; CHUNKER_BUF_SIZE].into_boxed_slice(),
            bpos: 0,
            bmax: 0,
            pending: BytesMut::new(),
            start: 0,
            closed: false,
        }
    }

    /// Change the split mask width for subsequent scanning.
    pub fn set_average_bits(&mut self, bits: u32) {
        self.scanner.set_average_bits(AverageBits::from_bits(bits));
    }

    /// Restore the chunker to its post-construction state with a new
    /// source, reusing the read-ahead buffer.
    pub fn reset(&mut self, source: R, pol: Polynomial) {
        self.reset_with_config(source, pol, ChunkerConfig::default());
    }

    /// Like [`reset`](Self::reset) but overriding the size window.
    pub fn reset_with_boundaries(&mut self, source: R, pol: Polynomial, min: usize, max: usize) {
        self.reset_with_config(source, pol, ChunkerConfig::with_boundaries(min, max));
    }

    /// Like [`reset`](Self::reset) with an explicit configuration.
    pub fn reset_with_config(&mut self, source: R, pol: Polynomial, config: ChunkerConfig) {
        self.scanner = BoundaryScanner::new(pol, &config);
        self.source = source;
        self.bpos = 0;
        self.bmax = 0;
        self.pending.clear();
        self.start = 0;
        self.closed = false;
    }

    /// Pull the next chunk from the source.
    ///
    /// Returns `Ok(Some(chunk))` for every chunk of the stream and
    /// `Ok(None)` once the source is exhausted; further calls keep
    /// returning `Ok(None)` until [`reset`](Self::reset). The trailing
    /// chunk may be shorter than the configured minimum and carries the
    /// rolling digest at end of stream as its cut value. Each chunk owns
    /// its bytes.
    ///
    /// Source errors are propagated and leave the chunker in an undefined
    /// state; call [`reset`](Self::reset) before continuing after one.
    pub fn next_chunk(&mut self) -> Result<Option<Chunk>, Error> {
        loop {
            if self.bpos == self.bmax {
                if !self.closed {
                    let n = self.source.read(&mut self.buf)?;
                    self.bpos = 0;
                    self.bmax = n;
                    if n == 0 {
                        self.closed = true;
                    }
                }
                if self.closed {
                    // Trailing chunk: whatever accumulated since the last
                    // cut, with the current digest as its cut value.
                    if self.pending.is_empty() {
                        return Ok(None);
                    }
                    let chunk = self.emit(self.scanner.digest());
                    self.scanner.begin_chunk();
                    return Ok(Some(chunk));
                }
            }
            let scan = self.scanner.scan(&self.buf[self.bpos..self.bmax]);
            self.pending
                .extend_from_slice(&self.buf[self.bpos..self.bpos + scan.consumed]);
            self.bpos += scan.consumed;
            if let Some(digest) = scan.cut {
                return Ok(Some(self.emit(digest)));
            }
        }
    }

    fn emit(&mut self, cut: u64) -> Chunk {
        let chunk = Chunk {
            start: self.start,
            cut,
            data: self.pending.split().freeze(),
        };
        self.start += chunk.len() as u64;
        chunk
    }
}

impl<R: Read> Iterator for Chunker<R> {
    type Item = Result<Chunk, Error>;

    fn next(&mut self) -> Option<Self::Item> {
        self.next_chunk().transpose()
    }
}
