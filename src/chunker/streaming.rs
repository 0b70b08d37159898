use std::pin::Pin;
use std::task::{Context, Poll};

use bytes::BytesMut;
use futures_util::{ready, FutureExt, Stream};
use tokio::{
    io::{AsyncRead, AsyncReadExt},
    pin,
};

use super::config::ChunkerConfig;
use super::scan::BoundaryScanner;
use super::CHUNKER_BUF_SIZE;
use crate::chunk::Chunk;
use crate::error::Error;
use crate::polynomial::Polynomial;

/// A streaming chunker to use with any source which implements tokio
/// `AsyncRead`.
///
/// Emits the same chunk sequence as [`Chunker`](super::Chunker) would for
/// the same input, as a [`Stream`].
pub struct StreamingChunker<R> {
    scanner: BoundaryScanner,
    reader: R,
    buf: BytesMut,
    scanned: usize,
    chunk_start: u64,
    closed: bool,
}

impl<R> StreamingChunker<R> {
    /// Create a streaming chunker with the default boundaries.
    pub fn new(reader: R, pol: Polynomial) -> Self {
        Self::with_config(reader, pol, ChunkerConfig::default())
    }

    /// Create a streaming chunker with the given configuration.
    pub fn with_config(reader: R, pol: Polynomial, config: ChunkerConfig) -> Self {
        StreamingChunker {
            scanner: BoundaryScanner::new(pol, &config),
            reader,
            buf: BytesMut::with_capacity(CHUNKER_BUF_SIZE),
            scanned: 0,
            chunk_start: 0,
            closed: false,
        }
    }

    fn emit(&mut self, cut: u64) -> Chunk {
        let chunk = Chunk {
            start: self.chunk_start,
            cut,
            data: self.buf.split_to(self.scanned).freeze(),
        };
        self.scanned = 0;
        self.chunk_start += chunk.len() as u64;
        chunk
    }
}

impl<R> Stream for StreamingChunker<R>
where
    R: AsyncRead + Unpin + Send,
{
    type Item = Result<Chunk, Error>;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        loop {
            let me = &mut *self;
            if me.scanned < me.buf.len() {
                let scan = me.scanner.scan(&me.buf[me.scanned..]);
                me.scanned += scan.consumed;
                if let Some(digest) = scan.cut {
                    return Poll::Ready(Some(Ok(me.emit(digest))));
                }
            }
            if me.closed {
                return Poll::Ready(None);
            }
            // Append more data to buffer since no boundary was found.
            if me.buf.capacity() < me.buf.len() + CHUNKER_BUF_SIZE {
                me.buf.reserve(CHUNKER_BUF_SIZE);
            }
            let read_f = me.reader.read_buf(&mut me.buf);
            pin!(read_f);
            match ready!(read_f.poll_unpin(cx))? {
                0 => {
                    // End of source. Return a last chunk if there is data
                    // left in the buffer.
                    me.closed = true;
                    if me.buf.is_empty() {
                        return Poll::Ready(None);
                    }
                    let digest = me.scanner.digest();
                    me.scanner.begin_chunk();
                    me.scanned = me.buf.len();
                    return Poll::Ready(Some(Ok(me.emit(digest))));
                }
                _rc => {}
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::cmp;
    use std::io;

    use futures_util::StreamExt;
    use tokio::io::ReadBuf;

    use super::*;
    use crate::chunker::{AverageBits, Chunker};

    const POL: Polynomial = Polynomial::new(0x3DA3358B4DC173);

    fn config() -> ChunkerConfig {
        ChunkerConfig::new(AverageBits::from_bits(10), 64, 8192)
    }

    fn source_data() -> Vec<u8> {
        let mut seed: usize = 0xa3;
        (0..100_000)
            .map(|v| {
                seed ^= seed.wrapping_mul(4);
                (seed ^ v) as u8
            })
            .collect()
    }

    // The MockSource will return bytes_per_read bytes every other read
    // and Pending every other, to replicate a source with limited I/O.
    struct MockSource {
        data: Vec<u8>,
        offset: usize,
        bytes_per_read: usize,
        pending: bool,
    }

    impl MockSource {
        fn new(data: Vec<u8>, bytes_per_read: usize) -> Self {
            Self {
                data,
                offset: 0,
                bytes_per_read,
                pending: false,
            }
        }
    }

    impl AsyncRead for MockSource {
        fn poll_read(
            mut self: Pin<&mut Self>,
            cx: &mut Context<'_>,
            buf: &mut ReadBuf<'_>,
        ) -> Poll<io::Result<()>> {
            let data_available = self.data.len() - self.offset;
            if data_available == 0 {
                Poll::Ready(Ok(()))
            } else if self.pending {
                self.pending = false;
                cx.waker().wake_by_ref();
                Poll::Pending
            } else {
                let read = cmp::min(
                    data_available,
                    cmp::min(buf.remaining(), self.bytes_per_read),
                );
                buf.put_slice(&self.data[self.offset..self.offset + read]);
                self.offset += read;
                self.pending = true;
                Poll::Ready(Ok(()))
            }
        }
    }

    #[tokio::test]
    async fn matches_blocking_chunker() {
        let data = source_data();
        let expected: Vec<(u64, usize, u64)> =
            Chunker::with_config(data.as_slice(), POL, config())
                .map(|result| {
                    let chunk = result.unwrap();
                    (chunk.start(), chunk.len(), chunk.cut())
                })
                .collect();
        let chunks: Vec<(u64, usize, u64)> =
            StreamingChunker::with_config(data.as_slice(), POL, config())
                .map(|result| {
                    let chunk = result.unwrap();
                    (chunk.start(), chunk.len(), chunk.cut())
                })
                .collect()
                .await;
        assert!(!chunks.is_empty());
        assert_eq!(expected, chunks);
    }

    #[tokio::test]
    async fn single_byte_per_source_read() {
        let data = source_data();
        let expected: Vec<(u64, usize)> =
            StreamingChunker::with_config(data.as_slice(), POL, config())
                .map(|result| {
                    let chunk = result.unwrap();
                    (chunk.start(), chunk.len())
                })
                .collect()
                .await;
        // Only give back a single byte per read from source, should still
        // result in the same chunks as with unlimited I/O.
        let source = MockSource::new(data, 1);
        let chunks: Vec<(u64, usize)> = StreamingChunker::with_config(source, POL, config())
            .map(|result| {
                let chunk = result.unwrap();
                (chunk.start(), chunk.len())
            })
            .collect()
            .await;
        assert_eq!(expected, chunks);
    }

    #[tokio::test]
    async fn zero_data() {
        static SRC: [u8; 0] = [];
        let chunks: Vec<Result<Chunk, Error>> =
            StreamingChunker::with_config(&SRC[..], POL, config())
                .collect()
                .await;
        assert!(chunks.is_empty());
    }

    #[tokio::test]
    async fn source_smaller_than_min_chunk() {
        static SRC: [u8; 5] = [0x1f, 0x55, 0x39, 0x5e, 0xfa];
        let chunks: Vec<Chunk> = StreamingChunker::with_config(&SRC[..], POL, config())
            .map(|result| result.unwrap())
            .collect()
            .await;
        assert_eq!(chunks.len(), 1);
        assert_eq!(chunks[0].start(), 0);
        assert_eq!(chunks[0].data(), &SRC[..]);
    }
}
