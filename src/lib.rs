//! Content-defined chunking of byte streams using rolling Rabin
//! fingerprints over GF(2)[X].
//!
//! A [`Chunker`] partitions a byte stream into variable-size chunks whose
//! boundaries depend on the stream content rather than on absolute
//! positions: the trailing 64 bytes are fingerprinted against a random
//! irreducible polynomial of degree 53, and the stream is cut wherever the
//! fingerprint matches the split mask within the configured size window.
//! Local insertions or deletions therefore only perturb nearby chunks,
//! which is the property deduplicating backup and storage systems build
//! on.
//!
//! ```no_run
//! use std::fs::File;
//!
//! use rabin_chunker::{Chunker, Polynomial};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let pol = Polynomial::random(&mut rand::thread_rng())?;
//! let mut chunker = Chunker::new(File::open("big.img")?, pol);
//! while let Some(chunk) = chunker.next_chunk()? {
//!     println!("{:>10} {:>9} {:#018x}", chunk.start(), chunk.len(), chunk.cut());
//! }
//! # Ok(())
//! # }
//! ```

mod chunk;
pub mod chunker;
mod error;
pub mod polynomial;
mod rolling_hash;

pub use chunk::Chunk;
pub use chunker::{Chunker, ChunkerConfig, StreamingChunker};
pub use error::Error;
pub use polynomial::Polynomial;
pub use rolling_hash::{Rabin64, WINDOW_SIZE};
