use crate::chunker::config::{AverageBits, ChunkerConfig};
use crate::polynomial::Polynomial;
use crate::rolling_hash::{Rabin64, WINDOW_SIZE};

/// Result of one scan call.
pub(crate) struct Scan {
    /// Bytes consumed from the input slice.
    pub(crate) consumed: usize,
    /// Digest at the cut point, when a boundary was found.
    pub(crate) cut: Option<u64>,
}

/// Scans a byte stream for content-defined cut points.
///
/// The scanner walks one chunk at a time. Callers feed the stream through
/// [`scan`](Self::scan) in whatever slices their buffering produces; cut
/// decisions depend only on the byte stream and the configuration, never
/// on how the input was sliced.
pub(crate) struct BoundaryScanner {
    hasher: Rabin64,
    split_mask: u64,
    min_size: usize,
    max_size: usize,
    /// Bytes at the head of each chunk consumed without fingerprinting.
    /// Keeping the hash window out of this region is what guarantees the
    /// minimum chunk size.
    dismiss: usize,
    /// Bytes consumed into the current chunk so far.
    count: usize,
}

impl BoundaryScanner {
    pub(crate) fn new(pol: Polynomial, config: &ChunkerConfig) -> Self {
        let mut scanner = BoundaryScanner {
            hasher: Rabin64::new(pol),
            split_mask: config.average_bits.mask(),
            min_size: config.min_chunk_size,
            max_size: config.max_chunk_size,
            dismiss: config.min_chunk_size - WINDOW_SIZE,
            count: 0,
        };
        scanner.begin_chunk();
        scanner
    }

    /// Prepare for the first byte of a new chunk.
    pub(crate) fn begin_chunk(&mut self) {
        self.hasher.reset();
        // Seed the window with a single one byte so that a chunk starting
        // with zero bytes still leaves the all-zero fingerprint state.
        self.hasher.slide(1);
        self.count = 0;
    }

    /// Change the split mask for subsequent scanning.
    pub(crate) fn set_average_bits(&mut self, average_bits: AverageBits) {
        self.split_mask = average_bits.mask();
    }

    /// Current rolling digest; the cut value of a trailing chunk.
    pub(crate) fn digest(&self) -> u64 {
        self.hasher.sum()
    }

    /// Advance through `input`, reporting how many bytes were consumed and
    /// the cut digest if the chunk ended there. After a cut the scanner is
    /// already prepared for the next chunk.
    pub(crate) fn scan(&mut self, input: &[u8]) -> Scan {
        let mut consumed = 0;
        if self.count < self.dismiss {
            // Dismiss phase: bytes this far below the minimum can never
            // contain a cut, so they bypass the rolling hash entirely.
            consumed = usize::min(self.dismiss - self.count, input.len());
            self.count += consumed;
        }
        while consumed < input.len() {
            self.hasher.slide(input[consumed]);
            consumed += 1;
            self.count += 1;
            if self.count < self.min_size {
                continue;
            }
            if self.hasher.sum() & self.split_mask == 0 || self.count >= self.max_size {
                let digest = self.hasher.sum();
                self.begin_chunk();
                return Scan {
                    consumed,
                    cut: Some(digest),
                };
            }
        }
        Scan {
            consumed,
            cut: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const POL: Polynomial = Polynomial::new(0x3DA3358B4DC173);

    fn config(bits: u32, min: usize, max: usize) -> ChunkerConfig {
        ChunkerConfig::new(AverageBits::from_bits(bits), min, max)
    }

    #[test]
    fn zero_input_cuts_at_min_with_zero_digest() {
        // An all-zero window fingerprints to zero, so the split mask
        // matches as soon as cutting becomes legal.
        let mut scanner = BoundaryScanner::new(POL, &config(13, 4096, 65536));
        let input = vec![0u8; 3 * 4096];
        let scan = scanner.scan(&input);
        assert_eq!(scan.consumed, 4096);
        assert_eq!(scan.cut, Some(0));
    }

    #[test]
    fn max_size_forces_a_cut() {
        // A mask this wide practically never matches, leaving the maximum
        // size as the only cut trigger.
        let mut scanner = BoundaryScanner::new(POL, &config(62, 128, 1024));
        let input: Vec<u8> = (0..4096).map(|i| (i * 31 + 7) as u8).collect();
        let scan = scanner.scan(&input);
        assert_eq!(scan.consumed, 1024);
        assert!(scan.cut.is_some());
    }

    #[test]
    fn slicing_does_not_change_the_cut() {
        let input: Vec<u8> = (0..32768).map(|i| (i * 131 + 89) as u8).collect();
        let mut whole = BoundaryScanner::new(POL, &config(8, 64, 16384));
        let expected = whole.scan(&input);

        let mut sliced = BoundaryScanner::new(POL, &config(8, 64, 16384));
        let mut consumed = 0;
        let mut cut = None;
        for piece in input.chunks(7) {
            let scan = sliced.scan(piece);
            consumed += scan.consumed;
            if scan.cut.is_some() {
                cut = scan.cut;
                break;
            }
        }
        assert_eq!(consumed, expected.consumed);
        assert_eq!(cut, expected.cut);
    }
}
