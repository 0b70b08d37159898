//! Rolling Rabin fingerprint over a sliding byte window.

use std::collections::HashMap;
use std::sync::{Arc, LazyLock, Mutex};

use log::debug;

use crate::polynomial::Polynomial;

/// Number of bytes in the rolling hash window.
pub const WINDOW_SIZE: usize = 64;

/// Per-polynomial lookup tables.
///
/// `out[b]` is the fingerprint of the window-sized byte sequence
/// `(b, 0, ..., 0)`. With `H(b_0 || ... || b_w)` known, XOR-ing `out[b_0]`
/// cancels every term contributed by `b_0`, which is how a byte leaves the
/// window without recomputing the whole fingerprint.
///
/// `modulo[b]` is `((b * x^k) mod pol) | (b * x^k)` with `k = deg(pol)`.
/// The digest update shifts eight new bits in; the eight bits pushed above
/// the degree select the table entry, whose low half is the reduced
/// remainder and whose high half cancels those top bits, so one XOR both
/// reduces the digest and clears the overflowed byte.
#[derive(Debug)]
pub(crate) struct Tables {
    pub(crate) out: [u64; 256],
    pub(crate) modulo: [u64; 256],
}

static TABLE_CACHE: LazyLock<Mutex<HashMap<Polynomial, Arc<Tables>>>> =
    LazyLock::new(|| Mutex::new(HashMap::new()));

impl Tables {
    /// Shared tables for `pol`, computed on first use and kept for the
    /// process lifetime.
    pub(crate) fn get(pol: Polynomial) -> Arc<Tables> {
        if let Some(tables) = TABLE_CACHE.lock().unwrap().get(&pol) {
            return tables.clone();
        }
        // Construction is pure, so losing a race to another thread just
        // wastes a rebuild; the first insert wins.
        let tables = Arc::new(Tables::build(pol));
        let mut cache = TABLE_CACHE.lock().unwrap();
        cache.entry(pol).or_insert(tables).clone()
    }

    fn build(pol: Polynomial) -> Tables {
        debug!("computing rabin tables for polynomial {:#x}", pol);
        let mut out = [0u64; 256];
        for (b, entry) in out.iter_mut().enumerate() {
            let mut hash = append_byte(Polynomial::ZERO, b as u8, pol);
            for _ in 0..WINDOW_SIZE - 1 {
                hash = append_byte(hash, 0, pol);
            }
            *entry = hash.bits();
        }
        let k = pol.degree();
        let mut modulo = [0u64; 256];
        for (b, entry) in modulo.iter_mut().enumerate() {
            let shifted = Polynomial::new((b as u64) << k);
            *entry = shifted.modulo(pol).bits() | shifted.bits();
        }
        Tables { out, modulo }
    }
}

// Append one byte to a fingerprint: (hash * x^8 + byte) mod pol.
fn append_byte(hash: Polynomial, byte: u8, pol: Polynomial) -> Polynomial {
    Polynomial::new((hash.bits() << 8) | u64::from(byte)).modulo(pol)
}

/// Rolling Rabin fingerprint of the trailing [`WINDOW_SIZE`] bytes of a
/// stream.
pub struct Rabin64 {
    window: [u8; WINDOW_SIZE],
    wpos: usize,
    digest: u64,
    pol_shift: u32,
    tables: Arc<Tables>,
}

impl Rabin64 {
    /// Create a hasher for the given irreducible polynomial.
    pub fn new(pol: Polynomial) -> Self {
        Rabin64 {
            window: [0; WINDOW_SIZE],
            wpos: 0,
            digest: 0,
            pol_shift: (pol.degree() - 8) as u32,
            tables: Tables::get(pol),
        }
    }

    /// Zero the window and the digest.
    pub fn reset(&mut self) {
        self.window = [0; WINDOW_SIZE];
        self.wpos = 0;
        self.digest = 0;
    }

    /// Slide `byte` into the window: the oldest byte drops out and the
    /// digest becomes the fingerprint of the new window content.
    #[inline]
    pub fn slide(&mut self, byte: u8) {
        let out = self.window[self.wpos];
        self.window[self.wpos] = byte;
        self.digest ^= self.tables.out[out as usize];
        self.wpos = (self.wpos + 1) % WINDOW_SIZE;

        let index = (self.digest >> self.pol_shift) as u8;
        self.digest <<= 8;
        self.digest |= u64::from(byte);
        self.digest ^= self.tables.modulo[index as usize];
    }

    /// The current fingerprint.
    #[inline]
    pub fn sum(&self) -> u64 {
        self.digest
    }
}
