//! Polynomials over GF(2), packed into 64-bit words.

use std::fmt;

use rand::RngCore;

use crate::Error;

/// Maximum number of candidates drawn by [`Polynomial::random`] before
/// giving up.
const MAX_RANDOM_TRIES: usize = 1_000_000;

/// A polynomial over GF(2).
///
/// Bit `i` of the packed word holds the coefficient of `x^i`. Addition is
/// carryless (XOR) and so is multiplication, which is what makes these
/// polynomials usable as rolling Rabin fingerprints. Values are cheap to
/// copy and every operation returns a new value.
#[derive(Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Polynomial(u64);

impl Polynomial {
    /// The zero polynomial.
    pub const ZERO: Polynomial = Polynomial(0);
    /// The polynomial `x`.
    pub const X: Polynomial = Polynomial(2);

    /// Create a polynomial from its packed coefficient word.
    pub const fn new(bits: u64) -> Self {
        Polynomial(bits)
    }

    /// The packed coefficient word.
    pub const fn bits(self) -> u64 {
        self.0
    }

    /// Degree of the polynomial, or -1 for the zero polynomial.
    pub fn degree(self) -> i32 {
        63 - self.0.leading_zeros() as i32
    }

    /// Sum of two polynomials.
    #[must_use]
    pub fn add(self, other: Self) -> Self {
        Polynomial(self.0 ^ other.0)
    }

    /// Product of two polynomials.
    ///
    /// Returns [`Error::Overflow`] when the true product does not fit in
    /// 64 bits.
    pub fn mul(self, other: Self) -> Result<Self, Error> {
        if self.mul_overflows(other) {
            return Err(Error::Overflow);
        }
        Ok(self.mul_unchecked(other))
    }

    // Carryless multiply, silently truncated to 64 bits.
    fn mul_unchecked(self, other: Self) -> Self {
        let mut product = 0;
        let mut rest = other.0;
        while rest != 0 {
            let i = rest.trailing_zeros();
            product ^= self.0 << i;
            rest &= rest - 1;
        }
        Polynomial(product)
    }

    // Whether `self * other` exceeds 64 bits. Dividing the truncated
    // product by `other` must give back `self`; truncation destroys that
    // relation, so no wide multiply is needed (Pike's trick).
    fn mul_overflows(self, other: Self) -> bool {
        if self.0 <= 1 || other.0 <= 1 {
            return false;
        }
        self.mul_unchecked(other).div(other) != self
    }

    /// Quotient and remainder of `self / d`, with `deg(r) < deg(d)`.
    ///
    /// Panics when `d` is the zero polynomial.
    pub fn divmod(self, d: Self) -> (Self, Self) {
        assert!(d != Self::ZERO, "polynomial division by zero");
        if self == Self::ZERO {
            return (Self::ZERO, Self::ZERO);
        }
        let ddeg = d.degree();
        let mut q = 0u64;
        let mut r = self.0;
        let mut diff = Polynomial(r).degree() - ddeg;
        while diff >= 0 {
            q |= 1u64 << diff;
            r ^= d.0 << diff;
            diff = Polynomial(r).degree() - ddeg;
        }
        (Polynomial(q), Polynomial(r))
    }

    /// Quotient of `self / d`.
    #[must_use]
    pub fn div(self, d: Self) -> Self {
        self.divmod(d).0
    }

    /// Remainder of `self / d`.
    #[must_use]
    pub fn modulo(self, d: Self) -> Self {
        self.divmod(d).1
    }

    /// Greatest common divisor of `self` and `other`.
    pub fn gcd(self, other: Self) -> Self {
        if other == Self::ZERO {
            return self;
        }
        if self == Self::ZERO {
            return other;
        }
        if self.degree() < other.degree() {
            return other.gcd(self);
        }
        other.gcd(self.modulo(other))
    }

    /// `(self * other) mod modulus`, without ever materializing an
    /// overflowing intermediate product.
    pub fn mul_mod(self, other: Self, modulus: Self) -> Self {
        let mut product = Self::ZERO;
        let mut shifted = self.modulo(modulus);
        let mut rest = other.0;
        while rest != 0 {
            if rest & 1 != 0 {
                product = product.add(shifted);
            }
            rest >>= 1;
            // `shifted` stays reduced, so the shift cannot overflow.
            shifted = Polynomial(shifted.0 << 1).modulo(modulus);
        }
        product
    }

    // (x^(2^p) + x) mod g: start from x, square p times under g, then add
    // x back in.
    fn qp(p: i32, g: Self) -> Self {
        let mut res = Self::X;
        for _ in 0..p {
            res = res.mul_mod(res, g);
        }
        res.add(Self::X).modulo(g)
    }

    /// Irreducibility test after Ben-Or.
    ///
    /// `f` is irreducible iff `gcd(f, x^(2^i) - x mod f) == 1` for every
    /// `i` from 1 to `deg(f) / 2`.
    pub fn irreducible(self) -> bool {
        for i in 1..=self.degree() / 2 {
            if self.gcd(Self::qp(i, self)) != Polynomial(1) {
                return false;
            }
        }
        true
    }

    /// Derive a random irreducible polynomial of degree 53 from the given
    /// entropy source.
    ///
    /// Roughly 7.5% of the drawn candidates are irreducible, so the try
    /// limit is unreachable in practice; [`Error::NoPolynomial`] is
    /// returned if it ever is hit.
    pub fn random<R: RngCore + ?Sized>(rng: &mut R) -> Result<Self, Error> {
        for _ in 0..MAX_RANDOM_TRIES {
            // Mask away everything above bit 53, then force the degree to
            // exactly 53 and a non-zero constant term.
            let bits = (rng.next_u64() & ((1u64 << 54) - 1)) | (1u64 << 53) | 1;
            let candidate = Polynomial(bits);
            if candidate.irreducible() {
                return Ok(candidate);
            }
        }
        Err(Error::NoPolynomial)
    }
}

impl From<u64> for Polynomial {
    fn from(bits: u64) -> Self {
        Polynomial(bits)
    }
}

impl From<Polynomial> for u64 {
    fn from(pol: Polynomial) -> Self {
        pol.0
    }
}

impl fmt::LowerHex for Polynomial {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::LowerHex::fmt(&self.0, f)
    }
}

impl fmt::Debug for Polynomial {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Polynomial({:#x})", self.0)
    }
}

/// Writes the polynomial in its expanded `x^53+x^52+...+x+1` form.
impl fmt::Display for Polynomial {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0 == 0 {
            return f.write_str("0");
        }
        let mut first = true;
        for i in (0..=self.degree()).rev() {
            if (self.0 >> i) & 1 == 0 {
                continue;
            }
            if !first {
                f.write_str("+")?;
            }
            first = false;
            match i {
                0 => f.write_str("1")?,
                1 => f.write_str("x")?,
                _ => write!(f, "x^{}", i)?,
            }
        }
        Ok(())
    }
}
