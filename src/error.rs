pub enum Error {
    /// A polynomial multiplication would overflow 64 bits.
    Overflow,
    /// No irreducible polynomial was found within the try limit.
    NoPolynomial,
    /// Reading from the chunker source failed.
    Io(std::io::Error),
}

impl std::error::Error for Error {}

impl From<std::io::Error> for Error {
    fn from(e: std::io::Error) -> Self {
        Self::Io(e)
    }
}

impl std::fmt::Debug for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Error::Overflow => write!(f, "Overflow"),
            Error::NoPolynomial => write!(f, "NoPolynomial"),
            Error::Io(e) => write!(f, "Io({:?})", e),
        }
    }
}

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Error::Overflow => write!(f, "polynomial multiplication would overflow"),
            Error::NoPolynomial => write!(f, "no irreducible polynomial found"),
            Error::Io(e) => write!(f, "i/o error: {}", e),
        }
    }
}
