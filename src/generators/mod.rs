//! Byte generators feeding the typed value transformers.
//!
//! A [`Generator`] maps input bytes to a fixed-size output:
//!
//! - [`RandomBytes`]: output independent of input
//! - [`KeyedHash`]: SHA-256 of a salt and the input, so equal inputs always mask to equal outputs
//! - [`HashReducer`]: truncates another generator's output to an exact length

mod hash;
mod random;
mod reducer;

use std::fmt;

use crate::error::{MaskingError, MaskingResult};

pub use hash::KeyedHash;
pub use random::RandomBytes;
pub use reducer::HashReducer;

/// Produces a size-bounded byte sequence from input bytes.
pub trait Generator: Send + Sync {
    fn generate(&self, data: &[u8]) -> MaskingResult<Vec<u8>>;

    /// Length of every output of [`Self::generate`].
    fn size(&self) -> usize;

    /// Whether equal inputs always produce equal outputs.
    fn is_deterministic(&self) -> bool;
}

impl<G: Generator + ?Sized> Generator for Box<G> {
    fn generate(&self, data: &[u8]) -> MaskingResult<Vec<u8>> {
        (**self).generate(data)
    }

    fn size(&self) -> usize {
        (**self).size()
    }

    fn is_deterministic(&self) -> bool {
        (**self).is_deterministic()
    }
}

/// Generation strategy of a registered transformer variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GeneratorKind {
    Random,
    Deterministic,
}

impl GeneratorKind {
    /// Prefix of the registered transformer name, e.g. `RandomInteger`.
    pub fn prefix(self) -> &'static str {
        match self {
            Self::Random => "Random",
            Self::Deterministic => "Deterministic",
        }
    }
}

impl fmt::Display for GeneratorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.prefix())
    }
}

/// Builds the generator for a transformer that needs `output_len` bytes per value.
///
/// - `Random` uses `seed` when given, otherwise OS entropy.
/// - `Deterministic` requires a hex-encoded `salt`; the digest is reduced to `output_len`.
pub fn build_generator(
    kind: GeneratorKind,
    seed: Option<u64>,
    salt: Option<&str>,
    output_len: usize,
) -> MaskingResult<Box<dyn Generator>> {
    match kind {
        GeneratorKind::Random => {
            let g = match seed {
                Some(seed) => RandomBytes::new(seed, output_len),
                None => RandomBytes::from_entropy(output_len),
            };
            Ok(Box::new(g))
        }
        GeneratorKind::Deterministic => {
            let salt = salt.ok_or_else(|| {
                MaskingError::Generator("deterministic transformers require a salt".to_string())
            })?;
            let hash = KeyedHash::from_hex_salt(salt)?;
            if hash.size() == output_len {
                return Ok(Box::new(hash));
            }
            Ok(Box::new(HashReducer::new(hash, output_len)?))
        }
    }
}
