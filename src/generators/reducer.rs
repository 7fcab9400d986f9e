use crate::error::{MaskingError, MaskingResult};

use super::Generator;

/// Truncates an inner generator's output to exactly `size` bytes.
///
/// Keeps the first `size` bytes, e.g. to reduce a 32-byte digest to the 8 bytes an integer
/// transformer consumes.
#[derive(Debug)]
pub struct HashReducer<G> {
    inner: G,
    size: usize,
}

impl<G: Generator> HashReducer<G> {
    /// Fails when `size` is zero or exceeds the inner generator's size.
    pub fn new(inner: G, size: usize) -> MaskingResult<Self> {
        if size == 0 || size > inner.size() {
            return Err(MaskingError::Generator(format!(
                "cannot reduce a {}-byte generator to {size} bytes",
                inner.size()
            )));
        }
        Ok(Self { inner, size })
    }
}

impl<G: Generator> Generator for HashReducer<G> {
    fn generate(&self, data: &[u8]) -> MaskingResult<Vec<u8>> {
        let mut out = self.inner.generate(data)?;
        if out.len() < self.size {
            return Err(MaskingError::Generator(format!(
                "inner generator returned {} bytes, {} required",
                out.len(),
                self.size
            )));
        }
        out.truncate(self.size);
        Ok(out)
    }

    fn size(&self) -> usize {
        self.size
    }

    fn is_deterministic(&self) -> bool {
        self.inner.is_deterministic()
    }
}
