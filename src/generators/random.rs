use std::fmt;
use std::sync::Mutex;

use rand::rngs::StdRng;
use rand::{RngCore, SeedableRng};

use crate::error::{MaskingError, MaskingResult};

use super::Generator;

/// Random bytes, independent of the input.
///
/// The RNG sits behind a mutex so one generator can serve transformers shared across threads.
pub struct RandomBytes {
    rng: Mutex<StdRng>,
    size: usize,
}

impl RandomBytes {
    /// Seeded generator; the same seed yields the same output sequence.
    pub fn new(seed: u64, size: usize) -> Self {
        Self {
            rng: Mutex::new(StdRng::seed_from_u64(seed)),
            size,
        }
    }

    pub fn from_entropy(size: usize) -> Self {
        Self {
            rng: Mutex::new(StdRng::from_os_rng()),
            size,
        }
    }
}

impl fmt::Debug for RandomBytes {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RandomBytes").field("size", &self.size).finish()
    }
}

impl Generator for RandomBytes {
    fn generate(&self, _data: &[u8]) -> MaskingResult<Vec<u8>> {
        let mut out = vec![0u8; self.size];
        let mut rng = self
            .rng
            .lock()
            .map_err(|_| MaskingError::Generator("random generator mutex poisoned".to_string()))?;
        rng.fill_bytes(&mut out);
        Ok(out)
    }

    fn size(&self) -> usize {
        self.size
    }

    fn is_deterministic(&self) -> bool {
        false
    }
}
