use crate::error::{MaskingError, MaskingResult};
use crate::generators::Generator;

use super::limiter::Int64Limiter;

/// Bytes of generator output consumed per integer value.
pub const INT64_GENERATOR_LENGTH: usize = 8;

/// Typed integer value generator.
///
/// Turns raw input bytes into a replacement integer inside a caller-supplied [`Int64Limiter`].
/// The limiter is an explicit argument so dynamic-mode callers can pass a per-row one.
pub struct Int64Transformer {
    generator: Box<dyn Generator>,
}

impl Int64Transformer {
    pub fn new(generator: Box<dyn Generator>) -> MaskingResult<Self> {
        if generator.size() < INT64_GENERATOR_LENGTH {
            return Err(MaskingError::Generator(format!(
                "int64 transformer needs at least {INT64_GENERATOR_LENGTH} bytes of generator output, got {}",
                generator.size()
            )));
        }
        Ok(Self { generator })
    }

    /// Generates an integer in `[limiter.min(), limiter.max()]` from `original`.
    ///
    /// Deterministic generators map a single draw so equal inputs stay equal. Other generators
    /// redraw until the value is uniform over the range.
    pub fn generate(&self, original: &[u8], limiter: &Int64Limiter) -> MaskingResult<i64> {
        if self.generator.is_deterministic() {
            return Ok(limiter.limit(self.draw(original)?));
        }
        loop {
            if let Some(v) = limiter.limit_unbiased(self.draw(original)?) {
                return Ok(v);
            }
        }
    }

    fn draw(&self, original: &[u8]) -> MaskingResult<u64> {
        let bytes = self.generator.generate(original)?;
        let head: [u8; INT64_GENERATOR_LENGTH] = bytes
            .get(..INT64_GENERATOR_LENGTH)
            .and_then(|b| b.try_into().ok())
            .ok_or_else(|| {
                MaskingError::Generator(format!(
                    "generator returned {} bytes, {INT64_GENERATOR_LENGTH} required",
                    bytes.len()
                ))
            })?;
        Ok(u64::from_le_bytes(head))
    }

    /// Like [`Self::generate`], encoding the result as decimal text.
    pub fn transform(&self, original: &[u8], limiter: &Int64Limiter) -> MaskingResult<Vec<u8>> {
        self.generate(original, limiter)
            .map(|v| v.to_string().into_bytes())
    }
}

#[cfg(test)]
mod tests {
    use super::Int64Transformer;
    use crate::generators::{HashReducer, KeyedHash, RandomBytes};
    use crate::transformers::limiter::{Int64Limiter, IntWidth};

    #[test]
    fn rejects_short_generators() {
        let g = HashReducer::new(KeyedHash::new(Vec::new()), 4).unwrap();
        assert!(Int64Transformer::new(Box::new(g)).is_err());
    }

    #[test]
    fn random_values_stay_in_range() {
        let t = Int64Transformer::new(Box::new(RandomBytes::new(3, 8))).unwrap();
        let l = Int64Limiter::new(-5, 5, IntWidth::Int2).unwrap();
        for _ in 0..500 {
            let v = t.generate(b"", &l).unwrap();
            assert!((-5..=5).contains(&v));
        }
    }

    #[test]
    fn random_values_are_uniform_over_a_non_power_of_two_range() {
        // A single modulo draw would put 3/4 of the values below 2^62 instead of 2/3.
        let t = Int64Transformer::new(Box::new(RandomBytes::new(1, 8))).unwrap();
        let l = Int64Limiter::new(0, 3 * (1i64 << 61) - 1, IntWidth::Int8).unwrap();
        let draws = 200_000;
        let low = (0..draws)
            .filter(|_| t.generate(b"", &l).unwrap() < 1i64 << 62)
            .count();
        let share = low as f64 / draws as f64;
        assert!((share - 2.0 / 3.0).abs() < 0.01, "share below 2^62 was {share}");
    }

    #[test]
    fn keyed_values_are_stable_and_textual() {
        let g = HashReducer::new(KeyedHash::new(b"pepper".to_vec()), 8).unwrap();
        let t = Int64Transformer::new(Box::new(g)).unwrap();
        let l = Int64Limiter::new(10, 20, IntWidth::Int4).unwrap();

        let a = t.transform(b"12345", &l).unwrap();
        let b = t.transform(b"12345", &l).unwrap();
        assert_eq!(a, b);
        let v: i64 = String::from_utf8(a).unwrap().parse().unwrap();
        assert!((10..=20).contains(&v));
    }
}
