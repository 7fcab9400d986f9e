use sha2::{Digest, Sha256};

use crate::error::{MaskingError, MaskingResult};

use super::Generator;

const DIGEST_LEN: usize = 32;

/// Salted SHA-256 of the input. A pure function of `(salt, input)`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyedHash {
    salt: Vec<u8>,
}

impl KeyedHash {
    pub fn new(salt: impl Into<Vec<u8>>) -> Self {
        Self { salt: salt.into() }
    }

    pub fn from_hex_salt(salt: &str) -> MaskingResult<Self> {
        let salt = hex::decode(salt.trim())
            .map_err(|e| MaskingError::Generator(format!("salt is not valid hex: {e}")))?;
        Ok(Self::new(salt))
    }
}

impl Generator for KeyedHash {
    fn generate(&self, data: &[u8]) -> MaskingResult<Vec<u8>> {
        let mut hasher = Sha256::new();
        hasher.update(&self.salt);
        hasher.update(data);
        Ok(hasher.finalize().to_vec())
    }

    fn size(&self) -> usize {
        DIGEST_LEN
    }

    fn is_deterministic(&self) -> bool {
        true
    }
}

#[cfg(test)]
mod tests {
    use super::KeyedHash;
    use crate::generators::Generator;

    #[test]
    fn digest_depends_on_salt_and_input() {
        let a = KeyedHash::new(b"k1".to_vec());
        let b = KeyedHash::new(b"k2".to_vec());
        assert_eq!(a.generate(b"x").unwrap().len(), 32);
        assert_eq!(a.generate(b"x").unwrap(), a.generate(b"x").unwrap());
        assert_ne!(a.generate(b"x").unwrap(), a.generate(b"y").unwrap());
        assert_ne!(a.generate(b"x").unwrap(), b.generate(b"x").unwrap());
    }

    #[test]
    fn hex_salt_is_decoded() {
        assert_eq!(
            KeyedHash::from_hex_salt("6b31").unwrap(),
            KeyedHash::new(b"k1".to_vec())
        );
        assert!(KeyedHash::from_hex_salt("zz").is_err());
    }
}
