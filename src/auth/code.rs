//! Verification codes: short human-readable strings mailed to the user.

use rand::Rng;

const CODE_ALPHABET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";
const CODE_LENGTH: usize = 6;

/// Source of single-use verification codes. A trait seam so a stronger
/// randomness source can be swapped in without touching the auth service.
pub trait CodeGenerator: Send + Sync {
    fn generate(&self) -> String;
}

/// Uniform draw from `A-Z0-9` using the thread-local RNG. Codes are scoped to
/// the owning account; no cross-account uniqueness is enforced.
#[derive(Debug, Default, Clone)]
pub struct AlphanumericCodeGenerator;

impl CodeGenerator for AlphanumericCodeGenerator {
    fn generate(&self) -> String {
        let mut rng = rand::thread_rng();
        (0..CODE_LENGTH)
            .map(|_| CODE_ALPHABET[rng.gen_range(0..CODE_ALPHABET.len())] as char)
            .collect()
    }
}
