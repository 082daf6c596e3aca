use rand::rngs::OsRng;
use rand::RngCore;

/// Number of random bytes behind every session token (256 bits).
pub const TOKEN_BYTES: usize = 32;

/// Source of opaque session tokens.
pub trait TokenGenerator: Send + Sync {
    fn generate(&self) -> String;
}

/// Hex-encoded tokens read from the operating system's secure random source.
#[derive(Debug, Clone, Copy, Default)]
pub struct RandomTokenGenerator;

impl TokenGenerator for RandomTokenGenerator {
    fn generate(&self) -> String {
        let mut bytes = [0u8; TOKEN_BYTES];
        OsRng.fill_bytes(&mut bytes);
        hex::encode(bytes)
    }
}
