//! Multipart boundary generation.
//!
//! Tokens are 32 lowercase hex digits shaped like a version-4 UUID with the
//! hyphens removed. The random source is injected so tests can seed it.

use rand::Rng;
use rand::RngCore;
use rand::rngs::ThreadRng;

const HEX: &[u8; 16] = b"0123456789abcdef";

/// `x` is any hex digit, `y` is one of `8`, `9`, `a`, `b`.
const PATTERN: &[u8; 32] = b"xxxxxxxxxxxx4xxxyxxxxxxxxxxxxxxx";

/// Generator of random boundary tokens.
#[derive(Debug, Clone)]
pub struct BoundaryGenerator<R = ThreadRng> {
    rng: R,
}

impl BoundaryGenerator<ThreadRng> {
    /// Creates a generator backed by the thread-local RNG.
    #[must_use]
    pub fn new() -> Self {
        Self {
            rng: rand::thread_rng(),
        }
    }
}

impl Default for BoundaryGenerator<ThreadRng> {
    fn default() -> Self {
        Self::new()
    }
}

impl<R: RngCore> BoundaryGenerator<R> {
    /// Creates a generator backed by the given RNG.
    #[must_use]
    pub const fn with_rng(rng: R) -> Self {
        Self { rng }
    }

    /// Generates a 32-character token.
    #[must_use]
    pub fn token(&mut self) -> String {
        PATTERN
            .iter()
            .map(|&c| {
                let r: u8 = self.rng.gen_range(0..16);
                let v = match c {
                    b'x' => r,
                    b'y' => (r & 0x3) | 0x8,
                    _ => return char::from(c),
                };
                char::from(HEX[usize::from(v)])
            })
            .collect()
    }

    /// Generates a boundary: `prefix` followed by a fresh token.
    #[must_use]
    pub fn boundary(&mut self, prefix: &str) -> String {
        format!("{prefix}{}", self.token())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    #[test]
    fn test_token_shape() {
        let mut generator = BoundaryGenerator::new();
        for _ in 0..100 {
            let token = generator.token();
            assert_eq!(token.len(), 32);
            assert!(token.chars().all(|c| c.is_ascii_hexdigit() && !c.is_ascii_uppercase()));
            assert_eq!(&token[12..13], "4");
            assert!(matches!(&token[16..17], "8" | "9" | "a" | "b"));
        }
    }

    #[test]
    fn test_seeded_generator_is_deterministic() {
        let mut a = BoundaryGenerator::with_rng(StdRng::seed_from_u64(7));
        let mut b = BoundaryGenerator::with_rng(StdRng::seed_from_u64(7));
        assert_eq!(a.token(), b.token());
        assert_eq!(a.boundary("----="), b.boundary("----="));
    }

    #[test]
    fn test_boundary_prefix() {
        let mut generator = BoundaryGenerator::with_rng(StdRng::seed_from_u64(1));
        let boundary = generator.boundary("----=");
        assert!(boundary.starts_with("----="));
        assert_eq!(boundary.len(), 37);
    }

    #[test]
    fn test_tokens_differ() {
        let mut generator = BoundaryGenerator::with_rng(StdRng::seed_from_u64(42));
        assert_ne!(generator.token(), generator.token());
    }
}
