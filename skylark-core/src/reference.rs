use rand::Rng;

/// Alphabet booking references are drawn from: uppercase letters + digits.
const ALPHABET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";

/// Length of a generated reference code (e.g. "A7X29Z").
pub const REFERENCE_LENGTH: usize = 6;

/// Source of booking reference codes.
///
/// Generation is uncoordinated, so collisions are statistically rare but
/// possible. The store reports a duplicate on insert and the coordinator
/// retries with a fresh code; this trait exists so tests can script the
/// sequence.
pub trait ReferenceSource: Send + Sync {
    fn generate(&self) -> String;
}

/// Draws fixed-length PNR-style codes from the reference alphabet.
#[derive(Debug, Clone)]
pub struct PnrGenerator {
    length: usize,
}

impl PnrGenerator {
    pub fn new(length: usize) -> Self {
        Self { length }
    }
}

impl Default for PnrGenerator {
    fn default() -> Self {
        Self::new(REFERENCE_LENGTH)
    }
}

impl ReferenceSource for PnrGenerator {
    fn generate(&self) -> String {
        let mut rng = rand::thread_rng();
        (0..self.length)
            .map(|_| ALPHABET[rng.gen_range(0..ALPHABET.len())] as char)
            .collect()
    }
}
