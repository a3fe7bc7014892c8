//! Short identifier generation.
//!
//! Rows use 15-character random identifiers instead of auto-increment
//! integers so ids can be generated before insert and safely embedded in
//! component custom IDs. The alphabet omits the digit `0`.

use rand::Rng;

const ALPHABET: &[u8] = b"123456789abcdefghijklmnopqrstuvwxyzABCDEFGHIJKLMNOPQRSTUVWXYZ";

/// Length of every generated identifier.
pub const ID_LEN: usize = 15;

/// Generates a new random short identifier.
#[must_use]
pub fn generate() -> String {
    let mut rng = rand::thread_rng();
    (0..ID_LEN)
        .map(|_| {
            let idx = rng.gen_range(0..ALPHABET.len());
            ALPHABET[idx] as char
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generated_ids_have_fixed_length_and_alphabet() {
        for _ in 0..100 {
            let id = generate();
            assert_eq!(id.len(), ID_LEN);
            assert!(id.bytes().all(|b| ALPHABET.contains(&b)));
        }
    }

    #[test]
    fn test_generated_ids_are_distinct() {
        let a = generate();
        let b = generate();
        assert_ne!(a, b);
    }
}
