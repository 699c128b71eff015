//! ULIDs for tagging batch runs in logs.
//!
//! Every batch call takes a fresh id so its per-pair warnings and summary
//! line can be correlated.

use ulid::Ulid;

/// Fresh, time-ordered, 26-character id.
#[inline]
pub fn generate() -> String {
    Ulid::new().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generate_returns_unique_values() {
        let a = generate();
        let b = generate();
        assert_ne!(a, b);
        assert_eq!(a.len(), 26);
    }
}
