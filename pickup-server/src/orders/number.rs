//! Order number generation
//!
//! Human-facing label, distinct from the internal id: a fixed prefix, the last
//! eight digits of the creation time in millis, and a four-digit random suffix
//! so that orders created within the same clock tick still get distinct
//! numbers.

use rand::Rng;

use crate::utils::now_millis;

pub const ORDER_NUMBER_PREFIX: &str = "BBQ";

pub fn generate() -> String {
    let millis = now_millis();
    let suffix: u16 = rand::thread_rng().gen_range(0..10_000);
    format!(
        "{ORDER_NUMBER_PREFIX}{:08}{suffix:04}",
        millis % 100_000_000
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn has_prefix_and_twelve_digits() {
        let number = generate();
        assert!(number.starts_with(ORDER_NUMBER_PREFIX));
        let digits = &number[ORDER_NUMBER_PREFIX.len()..];
        assert_eq!(digits.len(), 12);
        assert!(digits.chars().all(|c| c.is_ascii_digit()));
    }

    #[test]
    fn distinct_across_clock_ticks() {
        let first = generate();
        std::thread::sleep(std::time::Duration::from_millis(3));
        let second = generate();
        assert_ne!(first, second);
    }
}
