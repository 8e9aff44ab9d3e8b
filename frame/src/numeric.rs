//! FILENAME: frame/src/numeric.rs
//! PURPOSE: Small stateless numeric helpers.

/// Rounds `number` to the given count of decimal places.
/// Negative `places` rounds to the left of the decimal point.
pub fn round_to(number: f64, places: i32) -> f64 {
    let factor = 10f64.powi(places);
    (number * factor).round() / factor
}

/// Trial-division primality test. 0 and 1 are not prime.
pub fn is_prime(number: u64) -> bool {
    if number < 2 {
        return false;
    }
    if number < 4 {
        return true;
    }
    if number % 2 == 0 {
        return false;
    }
    // Bound compared by division: squaring the candidate overflows u64
    // for inputs near u64::MAX
    let mut candidate = 3;
    while candidate <= number / candidate {
        if number % candidate == 0 {
            return false;
        }
        candidate += 2;
    }
    true
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_round_to_places() {
        assert_eq!(round_to(2.34567, 2), 2.35);
        assert_eq!(round_to(2.34444, 3), 2.344);
        assert_eq!(round_to(1234.5, -2), 1200.0);
        assert_eq!(round_to(5.0, 0), 5.0);
    }

    #[test]
    fn test_is_prime_small_numbers() {
        assert!(!is_prime(0));
        assert!(!is_prime(1));
        assert!(is_prime(2));
        assert!(is_prime(3));
        assert!(!is_prime(4));
        assert!(is_prime(5));
        assert!(!is_prime(9));
    }

    #[test]
    fn test_is_prime_larger_numbers() {
        assert!(is_prime(7919));
        assert!(!is_prime(7917));
        assert!(!is_prime(25));
        assert!(!is_prime(121));
    }

    #[test]
    fn test_is_prime_near_the_u64_boundary() {
        // Largest 64-bit prime; trial division walks candidates past 2^32
        assert!(is_prime(18_446_744_073_709_551_557));
        assert!(!is_prime(u64::MAX));
    }
}
