//! Trial-division prime search for hash-table sizing.
//!
//! Both hash maps size their tables to primes so the division method
//! (`hash % table_size`) spreads keys evenly. Growth doubles the current
//! size and rounds up to the next prime with this helper.

/// Returns the smallest prime `>= x`, with a floor of 3.
///
/// Odd-stepping trial division up to `sqrt(candidate)`. Fast enough for
/// table sizing, where it runs once per rehash on a value that at most
/// doubles each time.
///
/// # Example
///
/// ```
/// use tallykit::ds::next_prime;
///
/// assert_eq!(next_prime(0), 3);
/// assert_eq!(next_prime(19), 19);
/// assert_eq!(next_prime(20), 23);
/// assert_eq!(next_prime(202), 211);
/// ```
pub fn next_prime(x: usize) -> usize {
    if x <= 3 {
        return 3;
    }
    let mut candidate = if x % 2 == 0 { x + 1 } else { x };
    while !is_prime(candidate) {
        candidate += 2;
    }
    candidate
}

fn is_prime(n: usize) -> bool {
    debug_assert!(n >= 3 && n % 2 == 1);
    let mut i = 3usize;
    while i * i <= n {
        if n % i == 0 {
            return false;
        }
        i += 2;
    }
    true
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn small_inputs_floor_at_three() {
        assert_eq!(next_prime(0), 3);
        assert_eq!(next_prime(1), 3);
        assert_eq!(next_prime(2), 3);
        assert_eq!(next_prime(3), 3);
    }

    #[test]
    fn primes_are_fixed_points() {
        for p in [5, 7, 19, 41, 101, 211, 100003] {
            assert_eq!(next_prime(p), p);
        }
    }

    #[test]
    fn composites_round_up() {
        assert_eq!(next_prime(4), 5);
        assert_eq!(next_prime(6), 7);
        assert_eq!(next_prime(38), 41);
        assert_eq!(next_prime(100), 101);
        assert_eq!(next_prime(7918 * 2), 15859);
    }

    #[test]
    fn doubling_sequence_stays_prime() {
        // The growth path: repeatedly double and round up.
        let mut size = 19usize;
        for _ in 0..10 {
            size = next_prime(size * 2);
            assert_eq!(next_prime(size), size, "{size} should be prime");
        }
    }
}
