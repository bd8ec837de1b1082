//! Shared numeric helpers for the hash-map implementations.

mod prime;

pub use prime::next_prime;
