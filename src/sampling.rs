//! Uniform sampling of field elements and bits from a caller-owned generator.
//!
//! Nothing here keeps state between calls; the generator passed in is the
//! only source of entropy and advancing it is the only side effect.

use crate::Field;
use rand::distributions::{Distribution, Uniform};
use rand::Rng;

/// Draws a field element uniformly from `[0, p)`.
pub fn random_element<R: Rng + ?Sized>(field: &Field, rng: &mut R) -> u64 {
    rng.gen_range(0..field.modulus())
}

/// Draws a field element uniformly from `[1, p-1]`, never zero.
pub fn random_nonzero_element<R: Rng + ?Sized>(field: &Field, rng: &mut R) -> u64 {
    rng.gen_range(1..field.modulus())
}

/// Draws a single fair bit as `0` or `1`.
pub fn random_bit<R: Rng + ?Sized>(rng: &mut R) -> u64 {
    u64::from(rng.gen::<bool>())
}

/// Draws `n` independent fair bits, each `0` or `1`.
pub fn random_bits<R: Rng + ?Sized>(n: usize, rng: &mut R) -> Vec<u64> {
    let coin = Uniform::new_inclusive(0u64, 1);
    coin.sample_iter(rng).take(n).collect()
}

/// Draws an `n`-bit string.
pub fn random_bit_string<R: Rng + ?Sized>(n: usize, rng: &mut R) -> Vec<bool> {
    (0..n).map(|_| rng.gen::<bool>()).collect()
}

/// Draws `n` independent uniform field elements.
pub fn random_vector<R: Rng + ?Sized>(field: &Field, n: usize, rng: &mut R) -> Vec<u64> {
    let dist = Uniform::new(0, field.modulus());
    (0..n).map(|_| dist.sample(rng)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::SimplePrng;

    #[test]
    fn test_nonzero_never_zero_in_tiny_field() {
        let field = Field::new(3);
        let mut rng = SimplePrng::new(11);
        for _ in 0..1_000 {
            let x = random_nonzero_element(&field, &mut rng);
            assert!(x == 1 || x == 2);
        }
    }

    #[test]
    fn test_bits_are_binary_and_balanced() {
        let mut rng = SimplePrng::new(5);
        let bits = random_bits(10_000, &mut rng);
        assert_eq!(bits.len(), 10_000);
        assert!(bits.iter().all(|&b| b <= 1));
        let ones = bits.iter().sum::<u64>();
        assert!((4_700..=5_300).contains(&ones), "ones = {ones}");
        assert!(random_bit(&mut rng) <= 1);
    }

    #[test]
    fn test_vector_elements_canonical() {
        let field = Field::default();
        let mut rng = SimplePrng::new(9);
        let v = random_vector(&field, 64, &mut rng);
        assert_eq!(v.len(), 64);
        assert!(v.iter().all(|&x| field.is_canonical(x)));
        assert!(field.is_canonical(random_element(&field, &mut rng)));
        assert_eq!(random_bit_string(17, &mut rng).len(), 17);
    }
}
