use rand::Rng;

/// Draws from `[low, high)`. An empty range yields `low`.
pub fn uniform<R: Rng + ?Sized>(rng: &mut R, low: u32, high: u32) -> u32 {
    if high <= low { low } else { rng.gen_range(low..high) }
}

/// Same as [`uniform`] but over `u64`, for clock values.
pub fn uniform_u64<R: Rng + ?Sized>(rng: &mut R, low: u64, high: u64) -> u64 {
    if high <= low { low } else { rng.gen_range(low..high) }
}

pub fn uniform_index<R: Rng + ?Sized>(rng: &mut R, len: usize) -> usize {
    if len == 0 { 0 } else { rng.gen_range(0..len) }
}

/// Cosmetic connection weight in `[0, 1]`.
pub fn weight<R: Rng + ?Sized>(rng: &mut R) -> f32 {
    rng.gen_range(0.0..=1.0)
}

#[cfg(test)]
mod tests {
    use rand::{ rngs::StdRng, SeedableRng };

    use super::*;

    #[test]
    fn empty_range_returns_low() {
        let mut rng = StdRng::seed_from_u64(1);
        assert_eq!(uniform(&mut rng, 5, 5), 5);
        assert_eq!(uniform(&mut rng, 7, 2), 7);
        assert_eq!(uniform_u64(&mut rng, 9, 9), 9);
        assert_eq!(uniform_index(&mut rng, 0), 0);
    }

    #[test]
    fn upper_bound_is_exclusive() {
        let mut rng = StdRng::seed_from_u64(2);
        for _ in 0..1000 {
            let v = uniform(&mut rng, 3, 6);
            assert!((3..6).contains(&v));
            let w = weight(&mut rng);
            assert!((0.0..=1.0).contains(&w));
        }
    }
}
