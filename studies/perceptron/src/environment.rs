use rand::Rng;
use serde::Deserialize;

/// Time penalty each indicator adds to a scaled learning time.
pub const INDICATOR_TIME: u64 = 300;

/// Host-supplied facts that stretch raw learning times into milliseconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct Environment {
    pub active_modules: u32,
    pub indicators: u32,
}

impl Default for Environment {
    fn default() -> Self {
        Environment { active_modules: 1, indicators: 0 }
    }
}

impl Environment {
    pub fn new(active_modules: u32, indicators: u32) -> Environment {
        Environment { active_modules, indicators }
    }

    /// Draws a plausible environment for stand-alone runs.
    pub fn mock<R: Rng + ?Sized>(rng: &mut R) -> Environment {
        let mut indicators = 0;
        for _ in 0..rng.gen_range(5..=8) {
            if rng.gen_range(0..=3) == 0 {
                indicators += 1;
            }
        }
        let modules: u32 = rng.gen_range(2..=8);
        let active_modules = modules * rng.gen_range(modules..=modules * 2) * 2 - 1;
        Environment { active_modules, indicators }
    }

    pub fn scale(&self, time: u32) -> u64 {
        (time as u64) * (self.active_modules as u64) + (self.indicators as u64) * INDICATOR_TIME
    }
}

#[cfg(test)]
mod tests {
    use rand::{ rngs::StdRng, SeedableRng };

    use super::*;

    #[test]
    fn scale_multiplies_then_offsets() {
        let env = Environment::new(11, 2);
        assert_eq!(env.scale(12), 12 * 11 + 600);
        assert_eq!(Environment::default().scale(12), 12);
    }

    #[test]
    fn mock_stays_in_range() {
        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..500 {
            let env = Environment::mock(&mut rng);
            assert!(env.indicators <= 8);
            // smallest: 2 * 2 * 2 - 1, largest: 8 * 16 * 2 - 1
            assert!((7..=255).contains(&env.active_modules));
            assert_eq!(env.active_modules % 2, 1);
        }
    }
}
