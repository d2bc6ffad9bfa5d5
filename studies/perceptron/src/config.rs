use std::{ fs, io, path::{ Path, PathBuf } };

use rand::{ rngs::StdRng, SeedableRng };
use serde::Deserialize;

use crate::environment::Environment;
use crate::error::ConfigError;
use crate::judge::JudgeMode;

/// Settings of a perceptron session, read from a TOML file.
///
/// ```toml
/// seed = 1234
/// judge_mode = "at_finish"
/// tick_interval_ms = 16
///
/// [environment]
/// active_modules = 11
/// indicators = 2
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PerceptronConfig {
    pub seed: Option<u64>,
    pub judge_mode: JudgeMode,
    pub tick_interval_ms: u64,
    pub inspect_hold_ms: u64,
    pub environment: Option<Environment>,
    pub log_file: Option<PathBuf>,
}

impl Default for PerceptronConfig {
    fn default() -> Self {
        PerceptronConfig {
            seed: None,
            judge_mode: JudgeMode::default(),
            tick_interval_ms: 16,
            inspect_hold_ms: 3000,
            environment: None,
            log_file: None,
        }
    }
}

impl PerceptronConfig {
    /// Reads `path`; a missing file gives the defaults.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        match fs::read_to_string(path) {
            Ok(contents) => Self::parse(&contents),
            Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(Self::default()),
            Err(source) => Err(ConfigError::Io { path: path.to_path_buf(), source }),
        }
    }

    pub fn parse(contents: &str) -> Result<Self, ConfigError> {
        let config: PerceptronConfig = toml::from_str(contents)?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.tick_interval_ms == 0 {
            return Err(ConfigError::Invalid {
                field: "tick_interval_ms",
                reason: "must be at least 1".to_string(),
            });
        }
        if let Some(environment) = &self.environment {
            if environment.active_modules == 0 {
                return Err(ConfigError::Invalid {
                    field: "environment.active_modules",
                    reason: "a bomb holds at least this module".to_string(),
                });
            }
        }
        Ok(())
    }

    pub fn rng(&self) -> StdRng {
        match self.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        }
    }

    /// The configured environment, or a mock one drawn from `rng`.
    pub fn environment(&self, rng: &mut StdRng) -> Environment {
        self.environment.unwrap_or_else(|| Environment::mock(rng))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_file_gives_defaults() {
        assert_eq!(PerceptronConfig::parse("").unwrap(), PerceptronConfig::default());
    }

    #[test]
    fn full_file_parses() {
        let config = PerceptronConfig::parse(
            r#"
            seed = 1234
            judge_mode = "at_finish"
            tick_interval_ms = 20
            inspect_hold_ms = 500
            log_file = "perceptron.log"

            [environment]
            active_modules = 11
            indicators = 2
            "#
        ).unwrap();
        assert_eq!(config.seed, Some(1234));
        assert_eq!(config.judge_mode, JudgeMode::AtFinish);
        assert_eq!(config.tick_interval_ms, 20);
        assert_eq!(config.inspect_hold_ms, 500);
        assert_eq!(config.environment, Some(Environment::new(11, 2)));
        assert_eq!(config.log_file, Some(PathBuf::from("perceptron.log")));
    }

    #[test]
    fn rejects_zero_tick_interval() {
        let err = PerceptronConfig::parse("tick_interval_ms = 0").unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { field: "tick_interval_ms", .. }));
    }

    #[test]
    fn rejects_unknown_keys() {
        assert!(matches!(PerceptronConfig::parse("speed = 3"), Err(ConfigError::Parse(_))));
    }

    #[test]
    fn missing_file_gives_defaults() {
        let config = PerceptronConfig::load("does/not/exist/perceptron.toml").unwrap();
        assert_eq!(config, PerceptronConfig::default());
    }

    #[test]
    fn same_seed_same_instance() {
        let config = PerceptronConfig { seed: Some(5), ..PerceptronConfig::default() };
        let mut a = config.rng();
        let mut b = config.rng();
        assert_eq!(config.environment(&mut a), config.environment(&mut b));
    }
}
