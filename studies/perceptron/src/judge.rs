use serde::Deserialize;

use crate::data::ModuleData;
use crate::environment::Environment;
use crate::train::Millis;

/// When the pass/fail predicate is evaluated. Both give the same verdict since
/// the topology is frozen while training runs.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JudgeMode {
    #[default]
    AtSubmission,
    AtFinish,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    Pass,
    Fail,
}

impl Verdict {
    pub fn is_pass(self) -> bool {
        self == Verdict::Pass
    }
}

/// Thresholds of one instance, already scaled to the environment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SubmissionJudge {
    pub required_accuracy: u32,
    pub max_time: Millis,
}

impl SubmissionJudge {
    pub fn new(data: &ModuleData, environment: &Environment) -> SubmissionJudge {
        SubmissionJudge {
            required_accuracy: data.required_accuracy,
            max_time: environment.scale(data.max_learning_time),
        }
    }

    pub fn judge(&self, accuracy: u32, time: Millis) -> Verdict {
        if time <= self.max_time && accuracy >= self.required_accuracy {
            Verdict::Pass
        } else {
            Verdict::Fail
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn judge() -> SubmissionJudge {
        SubmissionJudge { required_accuracy: 21, max_time: 1000 }
    }

    #[test]
    fn both_thresholds_inclusive() {
        assert_eq!(judge().judge(21, 1000), Verdict::Pass);
        assert_eq!(judge().judge(40, 10), Verdict::Pass);
    }

    #[test]
    fn low_accuracy_fails_even_when_fast() {
        assert_eq!(judge().judge(20, 1), Verdict::Fail);
    }

    #[test]
    fn slow_training_fails_even_when_accurate() {
        assert_eq!(judge().judge(500, 1001), Verdict::Fail);
    }

    #[test]
    fn max_time_is_scaled_by_environment() {
        let data = ModuleData {
            inputs_count: 2,
            outputs_count: 2,
            required_accuracy: 21,
            max_learning_time: 12,
            convergence_rates: [500, 400, 300, 200, 100],
            answer_example: [1, 1, 1, 1],
            connections_delay: [150; 5],
        };
        let judge = SubmissionJudge::new(&data, &Environment::new(3, 1));
        assert_eq!(judge.max_time, 12 * 3 + 300);
    }

    #[test]
    fn mode_parses_from_snake_case() {
        #[derive(Deserialize)]
        struct Holder {
            mode: JudgeMode,
        }
        let holder: Holder = toml::from_str("mode = \"at_finish\"").unwrap();
        assert_eq!(holder.mode, JudgeMode::AtFinish);
    }
}
