use crate::data::ModuleData;
use crate::environment::Environment;
use crate::judge::{ SubmissionJudge, Verdict };
use crate::scoring::{ Sizes, HIDDEN_LAYERS, MAX_NODES };

/// How every possible topology of an instance fares against its thresholds.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct Census {
    pub low_accuracy_in_time: usize,
    pub low_accuracy_over_time: usize,
    pub passing: usize,
    pub accurate_over_time: usize,
    pub solutions: Vec<Sizes>,
}

impl Census {
    pub fn total(&self) -> usize {
        self.low_accuracy_in_time + self.low_accuracy_over_time + self.passing + self.accurate_over_time
    }

    pub fn share(&self, count: usize) -> f64 {
        let total = self.total();
        if total == 0 { 0.0 } else { (count as f64) * 100.0 / (total as f64) }
    }
}

/// All 4^4 hidden layer combinations, in lexicographic order.
pub fn all_topologies() -> impl Iterator<Item = Sizes> {
    let per_layer = MAX_NODES as usize;
    (0..per_layer.pow(HIDDEN_LAYERS as u32)).map(move |code| {
        let mut sizes = [0; HIDDEN_LAYERS];
        let mut rest = code;
        for size in sizes.iter_mut().rev() {
            *size = (rest % per_layer) as u32 + 1;
            rest /= per_layer;
        }
        sizes
    })
}

pub fn census(data: &ModuleData, environment: &Environment) -> Census {
    let judge = SubmissionJudge::new(data, environment);
    let mut census = Census::default();
    for sizes in all_topologies() {
        let accuracy = data.accuracy(&sizes);
        let time = environment.scale(data.learning_time(&sizes));
        let in_time = time <= judge.max_time;
        match (accuracy >= judge.required_accuracy, in_time) {
            (false, true) => {
                census.low_accuracy_in_time += 1;
            }
            (false, false) => {
                census.low_accuracy_over_time += 1;
            }
            (true, false) => {
                census.accurate_over_time += 1;
            }
            (true, true) => {
                debug_assert_eq!(judge.judge(accuracy, time), Verdict::Pass);
                census.passing += 1;
                census.solutions.push(sizes);
            }
        }
    }
    census
}
