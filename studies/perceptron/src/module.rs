use std::fmt;

use log::info;
use rand::Rng;

use crate::data::ModuleData;
use crate::display::{ format_factor, format_time, DisplayPanel };
use crate::environment::Environment;
use crate::judge::{ JudgeMode, SubmissionJudge, Verdict };
use crate::scoring::{ Sizes, CONNECTION_LAYERS };
use crate::topology::TopologyEditor;
use crate::train::{ Millis, Readout, TrainingSimulator, WeightUpdate };

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    /// Generated but not yet activated by the host.
    #[default]
    Idle,
    Configuring,
    Running,
    Finished(Verdict),
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Stage::Idle => write!(f, "Idle"),
            Stage::Configuring => write!(f, "Configuring"),
            Stage::Running => write!(f, "Training"),
            Stage::Finished(Verdict::Pass) => write!(f, "Solved"),
            Stage::Finished(Verdict::Fail) => write!(f, "Failed"),
        }
    }
}

/// What the host must react to: a solve signal or a strike.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModuleEvent {
    Solved,
    Strike,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Submission {
    pub target_accuracy: u32,
    pub target_time: Millis,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConnectionInfo {
    pub convergence_rate: u32,
    pub connection_delay: u32,
}

#[derive(Debug, Default, Clone, Copy, PartialEq)]
pub struct Frame {
    pub touched: Option<WeightUpdate>,
    pub readout: Option<Readout>,
    pub event: Option<ModuleEvent>,
}

/// One perceptron puzzle. Every input is a plain method call; inputs that are
/// not valid in the current stage do nothing and report so through their
/// return value.
#[derive(Debug)]
pub struct PerceptronModule<R: Rng> {
    id: u32,
    rng: R,
    data: ModuleData,
    environment: Environment,
    judge: SubmissionJudge,
    mode: JudgeMode,
    topology: TopologyEditor,
    training: Option<TrainingSimulator>,
    foreordained: Option<Verdict>,
    stage: Stage,
    display: DisplayPanel,
    holding: Option<usize>,
}

impl<R: Rng> PerceptronModule<R> {
    /// Generates a fresh instance with a random starting topology.
    pub fn new(id: u32, mut rng: R, environment: Environment, mode: JudgeMode) -> Self {
        let data = ModuleData::generate(&mut rng);
        let topology = TopologyEditor::random(&mut rng, data.inputs_count, data.outputs_count);
        Self::assemble(id, rng, data, environment, mode, topology)
    }

    /// Wraps an existing instance, starting from the given hidden layer sizes.
    pub fn with_data(
        id: u32,
        mut rng: R,
        data: ModuleData,
        environment: Environment,
        mode: JudgeMode,
        hidden_layers: Sizes
    ) -> Self {
        let topology = TopologyEditor::new(
            &mut rng,
            data.inputs_count,
            data.outputs_count,
            hidden_layers
        );
        Self::assemble(id, rng, data, environment, mode, topology)
    }

    fn assemble(
        id: u32,
        rng: R,
        data: ModuleData,
        environment: Environment,
        mode: JudgeMode,
        topology: TopologyEditor
    ) -> Self {
        let judge = SubmissionJudge::new(&data, &environment);
        PerceptronModule {
            id,
            rng,
            data,
            environment,
            judge,
            mode,
            topology,
            training: None,
            foreordained: None,
            stage: Stage::Idle,
            display: DisplayPanel::default(),
            holding: None,
        }
    }

    pub fn activate(&mut self) -> bool {
        if self.stage != Stage::Idle {
            return false;
        }
        self.log_instance();
        self.display.show_idle(&self.judge);
        self.stage = Stage::Configuring;
        true
    }

    pub fn edit_hidden_layer(&mut self, layer: usize) -> Option<u32> {
        if self.stage != Stage::Configuring {
            return None;
        }
        self.topology.edit_layer(&mut self.rng, layer)
    }

    pub fn inspect_connection_layer(&mut self, layer: usize) -> Option<ConnectionInfo> {
        if self.stage != Stage::Configuring || layer >= CONNECTION_LAYERS {
            return None;
        }
        let info = ConnectionInfo {
            convergence_rate: self.data.convergence_rates[layer],
            connection_delay: self.data.connections_delay[layer],
        };
        self.display.show_connection(info.convergence_rate, info.connection_delay);
        self.holding = Some(layer);
        Some(info)
    }

    pub fn release_connection_layer(&mut self) -> bool {
        if self.stage != Stage::Configuring {
            return false;
        }
        self.holding = None;
        self.display.show_idle(&self.judge);
        true
    }

    pub fn submit(&mut self, now: Millis) -> Option<Submission> {
        if self.stage != Stage::Configuring {
            return None;
        }
        let sizes = *self.topology.hidden_layers();
        info!("[Perceptron #{}] Start training: {}", self.id, join_digits(&sizes));

        let target_accuracy = self.data.accuracy(&sizes);
        let target_time = self.environment.scale(self.data.learning_time(&sizes));
        self.training = Some(
            TrainingSimulator::start(
                &mut self.rng,
                &self.topology,
                target_accuracy,
                target_time,
                now
            )
        );
        self.foreordained = match self.mode {
            JudgeMode::AtSubmission => Some(self.judge.judge(target_accuracy, target_time)),
            JudgeMode::AtFinish => None,
        };
        self.holding = None;
        self.display.show_idle(&self.judge);
        self.display.show_training(0, 0);
        self.stage = Stage::Running;
        Some(Submission { target_accuracy, target_time })
    }

    /// One host tick.
    pub fn advance(&mut self, now: Millis) -> Frame {
        let running = matches!(self.stage, Stage::Running | Stage::Finished(Verdict::Pass));
        let training = match self.training.as_mut() {
            Some(training) if running => training,
            _ => {
                return Frame::default();
            }
        };
        let tick = training.advance(&mut self.rng, &mut self.topology, now);
        let event = match tick.readout {
            Some(Readout::Training { accuracy, elapsed }) => {
                self.display.show_training(accuracy, elapsed);
                None
            }
            Some(Readout::Finished { accuracy, time }) => Some(self.finish(accuracy, time)),
            None => None,
        };
        Frame { touched: tick.touched, readout: tick.readout, event }
    }

    fn finish(&mut self, accuracy: u32, time: Millis) -> ModuleEvent {
        self.display.show_training(accuracy, time);
        info!(
            "[Perceptron #{}] Training finished. Accuracy: {}. Spent time: {}",
            self.id,
            accuracy,
            format_time(time)
        );
        let verdict = self.foreordained.take().unwrap_or_else(|| self.judge.judge(accuracy, time));
        self.stage = Stage::Finished(verdict);
        match verdict {
            Verdict::Pass => {
                info!("[Perceptron #{}] Module solved", self.id);
                ModuleEvent::Solved
            }
            Verdict::Fail => {
                info!("[Perceptron #{}] Strike", self.id);
                ModuleEvent::Strike
            }
        }
    }

    /// Leaves a failed training so the topology can be changed again.
    pub fn reset(&mut self) -> bool {
        if self.stage != Stage::Finished(Verdict::Fail) {
            return false;
        }
        self.training = None;
        self.display.show_idle(&self.judge);
        self.stage = Stage::Configuring;
        true
    }

    /// The single screen button: submits while configuring, resets after a
    /// failed training.
    pub fn press_screen(&mut self, now: Millis) -> bool {
        match self.stage {
            Stage::Configuring => self.submit(now).is_some(),
            Stage::Finished(Verdict::Fail) => self.reset(),
            _ => false,
        }
    }

    fn log_instance(&self) {
        let data = &self.data;
        info!("[Perceptron #{}] Required learning accuracy: {}", self.id, data.required_accuracy);
        info!("[Perceptron #{}] Max training time: {}", self.id, format_time(self.judge.max_time));
        info!("[Perceptron #{}] Inputs count: {}", self.id, data.inputs_count);
        info!("[Perceptron #{}] Outputs count: {}", self.id, data.outputs_count);
        info!(
            "[Perceptron #{}] Convergence rates: {}",
            self.id,
            join_factors(&data.convergence_rates)
        );
        info!(
            "[Perceptron #{}] Connection delays: {}",
            self.id,
            join_factors(&data.connections_delay)
        );
        info!("[Perceptron #{}] Answer example: {}", self.id, join_digits(&data.answer_example));
    }

    pub fn id(&self) -> u32 {
        self.id
    }

    pub fn stage(&self) -> Stage {
        self.stage
    }

    pub fn is_solved(&self) -> bool {
        self.stage == Stage::Finished(Verdict::Pass)
    }

    pub fn data(&self) -> &ModuleData {
        &self.data
    }

    pub fn environment(&self) -> &Environment {
        &self.environment
    }

    pub fn judge(&self) -> &SubmissionJudge {
        &self.judge
    }

    pub fn topology(&self) -> &TopologyEditor {
        &self.topology
    }

    pub fn training(&self) -> Option<&TrainingSimulator> {
        self.training.as_ref()
    }

    pub fn display(&self) -> &DisplayPanel {
        &self.display
    }

    pub fn holding(&self) -> Option<usize> {
        self.holding
    }
}

pub fn join_digits(sizes: &Sizes) -> String {
    sizes.iter().map(u32::to_string).collect()
}

fn join_factors(values: &[u32]) -> String {
    values
        .iter()
        .map(|value| format_factor(*value))
        .collect::<Vec<_>>()
        .join(", ")
}

#[cfg(test)]
mod tests {
    use rand::{ rngs::StdRng, SeedableRng };

    use super::*;

    fn sample_data(required_accuracy: u32, max_learning_time: u32) -> ModuleData {
        ModuleData {
            inputs_count: 2,
            outputs_count: 2,
            required_accuracy,
            max_learning_time,
            convergence_rates: [500, 400, 300, 200, 100],
            answer_example: [1, 1, 1, 1],
            connections_delay: [150; 5],
        }
    }

    fn module(data: ModuleData, mode: JudgeMode) -> PerceptronModule<StdRng> {
        let mut module = PerceptronModule::with_data(
            7,
            StdRng::seed_from_u64(99),
            data,
            Environment::new(2, 1),
            mode,
            [1, 1, 1, 1]
        );
        assert!(module.activate());
        module
    }

    fn run_to_end(module: &mut PerceptronModule<StdRng>, start: Millis) -> Vec<ModuleEvent> {
        let mut events = Vec::new();
        let mut now = start;
        while module.stage() == Stage::Running {
            now += 16;
            events.extend(module.advance(now).event);
        }
        for _ in 0..10 {
            now += 16;
            events.extend(module.advance(now).event);
        }
        events
    }

    #[test]
    fn inputs_are_ignored_before_activation() {
        let mut module = PerceptronModule::new(
            1,
            StdRng::seed_from_u64(1),
            Environment::default(),
            JudgeMode::AtSubmission
        );
        assert_eq!(module.stage(), Stage::Idle);
        assert_eq!(module.edit_hidden_layer(0), None);
        assert_eq!(module.inspect_connection_layer(0), None);
        assert_eq!(module.submit(0), None);
        assert!(module.activate());
        assert!(!module.activate());
        assert_eq!(module.stage(), Stage::Configuring);
    }

    #[test]
    fn submission_targets_use_current_topology() {
        let mut module = module(sample_data(21, 12), JudgeMode::AtSubmission);
        let submission = module.submit(1_000).unwrap();
        assert_eq!(submission.target_accuracy, 21);
        // 12 raw units on two modules plus one indicator
        assert_eq!(submission.target_time, 12 * 2 + 300);
        assert_eq!(module.stage(), Stage::Running);
    }

    #[test]
    fn passing_run_signals_once_and_keeps_sweeping() {
        for mode in [JudgeMode::AtSubmission, JudgeMode::AtFinish] {
            let mut module = module(sample_data(21, 12), mode);
            module.submit(0).unwrap();
            assert_eq!(run_to_end(&mut module, 0), vec![ModuleEvent::Solved]);
            assert!(module.is_solved());
            assert_eq!(module.display().current_accuracy, "21");
            assert_eq!(module.display().current_time, "0.324");
            assert!(module.advance(100_000).touched.is_some());
            assert!(!module.reset());
        }
    }

    #[test]
    fn low_accuracy_fails_despite_fast_time() {
        for mode in [JudgeMode::AtSubmission, JudgeMode::AtFinish] {
            let mut module = module(sample_data(22, 500), mode);
            module.submit(0).unwrap();
            assert_eq!(run_to_end(&mut module, 0), vec![ModuleEvent::Strike]);
            assert_eq!(module.stage(), Stage::Finished(Verdict::Fail));
            // a failed run stops sweeping
            assert_eq!(module.advance(100_000), Frame::default());
        }
    }

    #[test]
    fn editing_and_inspecting_blocked_until_reset() {
        let mut module = module(sample_data(22, 500), JudgeMode::AtSubmission);
        module.submit(0).unwrap();
        assert_eq!(module.edit_hidden_layer(0), None);
        assert_eq!(module.inspect_connection_layer(0), None);
        assert!(!module.release_connection_layer());
        assert!(!module.reset());
        assert_eq!(module.submit(5), None);

        run_to_end(&mut module, 0);
        assert_eq!(module.edit_hidden_layer(0), None);
        assert!(module.press_screen(0));
        assert_eq!(module.stage(), Stage::Configuring);
        assert_eq!(module.edit_hidden_layer(0), Some(2));
        assert_eq!(module.data().required_accuracy, 22);
    }

    #[test]
    fn inspect_shows_layer_factors() {
        let mut module = module(sample_data(21, 12), JudgeMode::AtSubmission);
        let info = module.inspect_connection_layer(1).unwrap();
        assert_eq!(info, ConnectionInfo { convergence_rate: 400, connection_delay: 150 });
        assert_eq!(module.display().convergence_rate, "4.00");
        assert_eq!(module.display().connection_delay, "1.50");
        assert_eq!(module.holding(), Some(1));
        assert_eq!(module.inspect_connection_layer(5), None);
        assert!(module.release_connection_layer());
        assert_eq!(module.display().convergence_rate, "/");
        assert_eq!(module.display().required_accuracy, "21");
    }

    #[test]
    fn resubmission_after_fail_can_pass() {
        let mut module = module(sample_data(22, 500), JudgeMode::AtFinish);
        module.submit(0).unwrap();
        run_to_end(&mut module, 0);
        assert!(module.reset());
        module.edit_hidden_layer(0);
        let submission = module.submit(10_000).unwrap();
        // ways [4, 2, 1, 1, 2]: 20 + 8 + 3 + 2 + 2
        assert_eq!(submission.target_accuracy, 35);
        assert_eq!(run_to_end(&mut module, 10_000), vec![ModuleEvent::Solved]);
    }
}
