//! Text command front-end driving a module through its public inputs only.

use std::{ str::FromStr, sync::OnceLock };

use log::debug;
use rand::Rng;
use regex::Regex;

use crate::display::format_factor;
use crate::error::CommandError;
use crate::judge::Verdict;
use crate::module::{ ModuleEvent, PerceptronModule, Stage };
use crate::scoring::{ Sizes, CONNECTION_LAYERS, HIDDEN_LAYERS };
use crate::train::Millis;

/// Pause between two layer button presses of a `set` command.
const PRESS_INTERVAL: Millis = 100;

pub const HELP: &str = concat!(
    "\"cycle\" - view all connections' info | ",
    "\"inspect 012\" - view specific connections' info: 0 - between input and 1st layer, ..., 4 - between 4th and output layer | ",
    "\"set 1234\" - set hidden layers' sizes | ",
    "\"train\" - start training | ",
    "\"submit 1234\" - set hidden layers' sizes and start training | ",
    "\"reset\" - exit training mode (when training failed) | ",
    "\"solve\" - submit the answer example"
);

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Inspect(Vec<usize>),
    Set(Sizes),
    Train,
    Submit(Sizes),
    Reset,
    Solve,
}

fn patterns() -> &'static [Regex; 2] {
    static PATTERNS: OnceLock<[Regex; 2]> = OnceLock::new();
    PATTERNS.get_or_init(|| {
        [
            Regex::new(r"^inspect [0-4 ]+$").expect("static pattern"),
            Regex::new(r"^(set|submit) ([1-4] *){4}$").expect("static pattern"),
        ]
    })
}

fn digits(arguments: &str) -> Vec<u32> {
    arguments.chars().filter_map(|c| c.to_digit(10)).collect()
}

impl FromStr for Command {
    type Err = CommandError;

    fn from_str(line: &str) -> Result<Self, Self::Err> {
        let command = line.trim().to_lowercase();
        let [inspect, sizes] = patterns();
        match command.as_str() {
            "cycle" => {
                return Ok(Command::Inspect((0..CONNECTION_LAYERS).collect()));
            }
            "train" => {
                return Ok(Command::Train);
            }
            "reset" => {
                return Ok(Command::Reset);
            }
            "solve" => {
                return Ok(Command::Solve);
            }
            _ => {}
        }
        let (verb, arguments) = command.split_once(' ').unwrap_or((command.as_str(), ""));
        match verb {
            "inspect" => {
                if !inspect.is_match(&command) {
                    return Err(CommandError::BadLayers(arguments.to_string()));
                }
                let layers = digits(arguments)
                    .into_iter()
                    .map(|d| d as usize)
                    .collect();
                Ok(Command::Inspect(layers))
            }
            "set" | "submit" => {
                if !sizes.is_match(&command) {
                    return Err(CommandError::BadSizes(arguments.to_string()));
                }
                let mut layers = [0; HIDDEN_LAYERS];
                layers.copy_from_slice(&digits(arguments));
                Ok(if verb == "set" { Command::Set(layers) } else { Command::Submit(layers) })
            }
            _ => Err(CommandError::Unknown(command)),
        }
    }
}

/// Runs commands against a module on a simulated clock.
pub struct ScriptRunner<R: Rng> {
    module: PerceptronModule<R>,
    now: Millis,
    tick: Millis,
    inspect_hold: Millis,
    events: Vec<ModuleEvent>,
}

impl<R: Rng> ScriptRunner<R> {
    pub fn new(mut module: PerceptronModule<R>, tick: Millis, inspect_hold: Millis) -> Self {
        module.activate();
        ScriptRunner {
            module,
            now: 0,
            tick: tick.max(1),
            inspect_hold,
            events: Vec::new(),
        }
    }

    pub fn module(&self) -> &PerceptronModule<R> {
        &self.module
    }

    pub fn events(&self) -> &[ModuleEvent] {
        &self.events
    }

    pub fn now(&self) -> Millis {
        self.now
    }

    pub fn run_line(&mut self, line: &str) -> Result<Vec<String>, CommandError> {
        let command: Command = line.parse()?;
        Ok(self.execute(&command))
    }

    /// Executes one command and returns the lines to show the operator.
    pub fn execute(&mut self, command: &Command) -> Vec<String> {
        debug!("[Perceptron #{}] Command {:?}", self.module.id(), command);
        match command {
            Command::Inspect(layers) => self.inspect(layers),
            Command::Set(sizes) => self.set(sizes).into_iter().collect(),
            Command::Train => self.train(),
            Command::Submit(sizes) => {
                match self.set(sizes) {
                    Some(rejected) => vec![rejected],
                    None => self.train(),
                }
            }
            Command::Reset => self.reset(),
            Command::Solve => self.solve(),
        }
    }

    fn inspect(&mut self, layers: &[usize]) -> Vec<String> {
        if self.module.stage() != Stage::Configuring {
            return vec!["can't view connections' info, finish current training first.".to_string()];
        }
        let mut lines = Vec::with_capacity(layers.len());
        for layer in layers {
            if let Some(info) = self.module.inspect_connection_layer(*layer) {
                lines.push(
                    format!(
                        "connection {}: convergence rate {} / delay {}",
                        layer,
                        format_factor(info.convergence_rate),
                        format_factor(info.connection_delay)
                    )
                );
            }
            self.wait(self.inspect_hold);
            self.module.release_connection_layer();
        }
        lines
    }

    fn set(&mut self, sizes: &Sizes) -> Option<String> {
        if self.module.stage() != Stage::Configuring {
            return Some("can't set hidden layers, finish current training first.".to_string());
        }
        for (layer, size) in sizes.iter().enumerate() {
            while self.module.topology().hidden_layers()[layer] != *size {
                self.module.edit_hidden_layer(layer);
                self.wait(PRESS_INTERVAL);
            }
        }
        None
    }

    fn train(&mut self) -> Vec<String> {
        if self.module.stage() != Stage::Configuring {
            return vec!["can't start training, finish current training first.".to_string()];
        }
        let submission = match self.module.submit(self.now) {
            Some(submission) => submission,
            None => {
                return Vec::new();
            }
        };
        self.wait_for_training();
        let display = self.module.display();
        let outcome = match self.module.stage() {
            Stage::Finished(Verdict::Pass) => "solved",
            _ => "strike",
        };
        vec![
            format!(
                "training finished: accuracy {} / time {} ({})",
                display.current_accuracy,
                display.current_time,
                outcome
            ),
            format!(
                "target accuracy {} in {} ms",
                submission.target_accuracy,
                submission.target_time
            )
        ]
    }

    fn reset(&mut self) -> Vec<String> {
        match self.module.stage() {
            Stage::Idle | Stage::Configuring => {
                vec!["can't exit training mode: training not started.".to_string()]
            }
            Stage::Running | Stage::Finished(Verdict::Pass) => {
                vec!["can't exit training mode: training not finished.".to_string()]
            }
            Stage::Finished(Verdict::Fail) => {
                self.module.reset();
                Vec::new()
            }
        }
    }

    /// Waits out any training, leaves a failed one and submits the answer
    /// example.
    fn solve(&mut self) -> Vec<String> {
        self.wait_for_training();
        match self.module.stage() {
            Stage::Finished(Verdict::Pass) => {
                return Vec::new();
            }
            Stage::Finished(Verdict::Fail) => {
                self.module.reset();
            }
            _ => {}
        }
        let answer = self.module.data().answer_example;
        self.execute(&Command::Submit(answer))
    }

    fn wait_for_training(&mut self) {
        while self.module.stage() == Stage::Running {
            self.step();
        }
    }

    fn wait(&mut self, duration: Millis) {
        let until = self.now + duration;
        while self.now < until {
            self.step();
        }
    }

    fn step(&mut self) {
        self.now += self.tick;
        let frame = self.module.advance(self.now);
        self.events.extend(frame.event);
    }
}
