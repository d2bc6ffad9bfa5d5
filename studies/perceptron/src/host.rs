use std::{
    sync::mpsc::{ Receiver, Sender, TryRecvError },
    thread,
    time::{ Duration, Instant },
};

use perceptron::{
    display::format_time,
    module::{ join_digits, Frame, ModuleEvent },
    train::Readout,
    Millis,
    PerceptronConfig,
    PerceptronModule,
    Stage,
};
use rand::Rng;
use ui::{ state::{ NetworkView, Progress, Readouts, StatePerceptron }, ui::Control };

/// Owns the module on the simulation thread: applies operator controls,
/// ticks the module and publishes a snapshot after every tick.
pub struct Simulation<R: Rng> {
    module: PerceptronModule<R>,
    interval: Duration,
    inspect_hold: Millis,
    release_at: Option<Millis>,
    touched: Option<(usize, usize)>,
    accuracy_curve: Vec<(f64, f64)>,
    history: Vec<(String, String)>,
}

impl<R: Rng> Simulation<R> {
    pub fn new(module: PerceptronModule<R>, config: &PerceptronConfig) -> Self {
        Simulation {
            module,
            interval: Duration::from_millis(config.tick_interval_ms),
            inspect_hold: config.inspect_hold_ms,
            release_at: None,
            touched: None,
            accuracy_curve: Vec::new(),
            history: Vec::new(),
        }
    }

    pub fn run(mut self, controls: Receiver<Control>, snapshots: Sender<StatePerceptron>) {
        let clock = Instant::now();
        self.activate();
        loop {
            let now = clock.elapsed().as_millis() as Millis;
            loop {
                match controls.try_recv() {
                    Ok(Control::Quit) | Err(TryRecvError::Disconnected) => {
                        return;
                    }
                    Ok(control) => self.apply(control, now),
                    Err(TryRecvError::Empty) => {
                        break;
                    }
                }
            }
            self.tick(now);
            if snapshots.send(self.snapshot()).is_err() {
                return;
            }
            thread::sleep(self.interval);
        }
    }

    fn activate(&mut self) {
        if self.module.activate() {
            let data = self.module.data();
            self.history.push((
                format!("Inputs {} / outputs {}", data.inputs_count, data.outputs_count),
                String::new(),
            ));
            self.history.push(("Activated".to_string(), self.module.stage().to_string()));
        }
    }

    fn apply(&mut self, control: Control, now: Millis) {
        match control {
            Control::EditLayer(layer) => {
                if let Some(size) = self.module.edit_hidden_layer(layer) {
                    self.history.push((format!("Hidden layer {}", layer + 1), size.to_string()));
                }
            }
            Control::Inspect(layer) => {
                if self.module.inspect_connection_layer(layer).is_some() {
                    self.release_at = Some(now + self.inspect_hold);
                }
            }
            Control::PressScreen => {
                let before = self.module.stage();
                if self.module.press_screen(now) {
                    self.release_at = None;
                    if before == Stage::Configuring {
                        let sizes = join_digits(self.module.topology().hidden_layers());
                        self.accuracy_curve.clear();
                        self.accuracy_curve.push((0.0, 0.0));
                        self.history.push(("Start training".to_string(), sizes));
                    } else {
                        self.history.push(("Reset".to_string(), String::new()));
                    }
                }
            }
            Control::Quit => {}
        }
    }

    fn tick(&mut self, now: Millis) {
        if let Some(release_at) = self.release_at {
            if now >= release_at {
                self.module.release_connection_layer();
                self.release_at = None;
            }
        }
        let frame = self.module.advance(now);
        self.record(&frame);
    }

    fn record(&mut self, frame: &Frame) {
        if let Some(touched) = frame.touched {
            self.touched = Some((touched.layer, touched.index));
        }
        match frame.readout {
            Some(Readout::Training { accuracy, elapsed }) => {
                self.accuracy_curve.push(((elapsed as f64) / 1000.0, accuracy as f64));
            }
            Some(Readout::Finished { accuracy, time }) => {
                self.accuracy_curve.push(((time as f64) / 1000.0, accuracy as f64));
                self.history.push((
                    "Training finished".to_string(),
                    format!("{} in {}", accuracy, format_time(time)),
                ));
            }
            None => {}
        }
        match frame.event {
            Some(ModuleEvent::Solved) => {
                self.history.push(("Module solved".to_string(), String::new()));
            }
            Some(ModuleEvent::Strike) => {
                self.history.push(("Strike".to_string(), String::new()));
            }
            None => {}
        }
    }

    pub fn snapshot(&self) -> StatePerceptron {
        let topology = self.module.topology();
        let display = self.module.display();
        let progress = match self.module.training() {
            Some(training) => {
                let target = training.target_time();
                let elapsed = self.accuracy_curve
                    .last()
                    .map_or(0, |(seconds, _)| (seconds * 1000.0).round() as u64);
                Progress { elapsed: elapsed.min(target), target }
            }
            None => Progress::default(),
        };
        StatePerceptron {
            title: format!("Perceptron #{}", self.module.id()),
            stage: self.module.stage().to_string(),
            network: NetworkView {
                inputs: topology.inputs(),
                outputs: topology.outputs(),
                hidden_layers: topology
                    .hidden_layers()
                    .iter()
                    .map(|size| *size as usize)
                    .collect(),
                connections: topology
                    .connections()
                    .iter()
                    .map(|layer| layer.weights().iter().copied().collect())
                    .collect(),
                touched: self.touched,
                holding: self.module.holding(),
            },
            readouts: Readouts {
                current_accuracy: display.current_accuracy.clone(),
                current_time: display.current_time.clone(),
                convergence_rate: display.convergence_rate.clone(),
                connection_delay: display.connection_delay.clone(),
                required_accuracy: display.required_accuracy.clone(),
                max_time: display.max_time.clone(),
            },
            progress,
            accuracy_curve: self.accuracy_curve.clone(),
            history: self.history.clone(),
        }
    }
}
