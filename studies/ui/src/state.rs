use std::sync::{ Arc, Mutex };

#[derive(Debug, Default, Clone)]
pub struct Readouts {
    pub current_accuracy: String,
    pub current_time: String,
    pub convergence_rate: String,
    pub connection_delay: String,
    pub required_accuracy: String,
    pub max_time: String,
}

#[derive(Debug, Default, Clone)]
pub struct NetworkView {
    pub inputs: usize,
    pub outputs: usize,
    pub hidden_layers: Vec<usize>,
    /// Flat weights of every connection layer, `dest * left + source`.
    pub connections: Vec<Vec<f32>>,
    /// Connection last touched by the training sweep, as `(layer, index)`.
    pub touched: Option<(usize, usize)>,
    /// Connection layer whose button is held.
    pub holding: Option<usize>,
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct Progress {
    pub elapsed: u64,
    pub target: u64,
}

#[derive(Debug, Default, Clone)]
pub struct StatePerceptron {
    pub title: String,
    pub stage: String,
    pub network: NetworkView,
    pub readouts: Readouts,
    pub progress: Progress,
    /// (seconds, accuracy) samples of the current run.
    pub accuracy_curve: Vec<(f64, f64)>,
    pub history: Vec<(String, String)>,
}

pub type StateMutex = Arc<Mutex<StatePerceptron>>;
