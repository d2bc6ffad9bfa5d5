use rand::Rng;

use crate::rng::{ uniform, uniform_index, uniform_u64, weight };
use crate::scoring::HIDDEN_LAYERS;
use crate::topology::TopologyEditor;

/// Milliseconds on the host's monotonic tick clock.
pub type Millis = u64;

/// Cursor over the connections touched by the cosmetic training sweep.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TraversalPointer {
    pub layer: usize,
    pub index: usize,
}

impl TraversalPointer {
    /// A random connection leaving the input layer.
    pub fn start<R: Rng + ?Sized>(rng: &mut R, topology: &TopologyEditor) -> TraversalPointer {
        let (left, right) = topology.layer_shape(0);
        TraversalPointer { layer: 0, index: uniform_index(rng, left * right) }
    }

    /// Follows the current connection to its destination node and leaves it
    /// through a random connection of the next layer. The last layer wraps to
    /// a fresh start.
    pub fn next<R: Rng + ?Sized>(self, rng: &mut R, topology: &TopologyEditor) -> TraversalPointer {
        if self.layer >= HIDDEN_LAYERS {
            return TraversalPointer::start(rng, topology);
        }
        let (left, _) = topology.layer_shape(self.layer);
        let node = self.index / left;
        let (next_left, next_right) = topology.layer_shape(self.layer + 1);
        let dest = uniform_index(rng, next_right);
        TraversalPointer { layer: self.layer + 1, index: dest * next_left + node }
    }

    fn is_valid(&self, topology: &TopologyEditor) -> bool {
        topology.connection_layer(self.layer).map_or(false, |layer| self.index < layer.len())
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WeightUpdate {
    pub layer: usize,
    pub index: usize,
    pub weight: f32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Readout {
    Training {
        accuracy: u32,
        elapsed: Millis,
    },
    /// Emitted once, when the elapsed time reaches the target time.
    Finished {
        accuracy: u32,
        time: Millis,
    },
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Tick {
    pub touched: Option<WeightUpdate>,
    pub readout: Option<Readout>,
}

/// Piecewise linear accuracy walk that lands on the target at the target time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Checkpoints {
    accuracy_from: u32,
    accuracy_to: u32,
    time_from: Millis,
    time_to: Millis,
}

impl Checkpoints {
    fn first<R: Rng + ?Sized>(rng: &mut R, target_accuracy: u32, target_time: Millis) -> Checkpoints {
        Checkpoints {
            accuracy_from: 0,
            accuracy_to: uniform(rng, 0, target_accuracy),
            time_from: 0,
            time_to: uniform_u64(rng, 1, target_time),
        }
    }

    fn roll<R: Rng + ?Sized>(
        &mut self,
        rng: &mut R,
        elapsed: Millis,
        target_accuracy: u32,
        target_time: Millis
    ) {
        self.time_from = elapsed;
        self.time_to = uniform_u64(rng, elapsed + 1, target_time);
        self.accuracy_from = self.accuracy_to;
        self.accuracy_to = uniform(rng, self.accuracy_from, target_accuracy);
    }

    fn interpolate(&self, elapsed: Millis) -> u32 {
        let span = self.time_to.saturating_sub(self.time_from).max(1);
        let step = (self.accuracy_to - self.accuracy_from) as u64;
        let passed = elapsed.saturating_sub(self.time_from).min(span);
        self.accuracy_from + ((step * passed) / span) as u32
    }
}

/// State of one training run, from submission until it is reset.
#[derive(Debug, Clone)]
pub struct TrainingSimulator {
    target_accuracy: u32,
    target_time: Millis,
    started_at: Millis,
    pointer: TraversalPointer,
    checkpoints: Checkpoints,
    finished: bool,
}

impl TrainingSimulator {
    pub fn start<R: Rng + ?Sized>(
        rng: &mut R,
        topology: &TopologyEditor,
        target_accuracy: u32,
        target_time: Millis,
        now: Millis
    ) -> TrainingSimulator {
        let pointer = TraversalPointer::start(rng, topology);
        let checkpoints = Checkpoints::first(rng, target_accuracy, target_time);
        TrainingSimulator {
            target_accuracy,
            target_time,
            started_at: now,
            pointer,
            checkpoints,
            finished: false,
        }
    }

    pub fn target_accuracy(&self) -> u32 {
        self.target_accuracy
    }

    pub fn target_time(&self) -> Millis {
        self.target_time
    }

    pub fn pointer(&self) -> TraversalPointer {
        self.pointer
    }

    pub fn is_finished(&self) -> bool {
        self.finished
    }

    pub fn elapsed(&self, now: Millis) -> Millis {
        now.saturating_sub(self.started_at)
    }

    /// One tick: sweep a connection, then update the readout unless the run
    /// has already finished.
    pub fn advance<R: Rng + ?Sized>(
        &mut self,
        rng: &mut R,
        topology: &mut TopologyEditor,
        now: Millis
    ) -> Tick {
        let touched = self.traverse(rng, topology);
        let readout = if self.finished { None } else { Some(self.readout(rng, now)) };
        Tick { touched, readout }
    }

    pub fn traverse<R: Rng + ?Sized>(
        &mut self,
        rng: &mut R,
        topology: &mut TopologyEditor
    ) -> Option<WeightUpdate> {
        if !self.pointer.is_valid(topology) {
            self.pointer = TraversalPointer::start(rng, topology);
        }
        let TraversalPointer { layer, index } = self.pointer;
        let value = weight(rng);
        let written = topology
            .connection_layer_mut(layer)
            .map_or(false, |connections| connections.set_weight(index, value));
        self.pointer = self.pointer.next(rng, topology);
        if written { Some(WeightUpdate { layer, index, weight: value }) } else { None }
    }

    fn readout<R: Rng + ?Sized>(&mut self, rng: &mut R, now: Millis) -> Readout {
        let elapsed = self.elapsed(now);
        if elapsed >= self.target_time {
            self.finished = true;
            return Readout::Finished { accuracy: self.target_accuracy, time: self.target_time };
        }
        if elapsed > self.checkpoints.time_to {
            self.checkpoints.roll(rng, elapsed, self.target_accuracy, self.target_time);
        }
        Readout::Training { accuracy: self.checkpoints.interpolate(elapsed), elapsed }
    }
}
