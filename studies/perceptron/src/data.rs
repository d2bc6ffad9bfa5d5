use std::collections::BTreeMap;

use rand::Rng;

use crate::rng::{ uniform, uniform_index };
use crate::scoring::{
    accuracy,
    learning_time,
    ways_count,
    PerLayer,
    Sizes,
    CONNECTION_LAYERS,
    HIDDEN_LAYERS,
    MAX_NODES,
    MIN_NODES,
};

/// Largest convergence rate or connection delay, in hundredths.
pub const MAX_FACTOR: u32 = 999;

/// One puzzle instance. Generated once at activation and never mutated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModuleData {
    pub inputs_count: u32,
    pub outputs_count: u32,
    pub required_accuracy: u32,
    /// Raw units, scale with [`crate::environment::Environment::scale`].
    pub max_learning_time: u32,
    pub convergence_rates: PerLayer,
    pub answer_example: Sizes,
    pub connections_delay: PerLayer,
}

impl ModuleData {
    pub fn generate<R: Rng + ?Sized>(rng: &mut R) -> ModuleData {
        let rates_sorted = draw_distinct_rates(rng);
        let mut answer_example = [0; HIDDEN_LAYERS];
        for size in answer_example.iter_mut() {
            *size = rng.gen_range(MIN_NODES..=MAX_NODES);
        }
        let inputs_count = rng.gen_range(MIN_NODES..=MAX_NODES);
        let outputs_count = rng.gen_range(MIN_NODES..=MAX_NODES);

        let ways = ways_count(inputs_count, outputs_count, &answer_example);
        let convergence_rates = pair_rates_with_ways(rng, &ways, &rates_sorted);

        let mut connections_delay = [0; CONNECTION_LAYERS];
        for delay in connections_delay.iter_mut() {
            *delay = rng.gen_range(1..=MAX_FACTOR);
        }

        let accuracy = accuracy(inputs_count, outputs_count, &answer_example, &convergence_rates);
        let learning_time = learning_time(
            inputs_count,
            outputs_count,
            &answer_example,
            &connections_delay
        );
        // the answer example must always pass, so accuracy slack goes downwards
        let required_accuracy = accuracy - uniform(rng, 0, accuracy / 10);
        let max_learning_time = learning_time + uniform(rng, 0, learning_time / 10);

        ModuleData {
            inputs_count,
            outputs_count,
            required_accuracy,
            max_learning_time,
            convergence_rates,
            answer_example,
            connections_delay,
        }
    }

    pub fn ways_count(&self, sizes: &Sizes) -> PerLayer {
        ways_count(self.inputs_count, self.outputs_count, sizes)
    }

    pub fn accuracy(&self, sizes: &Sizes) -> u32 {
        accuracy(self.inputs_count, self.outputs_count, sizes, &self.convergence_rates)
    }

    pub fn learning_time(&self, sizes: &Sizes) -> u32 {
        learning_time(self.inputs_count, self.outputs_count, sizes, &self.connections_delay)
    }
}

/// Five distinct rates in `[1, 999]`, largest first.
fn draw_distinct_rates<R: Rng + ?Sized>(rng: &mut R) -> PerLayer {
    let mut rates = [0; CONNECTION_LAYERS];
    let mut drawn = 0;
    while drawn < CONNECTION_LAYERS {
        let rate = rng.gen_range(1..=MAX_FACTOR);
        if !rates[..drawn].contains(&rate) {
            rates[drawn] = rate;
            drawn += 1;
        }
    }
    rates.sort_unstable_by(|a, b| b.cmp(a));
    rates
}

/// Gives the i-th largest rate to a layer holding the i-th largest ways count.
/// Layers sharing a ways count are picked uniformly at random.
fn pair_rates_with_ways<R: Rng + ?Sized>(
    rng: &mut R,
    ways: &PerLayer,
    rates_sorted: &PerLayer
) -> PerLayer {
    let mut ways_to_layers: BTreeMap<u32, Vec<usize>> = BTreeMap::new();
    for (layer, count) in ways.iter().enumerate() {
        ways_to_layers.entry(*count).or_default().push(layer);
    }

    let mut ways_sorted = *ways;
    ways_sorted.sort_unstable_by(|a, b| b.cmp(a));

    let mut rates = [0; CONNECTION_LAYERS];
    for (rank, count) in ways_sorted.iter().enumerate() {
        if let Some(layers) = ways_to_layers.get_mut(count) {
            let layer = layers.swap_remove(uniform_index(rng, layers.len()));
            rates[layer] = rates_sorted[rank];
        }
    }
    rates
}
