/// Number of hidden layers the operator can size.
pub const HIDDEN_LAYERS: usize = 4;
/// Number of connection layers: inputs -> h0, h0 -> h1, ..., h3 -> outputs.
pub const CONNECTION_LAYERS: usize = HIDDEN_LAYERS + 1;
/// Smallest and largest node count of any input, output or hidden layer.
pub const MIN_NODES: u32 = 1;
pub const MAX_NODES: u32 = 4;

pub type Sizes = [u32; HIDDEN_LAYERS];
pub type PerLayer = [u32; CONNECTION_LAYERS];

/// Connection count of every connection layer for the given topology.
pub fn ways_count(inputs: u32, outputs: u32, sizes: &Sizes) -> PerLayer {
    let mut ways = [0; CONNECTION_LAYERS];
    ways[0] = sizes[0] * inputs;
    for i in 1..HIDDEN_LAYERS {
        ways[i] = sizes[i] * sizes[i - 1];
    }
    ways[HIDDEN_LAYERS] = sizes[HIDDEN_LAYERS - 1] * outputs;
    ways
}

pub fn accuracy(inputs: u32, outputs: u32, sizes: &Sizes, rates: &PerLayer) -> u32 {
    ways_count(inputs, outputs, sizes)
        .iter()
        .zip(rates.iter())
        .map(|(ways, rate)| (ways * rate) / 100)
        .sum()
}

/// Raw learning time, before the environment scale is applied.
pub fn learning_time(inputs: u32, outputs: u32, sizes: &Sizes, delays: &PerLayer) -> u32 {
    ways_count(inputs, outputs, sizes)
        .iter()
        .zip(delays.iter())
        .map(|(ways, delay)| ceil_div_100(ways * delay))
        .sum()
}

pub fn ceil_div_100(value: u32) -> u32 {
    let result = value / 100;
    if value % 100 > 0 { result + 1 } else { result }
}
