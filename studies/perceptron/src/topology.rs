use ndarray::Array2;
use rand::Rng;

use crate::rng::weight;
use crate::scoring::{ Sizes, CONNECTION_LAYERS, HIDDEN_LAYERS, MAX_NODES, MIN_NODES };

/// Dense connections between two adjacent node sets.
///
/// Rows are destination nodes, columns are source nodes, so the flat index of
/// a connection is `dest * left + source`.
#[derive(Debug, Clone, PartialEq)]
pub struct ConnectionLayer {
    weights: Array2<f32>,
}

impl ConnectionLayer {
    pub fn new<R: Rng + ?Sized>(rng: &mut R, left: usize, right: usize) -> ConnectionLayer {
        ConnectionLayer {
            weights: Array2::from_shape_simple_fn((right, left), || weight(&mut *rng)),
        }
    }

    pub fn left(&self) -> usize {
        self.weights.ncols()
    }

    pub fn right(&self) -> usize {
        self.weights.nrows()
    }

    pub fn len(&self) -> usize {
        self.weights.len()
    }

    pub fn is_empty(&self) -> bool {
        self.weights.is_empty()
    }

    pub fn index_of(&self, source: usize, dest: usize) -> usize {
        dest * self.left() + source
    }

    pub fn weight(&self, index: usize) -> Option<f32> {
        let left = self.left();
        if left == 0 {
            return None;
        }
        self.weights.get((index / left, index % left)).copied()
    }

    pub fn set_weight(&mut self, index: usize, value: f32) -> bool {
        let left = self.left();
        if left == 0 {
            return false;
        }
        match self.weights.get_mut((index / left, index % left)) {
            Some(slot) => {
                *slot = value;
                true
            }
            None => false,
        }
    }

    pub fn weights(&self) -> &Array2<f32> {
        &self.weights
    }
}

/// The operator-editable hidden layers and the connections they induce.
#[derive(Debug, Clone)]
pub struct TopologyEditor {
    inputs: usize,
    outputs: usize,
    hidden_layers: Sizes,
    connections: Vec<ConnectionLayer>,
}

impl TopologyEditor {
    pub fn new<R: Rng + ?Sized>(
        rng: &mut R,
        inputs: u32,
        outputs: u32,
        hidden_layers: Sizes
    ) -> TopologyEditor {
        let mut editor = TopologyEditor {
            inputs: inputs as usize,
            outputs: outputs as usize,
            hidden_layers,
            connections: Vec::with_capacity(CONNECTION_LAYERS),
        };
        for layer in 0..CONNECTION_LAYERS {
            let (left, right) = editor.layer_shape(layer);
            editor.connections.push(ConnectionLayer::new(rng, left, right));
        }
        editor
    }

    /// Starts from a random topology, as the device does when it powers on.
    pub fn random<R: Rng + ?Sized>(rng: &mut R, inputs: u32, outputs: u32) -> TopologyEditor {
        let mut sizes = [0; HIDDEN_LAYERS];
        for size in sizes.iter_mut() {
            *size = rng.gen_range(MIN_NODES..=MAX_NODES);
        }
        TopologyEditor::new(rng, inputs, outputs, sizes)
    }

    /// Cycles hidden layer `layer` through 1, 2, 3, 4, 1, ... and rebuilds the
    /// two connection layers that touch it.
    pub fn edit_layer<R: Rng + ?Sized>(&mut self, rng: &mut R, layer: usize) -> Option<u32> {
        if layer >= HIDDEN_LAYERS {
            return None;
        }
        self.hidden_layers[layer] = (self.hidden_layers[layer] % MAX_NODES) + 1;
        for index in [layer, layer + 1] {
            let (left, right) = self.layer_shape(index);
            self.connections[index] = ConnectionLayer::new(rng, left, right);
        }
        Some(self.hidden_layers[layer])
    }

    pub fn hidden_layers(&self) -> &Sizes {
        &self.hidden_layers
    }

    pub fn inputs(&self) -> usize {
        self.inputs
    }

    pub fn outputs(&self) -> usize {
        self.outputs
    }

    pub fn connections(&self) -> &[ConnectionLayer] {
        &self.connections
    }

    pub fn connection_layer(&self, layer: usize) -> Option<&ConnectionLayer> {
        self.connections.get(layer)
    }

    pub fn connection_layer_mut(&mut self, layer: usize) -> Option<&mut ConnectionLayer> {
        self.connections.get_mut(layer)
    }

    /// Node counts `(left, right)` of connection layer `layer`.
    pub fn layer_shape(&self, layer: usize) -> (usize, usize) {
        let left = if layer == 0 { self.inputs } else { self.hidden_layers[layer - 1] as usize };
        let right = if layer == HIDDEN_LAYERS {
            self.outputs
        } else {
            self.hidden_layers[layer] as usize
        };
        (left, right)
    }
}

#[cfg(test)]
mod tests {
    use rand::{ rngs::StdRng, SeedableRng };

    use super::*;

    #[test]
    fn layers_are_sized_by_neighbours() {
        let mut rng = StdRng::seed_from_u64(1);
        let editor = TopologyEditor::new(&mut rng, 3, 2, [4, 1, 2, 3]);
        let lens: Vec<usize> = editor.connections().iter().map(ConnectionLayer::len).collect();
        assert_eq!(lens, vec![12, 4, 2, 6, 6]);
        assert_eq!(editor.layer_shape(0), (3, 4));
        assert_eq!(editor.layer_shape(4), (3, 2));
    }

    #[test]
    fn edit_wraps_from_four_to_one() {
        let mut rng = StdRng::seed_from_u64(2);
        let mut editor = TopologyEditor::new(&mut rng, 1, 1, [1, 1, 1, 1]);
        let seen: Vec<u32> = (0..5).filter_map(|_| editor.edit_layer(&mut rng, 2)).collect();
        assert_eq!(seen, vec![2, 3, 4, 1, 2]);
        assert_eq!(editor.edit_layer(&mut rng, 4), None);
    }

    #[test]
    fn edit_rebuilds_only_adjacent_connection_layers() {
        let mut rng = StdRng::seed_from_u64(3);
        let mut editor = TopologyEditor::new(&mut rng, 2, 2, [1, 1, 1, 1]);
        let before = editor.connections().to_vec();
        editor.edit_layer(&mut rng, 1);
        let after = editor.connections();
        assert_eq!(after[0], before[0]);
        assert_eq!(after[3], before[3]);
        assert_eq!(after[4], before[4]);
        assert_eq!(after[1].len(), 2);
        assert_eq!(after[2].len(), 2);
    }

    #[test]
    fn flat_index_is_dest_major() {
        let mut rng = StdRng::seed_from_u64(4);
        let mut layer = ConnectionLayer::new(&mut rng, 3, 2);
        let index = layer.index_of(2, 1);
        assert_eq!(index, 5);
        assert!(layer.set_weight(index, 0.25));
        assert_eq!(layer.weights()[[1, 2]], 0.25);
        assert_eq!(layer.weight(index), Some(0.25));
        assert_eq!(layer.weight(6), None);
        assert!(!layer.set_weight(6, 0.5));
    }

    #[test]
    fn fresh_weights_are_unit_interval() {
        let mut rng = StdRng::seed_from_u64(5);
        let editor = TopologyEditor::random(&mut rng, 4, 4);
        for layer in editor.connections() {
            assert!(layer.weights().iter().all(|w| (0.0..=1.0).contains(w)));
        }
    }
}
