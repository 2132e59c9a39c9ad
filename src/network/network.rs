use std::fmt;

use log::debug;
use rand::rngs::StdRng;
use rand::SeedableRng;

use crate::error::{NetworkError, Result};
use crate::layers::dense::{Layer, LayerRole};
use crate::network::backprop::backpropagate;
use crate::network::gradients::Gradients;
use crate::network::pass::{write_activations, ForwardPass};
use crate::optim::sgd::Sgd;
use crate::train::example::Example;
use crate::train::loop_fn::train_loop;
use crate::train::train_config::{BatchSize, TrainConfig};

/// Feed-forward network: an input layer, any number of ELU hidden layers and
/// a sigmoid output layer, fully connected in sequence.
///
/// The network owns all mutable training state: parameters, the batch
/// accumulator, the random source and a snapshot of the latest activations.
/// Every operation that touches that state takes `&mut self`, so forward and
/// backward calls on one network can never overlap or interleave.
#[derive(Debug, Clone)]
pub struct Network {
    layers: Vec<Layer>,
    gradients: Gradients,
    activations: Vec<Vec<f64>>,
    rng: StdRng,
}

impl Network {
    /// Builds a network from layer sizes, seeding the random source with `seed`.
    pub fn new(sizes: &[usize], seed: u64) -> Result<Network> {
        Network::with_rng(sizes, StdRng::seed_from_u64(seed))
    }

    /// Builds a network from layer sizes (input first, output last). `rng`
    /// draws the initial weights and later shuffles the training order.
    pub fn with_rng(sizes: &[usize], mut rng: StdRng) -> Result<Network> {
        if sizes.len() < 2 {
            return Err(NetworkError::TooFewLayers { count: sizes.len() });
        }
        if let Some(index) = sizes.iter().position(|&size| size < 1) {
            return Err(NetworkError::EmptyLayer { index });
        }

        let last = sizes.len() - 1;
        let layers: Vec<Layer> = sizes.iter().enumerate()
            .map(|(i, &size)| match i {
                0 => Layer::input(size),
                i if i == last => Layer::new(size, sizes[i - 1], LayerRole::Output, &mut rng),
                i => Layer::new(size, sizes[i - 1], LayerRole::Hidden, &mut rng),
            })
            .collect();

        debug!("built network with layer sizes {sizes:?}");

        Ok(Network {
            gradients: Gradients::zeros_like(&layers),
            activations: sizes.iter().map(|&size| vec![0.0; size]).collect(),
            layers,
            rng,
        })
    }

    pub fn layers(&self) -> &[Layer] {
        &self.layers
    }

    pub fn layer_sizes(&self) -> Vec<usize> {
        self.layers.iter().map(|layer| layer.size).collect()
    }

    pub fn input_size(&self) -> usize {
        self.layers[0].size
    }

    pub fn output_size(&self) -> usize {
        self.layers[self.layers.len() - 1].size
    }

    /// Deltas staged by `backward` since the last update.
    pub fn gradients(&self) -> &Gradients {
        &self.gradients
    }

    /// Forward pass; returns the output activations and records every
    /// layer's activations for `Display`.
    pub fn forward(&mut self, inputs: &[f64]) -> Result<Vec<f64>> {
        let pass = self.forward_pass(inputs)?;
        let outputs = pass.outputs().to_vec();
        self.activations = pass.activations;
        Ok(outputs)
    }

    /// Forward pass returning the full per-layer cache; leaves the network
    /// untouched.
    pub fn forward_pass(&self, inputs: &[f64]) -> Result<ForwardPass> {
        ForwardPass::run(&self.layers, inputs)
    }

    /// Runs one example forward and backward, adding its parameter deltas to
    /// the accumulator. Parameters only change on `update`. Returns the
    /// example's mean squared error.
    pub fn backward(&mut self, inputs: &[f64], expected: &[f64]) -> Result<f64> {
        self.check_lengths(inputs, expected)?;
        let pass = self.forward_pass(inputs)?;
        let error = backpropagate(&self.layers, &pass, expected, &mut self.gradients)?;
        self.activations = pass.activations;
        Ok(error)
    }

    /// Applies the accumulated deltas scaled by `learning_rate / batch_size`,
    /// then zeroes the accumulator.
    pub fn update(&mut self, learning_rate: f64, batch_size: usize) -> Result<()> {
        if batch_size < 1 {
            return Err(NetworkError::InvalidHyperparameter(
                "update batch size must be at least 1".to_string(),
            ));
        }
        self.apply_update(learning_rate, batch_size)
    }

    /// Trains on `data` and returns one mean error per epoch.
    ///
    /// `batch_size` of `-1` selects full-batch gradient descent; otherwise it
    /// must lie in `[1, data.len()]`. The example order is shuffled once
    /// before the first epoch unless the whole set forms one batch, and the
    /// trailing partial batch is divided by the nominal batch size. Use
    /// `train_with` to choose other policies.
    pub fn train(
        &mut self,
        data: &[Example],
        epochs: usize,
        batch_size: i64,
        learning_rate: f64,
    ) -> Result<Vec<f64>> {
        let batch_size = BatchSize::from_signed(batch_size, data.len())?;
        self.train_with(data, &TrainConfig::new(epochs, batch_size, learning_rate))
    }

    pub fn train_with(&mut self, data: &[Example], config: &TrainConfig) -> Result<Vec<f64>> {
        train_loop(self, data, config)
    }

    pub(crate) fn apply_update(&mut self, learning_rate: f64, batch_size: usize) -> Result<()> {
        Sgd::new(learning_rate).step(&mut self.layers, &mut self.gradients, batch_size)
    }

    pub(crate) fn check_example(&self, example: &Example) -> Result<()> {
        self.check_lengths(&example.inputs, &example.expected)
    }

    pub(crate) fn rng_mut(&mut self) -> &mut StdRng {
        &mut self.rng
    }

    fn check_lengths(&self, inputs: &[f64], expected: &[f64]) -> Result<()> {
        if inputs.len() != self.input_size() {
            return Err(NetworkError::inputs(self.input_size(), inputs.len()));
        }
        if expected.len() != self.output_size() {
            return Err(NetworkError::expected_outputs(self.output_size(), expected.len()));
        }
        Ok(())
    }
}

/// Latest activation of every neuron: space-separated within a layer,
/// newline-separated across layers. Diagnostic only.
impl fmt::Display for Network {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write_activations(f, &self.activations)
    }
}
