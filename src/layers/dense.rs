use rand::Rng;

use crate::error::{NetworkError, Result};
use crate::{math::matrix::Matrix, activation::activation::ActivationFunction};

/// Position of a layer in the network. Fixed at construction; decides both
/// the weight initialization scheme and the activation function.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LayerRole {
    Input,
    Hidden,
    Output,
}

impl LayerRole {
    /// `None` for the input layer, whose activations are the raw inputs.
    pub fn activation(&self) -> Option<ActivationFunction> {
        match self {
            LayerRole::Input => None,
            LayerRole::Hidden => Some(ActivationFunction::Elu),
            LayerRole::Output => Some(ActivationFunction::Sigmoid),
        }
    }
}

/// Fully connected layer stored as structure-of-arrays.
///
/// `weights` is `size × input_size`: row `j` holds the incoming weights of
/// neuron `j`. Input layers have an empty weight matrix and no biases.
#[derive(Debug, Clone)]
pub struct Layer{
    pub size: usize,
    pub input_size: usize,
    pub weights: Matrix,
    pub biases: Vec<f64>,
    role: LayerRole,
}

impl Layer {
    /// Input layer of `size` pass-through neurons.
    pub(crate) fn input(size: usize) -> Layer {
        Layer {
            size,
            input_size: 0,
            weights: Matrix::default(),
            biases: Vec::new(),
            role: LayerRole::Input,
        }
    }

    /// Hidden layers get He weights, output layers Xavier weights; biases
    /// start at zero. Passing `LayerRole::Input` ignores `input_size`.
    pub(crate) fn new<R: Rng + ?Sized>(size: usize, input_size: usize, role: LayerRole, rng: &mut R) -> Layer {
        let weights = match role {
            LayerRole::Input => return Layer::input(size),
            LayerRole::Hidden => Matrix::he(size, input_size, rng),
            LayerRole::Output => Matrix::xavier(size, input_size, rng),
        };

        Layer {
            size,
            input_size,
            weights,
            biases: vec![0.0; size],
            role,
        }
    }

    pub fn role(&self) -> LayerRole {
        self.role
    }

    /// Computes `(values, activations)` for this layer given the previous
    /// layer's activations. For the input layer `input` is copied through.
    pub fn feed_from(&self, input: &[f64]) -> (Vec<f64>, Vec<f64>) {
        let activator = match self.role.activation() {
            Some(activator) => activator,
            None => return (Vec::new(), input.to_vec()),
        };

        let values: Vec<f64> = (0..self.size)
            .map(|j| {
                let z: f64 = input.iter().zip(self.weights.row(j))
                    .map(|(a, w)| a * w)
                    .sum();
                z + self.biases[j]
            })
            .collect();
        let activations = values.iter().map(|&z| activator.function(z)).collect();

        (values, activations)
    }

    /// Adds this example's parameter deltas into the batch accumulators.
    /// `error` is dE/dvalue for each neuron of this layer, `inputs` the
    /// previous layer's activations.
    pub fn accumulate_gradients(
        &self,
        error: &[f64],
        inputs: &[f64],
        weights_grad: &mut Matrix,
        biases_grad: &mut [f64],
    ) {
        for (j, &delta) in error.iter().enumerate() {
            biases_grad[j] += delta;
            for (dw, a) in weights_grad.data[j].iter_mut().zip(inputs) {
                *dw += a * delta;
            }
        }
    }

    /// Pushes `error` back through the weights into the previous layer:
    /// `prev[k] = Σ_j f'(prev_values[k]) * w[j][k] * error[j]`.
    pub fn propagate_error(
        &self,
        error: &[f64],
        prev_values: &[f64],
        prev_activator: ActivationFunction,
    ) -> Vec<f64> {
        let mut prev = vec![0.0; self.input_size];
        for (j, &delta) in error.iter().enumerate() {
            for (k, w) in self.weights.row(j).iter().enumerate() {
                prev[k] += prev_activator.derivative(prev_values[k]) * w * delta;
            }
        }
        prev
    }

    /// Applies accumulated gradients: `param -= scale * delta`.
    pub fn apply_gradients(&mut self, weights_grad: &Matrix, biases_grad: &[f64], scale: f64) -> Result<()> {
        if biases_grad.len() != self.biases.len() {
            return Err(NetworkError::DimensionMismatch {
                what: "bias gradients",
                expected: self.biases.len(),
                actual: biases_grad.len(),
            });
        }
        self.weights.sub_scaled(weights_grad, scale)?;
        for (b, d) in self.biases.iter_mut().zip(biases_grad) {
            *b -= scale * d;
        }
        Ok(())
    }
}
