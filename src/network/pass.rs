use std::fmt;

use crate::error::{NetworkError, Result};
use crate::layers::dense::Layer;

/// Per-layer cache produced by one forward pass.
///
/// `values[i]` holds the pre-activation sums of layer `i` (empty for the
/// input layer) and `activations[i]` its outputs. Backpropagation reads this
/// cache instead of state stored on the network, so a pass can be computed
/// and consumed without touching the network at all.
#[derive(Debug, Clone, PartialEq)]
pub struct ForwardPass {
    pub values: Vec<Vec<f64>>,
    pub activations: Vec<Vec<f64>>,
}

impl ForwardPass {
    /// Runs `inputs` through `layers`. The first layer must be the input layer.
    pub fn run(layers: &[Layer], inputs: &[f64]) -> Result<ForwardPass> {
        let input_size = layers.first().map_or(0, |l| l.size);
        if inputs.len() != input_size {
            return Err(NetworkError::inputs(input_size, inputs.len()));
        }

        let mut values = Vec::with_capacity(layers.len());
        let mut activations: Vec<Vec<f64>> = Vec::with_capacity(layers.len());

        for layer in layers {
            let previous = activations.last().map_or(inputs, |a| a.as_slice());
            let (z, a) = layer.feed_from(previous);
            values.push(z);
            activations.push(a);
        }

        Ok(ForwardPass { values, activations })
    }

    /// Fails unless this pass was computed over a topology shaped like
    /// `layers`.
    pub fn check_shape(&self, layers: &[Layer]) -> Result<()> {
        if self.values.len() != layers.len() || self.activations.len() != layers.len() {
            return Err(NetworkError::DimensionMismatch {
                what: "forward pass layers",
                expected: layers.len(),
                actual: self.values.len().min(self.activations.len()),
            });
        }
        for (i, layer) in layers.iter().enumerate() {
            let values = if i == 0 { 0 } else { layer.size };
            if self.activations[i].len() != layer.size || self.values[i].len() != values {
                return Err(NetworkError::DimensionMismatch {
                    what: "forward pass neurons",
                    expected: layer.size,
                    actual: self.activations[i].len(),
                });
            }
        }
        Ok(())
    }

    /// Activations of the last layer.
    pub fn outputs(&self) -> &[f64] {
        self.activations.last().map(|a| a.as_slice()).unwrap_or(&[])
    }
}

/// One line per layer, activations separated by spaces.
pub(crate) fn write_activations(f: &mut fmt::Formatter<'_>, activations: &[Vec<f64>]) -> fmt::Result {
    for (i, layer) in activations.iter().enumerate() {
        if i > 0 {
            writeln!(f)?;
        }
        for (j, a) in layer.iter().enumerate() {
            if j > 0 {
                write!(f, " ")?;
            }
            write!(f, "{a}")?;
        }
    }
    Ok(())
}

impl fmt::Display for ForwardPass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write_activations(f, &self.activations)
    }
}
