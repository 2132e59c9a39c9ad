use crate::{error::Result, layers::dense::Layer, network::gradients::Gradients};

pub struct Sgd {
    pub learning_rate: f64,
}

impl Sgd {
    pub fn new(learning_rate: f64) -> Sgd {
        Sgd { learning_rate }
    }

    /// Flushes accumulated deltas into every non-input layer:
    /// `param -= (learning_rate / batch_size) * delta`, then zeroes `grads`.
    /// Accumulators shaped for another topology are rejected untouched.
    pub fn step(&self, layers: &mut [Layer], grads: &mut Gradients, batch_size: usize) -> Result<()> {
        grads.check_shape(layers)?;
        let scale = self.learning_rate / batch_size as f64;
        for (i, layer) in layers.iter_mut().enumerate().skip(1) {
            layer.apply_gradients(&grads.weights[i], &grads.biases[i], scale)?;
        }
        grads.clear();
        Ok(())
    }
}
