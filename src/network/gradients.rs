use crate::error::{NetworkError, Result};
use crate::layers::dense::Layer;
use crate::math::matrix::Matrix;

/// Batch accumulators: one weight-delta matrix and one bias-delta vector per
/// layer, shaped like the layer's parameters (empty for the input layer).
///
/// Backward passes only add into these; `Sgd::step` is the only place they
/// reach the live parameters, after which they are cleared.
#[derive(Debug, Clone, PartialEq)]
pub struct Gradients {
    pub weights: Vec<Matrix>,
    pub biases: Vec<Vec<f64>>,
    examples: usize,
}

impl Gradients {
    pub fn zeros_like(layers: &[Layer]) -> Gradients {
        Gradients {
            weights: layers.iter()
                .map(|layer| Matrix::zeros(layer.weights.rows, layer.weights.cols))
                .collect(),
            biases: layers.iter().map(|layer| vec![0.0; layer.biases.len()]).collect(),
            examples: 0,
        }
    }

    /// Fails unless every accumulator has the shape of the matching layer's
    /// parameters.
    pub fn check_shape(&self, layers: &[Layer]) -> Result<()> {
        if self.weights.len() != layers.len() || self.biases.len() != layers.len() {
            return Err(NetworkError::DimensionMismatch {
                what: "gradient layers",
                expected: layers.len(),
                actual: self.weights.len().min(self.biases.len()),
            });
        }
        for ((w, b), layer) in self.weights.iter().zip(&self.biases).zip(layers) {
            if w.rows != layer.weights.rows || w.data.len() != w.rows || b.len() != layer.biases.len() {
                return Err(NetworkError::DimensionMismatch {
                    what: "gradient neurons",
                    expected: layer.biases.len(),
                    actual: b.len().min(w.rows),
                });
            }
            if w.cols != layer.weights.cols || w.data.iter().any(|row| row.len() != w.cols) {
                return Err(NetworkError::DimensionMismatch {
                    what: "gradient fan-in",
                    expected: layer.weights.cols,
                    actual: w.cols,
                });
            }
        }
        Ok(())
    }

    /// Number of examples accumulated since the last clear.
    pub fn examples(&self) -> usize {
        self.examples
    }

    pub(crate) fn record_example(&mut self) {
        self.examples += 1;
    }

    pub fn clear(&mut self) {
        for w in &mut self.weights {
            w.fill(0.0);
        }
        for b in &mut self.biases {
            b.iter_mut().for_each(|x| *x = 0.0);
        }
        self.examples = 0;
    }

    pub fn is_zero(&self) -> bool {
        self.weights.iter().all(|w| w.iter().all(|&x| x == 0.0))
            && self.biases.iter().all(|b| b.iter().all(|&x| x == 0.0))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layers::dense::LayerRole;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn shapes_follow_layers_and_clear_resets() {
        let mut rng = StdRng::seed_from_u64(5);
        let layers = vec![
            Layer::input(3),
            Layer::new(4, 3, LayerRole::Hidden, &mut rng),
            Layer::new(2, 4, LayerRole::Output, &mut rng),
        ];
        let mut grads = Gradients::zeros_like(&layers);

        assert_eq!(grads.weights[0].rows, 0);
        assert_eq!((grads.weights[1].rows, grads.weights[1].cols), (4, 3));
        assert_eq!(grads.biases[2].len(), 2);
        assert!(grads.is_zero());

        grads.weights[1].data[2][1] = 0.5;
        grads.biases[2][0] = -1.0;
        grads.record_example();
        assert!(!grads.is_zero());
        assert_eq!(grads.examples(), 1);

        grads.clear();
        assert!(grads.is_zero());
        assert_eq!(grads.examples(), 0);
    }

    #[test]
    fn check_shape_rejects_foreign_topologies() {
        let mut rng = StdRng::seed_from_u64(5);
        let small = vec![Layer::input(2), Layer::new(1, 2, LayerRole::Output, &mut rng)];
        let wide = vec![Layer::input(2), Layer::new(3, 2, LayerRole::Output, &mut rng)];
        let deep = vec![
            Layer::input(2),
            Layer::new(3, 2, LayerRole::Hidden, &mut rng),
            Layer::new(1, 3, LayerRole::Output, &mut rng),
        ];

        assert!(Gradients::zeros_like(&deep).check_shape(&deep).is_ok());
        assert!(matches!(
            Gradients::zeros_like(&small).check_shape(&deep),
            Err(NetworkError::DimensionMismatch { what: "gradient layers", expected: 3, actual: 2 })
        ));
        assert!(matches!(
            Gradients::zeros_like(&small).check_shape(&wide),
            Err(NetworkError::DimensionMismatch { what: "gradient neurons", expected: 3, actual: 1 })
        ));

        let mut ragged = Gradients::zeros_like(&small);
        ragged.weights[1].data[0].pop();
        assert!(ragged.check_shape(&small).is_err());
    }
}
