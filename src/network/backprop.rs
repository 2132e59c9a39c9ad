use crate::error::{NetworkError, Result};
use crate::layers::dense::{Layer, LayerRole};
use crate::loss::mse::MseLoss;
use crate::network::gradients::Gradients;
use crate::network::pass::ForwardPass;

/// Backpropagates one example through `layers` and adds its parameter deltas
/// into `grads`. Returns the example's mean squared error.
///
/// `pass` must have been produced by `ForwardPass::run` on the same layers
/// with parameters unchanged since. A pass or accumulator shaped for another
/// topology is rejected before anything is staged. Live parameters are never
/// modified here.
pub fn backpropagate(
    layers: &[Layer],
    pass: &ForwardPass,
    expected: &[f64],
    grads: &mut Gradients,
) -> Result<f64> {
    if layers.len() < 2 {
        return Err(NetworkError::TooFewLayers { count: layers.len() });
    }
    pass.check_shape(layers)?;
    grads.check_shape(layers)?;
    let outputs = pass.outputs();
    if expected.len() != outputs.len() {
        return Err(NetworkError::expected_outputs(outputs.len(), expected.len()));
    }

    let last = layers.len() - 1;
    let output_layer = &layers[last];
    let output_activator = output_layer.role().activation()
        .ok_or_else(|| NetworkError::TooFewLayers { count: layers.len() })?;

    // dE/dvalue for the output layer: f'(z) * 2(y - t)
    let mut error: Vec<f64> = MseLoss::derivative(outputs, expected)
        .into_iter()
        .zip(&pass.values[last])
        .map(|(d, &z)| output_activator.derivative(z) * d)
        .collect();

    for i in (1..=last).rev() {
        let layer = &layers[i];
        let inputs = &pass.activations[i - 1];

        layer.accumulate_gradients(&error, inputs, &mut grads.weights[i], &mut grads.biases[i]);

        // The input layer has no error term to receive.
        let previous = layers[i - 1].role();
        if let (LayerRole::Hidden, Some(prev_activator)) = (previous, previous.activation()) {
            error = layer.propagate_error(&error, &pass.values[i - 1], prev_activator);
        }
    }

    grads.record_example();
    Ok(MseLoss::loss(outputs, expected))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::math::matrix::Matrix;
    use approx::assert_abs_diff_eq;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn layers(seed: u64) -> Vec<Layer> {
        let mut rng = StdRng::seed_from_u64(seed);
        vec![
            Layer::input(2),
            Layer::new(3, 2, LayerRole::Hidden, &mut rng),
            Layer::new(2, 3, LayerRole::Hidden, &mut rng),
            Layer::new(1, 2, LayerRole::Output, &mut rng),
        ]
    }

    fn loss_at(layers: &[Layer], inputs: &[f64], expected: &[f64]) -> f64 {
        let pass = ForwardPass::run(layers, inputs).unwrap();
        MseLoss::loss(pass.outputs(), expected)
    }

    #[test]
    fn single_output_gradient_is_sigmoid_prime_times_error() {
        let mut layers = layers(2);
        layers[3].weights = Matrix::zeros(1, 2);
        let pass = ForwardPass::run(&layers, &[0.3, -0.7]).unwrap();
        let mut grads = Gradients::zeros_like(&layers);

        let err = backpropagate(&layers, &pass, &[1.0], &mut grads).unwrap();

        // Output is sigmoid(0) = 0.5, so dE/dz = 0.25 * 2 * (0.5 - 1.0).
        assert_abs_diff_eq!(err, 0.25, epsilon = 1e-12);
        assert_abs_diff_eq!(grads.biases[3][0], -0.25, epsilon = 1e-12);
        // Zero outgoing weights stop the error from reaching hidden layers.
        assert!(grads.biases[1].iter().all(|&b| b == 0.0));
        assert_eq!(grads.examples(), 1);
    }

    #[test]
    fn matches_finite_differences() {
        let layers = layers(9);
        let inputs = [0.8, -0.4];
        let expected = [0.2];

        let pass = ForwardPass::run(&layers, &inputs).unwrap();
        let mut grads = Gradients::zeros_like(&layers);
        backpropagate(&layers, &pass, &expected, &mut grads).unwrap();

        // The accumulated delta is the gradient of the summed squared error,
        // which for a single output equals the mean squared error.
        let h = 1e-6;
        for i in 1..layers.len() {
            for j in 0..layers[i].size {
                for k in 0..layers[i].input_size {
                    let mut plus = layers.clone();
                    plus[i].weights.data[j][k] += h;
                    let mut minus = layers.clone();
                    minus[i].weights.data[j][k] -= h;
                    let numeric = (loss_at(&plus, &inputs, &expected)
                        - loss_at(&minus, &inputs, &expected)) / (2.0 * h);
                    assert_abs_diff_eq!(grads.weights[i].data[j][k], numeric, epsilon = 1e-6);
                }

                let mut plus = layers.clone();
                plus[i].biases[j] += h;
                let mut minus = layers.clone();
                minus[i].biases[j] -= h;
                let numeric = (loss_at(&plus, &inputs, &expected)
                    - loss_at(&minus, &inputs, &expected)) / (2.0 * h);
                assert_abs_diff_eq!(grads.biases[i][j], numeric, epsilon = 1e-6);
            }
        }
    }

    #[test]
    fn rejects_pass_and_gradients_from_another_topology() {
        let layers = layers(4);
        let mut rng = StdRng::seed_from_u64(4);
        let shallow = vec![Layer::input(2), Layer::new(1, 2, LayerRole::Output, &mut rng)];

        let foreign_pass = ForwardPass::run(&shallow, &[0.0, 1.0]).unwrap();
        let mut grads = Gradients::zeros_like(&layers);
        let err = backpropagate(&layers, &foreign_pass, &[1.0], &mut grads).unwrap_err();
        assert!(matches!(err, NetworkError::DimensionMismatch { what: "forward pass layers", .. }));
        assert!(grads.is_zero());

        let pass = ForwardPass::run(&layers, &[0.0, 1.0]).unwrap();
        let mut foreign_grads = Gradients::zeros_like(&shallow);
        let err = backpropagate(&layers, &pass, &[1.0], &mut foreign_grads).unwrap_err();
        assert!(matches!(err, NetworkError::DimensionMismatch { what: "gradient layers", .. }));
        assert_eq!(foreign_grads.examples(), 0);
    }

    #[test]
    fn rejects_wrong_expected_length() {
        let layers = layers(4);
        let pass = ForwardPass::run(&layers, &[0.0, 1.0]).unwrap();
        let mut grads = Gradients::zeros_like(&layers);

        let err = backpropagate(&layers, &pass, &[0.0, 1.0], &mut grads).unwrap_err();
        assert!(matches!(err, NetworkError::DimensionMismatch { expected: 1, actual: 2, .. }));
        assert!(grads.is_zero());
        assert_eq!(grads.examples(), 0);
    }
}
