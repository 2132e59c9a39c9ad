use log::{debug, info, trace};
use rand::seq::SliceRandom;

use crate::error::Result;
use crate::network::network::Network;
use crate::train::example::Example;
use crate::train::train_config::{RemainderPolicy, ShufflePolicy, TrainConfig};

// ---------------------------------------------------------------------------
// Public entry point
// ---------------------------------------------------------------------------

/// Trains `network` with mini-batch gradient descent and returns the mean
/// error of every epoch, in epoch order.
///
/// Each example runs a backward pass that only stages deltas; an update is
/// flushed whenever the running index within the epoch reaches a positive
/// multiple of the batch size, and once more after the last example.
///
/// # Errors
/// Fails before touching any parameter if the hyperparameters are invalid,
/// the batch size is outside `[1, data.len()]`, or any example has the wrong
/// input or expected-output length.
pub fn train_loop(network: &mut Network, data: &[Example], config: &TrainConfig) -> Result<Vec<f64>> {
    config.validate()?;
    let n = data.len();
    let batch_size = config.batch_size.resolve(n)?;
    for example in data {
        network.check_example(example)?;
    }

    info!(
        "training on {} examples for {} epochs (batch size {}, learning rate {})",
        n, config.epochs, batch_size, config.learning_rate
    );

    let shuffled = batch_size != n && config.shuffle != ShufflePolicy::Never;
    let mut order: Vec<usize> = (0..n).collect();
    if shuffled && config.shuffle == ShufflePolicy::Once {
        order.shuffle(network.rng_mut());
    }

    let mut errors = Vec::with_capacity(config.epochs);
    for epoch in 1..=config.epochs {
        if shuffled && config.shuffle == ShufflePolicy::EveryEpoch {
            order.shuffle(network.rng_mut());
        }

        let error = run_one_epoch(network, data, &order, batch_size, config)?;
        debug!("epoch {epoch}: mean error {error:.6}");
        errors.push(error);
    }

    if let Some(last) = errors.last() {
        info!("training finished, final mean error {last:.6}");
    }
    Ok(errors)
}

// ---------------------------------------------------------------------------
// Private helpers
// ---------------------------------------------------------------------------

/// Runs one full epoch over `data` in `order`. Returns the mean error over
/// all examples.
fn run_one_epoch(
    network: &mut Network,
    data: &[Example],
    order: &[usize],
    batch_size: usize,
    config: &TrainConfig,
) -> Result<f64> {
    let mut total_error = 0.0;

    for (j, &idx) in order.iter().enumerate() {
        if j > 0 && j % batch_size == 0 {
            flush(network, batch_size, config)?;
        }
        let example = &data[idx];
        total_error += network.backward(&example.inputs, &example.expected)?;
    }
    flush(network, batch_size, config)?;

    Ok(total_error / data.len() as f64)
}

fn flush(network: &mut Network, batch_size: usize, config: &TrainConfig) -> Result<()> {
    let accumulated = network.gradients().examples();
    let divisor = match config.remainder {
        RemainderPolicy::Nominal => batch_size,
        RemainderPolicy::Actual => accumulated.max(1),
    };
    trace!("flushing {accumulated} example(s) with divisor {divisor}");
    network.apply_update(config.learning_rate, divisor)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::train::train_config::BatchSize;
    use rand::Rng;

    fn xor_data() -> Vec<Example> {
        vec![
            Example::new(vec![0.0, 0.0], vec![0.0]),
            Example::new(vec![0.0, 1.0], vec![1.0]),
            Example::new(vec![1.0, 0.0], vec![1.0]),
            Example::new(vec![1.0, 1.0], vec![0.0]),
        ]
    }

    /// Plays one epoch by hand: a `backward` per example in `order`, an
    /// `update` after every `batch` examples and after the last one.
    fn replay_epoch(network: &mut Network, data: &[Example], order: &[usize], batch: usize, lr: f64) -> f64 {
        let mut total = 0.0;
        for chunk in order.chunks(batch) {
            for &idx in chunk {
                total += network.backward(&data[idx].inputs, &data[idx].expected).unwrap();
            }
            network.update(lr, batch).unwrap();
        }
        total / data.len() as f64
    }

    fn assert_same_parameters(got: &Network, want: &Network) {
        for (g, w) in got.layers().iter().zip(want.layers()) {
            assert_eq!(g.weights, w.weights);
            assert_eq!(g.biases, w.biases);
        }
    }

    #[test]
    fn never_visits_examples_in_data_order() {
        let data = xor_data();
        let base = Network::new(&[2, 3, 1], 5).unwrap();
        let config = TrainConfig::new(2, BatchSize::Mini(2), 0.3).shuffle(ShufflePolicy::Never);

        let mut trained = base.clone();
        let errors = train_loop(&mut trained, &data, &config).unwrap();

        let mut manual = base.clone();
        let order: Vec<usize> = (0..data.len()).collect();
        let expected: Vec<f64> = (0..2)
            .map(|_| replay_epoch(&mut manual, &data, &order, 2, 0.3))
            .collect();

        assert_eq!(errors, expected);
        assert_same_parameters(&trained, &manual);
    }

    #[test]
    fn once_reuses_a_single_shuffled_order() {
        let data = xor_data();
        let base = Network::new(&[2, 3, 1], 6).unwrap();
        let config = TrainConfig::new(3, BatchSize::Mini(1), 0.2).shuffle(ShufflePolicy::Once);

        let mut trained = base.clone();
        let errors = train_loop(&mut trained, &data, &config).unwrap();

        let mut manual = base.clone();
        let mut order: Vec<usize> = (0..data.len()).collect();
        order.shuffle(manual.rng_mut());
        let expected: Vec<f64> = (0..3)
            .map(|_| replay_epoch(&mut manual, &data, &order, 1, 0.2))
            .collect();

        assert_eq!(errors, expected);
        assert_same_parameters(&trained, &manual);
        assert_eq!(trained.rng_mut().gen::<u64>(), manual.rng_mut().gen::<u64>());
    }

    #[test]
    fn every_epoch_reshuffles_the_previous_order() {
        let data = xor_data();
        let base = Network::new(&[2, 3, 1], 7).unwrap();
        let config = TrainConfig::new(3, BatchSize::Mini(3), 0.2)
            .shuffle(ShufflePolicy::EveryEpoch)
            .remainder(RemainderPolicy::Nominal);

        let mut trained = base.clone();
        let errors = train_loop(&mut trained, &data, &config).unwrap();

        let mut manual = base.clone();
        let mut order: Vec<usize> = (0..data.len()).collect();
        let mut expected = Vec::new();
        for _ in 0..3 {
            order.shuffle(manual.rng_mut());
            expected.push(replay_epoch(&mut manual, &data, &order, 3, 0.2));
        }

        assert_eq!(errors, expected);
        assert_same_parameters(&trained, &manual);
    }

    #[test]
    fn full_batch_ignores_the_shuffle_policy() {
        let data = xor_data();
        let base = Network::new(&[2, 4, 1], 8).unwrap();

        let mut manual = base.clone();
        let order: Vec<usize> = (0..data.len()).collect();
        let expected: Vec<f64> = (0..4)
            .map(|_| replay_epoch(&mut manual, &data, &order, data.len(), 0.5))
            .collect();

        for policy in [ShufflePolicy::Once, ShufflePolicy::EveryEpoch, ShufflePolicy::Never] {
            let mut trained = base.clone();
            let config = TrainConfig::new(4, BatchSize::Full, 0.5).shuffle(policy);
            let errors = train_loop(&mut trained, &data, &config).unwrap();

            assert_eq!(errors, expected, "{policy:?}");
            assert_same_parameters(&trained, &manual);
            // No shuffle means no draws from the network's random source.
            let mut untouched = base.clone();
            assert_eq!(trained.rng_mut().gen::<u64>(), untouched.rng_mut().gen::<u64>());
        }
    }
}
