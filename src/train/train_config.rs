use serde::{Deserialize, Serialize};

use crate::error::{NetworkError, Result};

/// Number of examples per parameter update.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BatchSize {
    /// One update per epoch over the whole data set.
    Full,
    Mini(usize),
}

impl BatchSize {
    /// Maps the signed convention used by `Network::train`: `-1` is the full
    /// batch, positive values are mini-batches.
    pub fn from_signed(batch_size: i64, examples: usize) -> Result<BatchSize> {
        match batch_size {
            -1 => Ok(BatchSize::Full),
            n if n >= 1 => Ok(BatchSize::Mini(n as usize)),
            n => Err(NetworkError::InvalidBatchSize { batch_size: n, examples }),
        }
    }

    /// Concrete batch size for a data set of `examples` items; must end up
    /// in `[1, examples]`.
    pub fn resolve(&self, examples: usize) -> Result<usize> {
        let size = match *self {
            BatchSize::Full => examples,
            BatchSize::Mini(n) => n,
        };
        if size < 1 || size > examples {
            return Err(NetworkError::InvalidBatchSize { batch_size: size as i64, examples });
        }
        Ok(size)
    }
}

/// When the example order is shuffled. Full-batch runs are never shuffled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ShufflePolicy {
    /// Once, before the first epoch; every epoch then sees the same order.
    #[default]
    Once,
    EveryEpoch,
    Never,
}

/// Divisor used when flushing the trailing partial batch of an epoch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RemainderPolicy {
    /// The configured batch size, even if fewer examples were accumulated.
    #[default]
    Nominal,
    /// The number of examples actually accumulated.
    Actual,
}

/// Configuration for a `train_loop` run.
///
/// # Fields
/// - `epochs`        : total number of full passes over the training data
/// - `batch_size`    : examples per update; `BatchSize::Full` for full-batch descent
/// - `learning_rate` : step size; divided by the batch size at each update
/// - `shuffle`       : when the example order is shuffled
/// - `remainder`     : divisor for the trailing partial batch
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrainConfig {
    pub epochs: usize,
    pub batch_size: BatchSize,
    pub learning_rate: f64,
    #[serde(default)]
    pub shuffle: ShufflePolicy,
    #[serde(default)]
    pub remainder: RemainderPolicy,
}

impl Default for TrainConfig {
    fn default() -> Self {
        TrainConfig {
            epochs: 1000,
            batch_size: BatchSize::Full,
            learning_rate: 0.1,
            shuffle: ShufflePolicy::default(),
            remainder: RemainderPolicy::default(),
        }
    }
}

impl TrainConfig {
    /// Creates a `TrainConfig` with the default shuffle and remainder policies.
    pub fn new(epochs: usize, batch_size: BatchSize, learning_rate: f64) -> Self {
        TrainConfig {
            epochs,
            batch_size,
            learning_rate,
            ..TrainConfig::default()
        }
    }

    pub fn shuffle(mut self, shuffle: ShufflePolicy) -> Self {
        self.shuffle = shuffle;
        self
    }

    pub fn remainder(mut self, remainder: RemainderPolicy) -> Self {
        self.remainder = remainder;
        self
    }

    /// Checks the hyperparameters that do not depend on the data set.
    pub fn validate(&self) -> Result<()> {
        if self.epochs < 1 {
            return Err(NetworkError::InvalidHyperparameter(
                "epochs must be at least 1".to_string(),
            ));
        }
        if !(self.learning_rate > 0.0 && self.learning_rate.is_finite()) {
            return Err(NetworkError::InvalidHyperparameter(format!(
                "learning rate must be positive and finite, got {}",
                self.learning_rate
            )));
        }
        Ok(())
    }

    /// Serializes the config to a pretty-printed JSON file.
    pub fn save_json(&self, path: &str) -> Result<()> {
        let file = std::fs::File::create(path)?;
        let writer = std::io::BufWriter::new(file);
        serde_json::to_writer_pretty(writer, self)?;
        Ok(())
    }

    /// Deserializes a config from a JSON file previously written by `save_json`.
    pub fn load_json(path: &str) -> Result<TrainConfig> {
        let file = std::fs::File::open(path)?;
        let reader = std::io::BufReader::new(file);
        Ok(serde_json::from_reader(reader)?)
    }
}
