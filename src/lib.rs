pub mod error;
pub mod math;
pub mod activation;
pub mod layers;
pub mod network;
pub mod loss;
pub mod optim;
pub mod train;

// Convenience re-exports
pub use error::{NetworkError, Result};
pub use math::matrix::Matrix;
pub use activation::activation::ActivationFunction;
pub use layers::dense::{Layer, LayerRole};
pub use network::{backpropagate, ForwardPass, Gradients, Network};
pub use loss::mse::MseLoss;
pub use optim::sgd::Sgd;
pub use train::{train_loop, BatchSize, Example, RemainderPolicy, ShufflePolicy, TrainConfig};
