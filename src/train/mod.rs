pub mod example;
pub mod train_config;
pub mod loop_fn;

pub use example::Example;
pub use train_config::{BatchSize, RemainderPolicy, ShufflePolicy, TrainConfig};
pub use loop_fn::train_loop;
