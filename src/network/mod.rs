pub mod backprop;
pub mod gradients;
pub mod network;
pub mod pass;

pub use backprop::backpropagate;
pub use gradients::Gradients;
pub use network::Network;
pub use pass::ForwardPass;
