//! 1-D convolutional Q-network.
//!
//! A stack of `conv1d` + ReLU blocks followed by flattening, dropout and a
//! linear layer with one output per action. The sequence length after the
//! convolution stack, and the padding of each block when length-preserving
//! padding is requested, are worked out once by [`Dqn1dLayout`].
mod base;
mod config;
mod layout;
pub use base::Dqn1d;
pub use config::Dqn1dConfig;
pub use layout::Dqn1dLayout;
