//! Attribute Protocol types shared with the radio stack ([Vol 3] Part F).

pub use handle::*;

mod handle;
