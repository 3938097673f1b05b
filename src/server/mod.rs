//! The event loop that accepts connections and answers them.

pub mod listener;

pub use listener::{Server, ShutdownHandle};
