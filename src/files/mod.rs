//! Static file serving confined to a root directory.

pub mod resolver;

pub use resolver::{resolve, StaticResolver};
