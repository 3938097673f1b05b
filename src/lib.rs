//! jailhttp - single-threaded HTTP/1.0 static file server
//!
//! Wire codec, per-connection parse state machine, root-jailed file
//! resolution and a readiness-polling event loop.

pub mod client;
pub mod config;
pub mod files;
pub mod http;
pub mod server;
