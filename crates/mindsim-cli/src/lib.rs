//! mindsim CLI crate
//!
//! Drives the mindsim runtime from the command line:
//! - `run`: tick an engine on its worker thread at a paced interval, with
//!   optional pokes and regional damage before the first tick, and export
//!   the final snapshot as JSON.
//! - `init`: write the default simulation configuration as TOML.
//! - `inspect`: summarise a generated network or an exported snapshot.
//!
//! The binary (src/main.rs) wires up logging and argument parsing and calls
//! [`MindsimCli::execute`]. The library surface exists so commands can be
//! exercised in tests without spawning a process.

pub mod commands;
pub mod config;
pub mod error;

pub use commands::MindsimCli;
