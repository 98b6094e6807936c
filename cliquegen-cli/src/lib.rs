//! Support library for the cliquegen CLI binary.
//!
//! Exposes argument parsing and command execution so integration tests can
//! drive a generation run without spawning a subprocess.

pub mod cli;
pub mod logging;
