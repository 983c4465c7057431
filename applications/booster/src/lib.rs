//! Sound Booster command-line front end
//!
//! The binary lives in `main.rs`; configuration loading is exposed here so
//! it can be tested on its own.

pub mod config;
