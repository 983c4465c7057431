//! Core data types

mod audio;

pub use audio::{AudioFormat, SampleBuffer, SampleRate, SampleWidth};
