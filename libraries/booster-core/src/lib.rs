//! Sound Booster Core
//!
//! Format-agnostic building blocks shared by every Sound Booster crate.
//!
//! # Architecture
//!
//! The core crate defines:
//! - **Audio Types**: `SampleBuffer`, `AudioFormat`, `SampleRate`, `SampleWidth`
//! - **Codec Traits**: `AudioDecoder`, `AudioEncoder`
//! - **Error Handling**: Unified `BoosterError` and `Result` types
//!
//! # Example
//!
//! ```rust
//! use booster_core::{AudioFormat, SampleBuffer, SampleRate, SampleWidth};
//!
//! let format = AudioFormat::new(SampleRate::DVD_QUALITY, 2, SampleWidth::Two);
//! let buffer = SampleBuffer::new(vec![100, -100, 200, -200], format).unwrap();
//!
//! assert_eq!(buffer.frames(), 2);
//! assert_eq!(buffer.sample_width().max_value(), 32767);
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod error;
pub mod traits;
pub mod types;

pub use error::{BoosterError, ErrorKind, Result};
pub use traits::{AudioDecoder, AudioEncoder};
pub use types::{AudioFormat, SampleBuffer, SampleRate, SampleWidth};
