//! BeepBox Core
//!
//! Platform-agnostic buffer types and error handling shared by the BeepBox
//! libraries and the command-line driver.
//!
//! # Example
//!
//! ```rust
//! use beepbox_core::ChannelBuffer;
//!
//! // One second of stereo silence at 44.1 kHz
//! let buffer = ChannelBuffer::silent(2, 44_100, 44_100);
//! assert_eq!(buffer.num_channels(), 2);
//! assert!((buffer.duration_secs() - 1.0).abs() < 1e-9);
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod error;
pub mod types;

pub use error::{CoreError, Result};
pub use types::{ChannelBuffer, SampleRate};
