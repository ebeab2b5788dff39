//! # Cutline Core
//!
//! Time arithmetic shared by every Cutline component.
//!
//! This crate provides:
//! - [`RationalTime`]: a value/rate pair with rate-aware comparison and arithmetic
//! - [`TimeRange`]: a start and non-negative duration
//! - [`Rational`]: exact rationals for frame rates and rescaling
//! - [`FrameRate`]: integer timebases with optional NTSC pulldown
//!
//! ```
//! use cutline_core::{RationalTime, TimeRange};
//!
//! let a = RationalTime::new(24.0, 24.0);
//! let b = RationalTime::new(15.0, 30.0);
//! assert_eq!(a + b, RationalTime::new(1.5, 1.0));
//!
//! let range = TimeRange::new(RationalTime::new(10.0, 30.0), RationalTime::new(5.0, 30.0));
//! assert_eq!(range.end_time_exclusive().unwrap(), RationalTime::new(15.0, 30.0));
//! ```

pub mod error;
pub mod rate;
pub mod rational;
pub mod time;

pub use error::{Result, TimeError};
pub use rate::FrameRate;
pub use rational::Rational;
pub use time::{rate_for_range, RationalTime, TimeRange};
