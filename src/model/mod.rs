//! Data model shared by decoding, analysis and reporting
//!
//! These types are independent of both the decode backend and the
//! analysis backend.

mod key;
mod result;
mod samples;

pub use key::MusicalKey;
pub use result::{JobResult, TrackReport};
pub use samples::{SampleBuffer, SampleScale};
