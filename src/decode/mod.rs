//! In-memory audio decoding
//!
//! Compressed files are decoded straight from a byte buffer: the buffer is
//! exposed to symphonia through a pull-based read/seek source, the best
//! audio track is decoded packet by packet, and every decoded frame is
//! normalized into a mono [`SampleBuffer`](crate::model::SampleBuffer).

mod error;
mod normalize;
mod pipeline;
mod session;
mod source;

pub use error::{DecodeError, Result};
pub use normalize::{normalize_frame, Layout, RawFrame, SampleFormat};
pub use pipeline::{decode_audio, DecodedAudio};
pub use session::DecodeSession;
pub use source::{MemorySource, ReadOutcome, SeekMode};
