//! Compressed buffer -> mono samples + stream metadata

use super::error::{DecodeError, Result};
use super::normalize::{normalize_frame, RawFrame};
use super::session::DecodeSession;
use crate::model::SampleBuffer;
use symphonia::core::errors::Error as SymphoniaError;

/// Fully decoded audio for one file
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DecodedAudio {
    /// Mono samples (first channel only)
    pub samples: SampleBuffer,

    /// Stream duration in microseconds
    pub duration_us: u64,

    /// Sample rate in Hz
    pub sample_rate: u32,
}

impl DecodedAudio {
    /// Duration truncated to whole seconds
    pub fn duration_secs(&self) -> u64 {
        self.duration_us / 1_000_000
    }
}

/// What came of submitting one packet of the selected track
enum PacketStep {
    /// Samples appended to the buffer
    Frames(usize),
    /// The decoder rejected the packet
    Failed { ts: u64, error: SymphoniaError },
}

fn stream_error(ts: u64, error: &SymphoniaError) -> DecodeError {
    DecodeError::Stream(format!("packet at ts {}: {}", ts, error))
}

/// Run the packet loop and return the number of frames decoded.
///
/// A decode or IO failure is held back until the next packet shows up: if
/// one does, the failure was mid-stream and aborts the file; if the stream
/// ends instead, it was the trailing packet and is dropped.
fn drain_packets<I>(steps: I) -> Result<u64>
where
    I: IntoIterator<Item = Result<PacketStep>>,
{
    let mut frames: u64 = 0;
    let mut held: Option<(u64, SymphoniaError)> = None;

    for step in steps {
        let step = step?;
        if let Some((ts, error)) = held.take() {
            return Err(stream_error(ts, &error));
        }

        match step {
            PacketStep::Frames(count) => frames += count as u64,
            PacketStep::Failed { ts, error } => match error {
                SymphoniaError::DecodeError(_) | SymphoniaError::IoError(_) => {
                    held = Some((ts, error));
                }
                other => return Err(stream_error(ts, &other)),
            },
        }
    }

    if let Some((ts, error)) = held {
        log::debug!("Ignoring undecodable final packet at ts {}: {}", ts, error);
    }
    Ok(frames)
}

/// Decode a compressed audio file held entirely in memory.
///
/// An empty buffer short-circuits to an empty result without touching the
/// decoder. Only the very last packet of the stream may fail to decode;
/// any earlier failure aborts with [`DecodeError::Stream`].
pub fn decode_audio(compressed: Vec<u8>) -> Result<DecodedAudio> {
    if compressed.is_empty() {
        return Ok(DecodedAudio::default());
    }

    let mut session = DecodeSession::open(compressed)?;
    let track_id = session.track_id();
    let mut samples = SampleBuffer::new();
    let mut sample_rate = session.sample_rate();

    let steps = std::iter::from_fn(|| loop {
        let packet = match session.next_packet() {
            Ok(Some(packet)) => packet,
            Ok(None) => return None,
            Err(e) => return Some(Err(e)),
        };
        if packet.track_id() != track_id {
            continue;
        }

        let step = match session.decode(&packet) {
            Ok(decoded) => {
                if sample_rate == 0 {
                    sample_rate = decoded.spec().rate;
                }
                let frame = RawFrame::from_symphonia(&decoded);
                normalize_frame(&frame, &mut samples).map(PacketStep::Frames)
            }
            Err(error) => Ok(PacketStep::Failed {
                ts: packet.ts(),
                error,
            }),
        };
        return Some(step);
    });
    let decoded_frames = drain_packets(steps)?;

    session.finalize();

    let duration_us = session.duration_us(decoded_frames, sample_rate);
    log::debug!(
        "Decoded {} samples ({:.1}s) at {}Hz",
        samples.len(),
        samples.seconds(sample_rate),
        sample_rate
    );

    Ok(DecodedAudio {
        samples,
        duration_us,
        sample_rate,
    })
}
