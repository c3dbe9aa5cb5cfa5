//! Frame normalization into the canonical mono f32 representation
//!
//! Output contract:
//! - exactly one f32 per input sample-frame
//! - 16-bit integers are widened, never rescaled
//! - 32-bit floats are copied as-is
//! - only the first channel is kept; channels 2..N are discarded
//! - any other sample width is rejected

use super::error::{DecodeError, Result};
use crate::model::{SampleBuffer, SampleScale};
use std::fmt;
use symphonia::core::audio::{AudioBuffer, AudioBufferRef, Signal};
use symphonia::core::sample::Sample;

/// Sample encoding of a decoded frame
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SampleFormat {
    U8,
    U16,
    U24,
    U32,
    S8,
    S16,
    S24,
    S32,
    F32,
    F64,
}

impl SampleFormat {
    pub fn bits(&self) -> u32 {
        match self {
            SampleFormat::U8 | SampleFormat::S8 => 8,
            SampleFormat::U16 | SampleFormat::S16 => 16,
            SampleFormat::U24 | SampleFormat::S24 => 24,
            SampleFormat::U32 | SampleFormat::S32 | SampleFormat::F32 => 32,
            SampleFormat::F64 => 64,
        }
    }
}

impl fmt::Display for SampleFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let kind = match self {
            SampleFormat::U8 | SampleFormat::U16 | SampleFormat::U24 | SampleFormat::U32 => {
                "unsigned integer"
            }
            SampleFormat::S8 | SampleFormat::S16 | SampleFormat::S24 | SampleFormat::S32 => {
                "signed integer"
            }
            SampleFormat::F32 | SampleFormat::F64 => "float",
        };
        write!(f, "{}-bit {}", self.bits(), kind)
    }
}

/// Channel arrangement of a decoded frame
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Layout {
    /// One contiguous plane per channel
    Planar,
    /// A single plane, channels alternating per sample
    Interleaved,
}

/// Backend-neutral view of one decoded frame.
///
/// Planes hold native-endian sample bytes. A planar frame may carry only
/// the planes the normalizer needs (the first one).
#[derive(Debug, Clone)]
pub struct RawFrame<'a> {
    pub format: SampleFormat,
    pub layout: Layout,
    pub channels: usize,
    pub frames: usize,
    pub planes: Vec<&'a [u8]>,
}

impl<'a> RawFrame<'a> {
    pub fn planar(format: SampleFormat, frames: usize, planes: Vec<&'a [u8]>) -> Self {
        Self {
            format,
            layout: Layout::Planar,
            channels: planes.len(),
            frames,
            planes,
        }
    }

    pub fn interleaved(format: SampleFormat, channels: usize, frames: usize, data: &'a [u8]) -> Self {
        Self {
            format,
            layout: Layout::Interleaved,
            channels,
            frames,
            planes: vec![data],
        }
    }

    /// View a symphonia decoder output as a raw frame
    pub fn from_symphonia(decoded: &'a AudioBufferRef<'_>) -> Self {
        match decoded {
            AudioBufferRef::S16(buf) => planar_view(SampleFormat::S16, &**buf),
            AudioBufferRef::F32(buf) => planar_view(SampleFormat::F32, &**buf),
            AudioBufferRef::U8(buf) => opaque_view(SampleFormat::U8, &**buf),
            AudioBufferRef::U16(buf) => opaque_view(SampleFormat::U16, &**buf),
            AudioBufferRef::U24(buf) => opaque_view(SampleFormat::U24, &**buf),
            AudioBufferRef::U32(buf) => opaque_view(SampleFormat::U32, &**buf),
            AudioBufferRef::S8(buf) => opaque_view(SampleFormat::S8, &**buf),
            AudioBufferRef::S24(buf) => opaque_view(SampleFormat::S24, &**buf),
            AudioBufferRef::S32(buf) => opaque_view(SampleFormat::S32, &**buf),
            AudioBufferRef::F64(buf) => opaque_view(SampleFormat::F64, &**buf),
        }
    }
}

fn planar_view<'a, S>(format: SampleFormat, buf: &'a AudioBuffer<S>) -> RawFrame<'a>
where
    S: Sample + bytemuck::Pod,
{
    let channels = buf.spec().channels.count();
    let planes = (0..channels)
        .map(|ch| bytemuck::cast_slice::<S, u8>(buf.chan(ch)))
        .collect();
    RawFrame::planar(format, buf.frames(), planes)
}

/// Frame whose samples the normalizer will never read
fn opaque_view<S: Sample>(format: SampleFormat, buf: &AudioBuffer<S>) -> RawFrame<'static> {
    RawFrame {
        format,
        layout: Layout::Planar,
        channels: buf.spec().channels.count(),
        frames: buf.frames(),
        planes: Vec::new(),
    }
}

/// Append the first channel of `frame` to `out`.
///
/// Returns the number of samples appended, which always equals
/// `frame.frames` on success.
pub fn normalize_frame(frame: &RawFrame<'_>, out: &mut SampleBuffer) -> Result<usize> {
    let (width, scale) = match frame.format {
        SampleFormat::S16 => (2, SampleScale::Int16),
        SampleFormat::F32 => (4, SampleScale::Unit),
        other => {
            return Err(DecodeError::Format(format!(
                "{} samples are not supported",
                other
            )))
        }
    };

    if frame.channels == 0 {
        return Err(DecodeError::Format("frame has no channels".to_string()));
    }
    if frame.frames == 0 {
        return Ok(0);
    }

    let stride = match frame.layout {
        Layout::Planar => width,
        Layout::Interleaved => width * frame.channels,
    };

    let data = frame
        .planes
        .first()
        .ok_or_else(|| DecodeError::Format("frame has no sample data".to_string()))?;

    let needed = (frame.frames - 1) * stride + width;
    if data.len() < needed {
        return Err(DecodeError::Format(format!(
            "frame of {} samples needs {} bytes, got {}",
            frame.frames,
            needed,
            data.len()
        )));
    }

    // each chunk starts with one channel-0 sample
    let first_channel = data.chunks(stride).take(frame.frames);
    out.reserve(frame.frames);

    match frame.format {
        SampleFormat::S16 => out.append(
            first_channel.map(|c| f32::from(i16::from_ne_bytes([c[0], c[1]]))),
            scale,
        ),
        _ => out.append(
            first_channel.map(|c| f32::from_ne_bytes([c[0], c[1], c[2], c[3]])),
            scale,
        ),
    }

    Ok(frame.frames)
}
