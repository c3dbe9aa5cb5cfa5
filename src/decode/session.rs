//! Demux + decode context bound to one in-memory buffer

use super::error::{DecodeError, Result};
use super::source::MemorySource;
use symphonia::core::audio::AudioBufferRef;
use symphonia::core::codecs::{Decoder, DecoderOptions, CODEC_TYPE_NULL};
use symphonia::core::errors::Error as SymphoniaError;
use symphonia::core::formats::{FormatOptions, FormatReader, Packet, Track};
use symphonia::core::io::{MediaSourceStream, MediaSourceStreamOptions};
use symphonia::core::meta::MetadataOptions;
use symphonia::core::probe::Hint;
use symphonia::core::units::TimeBase;

/// Decoding state for a single file.
///
/// Created from the file's bytes, dropped when decoding returns. Never
/// shared between files.
pub struct DecodeSession {
    format: Box<dyn FormatReader>,
    decoder: Box<dyn Decoder>,
    track_id: u32,
    sample_rate: u32,
    time_base: Option<TimeBase>,
    n_frames: Option<u64>,
}

impl DecodeSession {
    /// Probe the buffer, select its best audio track and open a decoder for it.
    ///
    /// The container and codec are discovered from the bytes alone.
    pub fn open(compressed: Vec<u8>) -> Result<Self> {
        let source = MemorySource::new(compressed);
        let byte_len = source.len();

        let mss = MediaSourceStream::new(Box::new(source), MediaSourceStreamOptions::default());

        let probed = symphonia::default::get_probe()
            .format(
                &Hint::new(),
                mss,
                &FormatOptions::default(),
                &MetadataOptions::default(),
            )
            .map_err(|e| DecodeError::Setup(format!("cannot probe compressed buffer: {}", e)))?;

        let format = probed.format;

        let track = select_audio_track(format.tracks(), format.default_track())
            .ok_or_else(|| DecodeError::Setup("no audio stream found".to_string()))?;

        let track_id = track.id;
        let params = track.codec_params.clone();

        let decoder = symphonia::default::get_codecs()
            .make(&params, &DecoderOptions::default())
            .map_err(|e| DecodeError::Setup(format!("no compatible decoder: {}", e)))?;

        log::debug!(
            "Opened {} byte buffer: track {} codec {:?}, {} Hz, {:?} frames",
            byte_len,
            track_id,
            params.codec,
            params.sample_rate.unwrap_or(0),
            params.n_frames
        );

        Ok(Self {
            format,
            decoder,
            track_id,
            sample_rate: params.sample_rate.unwrap_or(0),
            time_base: params.time_base,
            n_frames: params.n_frames,
        })
    }

    pub fn track_id(&self) -> u32 {
        self.track_id
    }

    /// Sample rate declared by the container (0 if it declares none)
    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    /// Next compressed packet from any track, `None` at end of stream
    pub fn next_packet(&mut self) -> Result<Option<Packet>> {
        match self.format.next_packet() {
            Ok(packet) => Ok(Some(packet)),
            Err(SymphoniaError::IoError(e)) if e.kind() == std::io::ErrorKind::UnexpectedEof => {
                Ok(None)
            }
            Err(SymphoniaError::ResetRequired) => {
                log::debug!("Stream reset requested, treating as end of stream");
                Ok(None)
            }
            Err(e) => Err(DecodeError::Stream(format!("cannot read packet: {}", e))),
        }
    }

    /// Submit one packet to the decoder and return the frame it yields
    pub fn decode(&mut self, packet: &Packet) -> std::result::Result<AudioBufferRef<'_>, SymphoniaError> {
        self.decoder.decode(packet)
    }

    /// Tell the decoder that no more packets follow.
    ///
    /// symphonia decoders hand back one buffer per packet and hold nothing
    /// back, so this yields no samples. It only reports the codec's own
    /// integrity check (e.g. the FLAC MD5), `None` when the codec has none.
    pub fn finalize(&mut self) -> Option<bool> {
        let verify_ok = self.decoder.finalize().verify_ok;
        if verify_ok == Some(false) {
            log::warn!("Decoder verification failed for track {}", self.track_id);
        }
        verify_ok
    }

    /// Stream duration in microseconds.
    ///
    /// Uses the container's frame count when it has one, otherwise the
    /// number of frames actually decoded.
    pub fn duration_us(&self, decoded_frames: u64, sample_rate: u32) -> u64 {
        let frames = self.n_frames.unwrap_or(decoded_frames);
        let time_base = self
            .time_base
            .or_else(|| (sample_rate > 0).then(|| TimeBase::new(1, sample_rate)));

        match time_base {
            Some(tb) => {
                let time = tb.calc_time(frames);
                time.seconds * 1_000_000 + (time.frac * 1_000_000.0).round() as u64
            }
            None => 0,
        }
    }
}

fn is_audio(track: &Track) -> bool {
    track.codec_params.codec != CODEC_TYPE_NULL
}

/// Prefer the container's default track when it is audio, else the first audio track
fn select_audio_track<'a>(tracks: &'a [Track], default: Option<&'a Track>) -> Option<&'a Track> {
    default
        .filter(|t| is_audio(t))
        .or_else(|| tracks.iter().find(|t| is_audio(t)))
}
