//! Canonical decoded audio: mono f32 samples at the source rate

/// Numeric scale of the values held by a [`SampleBuffer`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SampleScale {
    /// Float samples copied from a float source, nominally in [-1.0, 1.0]
    #[default]
    Unit,

    /// 16-bit integer samples widened to f32 without rescaling
    Int16,
}

/// Mono audio buffer produced by the decode pipeline.
///
/// Samples can only be appended; nothing is ever removed or reordered
/// once written.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SampleBuffer {
    samples: Vec<f32>,
    scale: SampleScale,
}

impl SampleBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn as_slice(&self) -> &[f32] {
        &self.samples
    }

    pub fn scale(&self) -> SampleScale {
        self.scale
    }

    /// Duration covered by the buffered samples at `sample_rate`
    pub fn seconds(&self, sample_rate: u32) -> f64 {
        if sample_rate == 0 {
            return 0.0;
        }
        self.samples.len() as f64 / f64::from(sample_rate)
    }

    pub(crate) fn reserve(&mut self, additional: usize) {
        self.samples.reserve(additional);
    }

    pub(crate) fn append<I>(&mut self, samples: I, scale: SampleScale)
    where
        I: IntoIterator<Item = f32>,
    {
        self.scale = scale;
        self.samples.extend(samples);
    }
}
