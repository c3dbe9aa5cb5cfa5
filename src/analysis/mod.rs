//! Key and tempo estimation
//!
//! A batch job asks a single [`TrackAnalyzer`] for both estimates. The
//! stratum-dsp backend answers from one analysis pass; standalone
//! [`KeyDetector`] and [`TempoDetector`] implementations are combined with
//! [`DetectorPair`].

mod stratum;
mod traits;

pub use stratum::StratumAnalyzer;
pub use traits::{
    AnalysisError, DetectorPair, KeyDetector, TempoDetector, TrackAnalyzer, TrackEstimate,
};
