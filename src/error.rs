//! Error types for the caliente pipeline.
//!
//! This module provides a unified error type [`CalienteError`] that covers
//! amplitude mapping, time alignment, the simulator collaborator and the
//! raw I/O boundary used by the command-line frontend.

use thiserror::Error;

/// Result type alias using [`CalienteError`].
pub type Result<T> = std::result::Result<T, CalienteError>;

/// Boxed error returned by a simulator collaborator.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Unified error type for all caliente operations.
#[derive(Error, Debug)]
pub enum CalienteError {
    // ============ Signal Errors ============
    /// Sample width is not 1, 2 or 4 bytes
    #[error("Unsupported sample width: {width} bytes (expected 1, 2 or 4)")]
    UnsupportedSampleWidth { width: u16 },

    /// Only mono audio is accepted
    #[error("Unsupported channel count: {channels} (only mono is supported)")]
    UnsupportedChannelCount { channels: u16 },

    /// Framerate must be positive
    #[error("Invalid framerate: {framerate}")]
    InvalidFramerate { framerate: u32 },

    /// A sample sequence needs at least one sample
    #[error("Sample sequence is empty")]
    EmptySequence,

    /// A value does not fit the target sample width
    #[error("Value {value} at index {index} is out of range for the sample width")]
    OutOfRange { index: usize, value: f64 },

    // ============ Mapping Errors ============
    /// Amplitude is zero or not a finite number
    #[error("Degenerate amplitude range: {amplitude} V")]
    DegenerateRange { amplitude: f64 },

    // ============ Simulation Errors ============
    /// The simulator collaborator failed
    #[error("Simulation failed: {source}")]
    SimulationFailed {
        #[source]
        source: BoxError,
    },

    /// The simulator trace ran out before every input instant was covered
    #[error("Alignment produced {produced} of {expected} samples")]
    ShortAlignment { expected: usize, produced: usize },

    // ============ I/O Errors ============
    /// Error reading a trace or PCM file
    #[error("Failed to read file '{path}': {source}")]
    FileReadError {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// Malformed line in a text trace
    #[error("Trace parse error at line {line}: {message}")]
    TraceParseError { line: usize, message: String },

    /// Error writing simulator input files
    #[error("Failed to write stimulus '{path}': {source}")]
    StimulusWriteError {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// Error reading audio input
    #[error("Audio input error: {message}")]
    AudioInputError { message: String },

    /// Error writing audio output
    #[error("Audio output error: {message}")]
    AudioOutputError { message: String },
}

impl CalienteError {
    /// Create an out-of-range error
    pub fn out_of_range(index: usize, value: f64) -> Self {
        Self::OutOfRange { index, value }
    }

    /// Create a trace parse error
    pub fn trace_parse(line: usize, message: impl Into<String>) -> Self {
        Self::TraceParseError {
            line,
            message: message.into(),
        }
    }

    /// Wrap a simulator collaborator error
    pub fn simulation_failed(source: impl Into<BoxError>) -> Self {
        Self::SimulationFailed {
            source: source.into(),
        }
    }
}
