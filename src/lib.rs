//! # Caliente
//!
//! Run audio through a SPICE circuit simulation and get audio back.
//!
//! This library provides:
//! - Amplitude mapping between fixed-point audio samples and simulator volts
//! - Time alignment of a simulator's irregular output onto the input's sample grid
//! - A pipeline tying both together around a pluggable simulator
//! - Simulator stimulus files (piecewise-linear source table, transient parameters)
//!
//! ## Architecture
//!
//! The library is organized into several modules:
//!
//! - [`signal`] - Sample, voltage and trace sequences
//! - [`mapping`] - Affine map between sample widths and volts
//! - [`align`] - Trace-to-grid alignment strategies
//! - [`pipeline`] - End-to-end orchestration and its policies
//! - [`stimulus`] - Simulator input files
//! - [`audio`] - Raw PCM and text trace I/O (CLI only)
//!
//! ## Usage
//!
//! ### Native CLI
//!
//! ```bash
//! ffmpeg -i in.wav -f s16le -ac 1 - | caliente stimulus -w 2 -r 48000 -a 9 -o circuit/
//! # run the simulator, export V(vout) as text
//! caliente reconstruct -w 2 -r 48000 -n 480000 -a 9 vout.txt | ffmpeg -f s16le -ac 1 -ar 48000 -i - out.wav
//! ```
//!
//! ### Library
//!
//! ```no_run
//! use caliente::{Pipeline, PipelineConfig, SampleSequence, SampleWidth, SimulatorTrace, VoltageSequence};
//!
//! # fn run_spice(_: &VoltageSequence, _: f64) -> Result<SimulatorTrace, std::io::Error> { unimplemented!() }
//! let input = SampleSequence::new(SampleWidth::I16, 48000, vec![0, 1000, -1000])?;
//! let pipeline = Pipeline::new(PipelineConfig::new(9.0))?;
//! let output = pipeline.run(&input, &mut run_spice)?;
//! assert_eq!(output.samples.len(), input.len());
//! # Ok::<(), caliente::CalienteError>(())
//! ```
//!
//! ## Alignment Method
//!
//! The simulator's adaptive time stepping rarely lands on the input's sample
//! instants. For each instant `t[i] = i / framerate` the aligner walks the trace
//! forward and, by default, takes the first point at or after `t[i]`. Linear
//! interpolation between bracketing points is available as an alternative.

pub mod align;
pub mod error;
pub mod mapping;
pub mod pipeline;
pub mod signal;
pub mod stimulus;

#[cfg(feature = "cli")]
pub mod audio;

// Re-export main types for convenience
pub use align::{AlignmentStrategy, TimeAligner};
pub use error::{CalienteError, Result};
pub use mapping::{AmplitudeMapper, NarrowingPolicy};
pub use pipeline::{OffsetPolicy, Pipeline, PipelineConfig, PipelineOutput, ShortAlignmentPolicy, SimulatorInvoker};
pub use signal::{
    AlignedVoltageSequence, Precision, SampleSequence, SampleWidth, SimulatorTrace, TimeGrid, TracePoint,
    VoltageSequence,
};

// WASM bindings
#[cfg(feature = "wasm")]
mod wasm;

#[cfg(feature = "wasm")]
pub use wasm::WasmCaliente;

/// Default framerate in Hz
pub const DEFAULT_FRAMERATE: u32 = 48000;
