//! Sample and voltage sequence representation.
//!
//! The pipeline moves data through four shapes:
//!
//! - [`SampleSequence`]: mono fixed-point audio, the input and the output
//! - [`VoltageSequence`]: the same instants in volts, fed to the simulator
//! - [`SimulatorTrace`]: irregular `(time, voltage)` pairs from the simulator
//! - [`AlignedVoltageSequence`]: the trace placed back on the input's [`TimeGrid`]
//!
//! Every stage returns a new owned value; nothing is mutated in place.

mod sequence;
mod types;

pub use sequence::{AlignedVoltageSequence, SampleSequence, SimulatorTrace, TracePoint, VoltageSequence};
pub use types::*;
