//! End-to-end pipeline: samples to volts, simulation, and back.
//!
//! ```text
//! SampleSequence --to_voltage--> VoltageSequence --simulate--> SimulatorTrace
//!                                                                   |
//! SampleSequence <--to_samples-- AlignedVoltageSequence <--align----+
//! ```
//!
//! The simulator itself is an external collaborator reached through
//! [`SimulatorInvoker`]. Everything else is pure and runs on in-memory data.

use log::{debug, warn};

use crate::align::{AlignmentStrategy, TimeAligner};
use crate::error::{CalienteError, Result};
use crate::mapping::{AmplitudeMapper, NarrowingPolicy};
use crate::signal::{
    AlignedVoltageSequence, Precision, SampleSequence, SampleWidth, SimulatorTrace, TimeGrid,
    VoltageSequence,
};

/// Runs the circuit simulation for one input.
pub trait SimulatorInvoker {
    type Error: std::error::Error + Send + Sync + 'static;

    /// Simulate `input`, whose samples are `period` seconds apart.
    fn simulate(&mut self, input: &VoltageSequence, period: f64) -> std::result::Result<SimulatorTrace, Self::Error>;
}

impl<F, E> SimulatorInvoker for F
where
    F: FnMut(&VoltageSequence, f64) -> std::result::Result<SimulatorTrace, E>,
    E: std::error::Error + Send + Sync + 'static,
{
    type Error = E;

    fn simulate(&mut self, input: &VoltageSequence, period: f64) -> std::result::Result<SimulatorTrace, E> {
        self(input, period)
    }
}

/// What to do when the trace covers fewer instants than the input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ShortAlignmentPolicy {
    /// Repeat the last aligned value up to the input length.
    #[default]
    Pad,
    /// Return the shorter output as is.
    Truncate,
    /// Return [`CalienteError::ShortAlignment`].
    Fail,
}

/// How the forward offset is treated on the way back.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OffsetPolicy {
    /// Map aligned voltages back unchanged. The output carries the offset as
    /// a bias of `offset / amplitude` of full scale.
    #[default]
    Retain,
    /// Subtract `offset_volts` before mapping back.
    Remove,
}

/// Configuration for the pipeline.
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    /// Voltage span covered by the full sample range.
    pub amplitude_volts: f64,
    /// Voltage the lowest sample maps to.
    pub offset_volts: f64,
    /// Precision of voltages and time instants.
    pub precision: Precision,
    /// Out-of-range policy when mapping back to samples.
    pub narrowing: NarrowingPolicy,
    /// How trace points are picked for each input instant.
    pub alignment: AlignmentStrategy,
    /// What to do with a short alignment.
    pub short_alignment: ShortAlignmentPolicy,
    /// Whether the offset is removed before mapping back.
    pub offset_policy: OffsetPolicy,
    /// Feed the simulator midpoint-upsampled input at twice the framerate.
    pub midpoint_upsample: bool,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            amplitude_volts: 1.0,
            offset_volts: 0.0,
            precision: Precision::default(),
            narrowing: NarrowingPolicy::default(),
            alignment: AlignmentStrategy::default(),
            short_alignment: ShortAlignmentPolicy::default(),
            offset_policy: OffsetPolicy::default(),
            midpoint_upsample: false,
        }
    }
}

impl PipelineConfig {
    /// Create a configuration spanning `amplitude_volts`, other values default.
    pub fn new(amplitude_volts: f64) -> Self {
        Self {
            amplitude_volts,
            ..Self::default()
        }
    }

    pub fn with_offset(mut self, offset_volts: f64) -> Self {
        self.offset_volts = offset_volts;
        self
    }

    pub fn with_precision(mut self, precision: Precision) -> Self {
        self.precision = precision;
        self
    }

    pub fn with_narrowing(mut self, narrowing: NarrowingPolicy) -> Self {
        self.narrowing = narrowing;
        self
    }

    pub fn with_alignment(mut self, alignment: AlignmentStrategy) -> Self {
        self.alignment = alignment;
        self
    }

    pub fn with_short_alignment(mut self, policy: ShortAlignmentPolicy) -> Self {
        self.short_alignment = policy;
        self
    }

    pub fn with_offset_policy(mut self, policy: OffsetPolicy) -> Self {
        self.offset_policy = policy;
        self
    }

    pub fn with_midpoint_upsample(mut self, enabled: bool) -> Self {
        self.midpoint_upsample = enabled;
        self
    }
}

/// Result of one reconstruction.
#[derive(Debug, Clone, PartialEq)]
pub struct PipelineOutput {
    /// Reconstructed audio.
    pub samples: SampleSequence,
    /// Input instants the trace did not reach, before the short-alignment
    /// policy was applied.
    pub shortfall: usize,
}

/// The amplitude-mapping and time-alignment pipeline.
#[derive(Debug, Clone)]
pub struct Pipeline {
    config: PipelineConfig,
    mapper: AmplitudeMapper,
    aligner: TimeAligner,
}

impl Pipeline {
    /// Build a pipeline, rejecting a degenerate amplitude.
    pub fn new(config: PipelineConfig) -> Result<Self> {
        let mapper = AmplitudeMapper::new(config.amplitude_volts)?
            .with_precision(config.precision)
            .with_narrowing(config.narrowing);
        let aligner = TimeAligner::new(config.alignment);
        Ok(Self {
            config,
            mapper,
            aligner,
        })
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    pub fn mapper(&self) -> &AmplitudeMapper {
        &self.mapper
    }

    /// Map input samples to the voltages handed to the simulator.
    ///
    /// Times of the result are rounded to the configured precision.
    pub fn prepare(&self, input: &SampleSequence) -> Result<VoltageSequence> {
        let volts = self.mapper.to_voltage(input, self.config.offset_volts);
        if self.config.midpoint_upsample {
            volts.upsample_midpoints()
        } else {
            Ok(volts)
        }
    }

    /// Rebuild `grid.len()` samples of `width` from a simulator trace.
    pub fn reconstruct(&self, grid: &TimeGrid, width: SampleWidth, trace: &SimulatorTrace) -> Result<PipelineOutput> {
        debug!("aligning {} trace points onto {} instants", trace.len(), grid.len());

        let aligned = self.aligner.align(grid, trace);
        let shortfall = aligned.shortfall();
        let aligned = self.apply_short_policy(aligned, grid)?;
        let aligned = match self.config.offset_policy {
            OffsetPolicy::Retain => aligned,
            OffsetPolicy::Remove => {
                let offset = self.config.offset_volts;
                aligned.map_voltages(|v| v - offset)
            }
        };
        let samples = self.mapper.to_samples(&aligned, width)?;
        Ok(PipelineOutput { samples, shortfall })
    }

    /// Run the whole pipeline through `simulator`.
    ///
    /// The output has the input's width and framerate.
    pub fn run<S: SimulatorInvoker>(&self, input: &SampleSequence, simulator: &mut S) -> Result<PipelineOutput> {
        let volts = self.prepare(input)?;
        let period = volts.period();
        debug!(
            "simulating {} input steps, period {:.3e} s",
            volts.len(),
            period
        );

        let trace = simulator
            .simulate(&volts, period)
            .map_err(CalienteError::simulation_failed)?;
        debug!("simulator returned {} points", trace.len());

        let grid = input.time_grid(self.config.precision)?;
        self.reconstruct(&grid, input.width(), &trace)
    }

    fn apply_short_policy(&self, aligned: AlignedVoltageSequence, grid: &TimeGrid) -> Result<AlignedVoltageSequence> {
        if !aligned.is_short() {
            return Ok(aligned);
        }
        let short = CalienteError::ShortAlignment {
            expected: aligned.expected(),
            produced: aligned.len(),
        };
        // Nothing to pad from, and a sample sequence cannot be empty.
        if aligned.is_empty() {
            return Err(short);
        }

        match self.config.short_alignment {
            ShortAlignmentPolicy::Fail => Err(short),
            ShortAlignmentPolicy::Truncate => {
                warn!("{short}; truncating output");
                Ok(aligned)
            }
            ShortAlignmentPolicy::Pad => {
                warn!("{short}; repeating last value");
                aligned.padded(grid).ok_or(short)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::signal::TracePoint;
    use std::convert::Infallible;

    fn echo(input: &VoltageSequence, _period: f64) -> std::result::Result<SimulatorTrace, Infallible> {
        Ok(input.iter_timed().map(TracePoint::from).collect())
    }

    fn input() -> SampleSequence {
        SampleSequence::new(SampleWidth::I16, 8000, vec![-32768, -100, 0, 250, 32767]).unwrap()
    }

    #[test]
    fn test_rejects_degenerate_amplitude() {
        assert!(matches!(
            Pipeline::new(PipelineConfig::new(0.0)),
            Err(CalienteError::DegenerateRange { .. })
        ));
    }

    #[test]
    fn test_identity_simulator_round_trips() {
        let pipeline = Pipeline::new(PipelineConfig::new(9.0)).unwrap();
        let out = pipeline.run(&input(), &mut echo).unwrap();
        assert_eq!(out.samples, input());
        assert_eq!(out.shortfall, 0);
    }

    #[test]
    fn test_upsampled_round_trip() {
        let config = PipelineConfig::new(9.0).with_midpoint_upsample(true);
        let pipeline = Pipeline::new(config).unwrap();
        assert_eq!(pipeline.prepare(&input()).unwrap().len(), 10);
        let out = pipeline.run(&input(), &mut echo).unwrap();
        assert_eq!(out.samples, input());
    }

    #[test]
    fn test_upsample_overflowing_framerate_fails() {
        let input = SampleSequence::new(SampleWidth::I16, 3_000_000_000, vec![0, 1, 2]).unwrap();
        let pipeline = Pipeline::new(PipelineConfig::new(9.0).with_midpoint_upsample(true)).unwrap();
        assert!(matches!(
            pipeline.prepare(&input),
            Err(CalienteError::InvalidFramerate { .. })
        ));
        assert!(matches!(
            pipeline.run(&input, &mut echo),
            Err(CalienteError::InvalidFramerate { .. })
        ));
    }

    #[test]
    fn test_offset_policy() {
        let retain = Pipeline::new(PipelineConfig::new(4.0).with_offset(1.0)).unwrap();
        let out = retain.run(&input(), &mut echo).unwrap();
        assert_ne!(out.samples, input());
        // A quarter of full scale (16383.75 steps) is added to every sample.
        assert_eq!(out.samples.samples()[0], -32768 + 16384);

        let remove = Pipeline::new(
            PipelineConfig::new(4.0)
                .with_offset(1.0)
                .with_offset_policy(OffsetPolicy::Remove),
        )
        .unwrap();
        assert_eq!(remove.run(&input(), &mut echo).unwrap().samples, input());
    }

    #[test]
    fn test_short_alignment_policies() {
        let grid = TimeGrid::new(4, 1, Precision::Double).unwrap();
        let trace: SimulatorTrace = [(0.0, 0.25), (1.0, 0.5)]
            .into_iter()
            .map(TracePoint::from)
            .collect();
        let width = SampleWidth::I8;

        let pad = Pipeline::new(PipelineConfig::new(1.0)).unwrap();
        let out = pad.reconstruct(&grid, width, &trace).unwrap();
        assert_eq!(out.shortfall, 2);
        assert_eq!(out.samples.len(), 4);
        assert_eq!(out.samples.samples()[2], out.samples.samples()[1]);
        assert_eq!(out.samples.samples()[3], out.samples.samples()[1]);

        let truncate = Pipeline::new(
            PipelineConfig::new(1.0).with_short_alignment(ShortAlignmentPolicy::Truncate),
        )
        .unwrap();
        let out = truncate.reconstruct(&grid, width, &trace).unwrap();
        assert_eq!(out.samples.len(), 2);
        assert_eq!(out.shortfall, 2);

        let fail = Pipeline::new(
            PipelineConfig::new(1.0).with_short_alignment(ShortAlignmentPolicy::Fail),
        )
        .unwrap();
        assert!(matches!(
            fail.reconstruct(&grid, width, &trace),
            Err(CalienteError::ShortAlignment {
                expected: 4,
                produced: 2
            })
        ));
    }

    #[test]
    fn test_empty_trace_is_short_under_every_policy() {
        let grid = TimeGrid::new(3, 1, Precision::Double).unwrap();
        for policy in [
            ShortAlignmentPolicy::Pad,
            ShortAlignmentPolicy::Truncate,
            ShortAlignmentPolicy::Fail,
        ] {
            let pipeline = Pipeline::new(PipelineConfig::new(1.0).with_short_alignment(policy)).unwrap();
            assert!(matches!(
                pipeline.reconstruct(&grid, SampleWidth::I16, &SimulatorTrace::default()),
                Err(CalienteError::ShortAlignment { produced: 0, .. })
            ));
        }
    }

    #[test]
    fn test_simulator_failure_is_surfaced() {
        let pipeline = Pipeline::new(PipelineConfig::new(1.0)).unwrap();
        let mut broken = |_: &VoltageSequence, _: f64| -> std::result::Result<SimulatorTrace, std::io::Error> {
            Err(std::io::Error::new(std::io::ErrorKind::NotFound, "no raw file"))
        };
        let err = pipeline.run(&input(), &mut broken).unwrap_err();
        assert!(matches!(err, CalienteError::SimulationFailed { .. }));
        assert!(err.to_string().contains("no raw file"));
    }

    #[test]
    fn test_simulator_sees_period() {
        let pipeline = Pipeline::new(PipelineConfig::new(1.0)).unwrap();
        let mut seen = None;
        let mut spy = |v: &VoltageSequence, period: f64| -> std::result::Result<SimulatorTrace, Infallible> {
            seen = Some(period);
            echo(v, period)
        };
        pipeline.run(&input(), &mut spy).unwrap();
        assert_eq!(seen, Some(1.0 / 8000.0));
    }
}
