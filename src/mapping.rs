//! Amplitude mapping between fixed-point samples and simulator volts.
//!
//! The forward map sends the full signed range of a sample width onto
//! `[offset, offset + amplitude]` volts:
//!
//! ```text
//! v = (s - min) * (amplitude / (max - min)) + offset
//! ```
//!
//! The inverse map is the algebraic inverse with the offset already removed:
//!
//! ```text
//! s = round(v * ((max - min) / amplitude) + min)
//! ```
//!
//! The two directions are deliberately independent. [`AmplitudeMapper::to_samples`]
//! never subtracts an offset; callers that applied one on the way in decide
//! whether to remove it before mapping back (see [`crate::pipeline::OffsetPolicy`]).

use crate::error::{CalienteError, Result};
use crate::signal::{AlignedVoltageSequence, Precision, SampleSequence, SampleWidth, VoltageSequence};

/// What to do with a value that does not fit the target sample width.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum NarrowingPolicy {
    /// Saturate to the nearest representable sample.
    #[default]
    Clamp,
    /// Return [`CalienteError::OutOfRange`].
    Fail,
}

/// Affine map between a sample width's integer range and a voltage range.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AmplitudeMapper {
    amplitude_volts: f64,
    precision: Precision,
    narrowing: NarrowingPolicy,
}

impl AmplitudeMapper {
    /// Create a mapper spanning `amplitude_volts`.
    ///
    /// The amplitude must be finite and strictly positive.
    pub fn new(amplitude_volts: f64) -> Result<Self> {
        if !amplitude_volts.is_finite() || amplitude_volts <= 0.0 {
            return Err(CalienteError::DegenerateRange {
                amplitude: amplitude_volts,
            });
        }
        Ok(Self {
            amplitude_volts,
            precision: Precision::default(),
            narrowing: NarrowingPolicy::default(),
        })
    }

    /// Set the precision forward-mapped voltages are rounded to.
    pub fn with_precision(mut self, precision: Precision) -> Self {
        self.precision = precision;
        self
    }

    /// Set the out-of-range policy for the inverse map.
    pub fn with_narrowing(mut self, narrowing: NarrowingPolicy) -> Self {
        self.narrowing = narrowing;
        self
    }

    pub fn amplitude_volts(&self) -> f64 {
        self.amplitude_volts
    }

    pub fn precision(&self) -> Precision {
        self.precision
    }

    pub fn narrowing(&self) -> NarrowingPolicy {
        self.narrowing
    }

    /// Volts per sample step for `width`.
    pub fn volts_per_step(&self, width: SampleWidth) -> f64 {
        self.amplitude_volts / width.span()
    }

    /// Map one sample to volts.
    #[inline]
    pub fn sample_to_voltage(&self, sample: i32, width: SampleWidth, offset_volts: f64) -> f64 {
        let steps = sample as f64 - width.min_value() as f64;
        self.precision
            .quantize(steps * self.volts_per_step(width) + offset_volts)
    }

    /// Map one voltage back to a sample of `width`.
    ///
    /// `index` is only used to label an [`CalienteError::OutOfRange`] error.
    pub fn voltage_to_sample(&self, voltage: f64, width: SampleWidth, index: usize) -> Result<i32> {
        let raw = voltage * (width.span() / self.amplitude_volts) + width.min_value() as f64;
        if !raw.is_finite() {
            return Err(CalienteError::out_of_range(index, voltage));
        }
        let rounded = raw.round();
        let (min, max) = (width.min_value() as f64, width.max_value() as f64);
        if rounded < min || rounded > max {
            return match self.narrowing {
                NarrowingPolicy::Clamp => Ok(rounded.clamp(min, max) as i32),
                NarrowingPolicy::Fail => Err(CalienteError::out_of_range(index, voltage)),
            };
        }
        Ok(rounded as i32)
    }

    /// Map a whole sample sequence to simulator volts.
    pub fn to_voltage(&self, samples: &SampleSequence, offset_volts: f64) -> VoltageSequence {
        let width = samples.width();
        let voltages = samples
            .samples()
            .iter()
            .map(|&s| self.sample_to_voltage(s, width, offset_volts))
            .collect();
        VoltageSequence::from_trusted(samples.framerate(), self.precision, voltages)
    }

    /// Map aligned voltages back to samples of `width`.
    ///
    /// The offset is not removed here.
    pub fn to_samples(&self, voltages: &AlignedVoltageSequence, width: SampleWidth) -> Result<SampleSequence> {
        let samples = voltages
            .voltages()
            .iter()
            .enumerate()
            .map(|(i, &v)| self.voltage_to_sample(v, width, i))
            .collect::<Result<Vec<_>>>()?;
        SampleSequence::new(width, voltages.framerate(), samples)
    }
}
