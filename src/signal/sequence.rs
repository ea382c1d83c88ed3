//! Sample, voltage and trace sequences.

use crate::error::{CalienteError, Result};

use super::{Precision, SampleWidth, TimeGrid};

/// Mono fixed-point audio at a fixed framerate.
///
/// Always holds at least one sample, and every sample fits `width`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SampleSequence {
    width: SampleWidth,
    framerate: u32,
    samples: Vec<i32>,
}

impl SampleSequence {
    /// Create a sequence, checking framerate, length and sample range.
    pub fn new(width: SampleWidth, framerate: u32, samples: Vec<i32>) -> Result<Self> {
        if framerate == 0 {
            return Err(CalienteError::InvalidFramerate { framerate });
        }
        if samples.is_empty() {
            return Err(CalienteError::EmptySequence);
        }
        if let Some(index) = samples.iter().position(|&s| !width.contains(s)) {
            return Err(CalienteError::out_of_range(index, samples[index] as f64));
        }
        Ok(Self {
            width,
            framerate,
            samples,
        })
    }

    /// Create a sequence from decoded audio-container fields.
    ///
    /// Multi-channel audio is rejected, never downmixed.
    pub fn from_pcm(channels: u16, width_bytes: u16, framerate: u32, samples: Vec<i32>) -> Result<Self> {
        if channels != 1 {
            return Err(CalienteError::UnsupportedChannelCount { channels });
        }
        let width = SampleWidth::from_bytes(width_bytes)?;
        Self::new(width, framerate, samples)
    }

    pub fn width(&self) -> SampleWidth {
        self.width
    }

    pub fn framerate(&self) -> u32 {
        self.framerate
    }

    pub fn samples(&self) -> &[i32] {
        &self.samples
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// The time instants this sequence is sampled at.
    pub fn time_grid(&self, precision: Precision) -> Result<TimeGrid> {
        TimeGrid::new(self.len(), self.framerate, precision)
    }

    pub fn into_samples(self) -> Vec<i32> {
        self.samples
    }
}

/// Voltages at implicit uniform instants `t[i] = i / framerate`.
///
/// Instants are rounded to the sequence's precision, the same way a
/// [`TimeGrid`] rounds them, so a simulator echoing these times lands exactly
/// on the grid the output is aligned against.
#[derive(Debug, Clone, PartialEq)]
pub struct VoltageSequence {
    framerate: u32,
    precision: Precision,
    voltages: Vec<f64>,
}

impl VoltageSequence {
    pub fn new(framerate: u32, voltages: Vec<f64>) -> Result<Self> {
        if framerate == 0 {
            return Err(CalienteError::InvalidFramerate { framerate });
        }
        Ok(Self {
            framerate,
            precision: Precision::default(),
            voltages,
        })
    }

    /// Framerate already checked by a `SampleSequence`.
    pub(crate) fn from_trusted(framerate: u32, precision: Precision, voltages: Vec<f64>) -> Self {
        debug_assert!(framerate > 0);
        Self {
            framerate,
            precision,
            voltages,
        }
    }

    /// Set the precision time instants are rounded to.
    pub fn with_precision(mut self, precision: Precision) -> Self {
        self.precision = precision;
        self
    }

    pub fn framerate(&self) -> u32 {
        self.framerate
    }

    pub fn precision(&self) -> Precision {
        self.precision
    }

    pub fn voltages(&self) -> &[f64] {
        &self.voltages
    }

    pub fn len(&self) -> usize {
        self.voltages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.voltages.is_empty()
    }

    /// Sample period in seconds.
    pub fn period(&self) -> f64 {
        1.0 / self.framerate as f64
    }

    /// Time of sample `i`, in seconds.
    pub fn time(&self, i: usize) -> f64 {
        self.precision.quantize(i as f64 / self.framerate as f64)
    }

    /// Time of the last sample, or 0 for an empty sequence.
    pub fn duration(&self) -> f64 {
        self.time(self.len().saturating_sub(1))
    }

    /// Iterate over `(time, voltage)` pairs.
    pub fn iter_timed(&self) -> impl Iterator<Item = (f64, f64)> + '_ {
        self.voltages
            .iter()
            .enumerate()
            .map(move |(i, &v)| (self.time(i), v))
    }

    /// Double the framerate by inserting the midpoint between neighbours.
    ///
    /// The final inserted slot repeats the last input value. Fails with
    /// [`CalienteError::InvalidFramerate`] when the doubled rate does not fit.
    pub fn upsample_midpoints(&self) -> Result<Self> {
        let framerate = self
            .framerate
            .checked_mul(2)
            .ok_or(CalienteError::InvalidFramerate {
                framerate: self.framerate,
            })?;

        let mut out = Vec::with_capacity(self.voltages.len() * 2);
        for (i, &v) in self.voltages.iter().enumerate() {
            out.push(v);
            let mid = match self.voltages.get(i + 1) {
                Some(&next) => (v + next) / 2.0,
                None => v,
            };
            out.push(mid);
        }
        Ok(Self {
            framerate,
            precision: self.precision,
            voltages: out,
        })
    }
}

/// One simulator output point.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TracePoint {
    /// Seconds
    pub time: f64,
    /// Volts
    pub voltage: f64,
}

impl TracePoint {
    pub fn new(time: f64, voltage: f64) -> Self {
        Self { time, voltage }
    }
}

impl From<(f64, f64)> for TracePoint {
    fn from((time, voltage): (f64, f64)) -> Self {
        Self { time, voltage }
    }
}

/// Irregularly timed simulator output.
///
/// Points are kept in the order the simulator produced them. Times are
/// expected to increase but this is not enforced.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SimulatorTrace {
    points: Vec<TracePoint>,
}

impl SimulatorTrace {
    pub fn new(points: Vec<TracePoint>) -> Self {
        Self { points }
    }

    /// Build a trace from parallel time and voltage columns.
    ///
    /// Extra entries in the longer column are ignored.
    pub fn from_columns(times: &[f64], voltages: &[f64]) -> Self {
        times
            .iter()
            .zip(voltages)
            .map(|(&t, &v)| TracePoint::new(t, v))
            .collect()
    }

    pub fn points(&self) -> &[TracePoint] {
        &self.points
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn push(&mut self, point: TracePoint) {
        self.points.push(point);
    }
}

impl FromIterator<TracePoint> for SimulatorTrace {
    fn from_iter<I: IntoIterator<Item = TracePoint>>(iter: I) -> Self {
        Self {
            points: iter.into_iter().collect(),
        }
    }
}

/// Voltages placed back on an input's time grid.
///
/// Holds at most `expected` entries. It is shorter when the trace ran out
/// before the last grid instant.
#[derive(Debug, Clone, PartialEq)]
pub struct AlignedVoltageSequence {
    framerate: u32,
    expected: usize,
    times: Vec<f64>,
    voltages: Vec<f64>,
}

impl AlignedVoltageSequence {
    pub(crate) fn new(framerate: u32, expected: usize, times: Vec<f64>, voltages: Vec<f64>) -> Self {
        debug_assert_eq!(times.len(), voltages.len());
        debug_assert!(voltages.len() <= expected);
        Self {
            framerate,
            expected,
            times,
            voltages,
        }
    }

    pub fn framerate(&self) -> u32 {
        self.framerate
    }

    /// Grid length the alignment was asked to fill.
    pub fn expected(&self) -> usize {
        self.expected
    }

    /// Nominal grid instants of the accepted values.
    pub fn times(&self) -> &[f64] {
        &self.times
    }

    pub fn voltages(&self) -> &[f64] {
        &self.voltages
    }

    /// Number of entries actually produced.
    pub fn len(&self) -> usize {
        self.voltages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.voltages.is_empty()
    }

    /// How many grid instants got no value.
    pub fn shortfall(&self) -> usize {
        self.expected - self.voltages.len()
    }

    pub fn is_short(&self) -> bool {
        self.shortfall() > 0
    }

    /// Fill the missing tail by repeating the last value.
    ///
    /// Returns `None` when there is no value to repeat.
    pub fn padded(&self, grid: &TimeGrid) -> Option<Self> {
        let last = *self.voltages.last()?;
        let mut times = self.times.clone();
        let mut voltages = self.voltages.clone();
        for &t in grid.times().iter().take(self.expected).skip(self.len()) {
            times.push(t);
            voltages.push(last);
        }
        Some(Self::new(self.framerate, self.expected, times, voltages))
    }

    /// Apply `f` to every voltage.
    pub fn map_voltages(&self, f: impl Fn(f64) -> f64) -> Self {
        Self {
            framerate: self.framerate,
            expected: self.expected,
            times: self.times.clone(),
            voltages: self.voltages.iter().map(|&v| f(v)).collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sample_sequence_validation() {
        assert!(SampleSequence::new(SampleWidth::I8, 8000, vec![-128, 0, 127]).is_ok());
        assert!(matches!(
            SampleSequence::new(SampleWidth::I8, 8000, vec![0, 128]),
            Err(CalienteError::OutOfRange { index: 1, .. })
        ));
        assert!(matches!(
            SampleSequence::new(SampleWidth::I16, 8000, vec![]),
            Err(CalienteError::EmptySequence)
        ));
        assert!(matches!(
            SampleSequence::new(SampleWidth::I16, 0, vec![1]),
            Err(CalienteError::InvalidFramerate { .. })
        ));
    }

    #[test]
    fn test_from_pcm_rejects_stereo() {
        assert!(matches!(
            SampleSequence::from_pcm(2, 2, 44100, vec![0, 0]),
            Err(CalienteError::UnsupportedChannelCount { channels: 2 })
        ));
        assert!(matches!(
            SampleSequence::from_pcm(1, 3, 44100, vec![0]),
            Err(CalienteError::UnsupportedSampleWidth { width: 3 })
        ));
        let seq = SampleSequence::from_pcm(1, 4, 44100, vec![i32::MIN, i32::MAX]).unwrap();
        assert_eq!(seq.width(), SampleWidth::I32);
    }

    #[test]
    fn test_upsample_midpoints() {
        let v = VoltageSequence::new(10, vec![0.0, 2.0, 4.0]).unwrap();
        let up = v.upsample_midpoints().unwrap();
        assert_eq!(up.framerate(), 20);
        assert_eq!(up.voltages(), &[0.0, 1.0, 2.0, 3.0, 4.0, 4.0]);
    }

    #[test]
    fn test_upsample_rejects_overflowing_framerate() {
        let v = VoltageSequence::new(3_000_000_000, vec![0.0, 1.0]).unwrap();
        assert!(matches!(
            v.upsample_midpoints(),
            Err(CalienteError::InvalidFramerate {
                framerate: 3_000_000_000
            })
        ));
        let v = VoltageSequence::new(u32::MAX / 2, vec![0.0]).unwrap();
        assert_eq!(v.upsample_midpoints().unwrap().framerate(), u32::MAX - 1);
    }

    #[test]
    fn test_single_precision_times_match_grid() {
        let v = VoltageSequence::new(44100, vec![0.0; 64])
            .unwrap()
            .with_precision(Precision::Single);
        let grid = TimeGrid::new(64, 44100, Precision::Single).unwrap();
        let times: Vec<f64> = v.iter_timed().map(|(t, _)| t).collect();
        assert_eq!(times, grid.times());

        // Even slots of an upsampled sequence sit on the original grid.
        let up = v.upsample_midpoints().unwrap();
        let even: Vec<f64> = up.iter_timed().step_by(2).map(|(t, _)| t).collect();
        assert_eq!(even, grid.times());
    }

    #[test]
    fn test_voltage_sequence_timing() {
        let v = VoltageSequence::new(4, vec![1.0, 2.0, 3.0]).unwrap();
        assert_eq!(v.period(), 0.25);
        assert_eq!(v.duration(), 0.5);
        let timed: Vec<_> = v.iter_timed().collect();
        assert_eq!(timed, vec![(0.0, 1.0), (0.25, 2.0), (0.5, 3.0)]);
    }

    #[test]
    fn test_padded_repeats_last() {
        let grid = TimeGrid::new(4, 1, Precision::Double).unwrap();
        let aligned = AlignedVoltageSequence::new(1, 4, vec![0.0, 1.0], vec![5.0, 6.0]);
        assert_eq!(aligned.shortfall(), 2);
        let padded = aligned.padded(&grid).unwrap();
        assert_eq!(padded.voltages(), &[5.0, 6.0, 6.0, 6.0]);
        assert_eq!(padded.times(), &[0.0, 1.0, 2.0, 3.0]);
        assert!(!padded.is_short());

        let empty = AlignedVoltageSequence::new(1, 4, vec![], vec![]);
        assert!(empty.padded(&grid).is_none());
    }
}
