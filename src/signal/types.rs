//! Core scalar types for sample and voltage representation.

use std::fmt;

use crate::error::{CalienteError, Result};

/// Width of one fixed-point sample.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SampleWidth {
    /// 1 byte, signed
    I8,
    /// 2 bytes, signed
    I16,
    /// 4 bytes, signed
    I32,
}

impl SampleWidth {
    /// Look up the width for a byte count.
    pub fn from_bytes(bytes: u16) -> Result<Self> {
        match bytes {
            1 => Ok(SampleWidth::I8),
            2 => Ok(SampleWidth::I16),
            4 => Ok(SampleWidth::I32),
            _ => Err(CalienteError::UnsupportedSampleWidth { width: bytes }),
        }
    }

    /// Number of bytes per sample.
    pub fn bytes(&self) -> usize {
        match self {
            SampleWidth::I8 => 1,
            SampleWidth::I16 => 2,
            SampleWidth::I32 => 4,
        }
    }

    /// Smallest representable sample.
    pub fn min_value(&self) -> i32 {
        match self {
            SampleWidth::I8 => i8::MIN as i32,
            SampleWidth::I16 => i16::MIN as i32,
            SampleWidth::I32 => i32::MIN,
        }
    }

    /// Largest representable sample.
    pub fn max_value(&self) -> i32 {
        match self {
            SampleWidth::I8 => i8::MAX as i32,
            SampleWidth::I16 => i16::MAX as i32,
            SampleWidth::I32 => i32::MAX,
        }
    }

    /// `max_value - min_value` as a float. Never zero.
    pub fn span(&self) -> f64 {
        self.max_value() as f64 - self.min_value() as f64
    }

    /// Check whether a sample fits this width.
    pub fn contains(&self, sample: i32) -> bool {
        (self.min_value()..=self.max_value()).contains(&sample)
    }
}

impl fmt::Display for SampleWidth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "i{}", self.bytes() * 8)
    }
}

/// Floating-point precision used for simulation data.
///
/// `Single` rounds every voltage and time instant through `f32`, which is
/// what a reduced-precision simulation file holds. `Double` keeps full `f64`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Precision {
    Single,
    #[default]
    Double,
}

impl Precision {
    /// Round a value to this precision.
    #[inline]
    pub fn quantize(&self, value: f64) -> f64 {
        match self {
            Precision::Single => value as f32 as f64,
            Precision::Double => value,
        }
    }
}

/// The fixed-period time instants of an input sequence.
///
/// Instant `i` is `i / framerate`, rounded to the grid's precision.
#[derive(Debug, Clone, PartialEq)]
pub struct TimeGrid {
    framerate: u32,
    times: Vec<f64>,
}

impl TimeGrid {
    /// Build a grid of `len` instants at `framerate` samples per second.
    pub fn new(len: usize, framerate: u32, precision: Precision) -> Result<Self> {
        if framerate == 0 {
            return Err(CalienteError::InvalidFramerate { framerate });
        }
        let rate = framerate as f64;
        let times = (0..len)
            .map(|i| precision.quantize(i as f64 / rate))
            .collect();
        Ok(Self { framerate, times })
    }

    /// Samples per second.
    pub fn framerate(&self) -> u32 {
        self.framerate
    }

    /// Number of instants.
    pub fn len(&self) -> usize {
        self.times.len()
    }

    pub fn is_empty(&self) -> bool {
        self.times.is_empty()
    }

    /// All instants, in seconds.
    pub fn times(&self) -> &[f64] {
        &self.times
    }
}
