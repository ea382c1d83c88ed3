//! Time alignment of a simulator trace onto an input's sample grid.
//!
//! A transient simulator picks its own time steps. Its output rarely lands on
//! the input's sample instants and may hold far more or far fewer points than
//! the input. The aligner produces one voltage per grid instant.
//!
//! ## Strategies
//!
//! - [`AlignmentStrategy::Greedy`]: walk the trace forward and take the first
//!   point at or after each grid instant. Bursts of closely spaced points are
//!   skipped and gaps are not filled.
//! - [`AlignmentStrategy::Linear`]: interpolate between the two trace points
//!   bracketing each grid instant.
//!
//! Both stop when the trace runs out, so the result may be shorter than the
//! grid. See [`AlignedVoltageSequence::shortfall`].

use crate::signal::{AlignedVoltageSequence, SimulatorTrace, TimeGrid, TracePoint};

/// How a grid instant picks its value from the trace.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AlignmentStrategy {
    /// First trace point at or after the instant.
    #[default]
    Greedy,
    /// Linear interpolation between the bracketing trace points.
    Linear,
}

/// Places simulator output back on an input's time grid.
#[derive(Debug, Clone, Copy, Default)]
pub struct TimeAligner {
    strategy: AlignmentStrategy,
}

impl TimeAligner {
    pub fn new(strategy: AlignmentStrategy) -> Self {
        Self { strategy }
    }

    pub fn strategy(&self) -> AlignmentStrategy {
        self.strategy
    }

    /// Align `trace` onto `grid`.
    ///
    /// The result never holds more than `grid.len()` entries. Its timestamps
    /// are the grid's own instants, not the trace's.
    pub fn align(&self, grid: &TimeGrid, trace: &SimulatorTrace) -> AlignedVoltageSequence {
        let times = grid.times();
        let voltages = match self.strategy {
            AlignmentStrategy::Greedy => align_greedy(times, trace.points()),
            AlignmentStrategy::Linear => align_linear(times, trace.points()),
        };
        let accepted = times[..voltages.len()].to_vec();
        AlignedVoltageSequence::new(grid.framerate(), grid.len(), accepted, voltages)
    }
}

/// Accept the first point whose time reaches the current target.
///
/// Trace order is taken as given; non-increasing times are not rejected.
/// Points with a NaN time never reach a target.
fn align_greedy(times: &[f64], trace: &[TracePoint]) -> Vec<f64> {
    let mut out = Vec::with_capacity(times.len().min(trace.len()));
    let Some(&first) = times.first() else {
        return out;
    };

    let mut target = first;
    for point in trace {
        if point.time.is_nan() || point.time < target {
            continue;
        }
        out.push(point.voltage);
        match times.get(out.len()) {
            Some(&next) => target = next,
            None => break,
        }
    }
    out
}

/// Interpolate each target between its bracketing trace points.
///
/// Targets before the first point take the first point's voltage. Targets
/// past the last point end the result. Points with a NaN time are dropped.
fn align_linear(times: &[f64], trace: &[TracePoint]) -> Vec<f64> {
    let trace: Vec<TracePoint> = trace.iter().filter(|p| !p.time.is_nan()).copied().collect();
    let mut out = Vec::with_capacity(times.len());
    if trace.is_empty() {
        return out;
    }

    let mut k = 0;
    for &t in times {
        while k + 1 < trace.len() && trace[k + 1].time <= t {
            k += 1;
        }
        let a = trace[k];
        if t <= a.time {
            out.push(a.voltage);
            continue;
        }
        // Here a.time < t < b.time, so the span is never zero.
        let Some(b) = trace.get(k + 1) else {
            break;
        };
        let frac = (t - a.time) / (b.time - a.time);
        out.push(a.voltage + frac * (b.voltage - a.voltage));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::signal::Precision;
    use approx::assert_relative_eq;

    fn grid(len: usize) -> TimeGrid {
        // 1 Hz puts instant i at i seconds.
        TimeGrid::new(len, 1, Precision::Double).unwrap()
    }

    fn trace(points: &[(f64, f64)]) -> SimulatorTrace {
        points.iter().copied().map(TracePoint::from).collect()
    }

    fn greedy() -> TimeAligner {
        TimeAligner::new(AlignmentStrategy::Greedy)
    }

    fn linear() -> TimeAligner {
        TimeAligner::new(AlignmentStrategy::Linear)
    }

    #[test]
    fn test_greedy_takes_first_point_at_or_after_target() {
        let aligned = greedy().align(&grid(3), &trace(&[(0.5, 10.0), (1.5, 20.0), (2.5, 30.0)]));
        assert_eq!(aligned.voltages(), &[10.0, 20.0, 30.0]);
        assert_eq!(aligned.times(), &[0.0, 1.0, 2.0]);
        assert!(!aligned.is_short());
    }

    #[test]
    fn test_greedy_short_trace() {
        let aligned = greedy().align(&grid(4), &trace(&[(0.0, 5.0), (1.0, 6.0)]));
        assert_eq!(aligned.voltages(), &[5.0, 6.0]);
        assert_eq!(aligned.len(), 2);
        assert_eq!(aligned.expected(), 4);
        assert_eq!(aligned.shortfall(), 2);
    }

    #[test]
    fn test_greedy_skips_bursts() {
        let dense = trace(&[
            (0.0, 1.0),
            (0.1, 2.0),
            (0.2, 3.0),
            (1.0, 4.0),
            (1.01, 5.0),
            (2.2, 6.0),
            (2.3, 7.0),
        ]);
        let aligned = greedy().align(&grid(3), &dense);
        assert_eq!(aligned.voltages(), &[1.0, 4.0, 6.0]);
    }

    #[test]
    fn test_greedy_one_point_covers_one_instant() {
        // A single late point satisfies instant 0 only; it is not reused.
        let aligned = greedy().align(&grid(3), &trace(&[(5.0, 9.0)]));
        assert_eq!(aligned.voltages(), &[9.0]);
    }

    #[test]
    fn test_empty_inputs() {
        let aligned = greedy().align(&grid(3), &SimulatorTrace::default());
        assert!(aligned.is_empty());
        assert_eq!(aligned.shortfall(), 3);

        let aligned = greedy().align(&grid(0), &trace(&[(0.0, 1.0)]));
        assert!(aligned.is_empty());
        assert_eq!(aligned.expected(), 0);

        assert!(linear().align(&grid(2), &SimulatorTrace::default()).is_empty());
        assert!(linear().align(&grid(0), &trace(&[(0.0, 1.0)])).is_empty());
    }

    #[test]
    fn test_single_point_trace() {
        let g = TimeGrid::new(2, 10, Precision::Double).unwrap();
        assert_eq!(greedy().align(&g, &trace(&[(0.0, 1.0)])).len(), 1);
        assert_eq!(greedy().align(&g, &trace(&[(-0.5, 1.0)])).len(), 0);
    }

    #[test]
    fn test_greedy_accepts_non_increasing_times() {
        let messy = trace(&[(0.0, 1.0), (0.0, 2.0), (3.0, 3.0), (1.5, 4.0), (2.0, 5.0)]);
        let aligned = greedy().align(&grid(4), &messy);
        // (0, 2) is too early for instant 1, (3, 3) fills it, (1.5, 4) is skipped.
        assert_eq!(aligned.voltages(), &[1.0, 3.0, 5.0]);
    }

    #[test]
    fn test_greedy_skips_nan_times() {
        let with_nan = trace(&[(f64::NAN, 99.0), (0.0, 1.0), (1.0, 2.0)]);
        let aligned = greedy().align(&grid(2), &with_nan);
        assert_eq!(aligned.voltages(), &[1.0, 2.0]);
        assert_eq!(aligned.times(), &[0.0, 1.0]);

        let only_nan = trace(&[(f64::NAN, 1.0), (f64::NAN, 2.0)]);
        assert!(greedy().align(&grid(2), &only_nan).is_empty());
    }

    #[test]
    fn test_linear_skips_nan_times() {
        let with_nan = trace(&[(0.0, 0.0), (f64::NAN, 99.0), (2.0, 4.0)]);
        let aligned = linear().align(&grid(3), &with_nan);
        assert_eq!(aligned.voltages(), &[0.0, 2.0, 4.0]);
    }

    #[test]
    fn test_never_longer_than_grid() {
        let long: SimulatorTrace = (0..100)
            .map(|i| TracePoint::new(i as f64 * 0.1, i as f64))
            .collect();
        for aligner in [greedy(), linear()] {
            let aligned = aligner.align(&grid(5), &long);
            assert_eq!(aligned.len(), 5);
        }
    }

    #[test]
    fn test_linear_interpolates() {
        let aligned = linear().align(&grid(4), &trace(&[(0.0, 0.0), (0.5, 1.0), (2.5, 5.0), (3.0, 4.0)]));
        let v = aligned.voltages();
        assert_eq!(v.len(), 4);
        assert_relative_eq!(v[0], 0.0);
        assert_relative_eq!(v[1], 2.0);
        assert_relative_eq!(v[2], 4.0);
        assert_relative_eq!(v[3], 4.0);
    }

    #[test]
    fn test_linear_edges() {
        // Instants before the first point hold its value; past the end stops.
        let aligned = linear().align(&grid(5), &trace(&[(0.5, 2.0), (2.5, 6.0)]));
        assert_eq!(aligned.len(), 3);
        assert_relative_eq!(aligned.voltages()[0], 2.0);
        assert_relative_eq!(aligned.voltages()[1], 3.0);
        assert_relative_eq!(aligned.voltages()[2], 5.0);
        assert_eq!(aligned.shortfall(), 2);
    }

    #[test]
    fn test_linear_duplicate_times() {
        let aligned = linear().align(&grid(3), &trace(&[(0.0, 1.0), (1.0, 2.0), (1.0, 8.0), (2.0, 10.0)]));
        assert_eq!(aligned.voltages(), &[1.0, 8.0, 10.0]);
    }

    #[test]
    fn test_strategies_agree_on_grid_aligned_trace() {
        let exact = trace(&[(0.0, 3.0), (1.0, -1.0), (2.0, 0.5)]);
        assert_eq!(
            greedy().align(&grid(3), &exact).voltages(),
            linear().align(&grid(3), &exact).voltages()
        );
    }
}
