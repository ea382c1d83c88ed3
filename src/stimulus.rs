//! Simulator input files.
//!
//! A SPICE transient run is driven by two text files sitting next to the
//! circuit:
//!
//! - `sig_in.csv`: a piecewise-linear source table, one `time<TAB>voltage`
//!   row per input sample
//! - `trancmd.txt`: `.param` lines the circuit's `.tran` directive reads
//!
//! ```text
//! .param transtop 1.0000000000E-3
//! .param transtart 0.0000000000E0
//! .param timestep 5.2083333333E-6
//! .OPTIONS plotwinsize=0
//! ```

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use crate::error::{CalienteError, Result};
use crate::signal::VoltageSequence;

/// File name of the piecewise-linear source table.
pub const STIMULUS_FILE: &str = "sig_in.csv";

/// File name of the transient parameter block.
pub const TRANSIENT_FILE: &str = "trancmd.txt";

/// Default ratio of input sample period to maximum simulator time step.
pub const DEFAULT_TIMESTEP_DIVISOR: u32 = 4;

/// Transient-analysis parameters for one run.
#[derive(Debug, Clone, PartialEq)]
pub struct TransientCommand {
    /// Simulation start, seconds.
    pub start: f64,
    /// Simulation stop, seconds.
    pub stop: f64,
    /// Maximum time step, seconds.
    pub timestep: f64,
    /// Disable waveform compression so no points are dropped.
    pub disable_compression: bool,
}

impl TransientCommand {
    /// Parameters covering `input` with `period / divisor` steps.
    pub fn for_input(input: &VoltageSequence, divisor: u32) -> Self {
        Self {
            start: 0.0,
            stop: input.duration(),
            timestep: input.period() / divisor.max(1) as f64,
            disable_compression: true,
        }
    }

    /// Write the `.param` block.
    pub fn render<W: Write>(&self, out: &mut W) -> std::io::Result<()> {
        writeln!(out, ".param transtop {:.10E}", self.stop)?;
        writeln!(out, ".param transtart {:.10E}", self.start)?;
        writeln!(out, ".param timestep {:.10E}", self.timestep)?;
        if self.disable_compression {
            writeln!(out, ".OPTIONS plotwinsize=0")?;
        }
        Ok(())
    }
}

/// Write the piecewise-linear table for `input`.
///
/// Times are written at the sequence's precision.
pub fn render_pwl<W: Write>(input: &VoltageSequence, out: &mut W) -> std::io::Result<()> {
    for (t, v) in input.iter_timed() {
        writeln!(out, "{:.10E}\t{:.10E}", t, v)?;
    }
    Ok(())
}

/// Paths of a written stimulus.
#[derive(Debug, Clone)]
pub struct StimulusFiles {
    pub pwl: PathBuf,
    pub transient: PathBuf,
}

/// Write `sig_in.csv` and `trancmd.txt` into `dir`.
pub fn write_stimulus_files(dir: &Path, input: &VoltageSequence, timestep_divisor: u32) -> Result<StimulusFiles> {
    let pwl = dir.join(STIMULUS_FILE);
    write_file(&pwl, |out| render_pwl(input, out))?;

    let transient = dir.join(TRANSIENT_FILE);
    let command = TransientCommand::for_input(input, timestep_divisor);
    write_file(&transient, |out| command.render(out))?;

    log::debug!("wrote {} and {}", pwl.display(), transient.display());
    Ok(StimulusFiles { pwl, transient })
}

fn write_file<F>(path: &Path, render: F) -> Result<()>
where
    F: FnOnce(&mut BufWriter<File>) -> std::io::Result<()>,
{
    let wrap = |source| CalienteError::StimulusWriteError {
        path: path.display().to_string(),
        source,
    };
    let mut out = BufWriter::new(File::create(path).map_err(wrap)?);
    render(&mut out).map_err(wrap)?;
    out.flush().map_err(wrap)
}
