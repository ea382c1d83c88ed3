//! Caliente - audio through a circuit simulator
//!
//! Prepares simulator input from raw PCM audio and rebuilds raw PCM audio
//! from the simulator's exported output trace.
//!
//! # Usage
//!
//! ```bash
//! ffmpeg -i in.wav -f s16le -ac 1 - | caliente stimulus -w 2 -r 48000 -a 9 -o circuit/
//! caliente reconstruct -w 2 -r 48000 -n 480000 -a 9 vout.txt | ffmpeg -f s16le -ac 1 -ar 48000 -i - out.wav
//! ```

use std::fs::File;
use std::io::{self, BufReader};
use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};
use log::info;

use caliente::{
    audio::{read_pcm, read_trace, write_pcm},
    error::{CalienteError, Result},
    stimulus::{write_stimulus_files, DEFAULT_TIMESTEP_DIVISOR},
    AlignmentStrategy, NarrowingPolicy, OffsetPolicy, Pipeline, PipelineConfig, Precision, SampleWidth,
    ShortAlignmentPolicy, TimeGrid, DEFAULT_FRAMERATE,
};

/// Drive a circuit simulator with audio and rebuild audio from its output
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Read raw PCM from stdin and write the simulator's input files
    Stimulus {
        #[command(flatten)]
        signal: SignalArgs,

        /// Directory the stimulus files are written to
        #[arg(short, long, default_value = ".")]
        out_dir: PathBuf,

        /// Maximum simulator time step, as a fraction of the sample period
        #[arg(long, default_value_t = DEFAULT_TIMESTEP_DIVISOR)]
        timestep_divisor: u32,

        /// Insert midpoints to feed the simulator twice the framerate
        #[arg(long)]
        upsample: bool,
    },

    /// Read a text trace and write raw PCM to stdout
    Reconstruct {
        #[command(flatten)]
        signal: SignalArgs,

        /// Two-column (time, voltage) trace exported from the simulator
        #[arg(value_name = "TRACE_FILE")]
        trace_file: PathBuf,

        /// Number of samples in the original input
        #[arg(short = 'n', long)]
        frames: usize,

        /// Subtract the offset before mapping back to samples
        #[arg(long)]
        remove_offset: bool,

        /// Alignment strategy
        #[arg(long, value_enum, default_value_t = Alignment::Greedy)]
        alignment: Alignment,

        /// What to do when the trace ends early
        #[arg(long, value_enum, default_value_t = Short::Pad)]
        short: Short,

        /// What to do with values outside the sample range
        #[arg(long, value_enum, default_value_t = Narrowing::Clamp)]
        narrowing: Narrowing,
    },
}

/// Options shared by both directions.
#[derive(Args, Debug)]
struct SignalArgs {
    /// Bytes per sample (1, 2 or 4)
    #[arg(short, long, default_value_t = 2)]
    width: u16,

    /// Framerate in Hz
    #[arg(short = 'r', long, default_value_t = DEFAULT_FRAMERATE)]
    framerate: u32,

    /// Voltage span of the full sample range
    #[arg(short, long)]
    amplitude: f64,

    /// Voltage of the lowest sample
    #[arg(long, default_value_t = 0.0, allow_negative_numbers = true)]
    offset: f64,

    /// Store times and voltages in single precision
    #[arg(long)]
    single: bool,
}

impl SignalArgs {
    fn precision(&self) -> Precision {
        if self.single {
            Precision::Single
        } else {
            Precision::Double
        }
    }

    fn config(&self) -> PipelineConfig {
        PipelineConfig::new(self.amplitude)
            .with_offset(self.offset)
            .with_precision(self.precision())
    }
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum Alignment {
    Greedy,
    Linear,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum Short {
    Pad,
    Truncate,
    Fail,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum Narrowing {
    Clamp,
    Fail,
}

fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    match cli.command {
        Command::Stimulus {
            signal,
            out_dir,
            timestep_divisor,
            upsample,
        } => {
            let width = SampleWidth::from_bytes(signal.width)?;
            let input = read_pcm(io::stdin().lock(), width, signal.framerate)?;

            let pipeline = Pipeline::new(signal.config().with_midpoint_upsample(upsample))?;
            let volts = pipeline.prepare(&input)?;
            let files = write_stimulus_files(&out_dir, &volts, timestep_divisor)?;
            info!(
                "{} samples -> {} steps in {}",
                input.len(),
                volts.len(),
                files.pwl.display()
            );
        }

        Command::Reconstruct {
            signal,
            trace_file,
            frames,
            remove_offset,
            alignment,
            short,
            narrowing,
        } => {
            let width = SampleWidth::from_bytes(signal.width)?;
            let file = File::open(&trace_file).map_err(|e| CalienteError::FileReadError {
                path: trace_file.display().to_string(),
                source: e,
            })?;
            let trace = read_trace(BufReader::new(file))?;

            let config = signal
                .config()
                .with_alignment(match alignment {
                    Alignment::Greedy => AlignmentStrategy::Greedy,
                    Alignment::Linear => AlignmentStrategy::Linear,
                })
                .with_short_alignment(match short {
                    Short::Pad => ShortAlignmentPolicy::Pad,
                    Short::Truncate => ShortAlignmentPolicy::Truncate,
                    Short::Fail => ShortAlignmentPolicy::Fail,
                })
                .with_narrowing(match narrowing {
                    Narrowing::Clamp => NarrowingPolicy::Clamp,
                    Narrowing::Fail => NarrowingPolicy::Fail,
                })
                .with_offset_policy(if remove_offset {
                    OffsetPolicy::Remove
                } else {
                    OffsetPolicy::Retain
                });
            let pipeline = Pipeline::new(config)?;

            let grid = TimeGrid::new(frames, signal.framerate, signal.precision())?;
            let output = pipeline.reconstruct(&grid, width, &trace)?;
            info!(
                "{} trace points -> {} samples ({} missing)",
                trace.len(),
                output.samples.len(),
                output.shortfall
            );

            write_pcm(io::stdout().lock(), &output.samples)?;
        }
    }

    Ok(())
}
