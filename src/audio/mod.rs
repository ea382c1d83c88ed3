//! Raw PCM and trace I/O for the CLI frontend.
//!
//! Audio crosses the process boundary as headerless little-endian mono PCM,
//! so any container conversion happens outside (e.g. with ffmpeg):
//!
//! ```bash
//! ffmpeg -i in.wav -f s16le -ac 1 - | caliente stimulus -w 2 -r 48000 -a 9
//! ```
//!
//! Simulator output is read from a two-column text export.

use std::io::{BufRead, Read, Write};

use crate::error::{CalienteError, Result};
use crate::signal::{SampleSequence, SampleWidth, SimulatorTrace, TracePoint};

/// Read a whole stream of mono PCM samples.
pub fn read_pcm<R: Read>(mut input: R, width: SampleWidth, framerate: u32) -> Result<SampleSequence> {
    let mut bytes = Vec::new();
    input
        .read_to_end(&mut bytes)
        .map_err(|e| CalienteError::AudioInputError {
            message: e.to_string(),
        })?;

    let step = width.bytes();
    if bytes.len() % step != 0 {
        return Err(CalienteError::AudioInputError {
            message: format!(
                "{} bytes is not a whole number of {}-byte samples",
                bytes.len(),
                step
            ),
        });
    }

    let samples = bytes
        .chunks_exact(step)
        .map(|chunk| decode_sample(chunk, width))
        .collect();
    SampleSequence::new(width, framerate, samples)
}

/// Write samples as little-endian PCM of the sequence's width.
pub fn write_pcm<W: Write>(mut output: W, samples: &SampleSequence) -> Result<()> {
    let width = samples.width();
    let mut buffer = Vec::with_capacity(samples.len() * width.bytes());
    for &s in samples.samples() {
        encode_sample(s, width, &mut buffer);
    }

    output
        .write_all(&buffer)
        .and_then(|_| output.flush())
        .map_err(|e| CalienteError::AudioOutputError {
            message: e.to_string(),
        })
}

/// Read a text trace: one `time voltage` pair per line.
///
/// Columns may be separated by whitespace or a comma. Blank lines, lines
/// starting with `#` or `;`, and a non-numeric header line are skipped.
/// Negative times are folded to their absolute value.
pub fn read_trace<R: BufRead>(input: R) -> Result<SimulatorTrace> {
    let mut trace = SimulatorTrace::default();
    for (idx, line) in input.lines().enumerate() {
        let line_no = idx + 1;
        let line = line.map_err(|e| CalienteError::trace_parse(line_no, e.to_string()))?;
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') || line.starts_with(';') {
            continue;
        }

        let mut fields = line
            .split(|c: char| c.is_whitespace() || c == ',')
            .filter(|f| !f.is_empty());
        let (Some(time), Some(voltage)) = (fields.next(), fields.next()) else {
            return Err(CalienteError::trace_parse(line_no, "expected two columns"));
        };

        match (time.parse::<f64>(), voltage.parse::<f64>()) {
            (Ok(t), Ok(v)) => trace.push(TracePoint::new(t.abs(), v)),
            _ if trace.is_empty() && time.parse::<f64>().is_err() => continue,
            _ => {
                return Err(CalienteError::trace_parse(
                    line_no,
                    format!("invalid number in '{line}'"),
                ))
            }
        }
    }
    Ok(trace)
}

fn decode_sample(chunk: &[u8], width: SampleWidth) -> i32 {
    match width {
        SampleWidth::I8 => chunk[0] as i8 as i32,
        SampleWidth::I16 => i16::from_le_bytes([chunk[0], chunk[1]]) as i32,
        SampleWidth::I32 => i32::from_le_bytes([chunk[0], chunk[1], chunk[2], chunk[3]]),
    }
}

fn encode_sample(sample: i32, width: SampleWidth, out: &mut Vec<u8>) {
    match width {
        SampleWidth::I8 => out.push(sample as i8 as u8),
        SampleWidth::I16 => out.extend_from_slice(&(sample as i16).to_le_bytes()),
        SampleWidth::I32 => out.extend_from_slice(&sample.to_le_bytes()),
    }
}
