//! WASM bindings for Caliente.
//!
//! This module provides JavaScript-friendly bindings so a browser front end
//! can prepare simulator input and rebuild audio from a trace it fetched.
//!
//! ## Usage (JavaScript)
//!
//! ```javascript
//! import init, { WasmCaliente } from 'caliente';
//!
//! await init();
//!
//! const cal = new WasmCaliente(2, 48000, 9.0, 0.0);
//! const volts = cal.prepare(samples);           // Int32Array -> Float64Array
//! // ... run the simulation elsewhere ...
//! const out = cal.reconstruct(times, voltages, samples.length);
//! ```

use wasm_bindgen::prelude::*;

use crate::pipeline::{Pipeline, PipelineConfig};
use crate::signal::{SampleSequence, SampleWidth, SimulatorTrace, TimeGrid};

/// Initialize panic hook for better error messages in browser console.
#[wasm_bindgen(start)]
pub fn init_panic_hook() {
    console_error_panic_hook::set_once();
}

fn js_err(e: crate::error::CalienteError) -> JsValue {
    JsValue::from_str(&e.to_string())
}

/// WASM-compatible amplitude mapping and alignment pipeline.
#[wasm_bindgen]
pub struct WasmCaliente {
    pipeline: Pipeline,
    width: SampleWidth,
    framerate: u32,
}

#[wasm_bindgen]
impl WasmCaliente {
    /// Create a pipeline.
    ///
    /// # Arguments
    /// * `width_bytes` - Bytes per sample (1, 2 or 4)
    /// * `framerate` - Audio framerate in Hz
    /// * `amplitude_volts` - Voltage span of the full sample range
    /// * `offset_volts` - Voltage of the lowest sample
    #[wasm_bindgen(constructor)]
    pub fn new(width_bytes: u16, framerate: u32, amplitude_volts: f64, offset_volts: f64) -> Result<WasmCaliente, JsValue> {
        let width = SampleWidth::from_bytes(width_bytes).map_err(js_err)?;
        let config = PipelineConfig::new(amplitude_volts).with_offset(offset_volts);
        let pipeline = Pipeline::new(config).map_err(js_err)?;
        Ok(WasmCaliente {
            pipeline,
            width,
            framerate,
        })
    }

    /// Map samples to simulator volts.
    #[wasm_bindgen]
    pub fn prepare(&self, samples: &[i32]) -> Result<Vec<f64>, JsValue> {
        let input = SampleSequence::new(self.width, self.framerate, samples.to_vec()).map_err(js_err)?;
        let volts = self.pipeline.prepare(&input).map_err(js_err)?;
        Ok(volts.voltages().to_vec())
    }

    /// Rebuild `frames` samples from a trace given as two parallel columns.
    #[wasm_bindgen]
    pub fn reconstruct(&self, times: &[f64], voltages: &[f64], frames: usize) -> Result<Vec<i32>, JsValue> {
        let trace = SimulatorTrace::from_columns(times, voltages);
        let grid = TimeGrid::new(frames, self.framerate, self.pipeline.config().precision).map_err(js_err)?;
        let output = self.pipeline.reconstruct(&grid, self.width, &trace).map_err(js_err)?;
        Ok(output.samples.into_samples())
    }

    /// Get the framerate this pipeline was configured with.
    #[wasm_bindgen(getter)]
    pub fn framerate(&self) -> u32 {
        self.framerate
    }
}

/// Get the library version.
#[wasm_bindgen]
pub fn version() -> String {
    env!("CARGO_PKG_VERSION").to_string()
}
