use candle_core::Device;
use tracing::{debug, info, warn};

use super::error::EmbeddingError;

/// Accelerators compiled into this build, in preference order.
fn compiled_accelerators() -> Vec<(&'static str, fn() -> candle_core::Result<Device>)> {
    #[allow(unused_mut)]
    let mut backends: Vec<(&'static str, fn() -> candle_core::Result<Device>)> = Vec::new();

    #[cfg(feature = "metal")]
    backends.push(("metal", || Device::new_metal(0)));

    #[cfg(feature = "cuda")]
    backends.push(("cuda", || Device::new_cuda(0)));

    backends
}

/// Selects the compute device based on enabled features (falls back to CPU).
///
/// Never fails today; the `Result` keeps callers ready for a strict mode where
/// a requested accelerator must be present.
pub fn select_device() -> Result<Device, EmbeddingError> {
    let backends = compiled_accelerators();

    if backends.is_empty() {
        debug!("No GPU backend compiled, using CPU");
        return Ok(Device::Cpu);
    }

    let mut failures = Vec::with_capacity(backends.len());
    for (name, open) in backends {
        match open() {
            Ok(device) => {
                info!(backend = name, "Using GPU acceleration");
                return Ok(device);
            }
            Err(e) => {
                warn!(backend = name, error = %e, "GPU device unavailable");
                failures.push(format!("{name} failed: {e}"));
            }
        }
    }

    warn!(reason = %failures.join("; "), "Falling back to CPU device");
    Ok(Device::Cpu)
}
