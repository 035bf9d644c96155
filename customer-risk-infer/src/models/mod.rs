pub mod constants;
pub mod registry;
pub mod session;

use crate::errors::InferError;
use candle_core::Device;
use tracing::info;

pub use registry::ModelRegistry;
pub use session::{ModelSession, Scorer};

pub fn device(cpu: bool) -> Result<Device, InferError> {
    if cpu {
        Ok(Device::Cpu)
    } else {
        let device = Device::cuda_if_available(0)?;
        if !device.is_cuda() {
            info!("Running on CPU, to run on GPU, build with `--features cuda`");
        }
        Ok(device)
    }
}
