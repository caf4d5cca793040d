//! Reference GPU runtime surface exercised by the conformance scenarios.
//!
//! The scenarios in `tests/` talk to a [`HostRuntime`]: a deterministic host
//! emulation of the runtime API under test (device memory, host/device
//! copies, device properties and limits, kernel launch, device intrinsics).
//! The emulation exists so every scenario is executable and self-checking on
//! any machine; a binding to a real runtime would expose the same surface.

mod host;
mod launch;

pub use host::{
    CoherentBuffer, DeviceArray, DeviceBuffer, HostRuntime, PinnedBuffer, DEFAULT_HEAP_BYTES,
};
pub use launch::ThreadCtx;

use thiserror::Error;

/// Runtime call failure. Setup failures are fatal for a scenario; the call
/// under test returning one of these is the assertion subject itself.
#[derive(Debug, Error)]
pub enum RuntimeError {
    #[error("invalid value: {0}")]
    InvalidValue(&'static str),
    #[error("out of device memory: requested {requested} bytes, {available} available")]
    OutOfMemory { requested: usize, available: usize },
    #[error("invalid device ordinal {id} (device count {count})")]
    InvalidDevice { id: usize, count: usize },
    #[error("not supported by this runtime: {0}")]
    NotSupported(&'static str),
}

pub type RuntimeResult<T> = Result<T, RuntimeError>;

/// Marker for element types that can live in device memory.
pub trait DeviceValue: Copy + Default + Send + Sync + 'static {}

impl<T: Copy + Default + Send + Sync + 'static> DeviceValue for T {}

/// Per-device limit selectors, mirroring the runtime's limit query.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Limit {
    /// Size of the device-side malloc heap. Always nonzero when supported.
    MallocHeapSize,
    /// Device thread stack size. Unsupported by the host emulation.
    StackSize,
    /// Device printf FIFO size. Unsupported by the host emulation.
    PrintfFifoSize,
}

/// Queryable device properties.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct DeviceProperties {
    pub name: String,
    pub major: u32,
    pub minor: u32,
    pub warp_size: u32,
    pub max_threads_per_block: u32,
    pub total_mem: usize,
    pub multi_processor_count: u32,
}

/// Grid or block dimensions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Dim3 {
    pub x: u32,
    pub y: u32,
    pub z: u32,
}

impl Dim3 {
    pub fn new(x: u32, y: u32, z: u32) -> Self {
        Self { x, y, z }
    }

    /// One-dimensional extent: `(n, 1, 1)`.
    pub fn linear(n: u32) -> Self {
        Self { x: n, y: 1, z: 1 }
    }

    /// Total number of coordinates covered.
    pub fn total(&self) -> u64 {
        u64::from(self.x) * u64::from(self.y) * u64::from(self.z)
    }
}

impl Default for Dim3 {
    fn default() -> Self {
        Self { x: 1, y: 1, z: 1 }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dim3_totals() {
        assert_eq!(Dim3::default().total(), 1);
        assert_eq!(Dim3::linear(16).total(), 16);
        assert_eq!(Dim3::new(2, 2, 1).total(), 4);
        assert_eq!(Dim3::new(4, 0, 4).total(), 0);
    }
}
