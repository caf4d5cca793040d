//! gpurt-conformance: conformance suite for a GPU-computing runtime API.
//!
//! This crate validates the documented behavior of a GPU runtime surface —
//! device memory allocation, host/device copies (linear and 2D array forms),
//! device properties and limits, device intrinsics, and cross-context fence
//! ordering. It provides:
//!
//! - **Harness helpers**: elementwise comparators with mismatch reports,
//!   2D/3D array equality checks, typed buffer lifecycle helpers with a
//!   deterministic default data pattern, and expected-value oracles.
//! - **Reference runtime**: a deterministic host emulation of the runtime
//!   surface so every scenario is executable and self-checking without GPU
//!   hardware. A binding to a real runtime exposes the same surface.
//! - **Scenarios**: one integration test file per runtime entry point under
//!   `tests/`, each owning its full allocate → populate → invoke → copy back
//!   → compare → free lifecycle.
//!
//! # Quick start
//!
//! ```
//! use gpurt_conformance::harness::{check_vector_add, init_arrays, free_arrays, SlotMask};
//! use gpurt_conformance::runtime::{Dim3, HostRuntime};
//!
//! let rt = HostRuntime::new();
//! let (dev, host) = init_arrays::<f32>(&rt, SlotMask::ALL, SlotMask::ALL, 64, false).unwrap();
//! let (a_d, b_d, c_d) = (dev.a.clone().unwrap(), dev.b.clone().unwrap(), dev.c.clone().unwrap());
//! rt.memcpy_htod(&a_d, host.a.as_ref().unwrap()).unwrap();
//! rt.memcpy_htod(&b_d, host.b.as_ref().unwrap()).unwrap();
//! rt.launch(Dim3::linear(1), Dim3::linear(64), |ctx| {
//!     let i = ctx.global_x() as usize;
//!     c_d.store(i, a_d.load(i) + b_d.load(i));
//! })
//! .unwrap();
//! let mut out = vec![0.0f32; 64];
//! rt.memcpy_dtoh(&mut out, &c_d).unwrap();
//! check_vector_add(host.a.as_ref().unwrap(), host.b.as_ref().unwrap(), &out).unwrap();
//! free_arrays(&rt, dev, host).unwrap();
//! ```

pub mod harness;
pub mod runtime;

pub use harness::{
    check_array_2d, check_expected, check_vector_add, compare_vectors, free_arrays,
    free_arrays_for_host, init_arrays, init_arrays_for_host, verify_divergence, verify_match,
    CheckError, MismatchReport, SlotMask,
};
pub use runtime::{
    DeviceProperties, Dim3, HostRuntime, Limit, RuntimeError, RuntimeResult, ThreadCtx,
};
