//! Verification helpers shared by the conformance scenarios.
//!
//! Stateless utilities only: comparators and verification strategies
//! ([`check`]), the default data pattern ([`pattern`]), paired buffer
//! lifecycle helpers ([`buffers`]), expected-value models for the device
//! intrinsics ([`reference`]), and the round-robin ordering oracle
//! ([`oracle`]). No shared mutable state across scenarios.

pub mod buffers;
pub mod check;
pub mod oracle;
pub mod pattern;
pub mod reference;

pub use buffers::{
    free_arrays, free_arrays_for_host, init_arrays, init_arrays_for_host, DeviceSet, HostAlloc,
    HostSet, SlotMask,
};
pub use check::{
    check_array_2d, check_expected, check_vector_add, compare_vectors, dump_array_3d, guarantee,
    verify_divergence, verify_match, CheckError, MismatchReport, MISMATCH_PRINT_LIMIT,
};
pub use oracle::{fence_system, round_robin, run_round_robin, RoundRobinOutcome};
pub use pattern::{fill_pattern, PatternElement, Slot};
pub use reference::{
    expected_lane_id, expected_mbcnt_hi, expected_mbcnt_lo, popcount_u32, popcount_u64,
    round_robin_expect,
};
