//! Buffer comparators and verification strategies.
//!
//! Two failure channels, kept strictly apart:
//! - [`guarantee`] panics on internal-consistency violations of the harness
//!   itself (never used for outcomes of the runtime under test);
//! - [`CheckError`] reports a scenario failure with diagnostic context
//!   (mismatch count, first differing index).
//!
//! Verification comes in two distinct strategies: [`verify_match`] asserts
//! full equality, [`verify_divergence`] asserts that at least one element
//! differs. [`compare_vectors`] is the policy-free count-only mode.

use std::fmt::Debug;
use std::ops::Add;

use thiserror::Error;

/// How many individual mismatches get logged before only the aggregate is
/// reported.
pub const MISMATCH_PRINT_LIMIT: usize = 10;

/// Aggregate result of a buffer comparison.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, serde::Serialize, serde::Deserialize)]
pub struct MismatchReport {
    /// Total number of differing elements over the full range.
    pub count: usize,
    /// Index of the first differing element, if any.
    pub first_index: Option<usize>,
}

impl MismatchReport {
    pub fn is_clean(&self) -> bool {
        self.count == 0
    }
}

/// A reported (soft) verification failure, scoped to one scenario.
#[derive(Debug, Error)]
pub enum CheckError {
    #[error("{count} mismatches, first at index {first_index}")]
    Mismatches { count: usize, first_index: usize },
    #[error("expected divergence but all {len} elements matched")]
    NoDivergence { len: usize },
}

/// Fatal internal-consistency check. Violations are bugs in the harness or
/// its caller, never outcomes of the runtime under test.
pub fn guarantee(cond: bool, msg: &str) {
    if !cond {
        panic!("internal consistency violation: {msg}");
    }
}

/// Count mismatches between `out` and `f(a, b)` applied elementwise.
/// No failure policy; callers inspect the report.
pub fn compare_vectors<T, F>(a: &[T], b: &[T], out: &[T], f: F) -> MismatchReport
where
    T: Copy + PartialEq,
    F: Fn(T, T) -> T,
{
    guarantee(
        a.len() == b.len() && b.len() == out.len(),
        "comparator operands must have equal length",
    );
    let mut report = MismatchReport::default();
    for i in 0..out.len() {
        if out[i] != f(a[i], b[i]) {
            if report.count == 0 {
                report.first_index = Some(i);
            }
            report.count += 1;
        }
    }
    report
}

/// Assert that `out` equals `f(a, b)` elementwise. The first
/// [`MISMATCH_PRINT_LIMIT`] mismatches are logged individually; any mismatch
/// fails with the aggregate count and first index. An empty range succeeds
/// trivially.
pub fn verify_match<T, F>(a: &[T], b: &[T], out: &[T], f: F) -> Result<(), CheckError>
where
    T: Copy + PartialEq + Debug,
    F: Fn(T, T) -> T,
{
    guarantee(
        a.len() == b.len() && b.len() == out.len(),
        "comparator operands must have equal length",
    );
    let mut count = 0;
    let mut first_index = 0;
    for i in 0..out.len() {
        let expected = f(a[i], b[i]);
        if out[i] != expected {
            if count == 0 {
                first_index = i;
            }
            count += 1;
            if count <= MISMATCH_PRINT_LIMIT {
                log::error!(
                    "mismatch at {}: computed {:?}, expected {:?}",
                    i,
                    out[i],
                    expected
                );
            }
        }
    }
    if count > 0 {
        log::error!("{count} mismatches, first at index {first_index}");
        return Err(CheckError::Mismatches { count, first_index });
    }
    Ok(())
}

/// Assert that `out` diverges from `f(a, b)` in at least one element.
/// Returns the report for inspection on success.
pub fn verify_divergence<T, F>(
    a: &[T],
    b: &[T],
    out: &[T],
    f: F,
) -> Result<MismatchReport, CheckError>
where
    T: Copy + PartialEq,
    F: Fn(T, T) -> T,
{
    let report = compare_vectors(a, b, out, f);
    if report.is_clean() {
        log::error!("expected a divergence, found none over {} elements", out.len());
        return Err(CheckError::NoDivergence { len: out.len() });
    }
    Ok(report)
}

/// [`verify_match`] specialized to elementwise addition.
pub fn check_vector_add<T>(a: &[T], b: &[T], out: &[T]) -> Result<(), CheckError>
where
    T: Copy + PartialEq + Debug + Add<Output = T>,
{
    verify_match(a, b, out, |x, y| x + y)
}

/// [`verify_match`] specialized to identity: `out` must reproduce
/// `expected` element for element.
pub fn check_expected<T>(expected: &[T], out: &[T]) -> Result<(), CheckError>
where
    T: Copy + PartialEq + Debug,
{
    verify_match(expected, expected, out, |x, _| x)
}

/// Row-major equality scan of two linearized `width x height` buffers.
/// Logs the first differing pair and short-circuits false; true only if the
/// entire region is pairwise equal.
pub fn check_array_2d<T>(result: &[T], compare: &[T], width: usize, height: usize) -> bool
where
    T: PartialEq + Debug,
{
    guarantee(
        result.len() >= width * height && compare.len() >= width * height,
        "2D check operands smaller than width * height",
    );
    for i in 0..height {
        for j in 0..width {
            let offset = i * width + j;
            if result[offset] != compare[offset] {
                log::warn!(
                    "2D mismatch at [{},{}]: {:?} vs {:?}",
                    i,
                    j,
                    result[offset],
                    compare[offset]
                );
                return false;
            }
        }
    }
    true
}

/// Diagnostic dump of every differing position in two linearized
/// `width x height x depth` buffers. Returns the difference count; never
/// fails by itself, the caller decides pass/fail.
pub fn dump_array_3d<T>(a: &[T], b: &[T], width: usize, height: usize, depth: usize) -> usize
where
    T: PartialEq + Debug,
{
    guarantee(
        a.len() >= width * height * depth && b.len() >= width * height * depth,
        "3D dump operands smaller than width * height * depth",
    );
    let mut diffs = 0;
    for i in 0..depth {
        for j in 0..height {
            for k in 0..width {
                let offset = i * width * height + j * width + k;
                if a[offset] != b[offset] {
                    log::warn!(
                        "3D mismatch at [{},{},{}]: {:?} vs {:?}",
                        i,
                        j,
                        k,
                        a[offset],
                        b[offset]
                    );
                    diffs += 1;
                }
            }
        }
    }
    diffs
}
