//! Paired host/device buffer lifecycle helpers.
//!
//! Scenarios conventionally work with up to three slots (A, B, C). A slot
//! that is not requested stays `None`: it is never allocated, populated, or
//! released. Host allocations are capability-tagged by [`HostAlloc`], so the
//! release path travels with the value and can never be mismatched against
//! the allocation path.

use crate::runtime::{DeviceBuffer, DeviceValue, HostRuntime, PinnedBuffer, RuntimeResult};

use super::check::guarantee;
use super::pattern::{fill_pattern, PatternElement, Slot};

/// A host allocation together with the release path it requires.
pub enum HostAlloc<T> {
    /// Plain heap allocation, released by dropping.
    Heap(Vec<T>),
    /// Pinned allocation, released through the runtime.
    Pinned(PinnedBuffer<T>),
}

impl<T> HostAlloc<T> {
    pub fn is_pinned(&self) -> bool {
        matches!(self, HostAlloc::Pinned(_))
    }
}

impl<T> std::ops::Deref for HostAlloc<T> {
    type Target = [T];

    fn deref(&self) -> &[T] {
        match self {
            HostAlloc::Heap(v) => v,
            HostAlloc::Pinned(p) => p,
        }
    }
}

impl<T> std::ops::DerefMut for HostAlloc<T> {
    fn deref_mut(&mut self) -> &mut [T] {
        match self {
            HostAlloc::Heap(v) => v,
            HostAlloc::Pinned(p) => p,
        }
    }
}

/// Which of the three conventional slots a helper call should touch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SlotMask {
    pub a: bool,
    pub b: bool,
    pub c: bool,
}

impl SlotMask {
    pub const ALL: Self = Self { a: true, b: true, c: true };
    pub const AB: Self = Self { a: true, b: true, c: false };
    pub const A: Self = Self { a: true, b: false, c: false };
    pub const NONE: Self = Self { a: false, b: false, c: false };

    pub fn any(&self) -> bool {
        self.a || self.b || self.c
    }
}

/// Host-side slots of a scenario.
pub struct HostSet<T> {
    pub a: Option<HostAlloc<T>>,
    pub b: Option<HostAlloc<T>>,
    pub c: Option<HostAlloc<T>>,
}

/// Device-side slots of a scenario.
pub struct DeviceSet<T> {
    pub a: Option<DeviceBuffer<T>>,
    pub b: Option<DeviceBuffer<T>>,
    pub c: Option<DeviceBuffer<T>>,
}

fn host_slot<T: PatternElement>(
    rt: &HostRuntime,
    want: bool,
    n: usize,
    pinned: bool,
    slot: Slot,
) -> RuntimeResult<Option<HostAlloc<T>>> {
    if !want {
        return Ok(None);
    }
    let mut alloc = if pinned {
        HostAlloc::Pinned(rt.host_malloc(n)?)
    } else {
        let v = vec![T::default(); n];
        guarantee(v.len() == n, "heap allocation returned wrong length");
        HostAlloc::Heap(v)
    };
    fill_pattern(&mut alloc, slot);
    Ok(Some(alloc))
}

/// Allocate and populate the requested host slots: pinned through the
/// runtime when `pinned` is set, plain heap otherwise. Every allocated slot
/// is filled with its default pattern.
pub fn init_arrays_for_host<T: PatternElement>(
    rt: &HostRuntime,
    mask: SlotMask,
    n: usize,
    pinned: bool,
) -> RuntimeResult<HostSet<T>> {
    Ok(HostSet {
        a: host_slot(rt, mask.a, n, pinned, Slot::A)?,
        b: host_slot(rt, mask.b, n, pinned, Slot::B)?,
        c: host_slot(rt, mask.c, n, pinned, Slot::C)?,
    })
}

/// Superset of [`init_arrays_for_host`] that additionally allocates matching
/// device buffers for the requested device slots. A device allocation
/// failure stops the scenario.
pub fn init_arrays<T: PatternElement>(
    rt: &HostRuntime,
    dev_mask: SlotMask,
    host_mask: SlotMask,
    n: usize,
    pinned: bool,
) -> RuntimeResult<(DeviceSet<T>, HostSet<T>)> {
    let dev = DeviceSet {
        a: if dev_mask.a { Some(rt.malloc(n)?) } else { None },
        b: if dev_mask.b { Some(rt.malloc(n)?) } else { None },
        c: if dev_mask.c { Some(rt.malloc(n)?) } else { None },
    };
    let host = init_arrays_for_host(rt, host_mask, n, pinned)?;
    Ok((dev, host))
}

/// Symmetric release of host slots. The release path follows each value's
/// [`HostAlloc`] variant; empty slots are skipped.
pub fn free_arrays_for_host<T: DeviceValue>(
    rt: &HostRuntime,
    set: HostSet<T>,
) -> RuntimeResult<()> {
    for slot in [set.a, set.b, set.c].into_iter().flatten() {
        match slot {
            HostAlloc::Heap(v) => drop(v),
            HostAlloc::Pinned(p) => rt.host_free(p)?,
        }
    }
    Ok(())
}

/// Symmetric release of device and host slots. Device buffers always go
/// through the device free path, whatever the host allocation kind was.
pub fn free_arrays<T: DeviceValue>(
    rt: &HostRuntime,
    dev: DeviceSet<T>,
    host: HostSet<T>,
) -> RuntimeResult<()> {
    for buf in [dev.a, dev.b, dev.c].into_iter().flatten() {
        rt.free(buf)?;
    }
    free_arrays_for_host(rt, host)
}
