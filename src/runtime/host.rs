//! Host-emulated reference runtime.
//!
//! Emulates a small multi-device GPU runtime in ordinary host memory:
//! per-device heap accounting, pinned and coherent host allocations, linear
//! and 2D-array copies with the extent rules of the runtime under test, and
//! a grid/block kernel launcher. Multi-block grids run blocks in parallel;
//! a single-block grid runs inline on the calling thread so concurrently
//! launched spin-wait kernels cannot starve each other in a bounded pool.

use std::collections::HashMap;
use std::sync::atomic::{AtomicI32, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::thread::ThreadId;

use rayon::prelude::*;

use super::launch::ThreadCtx;
use super::{DeviceProperties, DeviceValue, Dim3, Limit, RuntimeError, RuntimeResult};

/// Emulated per-device heap budget.
pub const DEFAULT_HEAP_BYTES: usize = 256 * 1024 * 1024;

const WARP_SIZE: u32 = 64;
const MAX_THREADS_PER_BLOCK: u32 = 1024;

struct DeviceState {
    props: DeviceProperties,
    heap_used: AtomicUsize,
}

impl DeviceState {
    fn new(ordinal: usize) -> Self {
        Self {
            props: DeviceProperties {
                name: format!("gpurt emulated device {ordinal}"),
                major: 9,
                minor: 0,
                warp_size: WARP_SIZE,
                max_threads_per_block: MAX_THREADS_PER_BLOCK,
                total_mem: DEFAULT_HEAP_BYTES,
                multi_processor_count: 8,
            },
            heap_used: AtomicUsize::new(0),
        }
    }

    fn reserve(&self, bytes: usize) -> RuntimeResult<()> {
        let prev = self.heap_used.fetch_add(bytes, Ordering::Relaxed);
        if prev + bytes > self.props.total_mem {
            self.heap_used.fetch_sub(bytes, Ordering::Relaxed);
            return Err(RuntimeError::OutOfMemory {
                requested: bytes,
                available: self.props.total_mem.saturating_sub(prev),
            });
        }
        Ok(())
    }

    fn release(&self, bytes: usize) {
        self.heap_used.fetch_sub(bytes, Ordering::Relaxed);
    }
}

/// Linear device allocation handle. Cheap to clone; clones share storage the
/// way raw device pointers alias the same memory.
pub struct DeviceBuffer<T> {
    device: usize,
    bytes: usize,
    data: Arc<Mutex<Vec<T>>>,
}

impl<T> std::fmt::Debug for DeviceBuffer<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DeviceBuffer")
            .field("device", &self.device)
            .field("bytes", &self.bytes)
            .finish_non_exhaustive()
    }
}

impl<T> Clone for DeviceBuffer<T> {
    fn clone(&self) -> Self {
        Self {
            device: self.device,
            bytes: self.bytes,
            data: Arc::clone(&self.data),
        }
    }
}

impl<T: DeviceValue> DeviceBuffer<T> {
    /// Element count of the allocation.
    pub fn len(&self) -> usize {
        self.data.lock().unwrap().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Device ordinal the buffer lives on.
    pub fn device(&self) -> usize {
        self.device
    }

    /// Read one element, as a global-memory load. Out-of-bounds access is a
    /// device fault (panic), not a reportable status.
    pub fn load(&self, idx: usize) -> T {
        self.data.lock().unwrap()[idx]
    }

    /// Write one element, as a global-memory store.
    pub fn store(&self, idx: usize, value: T) {
        self.data.lock().unwrap()[idx] = value;
    }
}

/// Pinned host allocation. Directly indexable from host code.
pub struct PinnedBuffer<T> {
    data: Vec<T>,
}

impl<T> std::ops::Deref for PinnedBuffer<T> {
    type Target = [T];

    fn deref(&self) -> &[T] {
        &self.data
    }
}

impl<T> std::ops::DerefMut for PinnedBuffer<T> {
    fn deref_mut(&mut self) -> &mut [T] {
        &mut self.data
    }
}

/// Fine-grained coherent host cells, visible to every execution context.
/// Loads and stores are relaxed; ordering comes from explicit system fences,
/// matching how the fence scenario brackets its shared state.
pub struct CoherentBuffer {
    cells: Arc<Vec<AtomicI32>>,
}

impl Clone for CoherentBuffer {
    fn clone(&self) -> Self {
        Self {
            cells: Arc::clone(&self.cells),
        }
    }
}

impl CoherentBuffer {
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    pub fn load(&self, idx: usize) -> i32 {
        self.cells[idx].load(Ordering::Relaxed)
    }

    pub fn store(&self, idx: usize, value: i32) {
        self.cells[idx].store(value, Ordering::Relaxed);
    }
}

/// 2D device array allocation (row-major `width * height`).
pub struct DeviceArray<T> {
    device: usize,
    bytes: usize,
    width: usize,
    height: usize,
    data: Arc<Mutex<Vec<T>>>,
}

impl<T> Clone for DeviceArray<T> {
    fn clone(&self) -> Self {
        Self {
            device: self.device,
            bytes: self.bytes,
            width: self.width,
            height: self.height,
            data: Arc::clone(&self.data),
        }
    }
}

impl<T> DeviceArray<T> {
    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn device(&self) -> usize {
        self.device
    }
}

/// The emulated runtime. One instance models a node with `device_count`
/// identical devices; the current device is tracked per calling thread.
pub struct HostRuntime {
    devices: Vec<DeviceState>,
    peer_enabled: bool,
    current: Mutex<HashMap<ThreadId, usize>>,
}

impl Default for HostRuntime {
    fn default() -> Self {
        Self::new()
    }
}

impl HostRuntime {
    /// Single-device runtime.
    pub fn new() -> Self {
        Self::with_devices(1)
    }

    /// Runtime emulating `count` devices with peer access enabled.
    pub fn with_devices(count: usize) -> Self {
        let devices = (0..count.max(1)).map(DeviceState::new).collect();
        Self {
            devices,
            peer_enabled: true,
            current: Mutex::new(HashMap::new()),
        }
    }

    /// Same topology with the peer-access capability switched off.
    pub fn without_peer_access(mut self) -> Self {
        self.peer_enabled = false;
        self
    }

    pub fn device_count(&self) -> usize {
        self.devices.len()
    }

    /// Select the current device for the calling thread.
    pub fn set_device(&self, id: usize) -> RuntimeResult<()> {
        self.check_device(id)?;
        self.current
            .lock()
            .unwrap()
            .insert(std::thread::current().id(), id);
        Ok(())
    }

    /// Current device of the calling thread (0 if never set).
    pub fn current_device(&self) -> usize {
        self.current
            .lock()
            .unwrap()
            .get(&std::thread::current().id())
            .copied()
            .unwrap_or(0)
    }

    pub fn device_properties(&self, id: usize) -> RuntimeResult<DeviceProperties> {
        self.check_device(id)?;
        Ok(self.devices[id].props.clone())
    }

    /// Query a limit on the current device.
    pub fn device_limit(&self, limit: Limit) -> RuntimeResult<usize> {
        let dev = &self.devices[self.current_device()];
        match limit {
            Limit::MallocHeapSize => Ok(dev.props.total_mem),
            Limit::StackSize => Err(RuntimeError::NotSupported("StackSize limit")),
            Limit::PrintfFifoSize => Err(RuntimeError::NotSupported("PrintfFifoSize limit")),
        }
    }

    /// Whether `device` can directly address allocations of `peer`.
    pub fn can_access_peer(&self, device: usize, peer: usize) -> RuntimeResult<bool> {
        self.check_device(device)?;
        self.check_device(peer)?;
        Ok(self.peer_enabled && device != peer)
    }

    /// Allocate `len` elements on the current device.
    pub fn malloc<T: DeviceValue>(&self, len: usize) -> RuntimeResult<DeviceBuffer<T>> {
        let device = self.current_device();
        let bytes = alloc_bytes::<T>(len)?;
        self.devices[device].reserve(bytes)?;
        Ok(DeviceBuffer {
            device,
            bytes,
            data: Arc::new(Mutex::new(vec![T::default(); len])),
        })
    }

    /// Release a device allocation, restoring its heap budget.
    pub fn free<T: DeviceValue>(&self, buf: DeviceBuffer<T>) -> RuntimeResult<()> {
        self.devices[buf.device].release(buf.bytes);
        Ok(())
    }

    /// Allocate pinned host memory.
    pub fn host_malloc<T: DeviceValue>(&self, len: usize) -> RuntimeResult<PinnedBuffer<T>> {
        alloc_bytes::<T>(len)?;
        Ok(PinnedBuffer {
            data: vec![T::default(); len],
        })
    }

    /// Release pinned host memory.
    pub fn host_free<T>(&self, buf: PinnedBuffer<T>) -> RuntimeResult<()> {
        drop(buf);
        Ok(())
    }

    /// Allocate coherent host cells for cross-context shared state.
    pub fn host_malloc_coherent(&self, len: usize) -> RuntimeResult<CoherentBuffer> {
        if len == 0 {
            return Err(RuntimeError::InvalidValue("coherent allocation of zero cells"));
        }
        Ok(CoherentBuffer {
            cells: Arc::new((0..len).map(|_| AtomicI32::new(0)).collect()),
        })
    }

    /// Release coherent host cells.
    pub fn host_free_coherent(&self, buf: CoherentBuffer) -> RuntimeResult<()> {
        drop(buf);
        Ok(())
    }

    /// Copy `src.len()` elements host-to-device into the front of `dst`.
    pub fn memcpy_htod<T: DeviceValue>(
        &self,
        dst: &DeviceBuffer<T>,
        src: &[T],
    ) -> RuntimeResult<()> {
        let mut data = dst.data.lock().unwrap();
        if src.len() > data.len() {
            return Err(RuntimeError::InvalidValue(
                "host source larger than device destination",
            ));
        }
        data[..src.len()].copy_from_slice(src);
        Ok(())
    }

    /// Copy `dst.len()` elements device-to-host from the front of `src`.
    pub fn memcpy_dtoh<T: DeviceValue>(
        &self,
        dst: &mut [T],
        src: &DeviceBuffer<T>,
    ) -> RuntimeResult<()> {
        let data = src.data.lock().unwrap();
        if dst.len() > data.len() {
            return Err(RuntimeError::InvalidValue(
                "host destination larger than device source",
            ));
        }
        dst.copy_from_slice(&data[..dst.len()]);
        Ok(())
    }

    /// Allocate a `width x height` device array on the current device.
    pub fn malloc_array<T: DeviceValue>(
        &self,
        width: usize,
        height: usize,
    ) -> RuntimeResult<DeviceArray<T>> {
        if width == 0 || height == 0 {
            return Err(RuntimeError::InvalidValue("array extent must be nonzero"));
        }
        let len = width
            .checked_mul(height)
            .ok_or(RuntimeError::InvalidValue("array extent overflows"))?;
        let device = self.current_device();
        let bytes = alloc_bytes::<T>(len)?;
        self.devices[device].reserve(bytes)?;
        Ok(DeviceArray {
            device,
            bytes,
            width,
            height,
            data: Arc::new(Mutex::new(vec![T::default(); len])),
        })
    }

    /// Release a device array.
    pub fn free_array<T>(&self, arr: DeviceArray<T>) -> RuntimeResult<()> {
        self.devices[arr.device].release(arr.bytes);
        Ok(())
    }

    /// Copy a `width x height` region host-to-array at `(x_off, y_off)`.
    /// `src_pitch` is the element stride between source rows. A zero width
    /// or height is a successful no-op.
    pub fn memcpy2d_to_array<T: DeviceValue>(
        &self,
        dst: &DeviceArray<T>,
        x_off: usize,
        y_off: usize,
        src: &[T],
        src_pitch: usize,
        width: usize,
        height: usize,
    ) -> RuntimeResult<()> {
        if width == 0 || height == 0 {
            return Ok(());
        }
        check_2d_extent(dst, x_off, y_off, src_pitch, width, height)?;
        if src.len() < (height - 1) * src_pitch + width {
            return Err(RuntimeError::InvalidValue("source buffer too small for extent"));
        }
        let mut data = dst.data.lock().unwrap();
        for row in 0..height {
            let s = row * src_pitch;
            let d = (y_off + row) * dst.width + x_off;
            data[d..d + width].copy_from_slice(&src[s..s + width]);
        }
        Ok(())
    }

    /// Copy a `width x height` region array-to-host from `(x_off, y_off)`.
    /// `dst_pitch` is the element stride between destination rows. A zero
    /// width or height is a successful no-op.
    pub fn memcpy2d_from_array<T: DeviceValue>(
        &self,
        dst: &mut [T],
        dst_pitch: usize,
        src: &DeviceArray<T>,
        x_off: usize,
        y_off: usize,
        width: usize,
        height: usize,
    ) -> RuntimeResult<()> {
        if width == 0 || height == 0 {
            return Ok(());
        }
        check_2d_extent(src, x_off, y_off, dst_pitch, width, height)?;
        if dst.len() < (height - 1) * dst_pitch + width {
            return Err(RuntimeError::InvalidValue(
                "destination buffer too small for extent",
            ));
        }
        let data = src.data.lock().unwrap();
        for row in 0..height {
            let s = (y_off + row) * src.width + x_off;
            let d = row * dst_pitch;
            dst[d..d + width].copy_from_slice(&data[s..s + width]);
        }
        Ok(())
    }

    /// Launch `kernel` over a `grid` of `block`-shaped thread blocks on the
    /// current device. The emulated launch is synchronous; multi-block grids
    /// execute blocks in parallel.
    pub fn launch<K>(&self, grid: Dim3, block: Dim3, kernel: K) -> RuntimeResult<()>
    where
        K: Fn(&ThreadCtx) + Sync,
    {
        let props = &self.devices[self.current_device()].props;
        if grid.total() == 0 || block.total() == 0 {
            return Err(RuntimeError::InvalidValue("launch dimensions must be nonzero"));
        }
        if block.total() > u64::from(props.max_threads_per_block) {
            return Err(RuntimeError::InvalidValue(
                "block size exceeds device thread limit",
            ));
        }
        let warp_size = props.warp_size;

        let run_block = |linear: u64| {
            let bx = (linear % u64::from(grid.x)) as u32;
            let by = ((linear / u64::from(grid.x)) % u64::from(grid.y)) as u32;
            let bz = (linear / (u64::from(grid.x) * u64::from(grid.y))) as u32;
            let block_idx = Dim3::new(bx, by, bz);
            for tz in 0..block.z {
                for ty in 0..block.y {
                    for tx in 0..block.x {
                        let ctx = ThreadCtx::new(
                            block_idx,
                            Dim3::new(tx, ty, tz),
                            block,
                            grid,
                            warp_size,
                        );
                        kernel(&ctx);
                    }
                }
            }
        };

        let blocks = grid.total();
        if blocks == 1 {
            run_block(0);
        } else {
            (0..blocks).into_par_iter().for_each(run_block);
        }
        Ok(())
    }

    /// Wait for outstanding work on the current device. Launches are
    /// synchronous under the emulation, so this always succeeds immediately.
    pub fn synchronize(&self) -> RuntimeResult<()> {
        Ok(())
    }

    fn check_device(&self, id: usize) -> RuntimeResult<()> {
        if id >= self.devices.len() {
            return Err(RuntimeError::InvalidDevice {
                id,
                count: self.devices.len(),
            });
        }
        Ok(())
    }
}

fn alloc_bytes<T>(len: usize) -> RuntimeResult<usize> {
    len.checked_mul(std::mem::size_of::<T>())
        .ok_or(RuntimeError::InvalidValue("allocation size overflows"))
}

fn check_2d_extent<T>(
    arr: &DeviceArray<T>,
    x_off: usize,
    y_off: usize,
    pitch: usize,
    width: usize,
    height: usize,
) -> RuntimeResult<()> {
    if pitch < width {
        return Err(RuntimeError::InvalidValue("pitch smaller than copy width"));
    }
    if x_off + width > arr.width || y_off + height > arr.height {
        return Err(RuntimeError::InvalidValue("copy region exceeds array extent"));
    }
    Ok(())
}
