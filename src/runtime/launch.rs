//! Per-thread launch context and device intrinsics.

use super::Dim3;

/// Execution context handed to a kernel closure, one per (block, thread)
/// coordinate of the launch grid. Carries the coordinate space plus the
/// device intrinsics whose outputs the scenarios check.
#[derive(Debug, Clone, Copy)]
pub struct ThreadCtx {
    pub block_idx: Dim3,
    pub thread_idx: Dim3,
    pub block_dim: Dim3,
    pub grid_dim: Dim3,
    warp_size: u32,
}

impl ThreadCtx {
    pub(crate) fn new(
        block_idx: Dim3,
        thread_idx: Dim3,
        block_dim: Dim3,
        grid_dim: Dim3,
        warp_size: u32,
    ) -> Self {
        Self {
            block_idx,
            thread_idx,
            block_dim,
            grid_dim,
            warp_size,
        }
    }

    /// Global x coordinate: `blockDim.x * blockIdx.x + threadIdx.x`.
    pub fn global_x(&self) -> u32 {
        self.block_dim.x * self.block_idx.x + self.thread_idx.x
    }

    /// Global y coordinate: `blockDim.y * blockIdx.y + threadIdx.y`.
    pub fn global_y(&self) -> u32 {
        self.block_dim.y * self.block_idx.y + self.thread_idx.y
    }

    /// Linear thread index within the block, x fastest.
    pub fn flat_thread(&self) -> u32 {
        (self.thread_idx.z * self.block_dim.y + self.thread_idx.y) * self.block_dim.x
            + self.thread_idx.x
    }

    /// Wave width of the executing device.
    pub fn warp_size(&self) -> u32 {
        self.warp_size
    }

    /// Lane position within the wave.
    pub fn lane_id(&self) -> u32 {
        self.flat_thread() % self.warp_size
    }

    /// Count of set bits in `mask` among lanes below this one, restricted to
    /// the low 32 lanes of the wave.
    pub fn mbcnt_lo(&self, mask: u32) -> u32 {
        let lane = self.lane_id();
        let below = if lane >= 32 {
            mask
        } else {
            mask & ((1u32 << lane) - 1)
        };
        below.count_ones()
    }

    /// Count of set bits in `mask` among lanes below this one within the
    /// high 32 lanes of the wave. Zero for lanes in the low half.
    pub fn mbcnt_hi(&self, mask: u32) -> u32 {
        let lane = self.lane_id();
        if lane < 32 {
            0
        } else {
            (mask & ((1u32 << (lane - 32)) - 1)).count_ones()
        }
    }

    /// Population count of a 32-bit value.
    pub fn popc(value: u32) -> u32 {
        value.count_ones()
    }

    /// Population count of a 64-bit value.
    pub fn popcll(value: u64) -> u32 {
        value.count_ones()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ctx_for_thread(tx: u32, warp_size: u32) -> ThreadCtx {
        ThreadCtx::new(
            Dim3::default(),
            Dim3::linear(tx),
            Dim3::linear(256),
            Dim3::default(),
            warp_size,
        )
    }

    #[test]
    fn lane_id_wraps_at_wave_boundary() {
        let ctx = ctx_for_thread(0, 64);
        assert_eq!(ctx.lane_id(), 0);
        let ctx = ctx_for_thread(63, 64);
        assert_eq!(ctx.lane_id(), 63);
        let ctx = ctx_for_thread(64, 64);
        assert_eq!(ctx.lane_id(), 0);
    }

    #[test]
    fn mbcnt_full_mask_matches_lane_model() {
        for tx in 0..128 {
            let ctx = ctx_for_thread(tx, 64);
            let lane = tx % 64;
            let expected_lo = if lane >= 32 { 32 } else { lane };
            let expected_hi = if lane < 32 { 0 } else { lane - 32 };
            assert_eq!(ctx.mbcnt_lo(u32::MAX), expected_lo, "lane {lane}");
            assert_eq!(ctx.mbcnt_hi(u32::MAX), expected_hi, "lane {lane}");
        }
    }

    #[test]
    fn mbcnt_respects_mask_bits() {
        // Only even lanes set: lane 5 sees set bits at 0, 2, 4.
        let mask = 0x5555_5555;
        let ctx = ctx_for_thread(5, 64);
        assert_eq!(ctx.mbcnt_lo(mask), 3);
    }

    #[test]
    fn popc_matches_count_ones() {
        assert_eq!(ThreadCtx::popc(0), 0);
        assert_eq!(ThreadCtx::popc(0xFF), 8);
        assert_eq!(ThreadCtx::popcll(u64::MAX), 64);
    }

    #[test]
    fn flat_thread_is_x_fastest() {
        let ctx = ThreadCtx::new(
            Dim3::default(),
            Dim3::new(1, 2, 0),
            Dim3::new(8, 8, 1),
            Dim3::default(),
            64,
        );
        assert_eq!(ctx.flat_thread(), 2 * 8 + 1);
    }
}
