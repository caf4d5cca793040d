//! Host-side expected-value models for the device intrinsics under test.

/// Population count by shift-and-test, kept in loop form as an independent
/// oracle for the device intrinsic.
pub fn popcount_u32(mut value: u32) -> u32 {
    let mut ret = 0;
    while value != 0 {
        if value & 0x1 != 0 {
            ret += 1;
        }
        value >>= 1;
    }
    ret
}

/// 64-bit variant of [`popcount_u32`].
pub fn popcount_u64(mut value: u64) -> u32 {
    let mut ret = 0;
    while value != 0 {
        if value & 0x1 != 0 {
            ret += 1;
        }
        value >>= 1;
    }
    ret
}

/// Expected lane position for a flat thread index within a wave.
pub fn expected_lane_id(thread: u32, warp_size: u32) -> u32 {
    thread % warp_size
}

/// Expected `mbcnt_lo` for a full execution mask: lanes below this one in
/// the low half of the wave.
pub fn expected_mbcnt_lo(lane: u32) -> u32 {
    if lane >= 32 {
        32
    } else {
        lane
    }
}

/// Expected `mbcnt_hi` for a full execution mask: lanes below this one in
/// the high half of the wave.
pub fn expected_mbcnt_hi(lane: u32) -> u32 {
    if lane < 32 {
        0
    } else {
        lane - 32
    }
}

/// Final shared state after `participants` contexts each complete `iters`
/// strict round-robin turns: `(counter, turn_flag)`.
pub fn round_robin_expect(init: i32, participants: i32, iters: i32) -> (i32, i32) {
    (init + participants * iters, participants * iters)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn popcount_agrees_with_count_ones() {
        for v in [0u32, 1, 2, 3, 0xFF, 0xFFFF_FFFF, 0x8000_0001] {
            assert_eq!(popcount_u32(v), v.count_ones());
        }
        for v in [0u64, 1, u64::MAX, 1_099_511_627_776, 1_099_511_627_776 - 255] {
            assert_eq!(popcount_u64(v), v.count_ones());
        }
    }

    #[test]
    fn mbcnt_model_splits_at_32() {
        assert_eq!(expected_mbcnt_lo(0), 0);
        assert_eq!(expected_mbcnt_lo(31), 31);
        assert_eq!(expected_mbcnt_lo(32), 32);
        assert_eq!(expected_mbcnt_lo(63), 32);
        assert_eq!(expected_mbcnt_hi(31), 0);
        assert_eq!(expected_mbcnt_hi(32), 0);
        assert_eq!(expected_mbcnt_hi(63), 31);
    }

    #[test]
    fn round_robin_formula() {
        assert_eq!(round_robin_expect(1000, 3, 1000), (4000, 3000));
        assert_eq!(round_robin_expect(0, 1, 1), (1, 1));
    }
}
