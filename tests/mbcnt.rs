//! Wave position intrinsic scenario: mbcnt_lo/mbcnt_hi/lane_id.
//!
//! Two blocks of two waves each. Every thread records its mbcnt values for
//! a full execution mask and its lane id; all three must match the lane
//! model derived from the device's wave width.

use gpurt_conformance::harness::{
    check_expected, expected_lane_id, expected_mbcnt_hi, expected_mbcnt_lo,
};
use gpurt_conformance::runtime::{Dim3, HostRuntime};

#[test]
fn mbcnt_and_lane_id_match_lane_model() {
    let rt = HostRuntime::new();
    let props = rt.device_properties(0).expect("device 0 properties");
    let wave_size = props.warp_size;

    const NUM_WAVES_PER_BLOCK: u32 = 2;
    const NUM_BLOCKS: u32 = 2;
    let threads_per_block = wave_size * NUM_WAVES_PER_BLOCK;
    let num_threads = (threads_per_block * NUM_BLOCKS) as usize;

    let dev_lo = rt.malloc::<u32>(num_threads).expect("malloc lo");
    let dev_hi = rt.malloc::<u32>(num_threads).expect("malloc hi");
    let dev_lane = rt.malloc::<u32>(num_threads).expect("malloc lane");

    rt.launch(
        Dim3::linear(NUM_BLOCKS),
        Dim3::linear(threads_per_block),
        |ctx| {
            let x = (ctx.block_dim.x * ctx.block_idx.x + ctx.thread_idx.x) as usize;
            dev_lo.store(x, ctx.mbcnt_lo(u32::MAX));
            dev_hi.store(x, ctx.mbcnt_hi(u32::MAX));
            dev_lane.store(x, ctx.lane_id());
        },
    )
    .expect("launch");

    let mut host_lo = vec![0u32; num_threads];
    let mut host_hi = vec![0u32; num_threads];
    let mut host_lane = vec![0u32; num_threads];
    rt.memcpy_dtoh(&mut host_lo, &dev_lo).expect("dtoh lo");
    rt.memcpy_dtoh(&mut host_hi, &dev_hi).expect("dtoh hi");
    rt.memcpy_dtoh(&mut host_lane, &dev_lane).expect("dtoh lane");

    let mut want_lo = vec![0u32; num_threads];
    let mut want_hi = vec![0u32; num_threads];
    let mut want_lane = vec![0u32; num_threads];
    for i in 0..num_threads {
        let lane = expected_lane_id(i as u32, wave_size);
        want_lane[i] = lane;
        want_lo[i] = expected_mbcnt_lo(lane);
        want_hi[i] = expected_mbcnt_hi(lane);
    }

    check_expected(&want_lo, &host_lo).expect("mbcnt_lo");
    check_expected(&want_hi, &host_hi).expect("mbcnt_hi");
    check_expected(&want_lane, &host_lane).expect("lane_id");

    rt.free(dev_lo).expect("free lo");
    rt.free(dev_hi).expect("free hi");
    rt.free(dev_lane).expect("free lane");
}
