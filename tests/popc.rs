//! Population count intrinsic scenario.
//!
//! A 16x16 grid of inputs: `b[i] = i` for the 32-bit intrinsic and
//! `d[i] = 2^40 - i` for the 64-bit one. The device results must match the
//! independent shift-and-test host oracle at every position.

use gpurt_conformance::harness::{check_expected, popcount_u32, popcount_u64};
use gpurt_conformance::runtime::{Dim3, HostRuntime, ThreadCtx};

const WIDTH: usize = 16;
const HEIGHT: usize = 16;
const NUM: usize = WIDTH * HEIGHT;

const THREADS_PER_BLOCK_X: u32 = 8;
const THREADS_PER_BLOCK_Y: u32 = 8;

#[test]
fn popc_matches_host_oracle() {
    let rt = HostRuntime::new();
    let props = rt.device_properties(0).expect("device 0 properties");
    log::info!("device: {} ({}.{})", props.name, props.major, props.minor);

    let mut host_b = vec![0u32; NUM];
    let mut host_d = vec![0u64; NUM];
    for i in 0..NUM {
        host_b[i] = i as u32;
        host_d[i] = 1_099_511_627_776 - i as u64;
    }

    let dev_a = rt.malloc::<u32>(NUM).expect("malloc a");
    let dev_b = rt.malloc::<u32>(NUM).expect("malloc b");
    let dev_c = rt.malloc::<u32>(NUM).expect("malloc c");
    let dev_d = rt.malloc::<u64>(NUM).expect("malloc d");

    rt.memcpy_htod(&dev_b, &host_b).expect("htod b");
    rt.memcpy_htod(&dev_d, &host_d).expect("htod d");

    let grid = Dim3::new(
        WIDTH as u32 / THREADS_PER_BLOCK_X,
        HEIGHT as u32 / THREADS_PER_BLOCK_Y,
        1,
    );
    let block = Dim3::new(THREADS_PER_BLOCK_X, THREADS_PER_BLOCK_Y, 1);
    rt.launch(grid, block, |ctx| {
        let i = (ctx.global_y() as usize) * WIDTH + ctx.global_x() as usize;
        if i < NUM {
            dev_a.store(i, ThreadCtx::popc(dev_b.load(i)));
            dev_c.store(i, ThreadCtx::popcll(dev_d.load(i)));
        }
    })
    .expect("launch");

    let mut host_a = vec![0u32; NUM];
    let mut host_c = vec![0u32; NUM];
    rt.memcpy_dtoh(&mut host_a, &dev_a).expect("dtoh a");
    rt.memcpy_dtoh(&mut host_c, &dev_c).expect("dtoh c");

    let expected_32: Vec<u32> = host_b.iter().map(|&v| popcount_u32(v)).collect();
    let expected_64: Vec<u32> = host_d.iter().map(|&v| popcount_u64(v)).collect();
    check_expected(&expected_32, &host_a).expect("32-bit popcount");
    check_expected(&expected_64, &host_c).expect("64-bit popcount");

    rt.free(dev_a).expect("free a");
    rt.free(dev_b).expect("free b");
    rt.free(dev_c).expect("free c");
    rt.free(dev_d).expect("free d");
}

/// The concrete oracle from the scenario definition: `a[i] = popcount(i)`
/// over [0, 256).
#[test]
fn popcount_of_indices_is_the_expected_table() {
    for i in 0..NUM {
        assert_eq!(popcount_u32(i as u32), (i as u32).count_ones());
    }
}
