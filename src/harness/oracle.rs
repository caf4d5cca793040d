//! Round-robin ordering oracle for the system-fence scenario.
//!
//! Multiple contexts (one per participating device, plus one host thread)
//! increment a shared counter in strict turn order gated by a shared flag.
//! Every read/modify/write of the shared state is bracketed by system
//! fences; after all contexts finish, the final counter and flag values are
//! fully determined. Any deviation points at the fencing primitive under
//! test, not at this harness. There is no timeout here: a hang is the outer
//! harness's problem.

use std::sync::atomic::{fence, Ordering};
use std::thread;

use crossbeam_channel::bounded;

use crate::runtime::{CoherentBuffer, Dim3, HostRuntime, RuntimeResult};

/// Host side of the system fence bracket.
pub fn fence_system() {
    fence(Ordering::SeqCst);
}

/// One participant's loop: wait for our turn on `flag`, bump `data`, fence,
/// bump `flag`, fence. `data` and `flag` are single coherent cells.
pub fn round_robin(
    id: i32,
    participants: i32,
    iters: i32,
    data: &CoherentBuffer,
    flag: &CoherentBuffer,
) {
    for _ in 0..iters {
        while flag.load(0) % participants != id {
            fence_system(); // refresh our view of flag
            thread::yield_now();
        }
        data.store(0, data.load(0) + 1);
        fence_system(); // order the data store before the flag store
        flag.store(0, flag.load(0) + 1);
        fence_system(); // publish the flag
    }
}

/// Final shared state observed after a round-robin run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RoundRobinOutcome {
    pub data: i32,
    pub flag: i32,
    pub participants: i32,
}

/// Drive the round robin across one host thread plus one single-thread
/// kernel per device of `rt`, each taking `num_iter` turns. Returns the
/// final counter and flag values for comparison against
/// [`round_robin_expect`](super::reference::round_robin_expect).
pub fn run_round_robin(
    rt: &HostRuntime,
    num_iter: i32,
    init: i32,
) -> RuntimeResult<RoundRobinOutcome> {
    let data = rt.host_malloc_coherent(1)?;
    let flag = rt.host_malloc_coherent(1)?;
    data.store(0, init);
    flag.store(0, 0);

    // One host participant plus one kernel per device.
    let participants = rt.device_count() as i32 + 1;
    let (done_tx, done_rx) = bounded::<RuntimeResult<()>>(participants as usize);

    thread::scope(|scope| {
        {
            let data = data.clone();
            let flag = flag.clone();
            let done_tx = done_tx.clone();
            scope.spawn(move || {
                round_robin(0, participants, num_iter, &data, &flag);
                let _ = done_tx.send(Ok(()));
            });
        }

        for id in 1..participants {
            let data = data.clone();
            let flag = flag.clone();
            let done_tx = done_tx.clone();
            scope.spawn(move || {
                let result = rt.set_device((id - 1) as usize).and_then(|()| {
                    rt.launch(Dim3::default(), Dim3::default(), |_ctx| {
                        round_robin(id, participants, num_iter, &data, &flag);
                    })
                });
                let _ = done_tx.send(result);
            });
        }
    });

    for _ in 0..participants {
        done_rx
            .recv()
            .expect("round-robin worker disconnected without reporting")?;
    }

    let outcome = RoundRobinOutcome {
        data: data.load(0),
        flag: flag.load(0),
        participants,
    };
    rt.host_free_coherent(data)?;
    rt.host_free_coherent(flag)?;
    Ok(outcome)
}
