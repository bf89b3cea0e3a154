use std::sync::{Arc, Barrier, Mutex};

/// Collective operations between the ranks of an SPMD computation.
///
/// Every rank has to call the collectives in the same order, a rank that
/// skips one blocks all others forever.
pub trait Communicator {
    fn rank(&self) -> usize;

    fn size(&self) -> usize;

    fn is_root(&self) -> bool {
        self.rank() == 0
    }

    /// Element-wise sum of `send` over all ranks. The result is returned on
    /// `root` only, in ascending rank order of the summands.
    fn reduce_sum(&self, send: &[f64], root: usize) -> Option<Vec<f64>>;

    /// Overwrite `data` on every rank with the values of `root`.
    fn broadcast(&self, data: &mut [f64], root: usize);
}

/// Communicator of a single rank.
#[derive(Clone, Copy, Debug, Default)]
pub struct LocalCommunicator;

impl Communicator for LocalCommunicator {
    fn rank(&self) -> usize {
        0
    }

    fn size(&self) -> usize {
        1
    }

    fn reduce_sum(&self, send: &[f64], _root: usize) -> Option<Vec<f64>> {
        Some(send.to_vec())
    }

    fn broadcast(&self, _data: &mut [f64], _root: usize) {}
}

struct Shared {
    barrier: Barrier,
    slots: Mutex<Vec<Vec<f64>>>,
}

/// Ranks running as threads of one process.
///
/// # Examples
///
/// ```
/// # use mdpress_solver::comm::{Communicator, ThreadCommunicator};
/// let results: Vec<Option<Vec<f64>>> = std::thread::scope(|s| {
///     let handles: Vec<_> = ThreadCommunicator::group(3)
///         .into_iter()
///         .map(|comm| s.spawn(move || comm.reduce_sum(&[comm.rank() as f64, 1.0], 0)))
///         .collect();
///     handles.into_iter().map(|h| h.join().unwrap()).collect()
/// });
/// assert_eq!(results[0], Some(vec![3.0, 3.0]));
/// assert_eq!(results[1], None);
/// ```
pub struct ThreadCommunicator {
    rank: usize,
    size: usize,
    shared: Arc<Shared>,
}

impl ThreadCommunicator {
    /// Communicators for `size` ranks, hand one to every thread.
    pub fn group(size: usize) -> Vec<ThreadCommunicator> {
        let shared = Arc::new(Shared {
            barrier: Barrier::new(size),
            slots: Mutex::new(vec![vec![]; size]),
        });
        (0..size)
            .map(|rank| ThreadCommunicator {
                rank,
                size,
                shared: shared.clone(),
            })
            .collect()
    }
}

impl Communicator for ThreadCommunicator {
    fn rank(&self) -> usize {
        self.rank
    }

    fn size(&self) -> usize {
        self.size
    }

    fn reduce_sum(&self, send: &[f64], root: usize) -> Option<Vec<f64>> {
        {
            let mut slots = self.shared.slots.lock().expect("Can't lock communicator");
            slots[self.rank] = send.to_vec();
        }
        self.shared.barrier.wait();
        let result = if self.rank == root {
            let slots = self.shared.slots.lock().expect("Can't lock communicator");
            let mut sum = vec![0.0; send.len()];
            for slot in slots.iter() {
                for (s, v) in sum.iter_mut().zip(slot) {
                    *s += v;
                }
            }
            Some(sum)
        } else {
            None
        };
        // nobody may overwrite a slot before root has read it
        self.shared.barrier.wait();
        result
    }

    fn broadcast(&self, data: &mut [f64], root: usize) {
        if self.rank == root {
            let mut slots = self.shared.slots.lock().expect("Can't lock communicator");
            slots[root] = data.to_vec();
        }
        self.shared.barrier.wait();
        if self.rank != root {
            let slots = self.shared.slots.lock().expect("Can't lock communicator");
            data.copy_from_slice(&slots[root]);
        }
        self.shared.barrier.wait();
    }
}
