use rayon::ThreadPool;

/// Worker pool with a graceful inline fallback.
///
/// Thread creation can fail in constrained CI/sandbox environments (low
/// `RLIMIT_NPROC`, `EAGAIN`); the engine degrades to sequential execution
/// rather than failing a batch over it.
pub(crate) enum WorkerPool {
    Rayon(ThreadPool),
    Inline,
}

impl WorkerPool {
    pub(crate) fn new(threads: usize) -> Self {
        let mut threads = threads.max(1);
        loop {
            match rayon::ThreadPoolBuilder::new()
                .num_threads(threads)
                .thread_name(|idx| format!("keynote-sheet-{idx}"))
                .build()
            {
                Ok(pool) => return WorkerPool::Rayon(pool),
                // OS thread limits: try a smaller pool before giving up on
                // parallelism entirely.
                Err(_) if threads > 1 => {
                    threads = (threads / 2).max(1);
                }
                Err(_) => return WorkerPool::Inline,
            }
        }
    }

    /// Runs `f(0..count)` across the pool and waits for all of them.
    pub(crate) fn run_each<F>(&self, count: usize, f: F)
    where
        F: Fn(usize) + Send + Sync,
    {
        match self {
            WorkerPool::Rayon(pool) => pool.scope(|scope| {
                let f = &f;
                for index in 0..count {
                    scope.spawn(move |_| f(index));
                }
            }),
            WorkerPool::Inline => {
                for index in 0..count {
                    f(index);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[test]
    fn runs_every_index_exactly_once() {
        for pool in [WorkerPool::new(4), WorkerPool::Inline] {
            let sum = AtomicUsize::new(0);
            pool.run_each(10, |i| {
                sum.fetch_add(i + 1, Ordering::SeqCst);
            });
            assert_eq!(sum.load(Ordering::SeqCst), 55);
        }
    }
}
