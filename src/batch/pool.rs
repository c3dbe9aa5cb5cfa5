//! Fixed-size worker pool over a shared FIFO job queue
//!
//! Workers block on a condition variable until a job or the shutdown signal
//! arrives. Jobs complete in any order. Errors inside a job are the job's
//! business; the pool only records infrastructure faults (a worker that
//! cannot be started, or a panic that escapes a job), keeping the first one.

use std::any::Any;
use std::collections::VecDeque;
use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicU32, AtomicUsize, Ordering};
use std::sync::{Arc, Condvar, Mutex, MutexGuard, OnceLock, PoisonError};
use std::thread::{self, JoinHandle};
use thiserror::Error;

/// A unit of work executed by one worker
pub trait Job: Send + 'static {
    fn run(self);
}

/// Faults of the pool itself. Fatal to the whole run.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PoolError {
    #[error("failed to start worker thread {index}: {reason}")]
    Spawn { index: usize, reason: String },

    #[error("worker thread faulted: {0}")]
    WorkerPanicked(String),
}

/// Default worker count: hardware parallelism minus one, at least one
pub fn default_worker_count() -> usize {
    thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(1)
        .saturating_sub(1)
        .max(1)
}

/// First-fault-wins slot; later faults are dropped
#[derive(Debug, Default)]
struct FaultSlot {
    first: OnceLock<PoolError>,
    discarded: AtomicUsize,
}

impl FaultSlot {
    /// Returns true if this fault is the one that was kept
    fn record(&self, fault: PoolError) -> bool {
        match self.first.set(fault) {
            Ok(()) => true,
            Err(fault) => {
                log::debug!("Discarding subsequent pool fault: {}", fault);
                self.discarded.fetch_add(1, Ordering::Relaxed);
                false
            }
        }
    }

    fn get(&self) -> Option<PoolError> {
        self.first.get().cloned()
    }
}

struct QueueState<J> {
    jobs: VecDeque<J>,
    shutting_down: bool,
}

struct Shared<J> {
    queue: Mutex<QueueState<J>>,
    available: Condvar,
    submitted: AtomicUsize,
    completed: AtomicUsize,
    reported_percent: AtomicU32,
    fault: FaultSlot,
}

impl<J> Shared<J> {
    fn lock_queue(&self) -> MutexGuard<'_, QueueState<J>> {
        self.queue.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Counters observed when a pool shut down cleanly
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PoolSummary {
    pub submitted: usize,
    pub completed: usize,
}

/// Worker pool owning its threads.
///
/// Every worker is joined before the pool goes away, whether through
/// [`WorkerPool::shutdown`], drop, or a failed construction.
pub struct WorkerPool<J: Job> {
    shared: Arc<Shared<J>>,
    workers: Vec<JoinHandle<()>>,
}

impl<J: Job> WorkerPool<J> {
    /// Start `threads` workers (at least one)
    pub fn new(threads: usize) -> Result<Self, PoolError> {
        Self::with_spawner(threads, |name, body| {
            thread::Builder::new().name(name).spawn(body)
        })
    }

    fn with_spawner<F>(threads: usize, mut spawn: F) -> Result<Self, PoolError>
    where
        F: FnMut(String, Box<dyn FnOnce() + Send>) -> std::io::Result<JoinHandle<()>>,
    {
        let threads = threads.max(1);
        let shared = Arc::new(Shared {
            queue: Mutex::new(QueueState {
                jobs: VecDeque::new(),
                shutting_down: false,
            }),
            available: Condvar::new(),
            submitted: AtomicUsize::new(0),
            completed: AtomicUsize::new(0),
            reported_percent: AtomicU32::new(0),
            fault: FaultSlot::default(),
        });

        let mut pool = Self {
            shared,
            workers: Vec::with_capacity(threads),
        };

        for index in 0..threads {
            let shared = Arc::clone(&pool.shared);
            let body: Box<dyn FnOnce() + Send> = Box::new(move || worker_loop(&shared));
            match spawn(format!("analyzer-worker-{}", index), body) {
                Ok(handle) => pool.workers.push(handle),
                Err(e) => {
                    let fault = PoolError::Spawn {
                        index,
                        reason: e.to_string(),
                    };
                    log::error!("{}", fault);
                    pool.shared.fault.record(fault.clone());
                    // dropping the pool stops and joins the workers already running
                    return Err(fault);
                }
            }
        }

        log::debug!("Started {} worker thread(s)", threads);
        Ok(pool)
    }

    /// Number of worker threads
    pub fn capacity(&self) -> usize {
        self.workers.len()
    }

    /// Jobs waiting for a worker
    pub fn queue_len(&self) -> usize {
        self.shared.lock_queue().jobs.len()
    }

    /// Enqueue a job and wake one idle worker
    pub fn submit(&self, job: J) {
        // count first so completed never overtakes submitted
        self.shared.submitted.fetch_add(1, Ordering::SeqCst);
        self.shared.lock_queue().jobs.push_back(job);
        self.shared.available.notify_one();
    }

    pub fn total_submitted(&self) -> usize {
        self.shared.submitted.load(Ordering::SeqCst)
    }

    pub fn total_completed(&self) -> usize {
        self.shared.completed.load(Ordering::SeqCst)
    }

    /// True when every submitted job has finished
    pub fn is_idle(&self) -> bool {
        self.total_completed() >= self.total_submitted()
    }

    /// `100 * completed / submitted`, or 0 before anything is submitted.
    ///
    /// Never decreases between calls, even if jobs are submitted while
    /// others are completing.
    pub fn progress_percent(&self) -> u32 {
        let completed = self.total_completed();
        let submitted = self.total_submitted();
        let current = if submitted == 0 {
            0
        } else {
            (completed.min(submitted) * 100 / submitted) as u32
        };
        let previous = self.shared.reported_percent.fetch_max(current, Ordering::SeqCst);
        previous.max(current)
    }

    /// First infrastructure fault recorded so far
    pub fn fault(&self) -> Option<PoolError> {
        self.shared.fault.get()
    }

    /// Let the workers drain the queue, then stop and join them.
    ///
    /// Returns the first infrastructure fault, if any worker hit one.
    pub fn shutdown(mut self) -> Result<PoolSummary, PoolError> {
        self.stop_and_join();

        if let Some(fault) = self.shared.fault.get() {
            let discarded = self.shared.fault.discarded.load(Ordering::Relaxed);
            if discarded > 0 {
                log::debug!("{} further pool fault(s) were discarded", discarded);
            }
            return Err(fault);
        }

        Ok(PoolSummary {
            submitted: self.total_submitted(),
            completed: self.total_completed(),
        })
    }

    fn stop_and_join(&mut self) {
        self.shared.lock_queue().shutting_down = true;
        self.shared.available.notify_all();

        for handle in self.workers.drain(..) {
            if let Err(payload) = handle.join() {
                self.shared
                    .fault
                    .record(PoolError::WorkerPanicked(panic_message(payload.as_ref())));
            }
        }
    }
}

impl<J: Job> Drop for WorkerPool<J> {
    fn drop(&mut self) {
        self.stop_and_join();
    }
}

fn worker_loop<J: Job>(shared: &Shared<J>) {
    loop {
        let job = {
            let mut state = shared.lock_queue();
            loop {
                if let Some(job) = state.jobs.pop_front() {
                    break job;
                }
                if state.shutting_down {
                    return;
                }
                state = shared
                    .available
                    .wait(state)
                    .unwrap_or_else(PoisonError::into_inner);
            }
        };

        if let Err(payload) = panic::catch_unwind(AssertUnwindSafe(|| job.run())) {
            let message = panic_message(payload.as_ref());
            log::error!("Job escaped with a panic: {}", message);
            shared.fault.record(PoolError::WorkerPanicked(message));
        }

        shared.completed.fetch_add(1, Ordering::SeqCst);
    }
}

pub(crate) fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io;
    use std::sync::Barrier;
    use std::time::Duration;

    struct CountJob(Arc<AtomicUsize>);

    impl Job for CountJob {
        fn run(self) {
            self.0.fetch_add(1, Ordering::SeqCst);
        }
    }

    enum TestJob {
        Sleep(Duration),
        Panic(Arc<Barrier>, &'static str),
    }

    impl Job for TestJob {
        fn run(self) {
            match self {
                TestJob::Sleep(d) => thread::sleep(d),
                TestJob::Panic(barrier, msg) => {
                    barrier.wait();
                    panic!("{}", msg);
                }
            }
        }
    }

    #[test]
    fn test_runs_every_job() {
        let counter = Arc::new(AtomicUsize::new(0));
        let pool = WorkerPool::new(3).unwrap();
        assert_eq!(pool.capacity(), 3);

        for _ in 0..50 {
            pool.submit(CountJob(Arc::clone(&counter)));
        }

        let summary = pool.shutdown().unwrap();
        assert_eq!(summary, PoolSummary { submitted: 50, completed: 50 });
        assert_eq!(counter.load(Ordering::SeqCst), 50);
    }

    #[test]
    fn test_zero_threads_means_one() {
        let pool: WorkerPool<CountJob> = WorkerPool::new(0).unwrap();
        assert_eq!(pool.capacity(), 1);
    }

    #[test]
    fn test_progress_monotonic_and_reaches_100() {
        let pool = WorkerPool::new(2).unwrap();
        assert_eq!(pool.progress_percent(), 0);

        for _ in 0..20 {
            pool.submit(TestJob::Sleep(Duration::from_millis(2)));
        }

        let mut last = 0;
        while !pool.is_idle() {
            let percent = pool.progress_percent();
            assert!(percent >= last);
            assert!(percent <= 100);
            last = percent;
            thread::sleep(Duration::from_millis(1));
        }

        assert_eq!(pool.progress_percent(), 100);
        pool.shutdown().unwrap();
    }

    #[test]
    fn test_shutdown_drains_queue() {
        let counter = Arc::new(AtomicUsize::new(0));
        let pool = WorkerPool::new(1).unwrap();
        pool.submit(TestJobOrCount::Sleep);
        for _ in 0..10 {
            pool.submit(TestJobOrCount::Count(Arc::clone(&counter)));
        }
        // the single worker is still asleep on the first job
        assert!(pool.queue_len() >= 9);

        pool.shutdown().unwrap();
        assert_eq!(counter.load(Ordering::SeqCst), 10);
    }

    enum TestJobOrCount {
        Sleep,
        Count(Arc<AtomicUsize>),
    }

    impl Job for TestJobOrCount {
        fn run(self) {
            match self {
                TestJobOrCount::Sleep => thread::sleep(Duration::from_millis(20)),
                TestJobOrCount::Count(c) => {
                    c.fetch_add(1, Ordering::SeqCst);
                }
            }
        }
    }

    #[test]
    fn test_concurrent_faults_reported_once() {
        let pool = WorkerPool::new(2).unwrap();
        let barrier = Arc::new(Barrier::new(2));
        pool.submit(TestJob::Panic(Arc::clone(&barrier), "first"));
        pool.submit(TestJob::Panic(Arc::clone(&barrier), "second"));
        // workers survive the panics and keep serving the queue
        pool.submit(TestJob::Sleep(Duration::from_millis(1)));

        while !pool.is_idle() {
            thread::sleep(Duration::from_millis(1));
        }
        assert_eq!(pool.total_completed(), 3);

        let fault = pool.shutdown().unwrap_err();
        assert!(matches!(
            fault,
            PoolError::WorkerPanicked(ref m) if m == "first" || m == "second"
        ));
    }

    #[test]
    fn test_fault_slot_keeps_first() {
        let slot = Arc::new(FaultSlot::default());
        let barrier = Arc::new(Barrier::new(8));

        let handles: Vec<_> = (0..8)
            .map(|i| {
                let slot = Arc::clone(&slot);
                let barrier = Arc::clone(&barrier);
                thread::spawn(move || {
                    barrier.wait();
                    slot.record(PoolError::WorkerPanicked(format!("fault {}", i)))
                })
            })
            .collect();

        let kept: usize = handles
            .into_iter()
            .map(|h| usize::from(h.join().unwrap()))
            .sum();

        assert_eq!(kept, 1);
        assert_eq!(slot.discarded.load(Ordering::Relaxed), 7);
        assert!(slot.get().is_some());
    }

    #[test]
    fn test_spawn_failure_is_fatal_and_joins_started_workers() {
        let mut calls = 0;
        let result: Result<WorkerPool<CountJob>, _> = WorkerPool::with_spawner(4, |name, body| {
            calls += 1;
            if calls == 3 {
                return Err(io::Error::new(io::ErrorKind::Other, "no more threads"));
            }
            thread::Builder::new().name(name).spawn(body)
        });

        match result {
            Err(PoolError::Spawn { index, reason }) => {
                assert_eq!(index, 2);
                assert!(reason.contains("no more threads"));
            }
            Err(other) => panic!("unexpected error: {other}"),
            Ok(_) => panic!("pool should not start"),
        }
    }

    #[test]
    fn test_drop_joins_workers() {
        let counter = Arc::new(AtomicUsize::new(0));
        {
            let pool = WorkerPool::new(2).unwrap();
            for _ in 0..5 {
                pool.submit(CountJob(Arc::clone(&counter)));
            }
        }
        assert_eq!(counter.load(Ordering::SeqCst), 5);
    }

    #[test]
    fn test_default_worker_count() {
        assert!(default_worker_count() >= 1);
    }
}
