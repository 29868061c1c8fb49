//! Threading runtime and per-worker state
//!
//! Uses native OS threads (std::thread). Workers are scoped to the call so they
//! can borrow the store and configuration without reference counting.

use std::io;
use std::sync::{Condvar, Mutex, PoisonError};
use std::thread;

use crate::stats::StatsRecorder;
use crate::{Error, Result};

/// State owned by one worker thread for the duration of a phase
#[derive(Debug)]
pub struct ThreadState {
    pub id: usize,
    pub stats: StatsRecorder,
}

impl ThreadState {
    pub fn new(id: usize) -> Self {
        Self { id, stats: StatsRecorder::new() }
    }

    /// Pre-size the latency buffer for `ops` operations
    pub fn with_capacity(id: usize, ops: usize) -> Self {
        Self { id, stats: StatsRecorder::with_capacity(ops) }
    }
}

/// One-shot gate that holds workers until the spawning thread decides
///
/// Unlike a barrier it does not need to know how many threads will arrive,
/// so a partial spawn can still release the threads that did start.
#[derive(Debug, Default)]
struct StartGate {
    state: Mutex<Option<bool>>,
    opened: Condvar,
}

impl StartGate {
    /// Release every waiter; `go == false` tells them to return without working
    fn open(&self, go: bool) {
        *self.state.lock().unwrap_or_else(PoisonError::into_inner) = Some(go);
        self.opened.notify_all();
    }

    /// Block until the gate is opened and report whether to proceed
    fn wait(&self) -> bool {
        let guard = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        let guard = self
            .opened
            .wait_while(guard, |state| state.is_none())
            .unwrap_or_else(PoisonError::into_inner);
        (*guard).unwrap_or(false)
    }
}

/// Multi-threaded runtime for spawning and joining workers
pub struct ThreadingRuntime {
    num_threads: usize,
    spawn_limit: Option<usize>,
}

impl ThreadingRuntime {
    pub fn new(num_threads: usize) -> Self {
        Self { num_threads, spawn_limit: None }
    }

    /// Refuse to spawn more than `limit` threads, as an exhausted host would
    #[cfg(test)]
    fn with_spawn_limit(mut self, limit: usize) -> Self {
        self.spawn_limit = Some(limit);
        self
    }

    fn spawn_worker<'scope, 'env, T, W>(
        &self,
        scope: &'scope thread::Scope<'scope, 'env>,
        thread_id: usize,
        body: W,
    ) -> io::Result<thread::ScopedJoinHandle<'scope, T>>
    where
        T: Send + 'scope,
        W: FnOnce() -> T + Send + 'scope,
    {
        if self.spawn_limit.is_some_and(|limit| thread_id >= limit) {
            return Err(io::Error::new(io::ErrorKind::WouldBlock, "thread limit reached"));
        }
        thread::Builder::new()
            .name(format!("kvmark-worker-{thread_id}"))
            .spawn_scoped(scope, body)
    }

    /// Run `worker` on every thread and collect the results in thread order
    ///
    /// Threads wait on a start gate before calling `worker`, so none starts
    /// its clock while others are still being spawned. If a spawn fails the
    /// gate is opened with a stop signal, the threads already running exit
    /// without calling `worker` and the spawn error is returned. Returns only
    /// after every thread has been joined.
    pub fn run_workers<T, F>(&self, worker: F) -> Result<Vec<T>>
    where
        T: Send,
        F: Fn(usize) -> Result<T> + Sync,
    {
        let gate = StartGate::default();
        let worker = &worker;
        let gate = &gate;

        thread::scope(|scope| {
            let mut handles = Vec::with_capacity(self.num_threads);
            for thread_id in 0..self.num_threads {
                let spawned = self.spawn_worker(scope, thread_id, move || {
                    if gate.wait() {
                        Some(worker(thread_id))
                    } else {
                        None
                    }
                });
                match spawned {
                    Ok(handle) => handles.push(handle),
                    Err(e) => {
                        tracing::warn!(
                            "Spawned {} of {} worker threads: {}",
                            thread_id,
                            self.num_threads,
                            e
                        );
                        gate.open(false);
                        return Err(Error::Other(format!("Failed to spawn worker thread: {e}")));
                    }
                }
            }
            gate.open(true);

            let mut results = Vec::with_capacity(handles.len());
            let mut first_error = None;
            for handle in handles {
                match handle.join() {
                    Ok(Some(Ok(value))) => results.push(value),
                    Ok(Some(Err(e))) => {
                        first_error.get_or_insert(e);
                    }
                    Ok(None) => {
                        first_error
                            .get_or_insert(Error::Other("Worker start was cancelled".to_string()));
                    }
                    Err(e) => {
                        first_error.get_or_insert(Error::Other(format!("Thread panicked: {e:?}")));
                    }
                }
            }

            match first_error {
                Some(e) => Err(e),
                None => Ok(results),
            }
        })
    }

    pub fn num_threads(&self) -> usize {
        self.num_threads
    }
}
