//! Bounded dispatcher for per-page article fetches
//!
//! This module handles:
//! - Global concurrency limiting via a semaphore shared across pages
//! - Optional delay before each dispatch
//! - Collecting task results back into listing order
//! - Backing off from dispatch once cancellation is requested

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;

/// Launches fetch tasks with a bounded number in flight
///
/// Each task holds a semaphore permit for its whole lifetime, so at most
/// `max_concurrent` tasks run at once across every dispatch round. Results
/// are tagged with the caller's index and handed back in index order by
/// `drain`, independent of completion order.
pub struct Dispatcher<T> {
    /// Global semaphore for limiting concurrent fetches
    semaphore: Arc<Semaphore>,

    /// Pause before each dispatch
    dispatch_delay: Duration,

    /// Tasks launched since the last drain
    tasks: JoinSet<(usize, T)>,
}

impl<T: Send + 'static> Dispatcher<T> {
    /// Creates a new dispatcher
    ///
    /// # Arguments
    ///
    /// * `max_concurrent` - Maximum number of tasks in flight (at least 1)
    /// * `dispatch_delay` - Pause before each dispatch
    pub fn new(max_concurrent: usize, dispatch_delay: Duration) -> Self {
        Self {
            semaphore: Arc::new(Semaphore::new(max_concurrent.max(1))),
            dispatch_delay,
            tasks: JoinSet::new(),
        }
    }

    /// Launches `task` once a permit is available
    ///
    /// Waits for the dispatch delay and then for a free permit. Either wait
    /// is abandoned if `cancel` fires, in which case the task is dropped
    /// without running.
    ///
    /// # Returns
    ///
    /// * `true` - The task was spawned
    /// * `false` - Cancellation was observed first; nothing was spawned
    pub async fn dispatch<F>(&mut self, index: usize, cancel: &CancellationToken, task: F) -> bool
    where
        F: Future<Output = T> + Send + 'static,
    {
        if cancel.is_cancelled() {
            return false;
        }

        if !self.dispatch_delay.is_zero() {
            tokio::select! {
                _ = cancel.cancelled() => return false,
                _ = tokio::time::sleep(self.dispatch_delay) => {}
            }
        }

        let permit = tokio::select! {
            biased;
            _ = cancel.cancelled() => return false,
            permit = Arc::clone(&self.semaphore).acquire_owned() => match permit {
                Ok(permit) => permit,
                Err(_) => return false,
            },
        };

        self.tasks.spawn(async move {
            let _permit = permit;
            (index, task.await)
        });
        true
    }

    /// Returns the number of tasks launched since the last drain
    pub fn in_flight(&self) -> usize {
        self.tasks.len()
    }

    /// Returns the number of permits currently free
    pub fn available_permits(&self) -> usize {
        self.semaphore.available_permits()
    }

    /// Waits for every launched task and returns their results in index order
    ///
    /// A task that panicked contributes nothing; the panic is logged.
    pub async fn drain(&mut self) -> Vec<T> {
        let mut results = Vec::with_capacity(self.tasks.len());
        while let Some(joined) = self.tasks.join_next().await {
            match joined {
                Ok(result) => results.push(result),
                Err(e) => tracing::error!("Article task failed to complete: {}", e),
            }
        }

        results.sort_by_key(|(index, _)| *index);
        results.into_iter().map(|(_, result)| result).collect()
    }
}
