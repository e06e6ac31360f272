use std::collections::VecDeque;

use futures::{future::BoxFuture, stream::FuturesUnordered, StreamExt};

/// A set of futures polled together and joined at the end of a fan-out. With a limit, at most
/// `limit` of them are polled at a time and the rest wait in spawn order.
pub(crate) struct ConcurrencyScope<'exec, T> {
    jobs: FuturesUnordered<BoxFuture<'exec, T>>,
    queued: VecDeque<BoxFuture<'exec, T>>,
    limit: Option<usize>,
}

impl<'exec, T> ConcurrencyScope<'exec, T> {
    pub(crate) fn new(limit: Option<usize>) -> Self {
        Self {
            jobs: FuturesUnordered::new(),
            queued: VecDeque::new(),
            limit,
        }
    }

    pub(crate) fn spawn(&mut self, future: BoxFuture<'exec, T>) {
        match self.limit {
            Some(limit) if self.jobs.len() >= limit => self.queued.push_back(future),
            _ => self.jobs.push(future),
        }
    }
}

impl<'exec, E> ConcurrencyScope<'exec, Result<(), E>> {
    /// Drives every job to completion. The first `Err` stops the join and drops the remaining
    /// jobs.
    pub(crate) async fn join_all(mut self) -> Result<(), E> {
        while let Some(result) = self.jobs.next().await {
            result?;
            if let Some(next) = self.queued.pop_front() {
                self.jobs.push(next);
            }
        }
        Ok(())
    }
}
