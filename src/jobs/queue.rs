use tokio::sync::mpsc;

use crate::models::CacheType;

/// A refresh request. Empty `cache_types` means refresh everything.
#[derive(Debug, Clone)]
pub struct RefreshJob {
    pub cache_types: Vec<CacheType>,
}

impl RefreshJob {
    pub fn all() -> Self {
        Self {
            cache_types: CacheType::ALL.to_vec(),
        }
    }

    pub fn of(cache_type: CacheType) -> Self {
        Self {
            cache_types: vec![cache_type],
        }
    }
}

/// Fire-and-forget handle into the refresh worker.
///
/// Enqueueing never blocks and never fails the caller; if the worker is
/// gone (shutdown) the job is dropped with a warning. Clones share the
/// same channel.
#[derive(Clone)]
pub struct RefreshQueue {
    tx: mpsc::UnboundedSender<RefreshJob>,
}

impl RefreshQueue {
    /// Create a queue and the receiving end for the worker loop.
    pub fn new() -> (Self, mpsc::UnboundedReceiver<RefreshJob>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, rx)
    }

    pub fn enqueue(&self, job: RefreshJob) {
        if self.tx.send(job).is_err() {
            tracing::warn!("Refresh queue receiver is gone, dropping refresh job");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn enqueued_jobs_arrive_in_order() {
        let (queue, mut rx) = RefreshQueue::new();
        queue.enqueue(RefreshJob::of(CacheType::AccountView));
        queue.enqueue(RefreshJob::all());

        let first = rx.recv().await.expect("first job");
        assert_eq!(first.cache_types, vec![CacheType::AccountView]);
        let second = rx.recv().await.expect("second job");
        assert_eq!(second.cache_types.len(), 3);
    }

    #[tokio::test]
    async fn enqueue_after_receiver_drop_does_not_panic() {
        let (queue, rx) = RefreshQueue::new();
        drop(rx);
        queue.enqueue(RefreshJob::all());
    }
}
