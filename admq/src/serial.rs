use crate::error::{AdmqError, AdmqResult};
use std::future::Future;
use std::pin::Pin;
use std::time::Duration;
use tokio::sync::{mpsc, oneshot};

type BoxedTask = Pin<Box<dyn Future<Output = ()> + Send + 'static>>;

/// Multi-producer, single-consumer FIFO task executor.
///
/// One worker drains submitted tasks strictly in arrival order, awaiting
/// each to completion before starting the next. This removes the
/// read-modify-write race in identifier assignment: only one "read max,
/// increment, insert" sequence is ever in flight per queue instance.
pub struct SerialTaskQueue {
    tx: mpsc::UnboundedSender<BoxedTask>,
}

impl SerialTaskQueue {
    /// `settle_delay` is slept between tasks so the store can settle
    /// before the next task reads; pass `Duration::ZERO` to disable.
    pub fn new(settle_delay: Duration) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        tokio::spawn(drain(rx, settle_delay));
        Self { tx }
    }

    /// Submit a task; the returned handle resolves with its outcome.
    ///
    /// Once enqueued a task always runs - there is no cancellation, and a
    /// producer that stops waiting does not stop the task.
    pub fn enqueue<F, T>(&self, task: F) -> Submitted<T>
    where
        F: Future<Output = AdmqResult<T>> + Send + 'static,
        T: Send + 'static,
    {
        let (done_tx, done_rx) = oneshot::channel();
        let boxed: BoxedTask = Box::pin(async move {
            let outcome = task.await;
            // The producer may have stopped waiting; the work is done
            // either way.
            let _ = done_tx.send(outcome);
        });

        if self.tx.send(boxed).is_err() {
            // Only possible if the worker died; the producer observes
            // TaskLost through its handle.
            tracing::error!("serial queue worker is gone, task dropped");
        }

        Submitted { rx: done_rx }
    }
}

async fn drain(mut rx: mpsc::UnboundedReceiver<BoxedTask>, settle_delay: Duration) {
    while let Some(task) = rx.recv().await {
        // Each task runs in its own spawn so a panic inside one cannot
        // take the drain loop down with it; awaiting the handle keeps
        // execution strictly serial.
        if let Err(err) = tokio::spawn(task).await {
            tracing::error!("admission task panicked: {err:?}");
        }

        if !settle_delay.is_zero() {
            tokio::time::sleep(settle_delay).await;
        }
    }
}

/// Producer-side handle to an enqueued task's outcome.
pub struct Submitted<T> {
    rx: oneshot::Receiver<AdmqResult<T>>,
}

impl<T> Submitted<T> {
    pub async fn outcome(self) -> AdmqResult<T> {
        self.rx.await.unwrap_or(Err(AdmqError::TaskLost))
    }

    /// Bounded wait. On timeout the producer stops waiting but the task
    /// still runs to completion inside the queue.
    pub async fn outcome_timeout(self, wait: Duration) -> AdmqResult<T> {
        match tokio::time::timeout(wait, self.rx).await {
            Ok(outcome) => outcome.unwrap_or(Err(AdmqError::TaskLost)),
            Err(_) => Err(AdmqError::WaitTimeout),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    #[tokio::test]
    async fn fifo_order_even_when_later_tasks_are_faster() {
        let queue = SerialTaskQueue::new(Duration::ZERO);
        let completed: Arc<Mutex<Vec<u32>>> = Arc::new(Mutex::new(Vec::new()));

        // Later submissions sleep less; FIFO must still hold.
        let delays_ms = [50u64, 1, 30, 2, 10];
        let handles: Vec<_> = delays_ms
            .iter()
            .enumerate()
            .map(|(i, &delay)| {
                let completed = completed.clone();
                queue.enqueue(async move {
                    tokio::time::sleep(Duration::from_millis(delay)).await;
                    completed.lock().unwrap().push(i as u32 + 1);
                    Ok(i as u32 + 1)
                })
            })
            .collect();

        for (i, handle) in handles.into_iter().enumerate() {
            assert_eq!(handle.outcome().await.unwrap(), i as u32 + 1);
        }
        assert_eq!(*completed.lock().unwrap(), vec![1, 2, 3, 4, 5]);
    }

    #[tokio::test]
    async fn seventy_concurrent_tasks_issue_unique_contiguous_ids() {
        let queue = SerialTaskQueue::new(Duration::ZERO);
        let store: Arc<Mutex<Vec<u64>>> = Arc::new(Mutex::new(Vec::new()));

        // Each task performs the racy pattern: read current max, yield,
        // then insert max + 1. Serialized execution must still produce
        // a contiguous run with zero duplicates.
        let handles: Vec<_> = (0..70)
            .map(|_| {
                let store = store.clone();
                queue.enqueue(async move {
                    let current_max = store.lock().unwrap().last().copied().unwrap_or(0);
                    tokio::time::sleep(Duration::from_millis(1)).await;
                    let next = current_max + 1;
                    store.lock().unwrap().push(next);
                    Ok(next)
                })
            })
            .collect();

        let mut issued = Vec::new();
        for handle in handles {
            issued.push(handle.outcome().await.unwrap());
        }

        let expected: Vec<u64> = (1..=70).collect();
        assert_eq!(issued, expected);
        assert_eq!(*store.lock().unwrap(), expected);
    }

    #[tokio::test]
    async fn failing_task_rejects_only_its_own_handle() {
        let queue = SerialTaskQueue::new(Duration::ZERO);

        let failing = queue.enqueue(async {
            Err::<u32, _>(AdmqError::Persistence("store unavailable".into()))
        });
        let next = queue.enqueue(async { Ok(7u32) });

        assert!(matches!(
            failing.outcome().await,
            Err(AdmqError::Persistence(_))
        ));
        assert_eq!(next.outcome().await.unwrap(), 7);
    }

    async fn explode() -> AdmqResult<u32> {
        panic!("boom")
    }

    #[tokio::test]
    async fn panicking_task_does_not_stall_the_queue() {
        let queue = SerialTaskQueue::new(Duration::ZERO);

        let poisoned = queue.enqueue(explode());
        let next = queue.enqueue(async { Ok(1u32) });

        assert!(matches!(poisoned.outcome().await, Err(AdmqError::TaskLost)));
        assert_eq!(next.outcome().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn timed_out_producer_does_not_cancel_the_task() {
        let queue = SerialTaskQueue::new(Duration::ZERO);
        let ran = Arc::new(Mutex::new(false));

        let slow = {
            let ran = ran.clone();
            queue.enqueue(async move {
                tokio::time::sleep(Duration::from_millis(50)).await;
                *ran.lock().unwrap() = true;
                Ok(())
            })
        };

        assert!(matches!(
            slow.outcome_timeout(Duration::from_millis(5)).await,
            Err(AdmqError::WaitTimeout)
        ));

        // The task still runs to completion behind the timed-out producer.
        let after = queue.enqueue(async { Ok(()) });
        after.outcome().await.unwrap();
        assert!(*ran.lock().unwrap());
    }
}
