use crate::notify_job::{Notification, NotifySender};
use admq::{
    decode_job, AdmqError, AdmqResult, DeliverError, DequeueAction, DequeueHandle, DequeueStatus,
    FailAction, FinishAction, Job, NotifyQueue, RetryAtAction,
};
use redis::aio::ConnectionManager;
use redis::RedisResult;
use std::time::Duration;

const EMPTY_SLEEP_SECS: u64 = 2;
const ERROR_SLEEP_SECS: u64 = 5;
const MAX_BACKOFF_SHIFT: i64 = 16;

/// Delivery worker: drains the ready list, delivers through the supplied
/// sender, retries failures on an exponential schedule until the attempt
/// budget runs out, then moves them to the error hashes and moves on.
pub struct NotifyWorker<S> {
    connection_manager: ConnectionManager,
    queue: NotifyQueue,
    dequeue_action: DequeueAction,
    finish_action: FinishAction,
    retry_at_action: RetryAtAction,
    fail_action: FailAction,
    sender: S,
}

impl<S> NotifyWorker<S>
where
    S: NotifySender,
{
    pub async fn new(redis_url: &str, queue: NotifyQueue, sender: S) -> AdmqResult<Self> {
        let client = redis::Client::open(redis_url).map_err(AdmqError::CreateRedisClient)?;
        let connection_manager = client
            .get_tokio_connection_manager()
            .await
            .map_err(AdmqError::GetRedisConn)?;

        Ok(Self::with_connection(connection_manager, queue, sender))
    }

    pub fn with_connection(
        connection_manager: ConnectionManager,
        queue: NotifyQueue,
        sender: S,
    ) -> Self {
        Self {
            connection_manager,
            queue: queue.clone(),
            dequeue_action: DequeueAction::new(queue.clone()),
            finish_action: FinishAction::new(queue.clone()),
            retry_at_action: RetryAtAction::new(queue.clone()),
            fail_action: FailAction::new(queue),
            sender,
        }
    }

    pub async fn run(mut self) -> AdmqResult<()> {
        loop {
            let dequeue_status: RedisResult<DequeueStatus> = self
                .dequeue_action
                .prepare_invoke()
                .invoke_async(&mut self.connection_manager)
                .await;

            let dequeue_status = match dequeue_status {
                Ok(dequeue_status) => dequeue_status,
                Err(err) => {
                    tracing::error!("notify dequeue ERROR: {err:?}");
                    tokio::time::sleep(Duration::from_secs(ERROR_SLEEP_SECS)).await;
                    continue;
                }
            };

            tracing::trace!("{:?}", &dequeue_status);

            match dequeue_status {
                DequeueStatus::Empty => {
                    tokio::time::sleep(Duration::from_secs(EMPTY_SLEEP_SECS)).await;
                }
                DequeueStatus::Handle(handle) => match self.deliver(&handle.payload).await {
                    Ok(()) => {
                        let r: RedisResult<i64> = self
                            .finish_action
                            .prepare_invoke(handle.mid)
                            .invoke_async(&mut self.connection_manager)
                            .await;

                        if let Err(err) = r {
                            tracing::error!(
                                "error when finishing notification: {} - {}, {:?}",
                                &self.queue.queue_name,
                                handle.mid,
                                err
                            );
                        }
                    }
                    Err(err) => self.handle_failure(handle, err).await,
                },
                DequeueStatus::Skip(mid) => {
                    tracing::trace!("skipping orphan mid {mid}");
                }
                DequeueStatus::Unknown(s) => panic!("{}", s),
            }
        }
    }

    async fn deliver(&self, payload: &str) -> AdmqResult<()> {
        let notification = decode_notification(payload)?;
        self.sender
            .send(&notification)
            .await
            .map_err(|reason| AdmqError::Deliver(DeliverError::new(payload.into(), reason)))
    }

    async fn handle_failure(&mut self, handle: DequeueHandle, err: AdmqError) {
        match disposition(&err, handle.attempt) {
            FailureDisposition::Retry { delay_ms } => {
                let now_ms = time::OffsetDateTime::now_utc().unix_timestamp() * 1000;

                tracing::warn!(
                    "delivery attempt {} for mid {} failed, retrying in {delay_ms}ms: {err:?}",
                    handle.attempt,
                    handle.mid
                );

                let r: RedisResult<i64> = self
                    .retry_at_action
                    .prepare_invoke(handle.mid, now_ms + delay_ms)
                    .invoke_async(&mut self.connection_manager)
                    .await;

                if let Err(err) = r {
                    tracing::error!(
                        "error when scheduling retry: {} - {}, {:?}",
                        &self.queue.queue_name,
                        handle.mid,
                        err
                    );
                }
            }
            FailureDisposition::Terminal => {
                tracing::error!(
                    "notification mid {} failed terminally on attempt {}: {err:?}",
                    handle.mid,
                    handle.attempt
                );

                let reason = match err {
                    AdmqError::Deliver(deliver_error) => deliver_error.reason,
                    other => other.to_string(),
                };

                // Removes the job from the live hashes and records it in
                // the error hashes in one atomic step.
                let r: RedisResult<i64> = self
                    .fail_action
                    .prepare_invoke(handle.mid, &handle.payload, &reason)
                    .invoke_async(&mut self.connection_manager)
                    .await;

                if let Err(err) = r {
                    tracing::error!(
                        "error when recording terminal failure: {} - {}, {:?}",
                        &self.queue.queue_name,
                        handle.mid,
                        err
                    );
                }
            }
        }
    }
}

enum FailureDisposition {
    Retry { delay_ms: i64 },
    Terminal,
}

// A payload that cannot be decoded will never deliver; retrying it only
// burns the backoff schedule for nothing.
fn disposition(err: &AdmqError, attempt: i64) -> FailureDisposition {
    if matches!(err, AdmqError::InvalidJobData(_)) {
        return FailureDisposition::Terminal;
    }

    if attempt < Notification::MAX_ATTEMPTS {
        FailureDisposition::Retry {
            delay_ms: backoff_ms(Notification::BACKOFF_MS, attempt),
        }
    } else {
        FailureDisposition::Terminal
    }
}

fn decode_notification(payload: &str) -> AdmqResult<Notification> {
    let (job_type, job_json) = decode_job(payload)?;
    if Notification::JOB_TYPE != job_type {
        return Err(AdmqError::InvalidJobData(payload.into()));
    }
    serde_json::from_str(job_json)
        .map_err(|err| AdmqError::InvalidJobData(format!("{err}: {payload}")))
}

fn backoff_ms(base: i64, attempt: i64) -> i64 {
    let shift = (attempt - 1).clamp(0, MAX_BACKOFF_SHIFT);
    base.saturating_mul(1i64 << shift)
}
