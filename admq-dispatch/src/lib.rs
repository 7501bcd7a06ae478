use admq::{
    AdmqError, AdmqResult, BrokerConfig, GateQueue, NotifyQueue, PromoteAction, PromoteStatus,
    RegistrationKind,
};
use admq_gate::GateWorker;
use admq_notify::{NotifySender, NotifyWorker};
use redis::aio::ConnectionManager;
use redis::{Client, RedisResult};

/// The broker-side process: both gate grantors, the retry promotion
/// loop, and the notification delivery worker. Run exactly one of these
/// against the shared broker.
pub struct Dispatcher<S> {
    redis_url: String,
    sender: S,
}

impl<S> Dispatcher<S>
where
    S: NotifySender + Clone,
{
    pub fn new(config: BrokerConfig, sender: S) -> Self {
        Self {
            redis_url: config.url,
            sender,
        }
    }

    pub async fn run(self) -> AdmqResult<()> {
        // One connection manager for the whole process; each worker
        // clones its own handle.
        let client = Client::open(self.redis_url.as_str()).map_err(AdmqError::CreateRedisClient)?;
        let connection_manager = client
            .get_tokio_connection_manager()
            .await
            .map_err(AdmqError::GetRedisConn)?;

        let notify_queue = NotifyQueue::default();

        let notify_worker = NotifyWorker::with_connection(
            connection_manager.clone(),
            notify_queue.clone(),
            self.sender.clone(),
        );
        let promote_loop = PromoteLoop::with_connection(connection_manager.clone(), notify_queue);
        let individual_gate = GateWorker::with_connection(
            connection_manager.clone(),
            GateQueue::for_kind(RegistrationKind::Individual.as_str()),
        );
        let team_gate = GateWorker::with_connection(
            connection_manager,
            GateQueue::for_kind(RegistrationKind::Team.as_str()),
        );

        tokio::select! {
            r = notify_worker.run() => r,
            r = promote_loop.run() => r,
            r = individual_gate.run() => r,
            r = team_gate.run() => r,
        }
    }
}

/// Moves due retries from the schedule set back to the ready list.
pub struct PromoteLoop {
    connection_manager: ConnectionManager,
    promote_action: PromoteAction,
}

impl PromoteLoop {
    pub async fn new(redis_url: &str, queue: NotifyQueue) -> AdmqResult<Self> {
        let client = Client::open(redis_url).map_err(AdmqError::CreateRedisClient)?;
        let connection_manager = client
            .get_tokio_connection_manager()
            .await
            .map_err(AdmqError::GetRedisConn)?;

        Ok(Self::with_connection(connection_manager, queue))
    }

    pub fn with_connection(connection_manager: ConnectionManager, queue: NotifyQueue) -> Self {
        Self {
            connection_manager,
            promote_action: PromoteAction::new(queue),
        }
    }

    pub async fn run(mut self) -> AdmqResult<()> {
        loop {
            let now = time::OffsetDateTime::now_utc();

            let promote_status: RedisResult<PromoteStatus> = self
                .promote_action
                .prepare_invoke(now.unix_timestamp() * 1000)
                .invoke_async(&mut self.connection_manager)
                .await;

            match promote_status {
                Ok(PromoteStatus::Promoted(count)) => {
                    tracing::trace!("promoted {count} due retries");
                }
                Ok(PromoteStatus::NoJob) => {
                    tracing::trace!("no due retries");
                    tokio::time::sleep(tokio::time::Duration::from_secs(10)).await;
                }
                Ok(PromoteStatus::Unknown(err)) => {
                    tracing::error!("promote ERROR: {err}");
                    tokio::time::sleep(tokio::time::Duration::from_secs(10)).await;
                }
                Err(err) => {
                    tracing::error!("promote ERROR: {err:?}");
                    tokio::time::sleep(tokio::time::Duration::from_secs(60)).await;
                }
            }
        }
    }
}
