use admq::{AdmqError, AdmqResult, GateQueue};
use redis::aio::ConnectionManager;
use redis::AsyncCommands;

const POP_WAIT_SECS: usize = 5;
const GRANT_TTL_SECS: usize = 60;
const ERROR_SLEEP_SECS: u64 = 5;

/// Broker-side grantor for one registration kind.
///
/// Pops markers strictly in queue order and grants each one. Running
/// exactly one grantor per kind against the shared broker is what makes
/// the gate a cross-process serialization point.
pub struct GateWorker {
    connection_manager: ConnectionManager,
    queue: GateQueue,
}

impl GateWorker {
    pub async fn new(redis_url: &str, queue: GateQueue) -> AdmqResult<Self> {
        let client = redis::Client::open(redis_url).map_err(AdmqError::CreateRedisClient)?;
        let connection_manager = client
            .get_tokio_connection_manager()
            .await
            .map_err(AdmqError::GetRedisConn)?;

        Ok(Self::with_connection(connection_manager, queue))
    }

    pub fn with_connection(connection_manager: ConnectionManager, queue: GateQueue) -> Self {
        Self {
            connection_manager,
            queue,
        }
    }

    pub async fn run(mut self) -> AdmqResult<()> {
        loop {
            if let Err(err) = self.grant_next().await {
                tracing::error!("gate worker ERROR: {err:?}");
                tokio::time::sleep(std::time::Duration::from_secs(ERROR_SLEEP_SECS)).await;
            }
        }
    }

    async fn grant_next(&mut self) -> AdmqResult<()> {
        let popped: Option<(String, String)> = self
            .connection_manager
            .brpop(self.queue.ready_key.as_str(), POP_WAIT_SECS as f64)
            .await
            .map_err(AdmqError::GateGrant)?;

        let (_, mid) = match popped {
            Some(popped) => popped,
            None => return Ok(()),
        };
        let mid: i64 = mid.parse().map_err(|_| AdmqError::InvalidJobData(mid))?;

        // The TTL reclaims grants whose submitter stopped waiting.
        let grant_key = self.queue.grant_key(mid);
        let _: () = redis::pipe()
            .lpush(&grant_key, 1)
            .ignore()
            .expire(&grant_key, GRANT_TTL_SECS)
            .ignore()
            .query_async(&mut self.connection_manager)
            .await
            .map_err(AdmqError::GateGrant)?;

        tracing::trace!("granted {} marker {mid}", self.queue.kind_name);

        Ok(())
    }
}
