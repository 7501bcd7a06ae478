use admq::{AdmqError, AdmqResult, Job, NotifyQueue, SubmitAction, SubmitStatus};
use redis::aio::ConnectionManager;

/// Producer half of the notification queue. Fire-and-forget relative to
/// the registration path: it holds its own connection and the caller
/// never awaits delivery, only the submit.
pub struct NotifyClient {
    connection_manager: ConnectionManager,
    submit_action: SubmitAction,
}

impl NotifyClient {
    pub async fn new(redis_url: &str, queue: NotifyQueue) -> AdmqResult<NotifyClient> {
        let client = redis::Client::open(redis_url).map_err(AdmqError::CreateRedisClient)?;
        let connection_manager = client
            .get_tokio_connection_manager()
            .await
            .map_err(AdmqError::GetRedisConn)?;

        Ok(Self {
            connection_manager,
            submit_action: SubmitAction::new(queue),
        })
    }

    /// Returns the broker-assigned job id.
    pub async fn submit<J: Job>(&mut self, job: &J) -> AdmqResult<i64> {
        let submit_status: SubmitStatus = self
            .submit_action
            .prepare_invoke(job)?
            .invoke_async(&mut self.connection_manager)
            .await
            .map_err(AdmqError::SubmitNotify)?;

        match submit_status {
            SubmitStatus::Added(mid) => Ok(mid),
            SubmitStatus::Unknown(err) => Err(AdmqError::SubmitNotify(redis::RedisError::from((
                redis::ErrorKind::ResponseError,
                "submit error",
                err,
            )))),
        }
    }
}
