use thiserror::Error;

pub type AdmqResult<T> = Result<T, AdmqError>;

const GENERIC_RETRY_MESSAGE: &str = "Registration could not be completed, please try again.";

#[derive(Error, Debug)]
pub enum AdmqError {
    /// The task's own precondition failed; safe to show the end user.
    #[error("{0}")]
    Validation(String),
    /// The read-modify-write sequence failed against the store.
    #[error("persistence failure: {0}")]
    Persistence(String),
    /// The task was dropped before it produced an outcome.
    #[error("task abandoned before completion")]
    TaskLost,
    /// Producer-side bounded wait expired; the task still runs internally.
    #[error("timed out waiting for task outcome")]
    WaitTimeout,
    #[error("CreateRedisClient")]
    CreateRedisClient(redis::RedisError),
    #[error("GetRedisConn")]
    GetRedisConn(redis::RedisError),
    #[error("SubmitNotify")]
    SubmitNotify(redis::RedisError),
    #[error("DequeueNotify")]
    DequeueNotify(redis::RedisError),
    #[error("FinishNotify")]
    FinishNotify(redis::RedisError),
    #[error("RetryNotify")]
    RetryNotify(redis::RedisError),
    #[error("PromoteNotify")]
    PromoteNotify(redis::RedisError),
    #[error("GateSubmit")]
    GateSubmit(redis::RedisError),
    #[error("GateWait")]
    GateWait(redis::RedisError),
    #[error("GateGrant")]
    GateGrant(redis::RedisError),
    #[error("SerializeJob")]
    SerializeJob(serde_json::Error),
    #[error("InvalidJobData")]
    InvalidJobData(String),
    #[error("DeliverFailed")]
    Deliver(DeliverError),
}

impl AdmqError {
    /// Message safe to return to the registrant.
    ///
    /// Validation failures are the caller's fault and surface verbatim;
    /// everything else collapses to a generic retry message so internal
    /// detail never leaks.
    pub fn user_message(&self) -> &str {
        match self {
            AdmqError::Validation(msg) => msg,
            _ => GENERIC_RETRY_MESSAGE,
        }
    }

    /// True when the caller may simply retry the same submission.
    pub fn is_transient(&self) -> bool {
        !matches!(self, AdmqError::Validation(_))
    }
}

#[derive(Debug)]
pub struct DeliverError {
    pub payload: String,
    pub reason: String,
}

impl DeliverError {
    pub fn new(payload: String, reason: String) -> Self {
        Self { payload, reason }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validation_message_is_verbatim() {
        let err = AdmqError::Validation("Email already registered".into());
        assert_eq!(err.user_message(), "Email already registered");
        assert!(!err.is_transient());
    }

    #[test]
    fn persistence_message_is_generic() {
        let err = AdmqError::Persistence("mongo write conflict".into());
        assert_eq!(err.user_message(), GENERIC_RETRY_MESSAGE);
        assert!(err.is_transient());
    }
}
