use serde::de::DeserializeOwned;
use serde::Serialize;

mod admission;
pub(crate) mod config;
mod dequeue;
pub(crate) mod error;
mod helper;
pub(crate) mod lua;
mod marker;
pub(crate) mod queue;
mod redis_keys;
mod register_id;
mod retry;
mod serial;
mod submit;

pub use {
    admission::{AdmissionConfig, RegistrationAdmission, RegistrationKind},
    config::BrokerConfig,
    dequeue::{DequeueAction, DequeueHandle, DequeueStatus, FailAction, FinishAction},
    error::{AdmqError, AdmqResult, DeliverError},
    helper::decode_job,
    marker::{MarkerAction, MarkerStatus},
    queue::{GateQueue, NotifyQueue},
    register_id::IdFormat,
    retry::{PromoteAction, PromoteStatus, RetryAtAction},
    serial::{SerialTaskQueue, Submitted},
    submit::{SubmitAction, SubmitStatus},
};

pub type JobType = std::borrow::Cow<'static, str>;

/// A payload accepted by the notification dispatch queue.
///
/// `MAX_ATTEMPTS` and `BACKOFF_MS` drive the worker's retry schedule:
/// a failed delivery is re-scheduled after `BACKOFF_MS * 2^(attempt - 1)`
/// until the attempt budget is exhausted.
pub trait Job: Serialize + DeserializeOwned {
    const JOB_TYPE: JobType;

    const MAX_ATTEMPTS: i64 = 3;

    const BACKOFF_MS: i64 = 2000;
}

pub(crate) type ArcString = std::sync::Arc<String>;
