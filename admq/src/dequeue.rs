use crate::helper::{value_as_int, value_as_str};
use crate::NotifyQueue;
use redis::{FromRedisValue, RedisResult, Script, ScriptInvocation};

#[derive(Clone)]
pub struct DequeueAction {
    script: Script,
    queue: NotifyQueue,
}

impl DequeueAction {
    pub fn new(queue: NotifyQueue) -> Self {
        Self {
            script: Script::new(crate::lua::DEQUEUE),
            queue,
        }
    }

    pub fn prepare_invoke(&self) -> ScriptInvocation {
        let mut invoke = self.script.prepare_invoke();
        invoke
            .key(self.queue.ready_key.as_str())
            .key(self.queue.jobs_key.as_str())
            .key(self.queue.attempts_key.as_str());

        invoke
    }
}

#[derive(Clone)]
pub struct FinishAction {
    script: Script,
    queue: NotifyQueue,
}

impl FinishAction {
    pub fn new(queue: NotifyQueue) -> Self {
        Self {
            script: Script::new(crate::lua::FINISH),
            queue,
        }
    }

    pub fn prepare_invoke(&self, mid: i64) -> ScriptInvocation {
        let mut invoke = self.script.prepare_invoke();
        invoke
            .key(self.queue.jobs_key.as_str())
            .key(self.queue.attempts_key.as_str())
            .key(self.queue.done_key.as_str());

        invoke.arg(mid);

        invoke
    }
}

/// Terminal counterpart of [`FinishAction`]: records the payload and
/// failure reason in the error hashes and removes the job from the live
/// hashes, in one atomic step.
#[derive(Clone)]
pub struct FailAction {
    script: Script,
    queue: NotifyQueue,
}

impl FailAction {
    pub fn new(queue: NotifyQueue) -> Self {
        Self {
            script: Script::new(crate::lua::FAIL),
            queue,
        }
    }

    pub fn prepare_invoke(&self, mid: i64, payload: &str, reason: &str) -> ScriptInvocation {
        let mut invoke = self.script.prepare_invoke();
        invoke
            .key(self.queue.jobs_key.as_str())
            .key(self.queue.attempts_key.as_str())
            .key(self.queue.err_jobs_key.as_str())
            .key(self.queue.err_key.as_str());

        invoke.arg(mid).arg(payload).arg(reason);

        invoke
    }
}

#[derive(Debug)]
pub enum DequeueStatus {
    /// Nothing ready; the worker should sleep before polling again.
    Empty,
    Handle(DequeueHandle),
    /// The mid was in the ready list but its payload is gone; skip it.
    Skip(i64),
    Unknown(String),
}

#[derive(Debug)]
pub struct DequeueHandle {
    pub mid: i64,
    pub payload: String,
    /// 1-based attempt number, after this dequeue's increment.
    pub attempt: i64,
}

impl DequeueHandle {
    fn try_new<'a>(mut iter: impl Iterator<Item = &'a redis::Value>) -> RedisResult<Self> {
        let mid = value_as_str(iter.next(), "invalid dequeue status - handle - invalid mid")?;
        let mid = mid.parse::<i64>().map_err(|err| {
            redis::RedisError::from((
                redis::ErrorKind::ResponseError,
                "invalid dequeue status - handle - invalid mid",
                err.to_string(),
            ))
        })?;
        let payload = value_as_str(
            iter.next(),
            "invalid dequeue status - handle - invalid payload",
        )?;
        let attempt = value_as_int(
            iter.next(),
            "invalid dequeue status - handle - invalid attempt",
        )?;

        Ok(DequeueHandle {
            mid,
            payload: payload.into_owned(),
            attempt,
        })
    }
}

impl TryFrom<&[redis::Value]> for DequeueStatus {
    type Error = redis::RedisError;

    fn try_from(values: &[redis::Value]) -> Result<Self, Self::Error> {
        let mut iter = values.iter();
        let action = value_as_str(iter.next(), "invalid dequeue status - invalid action")?;

        let status = match action.as_ref() {
            "empty" => DequeueStatus::Empty,
            "handle" => DequeueStatus::Handle(DequeueHandle::try_new(iter)?),
            "skip" => {
                let mid = value_as_str(iter.next(), "invalid dequeue status - skip - invalid mid")?;
                let mid = mid.parse::<i64>().map_err(|err| {
                    redis::RedisError::from((
                        redis::ErrorKind::ResponseError,
                        "invalid dequeue status - skip - invalid mid",
                        err.to_string(),
                    ))
                })?;
                DequeueStatus::Skip(mid)
            }
            _ => DequeueStatus::Unknown(format!("{values:?}")),
        };

        Ok(status)
    }
}

impl FromRedisValue for DequeueStatus {
    fn from_redis_value(v: &redis::Value) -> RedisResult<Self> {
        match v {
            redis::Value::Bulk(bulk) => DequeueStatus::try_from(bulk.as_slice()),
            _ => Err(redis::RedisError::from((
                redis::ErrorKind::ResponseError,
                "invalid dequeue status - invalid value type",
                format!("{v:?}"),
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_handle_status() {
        let raw = redis::Value::Bulk(vec![
            redis::Value::Data(b"handle".to_vec()),
            redis::Value::Data(b"12".to_vec()),
            redis::Value::Data(b"17:send-notification{}".to_vec()),
            redis::Value::Int(2),
        ]);

        match DequeueStatus::from_redis_value(&raw).unwrap() {
            DequeueStatus::Handle(handle) => {
                assert_eq!(handle.mid, 12);
                assert_eq!(handle.payload, "17:send-notification{}");
                assert_eq!(handle.attempt, 2);
            }
            other => panic!("unexpected status: {other:?}"),
        }
    }

    #[test]
    fn parses_empty_status() {
        let raw = redis::Value::Bulk(vec![redis::Value::Data(b"empty".to_vec())]);
        assert!(matches!(
            DequeueStatus::from_redis_value(&raw).unwrap(),
            DequeueStatus::Empty
        ));
    }
}
