use crate::helper::{value_as_int, value_as_str};
use crate::NotifyQueue;
use redis::{FromRedisValue, RedisResult, Script, ScriptInvocation};

/// Parks a failed job in the schedule set until its retry time.
#[derive(Clone)]
pub struct RetryAtAction {
    script: Script,
    queue: NotifyQueue,
}

impl RetryAtAction {
    pub fn new(queue: NotifyQueue) -> Self {
        Self {
            script: Script::new(crate::lua::RETRY_AT),
            queue,
        }
    }

    pub fn prepare_invoke(&self, mid: i64, retry_at_ms: i64) -> ScriptInvocation {
        let mut invoke = self.script.prepare_invoke();
        invoke.key(self.queue.schedule_key.as_str());

        invoke.arg(mid).arg(retry_at_ms);

        invoke
    }
}

/// Moves due scheduled jobs back to the ready list.
#[derive(Clone)]
pub struct PromoteAction {
    script: Script,
    queue: NotifyQueue,
}

impl PromoteAction {
    pub fn new(queue: NotifyQueue) -> Self {
        Self {
            script: Script::new(crate::lua::PROMOTE),
            queue,
        }
    }

    pub fn prepare_invoke(&self, now_ms: i64) -> ScriptInvocation {
        let mut invoke = self.script.prepare_invoke();
        invoke
            .key(self.queue.schedule_key.as_str())
            .key(self.queue.ready_key.as_str());

        invoke.arg(now_ms);

        invoke
    }
}

#[derive(Debug)]
pub enum PromoteStatus {
    Promoted(i64),
    NoJob,
    Unknown(String),
}

impl TryFrom<&[redis::Value]> for PromoteStatus {
    type Error = redis::RedisError;

    fn try_from(values: &[redis::Value]) -> Result<Self, Self::Error> {
        let mut iter = values.iter();
        let action = value_as_str(iter.next(), "invalid promote status - invalid action")?;

        let status = match action.as_ref() {
            "promoted" => {
                let count = value_as_int(iter.next(), "invalid promote status - invalid count")?;
                PromoteStatus::Promoted(count)
            }
            "no-job" => PromoteStatus::NoJob,
            _ => PromoteStatus::Unknown(format!("{values:?}")),
        };

        Ok(status)
    }
}

impl FromRedisValue for PromoteStatus {
    fn from_redis_value(v: &redis::Value) -> RedisResult<Self> {
        match v {
            redis::Value::Bulk(bulk) => PromoteStatus::try_from(bulk.as_slice()),
            _ => Err(redis::RedisError::from((
                redis::ErrorKind::ResponseError,
                "invalid promote status - invalid value type",
                format!("{v:?}"),
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_promoted_count() {
        let raw = redis::Value::Bulk(vec![
            redis::Value::Data(b"promoted".to_vec()),
            redis::Value::Int(3),
        ]);
        assert!(matches!(
            PromoteStatus::from_redis_value(&raw).unwrap(),
            PromoteStatus::Promoted(3)
        ));
    }

    #[test]
    fn parses_no_job() {
        let raw = redis::Value::Bulk(vec![redis::Value::Data(b"no-job".to_vec())]);
        assert!(matches!(
            PromoteStatus::from_redis_value(&raw).unwrap(),
            PromoteStatus::NoJob
        ));
    }
}
