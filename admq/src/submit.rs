use crate::helper::{encode_job, value_as_int, value_as_str};
use crate::{AdmqResult, Job, NotifyQueue};
use redis::{FromRedisValue, RedisResult, Script, ScriptInvocation};

#[derive(Clone)]
pub struct SubmitAction {
    script: Script,
    queue: NotifyQueue,
}

impl SubmitAction {
    pub fn new(queue: NotifyQueue) -> Self {
        Self {
            script: Script::new(crate::lua::SUBMIT),
            queue,
        }
    }

    pub fn prepare_invoke<J: Job>(&self, job: &J) -> AdmqResult<ScriptInvocation> {
        let mut invoke = self.script.prepare_invoke();
        invoke
            .key(self.queue.seq_key.as_str())
            .key(self.queue.jobs_key.as_str())
            .key(self.queue.attempts_key.as_str())
            .key(self.queue.ready_key.as_str());

        let payload = encode_job(job)?;
        invoke.arg(&payload);

        Ok(invoke)
    }
}

#[derive(Debug)]
pub enum SubmitStatus {
    Added(i64),
    Unknown(String),
}

impl TryFrom<&[redis::Value]> for SubmitStatus {
    type Error = redis::RedisError;

    fn try_from(values: &[redis::Value]) -> Result<Self, Self::Error> {
        let mut iter = values.iter();
        let action = value_as_str(iter.next(), "invalid submit status - invalid action")?;

        let status = match action.as_ref() {
            "added" => {
                let mid = value_as_int(iter.next(), "invalid submit status - invalid mid")?;
                SubmitStatus::Added(mid)
            }
            _ => SubmitStatus::Unknown(format!("{values:?}")),
        };

        Ok(status)
    }
}

impl FromRedisValue for SubmitStatus {
    fn from_redis_value(v: &redis::Value) -> RedisResult<Self> {
        match v {
            redis::Value::Bulk(bulk) => SubmitStatus::try_from(bulk.as_slice()),
            _ => Err(redis::RedisError::from((
                redis::ErrorKind::ResponseError,
                "invalid submit status - invalid value type",
                format!("{v:?}"),
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_added_status() {
        let raw = redis::Value::Bulk(vec![
            redis::Value::Data(b"added".to_vec()),
            redis::Value::Int(7),
        ]);
        let status = SubmitStatus::from_redis_value(&raw).unwrap();
        assert!(matches!(status, SubmitStatus::Added(7)));
    }

    #[test]
    fn unexpected_action_maps_to_unknown() {
        let raw = redis::Value::Bulk(vec![redis::Value::Data(b"wat".to_vec())]);
        let status = SubmitStatus::from_redis_value(&raw).unwrap();
        assert!(matches!(status, SubmitStatus::Unknown(_)));
    }
}
