use crate::helper::{value_as_int, value_as_str};
use crate::GateQueue;
use redis::{FromRedisValue, RedisResult, Script, ScriptInvocation};

/// Submits a marker job to a registration kind's gate queue. The marker
/// carries no payload; its position in the queue is the whole point.
#[derive(Clone)]
pub struct MarkerAction {
    script: Script,
    queue: GateQueue,
}

impl MarkerAction {
    pub fn new(queue: GateQueue) -> Self {
        Self {
            script: Script::new(crate::lua::MARKER),
            queue,
        }
    }

    pub fn prepare_invoke(&self) -> ScriptInvocation {
        let mut invoke = self.script.prepare_invoke();
        invoke
            .key(self.queue.seq_key.as_str())
            .key(self.queue.ready_key.as_str());

        invoke
    }
}

#[derive(Debug)]
pub enum MarkerStatus {
    Added(i64),
    Unknown(String),
}

impl TryFrom<&[redis::Value]> for MarkerStatus {
    type Error = redis::RedisError;

    fn try_from(values: &[redis::Value]) -> Result<Self, Self::Error> {
        let mut iter = values.iter();
        let action = value_as_str(iter.next(), "invalid marker status - invalid action")?;

        let status = match action.as_ref() {
            "added" => {
                let mid = value_as_int(iter.next(), "invalid marker status - invalid mid")?;
                MarkerStatus::Added(mid)
            }
            _ => MarkerStatus::Unknown(format!("{values:?}")),
        };

        Ok(status)
    }
}

impl FromRedisValue for MarkerStatus {
    fn from_redis_value(v: &redis::Value) -> RedisResult<Self> {
        match v {
            redis::Value::Bulk(bulk) => MarkerStatus::try_from(bulk.as_slice()),
            _ => Err(redis::RedisError::from((
                redis::ErrorKind::ResponseError,
                "invalid marker status - invalid value type",
                format!("{v:?}"),
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_added_marker() {
        let raw = redis::Value::Bulk(vec![
            redis::Value::Data(b"added".to_vec()),
            redis::Value::Int(41),
        ]);
        assert!(matches!(
            MarkerStatus::from_redis_value(&raw).unwrap(),
            MarkerStatus::Added(41)
        ));
    }
}
