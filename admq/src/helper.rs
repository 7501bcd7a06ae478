use crate::error::{AdmqError, AdmqResult};
use crate::Job;
use redis::RedisResult;
use std::borrow::Cow;

/// Split an encoded payload back into `(job_type, job_json)`.
pub fn decode_job(payload: &str) -> AdmqResult<(&str, &str)> {
    let (type_len, rest) = payload
        .split_once(':')
        .ok_or_else(|| AdmqError::InvalidJobData(payload.into()))?;

    let type_len: usize = type_len
        .parse()
        .map_err(|_| AdmqError::InvalidJobData(payload.into()))?;

    if rest.len() < type_len || !rest.is_char_boundary(type_len) {
        return Err(AdmqError::InvalidJobData(payload.into()));
    }

    Ok(rest.split_at(type_len))
}

// Payload layout: "{type_len}:{type}{json}".
pub(crate) fn encode_job<J: Job>(job: &J) -> AdmqResult<String> {
    let job_json = serde_json::to_string(job).map_err(AdmqError::SerializeJob)?;
    Ok(format!("{}:{}{}", J::JOB_TYPE.len(), J::JOB_TYPE, job_json))
}

pub(crate) fn value_as_str<'a>(
    v: Option<&'a redis::Value>,
    ctx: &'static str,
) -> RedisResult<Cow<'a, str>> {
    match v {
        Some(redis::Value::Data(bytes)) => Ok(String::from_utf8_lossy(bytes)),
        Some(redis::Value::Status(s)) => Ok(Cow::Borrowed(s.as_str())),
        Some(other) => Err(redis::RedisError::from((
            redis::ErrorKind::ResponseError,
            ctx,
            format!("{other:?}"),
        ))),
        None => Err(redis::RedisError::from((
            redis::ErrorKind::ResponseError,
            ctx,
        ))),
    }
}

pub(crate) fn value_as_int(v: Option<&redis::Value>, ctx: &'static str) -> RedisResult<i64> {
    match v {
        Some(redis::Value::Int(i)) => Ok(*i),
        Some(other) => Err(redis::RedisError::from((
            redis::ErrorKind::ResponseError,
            ctx,
            format!("{other:?}"),
        ))),
        None => Err(redis::RedisError::from((
            redis::ErrorKind::ResponseError,
            ctx,
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::JobType;
    use serde::{Deserialize, Serialize};

    #[derive(Serialize, Deserialize)]
    struct PingJob {
        target: String,
    }

    impl Job for PingJob {
        const JOB_TYPE: JobType = Cow::Borrowed("ping");
    }

    #[test]
    fn decode_is_the_inverse_of_encode() {
        let encoded = encode_job(&PingJob {
            target: "a@b.c".into(),
        })
        .unwrap();

        let (job_type, job_json) = decode_job(&encoded).unwrap();
        assert_eq!(job_type, "ping");

        let decoded: PingJob = serde_json::from_str(job_json).unwrap();
        assert_eq!(decoded.target, "a@b.c");
    }

    #[test]
    fn decode_rejects_malformed_payloads() {
        for payload in ["", "ping", "x:ping{}", "999:ping{}"] {
            assert!(matches!(
                decode_job(payload),
                Err(AdmqError::InvalidJobData(_))
            ));
        }
    }
}
