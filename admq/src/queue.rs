use crate::{redis_keys, ArcString};
use std::sync::Arc;

const DEFAULT_PREFIX: &str = "admq";
const DEFAULT_QUEUE: &str = "notify";

/// Key set for one named notification queue.
#[derive(Clone)]
pub struct NotifyQueue {
    pub queue_name: ArcString,
    pub(crate) seq_key: ArcString,
    pub(crate) jobs_key: ArcString,
    pub(crate) attempts_key: ArcString,
    pub(crate) ready_key: ArcString,
    pub(crate) schedule_key: ArcString,
    pub(crate) done_key: ArcString,
    pub err_jobs_key: ArcString,
    pub err_key: ArcString,
}

impl Default for NotifyQueue {
    fn default() -> Self {
        NotifyQueue::new(
            Arc::new(DEFAULT_PREFIX.into()),
            Arc::new(DEFAULT_QUEUE.into()),
        )
    }
}

impl NotifyQueue {
    pub fn new(prefix: ArcString, queue_name: ArcString) -> Self {
        let seq_key = redis_keys::seq_key(&prefix, &queue_name);
        let jobs_key = redis_keys::jobs_key(&prefix, &queue_name);
        let attempts_key = redis_keys::attempts_key(&prefix, &queue_name);
        let ready_key = redis_keys::ready_key(&prefix, &queue_name);
        let schedule_key = redis_keys::schedule_key(&prefix, &queue_name);
        let done_key = redis_keys::done_key(&prefix, &queue_name);
        let err_jobs_key = redis_keys::err_jobs_key(&prefix, &queue_name);
        let err_key = redis_keys::err_key(&prefix, &queue_name);

        Self {
            queue_name,
            seq_key,
            jobs_key,
            attempts_key,
            ready_key,
            schedule_key,
            done_key,
            err_jobs_key,
            err_key,
        }
    }
}

/// Key set for one registration kind's distributed id gate.
#[derive(Clone)]
pub struct GateQueue {
    pub kind_name: ArcString,
    pub(crate) seq_key: ArcString,
    pub ready_key: ArcString,
    grant_prefix: ArcString,
}

impl GateQueue {
    pub fn for_kind(kind: &str) -> Self {
        GateQueue::new(DEFAULT_PREFIX, kind)
    }

    pub fn new(prefix: &str, kind: &str) -> Self {
        Self {
            kind_name: Arc::new(kind.to_string()),
            seq_key: redis_keys::gate_seq_key(prefix, kind),
            ready_key: redis_keys::gate_ready_key(prefix, kind),
            grant_prefix: redis_keys::gate_grant_prefix(prefix, kind),
        }
    }

    pub fn grant_key(&self, mid: i64) -> String {
        format!("{}{mid}", self.grant_prefix)
    }
}
