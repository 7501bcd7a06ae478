use crate::ArcString;

// seq       - int: job id sequence
#[inline]
pub(crate) fn seq_key(prefix: &str, queue_name: &str) -> ArcString {
    format!("{prefix}:{queue_name}:seq").into()
}

// jobs      - hash: {mid payload} ; Encoded job payloads
#[inline]
pub(crate) fn jobs_key(prefix: &str, queue_name: &str) -> ArcString {
    format!("{prefix}:{queue_name}:jobs").into()
}

// attempts  - hash: {mid count} ; Delivery attempts made so far
#[inline]
pub(crate) fn attempts_key(prefix: &str, queue_name: &str) -> ArcString {
    format!("{prefix}:{queue_name}:attempts").into()
}

// ready     - list: mids ready for delivery (push left, pop right)
#[inline]
pub(crate) fn ready_key(prefix: &str, queue_name: &str) -> ArcString {
    format!("{prefix}:{queue_name}:ready").into()
}

// schedule  - zset: {mid retry-at-ms} ; Jobs parked for backoff
#[inline]
pub(crate) fn schedule_key(prefix: &str, queue_name: &str) -> ArcString {
    format!("{prefix}:{queue_name}:schedule").into()
}

// done      - mid set: delivered, awaiting gc
#[inline]
pub(crate) fn done_key(prefix: &str, queue_name: &str) -> ArcString {
    format!("{prefix}:{queue_name}:done").into()
}

// err-jobs  - hash: {mid payload} ; Payloads that exhausted their attempts
#[inline]
pub(crate) fn err_jobs_key(prefix: &str, queue_name: &str) -> ArcString {
    format!("{prefix}:{queue_name}:err-jobs").into()
}

// err       - hash: {mid reason} ; Terminal failure reasons
#[inline]
pub(crate) fn err_key(prefix: &str, queue_name: &str) -> ArcString {
    format!("{prefix}:{queue_name}:err").into()
}

// gate seq  - int: marker id sequence, one namespace per registration kind
#[inline]
pub(crate) fn gate_seq_key(prefix: &str, kind: &str) -> ArcString {
    format!("{prefix}:gate:{kind}:seq").into()
}

// gate ready - list: markers awaiting a grant (push left, pop right)
#[inline]
pub(crate) fn gate_ready_key(prefix: &str, kind: &str) -> ArcString {
    format!("{prefix}:gate:{kind}:ready").into()
}

// gate grant - per-mid list: single token pushed when the marker is granted
#[inline]
pub(crate) fn gate_grant_prefix(prefix: &str, kind: &str) -> ArcString {
    format!("{prefix}:gate:{kind}:grant:").into()
}
