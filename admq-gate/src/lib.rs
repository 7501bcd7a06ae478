//! Cross-process serialization gate for identifier generation.
//!
//! A single `SerialTaskQueue` already serializes issuance within one
//! process. When several server processes share one store, the gate makes
//! a shared Redis instance the serialization point: each generation
//! submits a marker job, runs locally, and resolves only after the
//! broker-side grantor has reached its marker. Exactly one
//! [`GateWorker`] per registration kind must run against the shared
//! broker for this to hold. Without a configured broker the gate is
//! skipped entirely and in-process serialization stands alone.

mod gate;
mod worker;

pub use gate::{generate_id_in_queue, MarkerTicket, RedisIdGate, SerialGate};
pub use worker::GateWorker;
