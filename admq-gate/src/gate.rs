use admq::{AdmqError, AdmqResult, GateQueue, MarkerAction, MarkerStatus, RegistrationKind};
use async_trait::async_trait;
use redis::aio::ConnectionManager;
use redis::AsyncCommands;
use std::future::Future;

const GRANT_WAIT_SECS: usize = 5;

/// A submitted marker's identity; redeemed once via
/// [`SerialGate::await_granted`].
#[derive(Debug)]
pub struct MarkerTicket {
    pub mid: i64,
    kind: RegistrationKind,
}

#[async_trait]
pub trait SerialGate: Send + Sync {
    async fn submit(&self, kind: RegistrationKind) -> AdmqResult<MarkerTicket>;

    async fn await_granted(&self, ticket: MarkerTicket) -> AdmqResult<()>;
}

struct GateLane {
    queue: GateQueue,
    marker_action: MarkerAction,
}

impl GateLane {
    fn new(kind: RegistrationKind) -> Self {
        let queue = GateQueue::for_kind(kind.as_str());
        Self {
            marker_action: MarkerAction::new(queue.clone()),
            queue,
        }
    }
}

/// Redis-backed gate, one marker queue per registration kind.
pub struct RedisIdGate {
    connection_manager: ConnectionManager,
    individual: GateLane,
    team: GateLane,
}

impl RedisIdGate {
    pub async fn new(redis_url: &str) -> AdmqResult<Self> {
        let client = redis::Client::open(redis_url).map_err(AdmqError::CreateRedisClient)?;
        let connection_manager = client
            .get_tokio_connection_manager()
            .await
            .map_err(AdmqError::GetRedisConn)?;

        Ok(Self {
            connection_manager,
            individual: GateLane::new(RegistrationKind::Individual),
            team: GateLane::new(RegistrationKind::Team),
        })
    }

    fn lane(&self, kind: RegistrationKind) -> &GateLane {
        match kind {
            RegistrationKind::Individual => &self.individual,
            RegistrationKind::Team => &self.team,
        }
    }
}

#[async_trait]
impl SerialGate for RedisIdGate {
    async fn submit(&self, kind: RegistrationKind) -> AdmqResult<MarkerTicket> {
        let lane = self.lane(kind);
        let mut conn = self.connection_manager.clone();

        let status: MarkerStatus = lane
            .marker_action
            .prepare_invoke()
            .invoke_async(&mut conn)
            .await
            .map_err(AdmqError::GateSubmit)?;

        match status {
            MarkerStatus::Added(mid) => Ok(MarkerTicket { mid, kind }),
            MarkerStatus::Unknown(err) => Err(AdmqError::GateSubmit(redis::RedisError::from((
                redis::ErrorKind::ResponseError,
                "marker submit error",
                err,
            )))),
        }
    }

    async fn await_granted(&self, ticket: MarkerTicket) -> AdmqResult<()> {
        let lane = self.lane(ticket.kind);
        let grant_key = lane.queue.grant_key(ticket.mid);
        let mut conn = self.connection_manager.clone();

        let granted: Option<(String, String)> = conn
            .blpop(grant_key.as_str(), GRANT_WAIT_SECS as f64)
            .await
            .map_err(AdmqError::GateWait)?;

        if granted.is_none() {
            // Best effort only; a missing grantor must not hold
            // registrations hostage.
            tracing::warn!(
                "gate grant wait timed out for {} marker {}",
                ticket.kind.as_str(),
                ticket.mid
            );
        }

        Ok(())
    }
}

/// Run `generate` with its timing gated by the shared serialization point
/// when one is available.
///
/// Gate failures are logged at warn level and never surfaced: a missing
/// or unreachable broker degrades to direct execution, protected by the
/// caller's in-process serial queue alone.
pub async fn generate_id_in_queue<G, F, Fut, T>(
    gate: Option<&G>,
    kind: RegistrationKind,
    generate: F,
) -> AdmqResult<T>
where
    G: SerialGate,
    F: FnOnce() -> Fut,
    Fut: Future<Output = AdmqResult<T>>,
{
    let ticket = match gate {
        Some(gate) => match gate.submit(kind).await {
            Ok(ticket) => Some(ticket),
            Err(err) => {
                tracing::warn!(
                    "id gate unreachable, running {} generator directly: {err:?}",
                    kind.as_str()
                );
                None
            }
        },
        None => None,
    };

    let value = generate().await?;

    if let (Some(gate), Some(ticket)) = (gate, ticket) {
        if let Err(err) = gate.await_granted(ticket).await {
            tracing::warn!("id gate grant wait failed: {err:?}");
        }
    }

    Ok(value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    #[derive(Default)]
    struct RecordingGate {
        submitted: AtomicUsize,
        granted: AtomicUsize,
        order: Mutex<Vec<&'static str>>,
    }

    #[async_trait]
    impl SerialGate for RecordingGate {
        async fn submit(&self, kind: RegistrationKind) -> AdmqResult<MarkerTicket> {
            self.submitted.fetch_add(1, Ordering::SeqCst);
            self.order.lock().unwrap().push("submit");
            Ok(MarkerTicket { mid: 1, kind })
        }

        async fn await_granted(&self, _ticket: MarkerTicket) -> AdmqResult<()> {
            self.granted.fetch_add(1, Ordering::SeqCst);
            self.order.lock().unwrap().push("grant");
            Ok(())
        }
    }

    struct UnreachableGate;

    #[async_trait]
    impl SerialGate for UnreachableGate {
        async fn submit(&self, _kind: RegistrationKind) -> AdmqResult<MarkerTicket> {
            Err(AdmqError::GateSubmit(redis::RedisError::from((
                redis::ErrorKind::IoError,
                "connection refused",
            ))))
        }

        async fn await_granted(&self, _ticket: MarkerTicket) -> AdmqResult<()> {
            unreachable!("no ticket is ever issued")
        }
    }

    #[tokio::test]
    async fn gated_generation_submits_then_waits_for_the_grant() {
        let gate = RecordingGate::default();

        let id = generate_id_in_queue(Some(&gate), RegistrationKind::Individual, || async {
            gate.order.lock().unwrap().push("generate");
            Ok("MH26000001".to_string())
        })
        .await
        .unwrap();

        assert_eq!(id, "MH26000001");
        assert_eq!(gate.submitted.load(Ordering::SeqCst), 1);
        assert_eq!(gate.granted.load(Ordering::SeqCst), 1);
        assert_eq!(
            *gate.order.lock().unwrap(),
            vec!["submit", "generate", "grant"]
        );
    }

    #[tokio::test]
    async fn unreachable_gate_falls_back_to_direct_execution() {
        let gate = UnreachableGate;

        let id = generate_id_in_queue(Some(&gate), RegistrationKind::Team, || async {
            Ok("MH26000002".to_string())
        })
        .await
        .unwrap();

        assert_eq!(id, "MH26000002");
    }

    #[tokio::test]
    async fn missing_gate_runs_directly() {
        let id = generate_id_in_queue(
            None::<&RedisIdGate>,
            RegistrationKind::Individual,
            || async { Ok(42u64) },
        )
        .await
        .unwrap();

        assert_eq!(id, 42);
    }

    #[tokio::test]
    async fn generator_failure_propagates_unchanged() {
        let gate = RecordingGate::default();

        let outcome = generate_id_in_queue(Some(&gate), RegistrationKind::Individual, || async {
            Err::<u64, _>(AdmqError::Validation("Email already registered".into()))
        })
        .await;

        assert!(matches!(outcome, Err(AdmqError::Validation(_))));
        // No grant wait happens for a failed generation.
        assert_eq!(gate.granted.load(Ordering::SeqCst), 0);
    }
}
