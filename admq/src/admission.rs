use crate::error::AdmqResult;
use crate::serial::{SerialTaskQueue, Submitted};
use std::future::Future;
use std::time::Duration;

const DEFAULT_SETTLE_MS: u64 = 100;

/// The identifier namespace a registration belongs to. Each kind gets its
/// own admission queue, so the two streams never head-of-line-block each
/// other.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum RegistrationKind {
    Individual,
    Team,
}

impl RegistrationKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            RegistrationKind::Individual => "individual",
            RegistrationKind::Team => "team",
        }
    }
}

#[derive(Clone, Copy, Debug)]
pub struct AdmissionConfig {
    /// Pause between tasks on each queue, letting the store settle before
    /// the next read-modify-write.
    pub settle_delay: Duration,
}

impl Default for AdmissionConfig {
    fn default() -> Self {
        Self {
            settle_delay: Duration::from_millis(DEFAULT_SETTLE_MS),
        }
    }
}

impl AdmissionConfig {
    pub fn with_settle_delay(settle_delay: Duration) -> Self {
        Self { settle_delay }
    }
}

/// Admission points for registration tasks, one serial queue per
/// identifier namespace.
pub struct RegistrationAdmission {
    individual: SerialTaskQueue,
    team: SerialTaskQueue,
}

impl RegistrationAdmission {
    pub fn new(config: AdmissionConfig) -> Self {
        Self {
            individual: SerialTaskQueue::new(config.settle_delay),
            team: SerialTaskQueue::new(config.settle_delay),
        }
    }

    pub fn admit_individual<F, T>(&self, task: F) -> Submitted<T>
    where
        F: Future<Output = AdmqResult<T>> + Send + 'static,
        T: Send + 'static,
    {
        self.individual.enqueue(task)
    }

    pub fn admit_team<F, T>(&self, task: F) -> Submitted<T>
    where
        F: Future<Output = AdmqResult<T>> + Send + 'static,
        T: Send + 'static,
    {
        self.team.enqueue(task)
    }

    pub fn admit<F, T>(&self, kind: RegistrationKind, task: F) -> Submitted<T>
    where
        F: Future<Output = AdmqResult<T>> + Send + 'static,
        T: Send + 'static,
    {
        match kind {
            RegistrationKind::Individual => self.admit_individual(task),
            RegistrationKind::Team => self.admit_team(task),
        }
    }
}

impl Default for RegistrationAdmission {
    fn default() -> Self {
        Self::new(AdmissionConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    #[tokio::test]
    async fn team_queue_is_not_delayed_by_individual_backlog() {
        let admission = RegistrationAdmission::new(AdmissionConfig::with_settle_delay(
            Duration::ZERO,
        ));
        let individual_done = Arc::new(AtomicUsize::new(0));

        let flood: Vec<_> = (0..200)
            .map(|_| {
                let done = individual_done.clone();
                admission.admit_individual(async move {
                    tokio::time::sleep(Duration::from_millis(2)).await;
                    done.fetch_add(1, Ordering::SeqCst);
                    Ok(())
                })
            })
            .collect();

        let team = admission.admit_team(async { Ok("TEAM-1") });
        assert_eq!(team.outcome().await.unwrap(), "TEAM-1");

        // The team task resolved while the individual flood was still
        // draining.
        assert!(individual_done.load(Ordering::SeqCst) < 200);

        for handle in flood {
            handle.outcome().await.unwrap();
        }
        assert_eq!(individual_done.load(Ordering::SeqCst), 200);
    }

    #[tokio::test]
    async fn admit_routes_by_kind() {
        let admission =
            RegistrationAdmission::new(AdmissionConfig::with_settle_delay(Duration::ZERO));

        let a = admission.admit(RegistrationKind::Individual, async { Ok(1u32) });
        let b = admission.admit(RegistrationKind::Team, async { Ok(2u32) });

        assert_eq!(a.outcome().await.unwrap(), 1);
        assert_eq!(b.outcome().await.unwrap(), 2);
    }
}
