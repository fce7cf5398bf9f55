//! Bounded wait for an in-flight login or refresh

use std::time::Duration;

use tokio::sync::watch;

use super::tokens::AuthSnapshot;

/// Default ceiling on how long a request waits for authentication to settle
pub const DEFAULT_CEILING: Duration = Duration::from_secs(10);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GateOutcome {
    /// Authentication was not (or no longer) in flight
    Ready,
    /// Still authenticating at the ceiling; the caller proceeds with whatever token is stored
    TimedOut,
}

/// Holds API callers while the shared state is `Authenticating`.
#[derive(Debug, Clone)]
pub struct RequestGate {
    rx: watch::Receiver<AuthSnapshot>,
    ceiling: Duration,
}

impl RequestGate {
    pub fn new(rx: watch::Receiver<AuthSnapshot>, ceiling: Duration) -> Self {
        Self { rx, ceiling }
    }

    pub async fn wait(&self) -> GateOutcome {
        let mut rx = self.rx.clone();
        let settled = tokio::time::timeout(
            self.ceiling,
            rx.wait_for(|snapshot| !snapshot.state.is_authenticating()),
        )
        .await;

        match settled {
            // A closed channel means the authenticator is gone; nothing left to wait for.
            Ok(_) => GateOutcome::Ready,
            Err(_) => {
                tracing::warn!(
                    "Authentication still in progress after {:?}, sending request anyway",
                    self.ceiling
                );
                GateOutcome::TimedOut
            }
        }
    }
}
