//! Process-wide send quota and single-use code tracking.
//!
//! State is memory-resident and reset on restart, by design: the cap is a
//! per-deployment-lifetime budget, not a durable ledger. All check/record
//! steps run under a single mutex so concurrent requests can never both
//! pass the cap check or both claim the same code.

use std::collections::HashSet;
use std::sync::{Arc, Mutex};

use tracing::{debug, warn};

use crate::error::QuotaError;

struct QuotaState {
    /// Confirmed successful sends. Incremented only on commit.
    sent: u32,
    /// Admitted submissions whose provider call has not resolved yet.
    in_flight: u32,
    used_codes: HashSet<String>,
}

/// Gate for every submission: global cap plus single-use codes.
pub struct QuotaGuard {
    max_sends: u32,
    state: Mutex<QuotaState>,
}

/// A reserved quota slot. Dropping the permit without committing releases
/// the reservation (request failed or caller disconnected); committing
/// converts it into a confirmed send. Code consumption is NOT rolled back
/// on drop — a presented code is spent at admission, success or not.
pub struct QuotaPermit {
    guard: Arc<QuotaGuard>,
    committed: bool,
}

/// Counter snapshot for the caller-facing envelope and liveness response.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QuotaSnapshot {
    pub sent: u32,
    pub max: u32,
}

impl QuotaSnapshot {
    pub fn remaining(&self) -> u32 {
        self.max.saturating_sub(self.sent)
    }
}

impl QuotaGuard {
    pub fn new(max_sends: u32) -> Arc<Self> {
        Arc::new(Self {
            max_sends,
            state: Mutex::new(QuotaState {
                sent: 0,
                in_flight: 0,
                used_codes: HashSet::new(),
            }),
        })
    }

    /// Admit a submission, reserving one quota slot.
    ///
    /// Denies when confirmed plus in-flight sends have reached the cap, or
    /// when the presented code was already used. The code is recorded as
    /// used here, before the outcome of the submission is known; that a
    /// failed attempt still burns its code is intentional anti-abuse
    /// behavior.
    pub fn admit(self: &Arc<Self>, code: Option<&str>) -> Result<QuotaPermit, QuotaError> {
        let mut state = self.state.lock().expect("quota mutex poisoned");

        if state.sent + state.in_flight >= self.max_sends {
            warn!(sent = state.sent, max = self.max_sends, "Send limit reached");
            return Err(QuotaError::LimitReached {
                sent: state.sent,
                max: self.max_sends,
            });
        }

        if let Some(code) = code {
            if !state.used_codes.insert(code.to_string()) {
                warn!("Access code presented twice");
                return Err(QuotaError::CodeAlreadyUsed);
            }
        }

        state.in_flight += 1;
        Ok(QuotaPermit {
            guard: Arc::clone(self),
            committed: false,
        })
    }

    /// Current confirmed counts.
    pub fn snapshot(&self) -> QuotaSnapshot {
        let state = self.state.lock().expect("quota mutex poisoned");
        QuotaSnapshot {
            sent: state.sent,
            max: self.max_sends,
        }
    }

    fn commit_one(&self) -> QuotaSnapshot {
        let mut state = self.state.lock().expect("quota mutex poisoned");
        state.in_flight -= 1;
        state.sent += 1;
        debug!(sent = state.sent, max = self.max_sends, "Send committed");
        QuotaSnapshot {
            sent: state.sent,
            max: self.max_sends,
        }
    }

    fn release_one(&self) {
        let mut state = self.state.lock().expect("quota mutex poisoned");
        state.in_flight -= 1;
    }
}

impl QuotaPermit {
    /// Confirm the send and count it against the quota. Returns the
    /// post-increment counts for the response envelope.
    pub fn commit(mut self) -> QuotaSnapshot {
        self.committed = true;
        self.guard.commit_one()
    }
}

impl Drop for QuotaPermit {
    fn drop(&mut self) {
        if !self.committed {
            self.guard.release_one();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_admit_and_commit_counts() {
        let guard = QuotaGuard::new(3);
        let permit = guard.admit(None).expect("admitted");
        let snap = permit.commit();
        assert_eq!(snap.sent, 1);
        assert_eq!(snap.remaining(), 2);
        assert_eq!(guard.snapshot().sent, 1);
    }

    #[test]
    fn test_limit_reached_denied() {
        let guard = QuotaGuard::new(2);
        guard.admit(None).expect("1st").commit();
        guard.admit(None).expect("2nd").commit();
        assert!(matches!(
            guard.admit(None),
            Err(QuotaError::LimitReached { sent: 2, max: 2 })
        ));
    }

    #[test]
    fn test_duplicate_code_denied() {
        let guard = QuotaGuard::new(10);
        guard.admit(Some("X1")).expect("first use").commit();
        assert!(matches!(
            guard.admit(Some("X1")),
            Err(QuotaError::CodeAlreadyUsed)
        ));
        // A different code is still fine
        assert!(guard.admit(Some("X2")).is_ok());
    }

    #[test]
    fn test_failed_attempt_releases_slot_but_burns_code() {
        let guard = QuotaGuard::new(1);
        let permit = guard.admit(Some("X1")).expect("admitted");
        drop(permit); // submission failed downstream

        // The quota slot is free again...
        assert_eq!(guard.snapshot().sent, 0);
        let permit = guard.admit(None).expect("slot released");
        drop(permit);

        // ...but the code stays consumed. Intentional anti-abuse behavior.
        assert!(matches!(
            guard.admit(Some("X1")),
            Err(QuotaError::CodeAlreadyUsed)
        ));
    }

    #[test]
    fn test_in_flight_reservations_respect_cap() {
        let guard = QuotaGuard::new(2);
        let p1 = guard.admit(None).expect("1st");
        let p2 = guard.admit(None).expect("2nd");
        // Nothing committed yet, but the cap already holds
        assert!(matches!(
            guard.admit(None),
            Err(QuotaError::LimitReached { sent: 0, max: 2 })
        ));
        p1.commit();
        p2.commit();
        assert_eq!(guard.snapshot().sent, 2);
    }

    #[test]
    fn test_concurrent_same_code_exactly_one_admitted() {
        let guard = QuotaGuard::new(100);
        let admitted = std::sync::atomic::AtomicU32::new(0);
        let denied = std::sync::atomic::AtomicU32::new(0);

        std::thread::scope(|s| {
            for _ in 0..16 {
                s.spawn(|| match guard.admit(Some("SHARED")) {
                    Ok(permit) => {
                        admitted.fetch_add(1, std::sync::atomic::Ordering::SeqCst);
                        permit.commit();
                    }
                    Err(QuotaError::CodeAlreadyUsed) => {
                        denied.fetch_add(1, std::sync::atomic::Ordering::SeqCst);
                    }
                    Err(e) => panic!("unexpected denial: {e}"),
                });
            }
        });

        assert_eq!(admitted.load(std::sync::atomic::Ordering::SeqCst), 1);
        assert_eq!(denied.load(std::sync::atomic::Ordering::SeqCst), 15);
    }

    #[test]
    fn test_concurrent_sends_never_exceed_cap() {
        let max = 8;
        let guard = QuotaGuard::new(max);
        let successes = std::sync::atomic::AtomicU32::new(0);

        std::thread::scope(|s| {
            for _ in 0..32 {
                s.spawn(|| {
                    if let Ok(permit) = guard.admit(None) {
                        successes.fetch_add(1, std::sync::atomic::Ordering::SeqCst);
                        permit.commit();
                    }
                });
            }
        });

        assert_eq!(successes.load(std::sync::atomic::Ordering::SeqCst), max);
        assert_eq!(guard.snapshot().sent, max);
        assert_eq!(guard.snapshot().remaining(), 0);
    }
}
