//! Guarded oracle invocation.
//!
//! Every call is bounded: a timeout per attempt, a fixed number of
//! attempts, and exponential backoff between them. Whatever goes wrong,
//! the caller gets `None` ("no augmentation") rather than an error.

use crate::error::OracleError;
use crate::oracle::{OracleRequest, SemanticOracle};
use faultline_core::OracleConfig;
use serde::de::DeserializeOwned;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

/// Timeout and retry settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GuardPolicy {
    pub timeout: Duration,
    pub max_attempts: u32,
    pub initial_backoff: Duration,
}

impl Default for GuardPolicy {
    fn default() -> Self {
        Self::from_config(&OracleConfig::default())
    }
}

impl GuardPolicy {
    pub fn from_config(config: &OracleConfig) -> Self {
        Self {
            timeout: Duration::from_secs(config.timeout_secs),
            max_attempts: config.max_attempts.max(1),
            initial_backoff: Duration::from_millis(config.initial_backoff_ms),
        }
    }
}

/// An optional oracle wrapped in a [`GuardPolicy`].
#[derive(Clone)]
pub struct OracleGuard {
    oracle: Option<Arc<dyn SemanticOracle>>,
    policy: GuardPolicy,
}

impl OracleGuard {
    pub fn new(oracle: Option<Arc<dyn SemanticOracle>>, policy: GuardPolicy) -> Self {
        Self { oracle, policy }
    }

    /// Builds a guard from config; a disabled config drops the oracle.
    pub fn from_config(oracle: Option<Arc<dyn SemanticOracle>>, config: &OracleConfig) -> Self {
        let oracle = if config.enabled { oracle } else { None };
        Self::new(oracle, GuardPolicy::from_config(config))
    }

    /// A guard that never proposes anything.
    pub fn disabled() -> Self {
        Self::new(None, GuardPolicy::default())
    }

    pub fn is_enabled(&self) -> bool {
        self.oracle.is_some()
    }

    pub fn policy(&self) -> GuardPolicy {
        self.policy
    }

    /// Asks the oracle and decodes its reply as `T`.
    ///
    /// Returns `None` when there is no oracle, when it has nothing to add,
    /// or when every attempt failed.
    pub async fn propose<T: DeserializeOwned>(&self, request: &OracleRequest) -> Option<T> {
        let oracle = self.oracle.as_deref()?;
        invoke_guarded(oracle, request, &self.policy).await
    }
}

/// Calls `oracle` under `policy`, decoding the reply as `T`.
///
/// A reply that does not decode counts as a failed attempt.
pub async fn invoke_guarded<T: DeserializeOwned>(
    oracle: &dyn SemanticOracle,
    request: &OracleRequest,
    policy: &GuardPolicy,
) -> Option<T> {
    let mut backoff = policy.initial_backoff;

    for attempt in 1..=policy.max_attempts {
        let error = match tokio::time::timeout(policy.timeout, oracle.complete(request)).await {
            Ok(Ok(None)) => {
                debug!("Oracle had nothing to add for {} request", request.kind);
                return None;
            }
            Ok(Ok(Some(value))) => match serde_json::from_value::<T>(value) {
                Ok(decoded) => return Some(decoded),
                Err(e) => OracleError::Malformed(e.to_string()),
            },
            Ok(Err(e)) => e,
            Err(_) => OracleError::Timeout(policy.timeout),
        };

        if !error.is_retryable() {
            warn!("Oracle unavailable: {}", error);
            return None;
        }
        if attempt == policy.max_attempts {
            warn!(
                "Oracle failed after {} attempts ({}), continuing without augmentation",
                attempt, error
            );
            return None;
        }

        info!(
            "Oracle attempt {}/{} failed ({}), retrying in {:?}",
            attempt, policy.max_attempts, error, backoff
        );
        tokio::time::sleep(backoff).await;
        backoff *= 2;
    }

    None
}
