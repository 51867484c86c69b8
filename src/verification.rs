//! Identity Verification Sessions
//!
//! Short-lived, per-principal proof that the caller has passed identity
//! verification. Sessions expire lazily at read time; an expired entry is
//! indistinguishable from absence. The store is an explicitly owned object
//! injected into every component that gates on verification.

use std::sync::Arc;

use dashmap::DashMap;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::config::CredentialSeed;
use crate::error::ServiceError;
use crate::order::now_ms;

/// Credential proof submitted by a caller
#[derive(Debug, Clone, Deserialize)]
pub struct CredentialProof {
    /// Last four digits of the government ID
    pub last_four: String,
    /// ID expiry date as printed (e.g. "2027-03")
    pub expiry: String,
}

/// Expected out-of-band credential reference for one principal
#[derive(Debug, Clone)]
pub struct CredentialReference {
    pub last_four: String,
    pub expiry: String,
}

/// Directory of out-of-band credential references, keyed by principal.
#[derive(Default)]
pub struct CredentialDirectory {
    entries: DashMap<String, CredentialReference>,
}

impl CredentialDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a directory from configuration seeds.
    pub fn from_seeds(seeds: &[CredentialSeed]) -> Self {
        let directory = Self::new();
        for seed in seeds {
            directory.insert(
                &seed.principal_id,
                CredentialReference {
                    last_four: seed.last_four.clone(),
                    expiry: seed.expiry.clone(),
                },
            );
        }
        directory
    }

    pub fn insert(&self, principal_id: &str, reference: CredentialReference) {
        self.entries.insert(principal_id.to_string(), reference);
    }

    fn lookup(&self, principal_id: &str) -> Option<CredentialReference> {
        self.entries.get(principal_id).map(|r| r.clone())
    }
}

/// One live verification session
#[derive(Debug, Clone, Copy, Serialize)]
pub struct VerificationSession {
    pub verified_at: i64,
    pub expires_at: i64,
}

/// Per-principal verification session store with TTL expiry.
pub struct VerificationSessionStore {
    sessions: DashMap<String, VerificationSession>,
    directory: Arc<CredentialDirectory>,
    ttl_ms: i64,
}

impl VerificationSessionStore {
    pub fn new(directory: Arc<CredentialDirectory>, ttl_secs: u64) -> Self {
        Self {
            sessions: DashMap::new(),
            directory,
            ttl_ms: (ttl_secs as i64) * 1000,
        }
    }

    /// Verify the proof against the out-of-band reference for this principal.
    ///
    /// On success the session is created or overwritten with a fresh TTL.
    /// Failure is a typed rejection that never reveals which part of the
    /// proof mismatched.
    pub fn verify(
        &self,
        principal_id: &str,
        proof: &CredentialProof,
    ) -> Result<VerificationSession, ServiceError> {
        self.verify_at(principal_id, proof, now_ms())
    }

    /// Verification with an explicit clock, used by TTL tests.
    pub fn verify_at(
        &self,
        principal_id: &str,
        proof: &CredentialProof,
        now_ms: i64,
    ) -> Result<VerificationSession, ServiceError> {
        let reference = self
            .directory
            .lookup(principal_id)
            .ok_or(ServiceError::VerificationFailed)?;

        if reference.last_four != proof.last_four || reference.expiry != proof.expiry {
            debug!(principal_id, "credential proof mismatch");
            return Err(ServiceError::VerificationFailed);
        }

        let session = VerificationSession {
            verified_at: now_ms,
            expires_at: now_ms + self.ttl_ms,
        };
        // Last write wins for concurrent verifications of the same principal.
        self.sessions.insert(principal_id.to_string(), session);
        info!(principal_id, expires_at = session.expires_at, "identity verified");
        Ok(session)
    }

    /// True when a live (unexpired) session exists for the principal.
    pub fn is_verified(&self, principal_id: &str) -> bool {
        self.is_verified_at(principal_id, now_ms())
    }

    /// Read-time expiry: a session past its deadline counts as absent.
    pub fn is_verified_at(&self, principal_id: &str, now_ms: i64) -> bool {
        match self.sessions.get(principal_id) {
            Some(session) => now_ms < session.expires_at,
            None => false,
        }
    }

    /// Drop the session for a principal, if any.
    pub fn clear(&self, principal_id: &str) {
        self.sessions.remove(principal_id);
    }

    /// Reclaim memory held by expired sessions. Optional; correctness does
    /// not depend on it.
    pub fn sweep_expired(&self) -> usize {
        let now = now_ms();
        let before = self.sessions.len();
        self.sessions.retain(|_, session| now < session.expires_at);
        before - self.sessions.len()
    }
}
