use std::future::Future;

use action_primitives::ActionError;
use dashmap::DashMap;
use serde::{de::DeserializeOwned, Serialize};
use sha2::{Digest, Sha256};
use thiserror::Error;
use tracing::debug;

use crate::metrics;

#[derive(Debug, Error)]
#[error("fingerprint cache encoding failed for {op}: {source}")]
pub struct CacheError {
    pub op: String,
    #[source]
    pub source: serde_json::Error,
}

impl From<CacheError> for ActionError {
    fn from(err: CacheError) -> Self {
        ActionError::Internal(err.to_string())
    }
}

/// Run-scoped memo of expensive operations keyed by `(operation, arguments)`.
///
/// Only successful results are stored, so a failed computation is retried on
/// the next call with the same arguments. Nothing is persisted.
#[derive(Default)]
pub struct FingerprintCache {
    entries: DashMap<String, serde_json::Value>,
}

impl FingerprintCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn fingerprint<A>(op: &str, args: &A) -> Result<String, CacheError>
    where
        A: Serialize + ?Sized,
    {
        let encoded = serde_json::to_vec(args).map_err(|source| CacheError {
            op: op.to_string(),
            source,
        })?;
        let mut hasher = Sha256::new();
        hasher.update(op.as_bytes());
        hasher.update([0u8]);
        hasher.update(&encoded);
        Ok(hex::encode(hasher.finalize()))
    }

    /// Return the stored result for `(op, args)` or await `compute` and store
    /// it. `compute` is dropped unpolled on a hit. The flag is `true` when the
    /// value came from the cache.
    pub async fn memoized<A, T, E, Fut>(
        &self,
        op: &str,
        args: &A,
        compute: Fut,
    ) -> Result<(T, bool), E>
    where
        A: Serialize + ?Sized,
        T: Serialize + DeserializeOwned,
        E: From<CacheError>,
        Fut: Future<Output = Result<T, E>>,
    {
        let key = Self::fingerprint(op, args)?;
        let cached = self.entries.get(&key).map(|entry| entry.value().clone());
        if let Some(stored) = cached {
            let value = serde_json::from_value(stored).map_err(|source| CacheError {
                op: op.to_string(),
                source,
            })?;
            debug!(op, fingerprint = %&key[..12], "fingerprint cache hit");
            metrics::record_cache_hit(op);
            return Ok((value, true));
        }

        let value = compute.await?;
        let stored = serde_json::to_value(&value).map_err(|source| CacheError {
            op: op.to_string(),
            source,
        })?;
        self.entries.insert(key, stored);
        Ok((value, false))
    }

    pub fn contains<A>(&self, op: &str, args: &A) -> bool
    where
        A: Serialize + ?Sized,
    {
        Self::fingerprint(op, args)
            .map(|key| self.entries.contains_key(&key))
            .unwrap_or(false)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&self) {
        self.entries.clear();
    }
}
