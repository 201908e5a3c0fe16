use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use super::kv::{KeyValueStore, COMPARISON_KEY};
use crate::model::{Comparable, Metric, Rating};
use crate::scoring::{rank_comparison, Ranked, ScoringError};
use crate::store::{Comparison, StoreError};

/// Stored form of a comparison, written under one key
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct StoredComparison {
    comparables: Vec<Comparable>,
    metrics: Vec<Metric>,
    rating_matrix: Vec<Vec<Rating>>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct StoredComparisonRef<'a> {
    comparables: &'a [Comparable],
    metrics: &'a [Metric],
    rating_matrix: &'a [Vec<Rating>],
}

/// Live comparison plus the store it is mirrored to.
///
/// Every successful operation run through [`Session::apply`] is written back
/// to the store as a single record, so the stored collections always agree
/// with each other. Write failures are logged and otherwise ignored so that
/// editing never blocks on persistence.
pub struct Session<S: KeyValueStore> {
    state: Comparison,
    store: S,
}

impl<S: KeyValueStore> Session<S> {
    /// Load the comparison from `store`.
    ///
    /// An empty store is seeded with `seed`, which is written out immediately.
    /// A stored record that cannot be parsed or is inconsistent is logged and
    /// replaced by `seed` in memory; it stays on disk until the next
    /// successful write.
    pub fn open(store: S, seed: Comparison) -> Result<Self> {
        let Some(bytes) = store.read(COMPARISON_KEY)? else {
            info!(
                comparables = seed.comparables().len(),
                metrics = seed.metrics().len(),
                "seeding empty store"
            );
            let mut session = Self { state: seed, store };
            session.persist();
            return Ok(session);
        };

        let state = match decode(&bytes) {
            Ok(state) => {
                debug!(
                    comparables = state.comparables().len(),
                    metrics = state.metrics().len(),
                    "loaded stored comparison"
                );
                state
            }
            Err(e) => {
                warn!(error = %format!("{:#}", e), "stored comparison is unusable; starting from seed");
                seed
            }
        };
        Ok(Self { state, store })
    }

    /// Start over without reading what is stored: clear it and write `seed`.
    pub fn create(store: S, seed: Comparison) -> Result<Self> {
        let mut session = Self {
            state: Comparison::empty(),
            store,
        };
        session.reset(seed)?;
        Ok(session)
    }

    pub fn state(&self) -> &Comparison {
        &self.state
    }

    /// Independent copy of the current state, safe to score while the live
    /// comparison keeps changing.
    pub fn snapshot(&self) -> Comparison {
        self.state.clone()
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Run one store operation and persist the result if it succeeded.
    pub fn apply<T>(
        &mut self,
        op: impl FnOnce(&mut Comparison) -> Result<T, StoreError>,
    ) -> Result<T, StoreError> {
        let out = op(&mut self.state)?;
        self.persist();
        Ok(out)
    }

    pub fn results(&self) -> Result<Vec<Ranked>, ScoringError> {
        rank_comparison(&self.snapshot())
    }

    /// Swap in a whole new comparison (snapshot import).
    pub fn replace(&mut self, state: Comparison) {
        info!(
            comparables = state.comparables().len(),
            metrics = state.metrics().len(),
            "replacing comparison"
        );
        self.state = state;
        self.persist();
    }

    /// Drop the stored comparison and start over from `seed`.
    pub fn reset(&mut self, seed: Comparison) -> Result<()> {
        self.store
            .remove(COMPARISON_KEY)
            .context("Failed to clear stored comparison")?;
        info!("store cleared");
        self.replace(seed);
        Ok(())
    }

    /// Best-effort write of the whole comparison in one record.
    fn persist(&mut self) {
        let record = StoredComparisonRef {
            comparables: self.state.comparables(),
            metrics: self.state.metrics(),
            rating_matrix: self.state.rating_matrix(),
        };
        let result = serde_json::to_vec(&record)
            .context("serialization failed")
            .and_then(|bytes| self.store.write(COMPARISON_KEY, &bytes));
        match result {
            Ok(()) => debug!(key = COMPARISON_KEY, "persisted"),
            Err(e) => warn!(
                key = COMPARISON_KEY,
                error = %e,
                "failed to persist; continuing with in-memory state"
            ),
        }
    }
}

fn decode(bytes: &[u8]) -> Result<Comparison> {
    let stored: StoredComparison = serde_json::from_slice(bytes)
        .with_context(|| format!("Failed to parse stored '{}'", COMPARISON_KEY))?;
    Comparison::from_parts(stored.comparables, stored.metrics, stored.rating_matrix).map_err(
        |errors| anyhow::anyhow!("Stored comparison is inconsistent:\n  - {}", errors.join("\n  - ")),
    )
}
