//! Rule catalog access: the provider trait, a CSV-backed provider, the
//! feature-name registry, and a snapshot cache.

pub mod loader;
pub mod registry;

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, RwLock};

use thiserror::Error;

use crate::engine::domain::{ConditionRule, FortuneDomain};

pub use loader::CsvRuleCatalog;
pub use registry::FeatureRegistry;

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("rule catalog unavailable: {0}")]
    Unavailable(String),
    #[error("malformed catalog row {row}: {detail}")]
    Malformed { row: usize, detail: String },
    #[error("rule targets unknown feature '{feature}' (scope '{scope}')")]
    OrphanRule { feature: String, scope: String },
    #[error("rule score {score} outside the -10..=10 scale")]
    ScoreOutOfRange { score: i64 },
    #[error("failed to read catalog source: {0}")]
    Io(#[from] std::io::Error),
}

/// Source of condition rules for a domain.
///
/// Fetch failure is the only error an evaluation propagates; everything the
/// engine computes from a fetched catalog is total.
pub trait RuleCatalogProvider: Send + Sync {
    fn rules(&self, domain: FortuneDomain) -> Result<Vec<ConditionRule>, CatalogError>;
}

/// Fixed in-memory catalog, handy for tests and one-shot CLI runs.
#[derive(Debug, Default)]
pub struct StaticRuleCatalog {
    rules: HashMap<FortuneDomain, Vec<ConditionRule>>,
}

impl StaticRuleCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_rules(mut self, domain: FortuneDomain, rules: Vec<ConditionRule>) -> Self {
        self.rules.insert(domain, rules);
        self
    }
}

impl RuleCatalogProvider for StaticRuleCatalog {
    fn rules(&self, domain: FortuneDomain) -> Result<Vec<ConditionRule>, CatalogError> {
        Ok(self.rules.get(&domain).cloned().unwrap_or_default())
    }
}

/// Immutable catalog snapshot tagged with the cache version that built it.
#[derive(Debug, Clone, PartialEq)]
pub struct CatalogSnapshot {
    pub rules: Vec<ConditionRule>,
    pub version: u64,
}

/// Caching layer over any provider.
///
/// Serves shared immutable snapshots per domain; `reload` drops them all and
/// bumps the version so the next fetch hits the inner provider again.
pub struct CatalogCache<P> {
    inner: P,
    snapshots: RwLock<HashMap<FortuneDomain, Arc<CatalogSnapshot>>>,
    version: AtomicU64,
}

impl<P> CatalogCache<P>
where
    P: RuleCatalogProvider,
{
    pub fn new(inner: P) -> Self {
        CatalogCache {
            inner,
            snapshots: RwLock::new(HashMap::new()),
            version: AtomicU64::new(1),
        }
    }

    pub fn version(&self) -> u64 {
        self.version.load(Ordering::SeqCst)
    }

    /// Drop every cached snapshot. Subsequent fetches reload from the inner
    /// provider under a new version.
    pub fn reload(&self) {
        let mut snapshots = self
            .snapshots
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        snapshots.clear();
        self.version.fetch_add(1, Ordering::SeqCst);
        tracing::info!(version = self.version(), "rule catalog cache invalidated");
    }

    pub fn snapshot(&self, domain: FortuneDomain) -> Result<Arc<CatalogSnapshot>, CatalogError> {
        {
            let snapshots = self
                .snapshots
                .read()
                .unwrap_or_else(|poisoned| poisoned.into_inner());
            if let Some(snapshot) = snapshots.get(&domain) {
                return Ok(Arc::clone(snapshot));
            }
        }

        let rules = self.inner.rules(domain)?;
        let snapshot = Arc::new(CatalogSnapshot {
            rules,
            version: self.version(),
        });
        let mut snapshots = self
            .snapshots
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        let entry = snapshots
            .entry(domain)
            .or_insert_with(|| Arc::clone(&snapshot));
        Ok(Arc::clone(entry))
    }
}

impl<P> RuleCatalogProvider for CatalogCache<P>
where
    P: RuleCatalogProvider,
{
    fn rules(&self, domain: FortuneDomain) -> Result<Vec<ConditionRule>, CatalogError> {
        self.snapshot(domain).map(|snapshot| snapshot.rules.clone())
    }
}
