//! Rule-based scoring engine: condition matcher, group scorer, aggregator,
//! and the room composite indices, behind one evaluation facade.

pub mod aggregate;
pub mod composites;
pub mod domain;
pub mod matcher;
pub mod scorer;

#[cfg(test)]
mod tests;

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::catalog::{CatalogError, RuleCatalogProvider};

pub use aggregate::{
    aggregate, AggregateResult, GroupAssessment, GroupStanding, TierCount, DEFAULT_STANDINGS,
};
pub use composites::{
    room_composites, AuspiciousPosition, BalanceCallout, Direction, DirectionalEnergy, Element,
    ElementReading, ElementalBalance, PositionScore, RoomComposites,
};
pub use domain::{
    ConditionRule, FeatureGroup, FeatureValue, FeatureVector, FortuneDomain, FortuneTier,
    Operand, Operator, RuleScope, SCALE_MAX, SCALE_MIN,
};
pub use matcher::matches;
pub use scorer::{score_group, GroupResult, ScoreSource};

#[derive(Debug, Error)]
pub enum EngineError {
    #[error(transparent)]
    Catalog(#[from] CatalogError),
}

/// Full evaluation of one feature vector in one domain.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Evaluation {
    pub domain: FortuneDomain,
    pub groups: Vec<GroupAssessment>,
    pub aggregate: AggregateResult,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub composites: Option<RoomComposites>,
}

/// Evaluation facade: fetches the domain catalog once per call, scores every
/// group in input order, aggregates, and attaches composites where the
/// domain defines them.
pub struct FortuneEngine<P> {
    provider: Arc<P>,
    standings: usize,
}

impl<P> FortuneEngine<P>
where
    P: RuleCatalogProvider,
{
    pub fn new(provider: Arc<P>) -> Self {
        FortuneEngine {
            provider,
            standings: DEFAULT_STANDINGS,
        }
    }

    /// Override the standings list length for the aggregate.
    pub fn with_standings(mut self, standings: usize) -> Self {
        self.standings = standings;
        self
    }

    pub fn evaluate(
        &self,
        domain: FortuneDomain,
        features: &FeatureVector,
    ) -> Result<Evaluation, EngineError> {
        // Catalog fetch is the single fatal failure point; everything after
        // it is total.
        let catalog = self.provider.rules(domain)?;

        let groups: Vec<GroupAssessment> = features
            .groups()
            .iter()
            .map(|group| GroupAssessment {
                group_key: group.key.clone(),
                result: score_group(&group.key, &group.features, &catalog),
            })
            .collect();

        let aggregate = aggregate::aggregate(domain, &groups, self.standings);
        let composites = domain
            .has_composites()
            .then(|| room_composites(features));

        tracing::debug!(
            domain = domain.label(),
            groups = groups.len(),
            overall = aggregate.overall_score,
            "evaluation complete"
        );

        Ok(Evaluation {
            domain,
            groups,
            aggregate,
            composites,
        })
    }
}
