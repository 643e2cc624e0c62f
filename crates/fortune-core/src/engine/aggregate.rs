use serde::{Deserialize, Serialize};

use super::domain::{FortuneDomain, FortuneTier};
use super::scorer::GroupResult;

/// How many groups the standings lists carry by default.
pub const DEFAULT_STANDINGS: usize = 3;

/// One scored group, keyed for the aggregate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GroupAssessment {
    pub group_key: String,
    #[serde(flatten)]
    pub result: GroupResult,
}

/// A standings entry: group key plus its normalized score.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroupStanding {
    pub group_key: String,
    pub score: u8,
}

/// Count of groups landing in one tier. All six tiers are always emitted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TierCount {
    pub tier: FortuneTier,
    pub count: usize,
}

/// Whole-reading rollup across all scored groups.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AggregateResult {
    pub overall_score: u8,
    pub overall_tier: FortuneTier,
    pub group_count: usize,
    pub top_groups: Vec<GroupStanding>,
    pub bottom_groups: Vec<GroupStanding>,
    pub tier_histogram: Vec<TierCount>,
}

impl AggregateResult {
    /// Fixed aggregate for a reading with no groups at all.
    pub fn neutral() -> Self {
        AggregateResult {
            overall_score: 50,
            overall_tier: FortuneTier::from_score(50),
            group_count: 0,
            top_groups: Vec::new(),
            bottom_groups: Vec::new(),
            tier_histogram: empty_histogram(),
        }
    }
}

fn empty_histogram() -> Vec<TierCount> {
    FortuneTier::ordered()
        .into_iter()
        .map(|tier| TierCount { tier, count: 0 })
        .collect()
}

/// Roll scored groups up into an overall reading.
///
/// Primary groups of the domain weigh double in the overall mean. Standings
/// come from a single stable descending sort, so groups tied on score keep
/// their input order in the top list and appear lowest-first in the bottom
/// list.
pub fn aggregate(
    domain: FortuneDomain,
    groups: &[GroupAssessment],
    standings: usize,
) -> AggregateResult {
    if groups.is_empty() {
        return AggregateResult::neutral();
    }

    let primary = domain.primary_groups();
    let mut weighted_sum = 0.0f64;
    let mut weight_total = 0.0f64;
    for group in groups {
        let weight = if primary.contains(&group.group_key.as_str()) {
            2.0
        } else {
            1.0
        };
        weighted_sum += f64::from(group.result.normalized_score) * weight;
        weight_total += weight;
    }
    let overall_score = (weighted_sum / weight_total).round().clamp(0.0, 100.0) as u8;

    let mut ranked: Vec<GroupStanding> = groups
        .iter()
        .map(|group| GroupStanding {
            group_key: group.group_key.clone(),
            score: group.result.normalized_score,
        })
        .collect();
    ranked.sort_by(|a, b| b.score.cmp(&a.score));

    let take = standings.min(ranked.len());
    let top_groups = ranked[..take].to_vec();
    let bottom_groups: Vec<GroupStanding> =
        ranked[ranked.len() - take..].iter().rev().cloned().collect();

    let mut tier_histogram = empty_histogram();
    for group in groups {
        if let Some(entry) = tier_histogram
            .iter_mut()
            .find(|entry| entry.tier == group.result.tier)
        {
            entry.count += 1;
        }
    }

    AggregateResult {
        overall_score,
        overall_tier: FortuneTier::from_score(overall_score),
        group_count: groups.len(),
        top_groups,
        bottom_groups,
        tier_histogram,
    }
}
