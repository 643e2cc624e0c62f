use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::domain::{ConditionRule, FeatureValue, FortuneTier, SCALE_MAX, SCALE_MIN};
use super::matcher;

/// Whether a group score came from matched rules or the neutral fallback.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScoreSource {
    MatchedRules,
    NeutralDefault,
}

/// Scoring outcome for one feature group.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GroupResult {
    pub normalized_score: u8,
    pub raw_score: f64,
    pub tier: FortuneTier,
    pub source: ScoreSource,
    pub matched_rule_count: usize,
    pub positive_count: usize,
    pub negative_count: usize,
    pub interpretations: Vec<String>,
    pub categories: Vec<String>,
    pub remedies: Vec<String>,
}

impl GroupResult {
    /// Fixed fallback for a group no rule matched. Always the same output,
    /// so repeat readings stay stable.
    pub fn neutral() -> Self {
        GroupResult {
            normalized_score: 50,
            raw_score: 0.0,
            tier: FortuneTier::from_score(50),
            source: ScoreSource::NeutralDefault,
            matched_rule_count: 0,
            positive_count: 0,
            negative_count: 0,
            interpretations: vec!["此处格局平稳，暂无特别征兆。".to_string()],
            categories: vec!["综合".to_string()],
            remedies: Vec::new(),
        }
    }
}

/// Project a raw mean on the canonical scale onto 0..100.
pub(crate) fn normalize(raw: f64) -> u8 {
    let scaled = (raw - SCALE_MIN) / (SCALE_MAX - SCALE_MIN) * 100.0;
    scaled.round().clamp(0.0, 100.0) as u8
}

/// Score one group against the catalog.
///
/// Candidate rules are those scoped to this group or to the wildcard. A rule
/// whose feature the extractor did not produce is skipped, not failed. When
/// nothing matches the group falls back to [`GroupResult::neutral`].
pub fn score_group(
    group_key: &str,
    features: &BTreeMap<String, FeatureValue>,
    catalog: &[ConditionRule],
) -> GroupResult {
    let mut deltas: Vec<i8> = Vec::new();
    let mut positive_count = 0;
    let mut negative_count = 0;
    let mut interpretations = Vec::new();
    let mut categories: Vec<String> = Vec::new();
    let mut remedies = Vec::new();

    for rule in catalog {
        if !rule.scope.applies_to(group_key) {
            continue;
        }
        let Some(observed) = features.get(&rule.feature_name) else {
            continue;
        };
        if !matcher::matches(observed, rule.operator, &rule.operand) {
            continue;
        }

        deltas.push(rule.score_delta);
        if rule.score_delta > 0 {
            positive_count += 1;
        } else if rule.score_delta < 0 {
            negative_count += 1;
        }
        interpretations.push(rule.interpretation.clone());
        if !categories.contains(&rule.category) {
            categories.push(rule.category.clone());
        }
        if let Some(remedy) = &rule.remedy {
            if !remedy.is_empty() {
                remedies.push(remedy.clone());
            }
        }
    }

    if deltas.is_empty() {
        tracing::info!(group = group_key, "no catalog rule matched, using neutral default");
        return GroupResult::neutral();
    }

    let raw_score =
        deltas.iter().map(|delta| f64::from(*delta)).sum::<f64>() / deltas.len() as f64;
    let normalized_score = normalize(raw_score);

    GroupResult {
        normalized_score,
        raw_score,
        tier: FortuneTier::from_score(normalized_score),
        source: ScoreSource::MatchedRules,
        matched_rule_count: deltas.len(),
        positive_count,
        negative_count,
        interpretations,
        categories,
        remedies,
    }
}
