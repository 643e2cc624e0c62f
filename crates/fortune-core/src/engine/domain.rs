use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Reading domains served by the engine. Each domain carries its own rule
/// catalog and feature-name contract with the upstream extractor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FortuneDomain {
    Face,
    Palm,
    Room,
}

impl FortuneDomain {
    pub const fn label(self) -> &'static str {
        match self {
            FortuneDomain::Face => "face",
            FortuneDomain::Palm => "palm",
            FortuneDomain::Room => "room",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "face" => Some(FortuneDomain::Face),
            "palm" => Some(FortuneDomain::Palm),
            "room" | "fengshui" => Some(FortuneDomain::Room),
            _ => None,
        }
    }

    pub const fn ordered() -> [FortuneDomain; 3] {
        [FortuneDomain::Face, FortuneDomain::Palm, FortuneDomain::Room]
    }

    /// Groups that receive double weight when aggregating this domain.
    pub const fn primary_groups(self) -> &'static [&'static str] {
        match self {
            FortuneDomain::Face => &["命宫", "财帛宫", "官禄宫"],
            FortuneDomain::Palm => &["生命线", "智慧线", "感情线"],
            FortuneDomain::Room => &["客厅", "卧室"],
        }
    }

    /// Whether the secondary composite indices apply to this domain.
    pub const fn has_composites(self) -> bool {
        matches!(self, FortuneDomain::Room)
    }
}

/// A single observed value produced by the feature extractor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FeatureValue {
    Number(f64),
    Text(String),
}

impl FeatureValue {
    pub fn as_number(&self) -> Option<f64> {
        match self {
            FeatureValue::Number(value) => Some(*value),
            FeatureValue::Text(_) => None,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            FeatureValue::Number(_) => None,
            FeatureValue::Text(value) => Some(value),
        }
    }
}

impl From<f64> for FeatureValue {
    fn from(value: f64) -> Self {
        FeatureValue::Number(value)
    }
}

impl From<&str> for FeatureValue {
    fn from(value: &str) -> Self {
        FeatureValue::Text(value.to_string())
    }
}

impl From<String> for FeatureValue {
    fn from(value: String) -> Self {
        FeatureValue::Text(value)
    }
}

/// One named feature group (a facial palace, palm line, or room) and its
/// observed values.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureGroup {
    pub key: String,
    pub features: BTreeMap<String, FeatureValue>,
}

/// The full extractor output for one request: an ordered list of feature
/// groups. Group order is preserved so aggregate tie-breaking stays
/// deterministic across runs. Group keys are unique: a duplicate key on the
/// wire merges into the first occurrence (later features win), so one group
/// never counts twice in the weighted mean or the histogram.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct FeatureVector {
    groups: Vec<FeatureGroup>,
}

impl<'de> Deserialize<'de> for FeatureVector {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let groups = Vec::<FeatureGroup>::deserialize(deserializer)?;
        let mut vector = FeatureVector::new();
        for group in groups {
            vector.merge_group(group);
        }
        Ok(vector)
    }
}

impl FeatureVector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert an observation, appending the group on first sight.
    pub fn insert(&mut self, group: &str, feature: &str, value: impl Into<FeatureValue>) {
        let value = value.into();
        match self.groups.iter_mut().find(|entry| entry.key == group) {
            Some(entry) => {
                entry.features.insert(feature.to_string(), value);
            }
            None => {
                let mut features = BTreeMap::new();
                features.insert(feature.to_string(), value);
                self.groups.push(FeatureGroup {
                    key: group.to_string(),
                    features,
                });
            }
        }
    }

    fn merge_group(&mut self, group: FeatureGroup) {
        match self.groups.iter_mut().find(|entry| entry.key == group.key) {
            Some(entry) => entry.features.extend(group.features),
            None => self.groups.push(group),
        }
    }

    pub fn groups(&self) -> &[FeatureGroup] {
        &self.groups
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    pub fn group(&self, key: &str) -> Option<&FeatureGroup> {
        self.groups.iter().find(|entry| entry.key == key)
    }

    /// First observation of a feature name across all groups. Composite
    /// calculators look features up this way because the room extractor
    /// emits them on the room group directly.
    pub fn feature(&self, name: &str) -> Option<&FeatureValue> {
        self.groups
            .iter()
            .find_map(|entry| entry.features.get(name))
    }
}

/// Comparison predicate attached to a rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Operator {
    Equals,
    GreaterThan,
    LessThan,
    AtLeast,
    AtMost,
    InRange,
    OneOf,
    Contains,
}

impl Operator {
    /// Tokens used by the seeded catalog rows.
    pub fn from_token(token: &str) -> Option<Self> {
        match token.trim() {
            "=" | "eq" => Some(Operator::Equals),
            ">" | "gt" => Some(Operator::GreaterThan),
            "<" | "lt" => Some(Operator::LessThan),
            ">=" | "ge" => Some(Operator::AtLeast),
            "<=" | "le" => Some(Operator::AtMost),
            "between" | "range" => Some(Operator::InRange),
            "in" => Some(Operator::OneOf),
            "contains" => Some(Operator::Contains),
            _ => None,
        }
    }

    pub const fn token(self) -> &'static str {
        match self {
            Operator::Equals => "=",
            Operator::GreaterThan => ">",
            Operator::LessThan => "<",
            Operator::AtLeast => ">=",
            Operator::AtMost => "<=",
            Operator::InRange => "between",
            Operator::OneOf => "in",
            Operator::Contains => "contains",
        }
    }
}

/// Parsed comparison value(s) for a rule predicate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Operand {
    Number(f64),
    Range { min: f64, max: f64 },
    Set(Vec<String>),
    Text(String),
}

/// Which groups a rule inspects: one named group or every group.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum RuleScope {
    Group(String),
    AnyGroup,
}

impl RuleScope {
    pub fn applies_to(&self, group_key: &str) -> bool {
        match self {
            RuleScope::Group(scope) => scope == group_key,
            RuleScope::AnyGroup => true,
        }
    }
}

/// Bounds of the canonical rule score scale. Every domain's catalog is
/// authored (or converted at seeding time) to signed deltas on this scale.
pub const SCALE_MIN: f64 = -10.0;
pub const SCALE_MAX: f64 = 10.0;

/// One static catalog entry: a predicate over a named feature plus the
/// score contribution and reading text applied when it matches.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConditionRule {
    pub scope: RuleScope,
    pub feature_name: String,
    pub operator: Operator,
    pub operand: Operand,
    pub score_delta: i8,
    pub interpretation: String,
    pub category: String,
    pub remedy: Option<String>,
}

/// Six ordered reading tiers, worst to best, derived from a normalized
/// score via fixed breakpoints.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum FortuneTier {
    Inauspicious,
    Delicate,
    Neutral,
    Favorable,
    Auspicious,
    Exceptional,
}

impl FortuneTier {
    pub const fn from_score(score: u8) -> Self {
        if score >= 90 {
            FortuneTier::Exceptional
        } else if score >= 75 {
            FortuneTier::Auspicious
        } else if score >= 65 {
            FortuneTier::Favorable
        } else if score >= 50 {
            FortuneTier::Neutral
        } else if score >= 35 {
            FortuneTier::Delicate
        } else {
            FortuneTier::Inauspicious
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            FortuneTier::Inauspicious => "inauspicious",
            FortuneTier::Delicate => "delicate",
            FortuneTier::Neutral => "neutral",
            FortuneTier::Favorable => "favorable",
            FortuneTier::Auspicious => "auspicious",
            FortuneTier::Exceptional => "exceptional",
        }
    }

    /// Display order for histograms and summaries, best tier first.
    pub const fn ordered() -> [FortuneTier; 6] {
        [
            FortuneTier::Exceptional,
            FortuneTier::Auspicious,
            FortuneTier::Favorable,
            FortuneTier::Neutral,
            FortuneTier::Delicate,
            FortuneTier::Inauspicious,
        ]
    }
}
