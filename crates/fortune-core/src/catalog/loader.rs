use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Deserializer};

use super::registry::FeatureRegistry;
use super::{CatalogError, RuleCatalogProvider};
use crate::engine::domain::{ConditionRule, FortuneDomain, Operand, Operator, RuleScope};

/// CSV-backed rule catalog.
///
/// One file per domain under the configured directory (`face.csv`,
/// `palm.csv`, `room.csv`). Rows are validated against the feature registry
/// before any rule is handed to the engine.
pub struct CsvRuleCatalog {
    dir: PathBuf,
    registry: FeatureRegistry,
}

impl CsvRuleCatalog {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        CsvRuleCatalog {
            dir: dir.into(),
            registry: FeatureRegistry::builtin(),
        }
    }

    pub fn with_registry(mut self, registry: FeatureRegistry) -> Self {
        self.registry = registry;
        self
    }

    fn domain_path(&self, domain: FortuneDomain) -> PathBuf {
        self.dir.join(format!("{}.csv", domain.label()))
    }

    pub fn load_from_path(
        &self,
        domain: FortuneDomain,
        path: &Path,
    ) -> Result<Vec<ConditionRule>, CatalogError> {
        let file = File::open(path).map_err(|error| {
            CatalogError::Unavailable(format!("{}: {error}", path.display()))
        })?;
        self.load_from_reader(domain, file)
    }

    pub fn load_from_reader<R: Read>(
        &self,
        domain: FortuneDomain,
        reader: R,
    ) -> Result<Vec<ConditionRule>, CatalogError> {
        let mut csv_reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .from_reader(reader);
        let mut rules = Vec::new();

        for (index, record) in csv_reader.deserialize::<RuleRow>().enumerate() {
            // Header is row 1; the first data row is row 2.
            let row_number = index + 2;
            let row = record.map_err(|error| CatalogError::Malformed {
                row: row_number,
                detail: error.to_string(),
            })?;
            rules.push(row.into_rule(row_number)?);
        }

        self.registry.validate(domain, &rules)?;
        Ok(rules)
    }
}

impl RuleCatalogProvider for CsvRuleCatalog {
    fn rules(&self, domain: FortuneDomain) -> Result<Vec<ConditionRule>, CatalogError> {
        self.load_from_path(domain, &self.domain_path(domain))
    }
}

#[derive(Debug, Deserialize)]
struct RuleRow {
    #[serde(default, deserialize_with = "empty_string_as_none")]
    group: Option<String>,
    feature: String,
    operator: String,
    operand: String,
    score: i16,
    interpretation: String,
    category: String,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    remedy: Option<String>,
}

impl RuleRow {
    fn into_rule(self, row: usize) -> Result<ConditionRule, CatalogError> {
        let operator = Operator::from_token(&self.operator).ok_or_else(|| {
            CatalogError::Malformed {
                row,
                detail: format!("unknown operator token '{}'", self.operator),
            }
        })?;
        let operand = parse_operand(operator, &self.operand).ok_or_else(|| {
            CatalogError::Malformed {
                row,
                detail: format!(
                    "operand '{}' does not fit operator '{}'",
                    self.operand,
                    operator.token()
                ),
            }
        })?;
        if !(-10..=10).contains(&self.score) {
            return Err(CatalogError::ScoreOutOfRange {
                score: i64::from(self.score),
            });
        }

        Ok(ConditionRule {
            scope: match self.group {
                Some(group) => RuleScope::Group(group),
                None => RuleScope::AnyGroup,
            },
            feature_name: self.feature,
            operator,
            operand,
            score_delta: self.score as i8,
            interpretation: self.interpretation,
            category: self.category,
            remedy: self.remedy,
        })
    }
}

/// Parse the operand column in the shape the operator expects.
///
/// Ranges encode as `"min-max"`; the separator search starts past the first
/// character so a negative minimum (`"-2-3"`) still splits correctly.
fn parse_operand(operator: Operator, raw: &str) -> Option<Operand> {
    let raw = raw.trim();
    match operator {
        Operator::Equals => match raw.parse::<f64>() {
            Ok(value) if value.is_finite() => Some(Operand::Number(value)),
            _ => Some(Operand::Text(raw.to_string())),
        },
        Operator::GreaterThan | Operator::LessThan | Operator::AtLeast | Operator::AtMost => {
            raw.parse::<f64>()
                .ok()
                .filter(|value| value.is_finite())
                .map(Operand::Number)
        }
        Operator::InRange => {
            let split = raw.get(1..)?.find('-').map(|offset| offset + 1)?;
            let min = raw[..split].trim().parse::<f64>().ok()?;
            let max = raw[split + 1..].trim().parse::<f64>().ok()?;
            (min.is_finite() && max.is_finite() && min <= max)
                .then_some(Operand::Range { min, max })
        }
        Operator::OneOf => {
            let entries: Vec<String> = raw
                .split(',')
                .map(|entry| entry.trim().to_string())
                .filter(|entry| !entry.is_empty())
                .collect();
            (!entries.is_empty()).then_some(Operand::Set(entries))
        }
        Operator::Contains => {
            (!raw.is_empty()).then(|| Operand::Text(raw.to_string()))
        }
    }
}

fn empty_string_as_none<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let opt = Option::<String>::deserialize(deserializer)?;
    Ok(opt.filter(|value| !value.trim().is_empty()))
}
