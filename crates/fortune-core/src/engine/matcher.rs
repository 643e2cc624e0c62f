use super::domain::{FeatureValue, Operand, Operator};

/// Tolerance for numeric equality. Extractor proportions come out of
/// floating-point pipelines, so exact comparison would be flaky.
pub(crate) const EPSILON: f64 = 1e-6;

/// Evaluate one rule predicate against an observed value.
///
/// Total over every (value, operator, operand) combination: any mismatch
/// between the observed value's type and what the operator expects yields
/// `false`, never an error. Non-finite numbers fail closed as well.
pub fn matches(observed: &FeatureValue, operator: Operator, operand: &Operand) -> bool {
    match observed {
        FeatureValue::Number(value) => match_number(*value, operator, operand),
        FeatureValue::Text(value) => match_text(value, operator, operand),
    }
}

fn match_number(value: f64, operator: Operator, operand: &Operand) -> bool {
    if !value.is_finite() {
        return false;
    }
    match (operator, operand) {
        (Operator::Equals, Operand::Number(target)) => (value - target).abs() <= EPSILON,
        (Operator::GreaterThan, Operand::Number(target)) => value > *target,
        (Operator::LessThan, Operand::Number(target)) => value < *target,
        (Operator::AtLeast, Operand::Number(target)) => value >= *target,
        (Operator::AtMost, Operand::Number(target)) => value <= *target,
        (Operator::InRange, Operand::Range { min, max }) => value >= *min && value <= *max,
        _ => false,
    }
}

fn match_text(value: &str, operator: Operator, operand: &Operand) -> bool {
    match (operator, operand) {
        (Operator::Equals, Operand::Text(target)) => value == target,
        (Operator::OneOf, Operand::Set(entries)) => {
            entries.iter().any(|entry| entry == value)
        }
        (Operator::Contains, Operand::Text(target)) => value.contains(target.as_str()),
        _ => false,
    }
}
