use std::collections::BTreeMap;

use crate::engine::domain::{
    ConditionRule, FeatureValue, FeatureVector, Operand, Operator, RuleScope,
};

pub(super) fn rule(
    scope: RuleScope,
    feature: &str,
    operator: Operator,
    operand: Operand,
    score: i8,
    interpretation: &str,
    category: &str,
) -> ConditionRule {
    ConditionRule {
        scope,
        feature_name: feature.to_string(),
        operator,
        operand,
        score_delta: score,
        interpretation: interpretation.to_string(),
        category: category.to_string(),
        remedy: None,
    }
}

pub(super) fn group_rule(
    group: &str,
    feature: &str,
    operator: Operator,
    operand: Operand,
    score: i8,
    interpretation: &str,
    category: &str,
) -> ConditionRule {
    rule(
        RuleScope::Group(group.to_string()),
        feature,
        operator,
        operand,
        score,
        interpretation,
        category,
    )
}

pub(super) fn features(entries: &[(&str, f64)]) -> BTreeMap<String, FeatureValue> {
    entries
        .iter()
        .map(|(name, value)| (name.to_string(), FeatureValue::Number(*value)))
        .collect()
}

/// The face catalog used across scorer and aggregate tests: the 命宫
/// brow-gap rules plus a wealth-palace pair and one wildcard rule.
pub(super) fn face_catalog() -> Vec<ConditionRule> {
    vec![
        group_rule(
            "命宫",
            "印堂宽度比例",
            Operator::AtLeast,
            Operand::Number(0.90),
            10,
            "印堂开阔，气宇轩昂，诸事顺遂。",
            "fortune",
        ),
        group_rule(
            "命宫",
            "印堂宽度比例",
            Operator::InRange,
            Operand::Range { min: 0.85, max: 0.90 },
            4,
            "印堂宽度适中，运势平稳。",
            "fortune",
        ),
        group_rule(
            "财帛宫",
            "鼻梁高度",
            Operator::AtLeast,
            Operand::Number(12.0),
            6,
            "鼻梁挺直，财运可期。",
            "wealth",
        ),
        group_rule(
            "财帛宫",
            "鼻头圆润度",
            Operator::LessThan,
            Operand::Number(0.5),
            -4,
            "鼻头欠丰，守财需谨慎。",
            "wealth",
        ),
        rule(
            RuleScope::AnyGroup,
            "印堂颜色亮度",
            Operator::AtLeast,
            Operand::Number(0.8),
            2,
            "气色明润，精神饱满。",
            "health",
        ),
    ]
}

/// A room feature vector whose composite inputs are fully specified.
pub(super) fn room_features() -> FeatureVector {
    let mut vector = FeatureVector::new();
    vector.insert("客厅", "朝向", "南");
    vector.insert("客厅", "亮度", 0.88);
    vector.insert("客厅", "整洁度", 0.80);
    vector.insert("客厅", "植物覆盖率", 0.15);
    vector.insert("客厅", "暖色比例", 0.70);
    vector.insert("客厅", "色彩饱和度", 0.60);
    vector.insert("客厅", "自然光比例", 0.75);
    vector.insert("客厅", "空间开阔度", 0.82);
    vector.insert("客厅", "木元素比例", 0.25);
    vector.insert("客厅", "火元素比例", 0.20);
    vector.insert("客厅", "土元素比例", 0.20);
    vector.insert("客厅", "金元素比例", 0.15);
    vector.insert("客厅", "水元素比例", 0.20);
    vector
}
