use super::common::{face_catalog, features, group_rule};
use crate::engine::domain::{FortuneTier, Operand, Operator};
use crate::engine::scorer::{score_group, GroupResult, ScoreSource};

#[test]
fn single_strong_match_scores_the_top_of_the_scale() {
    // 命宫 with 印堂宽度比例 0.92 matches only the >= 0.90 rule (delta 10):
    // raw 10 normalizes to 100 and lands in the top tier.
    let result = score_group(
        "命宫",
        &features(&[("印堂宽度比例", 0.92)]),
        &face_catalog(),
    );
    assert_eq!(result.raw_score, 10.0);
    assert_eq!(result.normalized_score, 100);
    assert_eq!(result.tier, FortuneTier::Exceptional);
    assert_eq!(result.source, ScoreSource::MatchedRules);
    assert_eq!(result.matched_rule_count, 1);
    assert_eq!(result.positive_count, 1);
    assert_eq!(result.negative_count, 0);
}

#[test]
fn mean_of_mixed_matches_normalizes_to_the_midband() {
    // 财帛宫: +6 (鼻梁高度 >= 12) and -4 (鼻头圆润度 < 0.5) both match,
    // raw mean 1.0 → normalized 55, neutral tier.
    let result = score_group(
        "财帛宫",
        &features(&[("鼻梁高度", 12.5), ("鼻头圆润度", 0.4)]),
        &face_catalog(),
    );
    assert_eq!(result.raw_score, 1.0);
    assert_eq!(result.normalized_score, 55);
    assert_eq!(result.tier, FortuneTier::Neutral);
    assert_eq!(result.matched_rule_count, 2);
    assert_eq!(result.positive_count, 1);
    assert_eq!(result.negative_count, 1);
}

#[test]
fn wildcard_rules_apply_to_every_group() {
    let result = score_group(
        "官禄宫",
        &features(&[("印堂颜色亮度", 0.85)]),
        &face_catalog(),
    );
    assert_eq!(result.matched_rule_count, 1);
    assert_eq!(result.interpretations, vec!["气色明润，精神饱满。"]);
    assert_eq!(result.categories, vec!["health"]);
}

#[test]
fn missing_feature_skips_the_rule_without_failing() {
    // Only the 印堂宽度比例 rules can even be considered; with the feature
    // absent they are skipped, leaving the neutral default.
    let result = score_group(
        "命宫",
        &features(&[("印堂纹路数量", 0.0)]),
        &face_catalog(),
    );
    assert_eq!(result.source, ScoreSource::NeutralDefault);
}

#[test]
fn no_match_yields_the_fixed_neutral_default() {
    let result = score_group(
        "命宫",
        &features(&[("印堂宽度比例", 0.70)]),
        &face_catalog(),
    );
    assert_eq!(result, GroupResult::neutral());
    assert_eq!(result.normalized_score, 50);
    assert_eq!(result.tier, FortuneTier::Neutral);
    assert_eq!(result.source, ScoreSource::NeutralDefault);
    assert_eq!(result.matched_rule_count, 0);
    assert_eq!(result.interpretations.len(), 1);
    assert_eq!(result.categories, vec!["综合"]);
}

#[test]
fn interpretations_keep_catalog_order_and_categories_deduplicate() {
    let catalog = vec![
        group_rule(
            "命宫",
            "印堂宽度比例",
            Operator::AtLeast,
            Operand::Number(0.5),
            4,
            "first",
            "fortune",
        ),
        group_rule(
            "命宫",
            "印堂纹路数量",
            Operator::AtMost,
            Operand::Number(1.0),
            2,
            "second",
            "health",
        ),
        group_rule(
            "命宫",
            "印堂颜色亮度",
            Operator::AtLeast,
            Operand::Number(0.5),
            2,
            "third",
            "fortune",
        ),
    ];
    let result = score_group(
        "命宫",
        &features(&[
            ("印堂宽度比例", 0.9),
            ("印堂纹路数量", 0.0),
            ("印堂颜色亮度", 0.8),
        ]),
        &catalog,
    );
    assert_eq!(result.interpretations, vec!["first", "second", "third"]);
    assert_eq!(result.categories, vec!["fortune", "health"]);
}

#[test]
fn matched_remedies_are_collected_in_catalog_order() {
    let mut first = group_rule(
        "卧室",
        "整洁度",
        Operator::LessThan,
        Operand::Number(0.6),
        -3,
        "卧室凌乱，气场受扰。",
        "health",
    );
    first.remedy = Some("整理收纳，保持床头清爽。".to_string());
    let mut second = group_rule(
        "卧室",
        "亮度",
        Operator::LessThan,
        Operand::Number(0.5),
        -2,
        "卧室偏暗。",
        "health",
    );
    second.remedy = Some("".to_string());

    let result = score_group(
        "卧室",
        &features(&[("整洁度", 0.4), ("亮度", 0.4)]),
        &[first, second],
    );
    // Empty remedy strings are dropped.
    assert_eq!(result.remedies, vec!["整理收纳，保持床头清爽。"]);
    assert_eq!(result.negative_count, 2);
}

#[test]
fn extreme_means_clamp_to_the_scale_ends() {
    let catalog = vec![group_rule(
        "命宫",
        "印堂宽度比例",
        Operator::AtLeast,
        Operand::Number(0.0),
        -10,
        "low",
        "fortune",
    )];
    let result = score_group(
        "命宫",
        &features(&[("印堂宽度比例", 0.5)]),
        &catalog,
    );
    assert_eq!(result.normalized_score, 0);
    assert_eq!(result.tier, FortuneTier::Inauspicious);
}
