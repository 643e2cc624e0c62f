use crate::engine::domain::{FeatureValue, FeatureVector, FortuneTier};

#[test]
fn tier_breakpoints_sit_exactly_on_their_boundaries() {
    let bands = [
        (100, FortuneTier::Exceptional),
        (90, FortuneTier::Exceptional),
        (89, FortuneTier::Auspicious),
        (75, FortuneTier::Auspicious),
        (74, FortuneTier::Favorable),
        (65, FortuneTier::Favorable),
        (64, FortuneTier::Neutral),
        (50, FortuneTier::Neutral),
        (49, FortuneTier::Delicate),
        (35, FortuneTier::Delicate),
        (34, FortuneTier::Inauspicious),
        (0, FortuneTier::Inauspicious),
    ];
    for (score, tier) in bands {
        assert_eq!(FortuneTier::from_score(score), tier, "score {score}");
    }
}

#[test]
fn tiers_never_regress_as_the_score_climbs() {
    for score in 1..=100u8 {
        assert!(
            FortuneTier::from_score(score) >= FortuneTier::from_score(score - 1),
            "tier dropped between {} and {score}",
            score - 1,
        );
    }
}

#[test]
fn duplicate_wire_groups_merge_into_one() {
    let raw = r#"[
        {"key":"命宫","features":{"印堂宽度比例":0.92}},
        {"key":"财帛宫","features":{"鼻梁高度":12.5}},
        {"key":"命宫","features":{"印堂宽度比例":0.8,"印堂颜色亮度":0.82}}
    ]"#;
    let vector: FeatureVector = serde_json::from_str(raw).expect("wire vector parses");

    assert_eq!(vector.groups().len(), 2);
    assert_eq!(vector.groups()[0].key, "命宫");

    // The later occurrence wins per feature.
    let life = vector.group("命宫").expect("merged group");
    assert_eq!(life.features.len(), 2);
    assert_eq!(
        life.features.get("印堂宽度比例"),
        Some(&FeatureValue::Number(0.8)),
    );
}
