//! Integration specifications for the fortune evaluation pipeline.
//!
//! Scenarios drive the public surface end to end: CSV catalog loading, the
//! snapshot cache, the evaluation engine, and the HTTP router, without
//! reaching into private modules.

mod common {
    use std::sync::Arc;

    use fortune_core::catalog::{CatalogCache, CsvRuleCatalog, StaticRuleCatalog};
    use fortune_core::engine::{
        ConditionRule, FeatureVector, FortuneDomain, FortuneEngine, Operand, Operator, RuleScope,
    };

    pub(super) const FACE_CSV: &str = "\
group,feature,operator,operand,score,interpretation,category,remedy
命宫,印堂宽度比例,>=,0.90,10,印堂开阔，气宇轩昂，诸事顺遂。,fortune,
命宫,印堂宽度比例,between,0.85-0.90,4,印堂宽度适中，运势平稳。,fortune,
财帛宫,鼻梁高度,>=,12,6,鼻梁挺直，财运可期。,wealth,
财帛宫,鼻头圆润度,<,0.5,-4,鼻头欠丰，守财需谨慎。,wealth,佩戴貔貅饰品
,印堂颜色亮度,>=,0.8,2,气色明润，精神饱满。,health,
";

    pub(super) fn face_rules() -> Vec<ConditionRule> {
        CsvRuleCatalog::new("unused")
            .load_from_reader(FortuneDomain::Face, FACE_CSV.as_bytes())
            .expect("seeded rows parse")
    }

    pub(super) fn face_vector() -> FeatureVector {
        let mut vector = FeatureVector::new();
        vector.insert("命宫", "印堂宽度比例", 0.92);
        vector.insert("命宫", "印堂颜色亮度", 0.82);
        vector.insert("财帛宫", "鼻梁高度", 12.5);
        vector.insert("财帛宫", "鼻头圆润度", 0.88);
        vector
    }

    pub(super) fn face_engine() -> FortuneEngine<StaticRuleCatalog> {
        let provider = StaticRuleCatalog::new().with_rules(FortuneDomain::Face, face_rules());
        FortuneEngine::new(Arc::new(provider))
    }

    pub(super) fn cached_engine() -> FortuneEngine<CatalogCache<StaticRuleCatalog>> {
        let provider = StaticRuleCatalog::new().with_rules(FortuneDomain::Face, face_rules());
        FortuneEngine::new(Arc::new(CatalogCache::new(provider)))
    }

    pub(super) fn wildcard_rule() -> ConditionRule {
        ConditionRule {
            scope: RuleScope::AnyGroup,
            feature_name: "整洁度".to_string(),
            operator: Operator::AtLeast,
            operand: Operand::Number(0.8),
            score_delta: 5,
            interpretation: "居所整洁，气场清明。".to_string(),
            category: "health".to_string(),
            remedy: None,
        }
    }
}

mod catalog {
    use super::common::*;
    use std::sync::Arc;

    use fortune_core::catalog::{
        CatalogCache, CatalogError, CsvRuleCatalog, RuleCatalogProvider, StaticRuleCatalog,
    };
    use fortune_core::engine::FortuneDomain;

    #[test]
    fn csv_rows_load_with_scopes_and_remedies() {
        let rules = face_rules();
        assert_eq!(rules.len(), 5);
        assert_eq!(rules[3].remedy.as_deref(), Some("佩戴貔貅饰品"));
        assert!(rules[4].scope.applies_to("任意宫位"));
    }

    #[test]
    fn orphaned_rules_fail_the_load() {
        let csv = "\
group,feature,operator,operand,score,interpretation,category,remedy
命宫,凭空捏造的特征,>=,0.9,8,无效规则。,fortune,
";
        let error = CsvRuleCatalog::new("unused")
            .load_from_reader(FortuneDomain::Face, csv.as_bytes())
            .unwrap_err();
        assert!(matches!(error, CatalogError::OrphanRule { .. }));
    }

    #[test]
    fn cache_serves_snapshots_and_bumps_version_on_reload() {
        let cache = Arc::new(CatalogCache::new(
            StaticRuleCatalog::new().with_rules(FortuneDomain::Face, face_rules()),
        ));

        let first = cache.snapshot(FortuneDomain::Face).expect("snapshot");
        let again = cache.snapshot(FortuneDomain::Face).expect("snapshot");
        assert_eq!(first.version, again.version);
        assert!(Arc::ptr_eq(&first, &again));

        cache.reload();
        let fresh = cache.snapshot(FortuneDomain::Face).expect("snapshot");
        assert_eq!(fresh.version, first.version + 1);
        assert_eq!(fresh.rules, first.rules);
    }

    #[test]
    fn cache_passes_through_the_provider_contract() {
        let cache = CatalogCache::new(
            StaticRuleCatalog::new().with_rules(FortuneDomain::Face, face_rules()),
        );
        let rules = cache.rules(FortuneDomain::Face).expect("rules load");
        assert_eq!(rules.len(), 5);
    }
}

mod evaluation {
    use super::common::*;

    use fortune_core::engine::{FortuneDomain, FortuneTier, ScoreSource};

    #[test]
    fn face_reading_scores_groups_and_aggregates() {
        let evaluation = face_engine()
            .evaluate(FortuneDomain::Face, &face_vector())
            .expect("catalog available");

        assert_eq!(evaluation.groups.len(), 2);

        // 命宫: +10 (>= 0.90) and the wildcard +2 both match → raw 6 → 80.
        let life = &evaluation.groups[0];
        assert_eq!(life.group_key, "命宫");
        assert_eq!(life.result.matched_rule_count, 2);
        assert_eq!(life.result.normalized_score, 80);
        assert_eq!(life.result.tier, FortuneTier::Auspicious);

        // 财帛宫: only the +6 nose-bridge rule matches → raw 6 → 80.
        let wealth = &evaluation.groups[1];
        assert_eq!(wealth.result.matched_rule_count, 1);
        assert_eq!(wealth.result.normalized_score, 80);
        assert_eq!(wealth.result.source, ScoreSource::MatchedRules);

        // Both groups are primary for the face domain; overall stays 80.
        assert_eq!(evaluation.aggregate.overall_score, 80);
        assert_eq!(evaluation.aggregate.overall_tier, FortuneTier::Auspicious);
        assert!(evaluation.composites.is_none());
    }

    #[test]
    fn cached_engine_produces_the_same_reading() {
        let direct = face_engine()
            .evaluate(FortuneDomain::Face, &face_vector())
            .expect("catalog available");
        let cached = cached_engine()
            .evaluate(FortuneDomain::Face, &face_vector())
            .expect("catalog available");
        assert_eq!(direct, cached);
    }

    #[test]
    fn view_carries_labels_for_report_rendering() {
        let evaluation = face_engine()
            .evaluate(FortuneDomain::Face, &face_vector())
            .expect("catalog available");
        let view = evaluation.view();
        assert_eq!(view.domain_label, "face");
        assert_eq!(view.aggregate.overall_tier_label, "auspicious");
        assert_eq!(view.groups.len(), 2);
        assert_eq!(view.aggregate.tier_histogram.len(), 6);
    }

    #[test]
    fn room_reading_attaches_composites() {
        use fortune_core::catalog::StaticRuleCatalog;
        use fortune_core::engine::{FeatureVector, FortuneEngine};
        use std::sync::Arc;

        let provider =
            StaticRuleCatalog::new().with_rules(FortuneDomain::Room, vec![wildcard_rule()]);
        let engine = FortuneEngine::new(Arc::new(provider));

        let mut vector = FeatureVector::new();
        vector.insert("客厅", "整洁度", 0.85);
        vector.insert("客厅", "亮度", 0.9);
        vector.insert("客厅", "朝向", "东南");

        let evaluation = engine
            .evaluate(FortuneDomain::Room, &vector)
            .expect("catalog available");
        assert_eq!(evaluation.groups[0].result.matched_rule_count, 1);
        let composites = evaluation.composites.expect("room composites computed");
        assert_eq!(composites.elemental_balance.readings.len(), 5);
        assert_eq!(composites.positions.len(), 3);
        let energy = composites
            .directional_energy
            .expect("东南 parses to a trigram");
        assert_eq!(energy.direction.trigram(), "巽");
        assert_eq!(energy.energy_score, 50);
    }
}

mod routing {
    use super::common::*;
    use std::sync::Arc;

    use axum::body::{to_bytes, Body};
    use axum::http::{Request, StatusCode};
    use fortune_core::catalog::{CatalogError, RuleCatalogProvider, StaticRuleCatalog};
    use fortune_core::engine::{ConditionRule, FortuneDomain, FortuneEngine};
    use fortune_core::fortune_router;
    use serde_json::Value;
    use tower::ServiceExt;

    fn build_router() -> axum::Router {
        let provider = StaticRuleCatalog::new().with_rules(FortuneDomain::Face, face_rules());
        fortune_router(Arc::new(FortuneEngine::new(Arc::new(provider))))
    }

    struct OfflineCatalog;

    impl RuleCatalogProvider for OfflineCatalog {
        fn rules(&self, _domain: FortuneDomain) -> Result<Vec<ConditionRule>, CatalogError> {
            Err(CatalogError::Unavailable("rules table offline".to_string()))
        }
    }

    #[tokio::test]
    async fn post_evaluate_returns_the_reading_view() {
        let router = build_router();
        let request = Request::builder()
            .method("POST")
            .uri("/api/v1/fortune/face/evaluate")
            .header("content-type", "application/json")
            .body(Body::from(
                serde_json::to_vec(&face_vector()).expect("serialize vector"),
            ))
            .expect("request");

        let response = router.oneshot(request).await.expect("router dispatch");
        assert_eq!(response.status(), StatusCode::OK);

        let body = to_bytes(response.into_body(), 1024 * 1024)
            .await
            .expect("body");
        let payload: Value = serde_json::from_slice(&body).expect("json");
        assert_eq!(payload.get("domain"), Some(&Value::from("face")));
        assert_eq!(
            payload
                .pointer("/aggregate/overall_score")
                .and_then(Value::as_u64),
            Some(80),
        );
        assert_eq!(
            payload
                .get("groups")
                .and_then(Value::as_array)
                .map(Vec::len),
            Some(2),
        );
    }

    #[tokio::test]
    async fn unknown_domain_is_not_found() {
        let router = build_router();
        let request = Request::builder()
            .method("POST")
            .uri("/api/v1/fortune/tarot/evaluate")
            .header("content-type", "application/json")
            .body(Body::from("[]"))
            .expect("request");

        let response = router.oneshot(request).await.expect("router dispatch");
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn catalog_outage_maps_to_service_unavailable() {
        let router = fortune_router(Arc::new(FortuneEngine::new(Arc::new(OfflineCatalog))));
        let request = Request::builder()
            .method("POST")
            .uri("/api/v1/fortune/face/evaluate")
            .header("content-type", "application/json")
            .body(Body::from("[]"))
            .expect("request");

        let response = router.oneshot(request).await.expect("router dispatch");
        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);

        let body = to_bytes(response.into_body(), 1024).await.expect("body");
        let payload: Value = serde_json::from_slice(&body).expect("json");
        assert_eq!(
            payload.get("error").and_then(Value::as_str),
            Some("rule catalog unavailable"),
        );
    }
}
