use serde::Serialize;

use crate::engine::{
    AggregateResult, AuspiciousPosition, Direction, Element, Evaluation, FortuneDomain,
    FortuneTier, GroupAssessment, RoomComposites, ScoreSource,
};

#[derive(Debug, Clone, Serialize)]
pub struct GroupView {
    pub group: String,
    pub score: u8,
    pub tier: FortuneTier,
    pub tier_label: &'static str,
    pub source: ScoreSource,
    pub matched_rule_count: usize,
    pub positive_count: usize,
    pub negative_count: usize,
    pub interpretations: Vec<String>,
    pub categories: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub remedies: Vec<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct StandingView {
    pub group: String,
    pub score: u8,
}

#[derive(Debug, Clone, Serialize)]
pub struct TierBucketView {
    pub tier: FortuneTier,
    pub tier_label: &'static str,
    pub count: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct AggregateView {
    pub overall_score: u8,
    pub overall_tier: FortuneTier,
    pub overall_tier_label: &'static str,
    pub group_count: usize,
    pub top_groups: Vec<StandingView>,
    pub bottom_groups: Vec<StandingView>,
    pub tier_histogram: Vec<TierBucketView>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ElementView {
    pub element: Element,
    pub element_label: &'static str,
    pub proportion: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct BalanceView {
    pub balance_score: u8,
    pub readings: Vec<ElementView>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub callout: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct DirectionView {
    pub direction: Direction,
    pub direction_label: &'static str,
    pub trigram: &'static str,
    pub element: Element,
    pub element_label: &'static str,
    pub energy_score: u8,
    pub summary: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct PositionView {
    pub position: AuspiciousPosition,
    pub position_label: &'static str,
    pub score: u8,
    pub verdict: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct CompositesView {
    pub elemental_balance: BalanceView,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub directional_energy: Option<DirectionView>,
    pub positions: Vec<PositionView>,
}

/// The full serializable reading handed to report collaborators.
#[derive(Debug, Clone, Serialize)]
pub struct EvaluationView {
    pub domain: FortuneDomain,
    pub domain_label: &'static str,
    pub groups: Vec<GroupView>,
    pub aggregate: AggregateView,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub composites: Option<CompositesView>,
}

impl Evaluation {
    pub fn view(&self) -> EvaluationView {
        EvaluationView {
            domain: self.domain,
            domain_label: self.domain.label(),
            groups: self.groups.iter().map(group_view).collect(),
            aggregate: aggregate_view(&self.aggregate),
            composites: self.composites.as_ref().map(composites_view),
        }
    }
}

fn group_view(assessment: &GroupAssessment) -> GroupView {
    GroupView {
        group: assessment.group_key.clone(),
        score: assessment.result.normalized_score,
        tier: assessment.result.tier,
        tier_label: assessment.result.tier.label(),
        source: assessment.result.source,
        matched_rule_count: assessment.result.matched_rule_count,
        positive_count: assessment.result.positive_count,
        negative_count: assessment.result.negative_count,
        interpretations: assessment.result.interpretations.clone(),
        categories: assessment.result.categories.clone(),
        remedies: assessment.result.remedies.clone(),
    }
}

fn aggregate_view(aggregate: &AggregateResult) -> AggregateView {
    AggregateView {
        overall_score: aggregate.overall_score,
        overall_tier: aggregate.overall_tier,
        overall_tier_label: aggregate.overall_tier.label(),
        group_count: aggregate.group_count,
        top_groups: aggregate
            .top_groups
            .iter()
            .map(|entry| StandingView {
                group: entry.group_key.clone(),
                score: entry.score,
            })
            .collect(),
        bottom_groups: aggregate
            .bottom_groups
            .iter()
            .map(|entry| StandingView {
                group: entry.group_key.clone(),
                score: entry.score,
            })
            .collect(),
        tier_histogram: aggregate
            .tier_histogram
            .iter()
            .map(|bucket| TierBucketView {
                tier: bucket.tier,
                tier_label: bucket.tier.label(),
                count: bucket.count,
            })
            .collect(),
    }
}

fn composites_view(composites: &RoomComposites) -> CompositesView {
    CompositesView {
        elemental_balance: BalanceView {
            balance_score: composites.elemental_balance.balance_score,
            readings: composites
                .elemental_balance
                .readings
                .iter()
                .map(|reading| ElementView {
                    element: reading.element,
                    element_label: reading.element.label(),
                    proportion: reading.proportion,
                })
                .collect(),
            callout: composites.elemental_balance.callout.as_ref().map(|callout| {
                format!(
                    "{}气偏旺，{}气偏弱，五行差距{:.2}，宜补{}泄{}。",
                    callout.strongest.label(),
                    callout.weakest.label(),
                    callout.spread,
                    callout.weakest.label(),
                    callout.strongest.label(),
                )
            }),
        },
        directional_energy: composites.directional_energy.as_ref().map(|energy| {
            DirectionView {
                direction: energy.direction,
                direction_label: energy.direction.label(),
                trigram: energy.direction.trigram(),
                element: energy.element,
                element_label: energy.element.label(),
                energy_score: energy.energy_score,
                summary: energy.summary.clone(),
            }
        }),
        positions: composites
            .positions
            .iter()
            .map(|position| PositionView {
                position: position.position,
                position_label: position.position.label(),
                score: position.score,
                verdict: position.verdict.clone(),
            })
            .collect(),
    }
}
