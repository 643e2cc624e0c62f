//! Serializable view structs for downstream report rendering.

pub mod views;

pub use views::{
    AggregateView, BalanceView, CompositesView, DirectionView, ElementView, EvaluationView,
    GroupView, PositionView, StandingView, TierBucketView,
};
