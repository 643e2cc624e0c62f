//! Rule-based feature scoring for face, palm, and room fortune readings.
//!
//! Upstream extractors turn uploaded photos into named feature groups; this
//! crate matches those features against seeded condition rules, scores each
//! group, rolls the groups up into an overall reading, and computes the
//! room-only composite indices. HTTP and CLI surfaces live in the binary
//! crate; everything here is plain library code behind [`engine::FortuneEngine`].

pub mod catalog;
pub mod config;
pub mod engine;
pub mod error;
pub mod report;
pub mod router;
pub mod telemetry;

pub use catalog::{
    CatalogCache, CatalogError, CatalogSnapshot, CsvRuleCatalog, FeatureRegistry,
    RuleCatalogProvider, StaticRuleCatalog,
};
pub use engine::{
    AggregateResult, ConditionRule, Evaluation, EngineError, FeatureValue, FeatureVector,
    FortuneDomain, FortuneEngine, FortuneTier, GroupResult, Operand, Operator, RoomComposites,
    RuleScope, ScoreSource,
};
pub use error::AppError;
pub use report::EvaluationView;
pub use router::fortune_router;
