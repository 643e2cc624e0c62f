use axum::extract::State;
use axum::http::{header, StatusCode};
use axum::response::IntoResponse;
use axum::routing::get;
use axum::{Json, Router};
use axum_prometheus::PrometheusMetricLayer;
use chrono::Local;
use clap::{Args, Parser, Subcommand};
use fortune_core::catalog::{CatalogCache, CsvRuleCatalog};
use fortune_core::config::AppConfig;
use fortune_core::engine::{Evaluation, FeatureVector, FortuneDomain, FortuneEngine};
use fortune_core::error::AppError;
use fortune_core::{fortune_router, telemetry};
use metrics_exporter_prometheus::PrometheusHandle;
use serde_json::json;
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::info;

#[derive(Clone)]
struct AppState {
    readiness: Arc<AtomicBool>,
    metrics: PrometheusHandle,
}

#[derive(Parser, Debug)]
#[command(
    name = "Fortune Reading Engine",
    about = "Score face, palm, and room readings against the seeded rule catalogs",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Start the HTTP service (default command)
    Serve(ServeArgs),
    /// Evaluate a feature-vector JSON file and print the reading
    Evaluate(EvaluateArgs),
}

#[derive(Args, Debug, Default)]
struct ServeArgs {
    /// Override the configured host for the HTTP server
    #[arg(long)]
    host: Option<String>,
    /// Override the configured port for the HTTP server
    #[arg(long)]
    port: Option<u16>,
}

#[derive(Args, Debug)]
struct EvaluateArgs {
    /// Reading domain: face, palm, or room
    #[arg(long, value_parser = parse_domain)]
    domain: FortuneDomain,
    /// Path to the extractor output (JSON feature vector)
    #[arg(long)]
    features: PathBuf,
    /// Directory holding the per-domain rule CSVs (defaults to APP_RULES_DIR)
    #[arg(long)]
    rules: Option<PathBuf>,
    /// How many groups to list in the top/bottom standings
    #[arg(long)]
    standings: Option<usize>,
}

#[tokio::main]
async fn main() {
    if let Err(err) = run_cli().await {
        eprintln!("application error: {err}");
        std::process::exit(1);
    }
}

async fn run_cli() -> Result<(), AppError> {
    let cli = Cli::parse();
    let command = cli
        .command
        .unwrap_or_else(|| Command::Serve(ServeArgs::default()));

    match command {
        Command::Serve(args) => run_server(args).await,
        Command::Evaluate(args) => run_evaluate(args),
    }
}

fn parse_domain(raw: &str) -> Result<FortuneDomain, String> {
    FortuneDomain::parse(raw)
        .ok_or_else(|| format!("'{raw}' is not a fortune domain (face, palm, room)"))
}

async fn run_server(mut args: ServeArgs) -> Result<(), AppError> {
    let mut config = AppConfig::load()?;

    if let Some(host) = args.host.take() {
        config.server.host = host;
    }
    if let Some(port) = args.port.take() {
        config.server.port = port;
    }

    telemetry::init(&config.telemetry)?;

    let catalog = CatalogCache::new(CsvRuleCatalog::new(config.rules.dir.clone()));
    let engine = Arc::new(FortuneEngine::new(Arc::new(catalog)));

    let (prometheus_layer, prometheus_handle) = PrometheusMetricLayer::pair();
    let readiness_flag = Arc::new(AtomicBool::new(false));
    let state = AppState {
        readiness: readiness_flag.clone(),
        metrics: prometheus_handle,
    };

    let app = Router::new()
        .route("/health", get(healthcheck))
        .route("/ready", get(readiness_endpoint))
        .route("/metrics", get(metrics_endpoint))
        .with_state(state)
        .merge(fortune_router(engine))
        .layer(prometheus_layer);

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    readiness_flag.store(true, Ordering::Release);

    info!(?config.environment, %addr, "fortune reading engine ready");

    axum::serve(listener, app).await?;
    Ok(())
}

fn run_evaluate(args: EvaluateArgs) -> Result<(), AppError> {
    let EvaluateArgs {
        domain,
        features,
        rules,
        standings,
    } = args;

    let rules_dir = match rules {
        Some(dir) => dir,
        None => AppConfig::load()?.rules.dir,
    };

    let raw = std::fs::read_to_string(&features)?;
    let vector: FeatureVector = serde_json::from_str(&raw).map_err(|err| {
        std::io::Error::new(
            std::io::ErrorKind::InvalidData,
            format!("{}: {err}", features.display()),
        )
    })?;

    let provider = Arc::new(CsvRuleCatalog::new(rules_dir));
    let mut engine = FortuneEngine::new(provider);
    if let Some(standings) = standings {
        engine = engine.with_standings(standings);
    }

    let evaluation = engine.evaluate(domain, &vector)?;
    render_reading(&evaluation);
    Ok(())
}

async fn healthcheck() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok" }))
}

async fn readiness_endpoint(State(state): State<AppState>) -> impl IntoResponse {
    let ready = state.readiness.load(Ordering::Relaxed);
    let status = if ready {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    let payload = if ready {
        json!({ "status": "ready" })
    } else {
        json!({ "status": "initializing" })
    };

    (status, Json(payload))
}

async fn metrics_endpoint(State(state): State<AppState>) -> impl IntoResponse {
    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
        state.metrics.render(),
    )
}

fn render_reading(evaluation: &Evaluation) {
    let view = evaluation.view();
    let today = Local::now().date_naive();

    println!("Fortune reading: {} (evaluated {today})", view.domain_label);
    println!(
        "Overall: {} / 100 ({})",
        view.aggregate.overall_score, view.aggregate.overall_tier_label
    );

    println!("\nGroups");
    for group in &view.groups {
        println!(
            "- {}: {} ({}), {} rule(s) matched",
            group.group, group.score, group.tier_label, group.matched_rule_count
        );
        for interpretation in &group.interpretations {
            println!("    {interpretation}");
        }
        for remedy in &group.remedies {
            println!("    建议: {remedy}");
        }
    }

    if !view.aggregate.top_groups.is_empty() {
        println!("\nStrongest groups");
        for entry in &view.aggregate.top_groups {
            println!("- {}: {}", entry.group, entry.score);
        }
        println!("\nWeakest groups");
        for entry in &view.aggregate.bottom_groups {
            println!("- {}: {}", entry.group, entry.score);
        }
    }

    println!("\nTier distribution");
    for bucket in &view.aggregate.tier_histogram {
        println!("- {}: {}", bucket.tier_label, bucket.count);
    }

    if let Some(composites) = &view.composites {
        println!(
            "\nElemental balance: {} / 100",
            composites.elemental_balance.balance_score
        );
        for reading in &composites.elemental_balance.readings {
            println!("- {}: {:.2}", reading.element_label, reading.proportion);
        }
        if let Some(callout) = &composites.elemental_balance.callout {
            println!("  {callout}");
        }

        if let Some(energy) = &composites.directional_energy {
            println!(
                "\nDirectional energy: 朝{} ({}卦, {}) {} / 100",
                energy.direction_label, energy.trigram, energy.element_label, energy.energy_score
            );
            println!("  {}", energy.summary);
        }

        println!("\nAuspicious positions");
        for position in &composites.positions {
            println!(
                "- {}: {} / 100\n    {}",
                position.position_label, position.score, position.verdict
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // The prometheus recorder is process-global, so build it once.
    fn metrics_handle() -> PrometheusHandle {
        use std::sync::OnceLock;
        static HANDLE: OnceLock<PrometheusHandle> = OnceLock::new();
        HANDLE
            .get_or_init(|| {
                let (_layer, handle) = PrometheusMetricLayer::pair();
                handle
            })
            .clone()
    }

    fn test_state(ready: bool) -> AppState {
        AppState {
            readiness: Arc::new(AtomicBool::new(ready)),
            metrics: metrics_handle(),
        }
    }

    #[tokio::test]
    async fn healthcheck_reports_ok() {
        let Json(body) = healthcheck().await;
        assert_eq!(body.get("status"), Some(&json!("ok")));
    }

    #[tokio::test]
    async fn readiness_flips_with_the_flag() {
        let response = readiness_endpoint(State(test_state(false)))
            .await
            .into_response();
        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);

        let response = readiness_endpoint(State(test_state(true)))
            .await
            .into_response();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[test]
    fn domain_argument_parses_known_values() {
        assert_eq!(parse_domain("face"), Ok(FortuneDomain::Face));
        assert_eq!(parse_domain("Room"), Ok(FortuneDomain::Room));
        assert!(parse_domain("tea-leaves").is_err());
    }
}
