//! Credit score CLI module
//!
//! Command-line entry points for the three pipeline stages: import, train
//! and serve.

use clap::{Parser, Subcommand};
use colored::*;
use std::io::Write;
use std::path::PathBuf;
use std::time::Instant;

use crate::config::PipelineConfig;
use crate::export::ArtifactBundle;
use crate::ingestion::import_customers;
use crate::storage::CustomerStore;
use crate::training::{ClassifierKind, TrainEngine, TrainingConfig, TrainingReport};

// ─── Styling helpers ───────────────────────────────────────────────────────────

const W: usize = 58; // box inner width

fn dim(s: &str) -> ColoredString   { s.truecolor(100, 100, 100) }
fn accent(s: &str) -> ColoredString { s.truecolor(120, 170, 255) }
fn muted(s: &str) -> ColoredString  { s.truecolor(140, 140, 140) }
fn ok(s: &str) -> ColoredString     { s.truecolor(100, 210, 120) }

fn line_box_top()    { println!("  {}", dim("┌─────────────────────────────────────────────────────────┐")); }
fn line_box_bottom() { println!("  {}", dim("└─────────────────────────────────────────────────────────┘")); }
fn line_box_sep()    { println!("  {}", dim("├─────────────────────────────────────────────────────────┤")); }

fn line_box(content: &str) {
    let visible_len = strip_ansi(content).chars().count();
    let pad = W.saturating_sub(visible_len);
    println!("  {}  {}{} {}", dim("│"), content, " ".repeat(pad), dim("│"));
}

fn line_box_center(content: &str) {
    let visible_len = strip_ansi(content).chars().count();
    let total_pad = W.saturating_sub(visible_len);
    let left = total_pad / 2;
    let right = total_pad - left;
    println!("  {}  {}{}{} {}", dim("│"), " ".repeat(left), content, " ".repeat(right), dim("│"));
}

fn line_box_empty() { line_box(""); }

fn strip_ansi(s: &str) -> String {
    let mut out = String::new();
    let mut in_escape = false;
    for c in s.chars() {
        if c == '\x1b' { in_escape = true; continue; }
        if in_escape { if c == 'm' { in_escape = false; } continue; }
        out.push(c);
    }
    out
}

fn kv(key: &str, val: &str) -> String {
    format!("{} {}", muted(key), val.white())
}

fn step_ok(msg: &str) {
    println!("  {} {}", ok("✓"), msg);
}

fn step_run(msg: &str) {
    print!("  {} {}... ", accent("›"), msg);
    let _ = std::io::stdout().flush();
}

fn step_done(detail: &str) {
    println!("{} {}", ok("done"), dim(detail));
}

fn section(title: &str) {
    println!();
    println!("  {}", title.white().bold());
    println!("  {}", dim(&"─".repeat(56)));
}

// ─── CLI definition ────────────────────────────────────────────────────────────

#[derive(Parser)]
#[command(name = "credit-score")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Customer credit score pipeline: import, train and serve")]
#[command(long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Load the customer CSV into the database, replacing the table
    Import {
        /// Source CSV file
        #[arg(short, long, env = "SOURCE_CSV")]
        csv: Option<PathBuf>,

        /// Database connection string
        #[arg(long, env = "DATABASE_URL")]
        database_url: Option<String>,

        /// Destination table
        #[arg(short, long, env = "CUSTOMER_TABLE")]
        table: Option<String>,
    },

    /// Train both classifiers and persist the better one
    Train {
        /// Database connection string
        #[arg(long, env = "DATABASE_URL")]
        database_url: Option<String>,

        /// Source table
        #[arg(short, long, env = "CUSTOMER_TABLE")]
        table: Option<String>,

        /// Artifact output directory
        #[arg(short, long, env = "MODELS_DIR")]
        models_dir: Option<PathBuf>,

        /// Target column name
        #[arg(long, default_value = "score_credito")]
        target: String,

        /// Trees in the random forest
        #[arg(long, default_value = "100")]
        n_estimators: usize,

        /// Neighbors consulted by KNN
        #[arg(long, default_value = "5")]
        n_neighbors: usize,

        /// Seed for the split and the forest
        #[arg(long, default_value = "42")]
        seed: u64,
    },

    /// Start the prediction server
    Serve {
        /// Server port
        #[arg(short, long, env = "API_PORT")]
        port: Option<u16>,

        /// Server host
        #[arg(long, env = "API_HOST")]
        host: Option<String>,

        /// Artifact directory
        #[arg(short, long, env = "MODELS_DIR")]
        models_dir: Option<PathBuf>,
    },
}

fn pipeline_config(
    database_url: Option<String>,
    table: Option<String>,
    csv: Option<PathBuf>,
    models_dir: Option<PathBuf>,
) -> PipelineConfig {
    let mut config = PipelineConfig::default();
    if let Some(url) = database_url {
        config = config.with_database_url(url);
    }
    if let Some(table) = table {
        config = config.with_customer_table(table);
    }
    if let Some(csv) = csv {
        config = config.with_source_csv(csv);
    }
    if let Some(dir) = models_dir {
        config = config.with_models_dir(dir);
    }
    config
}

// ─── Commands ──────────────────────────────────────────────────────────────────

pub async fn cmd_import(
    csv: Option<PathBuf>,
    database_url: Option<String>,
    table: Option<String>,
) -> anyhow::Result<()> {
    let config = pipeline_config(database_url, table, csv, None);
    section("Import");

    step_run(&format!("Loading {}", config.source_csv.display()));
    let summary = import_customers(&config).await?;
    step_done(&format!("{:.2}s", summary.elapsed_secs));

    step_ok(&format!(
        "{} rows × {} cols written to table {}",
        summary.rows,
        summary.columns,
        summary.table.cyan()
    ));
    println!();
    Ok(())
}

pub async fn cmd_train(
    database_url: Option<String>,
    table: Option<String>,
    models_dir: Option<PathBuf>,
    training: TrainingConfig,
) -> anyhow::Result<()> {
    let config = pipeline_config(database_url, table, None, models_dir);
    section("Train");

    step_run(&format!("Reading table {}", config.customer_table));
    let start = Instant::now();
    let store = CustomerStore::connect(&config.database_url).await?;
    let df = store.read_table(&config.customer_table).await?;
    step_done(&format!("{} rows × {} cols in {:?}", df.height(), df.width(), start.elapsed()));

    step_run("Training random forest and KNN");
    let engine = TrainEngine::new(training);
    let outcome = tokio::task::spawn_blocking(move || engine.train(&df)).await??;
    step_done(&format!("{:.2}s", outcome.report.training_time_secs));

    step_run(&format!("Saving artifacts to {}", config.models_dir.display()));
    outcome.bundle.save(&config.models_dir)?;
    step_done(&outcome.bundle.header.run_id);

    print_report(&outcome.report, &outcome.bundle);
    Ok(())
}

fn print_report(report: &TrainingReport, bundle: &ArtifactBundle) {
    section("Results");
    println!("  {:<18} {}", muted("Rows"), format!("{} ({} train / {} test)", report.n_samples, report.n_train, report.n_test).white());
    println!("  {:<18} {}", muted("Features"), report.n_features.to_string().white());
    println!("  {:<18} {}", muted("Random forest"), format!("{:.4}", report.forest_accuracy).white().bold());
    println!("  {:<18} {}", muted("KNN"), format!("{:.4}", report.knn_accuracy).white().bold());
    println!("  {:<18} {}", muted("Selected"), report.selected.to_string().green().bold());
    println!("  {:<18} {}", muted("Classes"), report.classes.join(", ").white());

    if show_top_features(report) {
        section("Top features");
        for feature in &report.top_features {
            println!("  {:<28} {}", feature.feature, format!("{:.4}", feature.importance).white());
        }
    }

    println!();
    println!("  {} {}", muted("run"), dim(&bundle.header.run_id));
    println!();
}

/// Importances are only meaningful for the forest
fn show_top_features(report: &TrainingReport) -> bool {
    report.selected == ClassifierKind::RandomForest && !report.top_features.is_empty()
}

pub async fn cmd_serve(
    host: Option<String>,
    port: Option<u16>,
    models_dir: Option<PathBuf>,
) -> anyhow::Result<()> {
    use crate::server::{run_server, ServerConfig};

    let mut config = ServerConfig::default();
    if let Some(host) = host {
        config.host = host;
    }
    if let Some(port) = port {
        config.port = port;
    }
    if let Some(dir) = models_dir {
        config.models_dir = dir;
    }

    println!();
    line_box_top();
    line_box_empty();
    line_box_center(&format!("{}", "Credit Score API".white().bold()));
    line_box_center(&format!("{}", dim(&format!("v{}", env!("CARGO_PKG_VERSION")))));
    line_box_empty();
    line_box_sep();
    line_box_empty();
    line_box(&kv("Status ", &format!("GET  http://{}:{}/", config.host, config.port)));
    line_box(&kv("Predict", &format!("POST http://{}:{}/predict", config.host, config.port)));
    line_box(&kv("Models ", &config.models_dir.display().to_string()));
    line_box_empty();
    line_box_sep();
    line_box_empty();
    line_box_center(&format!("{}", dim("ctrl+c to stop")));
    line_box_empty();
    line_box_bottom();
    println!();

    run_server(config).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_train_flags() {
        let cli = Cli::try_parse_from([
            "credit-score", "train", "--table", "customers", "--n-estimators", "10",
        ])
        .unwrap();
        match cli.command {
            Commands::Train { table, n_estimators, n_neighbors, target, .. } => {
                assert_eq!(table.as_deref(), Some("customers"));
                assert_eq!(n_estimators, 10);
                assert_eq!(n_neighbors, 5);
                assert_eq!(target, "score_credito");
            }
            _ => panic!("expected train"),
        }
    }

    #[test]
    fn test_flags_override_config() {
        let config = pipeline_config(
            Some("sqlite::memory:".into()),
            Some("customers".into()),
            None,
            Some(PathBuf::from("/tmp/m")),
        );
        assert_eq!(config.database_url, "sqlite::memory:");
        assert_eq!(config.customer_table, "customers");
        assert_eq!(config.models_dir, PathBuf::from("/tmp/m"));
    }

    #[test]
    fn test_top_features_only_for_forest() {
        use crate::training::FeatureImportance;

        let mut report = TrainingReport {
            run_id: "run".to_string(),
            n_samples: 10,
            n_train: 7,
            n_test: 3,
            n_features: 2,
            forest_accuracy: 0.9,
            knn_accuracy: 0.5,
            selected: ClassifierKind::RandomForest,
            top_features: vec![FeatureImportance { feature: "idade".to_string(), importance: 1.0 }],
            classes: vec!["Good".to_string()],
            training_time_secs: 0.1,
        };
        assert!(show_top_features(&report));

        report.selected = ClassifierKind::KNearestNeighbors;
        assert!(!show_top_features(&report));
    }

    #[test]
    fn test_strip_ansi() {
        assert_eq!(strip_ansi("\x1b[1mbold\x1b[0m"), "bold");
    }
}
