//! Command-line front end: check a JSON layout for leaks.
//!
//! Usage:
//!   watertight level.json                       # optimistic check
//!   watertight level.json --strict              # settle per-node verdicts
//!   watertight level.json --write-normalized out.json
//!
//! Prints the JSON report to stdout. Exits 0 if the layout is watertight,
//! 1 if it leaks, 2 on usage, I/O or layout errors. Set `RUST_LOG` for
//! diagnostics.

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Context;
use clap::Parser;
use watertight_check::prelude::*;

#[derive(Parser, Debug)]
#[command(name = "watertight", version)]
#[command(about = "Check a room layout for leaks into the void")]
struct Args {
    /// Layout document (JSON)
    layout: PathBuf,

    /// Settle per-node verdicts to a fixed point after the walk
    #[arg(long)]
    strict: bool,

    /// Check the links as authored, without adding back-links
    #[arg(long)]
    no_normalize: bool,

    /// Write the layout after link normalization to this file
    #[arg(long, value_name = "OUT")]
    write_normalized: Option<PathBuf>,
}

impl Args {
    fn config(&self) -> CheckConfig {
        CheckConfig {
            memo_policy: if self.strict {
                MemoPolicy::Strict
            } else {
                MemoPolicy::Optimistic
            },
            normalize_links: !self.no_normalize,
        }
    }
}

fn run(args: &Args) -> anyhow::Result<bool> {
    let text = std::fs::read_to_string(&args.layout)
        .with_context(|| format!("reading {}", args.layout.display()))?;
    let layout = LayoutSnapshot::from_json(&text)
        .with_context(|| format!("parsing {}", args.layout.display()))?;
    tracing::info!(
        path = %args.layout.display(),
        nodes = layout.nodes.len(),
        hash = %layout.content_hash(),
        "loaded layout"
    );

    let checker = WatertightChecker::new(args.config());
    let mut log = DiagnosticLog::new();
    let (report, graph, root) = checker
        .check_layout(&layout, &mut log)
        .with_context(|| format!("loading {}", args.layout.display()))?;

    for diagnostic in log.entries() {
        match diagnostic.severity() {
            Severity::Error => tracing::error!(?diagnostic, "check diagnostic"),
            Severity::Warning => tracing::warn!(?diagnostic, "check diagnostic"),
            Severity::Info => tracing::debug!(?diagnostic, "check diagnostic"),
        }
    }

    if let Some(out) = &args.write_normalized {
        let normalized = graph.capture_layout(root)?;
        std::fs::write(out, normalized.to_json_pretty())
            .with_context(|| format!("writing {}", out.display()))?;
        tracing::info!(path = %out.display(), hash = %normalized.content_hash(), "wrote normalized layout");
    }

    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(report.watertight)
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    // Usage errors exit with clap's status 2.
    let args = Args::parse();
    match run(&args) {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::from(1),
        Err(e) => {
            eprintln!("error: {e:#}");
            ExitCode::from(2)
        }
    }
}
