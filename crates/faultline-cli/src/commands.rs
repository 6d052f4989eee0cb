//! CLI command implementations.

use anyhow::{bail, Context, Result};
use colored::Colorize;
use faultline_core::{config::CONFIG_DIR, normalize_path, AnalysisConfig, SourceExtractor};
use faultline_graph::{CheckStatus, StructureReport, SubReport};
use faultline_oracle::{ChatOracle, SemanticOracle};
use faultline_session::{AnalysisSession, BuildSummary, FileSnapshot};
use ignore::WalkBuilder;
use indicatif::{ProgressBar, ProgressStyle};
use std::fs;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

/// Initialize Faultline in a directory.
pub fn init(path: &Path) -> Result<()> {
    let config_path = AnalysisConfig::path_for(path);

    if config_path.exists() {
        println!("{} Already initialized", "✓".green());
        return Ok(());
    }

    fs::create_dir_all(path.join(CONFIG_DIR))?;
    let config = AnalysisConfig::default();
    fs::write(&config_path, serde_json::to_string_pretty(&config)?)?;

    println!("{} Initialized Faultline in {}", "✓".green(), path.display());
    println!("  Run {} to index your codebase", "faultline index".cyan());

    Ok(())
}

/// Index a directory and build the code graph.
pub async fn index(path: &Path, output: Option<&Path>, use_oracle: bool) -> Result<()> {
    let session = build_session(path, use_oracle).await?;
    let summary = session.last_build().await?;

    print_summary(&summary);

    if let Some(out_path) = output {
        write_export(&session, out_path).await?;
    }

    Ok(())
}

/// Report structural smells.
pub async fn audit(path: &Path, json: bool, use_oracle: bool) -> Result<()> {
    let session = build_session(path, use_oracle).await?;
    let report = session.structure_report().await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    print_summary(&session.last_build().await?);
    println!();
    print_report(&report);
    Ok(())
}

/// Show the blast radius of changing a file.
pub async fn impact(path: &Path, file: &str, json: bool, use_oracle: bool) -> Result<()> {
    let session = build_session(path, use_oracle).await?;
    let target = normalize_path(file);
    let radius = session.blast_radius(&target).await?;

    if radius.matched.is_empty() {
        warn!("'{}' matched no nodes in the graph", target);
    }

    if json {
        println!("{}", serde_json::to_string_pretty(&radius)?);
        return Ok(());
    }

    println!("{}", "⚠️  Blast Radius".yellow().bold());
    println!(
        "Target: {} ({} nodes)",
        radius.target.cyan(),
        radius.matched.len()
    );
    println!();

    if radius.is_empty() {
        println!("{} No files depend directly on this one", "✓".green());
        return Ok(());
    }

    println!(
        "{} files depend directly on it:",
        radius.dependents.len().to_string().red().bold()
    );
    for (dependent, relations) in &radius.dependents {
        let via: Vec<String> = relations.iter().map(|r| r.to_string()).collect();
        println!("  • {} {}", dependent, format!("via {}", via.join(", ")).dimmed());
    }

    Ok(())
}

/// Export the graph to JSON.
pub async fn export(path: &Path, output: &Path, use_oracle: bool) -> Result<()> {
    let session = build_session(path, use_oracle).await?;
    write_export(&session, output).await
}

async fn build_session(path: &Path, use_oracle: bool) -> Result<AnalysisSession> {
    let config = AnalysisConfig::load_or_default(path);
    let oracle = if use_oracle { oracle_from_env() } else { None };

    println!("{}", "Indexing codebase...".cyan());
    let spinner = ProgressBar::new_spinner();
    spinner.set_style(ProgressStyle::default_spinner().template("{spinner:.cyan} {msg}")?);
    spinner.enable_steady_tick(Duration::from_millis(80));
    spinner.set_message("Scanning files...");

    let snapshot = load_snapshot(path, &config)?;

    spinner.set_message(format!("Building graph from {} files...", snapshot.len()));
    let session = AnalysisSession::new(config, oracle);
    let result = session.build(snapshot).await;

    spinner.finish_and_clear();
    result?;
    Ok(session)
}

fn oracle_from_env() -> Option<Arc<dyn SemanticOracle>> {
    match ChatOracle::from_env() {
        Ok(oracle) => {
            debug!("Semantic oracle: {}", oracle.model());
            Some(Arc::new(oracle))
        }
        Err(e) => {
            debug!("Semantic oracle disabled: {}", e);
            None
        }
    }
}

/// Reads every accepted file under `root`, honouring `.gitignore`.
pub fn load_snapshot(root: &Path, config: &AnalysisConfig) -> Result<FileSnapshot> {
    if !root.is_dir() {
        bail!("{} is not a directory", root.display());
    }

    let extractor = SourceExtractor::new(&config.extraction);
    let mut snapshot = FileSnapshot::new();

    let walker = WalkBuilder::new(root).hidden(true).git_ignore(true).build();

    for entry in walker.flatten() {
        let file_path = entry.path();
        if file_path.is_dir() {
            continue;
        }

        let relative = file_path.strip_prefix(root).unwrap_or(file_path);
        let relative = normalize_path(&relative.to_string_lossy());
        if !extractor.accepts(&relative) {
            continue;
        }

        match fs::read_to_string(file_path) {
            Ok(content) => snapshot.insert(&relative, content),
            Err(e) => debug!("Skipping {}: {}", relative, e),
        }
    }

    Ok(snapshot)
}

async fn write_export(session: &AnalysisSession, path: &Path) -> Result<()> {
    let export = session.export().await?;
    let json = export.to_json()?;
    fs::write(path, json).with_context(|| format!("writing {}", path.display()))?;
    println!("{} Exported to {}", "✓".green(), path.display());
    Ok(())
}

fn print_summary(summary: &BuildSummary) {
    println!(
        "{} Indexed {} files ({} nodes, {} edges) in {}ms",
        "✓".green(),
        summary.files.to_string().cyan(),
        summary.nodes.to_string().cyan(),
        summary.edges.to_string().cyan(),
        summary.duration_ms
    );

    if summary.lexical_files > 0 {
        println!(
            "  {} files read by pattern matching",
            summary.lexical_files.to_string().yellow()
        );
    }
    if summary.parse_failures > 0 {
        println!(
            "{} {} files with parse errors contributed no definitions",
            "⚠".yellow(),
            summary.parse_failures
        );
    }
    if summary.oracle_used {
        println!(
            "  Oracle: {} edges added, {} candidates dropped",
            summary.augmentation.added, summary.augmentation.dropped
        );
    }
}

fn print_report(report: &StructureReport) {
    println!("{}", "Structure".cyan().bold());

    print_section("Cycles", &report.cycles, |cycle| {
        let mut path = cycle.nodes.join(" → ");
        if let Some(first) = cycle.nodes.first() {
            path.push_str(" → ");
            path.push_str(first);
        }
        path
    });
    print_section("Hubs", &report.hubs, |hub| {
        format!("{} ({}, degree {})", hub.id, hub.kind, hub.degree)
    });
    print_section("Orphans", &report.orphans, |orphan| {
        format!("{} ({})", orphan.id, orphan.kind)
    });
    print_section("Redundant API clients", &report.redundancy, |cluster| {
        format!(
            "{} all call {}",
            cluster.members.join(", "),
            cluster.endpoints.join(", ")
        )
    });
}

fn print_section<T>(title: &str, section: &SubReport<T>, describe: impl Fn(&T) -> String) {
    match &section.status {
        CheckStatus::Completed if section.findings.is_empty() => {
            println!("  {} {}: none", "✓".green(), title);
        }
        CheckStatus::Completed => {
            println!(
                "  {} {}: {}{}",
                "⚠".yellow(),
                title,
                section.findings.len().to_string().yellow(),
                if section.truncated { " (truncated)" } else { "" }
            );
            for finding in section.findings.iter().take(10) {
                println!("      {}", describe(finding));
            }
            if section.findings.len() > 10 {
                println!("      ... and {} more", section.findings.len() - 10);
            }
        }
        status => {
            println!("  {} {}: {}", "✗".dimmed(), title, status.to_string().dimmed());
        }
    }
}
