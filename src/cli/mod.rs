//! # CLI Module
//!
//! Command-line interface for Steam Muncher.
//!
//! ## Usage
//! ```bash
//! # List the drives that would be searched
//! muncher drives
//!
//! # Report orphaned manifests and ghost directories, change nothing
//! muncher scan
//! muncher scan --output json
//!
//! # Review and delete, one drive only
//! muncher clean --drive D:\
//!
//! # Treat directories under 8 KiB as ghosts, no prompts
//! muncher clean --threshold-kib 8 --yes
//! ```

use clap::{Args, Parser, Subcommand, ValueEnum};
use console::{style, Term};
use indicatif::{ProgressBar, ProgressStyle};
use std::fs;
use std::path::{Path, PathBuf};
use std::thread;
use std::time::Duration;
use steam_muncher::core::classifier::{GhostPolicy, ScrapPair};
use steam_muncher::core::drives::{list_drives, DriveEnumerator, FixedDrives};
use steam_muncher::core::library::{LibraryCache, LocatorConfig};
use steam_muncher::core::manifest::parse_install_dir;
use steam_muncher::core::pipeline::{LibrarySource, Pipeline, PipelineResult};
use steam_muncher::core::reconcile::{Offer, RemovalReport, Workflow};
use steam_muncher::error::{MuncherError, Result};
use steam_muncher::events::{
    null_sender, ClassifyEvent, Event, EventChannel, PipelineEvent,
};

/// Steam Muncher - clean up app manifests that point at nothing
#[derive(Parser, Debug)]
#[command(name = "muncher")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// List mounted drives
    Drives,
    /// Report unlinked manifests and ghost directories without deleting anything
    Scan {
        #[command(flatten)]
        scan: ScanArgs,

        /// Output format
        #[arg(short, long, default_value = "pretty")]
        output: OutputFormat,
    },
    /// Scan, review, and delete after confirmation
    Clean {
        #[command(flatten)]
        scan: ScanArgs,

        /// Delete without asking
        #[arg(short, long)]
        yes: bool,
    },
}

#[derive(Args, Debug)]
struct ScanArgs {
    /// Only search these drive roots (default: all mounted drives)
    #[arg(short, long = "drive")]
    drives: Vec<PathBuf>,

    /// Extra library suffix to probe under each drive, e.g. "Steam/steamapps"
    #[arg(short, long = "suffix")]
    suffixes: Vec<PathBuf>,

    /// Install directories holding less than this many KiB count as ghosts
    #[arg(short, long, default_value = "2")]
    threshold_kib: u64,

    /// Reuse the saved library list instead of probing drives again
    #[arg(long)]
    cached_libraries: bool,

    /// Library cache file; probed libraries are saved here. Without this or
    /// --cached-libraries no cache file is read or written
    #[arg(long)]
    library_cache: Option<PathBuf>,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum OutputFormat {
    /// Human-readable output with colors
    Pretty,
    /// JSON output for scripting
    Json,
    /// Minimal output (paths only)
    Minimal,
}

/// Run the CLI
pub fn run() -> Result<()> {
    let cli = Cli::parse();
    steam_muncher::init_tracing(if cli.verbose { "debug" } else { "warn" });

    match cli.command {
        Commands::Drives => run_drives(),
        Commands::Scan { scan, output } => run_scan(&scan, output),
        Commands::Clean { scan, yes } => run_clean(&scan, yes),
    }
}

fn run_drives() -> Result<()> {
    for drive in list_drives()? {
        println!("{}", drive);
    }
    Ok(())
}

fn build_pipeline(args: &ScanArgs) -> Result<Pipeline> {
    if args.threshold_kib == 0 {
        return Err(MuncherError::Config(
            "--threshold-kib must be at least 1".to_string(),
        ));
    }

    let mut builder = Pipeline::builder()
        .locator(LocatorConfig::default().with_extra_suffixes(args.suffixes.iter().cloned()))
        .ghost_policy(GhostPolicy::from_kib(args.threshold_kib))
        .library_source(if args.cached_libraries {
            LibrarySource::CachedOrProbe
        } else {
            LibrarySource::Probe
        });

    // The cache file is only touched when asked for.
    if args.cached_libraries || args.library_cache.is_some() {
        let cache_path = args
            .library_cache
            .clone()
            .unwrap_or_else(LibraryCache::default_path);
        builder = builder.library_cache(LibraryCache::new(cache_path));
    }

    if !args.drives.is_empty() {
        // Fail fast on a mistyped drive before any scanning.
        FixedDrives::new(args.drives.clone()).list_drives()?;
        builder = builder.only_drives(args.drives.clone());
    }

    Ok(builder.build())
}

/// Run the pipeline with a spinner on stderr
fn run_pipeline(pipeline: &Pipeline, show_progress: bool) -> Result<PipelineResult> {
    if !show_progress {
        return pipeline.run();
    }

    let (sender, receiver) = EventChannel::new();

    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.green} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner()),
    );
    pb.enable_steady_tick(Duration::from_millis(100));
    let pb_clone = pb.clone();

    // Handle events in a separate thread
    let event_thread = thread::spawn(move || {
        for event in receiver.iter() {
            match event {
                Event::Pipeline(PipelineEvent::PhaseChanged { phase }) => {
                    pb_clone.set_message(format!("{}", phase));
                }
                Event::Classify(ClassifyEvent::Progress(p)) => {
                    pb_clone.set_message(format!("Checking install directories {}/{}", p.completed + 1, p.total));
                }
                Event::Pipeline(PipelineEvent::Completed { .. })
                | Event::Pipeline(PipelineEvent::Error { .. }) => {
                    pb_clone.finish_and_clear();
                }
                _ => {}
            }
        }
    });

    let result = pipeline.run_with_events(&sender);

    // Drop sender to signal event thread to finish
    drop(sender);
    event_thread.join().ok();
    pb.finish_and_clear();

    result
}

fn run_scan(args: &ScanArgs, output: OutputFormat) -> Result<()> {
    let pipeline = build_pipeline(args)?;
    let result = run_pipeline(&pipeline, matches!(output, OutputFormat::Pretty))?;

    match output {
        OutputFormat::Pretty => {
            let term = Term::stdout();
            print_summary(&term, &result);
            print_findings(&term, &result);
            term.write_line(&format!(
                "{}",
                style("No files were deleted. Run `muncher clean` to remove them.").dim()
            ))
            .ok();
        }
        OutputFormat::Json => print_json_results(&result)?,
        OutputFormat::Minimal => print_minimal_results(&result),
    }

    Ok(())
}

fn run_clean(args: &ScanArgs, yes: bool) -> Result<()> {
    let pipeline = build_pipeline(args)?;
    let result = run_pipeline(&pipeline, true)?;
    let engine = pipeline.engine();
    let term = Term::stdout();

    print_summary(&term, &result);

    let mut flow = Workflow::new();
    match flow.scanned(&result.scan)? {
        Offer::Clean => {
            term.write_line(&format!(
                "  {} No unlinked manifests or ghost directories found!",
                style("✓").green().bold()
            ))
            .ok();
            return Ok(());
        }
        Offer::Unlinked(paths) => {
            let question = format!("{} unlinked manifest files were found. Review them?", paths.len());
            let shown = !yes && ask(&term, &question, true)?;
            if shown {
                for path in paths {
                    term.write_line(&format!("  {} ({})", path.display(), declared_dir(path)))
                        .ok();
                }
            }
            flow.review(shown)?;

            let confirmed = flow.confirm(yes || ask(&term, &format!("Delete {} unlinked manifests?", paths.len()), false)?)?;
            if confirmed {
                let report = engine.remove(paths, &null_sender());
                print_removal(&term, &report);
            } else {
                term.write_line("No changes were made.").ok();
            }
        }
        Offer::Scraps(pairs) => {
            let question = format!(
                "{} ghost install directories were found. Review them?",
                pairs.len()
            );
            let shown = !yes && ask(&term, &question, true)?;
            if shown {
                print_scraps(&term, pairs);
            }
            flow.review(shown)?;

            let prompt = format!(
                "Delete {} ghost directories and their manifests?",
                pairs.len()
            );
            if flow.confirm(yes || ask(&term, &prompt, false)?)? {
                let report = engine.remove_scraps(pairs, &null_sender());
                print_removal(&term, &report);
            } else {
                term.write_line("No changes were made.").ok();
            }
        }
    }

    flow.report()?;
    Ok(())
}

/// Yes/no prompt. Empty input picks the default.
fn ask(term: &Term, question: &str, default_yes: bool) -> Result<bool> {
    let hint = if default_yes { "(Y/n)" } else { "(y/N)" };
    term.write_line(&format!("{} {}", style(question).bold(), style(hint).dim()))
        .map_err(MuncherError::Terminal)?;

    let answer = term.read_line().map_err(MuncherError::Terminal)?;
    Ok(parse_answer(&answer, default_yes))
}

fn parse_answer(answer: &str, default_yes: bool) -> bool {
    match answer.trim().to_lowercase().as_str() {
        "" => default_yes,
        "y" | "yes" => true,
        _ => false,
    }
}

/// The `installdir` a manifest declares, for display
fn declared_dir(manifest: &Path) -> String {
    fs::read(manifest)
        .ok()
        .and_then(|bytes| parse_install_dir(&String::from_utf8_lossy(&bytes)))
        .unwrap_or_else(|| "?".to_string())
}

fn print_summary(term: &Term, result: &PipelineResult) {
    term.write_line(&format!(
        "{} {} Steam libraries on {} drives",
        style("Found").green().bold(),
        style(result.libraries.len()).bold(),
        result.drives.len()
    ))
    .ok();
    term.write_line(&format!(
        "{} {} app manifests in {:.1}s",
        style("Found").green().bold(),
        style(result.manifests).bold(),
        result.duration_ms as f64 / 1000.0
    ))
    .ok();

    if !result.skipped.is_empty() {
        term.write_line(&format!(
            "  {} {} unreadable manifests or libraries skipped",
            style("!").yellow().bold(),
            result.skipped.len()
        ))
        .ok();
        for error in &result.skipped {
            term.write_line(&format!("    {}", style(error).dim())).ok();
        }
    }

    if !result.scan.unresolved.is_empty() {
        term.write_line(&format!(
            "  {} {} manifests could not be classified and were left alone",
            style("!").yellow().bold(),
            result.scan.unresolved.len()
        ))
        .ok();
        for error in &result.scan.unresolved {
            term.write_line(&format!("    {}", style(error).dim())).ok();
        }
    }

    for error in &result.cache_errors {
        term.write_line(&format!("  {} {}", style("!").yellow().bold(), error))
            .ok();
    }

    term.write_line("").ok();
}

fn print_findings(term: &Term, result: &PipelineResult) {
    let scan = &result.scan;

    if scan.is_clean() {
        term.write_line(&format!(
            "  {} No unlinked manifests or ghost directories found!",
            style("✓").green().bold()
        ))
        .ok();
        term.write_line("").ok();
        return;
    }

    if scan.has_unlinked() {
        term.write_line(&format!(
            "{}",
            style(format!("Unlinked manifests ({}):", scan.unlinked.len()))
                .bold()
                .underlined()
        ))
        .ok();
        for path in &scan.unlinked {
            term.write_line(&format!(
                "  {} {} ({})",
                style("○").dim(),
                path.display(),
                declared_dir(path)
            ))
            .ok();
        }
        term.write_line("").ok();
    }

    if scan.has_scraps() {
        term.write_line(&format!(
            "{}",
            style(format!("Ghost directories ({}):", scan.scraps.len()))
                .bold()
                .underlined()
        ))
        .ok();
        print_scraps(term, &scan.scraps);
        term.write_line("").ok();
    }
}

fn print_scraps(term: &Term, pairs: &[ScrapPair]) {
    for pair in pairs {
        term.write_line(&format!("  {} {}", style("○").dim(), pair.install_dir.display()))
            .ok();
        term.write_line(&format!("    {}", style(pair.manifest.display()).dim()))
            .ok();
    }
}

fn print_removal(term: &Term, report: &RemovalReport) {
    term.write_line(&format!(
        "{} {} paths removed",
        style("✓").green().bold(),
        style(report.removed.len()).cyan()
    ))
    .ok();

    if !report.skipped.is_empty() {
        term.write_line(&format!(
            "  {} already gone or not a file",
            style(report.skipped.len()).dim()
        ))
        .ok();
    }

    if !report.is_complete() {
        term.write_line(&format!(
            "{} {} paths could not be removed:",
            style("✗").red().bold(),
            report.failed.len()
        ))
        .ok();
        for error in &report.failed {
            term.write_line(&format!("  {}", error)).ok();
        }
    }
}

fn print_json_results(result: &PipelineResult) -> Result<()> {
    let output = serde_json::json!({
        "summary": result.summary(),
        "drives": result.drives,
        "libraries": result.libraries,
        "unlinked": result.scan.unlinked,
        "scraps": result.scan.scraps,
        "unresolved": result.scan.unresolved.iter().map(|e| e.to_string()).collect::<Vec<_>>(),
        "skipped": result.skipped.iter().map(|e| e.to_string()).collect::<Vec<_>>(),
    });

    let json = serde_json::to_string_pretty(&output)?;
    println!("{}", json);
    Ok(())
}

fn print_minimal_results(result: &PipelineResult) {
    for path in &result.scan.unlinked {
        println!("{}", path.display());
    }
    for pair in &result.scan.scraps {
        println!("{}", pair.install_dir.display());
        println!("{}", pair.manifest.display());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_answer_uses_default() {
        assert!(parse_answer("", true));
        assert!(!parse_answer("\n", false));
    }

    #[test]
    fn answers_are_case_insensitive() {
        assert!(parse_answer("Y", false));
        assert!(parse_answer(" yes ", false));
        assert!(!parse_answer("no", true));
        assert!(!parse_answer("sure", true));
    }

    #[test]
    fn cli_parses_clean_flags() {
        let cli = Cli::try_parse_from([
            "muncher",
            "clean",
            "--drive",
            "/mnt/games",
            "--threshold-kib",
            "8",
            "--yes",
        ])
        .unwrap();

        match cli.command {
            Commands::Clean { scan, yes } => {
                assert!(yes);
                assert_eq!(scan.threshold_kib, 8);
                assert_eq!(scan.drives, vec![PathBuf::from("/mnt/games")]);
            }
            other => panic!("unexpected command {:?}", other),
        }
    }

    #[test]
    fn zero_threshold_is_rejected() {
        let cli = Cli::try_parse_from(["muncher", "scan", "--threshold-kib", "0"]).unwrap();
        let Commands::Scan { scan, .. } = cli.command else {
            panic!("expected scan");
        };

        assert!(matches!(build_pipeline(&scan), Err(MuncherError::Config(_))));
    }

    #[test]
    fn scan_leaves_cache_alone_unless_asked() {
        let drive = tempfile::TempDir::new().unwrap();
        let root = drive.path().to_str().unwrap();

        let cli = Cli::try_parse_from(["muncher", "scan", "--drive", root]).unwrap();
        let Commands::Scan { scan, .. } = cli.command else {
            panic!("expected scan");
        };
        assert!(build_pipeline(&scan).unwrap().library_cache().is_none());

        let cache_file = drive.path().join("libraries.json");
        let cli = Cli::try_parse_from([
            "muncher",
            "scan",
            "--drive",
            root,
            "--library-cache",
            cache_file.to_str().unwrap(),
        ])
        .unwrap();
        let Commands::Scan { scan, .. } = cli.command else {
            panic!("expected scan");
        };
        let pipeline = build_pipeline(&scan).unwrap();
        assert_eq!(pipeline.library_cache().map(|c| c.path()), Some(cache_file.as_path()));
    }
}
