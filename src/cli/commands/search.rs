use anyhow::{Context, Result};
use clap::Args;
use indicatif::{ProgressBar, ProgressDrawTarget, ProgressStyle};
use serde::Serialize;

use super::WordArgs;
use crate::amulet::Amulet;
use crate::cli::output::Output;
use crate::config::{AmuletsConfig, OutputFormat, Settings};
use crate::parallel::{Coordinator, Reporter, SearchSummary, WorkerFailure, cancellation};

#[derive(Args, Debug)]
pub struct SearchArgs {
    #[command(flatten)]
    pub words: WordArgs,

    /// Number of workers (default: all available cores)
    #[arg(short, long)]
    pub workers: Option<usize>,

    /// Shortest run of the marker digit that counts as an amulet
    #[arg(long)]
    pub min_run: Option<usize>,

    /// Output format
    #[arg(long, value_enum)]
    pub format: Option<OutputFormat>,

    /// Hide the progress bar
    #[arg(long)]
    pub no_progress: bool,
}

#[derive(Serialize, Default)]
struct Overrides {
    search: SearchOverrides,
    amulet: AmuletOverrides,
    output: OutputOverrides,
}

#[derive(Serialize, Default)]
struct SearchOverrides {
    #[serde(skip_serializing_if = "Option::is_none")]
    workers: Option<usize>,
}

#[derive(Serialize, Default)]
struct AmuletOverrides {
    #[serde(skip_serializing_if = "Option::is_none")]
    min_run: Option<usize>,
}

#[derive(Serialize, Default)]
struct OutputOverrides {
    #[serde(skip_serializing_if = "Option::is_none")]
    format: Option<OutputFormat>,
    #[serde(skip_serializing_if = "Option::is_none")]
    progress: Option<bool>,
}

impl SearchArgs {
    fn overrides(&self) -> Overrides {
        Overrides {
            search: SearchOverrides { workers: self.workers },
            amulet: AmuletOverrides { min_run: self.min_run },
            output: OutputOverrides {
                format: self.format,
                progress: self.no_progress.then_some(false),
            },
        }
    }
}

pub async fn execute(args: SearchArgs, config_path: Option<&str>, verbose: u8, quiet: bool) -> Result<()> {
    let settings = AmuletsConfig::load(config_path, Some(args.overrides()))?.settings()?;
    let space = args.words.space()?;
    let coordinator = Coordinator::from_settings(space, &settings)?;
    let output = Output::new(verbose > 0, quiet);

    let format = settings.output.format;
    if format == OutputFormat::Text {
        output.info(&format!(
            "Searching {} geodes over {} words with {} workers (amulet: run of {}+ '{}' within {} bytes)",
            coordinator.space().count(),
            coordinator.space().words().len(),
            coordinator.plan()?.len(),
            settings.amulet.min_run,
            settings.amulet.marker,
            settings.amulet.max_bytes,
        ));
    }

    let mut reporter = SearchReporter::new(output, &settings, coordinator.space().count());

    let (handle, cancel) = cancellation();
    let interrupt = tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            handle.cancel();
        }
    });

    let (summary, reporter) = tokio::task::spawn_blocking(move || {
        let summary = coordinator.run(&mut reporter, Some(&cancel));
        summary.map(|summary| (summary, reporter))
    })
    .await
    .context("Search coordinator panicked")??;
    interrupt.abort();

    reporter.finish(&summary);

    if summary.cancelled {
        std::process::exit(130);
    }
    if summary.is_degraded() {
        std::process::exit(2);
    }
    Ok(())
}

/// Prints amulets as they arrive and keeps the progress bar current
struct SearchReporter {
    output: Output,
    format: OutputFormat,
    bar: Option<ProgressBar>,
    divisor: u128,
}

impl SearchReporter {
    fn new(output: Output, settings: &Settings, total: u128) -> Self {
        // indicatif counts in u64; scale bigger spaces down
        let divisor = total / u64::MAX as u128 + 1;
        let show_bar = settings.output.progress && settings.output.format == OutputFormat::Text && !output.is_quiet();

        let bar = show_bar.then(|| {
            let bar = ProgressBar::with_draw_target(Some((total / divisor) as u64), ProgressDrawTarget::stderr());
            bar.set_style(
                ProgressStyle::with_template("{spinner:.green} [{elapsed_precise}] {bar:40.cyan/blue} {percent:>3}% {msg}")
                    .unwrap_or_else(|_| ProgressStyle::default_bar())
                    .progress_chars("#>-"),
            );
            bar
        });

        Self {
            output,
            format: settings.output.format,
            bar,
            divisor,
        }
    }

    fn emit(&self, line: String) {
        match &self.bar {
            Some(bar) => bar.println(line),
            None => println!("{line}"),
        }
    }

    fn finish(&self, summary: &SearchSummary) {
        if let Some(bar) = &self.bar {
            bar.finish_and_clear();
        }

        match self.format {
            OutputFormat::Json => println!("{}", summary_json(summary)),
            OutputFormat::Text => {
                let title = if summary.cancelled {
                    "Search cancelled"
                } else if summary.is_degraded() {
                    "Search finished with failed workers"
                } else {
                    "Search complete"
                };
                self.output.header(title);
                self.output
                    .key_value("Index space", &summary.space_size.to_string(), false);
                self.output.key_value("Scanned", &summary.scanned.to_string(), false);
                self.output
                    .key_value("Amulets", &summary.amulets.to_string(), summary.amulets > 0);
                self.output.key_value("Workers", &summary.workers.to_string(), false);
                self.output
                    .key_value("Elapsed", &format!("{:.2}s", summary.elapsed.as_secs_f64()), false);
                for failure in &summary.failures {
                    self.output.error(&format!(
                        "Worker {} failed, indices {}..{} were not scanned",
                        failure.worker, failure.unscanned.start, failure.unscanned.end
                    ));
                }
                if summary.is_complete() {
                    self.output.success("Every geode was checked");
                }
            }
        }
    }
}

impl Reporter for SearchReporter {
    fn amulet(&mut self, amulet: &Amulet) {
        match self.format {
            OutputFormat::Text => self.emit(Output::amulet_line(amulet)),
            OutputFormat::Json => println!("{}", amulet_json(amulet)),
        }
    }

    fn progress(&mut self, scanned: u128, _total: u128) {
        if let Some(bar) = &self.bar {
            bar.set_position((scanned / self.divisor) as u64);
        }
    }

    fn worker_finished(&mut self, worker: usize, scanned: u128) {
        tracing::debug!("Worker {worker} finished after {scanned} geodes");
        if self.format == OutputFormat::Text {
            self.output.verbose(&format!("Worker {worker} finished after {scanned} geodes"));
        }
    }

    fn worker_failed(&mut self, failure: &WorkerFailure) {
        self.output
            .warning(&format!("Worker {} failed: {}", failure.worker, failure.reason));
    }
}

// Index-sized numbers are strings: they routinely exceed u64
fn amulet_json(amulet: &Amulet) -> serde_json::Value {
    serde_json::json!({
        "type": "amulet",
        "quality": amulet.quality(),
        "worker": amulet.worker,
        "index": amulet.index.to_string(),
        "text": amulet.text(),
        "run_length": amulet.verdict.run_length,
        "run": amulet.verdict.run,
        "digest": amulet.verdict.digest,
    })
}

fn summary_json(summary: &SearchSummary) -> serde_json::Value {
    let failures: Vec<_> = summary
        .failures
        .iter()
        .map(|f| {
            serde_json::json!({
                "worker": f.worker,
                "reason": f.reason,
                "unscanned_start": f.unscanned.start.to_string(),
                "unscanned_end": f.unscanned.end.to_string(),
            })
        })
        .collect();

    serde_json::json!({
        "type": "summary",
        "space_size": summary.space_size.to_string(),
        "scanned": summary.scanned.to_string(),
        "amulets": summary.amulets,
        "workers": summary.workers,
        "elapsed_ms": summary.elapsed.as_millis() as u64,
        "cancelled": summary.cancelled,
        "complete": summary.is_complete(),
        "failures": failures,
    })
}
