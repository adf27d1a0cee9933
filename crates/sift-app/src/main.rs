use std::env;
use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use sift_config::Config;
use sift_core::{NonTextPolicy, ResourceCache};
use sift_lang_english::EnglishResourceProvider;
use sift_records::{IssueSummary, ProcessorOptions, RecordProcessor};
use tracing_subscriber::EnvFilter;

use self::io::Format;

mod io;

#[cfg(test)]
mod tests;

/// Normalize a news article dataset for text classification
#[derive(Parser, Debug)]
#[command(name = "sift", version)]
struct Args {
    /// Input dataset, `-` for stdin
    #[arg(short, long)]
    input: PathBuf,

    /// Output dataset, `-` for stdout
    #[arg(short, long)]
    output: PathBuf,

    /// Dataset format; detected from the file extension when omitted
    #[arg(long, value_enum)]
    format: Option<Format>,

    /// JSON config file
    #[arg(long)]
    config: Option<PathBuf>,

    /// Worker threads, 0 for one per core
    #[arg(long)]
    workers: Option<usize>,

    /// Directory holding stopwords.txt, lemmas.tsv and segmentation.json
    #[arg(long)]
    resource_dir: Option<PathBuf>,

    #[arg(long)]
    language: Option<String>,

    /// Handling of non-text title/text cells: empty or stringify
    #[arg(long, value_parser = parse_non_text)]
    non_text: Option<NonTextPolicy>,
}

impl Args {
    /// Config file (or defaults), then `SIFT_*` variables, then flags
    fn load_config(&self) -> anyhow::Result<Config> {
        let mut config = match &self.config {
            Some(path) => {
                let mut config = Config::from_file(path)?;
                config.apply_overrides(|key| env::var(key).ok());
                config
            }
            None => Config::new(),
        };
        self.apply_to(&mut config);
        Ok(config)
    }

    fn apply_to(&self, config: &mut Config) {
        if let Some(workers) = self.workers {
            config.pipeline.workers = workers;
        }
        if let Some(dir) = &self.resource_dir {
            config.resources.resource_dir = Some(dir.clone());
        }
        if let Some(language) = &self.language {
            config.resources.language = language.clone();
        }
        if let Some(policy) = self.non_text {
            config.pipeline.non_text = policy;
        }
    }

    fn input_format(&self) -> Format {
        Format::resolve(self.format, &self.input)
    }

    fn output_format(&self) -> Format {
        self.format
            .or_else(|| Format::from_path(&self.output))
            .unwrap_or_else(|| self.input_format())
    }
}

fn parse_non_text(value: &str) -> Result<NonTextPolicy, String> {
    NonTextPolicy::parse(value)
        .ok_or_else(|| format!("expected `empty` or `stringify`, got {value:?}"))
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let json = env::var("SIFT_LOG_JSON")
        .is_ok_and(|v| v == "1" || v.eq_ignore_ascii_case("true"));

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);
    if json {
        builder.json().init();
    } else {
        builder.init();
    }
}

fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    init_tracing();

    let args = Args::parse();
    let config = args.load_config()?;
    tracing::debug!("Configuration: {:?}", config);

    let summary = run(&args, &config)?;
    if summary.total() > 0 {
        tracing::warn!("{} fields could not be used, see debug logs for details", summary.total());
    }
    Ok(())
}

fn run(args: &Args, config: &Config) -> anyhow::Result<IssueSummary> {
    let provider = match &config.resources.resource_dir {
        Some(dir) => EnglishResourceProvider::from_dir(dir),
        None => EnglishResourceProvider::embedded(),
    }
    .with_additional_lemmas(config.resources.additional_lemma_paths.iter().cloned());

    let cache = ResourceCache::new(provider);
    let resources = cache
        .get(&config.resources.language)
        .context("Failed to load language resources")?;

    let processor =
        RecordProcessor::with_options(&resources, ProcessorOptions::from(&config.pipeline))?;

    let reader = io::open_input(&args.input)?;
    let table = io::read_table(reader, args.input_format())
        .with_context(|| format!("Failed to read {}", args.input.display()))?;
    tracing::info!("Read {} records from {}", table.records.len(), args.input.display());

    let report = processor.process_with_report(&table.records);
    for issue in &report.issues {
        tracing::debug!("Record {} {}: {}", issue.index, issue.field, issue.problem);
    }

    let writer = io::open_output(&args.output)?;
    io::write_table(writer, args.output_format(), &table.columns, &report.records)
        .with_context(|| format!("Failed to write {}", args.output.display()))?;

    let summary = report.summary();
    tracing::info!(
        "Wrote {} records to {} ({} unparsable dates, {} unrecognized labels, \
         {} non-text cells, {} normalization failures)",
        report.records.len(),
        args.output.display(),
        summary.unparsable_dates,
        summary.unrecognized_labels,
        summary.non_text,
        summary.normalization_failures
    );
    Ok(summary)
}
