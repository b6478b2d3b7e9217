// src/main.rs
use clap::Parser;
use formc_extractor::extractors::{ParseOptions, ReportParser};
use formc_extractor::storage::{issuer_slug, ReportDocument, StorageManager};
use formc_extractor::utils::{self, AppError};
use std::io::Read;
use std::path::{Path, PathBuf};

/// Command Line Interface for the Form C report normalizer
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Generated report text to parse ("-" reads stdin)
    #[arg(short, long)]
    input: String,

    /// Issuer name recorded in the output document
    #[arg(short = 'n', long)]
    issuer_name: Option<String>,

    /// Output directory for parsed reports
    #[arg(short, long, default_value = "./output")]
    output_dir: String,

    /// Debug mode - save the parse trace and an annotated copy of the input
    #[arg(short, long)]
    debug: bool,

    /// Minimum issue description length (default: MIN_DESCRIPTION_LEN or 5)
    #[arg(long)]
    min_description_len: Option<usize>,

    /// Citation used when none is found (default: DEFAULT_RULE_CITATION or "Rule 201")
    #[arg(long)]
    default_rule: Option<String>,

    /// Embed the raw report text in the output document
    #[arg(long)]
    include_raw: bool,
}

impl Args {
    /// CLI flags override the environment, which overrides built-in defaults.
    fn parse_options(&self) -> Result<ParseOptions, AppError> {
        let mut options = ParseOptions::from_env();
        if let Some(len) = self.min_description_len {
            tracing::debug!("Setting min description length to {} from command-line argument", len);
            options.min_description_len = len;
        }
        if let Some(rule) = &self.default_rule {
            let rule = rule.trim();
            if rule.is_empty() {
                return Err(AppError::Config("--default-rule must not be empty".to_string()));
            }
            options.default_rule_citation = rule.to_string();
        }
        Ok(options)
    }

    /// Issuer slug, falling back to the input file stem.
    fn slug(&self) -> String {
        match &self.issuer_name {
            Some(name) => issuer_slug(name),
            None if self.input != "-" => {
                let stem = Path::new(&self.input).file_stem().and_then(|s| s.to_str()).unwrap_or("");
                issuer_slug(stem)
            }
            None => issuer_slug(""),
        }
    }
}

fn read_input(input: &str) -> Result<String, AppError> {
    if input == "-" {
        let mut text = String::new();
        std::io::stdin().read_to_string(&mut text)?;
        Ok(text)
    } else {
        let path = PathBuf::from(input);
        if !path.is_file() {
            return Err(AppError::Config(format!("Input file not found: {}", path.display())));
        }
        Ok(std::fs::read_to_string(&path)?)
    }
}

fn main() -> Result<(), AppError> {
    // 1. Parse CLI arguments and set up logging (reads RUST_LOG env var)
    let args = Args::parse();
    utils::logging::setup_logging(args.debug);
    tracing::info!("Starting processing for args: {:?}", args);

    // 2. Resolve options and read the report text
    let options = args.parse_options()?;
    let text = read_input(&args.input)?;
    tracing::info!("Read {} bytes of report text", text.len());

    // 3. Parse
    let parser = ReportParser::new(options);
    let outcome = parser.parse(&text);
    if outcome.report.is_empty() {
        tracing::warn!("No records recognized in {}", args.input);
    }
    let counts = outcome.report.severity_counts();
    tracing::info!(
        "Issues by severity: {} critical, {} high, {} medium",
        counts.critical,
        counts.high,
        counts.medium
    );

    // 4. Persist
    let storage = StorageManager::new(&args.output_dir)?;
    let slug = args.slug();
    let raw = if args.include_raw { Some(text.clone()) } else { None };
    let document = ReportDocument::new(args.issuer_name.clone(), raw, outcome.report);

    let report_path = storage.save_report(&slug, &document)?;
    storage.save_report_metadata(&slug, &document, &args.input)?;

    if args.debug {
        storage.save_trace(&slug, &outcome.trace)?;
        let annotated_path = storage.annotated_path(&slug)?;
        if let Err(e) = utils::annotate::save_annotated_text(&text, &annotated_path) {
            tracing::warn!("Failed to create annotated report text: {}", e);
        }
    }

    tracing::info!("Processing finished. Report written to {}", report_path.display());
    Ok(())
}
