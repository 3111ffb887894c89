use clap::{Parser, Subcommand};
use scholarsite::config;
use scholarsite::schema::DocumentSchema;
use scholarsite::talkmap::{self, TalkmapOptions, geocoder};
use scholarsite::{bibtex, output, tsv};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::error;
use tracing_subscriber::EnvFilter;

/// Input/output overrides shared by the TSV generators.
#[derive(clap::Args, Clone)]
struct TsvArgs {
    /// Input TSV file
    #[arg(long)]
    input: Option<PathBuf>,

    /// Directory for the generated Markdown files
    #[arg(long)]
    output_dir: Option<PathBuf>,
}

#[derive(Parser)]
#[command(name = "scholarsite")]
#[command(version)]
#[command(about = "Content generators for an academic static site")]
#[command(long_about = "\
Content generators for an academic static site

Turns publication and talk records into Markdown documents with YAML front
matter, and builds the geocoded dataset behind the talk map.

  publications   publications.tsv  →  _publications/<date>-<slug>.md
  talks          talks.tsv         →  _talks/<date>-<slug>.md
  bibtex         *.bib sources     →  _publications/<date>-<slug>.md
  talkmap        _talks/*.md       →  talkmap/org-locations.js

Generated files are only rewritten when their content changes. Rows that
can't be rendered are reported on stderr and skipped; one summary line per
run goes to stdout.

Run 'scholarsite gen-config' to generate a documented scholarsite.toml.")]
struct Cli {
    /// Config file (missing file means stock defaults)
    #[arg(long, default_value = config::CONFIG_FILENAME, global = true)]
    config: PathBuf,

    /// Validate and render without writing anything
    #[arg(long, global = true)]
    dry_run: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Generate publication documents from a TSV file
    Publications(TsvArgs),
    /// Generate talk documents from a TSV file
    Talks(TsvArgs),
    /// Generate publication documents from BibTeX sources
    Bibtex {
        /// Source names to process (default: all configured sources)
        #[arg(long, num_args = 1..)]
        sources: Vec<String>,

        /// Directory for the generated Markdown files
        #[arg(long)]
        output_dir: Option<PathBuf>,
    },
    /// Build the talk map dataset from generated talk documents
    Talkmap {
        /// Directory containing talk Markdown files
        #[arg(long)]
        talks_dir: Option<PathBuf>,

        /// Path of the generated JavaScript dataset
        #[arg(long)]
        output_js: Option<PathBuf>,

        /// Path of the geocode cache
        #[arg(long)]
        cache_file: Option<PathBuf>,

        /// User agent sent with geocoding requests
        #[arg(long)]
        user_agent: Option<String>,

        /// Minimum delay in seconds between geocoding requests
        #[arg(long)]
        min_delay: Option<f64>,

        /// Maximum uncached locations to geocode this run (0 = no limit)
        #[arg(long)]
        lookup_limit: Option<usize>,

        /// Use the cache only; no geocoding requests
        #[arg(long)]
        skip_geocode: bool,

        /// Write the dataset even if no location resolved
        #[arg(long)]
        allow_empty_output: bool,
    },
    /// Print a stock scholarsite.toml with all options documented
    GenConfig,
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();

    let cli = Cli::parse();
    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            error!("{err}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    let dry_run = cli.dry_run;

    match cli.command {
        Command::Publications(args) => {
            let config = config::load_config(&cli.config)?;
            let section = apply_tsv_args(config.publications, args);
            let schema = DocumentSchema::publications();
            let summary =
                tsv::generate_from_tsv(&schema, &section.input, &section.output_dir, dry_run)?;
            output::print_summary(&schema.name, "rows", &summary, dry_run);
        }
        Command::Talks(args) => {
            let config = config::load_config(&cli.config)?;
            let section = apply_tsv_args(config.talks, args);
            let schema = DocumentSchema::talks();
            let summary =
                tsv::generate_from_tsv(&schema, &section.input, &section.output_dir, dry_run)?;
            output::print_summary(&schema.name, "rows", &summary, dry_run);
        }
        Command::Bibtex {
            sources,
            output_dir,
        } => {
            let config = config::load_config(&cli.config)?;
            let output_dir = output_dir.unwrap_or(config.bibtex.output_dir.clone());
            match bibtex::generate_from_bibtex(&sources, &config.bibtex, &output_dir, dry_run)? {
                Some(summary) => output::print_summary("pubsFromBib", "entries", &summary, dry_run),
                None => println!("{}", output::format_bibtex_skipped()),
            }
        }
        Command::Talkmap {
            talks_dir,
            output_js,
            cache_file,
            user_agent,
            min_delay,
            lookup_limit,
            skip_geocode,
            allow_empty_output,
        } => {
            let mut config = config::load_config(&cli.config)?;
            let section = &mut config.talkmap;
            if let Some(dir) = talks_dir {
                section.talks_dir = dir;
            }
            if let Some(path) = output_js {
                section.output_js = path;
            }
            if let Some(path) = cache_file {
                section.cache_file = path;
            }
            if let Some(agent) = user_agent {
                section.user_agent = agent;
            }
            if let Some(secs) = min_delay {
                section.min_delay_secs = secs;
            }
            if let Some(limit) = lookup_limit {
                section.lookup_limit = limit;
            }
            config.validate()?;

            let options = TalkmapOptions {
                skip_geocode,
                allow_empty_output,
                dry_run,
                ..TalkmapOptions::from_config(&config.talkmap)
            };
            let client = if skip_geocode || dry_run {
                None
            } else {
                geocoder::default_geocoder(&config.talkmap)
            };
            let report = talkmap::run(&options, client.as_deref())?;
            output::print_talkmap_report(&report, &options);
        }
        Command::GenConfig => {
            print!("{}", config::stock_config_toml());
        }
    }

    Ok(())
}

fn apply_tsv_args(mut section: config::TsvConfig, args: TsvArgs) -> config::TsvConfig {
    if let Some(input) = args.input {
        section.input = input;
    }
    if let Some(dir) = args.output_dir {
        section.output_dir = dir;
    }
    section
}
