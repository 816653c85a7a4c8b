use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use colored::Colorize;
use frontmatter::files::{read_json, write_json};
use frontmatter::time::format_timestamp;
use frontmatter::{scan, validate, ErrorReport, ScanOptions, DEFAULT_OUT_DIR};
use std::fs;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(
    author,
    version,
    about = "Extract pages, components, and datasets from a site's source tree into a versioned IR",
    long_about = None
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Scan the project and write manifest.json and build.json
    Scan(ScanArgs),
    /// Same as scan
    Export(ScanArgs),
    /// Check an existing build.json
    Validate(Location),
}

#[derive(Args, Debug, Clone)]
struct Location {
    /// Project root
    #[arg(long, env = "FRONTMATTER_ROOT", default_value = ".")]
    root: PathBuf,

    /// Output directory (defaults to <root>/.frontmatter)
    #[arg(long, env = "FRONTMATTER_OUT")]
    out: Option<PathBuf>,
}

impl Location {
    fn out_dir(&self, root: &Path) -> Result<PathBuf> {
        match &self.out {
            Some(out) => {
                let out = std::path::absolute(out)
                    .with_context(|| format!("Invalid output directory: {}", out.display()))?;
                // Match the canonical root so the walk recognizes and skips it
                if out.exists() {
                    fs::canonicalize(&out)
                        .with_context(|| format!("Invalid output directory: {}", out.display()))
                } else {
                    Ok(out)
                }
            }
            None => Ok(root.join(DEFAULT_OUT_DIR)),
        }
    }
}

#[derive(Args, Debug, Clone)]
struct ScanArgs {
    #[command(flatten)]
    location: Location,

    /// Log every parsed file
    #[arg(long, short)]
    verbose: bool,

    /// Report undecodable files as errors instead of aborting
    #[arg(long)]
    lenient: bool,

    /// Report page component references with no matching component file
    #[arg(long)]
    verify_components: bool,
}

/// How a command finished when it did not fail outright
enum Outcome {
    Clean,
    Defects,
}

fn init_logging(verbose: bool) {
    let default_filter = if verbose { "info" } else { "warn" };
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn run_scan(args: &ScanArgs) -> Result<Outcome> {
    let root = fs::canonicalize(&args.location.root).with_context(|| {
        format!(
            "Project root not found: {}",
            args.location.root.display()
        )
    })?;
    let out_dir = args.location.out_dir(&root)?;

    let options = ScanOptions {
        root,
        out_dir: out_dir.clone(),
        verbose: args.verbose,
        lenient: args.lenient,
        verify_components: args.verify_components,
    };
    let result = scan(&options)?;

    write_json(&out_dir.join("manifest.json"), &result.manifest)?;
    write_json(&out_dir.join("build.json"), &result.build)?;

    let errors_path = out_dir.join("errors.json");
    if !result.errors.is_empty() {
        write_json(
            &errors_path,
            &ErrorReport {
                errors: result.errors.clone(),
            },
        )?;
        eprintln!(
            "{}",
            format!("Scan completed with {} error(s).", result.errors.len())
                .red()
                .bold()
        );
        for error in &result.errors {
            eprintln!("- {}", error.message);
        }
        return Ok(Outcome::Defects);
    }

    if errors_path.exists() {
        fs::remove_file(&errors_path)
            .with_context(|| format!("Failed to remove {}", errors_path.display()))?;
    }

    println!(
        "{} Output: {}",
        "Scan OK.".green().bold(),
        out_dir.display()
    );
    println!(
        "  {} pages, {} components, {} datasets, {} files (generated {})",
        result.build.pages.len(),
        result.build.components_index.len(),
        result.build.datasets.len(),
        result.manifest.files.len(),
        format_timestamp(result.build.generated_at)
    );

    Ok(Outcome::Clean)
}

fn run_validate(location: &Location) -> Result<Outcome> {
    let out_dir = location.out_dir(&location.root)?;
    let build_path = out_dir.join("build.json");

    if !build_path.exists() {
        eprintln!(
            "{} Run: frontmatter scan --root {}",
            "build.json not found.".red().bold(),
            location.root.display()
        );
        return Ok(Outcome::Defects);
    }

    let build = match read_json(&build_path) {
        Ok(build) => build,
        Err(err) => {
            eprintln!("{} {:#}", "Invalid build:".red().bold(), err);
            return Ok(Outcome::Defects);
        }
    };

    let errors = validate(&build);
    if !errors.is_empty() {
        eprintln!(
            "{}",
            format!("Invalid build ({} error(s))", errors.len())
                .red()
                .bold()
        );
        for error in &errors {
            eprintln!("- {}", error);
        }
        return Ok(Outcome::Defects);
    }

    println!("{}", "Build is valid.".green().bold());
    Ok(Outcome::Clean)
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let verbose = match &cli.command {
        Commands::Scan(args) | Commands::Export(args) => args.verbose,
        Commands::Validate(_) => false,
    };
    init_logging(verbose);

    let result = match &cli.command {
        Commands::Scan(args) | Commands::Export(args) => run_scan(args),
        Commands::Validate(location) => run_validate(location),
    };

    match result {
        Ok(Outcome::Clean) => ExitCode::SUCCESS,
        Ok(Outcome::Defects) => ExitCode::from(2),
        Err(err) => {
            eprintln!("{} {:#}", "error:".red().bold(), err);
            ExitCode::from(1)
        }
    }
}
