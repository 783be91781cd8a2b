//! FillPDF CLI - run the server's operations from the shell
//!
//! Usage: fillpdf-cli [OPTIONS] <COMMAND>
//!
//! Handy for checking a template's checkbox export values or debugging FDF
//! output without going through HTTP.

use clap::{Parser, Subcommand};
use fillpdf_lib::{fdf, ops, settings::Config, CheckboxLexicon, Form};
use std::io::{Read as _, Write};
use std::path::{Path, PathBuf};

// ============================================================================
// Main CLI Structure
// ============================================================================

#[derive(Parser)]
#[command(name = "fillpdf-cli")]
#[command(version, about = "Fill PDF forms and stamp PDFs with pdftk", long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// JSON config file (same format as the server)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// pdftk executable
    #[arg(long, global = true)]
    pdftk: Option<PathBuf>,

    /// Detailed logging
    #[arg(long, short, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Encode a JSON form mapping as FDF
    Fdf {
        /// JSON object of field name -> value ("-" for stdin)
        #[arg(long, short)]
        form: PathBuf,
        #[command(flatten)]
        checkbox: CheckboxArgs,
        /// Output file (default: stdout)
        #[arg(long, short)]
        output: Option<PathBuf>,
    },
    /// Fill and flatten a template PDF
    Fill {
        /// Template PDF with form fields
        #[arg(long, short)]
        template: PathBuf,
        /// JSON object of field name -> value ("-" for stdin)
        #[arg(long, short)]
        form: PathBuf,
        #[command(flatten)]
        checkbox: CheckboxArgs,
        /// Output PDF
        #[arg(long, short)]
        output: PathBuf,
    },
    /// Stamp one PDF onto every page of another
    Stamp {
        /// Document to stamp onto
        #[arg(long, short)]
        base: PathBuf,
        /// Overlay PDF
        #[arg(long, short)]
        stamp: PathBuf,
        /// Output PDF
        #[arg(long, short)]
        output: PathBuf,
    },
}

#[derive(clap::Args)]
struct CheckboxArgs {
    /// Export value written for `true`
    #[arg(long, default_value = "Yes")]
    checked: String,
    /// Export value written for `false`
    #[arg(long, default_value = "Off")]
    unchecked: String,
}

impl From<CheckboxArgs> for CheckboxLexicon {
    fn from(args: CheckboxArgs) -> Self {
        CheckboxLexicon::new(args.checked, args.unchecked)
    }
}

// ============================================================================
// Helpers
// ============================================================================

fn read_form(path: &Path) -> Result<Form, String> {
    let mut content = String::new();
    if path == Path::new("-") {
        std::io::stdin()
            .read_to_string(&mut content)
            .map_err(|e| format!("Failed to read stdin: {}", e))?;
    } else {
        content = std::fs::read_to_string(path)
            .map_err(|e| format!("Failed to read {}: {}", path.display(), e))?;
    }
    serde_json::from_str(&content).map_err(|e| format!("Invalid form JSON: {}", e))
}

fn write_output(path: &Path, bytes: &[u8]) -> Result<(), String> {
    std::fs::write(path, bytes).map_err(|e| format!("Failed to write {}: {}", path.display(), e))?;
    log::info!("Wrote {} ({} bytes)", path.display(), bytes.len());
    Ok(())
}

// ============================================================================
// Main
// ============================================================================

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let level = if cli.verbose { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();

    if let Err(e) = run_cli(cli).await {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

async fn run_cli(cli: Cli) -> Result<(), String> {
    let mut config = Config::load(cli.config.as_deref())?;
    if let Some(pdftk) = cli.pdftk {
        config.pdftk = pdftk;
    }
    let ctx = ops::Context::from_config(&config);

    match cli.command {
        Commands::Fdf { form, checkbox, output } => {
            let form = read_form(&form)?;
            let lexicon = CheckboxLexicon::from(checkbox);
            match output {
                Some(path) => {
                    fdf::write_to_file(&form, &lexicon, &path).map_err(|e| e.to_string())?;
                    log::info!("Wrote {} fields to {}", form.len(), path.display());
                }
                None => {
                    let stdout = std::io::stdout();
                    let mut lock = stdout.lock();
                    fdf::encode(&form, &lexicon, &mut lock).map_err(|e| e.to_string())?;
                    lock.flush().map_err(|e| e.to_string())?;
                }
            }
        }
        Commands::Fill { template, form, checkbox, output } => {
            let form = read_form(&form)?;
            let pdf = ops::fill_form(&ctx, &template, &form, &checkbox.into())
                .await
                .map_err(|e| e.to_string())?;
            write_output(&output, &pdf)?;
        }
        Commands::Stamp { base, stamp, output } => {
            let pdf = ops::multistamp_files(&ctx, &base, &stamp)
                .await
                .map_err(|e| e.to_string())?;
            write_output(&output, &pdf)?;
        }
    }

    Ok(())
}
