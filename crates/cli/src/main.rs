// ShopTally CLI - marketplace order processing and finance reconciliation

mod exit_codes;
mod finance;
mod mapping;
mod process;

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};

use exit_codes::{
    EXIT_ERROR, EXIT_MAPPING, EXIT_MISSING_RESOURCE, EXIT_RECON_DUPLICATE, EXIT_SCHEMA,
    EXIT_SUCCESS, EXIT_USAGE, EXIT_VALUE,
};
use shoptally_core::PipelineError;
use shoptally_io::IoError;
use shoptally_recon::ReconError;

#[derive(Parser)]
#[command(name = "shoptally")]
#[command(about = "Marketplace order processing, invoicing and finance reconciliation")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Process a marketplace order export into invoices and summaries
    #[command(after_help = "\
Examples:
  shoptally process shopee orders_20250417.xlsx -d 2025-04-17
  shoptally process lazada sheet_export.xlsx -o lazada_invoices.xlsx
  shoptally process tiktok OrderSKUList.xlsx -m custom_mapping.xlsx")]
    Process {
        /// Marketplace the export came from (shopee, lazada, tiktok)
        platform: String,

        /// Path to the input Excel file
        input_file: PathBuf,

        /// Path to output Excel file (default: <input>_output.xlsx)
        #[arg(long, short = 'o')]
        output: Option<PathBuf>,

        /// Ship date to process, YYYY-MM-DD (default: date of the first order row)
        #[arg(long = "shipping_date", short = 'd')]
        shipping_date: Option<String>,

        /// Item mapping workbook (default: <platform>_item_mapping.xlsx)
        #[arg(long = "mapping_file", short = 'm')]
        mapping_file: Option<PathBuf>,
    },

    /// Finance ledger creation and reconciliation
    Finance {
        #[command(subcommand)]
        command: FinanceCommands,
    },

    /// Item mapping workbook tools
    Mapping {
        #[command(subcommand)]
        command: MappingCommands,
    },
}

#[derive(Subcommand)]
enum FinanceCommands {
    /// Turn a seller-center transaction report into a reconciliation ledger
    #[command(after_help = "\
Examples:
  shoptally finance new-report income_report_april.xlsx
  shoptally finance new-report income_report_april.xlsx -o ledger.xlsx")]
    NewReport {
        /// Path to the original transaction report file
        original_file: PathBuf,

        /// Output path (default: cleaned_finance_report.xlsx, auto-renamed if taken)
        #[arg(long, short = 'o')]
        output: Option<PathBuf>,
    },

    /// Reconcile a ledger against one or more admin output files
    #[command(after_help = "\
Examples:
  shoptally finance check ledger.xlsx -a shopee_20250417_output.xlsx
  shoptally finance check ledger.xlsx -d outputs/ --date-from 2025-04-01 --date-to 2025-04-30
  shoptally finance check ledger.xlsx -a admin.xlsx --dry-run")]
    Check {
        /// Path to the reconciliation ledger
        report_file: PathBuf,

        /// A single admin output file to reconcile against
        #[arg(long, short = 'a')]
        admin: Option<PathBuf>,

        /// Directory of dated admin files, processed in ascending date order
        #[arg(long = "admin-dir", short = 'd')]
        admin_dir: Option<PathBuf>,

        /// Only consider admin files dated on or after this date (YYYY-MM-DD)
        #[arg(long = "date-from")]
        date_from: Option<String>,

        /// Only consider admin files dated on or before this date (YYYY-MM-DD)
        #[arg(long = "date-to")]
        date_to: Option<String>,

        /// Report what would change without writing any file
        #[arg(long)]
        dry_run: bool,

        /// Clear conflicting claims and re-match instead of failing
        #[arg(long)]
        allow_replace: bool,
    },
}

#[derive(Subcommand)]
enum MappingCommands {
    /// Generate a mapping template workbook from the stock catalog and a
    /// platform product list
    #[command(after_help = "\
Examples:
  shoptally mapping init tiktok --items products_list.json
  shoptally mapping init shopee --items shopee_items.csv --stock-items catalog.csv")]
    Init {
        /// Marketplace the mapping is for (shopee, lazada, tiktok)
        platform: String,

        /// Stock catalog CSV with item_id and item_name columns
        #[arg(long = "stock-items", default_value = "stock_items.csv")]
        stock_items: PathBuf,

        /// Platform product list (seller-center JSON, or CSV)
        #[arg(long)]
        items: PathBuf,

        /// Output path (default: <platform>_item_mapping.xlsx)
        #[arg(long, short = 'o')]
        output: Option<PathBuf>,
    },
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Process { platform, input_file, output, shipping_date, mapping_file } => {
            process::cmd_process(&platform, &input_file, output, shipping_date, mapping_file)
        }
        Commands::Finance { command } => match command {
            FinanceCommands::NewReport { original_file, output } => {
                finance::cmd_new_report(&original_file, output)
            }
            FinanceCommands::Check {
                report_file,
                admin,
                admin_dir,
                date_from,
                date_to,
                dry_run,
                allow_replace,
            } => finance::cmd_check(
                &report_file,
                admin,
                admin_dir,
                date_from,
                date_to,
                dry_run,
                allow_replace,
            ),
        },
        Commands::Mapping { command } => match command {
            MappingCommands::Init { platform, stock_items, items, output } => {
                mapping::cmd_mapping_init(&platform, &stock_items, &items, output)
            }
        },
    };

    match result {
        Ok(()) => ExitCode::from(EXIT_SUCCESS),
        Err(CliError { code, message, hint }) => {
            if !message.is_empty() {
                eprintln!("error: {}", message);
            }
            if let Some(hint) = hint {
                eprintln!("hint:  {}", hint);
            }
            ExitCode::from(code)
        }
    }
}

#[derive(Debug)]
pub struct CliError {
    pub code: u8,
    pub message: String,
    pub hint: Option<String>,
}

impl CliError {
    pub fn args(msg: impl Into<String>) -> Self {
        Self { code: EXIT_USAGE, message: msg.into(), hint: None }
    }

    pub fn schema(msg: impl Into<String>) -> Self {
        Self { code: EXIT_SCHEMA, message: msg.into(), hint: None }
    }

    pub fn missing(msg: impl Into<String>) -> Self {
        Self { code: EXIT_MISSING_RESOURCE, message: msg.into(), hint: None }
    }

    /// Map a pipeline failure to its exit code.
    pub fn pipeline(err: PipelineError) -> Self {
        let code = match &err {
            PipelineError::MissingSheet(_) | PipelineError::MissingColumn { .. } => EXIT_SCHEMA,
            PipelineError::IncompleteMapping { .. } => EXIT_MAPPING,
            PipelineError::Value { .. } => EXIT_VALUE,
        };
        let hint = match &err {
            PipelineError::IncompleteMapping { .. } => {
                Some("add the listed items to the mapping workbook and re-run".to_string())
            }
            _ => None,
        };
        Self { code, message: err.to_string(), hint }
    }

    pub fn recon(err: ReconError) -> Self {
        let (code, hint) = match &err {
            ReconError::MissingColumn { .. } => (EXIT_SCHEMA, None),
            ReconError::DuplicateClaim { .. } | ReconError::ReverseMarkConflict { .. } => (
                EXIT_RECON_DUPLICATE,
                Some("pass --allow-replace to clear the stale claim and re-match".to_string()),
            ),
        };
        Self { code, message: err.to_string(), hint }
    }

    pub fn io(err: IoError) -> Self {
        let code = match &err {
            IoError::Open { .. } | IoError::Io { .. } => EXIT_MISSING_RESOURCE,
            _ => EXIT_ERROR,
        };
        Self { code, message: err.to_string(), hint: None }
    }

    /// Add a hint to an existing error.
    pub fn with_hint(mut self, hint: impl Into<String>) -> Self {
        self.hint = Some(hint.into());
        self
    }
}
