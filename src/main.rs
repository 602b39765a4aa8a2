//! fcc-manuals - find wireless product manuals in FCC filings and mine them
//! with LLM prompt chains.
//!
//! Subcommands are independent pipelines: `manuals` scrapes and downloads
//! PDFs, `extract` answers a fixed question sheet about one manual, and
//! `companies` turns free-text criteria into a list of company names.

use std::path::PathBuf;

use anyhow::Result;
use clap::{ArgAction, Parser, Subcommand};
use tracing_subscriber::EnvFilter;

mod commands;
mod config;
mod fcc;
mod llm;
mod manual;
mod qa;
mod search;

use config::Settings;
use qa::ChainType;

#[derive(Parser)]
#[command(name = "fcc-manuals")]
#[command(author, version, about = "Find and mine wireless product manuals from FCC filings")]
#[command(propagate_version = true)]
struct Cli {
    /// Increase log verbosity (-v debug, -vv trace)
    #[arg(short, long, global = true, action = ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Download user manuals for every company listed in a file
    Manuals {
        /// File with one company name per line
        input_file: PathBuf,

        /// Directory to save manuals in (one subdirectory per company)
        #[arg(default_value = "manuals")]
        output_dir: PathBuf,
    },

    /// Extract product facts from a manual PDF with an LLM
    Extract {
        /// Path to the manual PDF
        path: PathBuf,

        /// How retrieved pages are combined when answering
        #[arg(long = "chain-type", alias = "chain_type", value_enum, default_value_t = ChainType::Stuff)]
        chain_type: ChainType,

        /// Send the whole manual through a single prompt instead of retrieval
        #[arg(long, conflicts_with = "chain_type")]
        whole: bool,
    },

    /// List companies matching free-text criteria using web search and an LLM
    Companies {
        /// What kind of companies are you looking for?
        criteria: String,
    },

    /// List FCC grantee codes for companies matching a name
    Codes {
        /// Company name or keyword
        company: String,
    },
}

fn init_tracing(verbose: u8) {
    let default_directive = match verbose {
        0 => "fcc_manuals=info",
        1 => "fcc_manuals=debug",
        _ => "fcc_manuals=trace",
    };

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directive));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let settings = Settings::load()?;

    match cli.command {
        Commands::Manuals {
            input_file,
            output_dir,
        } => commands::manuals::execute(&input_file, &output_dir, &settings),

        Commands::Extract {
            path,
            chain_type,
            whole,
        } => commands::extract::execute(&path, chain_type, whole, &settings),

        Commands::Companies { criteria } => commands::companies::execute(&criteria, &settings),

        Commands::Codes { company } => commands::codes::execute(&company, &settings),
    }
}
