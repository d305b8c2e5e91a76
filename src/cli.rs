// src/cli.rs
use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "dio-sync")]
#[command(about = "Keep a static HTML resume in sync with a DIO profile")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Config file holding the profile username and skill increment
    #[arg(long, default_value = "dio-config.json")]
    pub config: PathBuf,

    /// Data file the fetch writes and the update reads
    #[arg(long, default_value = "dio-data.json")]
    pub data: PathBuf,

    /// Resume HTML document to patch
    #[arg(long, default_value = "index.html")]
    pub resume: PathBuf,
}

#[derive(Subcommand)]
pub enum Command {
    /// Scrape the DIO profile and refresh the data file
    Fetch {
        /// Log in first (needs DIO_EMAIL and DIO_PASSWORD) and scrape
        /// through a headless browser session
        #[arg(long)]
        login: bool,
    },
    /// Patch the resume HTML from the data file
    Update,
    /// Fetch then update in one run
    Sync {
        /// Log in first (needs DIO_EMAIL and DIO_PASSWORD)
        #[arg(long)]
        login: bool,
    },
}
