use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "regforge", about = "Batch account registration & verification bot")]
pub struct Cli {
    /// Path to config file
    #[arg(short, long, default_value = "config/default.toml")]
    pub config: String,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run a registration batch
    Run {
        /// How many accounts to register
        #[arg(short = 'n', long, default_value = "1")]
        count: usize,

        /// Concurrent workers (overrides config)
        #[arg(short = 'j', long)]
        concurrency: Option<usize>,

        /// Accounts file (overrides config)
        #[arg(short, long)]
        output: Option<String>,
    },
    /// Show saved account stats
    Status,
}
