use anyhow::Result;
use clap::{Parser, Subcommand};

use datachat::assistant::Assistant;
use datachat::{cli, config, web};

#[derive(Debug, Parser)]
#[command(name = "datachat")]
#[command(about = "Chat with your datasets: answers, charts and dashboards")]
#[command(version)]
struct App {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Start the web chat UI
    Serve {
        /// Address to bind (default from [server] addr)
        #[arg(long)]
        addr: Option<String>,
        /// Dataset to start on (default: first registered)
        #[arg(long)]
        dataset: Option<String>,
        /// Don't open a browser window
        #[arg(long)]
        no_open: bool,
    },
    /// Ask a single question and print the answer
    Ask {
        /// The question to ask
        #[arg(trailing_var_arg = true, required = true)]
        question: Vec<String>,
        /// Dataset to ask about (default: first registered)
        #[arg(long, short)]
        dataset: Option<String>,
        /// Output format: table (default), json
        #[arg(long, default_value = "table")]
        format: String,
    },
    /// Interactive chat in the terminal
    Chat {
        /// Dataset to start on (default: first registered)
        #[arg(long, short)]
        dataset: Option<String>,
    },
    /// List registered datasets
    Datasets {
        /// Output format: table (default), json, csv
        #[arg(long, default_value = "table")]
        format: String,
    },
    /// Summarize the interaction log
    Stats {
        /// Output format: table (default), json, csv
        #[arg(long, default_value = "table")]
        format: String,
        /// Only include the last N days of data
        #[arg(long)]
        days: Option<u32>,
    },
    /// Daily question and fallback counts
    Analyze {
        /// Number of days to analyze (default: 7)
        #[arg(long, default_value = "7")]
        days: u32,
        /// Output format: table (default), json, csv
        #[arg(long, default_value = "table")]
        format: String,
    },
    /// Check provider, datasets, config and log
    Health,
    /// Manage configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Debug, Subcommand)]
enum ConfigAction {
    /// Print the effective configuration
    Show,
    /// Write a default ~/.datachat/config.toml
    Init {
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
    /// Set a dotted key, e.g. `provider.kind groq`
    Set { key: String, value: String },
    /// Reset ~/.datachat/config.toml to defaults
    Reset,
}

fn main() -> Result<()> {
    let app = App::parse();

    match app.command {
        Commands::Serve {
            addr,
            dataset,
            no_open,
        } => {
            let cfg = config::load();
            let addr = addr.unwrap_or_else(|| cfg.server.addr.clone());
            let state = web::WebState::new(Assistant::from_config(&cfg)?, dataset.as_deref())?;
            web::serve(&addr, state, cfg.server.open_browser && !no_open)
        }
        Commands::Ask {
            question,
            dataset,
            format,
        } => {
            let fmt = cli::OutputFormat::from_str_opt(Some(&format));
            cli::run_ask(&question.join(" "), dataset.as_deref(), fmt)
        }
        Commands::Chat { dataset } => cli::run_chat(dataset.as_deref()),
        Commands::Datasets { format } => {
            let fmt = cli::OutputFormat::from_str_opt(Some(&format));
            cli::run_datasets(fmt)
        }
        Commands::Stats { format, days } => {
            let fmt = cli::OutputFormat::from_str_opt(Some(&format));
            cli::run_stats(fmt, days)
        }
        Commands::Analyze { days, format } => {
            let fmt = cli::OutputFormat::from_str_opt(Some(&format));
            cli::run_analyze(days, fmt)
        }
        Commands::Health => cli::run_health(),
        Commands::Config { action } => match action {
            ConfigAction::Show => cli::run_config_show(),
            ConfigAction::Init { force } => cli::run_config_init(force),
            ConfigAction::Set { key, value } => cli::run_config_set(&key, &value),
            ConfigAction::Reset => cli::run_config_reset(),
        },
    }
}
