use std::io::{self, BufRead};
use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Context;
use clap::{CommandFactory, Parser};
use clap_complete::Shell;
use tracing_subscriber::EnvFilter;
use wikiterm_core::{ClientConfig, WikiClient, sanitize_language};

mod echo;
mod pager;
mod render;
mod session;

use session::{Session, SessionOptions};

const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Read Wikipedia articles from the terminal
#[derive(Parser, Debug)]
#[command(name = "wikiterm")]
#[command(author = "Wikiterm Contributors")]
#[command(version)]
#[command(about = "Read Wikipedia articles from the terminal", long_about = None)]
struct Args {
    /// Title of the Wikipedia article (or search query with --search)
    #[arg(value_name = "TITLE")]
    title: Vec<String>,

    /// Language code
    #[arg(short, long, default_value = "en", value_name = "LANG")]
    lang: String,

    /// Search for articles
    #[arg(short, long)]
    search: bool,

    /// Select section to display
    #[arg(short = 'S', long)]
    section: bool,

    /// Save output to a file
    #[arg(short, long, value_name = "FILE")]
    output: Option<PathBuf>,

    /// Use pager for long articles ($PAGER, or "less -R")
    #[arg(short, long)]
    pager: bool,

    /// HTTP timeout in seconds
    #[arg(long, default_value = "30", value_name = "SECS")]
    timeout: u64,

    /// Custom User-Agent for HTTP requests
    #[arg(long, value_name = "UA")]
    user_agent: Option<String>,

    /// Enable debug logging
    #[arg(short, long)]
    verbose: bool,

    /// Print a shell completion script and exit
    #[arg(long, value_name = "SHELL")]
    completions: Option<Shell>,
}

fn init_logging(verbose: bool) {
    let default_filter = if verbose { "wikiterm=debug,wikiterm_core=debug" } else { "error" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .init();
}

/// Wait for Enter so a diagnostic stays on screen.
fn pause() {
    eprintln!("Press Enter to exit...");
    let mut line = String::new();
    let _ = io::stdin().lock().read_line(&mut line);
}

async fn run(args: Args) -> anyhow::Result<ExitCode> {
    let mut config = ClientConfig { timeout: args.timeout, ..Default::default() };
    if let Some(user_agent) = args.user_agent {
        config.user_agent = user_agent;
    }

    if args.verbose {
        echo::print_stage(echo::Stage::Configure);
        echo::print_detail("Language", sanitize_language(&args.lang));
        echo::print_detail("Timeout", format!("{}s", config.timeout));
        echo::print_detail("User-Agent", &config.user_agent);
    }

    let client = WikiClient::new(config).context("Failed to build HTTP client")?;

    let words = args.title.join(" ");
    let options = SessionOptions {
        lang: args.lang,
        search: args.search,
        section: args.section,
        output: args.output.clone(),
        pager: args.pager,
    };

    if args.verbose {
        echo::print_stage(if options.search { echo::Stage::Search(&words) } else { echo::Stage::Fetch(&words) });
    }

    let stdin = io::stdin();
    let mut session = Session::new(&client, options, stdin.lock(), io::stdout());
    let outcome = session.run(&words).await?;

    if args.verbose
        && let Some(path) = &args.output
        && let Ok(meta) = std::fs::metadata(path)
    {
        echo::print_saved(path, meta.len());
    }

    Ok(outcome.into())
}

#[tokio::main]
async fn main() -> ExitCode {
    let args = Args::parse();

    if let Some(shell) = args.completions {
        clap_complete::generate(shell, &mut Args::command(), "wikiterm", &mut io::stdout());
        return ExitCode::SUCCESS;
    }

    init_logging(args.verbose);

    if args.verbose {
        echo::print_banner(&args.lang);
    }

    match run(args).await {
        Ok(code) => code,
        Err(e) => {
            echo::print_error(&format!("An error occurred: {:#}", e));
            tracing::error!(error = ?e, "unexpected failure");
            pause();
            ExitCode::FAILURE
        }
    }
}
