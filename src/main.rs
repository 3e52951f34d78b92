use clap::{Parser, Subcommand};
use funpay_hunter::fetch::{HttpFetcher, DEFAULT_TIMEOUT, DEFAULT_USER_AGENT};
use funpay_hunter::funpay::{FunPayExtractor, LISTING_URL};
use funpay_hunter::web::{self, AppState};
use funpay_hunter::{run_inspect, run_parse};
use std::time::Duration;
use tracing::info;
use tracing_error::ErrorLayer;
use tracing_subscriber::prelude::*;

#[derive(Debug, Parser)]
#[command(version, about = "Finds Black Russia lots on FunPay")]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,

    /// Listing page to scrape
    #[arg(long, env = "LISTING_URL", default_value = LISTING_URL, global = true)]
    listing_url: String,

    /// Fetch timeout in seconds
    #[arg(
        long,
        env = "FETCH_TIMEOUT_SECS",
        default_value_t = DEFAULT_TIMEOUT.as_secs(),
        global = true
    )]
    timeout_secs: u64,

    #[arg(long, env = "USER_AGENT", default_value = DEFAULT_USER_AGENT, global = true)]
    user_agent: String,

    /// Port for the web front end
    #[arg(long, env = "PORT", default_value_t = 10000, global = true)]
    port: u16,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Run the web front end (default)
    Serve,
    /// Scrape once and print the lots
    Parse {
        /// Print JSON instead of text
        #[arg(long)]
        json: bool,
    },
    /// Log the structure of the first card on the page
    Inspect,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(
            tracing_subscriber::EnvFilter::try_from_env("LOG_LEVEL").unwrap_or_else(|_| {
                "info,html5ever=error,selectors=error,hyper=warn,reqwest=info,tower_http=debug"
                    .into()
            }),
        )
        .with(ErrorLayer::default())
        .init();

    let cli = Cli::parse();
    let fetcher = HttpFetcher::new(&cli.user_agent, Duration::from_secs(cli.timeout_secs))?;

    match cli.command.unwrap_or(Command::Serve) {
        Command::Serve => {
            info!("Starting FunPay Hunter on port {}", cli.port);
            web::serve(AppState::new(fetcher, &cli.listing_url), cli.port).await?;
        }
        Command::Parse { json } => {
            let lots = run_parse(&fetcher, &FunPayExtractor, &cli.listing_url).await;
            if json {
                println!("{}", serde_json::to_string_pretty(&lots)?);
            } else {
                for lot in &lots {
                    println!("{}", lot);
                }
            }
        }
        Command::Inspect => {
            if !run_inspect(&fetcher, &FunPayExtractor, &cli.listing_url).await {
                std::process::exit(1);
            }
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_cli_parse_subcommand() {
        let args = ["funpay-hunter", "parse", "--json", "--timeout-secs", "3"];
        let cli = Cli::try_parse_from(args).unwrap();
        assert!(matches!(cli.command, Some(Command::Parse { json: true })));
        assert_eq!(cli.timeout_secs, 3);
    }

    #[test]
    fn test_cli_timeout_default_matches_fetcher() {
        let cmd = Cli::command();
        let arg = cmd
            .get_arguments()
            .find(|a| a.get_id() == "timeout_secs")
            .unwrap();
        let defaults = arg
            .get_default_values()
            .iter()
            .map(|v| v.to_string_lossy().into_owned())
            .collect::<Vec<_>>();
        assert_eq!(defaults, vec![DEFAULT_TIMEOUT.as_secs().to_string()]);
    }
}
