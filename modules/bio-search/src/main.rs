use std::path::PathBuf;

use anyhow::Result;
use apify_client::ApifyClient;
use clap::{Args, Parser, Subcommand};
use tracing::info;
use tracing_subscriber::EnvFilter;

use bio_search::display;
use bio_search::export::{self, ExportFormat};
use bio_search::{AppConfig, BatchOutcome, BioSearch, SessionStore};

/// Find followers of an Instagram account whose bio contains a keyword.
#[derive(Parser, Debug)]
#[command(name = "bio-search", version)]
struct Cli {
    /// Session file that carries progress between runs
    #[arg(long, global = true)]
    state_file: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Fetch the next batch of pending profiles and filter them (resumes where the last run stopped)
    Run(RunArgs),
    /// Drop the cached follower list; the next run fetches it again
    Refetch,
    /// Drop followers, progress and accumulated matches
    Reset,
    /// Show session counts and the cost estimate
    Status,
    /// Print accumulated matches
    Show,
    /// Write accumulated matches to JSON and/or CSV
    Export(ExportArgs),
}

#[derive(Args, Debug)]
struct RunArgs {
    /// Apify API token (overrides APIFY_API_KEY)
    #[arg(long)]
    token: Option<String>,

    /// Account whose followers are searched, without the @
    #[arg(long)]
    target: Option<String>,

    /// Text that must appear in the bio (case-sensitive)
    #[arg(long)]
    keyword: Option<String>,

    /// Maximum followers to fetch (100-2000)
    #[arg(long)]
    max_followers: Option<u32>,

    /// Profiles fetched per run (50-500)
    #[arg(long)]
    max_profiles: Option<u32>,

    /// Keep running batches until every follower is processed
    #[arg(long)]
    all: bool,
}

#[derive(Args, Debug)]
struct ExportArgs {
    #[arg(long, value_enum, default_value = "both")]
    format: ExportFormat,

    /// Directory the files are written to
    #[arg(long, default_value = ".")]
    out_dir: PathBuf,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::from_default_env()
                .add_directive("bio_search=info".parse()?)
                .add_directive("apify_client=info".parse()?),
        )
        .init();

    let cli = Cli::parse();
    let mut config = AppConfig::from_env()?;
    if let Some(path) = cli.state_file {
        config.state_file = path;
    }

    let store = SessionStore::new(config.state_file.clone());
    let mut session = store.load()?;

    match cli.command {
        Command::Run(args) => {
            if let Some(token) = args.token {
                config.apify_api_key = Some(token);
            }
            if let Some(target) = args.target {
                config.target = Some(target);
            }
            if let Some(keyword) = args.keyword {
                config.keyword = keyword;
            }
            if let Some(n) = args.max_followers {
                config.max_followers = n;
            }
            if let Some(n) = args.max_profiles {
                config.max_profiles = n;
            }

            let api_key = config.api_key()?.to_string();
            let params = config.search_params()?;
            let client = ApifyClient::new(api_key).with_base_url(&config.apify_base_url);
            let search = BioSearch::new(client);

            info!(
                account = %params.target,
                keyword = %params.keyword,
                max_followers = params.max_followers,
                max_profiles = params.max_profiles,
                "Starting search"
            );

            let failed = if args.all {
                let outcomes = search
                    .run_until_done(&mut session, &params, |session, outcome| {
                        println!("{}", display::render_outcome(outcome, session, &params.keyword));
                        store.save(session)
                    })
                    .await?;
                outcomes.last().is_some_and(BatchOutcome::is_failure)
            } else {
                let outcome = search.run_batch(&mut session, &params).await;
                store.save(&session)?;
                println!("{}", display::render_outcome(&outcome, &session, &params.keyword));
                outcome.is_failure()
            };
            if failed {
                std::process::exit(1);
            }

            print!("{}", display::render_matches(session.matches()));
        }
        Command::Refetch => {
            session.refetch_followers();
            store.save(&session)?;
            println!("Follower cache cleared; the next run fetches the list again.");
        }
        Command::Reset => {
            session.reset();
            store.save(&session)?;
            println!("Session reset.");
        }
        Command::Status => {
            let cost = config.search_params().ok().map(|p| p.estimated_cost());
            print!("{}", display::render_status(&session.stats(), cost));
        }
        Command::Show => {
            print!("{}", display::render_matches(session.matches()));
        }
        Command::Export(args) => {
            let written = export::write_exports(session.matches(), &args.out_dir, args.format)?;
            for path in written {
                println!("Wrote {}", path.display());
            }
        }
    }

    Ok(())
}
