use adlibrary_fetch::{AccessToken, Config, TerminationReason, artifact, records, run_session};
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "adlibrary-fetch", about = "Fetch all ad library records for an advertiser")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Fetch every page and save the records as one JSON array
    Fetch(FetchArgs),
    /// Summarize a saved artifact
    Summary {
        /// Artifact to read
        file: PathBuf,
    },
}

#[derive(Args, Debug)]
struct FetchArgs {
    /// JSON config file
    #[arg(long)]
    config: Option<PathBuf>,

    /// Advertiser to fetch
    #[arg(long)]
    advertiser: Option<String>,

    /// Records per page
    #[arg(long)]
    page_size: Option<u32>,

    /// Throttled responses tolerated per page
    #[arg(long)]
    max_retries: Option<u32>,

    /// Artifact path
    #[arg(long)]
    output: Option<PathBuf>,

    /// Rewrite the artifact after every page
    #[arg(long)]
    checkpoint: bool,
}

impl FetchArgs {
    /// Config file (or defaults) with command-line overrides applied
    fn resolve(self) -> adlibrary_fetch::Result<Config> {
        let mut config = match &self.config {
            Some(path) => Config::from_file(path)?,
            None => Config::default(),
        };
        if let Some(advertiser) = self.advertiser {
            config.fetch.advertiser = advertiser;
        }
        if let Some(page_size) = self.page_size {
            config.fetch.page_size = page_size;
        }
        if let Some(max_retries) = self.max_retries {
            config.fetch.max_retries = max_retries;
        }
        if self.output.is_some() {
            config.output.path = self.output;
        }
        config.output.checkpoint_each_page |= self.checkpoint;
        config.validate()?;
        Ok(config)
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let result = match Cli::parse().command {
        Command::Fetch(args) => fetch(args).await,
        Command::Summary { file } => summary(file).await,
    };

    result.unwrap_or_else(|e| {
        tracing::error!(error = %e, "aborting");
        ExitCode::from(1)
    })
}

async fn fetch(args: FetchArgs) -> adlibrary_fetch::Result<ExitCode> {
    let config = args.resolve()?;
    // Fail fast before any request if the credential is missing
    let token = AccessToken::from_env()?;
    let outcome = run_session(&config, token).await?;

    Ok(match outcome.reason {
        TerminationReason::Completed => ExitCode::SUCCESS,
        TerminationReason::RetriesExhausted { .. } => ExitCode::from(2),
        TerminationReason::HardFailure { .. } => ExitCode::from(3),
    })
}

async fn summary(file: PathBuf) -> adlibrary_fetch::Result<ExitCode> {
    let saved = artifact::read_artifact(&file).await?;
    let summary = records::summarize(&saved);
    println!("{}", serde_json::to_string_pretty(&summary)?);
    Ok(ExitCode::SUCCESS)
}
