use clap::Parser;
use std::path::PathBuf;
use tracing::info;

use tfe_team_prune::email::{read_email_file, read_stdin};
use tfe_team_prune::logging::init_logging;
use tfe_team_prune::{
    run, AppConfig, AppError, AppResult, EmailSet, ExitStatus, HttpPlatformClient,
    OutcomeReporter, RemovalRequest,
};

#[derive(Parser, Debug)]
#[command(name = "tfe-team-prune")]
#[command(about = "Remove users, by email, from a Terraform Cloud / Enterprise team")]
struct Args {
    /// Organization name (falls back to platform.organization in the config file)
    #[arg(long)]
    org: Option<String>,

    /// Exact, case-sensitive team name
    #[arg(long)]
    team: String,

    /// Email to remove; repeat the flag or separate with commas
    #[arg(short, long = "email")]
    emails: Vec<String>,

    /// File with one or more emails per line (.txt or .csv, UTF-8, '#' comments)
    #[arg(long)]
    emails_file: Option<PathBuf>,

    /// Also read emails from standard input
    #[arg(long)]
    stdin: bool,

    /// YAML configuration file; without it TFE_HOST / TFE_TOKEN are used
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Platform base URL (overrides config and TFE_HOST)
    #[arg(long)]
    host: Option<String>,

    /// Seconds to wait after a successful removal before reporting it
    #[arg(long)]
    settle_delay: Option<u64>,

    /// Enable debug logging
    #[arg(short, long)]
    verbose: bool,
}

fn load_config(args: &Args) -> AppResult<AppConfig> {
    let mut app_config = match &args.config {
        Some(path) => AppConfig::load_from_file(path)?,
        None => AppConfig::from_env(),
    };

    // Override with command line arguments if provided
    if let Some(host) = &args.host {
        app_config.platform.host = host.clone();
    }
    if let Some(delay) = args.settle_delay {
        app_config.removal.settle_delay_secs = delay;
    }

    Ok(app_config)
}

fn collect_emails(args: &Args) -> AppResult<EmailSet> {
    let mut sources = args.emails.clone();
    if let Some(path) = &args.emails_file {
        sources.push(read_email_file(path)?);
    }
    if args.stdin {
        sources.push(read_stdin()?);
    }

    if sources.is_empty() {
        return Err(AppError::Input(
            "provide at least one of --email, --emails-file or --stdin".to_string(),
        ));
    }

    EmailSet::from_sources(&sources)
}

async fn execute(args: Args) -> AppResult<ExitStatus> {
    let app_config = load_config(&args)?;
    init_logging(&app_config.logging, args.verbose);

    let organization = args
        .org
        .clone()
        .or_else(|| app_config.platform.organization.clone())
        .ok_or_else(|| {
            AppError::Configuration(
                "organization is required (--org or platform.organization)".to_string(),
            )
        })?;

    let emails = collect_emails(&args)?;
    app_config.validate()?;

    info!(
        "Platform: {} (settle delay {}s)",
        app_config.platform.api_base(),
        app_config.removal.settle_delay_secs
    );

    let client = HttpPlatformClient::new(&app_config)?;
    let request = RemovalRequest {
        organization,
        team_name: args.team.clone(),
        emails,
    };

    let result = run(&client, &app_config, &request).await?;

    let stdout = std::io::stdout();
    let mut reporter = OutcomeReporter::new(stdout.lock());
    Ok(reporter.report(&result)?)
}

#[tokio::main]
async fn main() {
    let args = Args::parse();

    let code = match execute(args).await {
        Ok(status) => status.code(),
        Err(e) => {
            eprintln!("Error: {}", e);
            e.exit_status().code()
        }
    };

    std::process::exit(code);
}
