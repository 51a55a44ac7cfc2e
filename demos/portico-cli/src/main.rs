use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use portico::prelude::*;

/// Where the session is kept when neither `--state` nor
/// `PORTICO_STORAGE_PATH` says otherwise.
const DEFAULT_STATE_FILE: &str = ".portico/session.json";

// ---------------------------------------------------------------------------
// Command line
// ---------------------------------------------------------------------------

#[derive(Parser, Debug)]
#[command(name = "portico")]
#[command(about = "Member portal client: sign in, sign out, and open pages")]
#[command(version)]
struct Cli {
    /// Log at debug level (RUST_LOG overrides)
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Backend base URL (defaults to PORTICO_API_URL, then http://localhost:5000)
    #[arg(long, global = true, value_name = "URL")]
    api: Option<String>,

    /// File the session token is kept in
    #[arg(long, global = true, value_name = "FILE")]
    state: Option<PathBuf>,

    /// Sign in against the built-in development accounts instead of a backend
    #[arg(long, global = true)]
    dev: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Sign in with a mobile number and password
    Login {
        /// Local mobile number; the country code is added unless it starts with '+'
        mobile_number: String,
        #[arg(short, long)]
        password: String,
    },

    /// Sign out and forget the stored session
    Logout,

    /// Show whether a session is stored
    Status,

    /// Open a page and report whether the session may see it
    Open {
        /// Page path, e.g. /bulletin
        #[arg(default_value = "/")]
        path: String,
    },

    /// List the home-screen entries
    Menu,
}

impl Cli {
    fn config(&self) -> Result<PortalConfig, PorticoError> {
        let mut config = PortalConfig::from_env()?;

        if let Some(api) = &self.api {
            config = config.api_base_url(api.clone());
        }
        if self.dev {
            config = config.environment(Environment::Development);
        }
        config = match (&self.state, config.storage.clone()) {
            (Some(path), _) => config.storage(StorageConfig::File { path: path.clone() }),
            (None, StorageConfig::Memory) => config.storage(StorageConfig::File {
                path: PathBuf::from(DEFAULT_STATE_FILE),
            }),
            (None, StorageConfig::File { .. }) => config,
        };
        Ok(config)
    }

    fn portal(&self) -> Result<Portal, PorticoError> {
        let mut builder = Portal::builder().config(self.config()?);
        if self.dev {
            builder = builder.dev_gateway(DevGateway::default());
        }
        builder.build()
    }
}

// ---------------------------------------------------------------------------
// Commands
// ---------------------------------------------------------------------------

async fn run(cli: Cli) -> Result<(), PorticoError> {
    if let Command::Menu = cli.command {
        for item in menu() {
            println!("{:<24} {}", item.route.path(), item.title);
        }
        return Ok(());
    }

    let portal = cli.portal()?;

    match cli.command {
        Command::Login {
            mobile_number,
            password,
        } => {
            let landing = portal.login(LoginForm::new(mobile_number, password)).await?;
            println!("signed in, continue to {landing}");
        }
        Command::Logout => {
            let next = portal.logout().await;
            println!("signed out, continue to {next}");
        }
        Command::Status => match portal.token().await {
            Some(token) => println!("signed in (token {token})"),
            None => println!("signed out"),
        },
        Command::Open { path } => {
            let nav = portal.navigate(&path).await?;
            match nav.decision {
                RouteDecision::Allow => println!("{}: allowed", nav.route),
                RouteDecision::RedirectTo(target) => {
                    println!("{}: redirected to {target}", nav.route)
                }
                RouteDecision::Pending => println!("{}: still loading", nav.route),
            }
        }
        Command::Menu => {}
    }
    Ok(())
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!(error = %e, "command failed");
            ExitCode::FAILURE
        }
    }
}
