use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Args, Parser, Subcommand};
use pagerduty_gate::{
    AppServer, AuthGuard, CLIENT_ID_VAR, FileStore, GateConfig, GateError, LOGIN_PATH,
    LOGIN_ROUTE_VAR, Navigation, PKCE_VAR, PagerDutyProvider, REDIRECT_URI_VAR, TIMEOUT_VAR,
    TOKEN_KEY, TokenStore,
};

#[derive(Debug, Parser)]
#[command(
    name = "pagerduty-gate",
    version,
    about = "Serve a Home page gated behind PagerDuty OAuth sign-in."
)]
struct Cli {
    #[command(flatten)]
    gate: GateArgs,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Args)]
struct GateArgs {
    /// OAuth client id registered with PagerDuty
    #[arg(long, env = "PAGERDUTY_CLIENT_ID", global = true)]
    client_id: Option<String>,

    /// Redirect uri registered with PagerDuty; the app server listens here
    #[arg(long, env = "PAGERDUTY_REDIRECT_URI", global = true)]
    redirect_uri: Option<String>,

    /// PKCE parameters to send: blank, omit or s256
    #[arg(long, env = "PAGERDUTY_PKCE", default_value = "blank", global = true)]
    pkce: String,

    /// Send signed-out users to this route instead of straight to PagerDuty
    #[arg(
        long,
        env = "PAGERDUTY_LOGIN_ROUTE",
        num_args = 0..=1,
        default_missing_value = LOGIN_PATH,
        global = true
    )]
    login_route: Option<String>,

    /// Token request timeout in seconds
    #[arg(long, env = "PAGERDUTY_TIMEOUT_SECS", global = true)]
    timeout_secs: Option<u64>,

    /// Provider base url
    #[arg(
        long,
        env = "PAGERDUTY_BASE_URL",
        default_value = PagerDutyProvider::default_base_url(),
        global = true
    )]
    base_url: String,

    /// Where the token is cached
    #[arg(long, env = "PAGERDUTY_GATE_STORE", global = true)]
    store: Option<PathBuf>,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Run the app server
    Serve {
        /// Open the app in a browser once listening
        #[arg(long)]
        open: bool,
    },
    /// Report whether a token is cached
    Status,
    /// Print the provider authorization url
    AuthorizeUrl,
}

impl GateArgs {
    fn config(&self) -> Result<GateConfig, GateError> {
        GateConfig::from_lookup(|name| match name {
            CLIENT_ID_VAR => self.client_id.clone(),
            REDIRECT_URI_VAR => self.redirect_uri.clone(),
            PKCE_VAR => Some(self.pkce.clone()),
            LOGIN_ROUTE_VAR => self.login_route.clone(),
            TIMEOUT_VAR => self.timeout_secs.map(|secs| secs.to_string()),
            _ => None,
        })
    }

    fn store(&self) -> FileStore {
        FileStore::new(self.store.clone().unwrap_or_else(FileStore::default_path))
    }

    fn guard(&self) -> Result<AuthGuard<PagerDutyProvider, FileStore>, GateError> {
        let store = self.store();
        let provider = PagerDutyProvider::with_base_url(&self.base_url);
        AuthGuard::new(provider, self.config()?, store)
    }
}

#[tokio::main]
async fn main() -> Result<ExitCode, GateError> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match cli.command {
        Command::Serve { open } => run_serve(&cli.gate, open).await,
        Command::Status => run_status(&cli.gate),
        Command::AuthorizeUrl => run_authorize_url(&cli.gate),
    }
}

async fn run_serve(args: &GateArgs, open: bool) -> Result<ExitCode, GateError> {
    let server = AppServer::new(args.guard()?)?;
    let listener = server.bind()?;
    let origin = server.config().origin();

    eprintln!("Serving on {origin}");
    if open {
        if let Err(err) = webbrowser::open(&origin) {
            eprintln!("Failed to open browser automatically: {err}");
        }
    }

    server
        .serve_with(listener, async {
            let _ = tokio::signal::ctrl_c().await;
        })
        .await?;
    Ok(ExitCode::SUCCESS)
}

fn run_status(args: &GateArgs) -> Result<ExitCode, GateError> {
    let store = args.store();
    let cached = store.get(TOKEN_KEY)?.filter(|token| !token.is_empty());

    if cached.is_some() {
        println!("authenticated ({})", store.path().display());
        Ok(ExitCode::SUCCESS)
    } else {
        println!("not authenticated");
        Ok(ExitCode::FAILURE)
    }
}

fn run_authorize_url(args: &GateArgs) -> Result<ExitCode, GateError> {
    match args.guard()?.sign_in()? {
        Navigation::RedirectExternal(url) => {
            println!("{url}");
            Ok(ExitCode::SUCCESS)
        }
        other => Err(GateError::InvalidResponse {
            message: format!("unexpected navigation: {other:?}"),
            body: String::new(),
        }),
    }
}
