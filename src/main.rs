use clap::{Args, Parser, Subcommand, ValueEnum};
use reqwest::Method;
use serde_json::Value;
use tracing_subscriber::EnvFilter;

use eduagent_client::app::App;
use eduagent_client::config::{ClientConfig, ConfigError, normalize_base_url};
use eduagent_client::net::types::{TransportError, UserPatch};
use eduagent_client::router::Outcome;
use eduagent_client::router::routes::ROUTES;

#[derive(Debug, thiserror::Error)]
enum CliError {
    #[error("config error: {0}")]
    Config(#[from] ConfigError),
    #[error("transport error: {0}")]
    Transport(#[from] TransportError),
    #[error("{0} failed")]
    ActionFailed(&'static str),
    #[error("not logged in")]
    NotLoggedIn,
    #[error("nothing to update; pass --name or --email")]
    EmptyProfileUpdate,
    #[error("invalid JSON payload: {0}")]
    InvalidJson(#[from] serde_json::Error),
}

#[derive(Parser, Debug)]
#[command(name = "eduagent", about = "EduAgent client session shell")]
struct Cli {
    /// API root, e.g. `http://127.0.0.1:8000/api`.
    #[arg(long, env = "EDUAGENT_API_BASE_URL")]
    base_url: Option<String>,

    /// Directory holding the persisted session.
    #[arg(long, env = "EDUAGENT_STATE_DIR")]
    state_dir: Option<std::path::PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Sign in and persist the session.
    Login {
        email: String,
        #[arg(long, env = "EDUAGENT_PASSWORD", hide_env_values = true)]
        password: String,
    },
    /// Create an account (does not sign in).
    Register(RegisterArgs),
    /// Drop the persisted session.
    Logout,
    /// Print the signed-in user.
    Whoami,
    /// Re-read the signed-in user from the server.
    Refresh,
    /// Update profile fields of the signed-in user.
    Profile {
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        email: Option<String>,
    },
    /// Evaluate a navigation to `path` against the route guard.
    Navigate { path: String },
    /// List the route table.
    Routes,
    /// Send an authenticated request to the API.
    Api(ApiArgs),
}

#[derive(Args, Debug)]
struct RegisterArgs {
    email: String,
    #[arg(long, env = "EDUAGENT_PASSWORD", hide_env_values = true)]
    password: String,
    #[arg(long)]
    confirm_password: Option<String>,
    #[arg(long)]
    full_name: Option<String>,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum ApiMethod {
    Get,
    Post,
    Put,
    Delete,
}

impl From<ApiMethod> for Method {
    fn from(method: ApiMethod) -> Self {
        match method {
            ApiMethod::Get => Method::GET,
            ApiMethod::Post => Method::POST,
            ApiMethod::Put => Method::PUT,
            ApiMethod::Delete => Method::DELETE,
        }
    }
}

#[derive(Args, Debug)]
struct ApiArgs {
    #[arg(value_enum)]
    method: ApiMethod,
    path: String,
    #[arg(long)]
    data: Option<String>,
}

#[tokio::main]
async fn main() -> Result<(), CliError> {
    let _ = dotenvy::dotenv();
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let mut config = ClientConfig::from_env()?;
    if let Some(base_url) = cli.base_url.as_deref() {
        config.api_base_url = normalize_base_url(base_url)?;
    }
    if let Some(state_dir) = cli.state_dir {
        config.state_dir = state_dir;
    }

    let app = App::new(config)?;
    match cli.command {
        Command::Login { email, password } => run_login(&app, &email, &password).await,
        Command::Register(args) => run_register(&app, args).await,
        Command::Logout => {
            if app.auth.logout() {
                println!("logged out");
            } else {
                println!("no active session");
            }
            Ok(())
        }
        Command::Whoami => run_whoami(&app),
        Command::Refresh => {
            if !app.auth.is_authenticated() {
                return Err(CliError::NotLoggedIn);
            }
            if !app.auth.refresh_user().await {
                return Err(CliError::ActionFailed("refresh"));
            }
            run_whoami(&app)
        }
        Command::Profile { name, email } => run_profile(&app, name, email).await,
        Command::Navigate { path } => {
            run_navigate(&app, &path);
            Ok(())
        }
        Command::Routes => {
            run_routes();
            Ok(())
        }
        Command::Api(args) => run_api(&app, args).await,
    }
}

async fn run_login(app: &App, email: &str, password: &str) -> Result<(), CliError> {
    if !app.auth.login(email, password).await {
        return Err(CliError::ActionFailed("login"));
    }
    let user = app.auth.user().ok_or(CliError::NotLoggedIn)?;
    println!("logged in as {}", user.label());
    Ok(())
}

async fn run_register(app: &App, args: RegisterArgs) -> Result<(), CliError> {
    let confirm = args.confirm_password.as_deref().unwrap_or(&args.password);
    if !app
        .auth
        .register(&args.email, &args.password, confirm, args.full_name.as_deref())
        .await
    {
        return Err(CliError::ActionFailed("registration"));
    }
    println!("registered {}; run `eduagent login` to sign in", args.email);
    Ok(())
}

fn run_whoami(app: &App) -> Result<(), CliError> {
    let user = app.auth.user().ok_or(CliError::NotLoggedIn)?;
    println!("{}", serde_json::to_string_pretty(&user)?);
    Ok(())
}

async fn run_profile(app: &App, name: Option<String>, email: Option<String>) -> Result<(), CliError> {
    if !app.auth.is_authenticated() {
        return Err(CliError::NotLoggedIn);
    }
    let patch = UserPatch { email, display_name: name.map(Some), ..UserPatch::default() };
    if patch.is_empty() {
        return Err(CliError::EmptyProfileUpdate);
    }
    if !app.auth.update_profile(&patch).await {
        return Err(CliError::ActionFailed("profile update"));
    }
    run_whoami(app)
}

fn run_navigate(app: &App, path: &str) {
    let nav = app.router.navigate(path);
    let route = app.router.current_route().map_or("-", |r| r.name);
    match nav.outcome {
        Outcome::Proceeded => println!("{} -> {} [{route}]", nav.from, nav.to),
        Outcome::Redirected => println!("{} -> {} [{route}] (redirected from {path})", nav.from, nav.to),
        Outcome::Blocked => println!("{} blocked; staying at {}", path, nav.to),
    }
}

fn run_routes() {
    for route in ROUTES {
        let access = if route.access.requires_auth { "auth" } else { "public" };
        let view = format!("{:?}", route.view);
        println!("{:<20} {:<18} {view:<18} {access}", route.path, route.name);
    }
}

async fn run_api(app: &App, args: ApiArgs) -> Result<(), CliError> {
    let body = args.data.as_deref().map(serde_json::from_str::<Value>).transpose()?;
    let value: Value = app
        .transport()
        .request_json(args.method.into(), &args.path, body.as_ref())
        .await?;
    println!("{}", serde_json::to_string_pretty(&value)?);
    Ok(())
}
