use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use clap::{Args, Parser, Subcommand};
use farmstay_client::api::types::{LoginRequest, RecommendationFilters, RegisterRequest, SearchFilters};
use farmstay_client::config::ConfigError;
use farmstay_client::gateway::{FixedPlatform, GatewayEvent, SessionExpired, TransportError, handle_session_expired};
use farmstay_client::storage::StorageError;
use farmstay_client::{
    ErrorCode, FarmstayApi, FileStorage, GatewayConfig, GatewayError, RequestGateway, SessionObserver, Storage,
};
use serde_json::Value;
use tokio::sync::broadcast;
use tracing_subscriber::EnvFilter;

#[derive(Debug, thiserror::Error)]
enum CliError {
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),
    #[error("state directory unusable: {0}")]
    Storage(#[from] StorageError),
    #[error("http client unavailable: {0}")]
    Transport(#[from] TransportError),
    #[error("{0}")]
    Gateway(#[from] GatewayError),
    #[error("invalid JSON payload: {0}")]
    InvalidJson(#[from] serde_json::Error),
}

impl CliError {
    fn code(&self) -> &'static str {
        match self {
            Self::Config(e) => e.error_code(),
            Self::Storage(e) => e.error_code(),
            Self::Transport(e) => e.error_code(),
            Self::Gateway(e) => e.error_code(),
            Self::InvalidJson(_) => "E_INVALID_JSON",
        }
    }
}

#[derive(Parser, Debug)]
#[command(name = "farmstay", about = "Farmstay booking API client")]
struct Cli {
    #[arg(long, env = "FARMSTAY_API_BASE_URL")]
    base_url: Option<String>,

    /// Directory holding the persisted session and redirect slots.
    #[arg(long, env = "FARMSTAY_STATE_DIR", default_value = ".farmstay")]
    state_dir: PathBuf,

    /// Go to login after a session expiry without asking.
    #[arg(long, default_value_t = false)]
    yes: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    Login(LoginArgs),
    Register(RegisterArgs),
    Logout,
    Whoami,
    Overview,
    Recommend(FilterArgs),
    Search(SearchArgs),
    Farmstay { id: i64 },
    Rooms { farm_stay_id: i64 },
    Bookings,
    CancelBooking { order_id: i64 },
    Book {
        #[arg(long)]
        data: String,
    },
}

#[derive(Args, Debug)]
struct LoginArgs {
    #[arg(long)]
    username: String,
    #[arg(long, env = "FARMSTAY_PASSWORD")]
    password: String,
    #[arg(long, default_value = "GUEST")]
    user_type: String,
}

#[derive(Args, Debug)]
struct RegisterArgs {
    #[command(flatten)]
    login: LoginArgs,
    #[arg(long)]
    display_name: Option<String>,
}

#[derive(Args, Debug)]
struct FilterArgs {
    #[arg(long)]
    city: Option<String>,
    #[arg(long)]
    price_level: Option<String>,
    #[arg(long)]
    tag: Option<String>,
}

#[derive(Args, Debug)]
struct SearchArgs {
    #[command(flatten)]
    filters: FilterArgs,
    #[arg(long)]
    keyword: Option<String>,
}

impl Command {
    /// Location the command stands for, used as the post-login redirect target.
    fn location(&self) -> String {
        match self {
            Self::Farmstay { id } | Self::Rooms { farm_stay_id: id } => format!("/farmstays/{id}"),
            Self::Bookings | Self::CancelBooking { .. } => "/personal".to_owned(),
            Self::Book { .. } => "/personal#book".to_owned(),
            Self::Login(_) | Self::Register(_) | Self::Logout | Self::Whoami => "/login".to_owned(),
            Self::Overview | Self::Recommend(_) | Self::Search(_) => "/".to_owned(),
        }
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    let _ = dotenvy::dotenv();
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(io::stderr)
        .init();

    let cli = Cli::parse();
    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::debug!(code = e.code(), "command failed");
            eprintln!("error: {e}");
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> Result<(), CliError> {
    let mut config = GatewayConfig::from_env()?;
    if let Some(base_url) = cli.base_url.as_deref() {
        config = config.with_base_url(base_url)?;
    }
    let storage: Arc<dyn Storage> = Arc::new(FileStorage::open(&cli.state_dir)?);
    let platform = Arc::new(FixedPlatform::new(cli.command.location()));
    let gateway = RequestGateway::with_http(config, Some(storage), platform.clone())?;
    let api = FarmstayApi::new(gateway);
    let mut events = api.gateway().subscribe_events();

    let result = dispatch(&api, cli.command).await;
    drain_session_events(&mut events, platform.as_ref(), cli.yes);
    result
}

async fn dispatch(api: &FarmstayApi, command: Command) -> Result<(), CliError> {
    match command {
        Command::Login(args) => {
            let request = login_request(args);
            let record = api.login_and_store(&request).await?;
            println!("logged in as {} ({})", request.username, record.login_type);
            continue_where_left_off(api);
        }
        Command::Register(args) => {
            let display_name = args.display_name;
            let login = login_request(args.login);
            let request = RegisterRequest {
                username: login.username,
                password: login.password,
                user_type: login.user_type,
                display_name,
            };
            let record = api.register_and_store(&request).await?;
            println!("registered {} ({})", request.username, record.login_type);
            continue_where_left_off(api);
        }
        Command::Logout => {
            api.logout();
            println!("logged out");
        }
        Command::Whoami => {
            let observer = SessionObserver::new(api.gateway().session().clone());
            match observer.payload().filter(|_| observer.is_authenticated()) {
                Some(record) => {
                    let name = record
                        .display_name
                        .or(record.username)
                        .unwrap_or_else(|| "(unnamed)".to_owned());
                    println!("{name} ({}), expires {}", record.login_type, record.expire);
                }
                None => println!("not logged in"),
            }
        }
        Command::Overview => print_json(&api.overview().await?)?,
        Command::Recommend(args) => {
            let filters = RecommendationFilters { city: args.city, price_level: args.price_level, tag: args.tag };
            print_json(&api.recommendations(&filters).await?)?;
        }
        Command::Search(args) => {
            let filters = SearchFilters {
                city: args.filters.city,
                keyword: args.keyword,
                price_level: args.filters.price_level,
                tag: args.filters.tag,
            };
            print_json(&api.search_farmstays(&filters).await?)?;
        }
        Command::Farmstay { id } => print_json(&api.farmstay_detail(id).await?)?,
        Command::Rooms { farm_stay_id } => print_json(&api.list_rooms(farm_stay_id).await?)?,
        Command::Bookings => print_json(&api.my_bookings().await?)?,
        Command::CancelBooking { order_id } => print_json(&api.cancel_booking(order_id).await?)?,
        Command::Book { data } => {
            let payload = serde_json::from_str::<Value>(&data)?;
            print_json(&api.create_booking(&payload).await?)?;
        }
    }
    Ok(())
}

fn login_request(args: LoginArgs) -> LoginRequest {
    LoginRequest { username: args.username, password: args.password, user_type: args.user_type }
}

fn continue_where_left_off(api: &FarmstayApi) {
    if let Some(target) = api.gateway().redirect().take() {
        println!("continue at {target}");
    }
}

fn drain_session_events(events: &mut broadcast::Receiver<GatewayEvent>, platform: &FixedPlatform, assume_yes: bool) {
    while let Ok(GatewayEvent::SessionExpired(event)) = events.try_recv() {
        let navigated = handle_session_expired(&event, platform, |e| assume_yes || confirm_login(e));
        if navigated {
            eprintln!("run `farmstay login` to continue at {}", event.redirect_to);
        }
    }
}

fn confirm_login(event: &SessionExpired) -> bool {
    eprint!("{}: session expired, please log in again. Go to login? [y/N] ", event.message);
    let _ = io::stderr().flush();
    let mut answer = String::new();
    if io::stdin().lock().read_line(&mut answer).is_err() {
        return false;
    }
    matches!(answer.trim(), "y" | "Y" | "yes")
}

fn print_json<T: serde::Serialize>(value: &T) -> Result<(), CliError> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

#[cfg(test)]
#[path = "main_test.rs"]
mod tests;
