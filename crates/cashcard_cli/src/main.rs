//! Command-line driver for the cash card request surface.
//!
//! Runs one request against a SQLite file as one of the demo principals and
//! prints the status code followed by the body or location.

use cashcard_core::db::{open_db, open_db_in_memory};
use cashcard_core::{
    core_version, init_logging, ApiResponse, CardApi, CardId, CardPayload, CardRequest,
    CardService, CoreConfig, Credentials, Decimal, InMemoryAuthenticator, PageRequest,
    SqliteCardRepository,
};
use clap::{Parser, Subcommand};
use log::error;
use std::path::PathBuf;
use std::process::ExitCode;

#[derive(Parser, Debug)]
#[command(name = "cashcard", version, about = "Owner-scoped cash card store")]
struct CliArgs {
    /// Path to a TOML configuration file.
    #[arg(short, long, env = "CASHCARD_CONFIG")]
    config: Option<PathBuf>,

    /// SQLite database file; overrides `[database].path`.
    #[arg(long)]
    db: Option<PathBuf>,

    /// Username to authenticate as.
    #[arg(short, long, env = "CASHCARD_USER")]
    user: Option<String>,

    /// Password for `--user`.
    #[arg(short, long, env = "CASHCARD_PASSWORD")]
    password: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Fetch one card.
    Get { id: CardId },
    /// Create a card owned by the caller.
    Create {
        #[arg(allow_hyphen_values = true)]
        amount: String,
    },
    /// List the caller's cards.
    List {
        #[arg(long, allow_hyphen_values = true)]
        page: Option<i64>,
        #[arg(long, allow_hyphen_values = true)]
        size: Option<i64>,
        /// `field` or `field,direction`, e.g. `amount,desc`.
        #[arg(long)]
        sort: Option<String>,
    },
    /// Replace the amount of one card.
    Update {
        id: CardId,
        #[arg(allow_hyphen_values = true)]
        amount: String,
    },
    /// Delete one card.
    Delete { id: CardId },
    /// Print version information.
    Version,
}

fn main() -> ExitCode {
    let args = CliArgs::parse();
    match run(args) {
        Ok(code) => code,
        Err(message) => {
            eprintln!("error: {message}");
            ExitCode::from(2)
        }
    }
}

fn run(args: CliArgs) -> Result<ExitCode, String> {
    let request = match args.command {
        Command::Version => {
            println!("cashcard_core version={}", core_version());
            return Ok(ExitCode::SUCCESS);
        }
        Command::Get { id } => CardRequest::Get { id },
        Command::Create { amount } => CardRequest::Create {
            body: payload_body(&amount)?,
        },
        Command::List { page, size, sort } => CardRequest::List {
            page: PageRequest::new(page, size, sort),
        },
        Command::Update { id, amount } => CardRequest::Update {
            id,
            body: payload_body(&amount)?,
        },
        Command::Delete { id } => CardRequest::Delete { id },
    };

    let config = CoreConfig::load(args.config.as_deref()).map_err(|err| err.to_string())?;
    init_logging(&config.logging)?;

    let db_path = args.db.or(config.database.path.clone());
    let conn = match db_path.as_deref() {
        Some(path) => open_db(path),
        None => open_db_in_memory(),
    }
    .map_err(|err| {
        error!("event=cli_start module=cli status=error error={err}");
        err.to_string()
    })?;

    let repo = SqliteCardRepository::try_new(&conn).map_err(|err| err.to_string())?;
    let authenticator = InMemoryAuthenticator::with_demo_users(&config.password_hash)
        .map_err(|err| err.to_string())?;
    let api = CardApi::new(authenticator, CardService::new(repo, config.paging));

    let credentials = match (args.user, args.password) {
        (Some(user), Some(password)) => Some(Credentials::new(user, password)),
        _ => None,
    };
    let response = api.handle(credentials.as_ref(), request);
    print_response(&response);

    Ok(if response.status.is_success() {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}

fn payload_body(amount: &str) -> Result<String, String> {
    let amount = amount
        .trim()
        .parse::<Decimal>()
        .map_err(|err| format!("invalid amount `{amount}`: {err}"))?;
    let payload = CardPayload {
        id: None,
        amount,
        owner: None,
    };
    serde_json::to_string(&payload).map_err(|err| err.to_string())
}

fn print_response(response: &ApiResponse) {
    println!("{}", response.status.code());
    if let Some(location) = response.location.as_deref() {
        println!("location: {location}");
    }
    if let Some(body) = response.body.as_deref() {
        println!("{body}");
    }
}
