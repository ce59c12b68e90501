//! Command-line front end
//!
//! Parses arguments with clap and drives [`ApiClient`]. `login` and
//! `register` write the returned token to the credential file; every other
//! command only reads it through the client.

use std::io::{self, Write};
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{anyhow, bail, Context, Result};
use chrono::{DateTime, Utc};
use clap::{Args, Parser, Subcommand};
use serde_json::Value;

use crate::config::{ClientConfig, Overrides};
use crate::models::{
    AuthSession, Credentials, MintRequest, RegisterRequest, RetireRequest, SensorReading,
    TransferRequest,
};
use crate::network::{ApiClient, Filters};
use crate::storage::{FileTokenStore, TokenStore};

#[derive(Debug, Parser)]
#[command(name = "carbonlink", version, about = "Manage a carbon capture unit network")]
pub struct Cli {
    /// API base URL (overrides CARBONLINK_API_URL and the config file)
    #[arg(long, global = true)]
    pub api_url: Option<String>,

    /// Request timeout in seconds
    #[arg(long, global = true)]
    pub timeout: Option<u64>,

    /// Credentials file holding the auth token
    #[arg(long, global = true)]
    pub credentials: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Log in and store the auth token
    Login {
        #[arg(long)]
        email: String,
        /// Prompted for when omitted (the prompt echoes what is typed)
        #[arg(long)]
        password: Option<String>,
    },
    /// Create an account and store the auth token
    Register {
        #[arg(long)]
        name: String,
        #[arg(long)]
        email: String,
        /// Prompted for when omitted (the prompt echoes what is typed)
        #[arg(long)]
        password: Option<String>,
        #[arg(long)]
        organization: Option<String>,
    },
    /// Forget the stored auth token
    Logout,
    /// Show the logged-in user
    Whoami,
    #[command(subcommand)]
    Units(UnitCommand),
    #[command(subcommand)]
    Sensors(SensorCommand),
    #[command(subcommand)]
    Analytics(AnalyticsCommand),
    #[command(subcommand)]
    Credits(CreditCommand),
    #[command(subcommand)]
    Reports(ReportCommand),
    /// Print realtime updates until interrupted
    Watch,
}

#[derive(Debug, Args)]
pub struct FilterArgs {
    /// Query filter, repeatable
    #[arg(long = "filter", value_name = "KEY=VALUE", value_parser = parse_key_val)]
    pub filters: Vec<(String, String)>,
}

impl FilterArgs {
    fn to_filters(&self) -> Filters {
        self.filters.iter().cloned().collect()
    }
}

#[derive(Debug, Args)]
pub struct DataArgs {
    /// JSON request body
    #[arg(long, value_parser = parse_json)]
    pub data: Value,
}

#[derive(Debug, Subcommand)]
pub enum UnitCommand {
    List(FilterArgs),
    Get { id: String },
    Create(DataArgs),
    Update {
        id: String,
        #[command(flatten)]
        data: DataArgs,
    },
    Delete { id: String },
    /// Run AI optimization for a unit
    Optimize { id: String },
}

#[derive(Debug, Subcommand)]
pub enum SensorCommand {
    List(FilterArgs),
    Get { id: String },
    Create(DataArgs),
    Update {
        id: String,
        #[command(flatten)]
        data: DataArgs,
    },
    /// Record a reading for a sensor
    Reading {
        id: String,
        #[arg(long)]
        value: f64,
        #[arg(long)]
        quality: Option<String>,
        /// RFC 3339 timestamp, defaults to now
        #[arg(long, value_parser = parse_timestamp)]
        timestamp: Option<DateTime<Utc>>,
    },
}

#[derive(Debug, Subcommand)]
pub enum AnalyticsCommand {
    /// AI model health
    Health,
    Unit {
        id: String,
        #[arg(long)]
        timeframe: Option<String>,
    },
    /// Network-wide insights
    Insights,
}

#[derive(Debug, Subcommand)]
pub enum CreditCommand {
    List(FilterArgs),
    Get { id: String },
    Mint {
        #[arg(long)]
        unit: String,
        #[arg(long)]
        amount: f64,
        #[arg(long, value_parser = parse_json)]
        metadata: Option<Value>,
    },
    Transfer {
        id: String,
        #[arg(long)]
        to: String,
        #[arg(long)]
        amount: Option<f64>,
    },
    Retire {
        id: String,
        #[arg(long)]
        amount: Option<f64>,
        #[arg(long)]
        reason: Option<String>,
    },
    /// Current market snapshot
    Market,
}

#[derive(Debug, Subcommand)]
pub enum ReportCommand {
    /// Performance report for one unit
    Unit {
        id: String,
        #[command(flatten)]
        filters: FilterArgs,
    },
    Network(FilterArgs),
    Credits(FilterArgs),
    Environmental(FilterArgs),
}

/// Execute a parsed command line
pub async fn run(cli: Cli) -> Result<()> {
    let config = ClientConfig::from_env(Overrides {
        base_url: cli.api_url,
        timeout_secs: cli.timeout,
        credentials_path: cli.credentials,
    })
    .context("Failed to load configuration")?;

    let store = Arc::new(FileTokenStore::new(config.credentials_path.clone()));
    let client = ApiClient::new(config, store.clone()).context("Failed to create API client")?;

    tracing::info!(base_url = %client.base_url(), "Starting");

    match cli.command {
        Command::Login { email, password } => {
            let password = password.map_or_else(|| interactive_prompt("your password"), Ok)?;
            let session: AuthSession = client.login(&Credentials { email, password }).await?;
            store_session(store.as_ref(), &session)?;
        }
        Command::Register {
            name,
            email,
            password,
            organization,
        } => {
            let password = password.map_or_else(|| interactive_prompt("a password"), Ok)?;
            let request = RegisterRequest {
                name,
                email,
                password,
                organization,
            };
            let session: AuthSession = client.register(&request).await?;
            store_session(store.as_ref(), &session)?;
        }
        Command::Logout => {
            store.clear()?;
            println!("Logged out");
        }
        Command::Whoami => print_json(&client.current_user::<Value>().await?),
        Command::Units(cmd) => run_units(&client, cmd).await?,
        Command::Sensors(cmd) => run_sensors(&client, cmd).await?,
        Command::Analytics(cmd) => run_analytics(&client, cmd).await?,
        Command::Credits(cmd) => run_credits(&client, cmd).await?,
        Command::Reports(cmd) => run_reports(&client, cmd).await?,
        Command::Watch => watch(&client).await?,
    }

    Ok(())
}

async fn run_units(client: &ApiClient, cmd: UnitCommand) -> Result<()> {
    let result: Value = match cmd {
        UnitCommand::List(args) => client.list_units(&args.to_filters()).await?,
        UnitCommand::Get { id } => client.get_unit(&id).await?,
        UnitCommand::Create(args) => client.create_unit(&args.data).await?,
        UnitCommand::Update { id, data } => client.update_unit(&id, &data.data).await?,
        UnitCommand::Delete { id } => client.delete_unit(&id).await?,
        UnitCommand::Optimize { id } => client.optimize_unit(&id).await?,
    };
    print_json(&result);
    Ok(())
}

async fn run_sensors(client: &ApiClient, cmd: SensorCommand) -> Result<()> {
    let result: Value = match cmd {
        SensorCommand::List(args) => client.list_sensors(&args.to_filters()).await?,
        SensorCommand::Get { id } => client.get_sensor(&id).await?,
        SensorCommand::Create(args) => client.create_sensor(&args.data).await?,
        SensorCommand::Update { id, data } => client.update_sensor(&id, &data.data).await?,
        SensorCommand::Reading {
            id,
            value,
            quality,
            timestamp,
        } => {
            let reading = SensorReading {
                value,
                quality,
                timestamp: timestamp.unwrap_or_else(Utc::now),
            };
            client.add_sensor_reading(&id, &reading).await?
        }
    };
    print_json(&result);
    Ok(())
}

async fn run_analytics(client: &ApiClient, cmd: AnalyticsCommand) -> Result<()> {
    let result: Value = match cmd {
        AnalyticsCommand::Health => client.model_health().await?,
        AnalyticsCommand::Unit { id, timeframe } => {
            client.unit_analytics(&id, timeframe.as_deref()).await?
        }
        AnalyticsCommand::Insights => client.network_insights().await?,
    };
    print_json(&result);
    Ok(())
}

async fn run_credits(client: &ApiClient, cmd: CreditCommand) -> Result<()> {
    let result: Value = match cmd {
        CreditCommand::List(args) => client.list_credits(&args.to_filters()).await?,
        CreditCommand::Get { id } => client.get_credit(&id).await?,
        CreditCommand::Mint {
            unit,
            amount,
            metadata,
        } => {
            let mint = MintRequest {
                unit_id: unit,
                amount,
                metadata,
            };
            client.mint_credits(&mint).await?
        }
        CreditCommand::Transfer { id, to, amount } => {
            let transfer = TransferRequest {
                recipient: to,
                amount,
            };
            client.transfer_credit(&id, &transfer).await?
        }
        CreditCommand::Retire { id, amount, reason } => {
            client
                .retire_credit(&id, &RetireRequest { amount, reason })
                .await?
        }
        CreditCommand::Market => client.credit_market().await?,
    };
    print_json(&result);
    Ok(())
}

async fn run_reports(client: &ApiClient, cmd: ReportCommand) -> Result<()> {
    let result: Value = match cmd {
        ReportCommand::Unit { id, filters } => {
            client
                .unit_performance_report(&id, &filters.to_filters())
                .await?
        }
        ReportCommand::Network(args) => {
            client
                .network_performance_report(&args.to_filters())
                .await?
        }
        ReportCommand::Credits(args) => client.credit_report(&args.to_filters()).await?,
        ReportCommand::Environmental(args) => {
            client.environmental_report(&args.to_filters()).await?
        }
    };
    print_json(&result);
    Ok(())
}

async fn watch(client: &ApiClient) -> Result<()> {
    let mut channel = client
        .subscribe(|message: Value| print_json(&message))
        .ok_or_else(|| anyhow!("Realtime channel unavailable"))?;

    eprintln!("Listening on {} (Ctrl-C to stop)", channel.url());

    let interrupted = tokio::select! {
        _ = tokio::signal::ctrl_c() => true,
        _ = channel.closed() => false,
    };

    if interrupted {
        channel.close().await;
    } else {
        bail!("Realtime channel closed (see log for details)");
    }
    Ok(())
}

fn store_session(store: &dyn TokenStore, session: &AuthSession) -> Result<()> {
    store
        .save(&session.token)
        .context("Failed to store auth token")?;
    match &session.user {
        Some(user) => println!(
            "Logged in as {}",
            user.email.as_deref().or(user.name.as_deref()).unwrap_or(&user.id)
        ),
        None => println!("Logged in"),
    }
    Ok(())
}

fn print_json(value: &Value) {
    println!(
        "{}",
        serde_json::to_string_pretty(value).unwrap_or_else(|_| value.to_string())
    );
}

/// Read a line from the terminal; input is echoed
fn interactive_prompt(what: &str) -> Result<String> {
    let mut response = String::new();
    print!("Please enter {}: ", what);
    io::stdout().flush()?;
    io::stdin()
        .read_line(&mut response)
        .context("Failed to read from stdin")?;

    let response = response.trim_end_matches(&['\r', '\n'][..]).to_string();
    if response.is_empty() {
        bail!("No input given for {}", what);
    }
    Ok(response)
}

fn parse_key_val(s: &str) -> Result<(String, String), String> {
    let (key, value) = s
        .split_once('=')
        .ok_or_else(|| format!("expected KEY=VALUE, got '{}'", s))?;
    if key.is_empty() {
        return Err(format!("empty key in '{}'", s));
    }
    Ok((key.to_string(), value.to_string()))
}

fn parse_json(s: &str) -> Result<Value, String> {
    serde_json::from_str(s).map_err(|e| format!("invalid JSON: {}", e))
}

fn parse_timestamp(s: &str) -> Result<DateTime<Utc>, String> {
    DateTime::parse_from_rfc3339(s)
        .map(|t| t.with_timezone(&Utc))
        .map_err(|e| format!("invalid RFC 3339 timestamp: {}", e))
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_password_help_mentions_echo() {
        let cmd = Cli::command();
        for name in ["login", "register"] {
            let sub = cmd.find_subcommand(name).unwrap();
            let password = sub
                .get_arguments()
                .find(|arg| arg.get_id() == "password")
                .unwrap();
            let help = password.get_help().unwrap().to_string();
            assert!(help.contains("echoes"), "{}: {}", name, help);
        }
    }

    #[test]
    fn test_parse_unit_list_filters() {
        let cli = Cli::try_parse_from([
            "carbonlink",
            "units",
            "list",
            "--filter",
            "status=active",
            "--filter",
            "region=north",
        ])
        .unwrap();

        match cli.command {
            Command::Units(UnitCommand::List(args)) => {
                let filters = args.to_filters();
                assert_eq!(filters.to_query_string(), "region=north&status=active");
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_parse_global_api_url_after_subcommand() {
        let cli = Cli::try_parse_from([
            "carbonlink",
            "credits",
            "market",
            "--api-url",
            "http://plant.local/api",
        ])
        .unwrap();
        assert_eq!(cli.api_url.as_deref(), Some("http://plant.local/api"));
        assert!(matches!(cli.command, Command::Credits(CreditCommand::Market)));
    }

    #[test]
    fn test_invalid_json_data_rejected() {
        let result = Cli::try_parse_from(["carbonlink", "units", "create", "--data", "{oops"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_parse_helpers() {
        assert_eq!(
            parse_key_val("timeframe=7d").unwrap(),
            ("timeframe".to_string(), "7d".to_string())
        );
        assert!(parse_key_val("novalue").is_err());
        assert!(parse_key_val("=x").is_err());

        let ts = parse_timestamp("2024-05-01T12:00:00+02:00").unwrap();
        assert_eq!(ts.to_rfc3339(), "2024-05-01T10:00:00+00:00");
    }
}
