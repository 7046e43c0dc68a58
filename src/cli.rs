use std::fs;
use std::path::PathBuf;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use log::info;

use crate::api::{AppState, SearchIndices};
use crate::client::HttpEndpointClient;
use crate::config::{Config, CONFIG};
use crate::error::EndpointError;
use crate::exception_list::{
    exception_list_json_schema, exception_list_schema_mock, trusted_apps_list_schema_mock,
    validate_exception_list,
};
use crate::isolation;
use crate::policy_config::PolicyConfig;
use crate::search::HttpSearchBackend;
use crate::store::selectors::{self, SelectedHostSummary};
use crate::store::{HostAction, Location, Store};

#[derive(Parser)]
#[command(
    name = "endpoint-hosts",
    version,
    about = "Endpoint host management: API server and headless client"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Subcommand)]
pub enum Command {
    /// Start the server (default if no command specified)
    Serve,

    /// Load the host views for a URL against a running server and print the resulting state
    Hosts {
        /// Application URL, e.g. "/hosts?page_index=0&selected_host=abc"
        #[arg(long)]
        url: String,

        /// Server to talk to instead of the configured one
        #[arg(long)]
        base_url: Option<String>,
    },

    /// Report whether host isolation is available for an OS and agent version
    Isolation {
        #[arg(long)]
        os: String,

        #[arg(long)]
        agent_version: String,
    },

    /// Print the default endpoint policy a new integration starts with
    PolicyConfig,

    /// Exception list helpers
    ExceptionList {
        #[command(subcommand)]
        command: ExceptionListCommand,
    },
}

#[derive(Subcommand)]
pub enum ExceptionListCommand {
    /// Print a sample exception list
    Mock {
        /// Print the endpoint trusted apps list instead
        #[arg(long)]
        trusted_apps: bool,
    },

    /// Print the JSON Schema exception list files are checked against
    Schema,

    /// Check an exception list JSON file against the schema
    Validate { path: PathBuf },
}

impl Cli {
    pub fn handle_command_line() -> Result<(), EndpointError> {
        let args = Cli::parse();

        // Default to Serve if no command specified
        match args.command.unwrap_or(Command::Serve) {
            Command::Serve => Self::start_server(),
            Command::Hosts { url, base_url } => Self::load_hosts(&url, base_url),
            Command::Isolation { os, agent_version } => {
                Self::print_isolation(&os, &agent_version);
                Ok(())
            }
            Command::PolicyConfig => {
                println!("{}", serde_json::to_string_pretty(&PolicyConfig::factory())?);
                Ok(())
            }
            Command::ExceptionList { command } => Self::handle_exception_list(command),
        }
    }

    fn config() -> Config {
        CONFIG.get().cloned().unwrap_or_else(Config::default_config)
    }

    fn runtime() -> Result<tokio::runtime::Runtime, EndpointError> {
        tokio::runtime::Runtime::new()
            .map_err(|e| EndpointError::Error(format!("Failed to create runtime: {}", e)))
    }

    fn start_server() -> Result<(), EndpointError> {
        let config = Self::config();
        let host = config.server.host.clone();
        let port = config.server.port;

        info!("Starting server on {}:{}", host, port);

        let search = HttpSearchBackend::new(&config.search.url, config.search.timeout())?;
        let state = AppState::new(Arc::new(search), SearchIndices::from(&config.search));

        Self::runtime()?.block_on(async {
            let web_server = crate::server::WebServer::new(host, port, state);
            web_server.start().await
        })
    }

    fn load_hosts(url: &str, base_url: Option<String>) -> Result<(), EndpointError> {
        let config = Self::config();
        let base_url = base_url.unwrap_or(config.client.base_url.clone());
        let Ok(location) = url.parse::<Location>();

        info!("Loading {} from {}", url, base_url);

        let client = HttpEndpointClient::new(&base_url, config.client.timeout())?;
        let mut store = Store::with_metadata_index_pattern(client, &config.search.metadata_index);

        Self::runtime()?.block_on(store.dispatch(HostAction::UserChangedUrl(location)));

        println!("{}", serde_json::to_string_pretty(store.state())?);
        if let Some(summary) = selectors::selected_host_summary(store.state()) {
            println!("{}", Self::describe_host(&summary));
        }
        Ok(())
    }

    fn describe_host(summary: &SelectedHostSummary) -> String {
        format!(
            "Host {}: isolation {}, policy {}",
            summary.host_id,
            if summary.isolation_supported { "supported" } else { "not supported" },
            summary.policy_status.as_deref().unwrap_or("unknown")
        )
    }

    fn print_isolation(os: &str, agent_version: &str) {
        let supported = isolation::is_isolation_supported(os, agent_version);
        println!(
            "Isolation {} for {} with agent {}",
            if supported { "supported" } else { "not supported" },
            os,
            agent_version
        );
    }

    fn handle_exception_list(command: ExceptionListCommand) -> Result<(), EndpointError> {
        match command {
            ExceptionListCommand::Mock { trusted_apps } => {
                let list = if trusted_apps {
                    trusted_apps_list_schema_mock()
                } else {
                    exception_list_schema_mock()
                };
                println!("{}", serde_json::to_string_pretty(&list)?);
                Ok(())
            }
            ExceptionListCommand::Schema => {
                println!(
                    "{}",
                    serde_json::to_string_pretty(&exception_list_json_schema())?
                );
                Ok(())
            }
            ExceptionListCommand::Validate { path } => {
                let contents = fs::read_to_string(&path)?;
                let value = serde_json::from_str(&contents)?;
                let list = validate_exception_list(&value).map_err(EndpointError::ValidationError)?;
                println!("{}: valid exception list '{}'", path.display(), list.list_id);
                Ok(())
            }
        }
    }
}
