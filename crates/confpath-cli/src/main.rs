mod cmd_edit;
mod cmd_get;
mod cmd_key;
mod cmd_proxy;
mod cmd_put;
mod cmd_tree;
mod cmd_watch;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use confpath_restconf::{
    ClientConfig, DEFAULT_BASE_URL, DEFAULT_DATA_PREFIX, DEFAULT_NOTIFICATION_PREFIX,
};
use std::path::PathBuf;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "cpath")]
#[command(about = "Browse, edit, and proxy RESTCONF configuration trees")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// RESTCONF server base URL
    #[arg(long, global = true, env = "CONFPATH_BASE_URL", default_value = DEFAULT_BASE_URL)]
    base_url: String,

    /// Resource prefix for datastore paths
    #[arg(long, global = true, env = "CONFPATH_DATA_PREFIX", default_value = DEFAULT_DATA_PREFIX)]
    data_prefix: String,

    /// Resource prefix for the notification stream
    #[arg(long, global = true, env = "CONFPATH_NOTIF_PREFIX", default_value = DEFAULT_NOTIFICATION_PREFIX)]
    notif_prefix: String,

    /// Request timeout in seconds
    #[arg(long, global = true, default_value_t = 30)]
    timeout_secs: u64,

    /// Pretty-print JSON output
    #[arg(long, global = true)]
    pretty: bool,
}

impl Cli {
    fn client_config(&self) -> Result<ClientConfig> {
        Ok(ClientConfig::new(&self.base_url)
            .with_context(|| format!("invalid base URL {:?}", self.base_url))?
            .with_data_prefix(self.data_prefix.as_str())
            .with_notification_prefix(self.notif_prefix.as_str())
            .with_timeout(Duration::from_secs(self.timeout_secs)))
    }
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Show the configuration tree with the address of every node
    Tree {
        /// Build the tree from a local JSON file instead of the server
        #[arg(short, long)]
        input: Option<PathBuf>,

        /// Output the tree as JSON
        #[arg(long)]
        json: bool,
    },
    /// Fetch the subtree at a path
    Get {
        /// Tree path, e.g. interfaces/interface=eth0
        path: String,
    },
    /// Replace the subtree at a path with the contents of a file
    Put {
        /// Tree path
        path: String,

        /// JSON file to write (use - for stdin)
        #[arg(short, long)]
        input: String,
    },
    /// Edit the subtree at a path in $EDITOR and write it back
    Edit {
        /// Tree path
        path: String,
    },
    /// Print notifications as they arrive
    Watch {
        /// Stop after this many notifications
        #[arg(long)]
        limit: Option<usize>,
    },
    /// Encode or decode list key segments
    Key {
        #[command(subcommand)]
        op: cmd_key::KeyOp,
    },
    /// Forward /restconf/data requests to an upstream server
    Proxy {
        /// Address to listen on
        #[arg(long, default_value = cmd_proxy::DEFAULT_LISTEN)]
        listen: String,

        /// Upstream RESTCONF base URL
        #[arg(long, default_value = cmd_proxy::DEFAULT_UPSTREAM)]
        upstream: String,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("confpath=info".parse()?))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match &cli.command {
        Commands::Tree { input, json } => {
            cmd_tree::run(&cli.client_config()?, input.as_deref(), *json, cli.pretty).await
        }
        Commands::Get { path } => cmd_get::run(cli.client_config()?, path, cli.pretty).await,
        Commands::Put { path, input } => cmd_put::run(cli.client_config()?, path, input).await,
        Commands::Edit { path } => cmd_edit::run(cli.client_config()?, path).await,
        Commands::Watch { limit } => cmd_watch::run(&cli.client_config()?, *limit).await,
        Commands::Key { op } => cmd_key::run(op, cli.pretty),
        Commands::Proxy { listen, upstream } => cmd_proxy::run(listen, upstream).await,
    }
}
