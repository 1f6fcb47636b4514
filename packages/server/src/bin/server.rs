//! Lobby chat hub server.
//!
//! Clients connect to `/ws?user_id=<id>&room=<room>` and receive every message
//! sent to their room, preceded by the room's history.
//!
//! Run with:
//! ```not_rust
//! cargo run --bin lobby-server
//! cargo run --bin lobby-server -- --host 0.0.0.0 --port 3000 --user 1=Alice --user 2=Bob
//! ```

use std::{sync::Arc, time::Duration};

use clap::Parser;
use lobby_server::{
    config::{DEFAULT_NAME_CACHE_CAPACITY, ServerConfig, parse_user_entry},
    domain::UserDirectory,
    hub::{DEFAULT_MAILBOX_CAPACITY, Hub, PumpOptions},
    infrastructure::repository::{
        CachedUserDirectory, InMemoryMessageStore, InMemoryUserDirectory,
    },
    ui::Server,
};
use lobby_shared::{
    logger::setup_logger,
    time::{Clock, SystemClock},
};

#[derive(Parser, Debug)]
#[command(name = "lobby-server")]
#[command(about = "Real-time room chat hub over WebSocket", long_about = None)]
struct Args {
    /// Host address to bind the server to
    #[arg(short = 'H', long, default_value = "127.0.0.1")]
    host: String,

    /// Port number to bind the server to
    #[arg(short = 'p', long, default_value = "8080")]
    port: u16,

    /// Per-client mailbox size
    #[arg(long, default_value_t = DEFAULT_MAILBOX_CAPACITY)]
    mailbox_capacity: usize,

    /// Drop connections that send nothing for this many seconds
    #[arg(long)]
    idle_timeout_secs: Option<u64>,

    /// Known user as <id>=<name>; may be repeated
    #[arg(long = "user", value_parser = parse_user_entry)]
    users: Vec<(u32, String)>,

    /// Display-name cache size (0 disables the cache)
    #[arg(long, default_value_t = DEFAULT_NAME_CACHE_CAPACITY)]
    name_cache_capacity: usize,

    /// Log level used when RUST_LOG is not set
    #[arg(long, default_value = "info")]
    log_level: String,
}

impl From<Args> for ServerConfig {
    fn from(args: Args) -> Self {
        Self {
            host: args.host,
            port: args.port,
            mailbox_capacity: args.mailbox_capacity,
            idle_timeout: args.idle_timeout_secs.map(Duration::from_secs),
            users: args.users.into_iter().collect(),
            name_cache_capacity: args.name_cache_capacity,
        }
    }
}

#[tokio::main]
async fn main() {
    let args = Args::parse();

    // Initialize tracing
    setup_logger(env!("CARGO_BIN_NAME"), &args.log_level);

    let config = ServerConfig::from(args);

    // Initialize dependencies in order:
    // 1. Collaborators (message store, user directory)
    // 2. Hub
    // 3. Server

    // 1. Create collaborators (in-memory)
    let clock: Arc<dyn Clock> = Arc::new(SystemClock);
    let store = Arc::new(InMemoryMessageStore::new(clock.clone()));
    tracing::info!("{} user(s) registered in the directory", config.users.len());
    let users: Arc<dyn UserDirectory> = Arc::new(InMemoryUserDirectory::new(config.users.clone()));
    let directory = Arc::new(CachedUserDirectory::new(users, config.name_cache_capacity));

    // 2. Start the hub
    let hub = Hub::new(store, directory).spawn();

    // 3. Create and run the server
    let pump_options = PumpOptions {
        clock,
        idle_timeout: config.idle_timeout,
    };
    let server = Server::new(hub, config.mailbox_capacity, pump_options);
    if let Err(e) = server.run(&config.bind_addr()).await {
        tracing::error!("Server error: {}", e);
        std::process::exit(1);
    }
}
