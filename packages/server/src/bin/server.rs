//! Single-room WebSocket chat relay.
//!
//! Clients join over `/ws`, announce a display name (optionally backed by
//! an identity token), exchange messages, and observe a live roster.
//!
//! Run with:
//! ```not_rust
//! cargo run --bin lounge-server
//! cargo run --bin lounge-server -- --port 3000 --require-auth \
//!     --allowed-origins http://localhost:3000 \
//!     --backend-url http://localhost:9000
//! ```

use std::sync::Arc;

use clap::Parser;

use lounge_server::{
    config::{DEFAULT_HISTORY_LIMIT, ServerConfig},
    domain::{IdentityVerifier, MessageStore},
    infrastructure::{
        ChatHub,
        collaborator::{HttpIdentityVerifier, HttpMessageStore},
    },
    ui::{AppState, Server},
    usecase::{
        AuthGate, JoinRoomUseCase, LeaveRoomUseCase, RelayMessageUseCase, ReplayHistoryUseCase,
    },
};
use lounge_shared::{logger::setup_logger, time::SystemClock};

#[derive(Parser, Debug)]
#[command(name = "lounge-server")]
#[command(about = "Single-room WebSocket chat relay", long_about = None)]
struct Args {
    /// Host address to bind the server to
    #[arg(short = 'H', long, default_value = "127.0.0.1")]
    host: String,

    /// Port number to bind the server to
    #[arg(short = 'p', long, default_value = "8080")]
    port: u16,

    /// Refuse joins that do not carry a verifiable identity token
    #[arg(long)]
    require_auth: bool,

    /// Comma-separated list of allowed origins; empty allows any origin
    #[arg(long, default_value = "")]
    allowed_origins: String,

    /// Number of persisted messages replayed to a new connection
    #[arg(long, default_value_t = DEFAULT_HISTORY_LIMIT)]
    history_limit: usize,

    /// Base URL of the backend providing identity verification and the
    /// message store; omitting it disables both as a unit
    #[arg(long)]
    backend_url: Option<String>,
}

#[tokio::main]
async fn main() {
    setup_logger(env!("CARGO_BIN_NAME"), "debug");

    let args = Args::parse();

    let config = ServerConfig {
        require_auth: args.require_auth,
        allowed_origins: ServerConfig::parse_origins(&args.allowed_origins),
        history_limit: args.history_limit,
    };

    // Collaborators are enabled as a unit: a backend URL gives both
    // identity verification and persistence/history, its absence neither.
    let (verifier, store): (
        Option<Arc<dyn IdentityVerifier>>,
        Option<Arc<dyn MessageStore>>,
    ) = match &args.backend_url {
        Some(url) => {
            let verifier =
                HttpIdentityVerifier::new(url).expect("failed to build HTTP client for verifier");
            let store =
                HttpMessageStore::new(url).expect("failed to build HTTP client for store");
            tracing::info!("backend configured at {url}: verification and history enabled");
            (Some(Arc::new(verifier)), Some(Arc::new(store)))
        }
        None => {
            tracing::warn!("no backend configured: identity verification and history disabled");
            (None, None)
        }
    };

    let hub = Arc::new(ChatHub::new());
    let clock = Arc::new(SystemClock);

    let join_room = Arc::new(JoinRoomUseCase::new(
        hub.clone(),
        AuthGate::new(verifier),
        config.require_auth,
    ));
    let relay_message = Arc::new(RelayMessageUseCase::new(
        hub.clone(),
        store.clone(),
        clock,
        config.require_auth,
    ));
    let replay_history = Arc::new(ReplayHistoryUseCase::new(
        hub.clone(),
        store,
        config.history_limit,
    ));
    let leave_room = Arc::new(LeaveRoomUseCase::new(hub.clone()));

    let server = Server::new(AppState {
        config,
        hub,
        join_room,
        relay_message,
        replay_history,
        leave_room,
    });

    if let Err(e) = server.run(args.host, args.port).await {
        tracing::error!("Server error: {}", e);
        std::process::exit(1);
    }
}
