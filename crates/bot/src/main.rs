mod logging;

use core::time::Duration;
use std::{path::PathBuf, sync::Arc};

use anyhow::{Context as _, Result, anyhow};
use clap::Parser;
use group_api::{ApiState, FileGroupStore};
use mention_core::NameResolver;
use resolvers::{FarcasterResolver, Web3BioResolver};
use tracing::info;

use crate::logging::init_tracing;

#[derive(Parser, Debug)]
#[command(
    name = "xmtp-mention-bot",
    version,
    about = "XMTP mention-resolution agent with a companion mini-app API"
)]
struct Args {
    /// Address for the HTTP API listener
    #[arg(long, env = "API_BIND_ADDR", default_value = "0.0.0.0:3001")]
    bind: String,

    /// Shared secret required in the x-api-secret header
    #[arg(long, env = "API_SECRET_KEY")]
    api_secret: String,

    /// Conversation id of the default group served to the frontend
    #[arg(long, env = "XMTP_DEFAULT_CONVERSATION_ID")]
    conversation_id: String,

    /// Path for the persisted group roster
    #[arg(long, env = "GROUP_STORE", default_value = "./.data/group-roster.json")]
    group_store: PathBuf,

    /// Mini-app base URL included in replies
    #[arg(long, env = "FRONTEND_URL", default_value = "http://localhost:3000")]
    frontend_url: String,

    /// Mention that addresses the agent in group chats
    #[arg(long, env = "AGENT_MENTION", default_value = "@game")]
    agent_mention: String,

    /// Name-resolution backend: "web3bio" or "farcaster"
    #[arg(long, env = "NAME_RESOLVER", default_value = "web3bio")]
    name_resolver: String,

    /// web3.bio API key
    #[arg(long, env = "WEB3_BIO_API_KEY")]
    web3_bio_api_key: Option<String>,

    /// Farcaster hub API key
    #[arg(long, env = "FARCASTER_API_KEY")]
    farcaster_api_key: Option<String>,

    /// Per-lookup timeout for name resolution, in seconds
    #[arg(long, env = "RESOLVE_TIMEOUT_SECS", default_value_t = 8)]
    resolve_timeout_secs: u64,
}

fn build_resolver(args: &Args) -> Result<Arc<dyn NameResolver>> {
    let timeout = Duration::from_secs(args.resolve_timeout_secs);
    match args.name_resolver.as_str() {
        "web3bio" => Ok(Arc::new(
            Web3BioResolver::new(args.web3_bio_api_key.clone()).with_timeout(timeout),
        )),
        "farcaster" => Ok(Arc::new(
            FarcasterResolver::new(args.farcaster_api_key.clone()).with_timeout(timeout),
        )),
        other => Err(anyhow!(
            "unknown name resolver {other:?}, expected \"web3bio\" or \"farcaster\""
        )),
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing();

    // Load .env if present so clap can pick up env vars.
    let _ = dotenvy::dotenv();
    let args = Args::parse();

    let resolver = build_resolver(&args)?;
    let store = FileGroupStore::load(&args.group_store, args.conversation_id.clone())
        .context("loading group roster store")?;

    info!(
        backend = %args.name_resolver,
        agent = %args.agent_mention,
        frontend = %args.frontend_url,
        "Starting mention bot"
    );

    let state = ApiState {
        group: Arc::new(store),
        resolver: Arc::clone(&resolver),
        api_secret: args.api_secret.clone(),
    };
    group_api::serve(state, &args.bind).await
}
