//! HTTP front-end for a minichain ledger node: exposes mine, transaction,
//! chain, and peer endpoints over axum and owns the shared ledger state.

use anyhow::Context;
use axum::extract::State;
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::{Json, Router};
use clap::Parser;
use minichain_core::consensus::{self, ChainFetcher, FetchError, PeerChain};
use minichain_core::{constants, Block, Ledger, LedgerError, ProofOfWork, Transaction};
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tower_http::trace::TraceLayer;
use tracing::{info, warn};
use uuid::Uuid;

#[derive(Parser, Debug)]
struct Args {
    /// Address to listen on, e.g. 127.0.0.1:8080
    #[arg(long, default_value = "127.0.0.1:8080")]
    listen: String,

    /// Leading zero hex digits required of a proof hash
    #[arg(long, default_value_t = constants::DEFAULT_DIFFICULTY)]
    difficulty: usize,
}

#[derive(Clone)]
struct AppState {
    ledger: Arc<RwLock<Ledger>>,
    /// Set on ctrl-c; tells in-flight proof-of-work searches to give up.
    shutdown: Arc<AtomicBool>,
}

type ApiError = (StatusCode, String);

fn internal(err: impl std::fmt::Display) -> ApiError {
    (StatusCode::INTERNAL_SERVER_ERROR, err.to_string())
}

#[derive(Serialize)]
struct MineResponse {
    message: &'static str,
    index: u64,
    transactions: Vec<Transaction>,
    proof: u64,
    previous_hash: String,
}

#[derive(Deserialize)]
struct TransactionRequest {
    sender: String,
    recipient: String,
    amount: u64,
}

#[derive(Serialize)]
struct MessageResponse {
    message: String,
}

#[derive(Deserialize)]
struct RegisterRequest {
    nodes: Vec<String>,
}

#[derive(Serialize)]
struct RegisterResponse {
    message: &'static str,
    total_nodes: Vec<String>,
}

#[derive(Serialize)]
struct ResolveResponse {
    message: &'static str,
    chain: Vec<Block>,
}

/// Fetches peer chains over plain HTTP. Used from blocking tasks only.
struct HttpFetcher {
    client: reqwest::blocking::Client,
}

impl HttpFetcher {
    fn new() -> Self {
        Self {
            client: reqwest::blocking::Client::new(),
        }
    }
}

impl ChainFetcher for HttpFetcher {
    fn fetch_chain(&self, address: &str) -> Result<PeerChain, FetchError> {
        let url = format!("http://{address}/chain");
        let fail = |reason: String| FetchError {
            address: address.to_string(),
            reason,
        };
        let response = self
            .client
            .get(&url)
            .send()
            .map_err(|err| fail(err.to_string()))?;
        if !response.status().is_success() {
            return Err(fail(format!("unexpected status {}", response.status())));
        }
        response.json::<PeerChain>().map_err(|err| fail(err.to_string()))
    }
}

async fn mine(State(state): State<AppState>) -> Result<Json<MineResponse>, ApiError> {
    let block = tokio::task::spawn_blocking(move || -> Result<Block, ApiError> {
        // Read the search inputs under a short read lock, solve without
        // holding any lock, then seal under the write lock.
        let (last_proof, last_hash, pow) = {
            let ledger = state.ledger.read();
            let (last_proof, last_hash) = ledger.mining_inputs().map_err(internal)?;
            (last_proof, last_hash, *ledger.pow())
        };
        let proof = pow
            .solve_with_cancel(last_proof, &last_hash, &state.shutdown)
            .ok_or_else(|| {
                (
                    StatusCode::SERVICE_UNAVAILABLE,
                    "mining aborted by shutdown".to_string(),
                )
            })?;
        state
            .ledger
            .write()
            .seal_block(proof, last_hash)
            .map_err(|err| match err {
                LedgerError::StaleProof { .. } => (StatusCode::CONFLICT, err.to_string()),
                other => internal(other),
            })
    })
    .await
    .map_err(internal)??;

    Ok(Json(MineResponse {
        message: "New Block Forged",
        index: block.index,
        transactions: block.transactions,
        proof: block.proof,
        previous_hash: block.previous_hash,
    }))
}

async fn new_transaction(
    State(state): State<AppState>,
    Json(req): Json<TransactionRequest>,
) -> Result<(StatusCode, Json<MessageResponse>), ApiError> {
    let index = state
        .ledger
        .write()
        .submit_transaction(req.sender, req.recipient, req.amount)
        .map_err(internal)?;
    Ok((
        StatusCode::CREATED,
        Json(MessageResponse {
            message: format!("Transaction will be added to Block {index}"),
        }),
    ))
}

async fn full_chain(State(state): State<AppState>) -> Json<PeerChain> {
    let ledger = state.ledger.read();
    Json(PeerChain {
        length: ledger.chain().len() as u64,
        chain: ledger.chain().to_vec(),
    })
}

async fn register_nodes(
    State(state): State<AppState>,
    Json(req): Json<RegisterRequest>,
) -> Result<(StatusCode, Json<RegisterResponse>), ApiError> {
    let mut ledger = state.ledger.write();
    for address in &req.nodes {
        ledger
            .register_node(address)
            .map_err(|err| (StatusCode::BAD_REQUEST, err.to_string()))?;
    }
    Ok((
        StatusCode::CREATED,
        Json(RegisterResponse {
            message: "New nodes have been added",
            total_nodes: ledger.nodes().iter().cloned().collect(),
        }),
    ))
}

async fn resolve(State(state): State<AppState>) -> Result<Json<ResolveResponse>, ApiError> {
    let response = tokio::task::spawn_blocking(move || {
        // Fetch with no lock held so chain reads stay responsive; only the
        // final compare-and-replace runs under the write lock.
        let peers: Vec<String> = state.ledger.read().nodes().iter().cloned().collect();
        let candidates = consensus::fetch_candidates(&peers, &HttpFetcher::new());
        let mut ledger = state.ledger.write();
        let replaced = consensus::adopt_longest(&mut ledger, candidates);
        ResolveResponse {
            message: if replaced {
                "Our chain was replaced"
            } else {
                "Our chain is authoritative"
            },
            chain: ledger.chain().to_vec(),
        }
    })
    .await
    .map_err(internal)?;
    Ok(Json(response))
}

async fn shutdown_signal(shutdown: Arc<AtomicBool>) {
    if let Err(err) = tokio::signal::ctrl_c().await {
        warn!(%err, "failed to listen for shutdown signal");
        return;
    }
    info!("shutdown signal received, stopping in-flight mining");
    shutdown.store(true, Ordering::Relaxed);
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let args = Args::parse();
    let node_id = Uuid::new_v4().simple().to_string();
    info!(%node_id, difficulty = args.difficulty, "starting ledger node");

    let state = AppState {
        ledger: Arc::new(RwLock::new(Ledger::with_pow(
            node_id,
            ProofOfWork::new(args.difficulty),
        ))),
        shutdown: Arc::new(AtomicBool::new(false)),
    };

    let app = Router::new()
        .route("/mine", get(mine))
        .route("/transactions/new", post(new_transaction))
        .route("/chain", get(full_chain))
        .route("/nodes/register", post(register_nodes))
        .route("/nodes/resolve", get(resolve))
        .layer(TraceLayer::new_for_http())
        .with_state(state.clone());

    let addr: SocketAddr = args.listen.parse().context("parsing --listen address")?;
    info!("minichain-node listening on http://{addr}");
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal(state.shutdown.clone()))
        .await?;
    Ok(())
}
