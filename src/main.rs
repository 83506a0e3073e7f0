//! Chef development node
//!
//! Hosts one chef deployment on a simulated chain: produces blocks on a
//! fixed interval, persists state to sled and serves JSON-RPC.
//!
//! Usage: `chef-node [--config config.json] [--rpc-port N] [--db-path DIR] [--log-json]`

use chef_core::chain::{BlockClock, RewardToken};
use chef_core::node::{create_devnet, snapshot_drift, NodeArgs};
use clap::Parser;
use chef_core::rpc::{start_rpc_server, RpcState};
use chef_core::storage::ChefDB;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

fn init_tracing(json: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    if json {
        tracing_subscriber::fmt()
            .with_ansi(false)
            .json()
            .with_env_filter(filter)
            .init();
    } else {
        tracing_subscriber::fmt().with_env_filter(filter).init();
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = NodeArgs::parse();
    let config = args.load_config()?;
    init_tracing(config.log_json);

    let db = ChefDB::open(&config.db_path)?;

    // Resume the stored deployment, or create and fund a new one
    let (chef, chain) = match db.load_snapshot()? {
        Some((chef, chain)) => {
            info!(
                block = chain.current_block(),
                receipts = chef.receipts().len(),
                "restored snapshot"
            );
            let drift = snapshot_drift(&config, &chef, &chain)?;
            if !drift.is_empty() {
                warn!(
                    fields = ?drift,
                    "stored deployment differs from config, keeping stored values"
                );
            }
            (chef, chain)
        }
        None => {
            let devnet = create_devnet(&config)?;
            db.save_snapshot(&devnet.chef, &devnet.chain)?;
            (devnet.chef, devnet.chain)
        }
    };

    info!(
        chef = %chef.address(),
        owner = %chef.owner(),
        start_block = chef.start_block(),
        end_block = chef.end_block(),
        reward_per_block = %chef.reward_per_block(),
        balance = %chain.balance_of(chef.address()),
        "chef ready"
    );

    let chain = Arc::new(Mutex::new(chain));
    let chef = Arc::new(Mutex::new(chef));

    // Block producer
    let producer_chain = chain.clone();
    let producer_db = db.clone();
    let producer_chef = chef.clone();
    let interval = Duration::from_millis(config.block_interval_ms);
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(interval);
        ticker.tick().await;
        loop {
            ticker.tick().await;
            let (Ok(mut chain), Ok(chef)) = (producer_chain.lock(), producer_chef.lock()) else {
                error!("state lock poisoned, stopping block producer");
                break;
            };
            let block = chain.mine(1);
            if let Err(e) = producer_db.save_snapshot(&chef, &chain) {
                error!(block, error = %e, "failed to persist snapshot");
            }
        }
    });

    let state = Arc::new(RpcState {
        chain,
        chef,
        store: Some(Arc::new(db)),
    });

    tokio::select! {
        result = start_rpc_server(state, config.rpc_port) => {
            result?;
        }
        _ = tokio::signal::ctrl_c() => {
            info!("shutdown signal received, stopping node");
        }
    }

    Ok(())
}
