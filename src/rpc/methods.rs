//! RPC Method Implementations
//!
//! Each method corresponds to a JSON-RPC call. Amounts travel as decimal
//! strings. Mutating methods take the caller's address as their first
//! parameter and persist a snapshot after they succeed.
//!
//! A mutation that went through is reported as a success even when the
//! snapshot could not be written; its result carries `"persisted": false`.

use crate::account::Address;
use crate::chain::{BlockClock, LiquidityPool, RewardToken, SimChain};
use crate::node::Chef;
use crate::schedule::ChefError;
use crate::storage::SnapshotStore;
use crate::Amount;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tracing::{debug, error};

/// JSON-RPC 2.0 Request
#[derive(Debug, Deserialize)]
pub struct JsonRpcRequest {
    pub jsonrpc: String,
    pub method: String,
    pub params: Option<Value>,
    pub id: Value,
}

/// JSON-RPC 2.0 Response
#[derive(Debug, Serialize)]
pub struct JsonRpcResponse {
    pub jsonrpc: String,
    pub result: Option<Value>,
    pub error: Option<JsonRpcError>,
    pub id: Value,
}

/// JSON-RPC Error
#[derive(Debug, Serialize)]
pub struct JsonRpcError {
    pub code: i32,
    pub message: String,
}

impl JsonRpcResponse {
    pub fn success(id: Value, result: Value) -> Self {
        Self {
            jsonrpc: "2.0".to_string(),
            result: Some(result),
            error: None,
            id,
        }
    }

    pub fn error(id: Value, code: i32, message: String) -> Self {
        Self {
            jsonrpc: "2.0".to_string(),
            result: None,
            error: Some(JsonRpcError { code, message }),
            id,
        }
    }
}

pub const METHOD_NOT_FOUND: i32 = -32601;
pub const INVALID_PARAMS: i32 = -32602;

/// Stable error code for each engine error
pub fn error_code(err: &ChefError) -> i32 {
    match err {
        ChefError::AlreadyClaimed => -32001,
        ChefError::RewardPeriodOver => -32002,
        ChefError::Unauthorized => -32003,
        ChefError::InvalidState => -32004,
        ChefError::ArithmeticOverflow => -32005,
        ChefError::InvalidConfig(_) => -32006,
        ChefError::InvalidEndBlock { .. } => -32007,
        ChefError::Token(_) => -32010,
        ChefError::Payout(_) => -32011,
    }
}

/// RPC Handler State.
///
/// Locks are always taken chain first, then chef.
pub struct RpcState {
    pub chain: Arc<Mutex<SimChain>>,
    pub chef: Arc<Mutex<Chef>>,
    /// Where snapshots go after each mutation; `None` keeps state in memory
    pub store: Option<Arc<dyn SnapshotStore>>,
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Process a JSON-RPC request and return a response
pub fn handle_request(state: &RpcState, request: JsonRpcRequest) -> JsonRpcResponse {
    debug!(method = %request.method, "rpc request");
    let id = request.id;
    let params = request.params;

    let result = match request.method.as_str() {
        "blocknumber" => block_number(state),
        "pendingrewards" => pending_rewards(state),
        "endblock" => end_block(state),
        "getinfo" => get_info(state),
        "getreceipts" => get_receipts(state),
        "getbalance" => get_balance(state, params),
        "getreserves" => get_reserves(state),
        "claimforall" => claim_for_all(state, params),
        "updaterewardrate" => update_reward_rate(state, params),
        "updateendblock" => update_end_block(state, params),
        "sweep" => sweep(state, params),
        _ => Err((
            METHOD_NOT_FOUND,
            format!("Method not found: {}", request.method),
        )),
    };

    match result {
        Ok(value) => JsonRpcResponse::success(id, value),
        Err((code, message)) => JsonRpcResponse::error(id, code, message),
    }
}

type MethodResult = Result<Value, (i32, String)>;

fn chef_error(err: ChefError) -> (i32, String) {
    (error_code(&err), err.to_string())
}

fn missing_param(what: &str) -> (i32, String) {
    (INVALID_PARAMS, format!("Invalid params: expected {}", what))
}

fn param(params: &Option<Value>, index: usize) -> Option<&Value> {
    match params {
        Some(Value::Array(arr)) => arr.get(index),
        Some(value) if index == 0 => Some(value),
        _ => None,
    }
}

fn param_address(
    params: &Option<Value>,
    index: usize,
    name: &str,
) -> Result<Address, (i32, String)> {
    param(params, index)
        .and_then(Value::as_str)
        .ok_or_else(|| missing_param(&format!("{} address", name)))?
        .parse::<Address>()
        .map_err(|e| (INVALID_PARAMS, format!("Invalid {}: {}", name, e)))
}

fn param_amount(params: &Option<Value>, index: usize) -> Result<Amount, (i32, String)> {
    let amount = match param(params, index) {
        Some(Value::String(s)) => s.parse::<Amount>().ok(),
        Some(Value::Number(n)) => n.as_u64().map(Amount::from),
        _ => None,
    };
    amount.ok_or_else(|| missing_param("amount"))
}

fn param_block(params: &Option<Value>, index: usize) -> Result<u64, (i32, String)> {
    param(params, index)
        .and_then(Value::as_u64)
        .ok_or_else(|| missing_param("block number"))
}

/// Write a snapshot after a committed mutation. Storage failures are logged
/// and reported as `false`; the mutation itself stands.
fn persist(state: &RpcState, chef: &Chef, chain: &SimChain) -> bool {
    let Some(store) = &state.store else {
        return false;
    };
    match store.save_snapshot(chef, chain) {
        Ok(()) => true,
        Err(e) => {
            error!(error = %e, "failed to persist snapshot after committed mutation");
            false
        }
    }
}

/// Returns the current block number
fn block_number(state: &RpcState) -> MethodResult {
    Ok(json!(lock(&state.chain).current_block()))
}

/// Returns the reward pending at the current block
fn pending_rewards(state: &RpcState) -> MethodResult {
    let chain = lock(&state.chain);
    let chef = lock(&state.chef);
    let pending = chef.pending_rewards(&*chain).map_err(chef_error)?;
    Ok(json!(pending.to_string()))
}

fn end_block(state: &RpcState) -> MethodResult {
    Ok(json!(lock(&state.chef).end_block()))
}

/// Returns schedule parameters, phase and balances
fn get_info(state: &RpcState) -> MethodResult {
    let chain = lock(&state.chain);
    let chef = lock(&state.chef);

    Ok(json!({
        "address": chef.address().to_string(),
        "owner": chef.owner().to_string(),
        "block": chain.current_block(),
        "startBlock": chef.start_block(),
        "endBlock": chef.end_block(),
        "rewardPerBlock": chef.reward_per_block().to_string(),
        "lastSettledBlock": chef.last_settled_block(),
        "phase": format!("{:?}", chef.phase(&*chain)),
        "totalSettled": chef.total_settled().to_string(),
        "balance": chain.balance_of(chef.address()).to_string(),
        "receipts": chef.receipts().len(),
        "historyIntact": chef.verify_history(),
    }))
}

fn get_receipts(state: &RpcState) -> MethodResult {
    let chef = lock(&state.chef);
    let receipts: Vec<Value> = chef
        .receipts()
        .iter()
        .map(|r| {
            json!({
                "sequence": r.sequence,
                "kind": format!("{:?}", r.kind),
                "block": r.block,
                "settledFrom": r.settled_from,
                "settledTo": r.settled_to,
                "amount": r.amount.to_string(),
                "consumed": r.consumed.to_string(),
                "closed": r.closed,
                "parent": r.parent.to_hex(),
                "id": r.id.to_hex(),
            })
        })
        .collect();
    Ok(json!(receipts))
}

/// Returns the reward-token balance of an address
fn get_balance(state: &RpcState, params: Option<Value>) -> MethodResult {
    let holder = param_address(&params, 0, "holder")?;
    let balance = lock(&state.chain).balance_of(&holder);
    Ok(json!(balance.to_string()))
}

fn get_reserves(state: &RpcState) -> MethodResult {
    let reserves = lock(&state.chain).get_reserves();
    Ok(json!({
        "reserve0": reserves.reserve0.to_string(),
        "reserve1": reserves.reserve1.to_string(),
        "blockTimestampLast": reserves.block_timestamp_last,
    }))
}

/// Params: [caller]
fn claim_for_all(state: &RpcState, params: Option<Value>) -> MethodResult {
    let caller = param_address(&params, 0, "caller")?;
    let mut chain = lock(&state.chain);
    let mut chef = lock(&state.chef);

    let receipt = chef
        .claim_for_all(&caller, &mut *chain)
        .map_err(chef_error)?;
    let persisted = persist(state, &chef, &chain);

    Ok(json!({
        "amount": receipt.amount.to_string(),
        "consumed": receipt.consumed.to_string(),
        "closed": receipt.closed,
        "sequence": receipt.sequence,
        "id": receipt.id.to_hex(),
        "persisted": persisted,
    }))
}

/// Params: [caller, new_rate]
fn update_reward_rate(state: &RpcState, params: Option<Value>) -> MethodResult {
    let caller = param_address(&params, 0, "caller")?;
    let new_rate = param_amount(&params, 1)?;
    let mut chain = lock(&state.chain);
    let mut chef = lock(&state.chef);

    let receipt = chef
        .update_reward_rate(&caller, new_rate, &mut *chain)
        .map_err(chef_error)?;
    let persisted = persist(state, &chef, &chain);

    Ok(json!({
        "rewardPerBlock": chef.reward_per_block().to_string(),
        "realized": receipt.amount.to_string(),
        "persisted": persisted,
    }))
}

/// Params: [caller, new_end_block]
fn update_end_block(state: &RpcState, params: Option<Value>) -> MethodResult {
    let caller = param_address(&params, 0, "caller")?;
    let new_end_block = param_block(&params, 1)?;
    let chain = lock(&state.chain);
    let mut chef = lock(&state.chef);

    chef.update_end_block(&caller, new_end_block, &*chain)
        .map_err(chef_error)?;
    let persisted = persist(state, &chef, &chain);

    Ok(json!({
        "endBlock": chef.end_block(),
        "persisted": persisted,
    }))
}

/// Params: [caller, recipient]
fn sweep(state: &RpcState, params: Option<Value>) -> MethodResult {
    let caller = param_address(&params, 0, "caller")?;
    let recipient = param_address(&params, 1, "recipient")?;
    let mut chain = lock(&state.chain);
    let mut chef = lock(&state.chef);

    let receipt = chef
        .sweep(&caller, &recipient, &mut *chain)
        .map_err(chef_error)?;
    let persisted = persist(state, &chef, &chain);

    Ok(json!({
        "requested": receipt.requested.to_string(),
        "received": receipt.received.to_string(),
        "remaining": receipt.remaining.to_string(),
        "persisted": persisted,
    }))
}
