use std::time::Duration;

use alloy_primitives::{Address, Bytes, U256};
use alloy_sol_types::{SolCall, SolValue};
use async_trait::async_trait;
use serde::Deserialize;
use serde_json::json;

use super::{RemainingCountMap, RemoteLedger};
use crate::asset::AssetId;
use crate::config::MintKitConfig;
use crate::error::MintKitError;
use crate::http_request::Request;

mod abi {
    #![allow(missing_docs, dead_code)]

    alloy_sol_types::sol! {
        interface IMulticall3 {
            struct Call3 {
                address target;
                bool allowFailure;
                bytes callData;
            }

            struct Result {
                bool success;
                bytes returnData;
            }

            function aggregate3(Call3[] calldata calls) external payable returns (Result[] memory returnData);
        }

        interface IEditionSupply {
            function maxSupply() external view returns (uint256);
            function totalSupply() external view returns (uint256);
        }
    }
}

use abi::{IEditionSupply, IMulticall3};

#[derive(Debug, Deserialize)]
struct RpcResponse {
    result: Option<String>,
    error: Option<RpcErrorObject>,
}

#[derive(Debug, Deserialize)]
struct RpcErrorObject {
    code: i64,
    message: String,
}

/// [`RemoteLedger`] backed by an EVM JSON-RPC endpoint.
///
/// All supply reads for a refresh travel in one `eth_call` to Multicall3's `aggregate3`:
/// `maxSupply()` and `totalSupply()` for every asset, each allowed to fail on its own.
pub struct JsonRpcLedger {
    rpc_url: String,
    multicall: Address,
    request: Request,
}

impl JsonRpcLedger {
    /// Creates a ledger client for `rpc_url`.
    #[must_use]
    pub fn new(rpc_url: impl Into<String>, multicall: Address, timeout: Duration) -> Self {
        Self {
            rpc_url: rpc_url.into(),
            multicall,
            request: Request::new(timeout),
        }
    }

    /// Creates a ledger client from a deployment configuration.
    #[must_use]
    pub fn from_config(config: &MintKitConfig) -> Self {
        Self::new(
            config.rpc_url.clone(),
            config.multicall_address,
            config.request_timeout(),
        )
    }

    async fn eth_call(&self, to: Address, data: &[u8]) -> Result<Vec<u8>, MintKitError> {
        let body = json!({
            "jsonrpc": "2.0",
            "id": 1,
            "method": "eth_call",
            "params": [
                { "to": to.to_string(), "data": format!("0x{}", hex::encode(data)) },
                "latest",
            ],
        });

        let request = self.request.post_json(&self.rpc_url, &body)?;
        let response = self.request.handle(request).await?;
        let response: RpcResponse = serde_json::from_str(&response.text().await?)?;

        if let Some(error) = response.error {
            return Err(MintKitError::RpcError {
                code: error.code,
                message: error.message,
            });
        }
        let result = response.result.ok_or_else(|| MintKitError::SerializationError {
            error: "eth_call response has neither result nor error".to_string(),
        })?;

        hex::decode(result.trim_start_matches("0x")).map_err(|e| {
            MintKitError::SerializationError {
                error: format!("eth_call result is not hex: {e}"),
            }
        })
    }
}

#[async_trait]
impl RemoteLedger for JsonRpcLedger {
    async fn fetch_remaining_counts(
        &self,
        assets: Vec<AssetId>,
    ) -> Result<RemainingCountMap, MintKitError> {
        if assets.is_empty() {
            return Ok(RemainingCountMap::new());
        }

        let max_supply = Bytes::from(IEditionSupply::maxSupplyCall {}.abi_encode());
        let total_supply = Bytes::from(IEditionSupply::totalSupplyCall {}.abi_encode());
        let calls = assets
            .iter()
            .flat_map(|asset| {
                [max_supply.clone(), total_supply.clone()].map(|call_data| IMulticall3::Call3 {
                    target: asset.0,
                    allowFailure: true,
                    callData: call_data,
                })
            })
            .collect();

        let data = IMulticall3::aggregate3Call { calls }.abi_encode();
        let output = self.eth_call(self.multicall, &data).await?;
        let results = <Vec<(bool, Bytes)>>::abi_decode(&output)?;

        if results.len() != assets.len() * 2 {
            return Err(MintKitError::SerializationError {
                error: format!(
                    "aggregate3 returned {} results for {} calls",
                    results.len(),
                    assets.len() * 2
                ),
            });
        }

        Ok(assets
            .iter()
            .zip(results.chunks_exact(2))
            .map(|(asset, pair)| (asset.canonical(), remaining(&pair[0], &pair[1])))
            .collect())
    }
}

/// Remaining editions from the `maxSupply()` and `totalSupply()` sub-call results.
///
/// A failed sub-call or a zero max supply (unlimited) yields `None`.
fn remaining(max_supply: &(bool, Bytes), total_supply: &(bool, Bytes)) -> Option<u64> {
    let (true, max_supply) = max_supply else {
        return None;
    };
    let (true, total_supply) = total_supply else {
        return None;
    };
    let max_supply = U256::abi_decode(max_supply).ok()?;
    let total_supply = U256::abi_decode(total_supply).ok()?;
    if max_supply.is_zero() {
        return None;
    }
    Some(u64::try_from(max_supply.saturating_sub(total_supply)).unwrap_or(u64::MAX))
}
