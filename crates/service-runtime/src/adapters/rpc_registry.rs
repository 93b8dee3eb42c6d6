//! Remote identity registry over JSON-RPC.

use async_trait::async_trait;
use msg_dispatch::error::RegistryError;
use msg_dispatch::ports::ActorRegistry;
use serde::{Deserialize, Serialize};
use shared_types::{Address, TipsetContext};

/// The decoupled strategy: ask an external full node to resolve addresses
/// when the service does not sit next to chain state.
pub struct RpcActorRegistry {
    client: reqwest::Client,
    endpoint: String,
}

#[derive(Serialize)]
struct RpcRequest<'a> {
    jsonrpc: &'static str,
    id: u32,
    method: &'static str,
    params: (&'a str, &'a str),
}

#[derive(Deserialize)]
struct RpcResponse {
    #[serde(default)]
    result: Option<String>,
    #[serde(default)]
    error: Option<RpcErrorBody>,
}

#[derive(Deserialize)]
struct RpcErrorBody {
    code: i64,
    message: String,
}

impl RpcActorRegistry {
    #[must_use]
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            endpoint: endpoint.into(),
        }
    }
}

#[async_trait]
impl ActorRegistry for RpcActorRegistry {
    async fn lookup_id(
        &self,
        tipset: &TipsetContext,
        address: &Address,
    ) -> Result<Option<Address>, RegistryError> {
        let request = RpcRequest {
            jsonrpc: "2.0",
            id: 0,
            method: "Chain.StateLookupId",
            params: (address.as_str(), tipset.parent_state_root.as_str()),
        };

        let response = self
            .client
            .post(&self.endpoint)
            .json(&request)
            .send()
            .await
            .map_err(|err| RegistryError::Backend(err.to_string()))?;
        let body: RpcResponse = response
            .json()
            .await
            .map_err(|err| RegistryError::BadAddress(err.to_string()))?;

        if let Some(err) = body.error {
            return Err(RegistryError::Backend(format!(
                "{} (code {})",
                err.message, err.code
            )));
        }
        match body.result {
            Some(id) if !id.is_empty() => Ok(Some(Address::new(id))),
            _ => Ok(None),
        }
    }
}
