// SPDX-FileCopyrightText: 2025 Semiotic AI, Inc.
//
// SPDX-License-Identifier: Apache-2.0

//! Esplora REST client for Bitcoin-family chains

use std::time::Duration;

use async_trait::async_trait;
use reqwest::StatusCode;
use serde::Deserialize;
use tracing::debug;

use super::UtxoChainClient;
use crate::errors::RpcError;
use crate::types::{UtxoOutput, UtxoTransaction};

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Debug, Deserialize)]
struct EsploraTx {
    txid: String,
    #[serde(default)]
    vout: Vec<EsploraOutput>,
    status: EsploraStatus,
}

#[derive(Debug, Deserialize)]
struct EsploraOutput {
    #[serde(default)]
    scriptpubkey_address: Option<String>,
    value: u64,
}

#[derive(Debug, Deserialize)]
struct EsploraStatus {
    confirmed: bool,
}

impl From<EsploraTx> for UtxoTransaction {
    fn from(tx: EsploraTx) -> Self {
        Self {
            txid: tx.txid,
            outputs: tx
                .vout
                .into_iter()
                .map(|out| UtxoOutput {
                    address: out.scriptpubkey_address,
                    value: out.value,
                })
                .collect(),
            confirmed: tx.status.confirmed,
        }
    }
}

/// Reads transactions from an Esplora-compatible API (`GET {api}/tx/{txid}`).
#[derive(Debug, Clone)]
pub struct EsploraClient {
    http: reqwest::Client,
    api_url: String,
}

impl EsploraClient {
    pub fn new(api_url: impl Into<String>) -> Result<Self, RpcError> {
        let http = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| RpcError::chain_connection_failed("build esplora client", e))?;
        Ok(Self {
            http,
            api_url: api_url.into().trim_end_matches('/').to_string(),
        })
    }

    fn tx_url(&self, txid: &str) -> String {
        format!("{}/tx/{}", self.api_url, txid)
    }
}

#[async_trait]
impl UtxoChainClient for EsploraClient {
    async fn get_transaction(&self, txid: &str) -> Result<Option<UtxoTransaction>, RpcError> {
        let url = self.tx_url(txid);
        debug!(%url, "Fetching utxo transaction");

        let response = self
            .http
            .get(&url)
            .send()
            .await
            .map_err(|e| RpcError::chain_connection_failed("esplora get tx", e))?;

        if matches!(response.status(), StatusCode::NOT_FOUND | StatusCode::BAD_REQUEST) {
            return Ok(None);
        }

        let tx: EsploraTx = response
            .error_for_status()
            .map_err(|e| RpcError::chain_connection_failed("esplora get tx", e))?
            .json()
            .await
            .map_err(|e| RpcError::malformed("esplora get tx", e.to_string()))?;
        Ok(Some(tx.into()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_esplora_payload() {
        let payload = r#"{
            "txid": "abcd",
            "version": 2,
            "vout": [
                {"scriptpubkey": "a914", "scriptpubkey_address": "3341vcpFdMTz6EhBc4dpMqAaHP1Frza4JP", "value": 150000},
                {"scriptpubkey": "6a", "value": 0}
            ],
            "status": {"confirmed": true, "block_height": 800000}
        }"#;
        let tx: UtxoTransaction = serde_json::from_str::<EsploraTx>(payload).unwrap().into();
        assert_eq!(tx.txid, "abcd");
        assert!(tx.confirmed);
        assert_eq!(tx.outputs.len(), 2);
        assert_eq!(
            tx.outputs[0].address.as_deref(),
            Some("3341vcpFdMTz6EhBc4dpMqAaHP1Frza4JP")
        );
        assert_eq!(tx.outputs[1].address, None);
    }

    #[test]
    fn strips_trailing_slash() {
        let client = EsploraClient::new("https://blockstream.info/api/").unwrap();
        assert_eq!(client.tx_url("ff"), "https://blockstream.info/api/tx/ff");
    }
}
