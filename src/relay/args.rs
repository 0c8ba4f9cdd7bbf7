// SPDX-FileCopyrightText: 2025 Semiotic AI, Inc.
//
// SPDX-License-Identifier: Apache-2.0

use serde::Serialize;
use serde_json::Value;

use crate::errors::RelayError;
use crate::types::{RegisteredSwap, RelayMethod};

/// Argument object of a swap server registration call. Every value is sent
/// as a string.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum RelayArgs {
    Bridge {
        txid: String,
        pairid: String,
    },
    Router {
        chainid: String,
        txid: String,
        logindex: String,
    },
    P2sh {
        txid: String,
        bind: String,
    },
}

impl RelayArgs {
    /// Builds the arguments the record's relay method expects.
    pub fn from_swap(swap: &RegisteredSwap) -> Result<Self, RelayError> {
        let missing = |field: &str| RelayError::IncompleteRecord {
            key: swap.key.to_string(),
            reason: format!("missing {field} for {}", swap.method.rpc_method()),
        };
        let txid = swap.txid().to_string();

        match swap.method {
            RelayMethod::Swapin | RelayMethod::Swapout => Ok(RelayArgs::Bridge {
                txid,
                pairid: swap.pair_id.clone().ok_or_else(|| missing("pair id"))?,
            }),
            RelayMethod::RouterSwap => Ok(RelayArgs::Router {
                chainid: swap.chain_id.ok_or_else(|| missing("chain id"))?.to_string(),
                txid,
                logindex: swap.log_index.ok_or_else(|| missing("log index"))?.to_string(),
            }),
            RelayMethod::P2shSwapin => Ok(RelayArgs::P2sh {
                txid,
                bind: swap.bind.clone().ok_or_else(|| missing("bind address"))?,
            }),
        }
    }

    /// Positional params: a one-element array holding the argument object.
    pub fn to_params(&self) -> Value {
        Value::Array(vec![serde_json::json!(self)])
    }
}
