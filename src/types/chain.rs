// SPDX-FileCopyrightText: 2025 Semiotic AI, Inc.
//
// SPDX-License-Identifier: Apache-2.0

//! Chain read models consumed by the classifier

use alloy_primitives::{Address, Bytes, TxHash};
use alloy_rpc_types::Log;
use serde::{Deserialize, Serialize};

/// The fields of an EVM transaction the classifier looks at.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SwapTransaction {
    pub hash: TxHash,
    pub from: Address,
    /// `None` for contract creation
    pub to: Option<Address>,
    pub input: Bytes,
    pub block_number: Option<u64>,
}

/// The fields of an EVM receipt the classifier looks at.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SwapReceipt {
    pub transaction_hash: TxHash,
    /// Execution succeeded
    pub status: bool,
    /// Logs in emission order
    pub logs: Vec<Log>,
}

/// Bitcoin-family network, selecting address version bytes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BitcoinNetwork {
    #[default]
    Mainnet,
    Testnet,
}

/// A Bitcoin-family transaction output.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UtxoOutput {
    /// Decoded address of the output script, when it has one
    pub address: Option<String>,
    /// Value in the chain's smallest unit
    pub value: u64,
}

/// A Bitcoin-family transaction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UtxoTransaction {
    pub txid: String,
    pub outputs: Vec<UtxoOutput>,
    pub confirmed: bool,
}
