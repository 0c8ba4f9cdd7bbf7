// SPDX-FileCopyrightText: 2025 Semiotic AI, Inc.
//
// SPDX-License-Identifier: Apache-2.0

//! P2SH-bound swap-in matching for Bitcoin-family chains

use crate::config::P2shConfig;
use crate::errors::Rejection;
use crate::p2sh::P2shAddressInfo;
use crate::types::{normalize, RelayMethod, SwapKind, SwapMatch, UtxoTransaction};

/// Matches `tx` if it is confirmed and one of its outputs pays the P2SH
/// address derived for the bind.
///
/// The first paying output wins; its value does not matter here.
pub fn match_p2sh_output(
    chain: &str,
    config: &P2shConfig,
    tx: &UtxoTransaction,
    info: &P2shAddressInfo,
) -> Result<SwapMatch, Rejection> {
    if !tx.confirmed {
        return Err(Rejection::TxNotConfirmed {
            txid: normalize(&tx.txid),
        });
    }
    tx.outputs
        .iter()
        .find(|output| output.address.as_deref() == Some(info.p2sh_address.as_str()))
        .map(|_| SwapMatch {
            chain: chain.to_string(),
            txid: normalize(&tx.txid),
            kind: SwapKind::Swapin,
            method: RelayMethod::P2shSwapin,
            tx_to: info.p2sh_address.clone(),
            bind: Some(info.bind_address.clone()),
            pair_id: Some(config.pair_id.clone()),
            chain_id: None,
            log_index: None,
            swap_server: config.swap_server.clone(),
        })
        .ok_or_else(|| Rejection::P2shOutputNotFound {
            p2sh_address: info.p2sh_address.clone(),
        })
}
