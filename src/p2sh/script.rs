// SPDX-FileCopyrightText: 2025 Semiotic AI, Inc.
//
// SPDX-License-Identifier: Apache-2.0

//! Redeem script construction and Bitcoin-family address encoding
//!
//! The redeem script commits to a bind address and then behaves like a
//! P2PKH output paying the bridge's key:
//!
//! ```text
//! <bind> OP_DROP OP_DUP OP_HASH160 <pubKeyHash> OP_EQUALVERIFY OP_CHECKSIG
//! ```

use ripemd::Ripemd160;
use sha2::{Digest, Sha256};

use crate::config::constants::bitcoin::{
    OP_CHECKSIG, OP_DROP, OP_DUP, OP_EQUALVERIFY, OP_HASH160, OP_PUSHDATA1, P2PKH_MAINNET,
    P2PKH_TESTNET, P2SH_MAINNET, P2SH_TESTNET,
};
use crate::errors::P2shError;
use crate::types::BitcoinNetwork;

/// `RIPEMD160(SHA256(data))`
pub fn hash160(data: &[u8]) -> [u8; 20] {
    let digest = Ripemd160::digest(Sha256::digest(data));
    let mut out = [0u8; 20];
    out.copy_from_slice(&digest);
    out
}

fn push_data(script: &mut Vec<u8>, data: &[u8]) {
    match data.len() {
        len @ 0..=75 => script.push(len as u8),
        len => {
            script.push(OP_PUSHDATA1);
            script.push(len.min(u8::MAX as usize) as u8);
        }
    }
    script.extend_from_slice(data);
}

/// Builds the bind-committing redeem script.
pub fn redeem_script(memo: &[u8], pubkey_hash: &[u8; 20]) -> Vec<u8> {
    let mut script = Vec::with_capacity(memo.len() + 27);
    push_data(&mut script, memo);
    script.extend_from_slice(&[OP_DROP, OP_DUP, OP_HASH160]);
    push_data(&mut script, pubkey_hash);
    script.extend_from_slice(&[OP_EQUALVERIFY, OP_CHECKSIG]);
    script
}

/// Base58Check P2SH address paying `script`.
pub fn p2sh_address(script: &[u8], network: BitcoinNetwork) -> String {
    let version = match network {
        BitcoinNetwork::Mainnet => P2SH_MAINNET,
        BitcoinNetwork::Testnet => P2SH_TESTNET,
    };
    let mut payload = Vec::with_capacity(21);
    payload.push(version);
    payload.extend_from_slice(&hash160(script));
    bs58::encode(payload).with_check().into_string()
}

/// Public key hash of a Base58Check P2PKH address.
pub fn decode_p2pkh(address: &str, network: BitcoinNetwork) -> Result<[u8; 20], P2shError> {
    let invalid = |reason: &str| P2shError::InvalidDepositAddress {
        address: address.to_string(),
        reason: reason.to_string(),
    };
    let payload = bs58::decode(address)
        .with_check(None)
        .into_vec()
        .map_err(|e| invalid(&e.to_string()))?;
    let expected = match network {
        BitcoinNetwork::Mainnet => P2PKH_MAINNET,
        BitcoinNetwork::Testnet => P2PKH_TESTNET,
    };
    match payload.split_first() {
        Some((&version, hash)) if version == expected && hash.len() == 20 => {
            let mut out = [0u8; 20];
            out.copy_from_slice(hash);
            Ok(out)
        }
        Some((&version, _)) if version != expected => {
            Err(invalid(&format!("version byte 0x{version:02x} is not p2pkh for {network:?}")))
        }
        _ => Err(invalid("payload is not 21 bytes")),
    }
}

/// Human-readable form of a script, one token per push or opcode.
///
/// Data pushes print as hex. Opcodes outside the set this crate emits print
/// as `OP_UNKNOWN<n>`; a truncated push prints `[error]` and stops.
pub fn disassemble(script: &[u8]) -> String {
    let mut tokens = Vec::new();
    let mut rest = script;
    while let Some((&op, tail)) = rest.split_first() {
        rest = tail;
        let push_len = match op {
            1..=75 => Some(op as usize),
            OP_PUSHDATA1 => match rest.split_first() {
                Some((&len, tail)) => {
                    rest = tail;
                    Some(len as usize)
                }
                None => None,
            },
            _ => {
                tokens.push(opcode_name(op));
                continue;
            }
        };
        match push_len {
            Some(len) if rest.len() >= len => {
                tokens.push(hex::encode(&rest[..len]));
                rest = &rest[len..];
            }
            _ => {
                tokens.push("[error]".to_string());
                break;
            }
        }
    }
    tokens.join(" ")
}

fn opcode_name(op: u8) -> String {
    match op {
        0x00 => "0".to_string(),
        OP_DROP => "OP_DROP".to_string(),
        OP_DUP => "OP_DUP".to_string(),
        OP_HASH160 => "OP_HASH160".to_string(),
        OP_EQUALVERIFY => "OP_EQUALVERIFY".to_string(),
        OP_CHECKSIG => "OP_CHECKSIG".to_string(),
        other => format!("OP_UNKNOWN{other}"),
    }
}
