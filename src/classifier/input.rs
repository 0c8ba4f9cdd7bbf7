// SPDX-FileCopyrightText: 2025 Semiotic AI, Inc.
//
// SPDX-License-Identifier: Apache-2.0

//! Call data inspection

use alloy_primitives::Address;
use alloy_sol_types::SolCall;

use super::strategy::BindEncoding;
use crate::config::constants::selectors;
use crate::errors::Rejection;
use crate::events::{address_bind, string_bind};

/// Splits call data into its selector, rejecting input too short to have one.
pub(crate) fn selector(input: &[u8]) -> Result<[u8; 4], Rejection> {
    input
        .get(..4)
        .and_then(|bytes| <[u8; 4]>::try_from(bytes).ok())
        .ok_or(Rejection::WrongInput { len: input.len() })
}

/// Recipient of an ERC-20 `transfer` or `transferFrom` call.
///
/// Reads the 32-byte argument word the recipient lives in and takes its
/// low 20 bytes. A short word is zero-padded on the right, so truncated
/// call data decodes to some address rather than failing.
pub(crate) fn erc20_recipient(input: &[u8]) -> Result<Address, Rejection> {
    let selector = selector(input)?;
    let offset = match selector {
        selectors::TRANSFER => 4,
        selectors::TRANSFER_FROM => 36,
        other => return Err(Rejection::FuncHashMismatch { selector: other }),
    };
    let mut word = [0u8; 32];
    if let Some(available) = input.get(offset..) {
        let len = available.len().min(32);
        word[..len].copy_from_slice(&available[..len]);
    }
    Ok(Address::from_slice(&word[12..]))
}

/// Bind argument of a bridge `Swapout` call, when it decodes.
pub(crate) fn swapout_bind(input: &[u8], encoding: BindEncoding) -> Option<String> {
    match encoding {
        BindEncoding::Address => address_bind::SwapoutCall::abi_decode(input)
            .ok()
            .map(|call| call.bindaddr.to_string().to_ascii_lowercase()),
        BindEncoding::String => string_bind::SwapoutCall::abi_decode(input)
            .ok()
            .map(|call| call.bindaddr),
    }
}
