// SPDX-FileCopyrightText: 2025 Semiotic AI, Inc.
//
// SPDX-License-Identifier: Apache-2.0

//! Receipt log inspection

use alloy_primitives::{Address, B256};
use alloy_rpc_types::Log;
use alloy_sol_types::SolEvent;

use super::strategy::{BindEncoding, LogSignature};
use crate::events::{address_bind, string_bind};

/// Logs that still count: not removed by a reorg and emitted by `emitter`.
fn live_logs_from(logs: &[Log], emitter: Address) -> impl Iterator<Item = (usize, &Log)> {
    logs.iter()
        .enumerate()
        .filter(move |(_, log)| !log.removed && log.address() == emitter)
}

fn has_shape(log: &Log, signature: LogSignature) -> bool {
    let topics = log.topics();
    topics.len() == signature.topics_len && topics.first() == Some(&signature.topic)
}

/// Outcome of looking for a deposit log.
#[derive(Debug, PartialEq, Eq)]
pub(crate) enum DepositLog {
    /// A log paid the expected receiver
    Found(Address),
    /// Logs of the right shape exist, none pays the expected receiver
    WrongReceiver(Address),
    /// No log of the right shape
    Missing,
}

/// Looks for a token transfer to `deposit` emitted by `token`.
///
/// The receiver is the third topic of the transfer log.
pub(crate) fn find_deposit(
    logs: &[Log],
    token: Address,
    signature: LogSignature,
    deposit: Address,
) -> DepositLog {
    let mut wrong = None;
    for (_, log) in live_logs_from(logs, token) {
        if !has_shape(log, signature) {
            continue;
        }
        let receiver = Address::from_word(log.topics()[2]);
        if receiver == deposit {
            return DepositLog::Found(receiver);
        }
        wrong.get_or_insert(receiver);
    }
    wrong.map_or(DepositLog::Missing, DepositLog::WrongReceiver)
}

/// Finds a swap-out log emitted by `token` and decodes its bind, when possible.
///
/// Returns `None` when no log of the right shape exists.
pub(crate) fn find_swapout(
    logs: &[Log],
    token: Address,
    signature: LogSignature,
    encoding: BindEncoding,
) -> Option<Option<String>> {
    live_logs_from(logs, token)
        .find(|(_, log)| has_shape(log, signature))
        .map(|(_, log)| match encoding {
            BindEncoding::Address => address_bind::LogSwapout::decode_log(&log.inner)
                .ok()
                .map(|event| event.bindaddr.to_string().to_ascii_lowercase()),
            BindEncoding::String => string_bind::LogSwapout::decode_log(&log.inner)
                .ok()
                .map(|event| event.data.bindaddr),
        })
}

/// Position of the first live router log whose first topic is in `topics`.
///
/// Logs are evaluated in emission order, so the lowest qualifying position wins.
pub(crate) fn find_router_log(logs: &[Log], router: Address, topics: &[B256]) -> Option<usize> {
    live_logs_from(logs, router)
        .find(|(_, log)| log.topics().first().is_some_and(|topic| topics.contains(topic)))
        .map(|(index, _)| index)
}
