// SPDX-FileCopyrightText: 2025 Semiotic AI, Inc.
//
// SPDX-License-Identifier: Apache-2.0

//! Chain and token pair configuration
//!
//! One TOML file per chain. Every entry is validated when loaded, duplicate
//! keys are rejected across the whole set, and each token pair is resolved to
//! its classification [`Strategy`] up front.
//!
//! ```toml
//! [chain]
//! name = "ETH"
//! family = "evm"
//! rpc_urls = ["https://eth.example.com"]
//!
//! [[tokens]]
//! tx_type = "swapin"
//! swap_server = "http://127.0.0.1:11556/rpc"
//! pair_id = "usdc"
//! token_address = "0xa0b86991c6218b36c1d19d4a2e9eb0ce3606eb48"
//! deposit_address = "0x00000000000000000000000000000000000000bb"
//! ```

use std::collections::HashSet;
use std::path::Path;
use std::str::FromStr;

use alloy_primitives::Address;
use serde::Deserialize;
use tracing::{debug, info};
use url::Url;

use super::constants::NATIVE_TOKEN;
use crate::classifier::strategy::Strategy;
use crate::errors::ConfigError;
use crate::types::{normalize, BitcoinNetwork, ChainFamily, SwapKind};

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct ChainFile {
    chain: ChainSection,
    #[serde(default)]
    tokens: Vec<TokenEntry>,
    p2sh: Option<P2shSection>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct ChainSection {
    name: String,
    family: ChainFamily,
    #[serde(default)]
    rpc_urls: Vec<String>,
    #[serde(default)]
    scan_receipt: bool,
    api_url: Option<String>,
    #[serde(default)]
    network: BitcoinNetwork,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct TokenEntry {
    tx_type: String,
    #[serde(default)]
    swap_server: String,
    pair_id: Option<String>,
    token_address: Option<String>,
    deposit_address: Option<String>,
    call_by_contract: Option<String>,
    #[serde(default)]
    whitelist: Vec<String>,
    router_contract: Option<String>,
    chain_id: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct P2shSection {
    pair_id: String,
    deposit_address: String,
    swap_server: String,
}

/// Token a bridge pair moves.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenRef {
    Native,
    Contract(Address),
}

/// What a token pair is keyed on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SwapTarget {
    Bridge {
        pair_id: String,
        token: TokenRef,
        deposit_address: Option<Address>,
    },
    Router {
        chain_id: u64,
        router_contract: Address,
    },
}

/// Validated configuration for one token pair or router contract.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenPairConfig {
    pub kind: SwapKind,
    pub swap_server: String,
    pub whitelist: Vec<Address>,
    /// Contract the transaction must call instead of the token itself
    pub call_by_contract: Option<Address>,
    pub target: SwapTarget,
    pub strategy: Strategy,
}

impl TokenPairConfig {
    pub fn pair_id(&self) -> Option<&str> {
        match &self.target {
            SwapTarget::Bridge { pair_id, .. } => Some(pair_id),
            SwapTarget::Router { .. } => None,
        }
    }

    pub fn chain_id(&self) -> Option<u64> {
        match &self.target {
            SwapTarget::Router { chain_id, .. } => Some(*chain_id),
            SwapTarget::Bridge { .. } => None,
        }
    }
}

/// P2SH-bound swap-in settings of a Bitcoin-family chain.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct P2shConfig {
    pub pair_id: String,
    /// Bridge P2PKH address whose key hash the redeem script pays
    pub deposit_address: String,
    pub swap_server: String,
    pub network: BitcoinNetwork,
}

/// Validated configuration of one chain.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChainConfig {
    /// Lowercase chain name
    pub name: String,
    pub family: ChainFamily,
    pub rpc_urls: Vec<String>,
    /// Classify every pair from receipt logs
    pub scan_receipt: bool,
    pub api_url: Option<String>,
    pub pairs: Vec<TokenPairConfig>,
    pub p2sh: Option<P2shConfig>,
}

/// All chains known to the process.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TokensConfig {
    pub chains: Vec<ChainConfig>,
}

impl TokensConfig {
    /// Loads every `*.toml` file in `dir`, in file name order.
    pub fn load_dir(dir: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let dir = dir.as_ref();
        let entries = std::fs::read_dir(dir).map_err(|source| ConfigError::Io {
            path: dir.to_path_buf(),
            source,
        })?;

        let mut paths = Vec::new();
        for entry in entries {
            let path = entry
                .map_err(|source| ConfigError::Io {
                    path: dir.to_path_buf(),
                    source,
                })?
                .path();
            if path.extension().is_some_and(|ext| ext == "toml") {
                paths.push(path);
            }
        }
        paths.sort();

        let mut files = Vec::with_capacity(paths.len());
        for path in paths {
            let contents = std::fs::read_to_string(&path).map_err(|source| ConfigError::Io {
                path: path.clone(),
                source,
            })?;
            let parsed: ChainFile =
                toml::from_str(&contents).map_err(|source| ConfigError::Parse {
                    path: path.clone(),
                    source,
                })?;
            let file = path
                .file_name()
                .map(|name| name.to_string_lossy().into_owned())
                .unwrap_or_default();
            files.push((file, parsed));
        }

        let config = Self::from_files(files)?;
        info!(
            dir = %dir.display(),
            chains = config.chains.len(),
            pairs = config.chains.iter().map(|c| c.pairs.len()).sum::<usize>(),
            "Loaded token configuration"
        );
        Ok(config)
    }

    /// Parses a set of TOML documents given as `(file name, contents)`.
    pub fn from_toml_strs<'a>(
        docs: impl IntoIterator<Item = (&'a str, &'a str)>,
    ) -> Result<Self, ConfigError> {
        let mut files = Vec::new();
        for (file, contents) in docs {
            let parsed: ChainFile =
                toml::from_str(contents).map_err(|source| ConfigError::Parse {
                    path: file.into(),
                    source,
                })?;
            files.push((file.to_string(), parsed));
        }
        Self::from_files(files)
    }

    fn from_files(files: Vec<(String, ChainFile)>) -> Result<Self, ConfigError> {
        let mut keys = DuplicateKeys::default();
        let mut chains = Vec::with_capacity(files.len());
        for (file, parsed) in files {
            let chain = validate_chain(&file, parsed, &mut keys)?;
            debug!(file = %file, chain = %chain.name, pairs = chain.pairs.len(), "Validated chain config");
            chains.push(chain);
        }
        Ok(Self { chains })
    }

    pub fn chain(&self, name: &str) -> Option<&ChainConfig> {
        let name = normalize(name);
        self.chains.iter().find(|chain| chain.name == name)
    }
}

#[derive(Default)]
struct DuplicateKeys {
    chains: HashSet<String>,
    pairs: HashSet<String>,
    deposits: HashSet<String>,
    routers: HashSet<String>,
}

impl DuplicateKeys {
    fn insert(set: &mut HashSet<String>, what: &'static str, key: String) -> Result<(), ConfigError> {
        if set.insert(key.clone()) {
            Ok(())
        } else {
            Err(ConfigError::Duplicate { what, key })
        }
    }
}

fn validate_chain(
    file: &str,
    parsed: ChainFile,
    keys: &mut DuplicateKeys,
) -> Result<ChainConfig, ConfigError> {
    let name = normalize(&parsed.chain.name);
    if name.is_empty() {
        return Err(ConfigError::invalid_chain(file, "empty chain name"));
    }
    DuplicateKeys::insert(&mut keys.chains, "chain", name.clone())?;

    for url in parsed.chain.rpc_urls.iter().chain(parsed.chain.api_url.iter()) {
        Url::parse(url)
            .map_err(|e| ConfigError::invalid_chain(file, format!("bad endpoint {url}: {e}")))?;
    }

    let mut pairs = Vec::with_capacity(parsed.tokens.len());
    let p2sh = match parsed.chain.family {
        ChainFamily::Evm => {
            if parsed.chain.rpc_urls.is_empty() {
                return Err(ConfigError::invalid_chain(file, "evm chain needs rpc_urls"));
            }
            if parsed.tokens.is_empty() {
                return Err(ConfigError::invalid_chain(file, "no tokens configured"));
            }
            if parsed.p2sh.is_some() {
                return Err(ConfigError::invalid_chain(file, "p2sh is only valid on utxo chains"));
            }
            for (index, entry) in parsed.tokens.into_iter().enumerate() {
                pairs.push(validate_token(file, index, entry, keys)?);
            }
            None
        }
        ChainFamily::Utxo => {
            if !parsed.tokens.is_empty() {
                return Err(ConfigError::invalid_chain(file, "utxo chains take a [p2sh] section, not tokens"));
            }
            if parsed.chain.api_url.is_none() {
                return Err(ConfigError::invalid_chain(file, "utxo chain needs api_url"));
            }
            let section = parsed
                .p2sh
                .ok_or_else(|| ConfigError::invalid_chain(file, "utxo chain needs a [p2sh] section"))?;
            check_swap_server(&section.swap_server)
                .map_err(|reason| ConfigError::invalid_chain(file, reason))?;
            if section.pair_id.trim().is_empty() {
                return Err(ConfigError::invalid_chain(file, "p2sh needs pair_id"));
            }
            Some(P2shConfig {
                pair_id: section.pair_id.trim().to_string(),
                deposit_address: section.deposit_address.trim().to_string(),
                swap_server: section.swap_server,
                network: parsed.chain.network,
            })
        }
    };

    Ok(ChainConfig {
        name,
        family: parsed.chain.family,
        rpc_urls: parsed.chain.rpc_urls,
        scan_receipt: parsed.chain.scan_receipt,
        api_url: parsed.chain.api_url,
        pairs,
        p2sh,
    })
}

fn validate_token(
    file: &str,
    index: usize,
    entry: TokenEntry,
    keys: &mut DuplicateKeys,
) -> Result<TokenPairConfig, ConfigError> {
    let invalid = |reason: String| ConfigError::invalid_token(file, index, reason);

    let kind = SwapKind::from_str(&entry.tx_type).map_err(|e| invalid(e.to_string()))?;
    check_swap_server(&entry.swap_server).map_err(invalid)?;

    let call_by_contract = entry
        .call_by_contract
        .as_deref()
        .map(|value| parse_address("call_by_contract", value))
        .transpose()
        .map_err(invalid)?;
    let whitelist = entry
        .whitelist
        .iter()
        .map(|value| parse_address("whitelist", value))
        .collect::<Result<Vec<_>, _>>()
        .map_err(invalid)?;
    let server_key = entry.swap_server.to_ascii_lowercase();

    let (target, strategy) = if kind.is_router() {
        let router_contract = entry
            .router_contract
            .as_deref()
            .ok_or_else(|| invalid("router kinds need router_contract".to_string()))
            .and_then(|value| parse_address("router_contract", value).map_err(invalid))?;
        let chain_id = entry
            .chain_id
            .as_deref()
            .ok_or_else(|| invalid("router kinds need chain_id".to_string()))?;
        let chain_id = chain_id
            .trim()
            .parse::<u64>()
            .map_err(|_| invalid(format!("chain_id {chain_id} is not a decimal number")))?;

        DuplicateKeys::insert(
            &mut keys.routers,
            "router",
            format!("{chain_id}:{}:{server_key}", router_contract.to_string().to_ascii_lowercase()),
        )?;

        let strategy = Strategy::router(kind, router_contract)
            .ok_or_else(|| invalid(format!("no router strategy for {kind}")))?;
        (
            SwapTarget::Router {
                chain_id,
                router_contract,
            },
            strategy,
        )
    } else {
        let pair_id = entry
            .pair_id
            .as_deref()
            .map(str::trim)
            .filter(|id| !id.is_empty())
            .ok_or_else(|| invalid("bridge kinds need pair_id".to_string()))?
            .to_string();

        let mut token_address = entry.token_address.clone().filter(|t| !t.trim().is_empty());
        if kind == SwapKind::Swapin && token_address.is_none() {
            token_address = entry.call_by_contract.clone();
        }
        let token_address =
            token_address.ok_or_else(|| invalid("bridge kinds need token_address".to_string()))?;
        let token = if token_address.trim().eq_ignore_ascii_case(NATIVE_TOKEN) {
            TokenRef::Native
        } else {
            TokenRef::Contract(parse_address("token_address", &token_address).map_err(invalid)?)
        };
        let deposit_address = entry
            .deposit_address
            .as_deref()
            .filter(|d| !d.trim().is_empty())
            .map(|value| parse_address("deposit_address", value))
            .transpose()
            .map_err(invalid)?;

        let token_key = match token {
            TokenRef::Native => NATIVE_TOKEN.to_string(),
            TokenRef::Contract(address) => address.to_string().to_ascii_lowercase(),
        };
        if call_by_contract.is_none() {
            DuplicateKeys::insert(
                &mut keys.pairs,
                "pair",
                format!("{token_key}:{}:{kind}:{server_key}", pair_id.to_ascii_lowercase()),
            )?;
        }
        if let (TokenRef::Contract(_), Some(deposit)) = (token, deposit_address) {
            DuplicateKeys::insert(
                &mut keys.deposits,
                "deposit",
                format!("{token_key}:{}", deposit.to_string().to_ascii_lowercase()),
            )?;
        }

        let contract = match token {
            TokenRef::Native => None,
            TokenRef::Contract(address) => Some(address),
        };
        let strategy = Strategy::bridge(kind, contract, deposit_address).ok_or_else(|| {
            invalid(match (kind, token) {
                (SwapKind::Swapin, _) => "swapin needs deposit_address".to_string(),
                (_, TokenRef::Native) => format!("{kind} does not support native tokens"),
                _ => format!("no bridge strategy for {kind}"),
            })
        })?;
        (
            SwapTarget::Bridge {
                pair_id,
                token,
                deposit_address,
            },
            strategy,
        )
    };

    Ok(TokenPairConfig {
        kind,
        swap_server: entry.swap_server,
        whitelist,
        call_by_contract,
        target,
        strategy,
    })
}

fn check_swap_server(server: &str) -> Result<(), String> {
    if server.trim().is_empty() {
        return Err("swap_server is empty".to_string());
    }
    Url::parse(server)
        .map(|_| ())
        .map_err(|e| format!("swap_server {server} is not a URL: {e}"))
}

fn parse_address(field: &str, value: &str) -> Result<Address, String> {
    Address::from_str(value.trim()).map_err(|_| format!("{field} {value} is not a hex address"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy_primitives::address;

    const ETH: &str = r#"
[chain]
name = "ETH"
family = "evm"
rpc_urls = ["http://localhost:8545"]

[[tokens]]
tx_type = "swapin"
swap_server = "http://swap.local/rpc"
pair_id = "usdc"
token_address = "0x00000000000000000000000000000000000000aa"
deposit_address = "0x00000000000000000000000000000000000000bb"

[[tokens]]
tx_type = "swapin"
swap_server = "http://swap.local/rpc"
pair_id = "eth"
token_address = "native"
deposit_address = "0x00000000000000000000000000000000000000bb"

[[tokens]]
tx_type = "routerswap"
swap_server = "http://swap.local/rpc"
router_contract = "0x00000000000000000000000000000000000000dd"
chain_id = "56"
"#;

    const BTC: &str = r#"
[chain]
name = "BTC"
family = "utxo"
api_url = "https://blockstream.info/api"
network = "mainnet"

[p2sh]
pair_id = "btc"
deposit_address = "1BgGZ9tcN4rm9KBzDn7KprQz87SZ26SAMH"
swap_server = "http://swap.local/rpc"
"#;

    #[test]
    fn loads_evm_and_utxo_chains() {
        let config = TokensConfig::from_toml_strs([("eth.toml", ETH), ("btc.toml", BTC)]).unwrap();
        assert_eq!(config.chains.len(), 2);

        let eth = config.chain("Eth").unwrap();
        assert_eq!(eth.pairs.len(), 3);
        assert!(eth.pairs[1].strategy.is_native());
        assert_eq!(eth.pairs[2].chain_id(), Some(56));
        assert_eq!(
            eth.pairs[2].strategy.destination(),
            address!("00000000000000000000000000000000000000dd")
        );

        let btc = config.chain("btc").unwrap();
        assert_eq!(btc.family, ChainFamily::Utxo);
        assert_eq!(btc.p2sh.as_ref().unwrap().pair_id, "btc");
    }

    #[test]
    fn rejects_unknown_tx_type() {
        let doc = ETH.replacen("tx_type = \"routerswap\"", "tx_type = \"teleport\"", 1);
        let err = TokensConfig::from_toml_strs([("eth.toml", doc.as_str())]).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidToken { index: 2, .. }), "{err}");
        assert!(err.to_string().contains("unknown swap kind"));
    }

    #[test]
    fn rejects_duplicate_chain_names() {
        let err = TokensConfig::from_toml_strs([("a.toml", ETH), ("b.toml", ETH)]).unwrap_err();
        assert!(matches!(err, ConfigError::Duplicate { what: "chain", .. }));
    }

    #[test]
    fn rejects_duplicate_pair_keys_case_insensitively() {
        let doc = format!(
            "{ETH}\n[[tokens]]\ntx_type = \"swapin\"\nswap_server = \"http://SWAP.local/rpc\"\npair_id = \"USDC\"\ntoken_address = \"0x00000000000000000000000000000000000000AA\"\ndeposit_address = \"0x00000000000000000000000000000000000000cc\"\n"
        );
        let err = TokensConfig::from_toml_strs([("eth.toml", doc.as_str())]).unwrap_err();
        assert!(matches!(err, ConfigError::Duplicate { what: "pair", .. }), "{err}");
    }

    #[test]
    fn router_needs_decimal_chain_id() {
        let doc = ETH.replacen("chain_id = \"56\"", "chain_id = \"0x38\"", 1);
        let err = TokensConfig::from_toml_strs([("eth.toml", doc.as_str())]).unwrap_err();
        assert!(err.to_string().contains("not a decimal number"));
    }

    #[test]
    fn swapin_without_token_uses_call_by_contract() {
        let doc = r#"
[chain]
name = "BSC"
family = "evm"
rpc_urls = ["http://localhost:8545"]

[[tokens]]
tx_type = "swapin"
swap_server = "http://swap.local/rpc"
pair_id = "busd"
call_by_contract = "0x00000000000000000000000000000000000000ee"
deposit_address = "0x00000000000000000000000000000000000000bb"
"#;
        let config = TokensConfig::from_toml_strs([("bsc.toml", doc)]).unwrap();
        let pair = &config.chains[0].pairs[0];
        assert_eq!(
            pair.target,
            SwapTarget::Bridge {
                pair_id: "busd".to_string(),
                token: TokenRef::Contract(address!("00000000000000000000000000000000000000ee")),
                deposit_address: Some(address!("00000000000000000000000000000000000000bb")),
            }
        );
        assert_eq!(pair.call_by_contract, Some(address!("00000000000000000000000000000000000000ee")));
    }

    #[test]
    fn native_swapout_is_rejected() {
        let doc = ETH.replacen("tx_type = \"swapin\"\nswap_server = \"http://swap.local/rpc\"\npair_id = \"eth\"", "tx_type = \"swapout\"\nswap_server = \"http://swap.local/rpc\"\npair_id = \"eth\"", 1);
        let err = TokensConfig::from_toml_strs([("eth.toml", doc.as_str())]).unwrap_err();
        assert!(err.to_string().contains("does not support native tokens"), "{err}");
    }

    #[test]
    fn load_dir_reads_toml_files_only() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("eth.toml"), ETH).unwrap();
        std::fs::write(dir.path().join("btc.toml"), BTC).unwrap();
        std::fs::write(dir.path().join("notes.txt"), "not config").unwrap();

        let config = TokensConfig::load_dir(dir.path()).unwrap();
        let names: Vec<_> = config.chains.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["btc", "eth"]);
    }
}
