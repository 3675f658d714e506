use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use sol_core::SolError;

pub const DEFAULT_FEE_RELAYER_URL: &str = "https://fee-relayer.solana.p2p.org";

/// Solana clusters
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Network {
    MainnetBeta,
    Devnet,
    Testnet,
}

impl Network {
    /// Cluster name as used by RPC providers and token lists.
    pub fn cluster(&self) -> &'static str {
        match self {
            Network::MainnetBeta => "mainnet-beta",
            Network::Devnet => "devnet",
            Network::Testnet => "testnet",
        }
    }

    /// Public RPC endpoint of the cluster.
    pub fn default_url(&self) -> &'static str {
        match self {
            Network::MainnetBeta => "https://api.mainnet-beta.solana.com",
            Network::Devnet => "https://api.devnet.solana.com",
            Network::Testnet => "https://api.testnet.solana.com",
        }
    }
}

impl fmt::Display for Network {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.cluster())
    }
}

impl FromStr for Network {
    type Err = SolError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "mainnet-beta" => Ok(Network::MainnetBeta),
            "devnet" => Ok(Network::Devnet),
            "testnet" => Ok(Network::Testnet),
            other => Err(SolError::InvalidRequest(format!("unknown network {other}"))),
        }
    }
}

/// An RPC node and the cluster it serves.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiEndpoint {
    pub url: String,
    pub network: Network,
}

impl ApiEndpoint {
    pub fn new(url: impl Into<String>, network: Network) -> Self {
        Self {
            url: url.into(),
            network,
        }
    }

    /// The public endpoint of every cluster.
    pub fn defaults() -> Vec<Self> {
        [Network::MainnetBeta, Network::Devnet, Network::Testnet]
            .into_iter()
            .map(|network| Self::new(network.default_url(), network))
            .collect()
    }

    /// Full URL for `path` on this endpoint.
    pub fn request_url(&self, path: &str) -> Result<String, SolError> {
        join_url(&self.url, path)
    }
}

impl Default for ApiEndpoint {
    fn default() -> Self {
        Self::new(Network::MainnetBeta.default_url(), Network::MainnetBeta)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeeRelayerConfig {
    pub url: String,
}

impl FeeRelayerConfig {
    pub fn request_url(&self, path: &str) -> Result<String, SolError> {
        join_url(&self.url, path)
    }
}

impl Default for FeeRelayerConfig {
    fn default() -> Self {
        Self {
            url: DEFAULT_FEE_RELAYER_URL.into(),
        }
    }
}

/// `base + path`, rejecting anything that is not an absolute http(s) URL.
fn join_url(base: &str, path: &str) -> Result<String, SolError> {
    let url = format!("{base}{path}");
    let host = url
        .strip_prefix("https://")
        .or_else(|| url.strip_prefix("http://"))
        .and_then(|rest| rest.split('/').next())
        .filter(|host| !host.is_empty());

    match host {
        Some(_) if !url.chars().any(char::is_whitespace) => Ok(url),
        _ => Err(SolError::InvalidRequest("Invalid URL".into())),
    }
}
