use std::collections::BTreeMap;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};

use gatepass_core::RecordWriter;
use gatepass_crypto::MIN_MODULUS_BITS;
use serde::{Deserialize, Serialize};

use crate::error::{ServerError, ServerResult};

/// Server configuration, loadable from TOML. Missing keys take defaults.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub bind_addr: SocketAddr,
    /// RSA modulus length for per-order keypairs.
    pub key_bits: usize,
    /// Maximum redemption-record appends in flight.
    pub persist_concurrency: usize,
    pub allow_any_origin: bool,
    pub store: StoreConfig,
    /// Bearer token → subject identifier.
    pub tokens: BTreeMap<String, String>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: SocketAddr::from(([127, 0, 0, 1], 3003)),
            key_bits: MIN_MODULUS_BITS,
            persist_concurrency: RecordWriter::DEFAULT_CONCURRENCY,
            allow_any_origin: true,
            store: StoreConfig::Memory,
            tokens: BTreeMap::new(),
        }
    }
}

impl ServerConfig {
    /// Read and validate a TOML config file.
    pub fn load(path: impl AsRef<Path>) -> ServerResult<Self> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path)
            .map_err(|e| ServerError::Config(format!("{}: {e}", path.display())))?;
        let config = Self::from_toml(&raw)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_toml(raw: &str) -> ServerResult<Self> {
        toml::from_str(raw).map_err(|e| ServerError::Config(e.to_string()))
    }

    pub fn validate(&self) -> ServerResult<()> {
        if self.key_bits < MIN_MODULUS_BITS {
            return Err(ServerError::Config(format!(
                "key_bits must be at least {MIN_MODULUS_BITS}, got {}",
                self.key_bits
            )));
        }
        if self.persist_concurrency == 0 {
            return Err(ServerError::Config(
                "persist_concurrency must be at least 1".into(),
            ));
        }
        if self.tokens.keys().any(|t| t.is_empty()) {
            return Err(ServerError::Config("empty bearer token in tokens".into()));
        }
        Ok(())
    }
}

/// Which redemption store backend to open.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "backend", rename_all = "snake_case")]
pub enum StoreConfig {
    Memory,
    Journal { root: PathBuf },
}
