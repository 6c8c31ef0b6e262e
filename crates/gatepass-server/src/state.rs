use std::sync::Arc;

use gatepass_core::{IssuanceService, RecordWriter, RedemptionService, VerificationService};
use gatepass_crypto::SignatureService;
use gatepass_store::RedemptionStore;

use crate::auth::{IdentityProvider, StaticTokenProvider};
use crate::config::ServerConfig;
use crate::error::{ServerError, ServerResult};

/// Shared handler state: the three services plus the identity provider.
#[derive(Clone)]
pub struct AppState {
    pub identity: Arc<dyn IdentityProvider>,
    pub issuance: IssuanceService,
    pub redemption: RedemptionService,
    pub verification: VerificationService,
}

impl AppState {
    /// Wire services over an already-opened store.
    pub fn new(config: &ServerConfig, store: Arc<dyn RedemptionStore>) -> ServerResult<Self> {
        let identity = Arc::new(StaticTokenProvider::new(&config.tokens));
        Self::with_identity(config, store, identity)
    }

    pub fn with_identity(
        config: &ServerConfig,
        store: Arc<dyn RedemptionStore>,
        identity: Arc<dyn IdentityProvider>,
    ) -> ServerResult<Self> {
        let signer =
            SignatureService::new(config.key_bits).map_err(|e| ServerError::Config(e.to_string()))?;
        let writer = RecordWriter::new(Arc::clone(&store), config.persist_concurrency);
        Ok(Self {
            identity,
            issuance: IssuanceService::new(signer, writer),
            redemption: RedemptionService::new(store),
            verification: VerificationService::new(signer),
        })
    }
}
