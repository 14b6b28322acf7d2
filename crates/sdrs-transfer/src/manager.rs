//! Transfer client selection from configuration.

use std::sync::Arc;

use sdrs_core::config::TransferConfig;
use sdrs_core::error::AppError;
use sdrs_core::result::AppResult;
use sdrs_core::traits::transfer::TransferClient;

use crate::providers::InMemoryTransferClient;

/// Build the transfer client named by `config.provider`.
///
/// The client is built once at startup and shared by reference; nothing in
/// SDRS re-creates it implicitly.
pub fn connect(config: &TransferConfig) -> AppResult<Arc<dyn TransferClient>> {
    let client: Arc<dyn TransferClient> = match config.provider.as_str() {
        "memory" => Arc::new(InMemoryTransferClient::new()),
        #[cfg(feature = "http")]
        "http" => Arc::new(crate::providers::HttpTransferClient::new(config)?),
        other => {
            return Err(AppError::configuration(format!(
                "Unknown transfer provider '{other}'"
            )));
        }
    };

    tracing::info!(provider = client.provider_type(), "Transfer client ready");
    Ok(client)
}
