use thiserror::Error;

#[derive(Debug, Error)]
pub enum NodeError {
    #[error("ledger error: {0}")]
    Ledger(#[from] burst_ledger::LedgerError),

    #[error("network error: {0}")]
    Network(#[from] burst_network::NetworkError),

    #[error("store error: {0}")]
    Store(#[from] burst_store::StoreError),

    #[error("consensus error: {0}")]
    Consensus(#[from] burst_consensus::ConsensusError),

    #[error("node not initialized")]
    NotInitialized,

    #[error("configuration error: {0}")]
    Config(String),

    #[error("{0}")]
    Other(String),
}
