use thiserror::Error;

use super::BoxFuture;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("store unavailable: {0}")]
    Unavailable(String),
}

/// Reachability probe for the backing relational store.
pub trait StoreHealth: Send + Sync {
    fn backend(&self) -> &'static str;
    fn check(&self) -> BoxFuture<'_, Result<(), StoreError>>;
}
