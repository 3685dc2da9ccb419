//! Outbound port traits - the engine's only view of character storage.
//!
//! Persistence backends are out of scope; adapters implement these traits
//! and the services stay decoupled from whatever sits behind them.

use async_trait::async_trait;

use rollwright_domain::{Character, CharacterId};

/// Error from a character storage adapter.
#[derive(Debug, Clone, thiserror::Error)]
pub enum RepoError {
    #[error("Character not found: {0}")]
    NotFound(CharacterId),
    #[error("Storage error: {0}")]
    Storage(String),
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CharacterRepo: Send + Sync {
    async fn get(&self, id: CharacterId) -> Result<Option<Character>, RepoError>;
    async fn save(&self, character: &Character) -> Result<(), RepoError>;
    async fn delete(&self, id: CharacterId) -> Result<(), RepoError>;
    async fn list(&self) -> Result<Vec<Character>, RepoError>;
}
