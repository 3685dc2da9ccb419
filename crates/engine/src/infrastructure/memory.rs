//! In-memory character store backing the `CharacterRepo` port.
//!
//! Not persistence (that is out of scope) - just the adapter the demo
//! binary and integration tests run against.

use async_trait::async_trait;
use dashmap::DashMap;

use rollwright_domain::{Character, CharacterId};

use crate::application::ports::{CharacterRepo, RepoError};

#[derive(Default)]
pub struct InMemoryCharacterRepo {
    characters: DashMap<CharacterId, Character>,
}

impl InMemoryCharacterRepo {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl CharacterRepo for InMemoryCharacterRepo {
    async fn get(&self, id: CharacterId) -> Result<Option<Character>, RepoError> {
        Ok(self.characters.get(&id).map(|entry| entry.clone()))
    }

    async fn save(&self, character: &Character) -> Result<(), RepoError> {
        self.characters.insert(character.id, character.clone());
        Ok(())
    }

    async fn delete(&self, id: CharacterId) -> Result<(), RepoError> {
        self.characters
            .remove(&id)
            .map(|_| ())
            .ok_or(RepoError::NotFound(id))
    }

    async fn list(&self) -> Result<Vec<Character>, RepoError> {
        Ok(self
            .characters
            .iter()
            .map(|entry| entry.value().clone())
            .collect())
    }
}
