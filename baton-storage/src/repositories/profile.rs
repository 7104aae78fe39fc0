//! Agent profile repository implementation

use std::collections::HashMap;

use async_trait::async_trait;
use baton_core::orchestration::collaborators::AgentProfileStore;
use baton_core::role::AgentProfile;
use tokio::sync::RwLock;

use crate::{Error, Result};

/// In-memory repository for agent profiles
#[derive(Debug, Default)]
pub struct AgentProfileRepository {
    profiles: RwLock<HashMap<String, AgentProfile>>,
}

impl AgentProfileRepository {
    /// Create an empty repository
    pub fn new() -> Self {
        Self::default()
    }

    /// Store a new agent profile
    pub async fn create(&self, profile: &AgentProfile) -> Result<()> {
        let mut profiles = self.profiles.write().await;
        if profiles.contains_key(&profile.id) {
            return Err(Error::already_exists("AgentProfile", &profile.id));
        }
        profiles.insert(profile.id.clone(), profile.clone());
        Ok(())
    }

    /// Find an agent profile by ID
    pub async fn find_by_id(&self, id: &str) -> Result<Option<AgentProfile>> {
        Ok(self.profiles.read().await.get(id).cloned())
    }

    /// Replace an existing agent profile
    pub async fn update(&self, profile: &AgentProfile) -> Result<()> {
        let mut profiles = self.profiles.write().await;
        if !profiles.contains_key(&profile.id) {
            return Err(Error::not_found("AgentProfile", &profile.id));
        }
        profiles.insert(profile.id.clone(), profile.clone());
        Ok(())
    }

    /// Delete an agent profile
    pub async fn delete(&self, id: &str) -> Result<()> {
        self.profiles
            .write()
            .await
            .remove(id)
            .map(|_| ())
            .ok_or_else(|| Error::not_found("AgentProfile", id))
    }

    /// List all agent profiles, ordered by id
    pub async fn list(&self) -> Result<Vec<AgentProfile>> {
        let mut profiles: Vec<AgentProfile> =
            self.profiles.read().await.values().cloned().collect();
        profiles.sort_by(|a, b| a.id.cmp(&b.id));
        Ok(profiles)
    }

    /// Count stored agent profiles
    pub async fn count(&self) -> Result<usize> {
        Ok(self.profiles.read().await.len())
    }
}

#[async_trait]
impl AgentProfileStore for AgentProfileRepository {
    async fn profile(&self, id: &str) -> baton_core::Result<Option<AgentProfile>> {
        Ok(self.profiles.read().await.get(id).cloned())
    }

    async fn profile_ids(&self) -> baton_core::Result<Vec<String>> {
        let mut ids: Vec<String> = self.profiles.read().await.keys().cloned().collect();
        ids.sort();
        Ok(ids)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn profile(id: &str) -> AgentProfile {
        AgentProfile::new(
            id.to_string(),
            id.to_uppercase(),
            vec!["implementer".to_string()],
        )
        .unwrap()
    }

    #[tokio::test]
    async fn test_crud_round_trip() {
        let repo = AgentProfileRepository::new();
        repo.create(&profile("cursor")).await.unwrap();
        assert!(matches!(
            repo.create(&profile("cursor")).await.unwrap_err(),
            Error::AlreadyExists { .. }
        ));

        assert!(repo.find_by_id("cursor").await.unwrap().is_some());
        repo.update(&profile("cursor")).await.unwrap();
        repo.delete("cursor").await.unwrap();
        assert!(repo.find_by_id("cursor").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_store_trait_view() {
        let repo = AgentProfileRepository::new();
        repo.create(&profile("general")).await.unwrap();
        repo.create(&profile("cursor")).await.unwrap();

        let loaded = AgentProfileStore::profile(&repo, "general").await.unwrap();
        assert_eq!(loaded.unwrap().id, "general");
        assert_eq!(
            repo.profile_ids().await.unwrap(),
            vec!["cursor".to_string(), "general".to_string()]
        );
    }
}
