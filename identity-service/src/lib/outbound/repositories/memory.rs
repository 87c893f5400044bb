use std::collections::HashMap;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;

use crate::principal::errors::StoreError;
use crate::principal::errors::UniqueField;
use crate::principal::models::ContactAddress;
use crate::principal::models::DisplayName;
use crate::principal::models::NewPrincipal;
use crate::principal::models::Principal;
use crate::principal::models::PrincipalId;
use crate::principal::ports::PrincipalRepository;

/// Process-local identity store.
///
/// Uniqueness of both fields is checked and claimed under one write lock, so
/// concurrent inserts behave like the database constraints. Data is lost on exit.
#[derive(Default)]
pub struct InMemoryPrincipalRepository {
    state: RwLock<MemoryState>,
}

#[derive(Default)]
struct MemoryState {
    last_id: i64,
    principals: HashMap<PrincipalId, Principal>,
    by_display_name: HashMap<String, PrincipalId>,
    by_contact: HashMap<String, PrincipalId>,
}

impl MemoryState {
    fn lookup(&self, index: &HashMap<String, PrincipalId>, key: &str) -> Option<Principal> {
        index
            .get(key)
            .and_then(|id| self.principals.get(id))
            .cloned()
    }
}

impl InMemoryPrincipalRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored principals.
    pub async fn len(&self) -> usize {
        self.state.read().await.principals.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

#[async_trait]
impl PrincipalRepository for InMemoryPrincipalRepository {
    async fn find_by_identity(
        &self,
        display_name: &DisplayName,
        contact_address: &ContactAddress,
    ) -> Result<Option<Principal>, StoreError> {
        let state = self.state.read().await;

        Ok(state
            .lookup(&state.by_display_name, display_name.as_str())
            .or_else(|| state.lookup(&state.by_contact, contact_address.as_str())))
    }

    async fn find_by_display_name(
        &self,
        display_name: &DisplayName,
    ) -> Result<Option<Principal>, StoreError> {
        let state = self.state.read().await;
        Ok(state.lookup(&state.by_display_name, display_name.as_str()))
    }

    async fn find_by_contact(
        &self,
        contact_address: &ContactAddress,
    ) -> Result<Option<Principal>, StoreError> {
        let state = self.state.read().await;
        Ok(state.lookup(&state.by_contact, contact_address.as_str()))
    }

    async fn insert(&self, principal: NewPrincipal) -> Result<Principal, StoreError> {
        let mut state = self.state.write().await;

        if state
            .by_display_name
            .contains_key(principal.display_name.as_str())
        {
            return Err(StoreError::UniquenessViolation(UniqueField::DisplayName));
        }
        if state
            .by_contact
            .contains_key(principal.contact_address.as_str())
        {
            return Err(StoreError::UniquenessViolation(UniqueField::ContactAddress));
        }

        state.last_id += 1;
        let id = PrincipalId(state.last_id);

        let stored = Principal {
            id,
            display_name: principal.display_name,
            contact_address: principal.contact_address,
            secret_hash: principal.secret_hash,
            created_at: Utc::now(),
        };

        state
            .by_display_name
            .insert(stored.display_name.as_str().to_string(), id);
        state
            .by_contact
            .insert(stored.contact_address.as_str().to_string(), id);
        state.principals.insert(id, stored.clone());

        Ok(stored)
    }
}
