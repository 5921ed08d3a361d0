//! Roster persistence boundary and an in-process store.
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::{Arc, Mutex, MutexGuard};

use crate::error::StoreError;
use crate::player::{Player, PlayerId, PlayerPatch};

/// Single write against the roster store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum RosterOp {
    Create { player: Player },
    Update { id: PlayerId, patch: PlayerPatch },
    Delete { id: PlayerId },
    DeleteAll,
}

/// Remote roster storage reached through request/response calls.
///
/// Writes become visible to later reads eventually; implementations should
/// treat `create` of an existing id as a no-op so UI retries never duplicate
/// players.
#[async_trait]
pub trait RosterStore: Send + Sync {
    /// Fetch every stored player.
    ///
    /// # Errors
    ///
    /// Returns an error if the store cannot be read.
    async fn list(&self) -> Result<Vec<Player>, StoreError>;

    /// Persist a new player record.
    ///
    /// # Errors
    ///
    /// Returns an error if the record cannot be written.
    async fn create(&self, player: &Player) -> Result<(), StoreError>;

    /// Update fields of an existing record.
    ///
    /// # Errors
    ///
    /// Returns an error if the record cannot be written.
    async fn update(&self, id: PlayerId, patch: PlayerPatch) -> Result<(), StoreError>;

    /// Delete a record.
    ///
    /// # Errors
    ///
    /// Returns an error if the record cannot be deleted.
    async fn delete(&self, id: PlayerId) -> Result<(), StoreError>;

    /// Delete every record.
    ///
    /// # Errors
    ///
    /// Returns an error if the records cannot be deleted.
    async fn delete_all(&self) -> Result<(), StoreError>;

    /// Apply several writes. Stores with transactions should override this to
    /// apply all or nothing; the default issues the writes in order and stops
    /// at the first failure.
    ///
    /// # Errors
    ///
    /// Returns the first write error.
    async fn apply_batch(&self, ops: &[RosterOp]) -> Result<(), StoreError> {
        for op in ops {
            match op {
                RosterOp::Create { player } => self.create(player).await?,
                RosterOp::Update { id, patch } => self.update(*id, *patch).await?,
                RosterOp::Delete { id } => self.delete(*id).await?,
                RosterOp::DeleteAll => self.delete_all().await?,
            }
        }
        Ok(())
    }
}

#[derive(Debug, Default)]
struct MemoryState {
    records: Vec<Player>,
    pending_failure: Option<&'static str>,
    writes: u64,
}

impl MemoryState {
    fn take_failure(&mut self, operation: &'static str) -> Result<(), StoreError> {
        if self.pending_failure == Some(operation) {
            self.pending_failure = None;
            return Err(StoreError::new(operation, "injected failure"));
        }
        Ok(())
    }

    fn apply(records: &mut Vec<Player>, op: &RosterOp) -> Result<(), StoreError> {
        match op {
            RosterOp::Create { player } => {
                if !records.iter().any(|record| record.id == player.id) {
                    records.push(player.clone());
                }
            }
            RosterOp::Update { id, patch } => {
                let record = records
                    .iter_mut()
                    .find(|record| record.id == *id)
                    .ok_or_else(|| StoreError::new("update", format!("no record for {id}")))?;
                patch.apply_to(record);
            }
            RosterOp::Delete { id } => records.retain(|record| record.id != *id),
            RosterOp::DeleteAll => records.clear(),
        }
        Ok(())
    }
}

/// In-process store; batches are atomic. Clones share the same records.
#[derive(Debug, Clone, Default)]
pub struct MemoryRosterStore {
    state: Arc<Mutex<MemoryState>>,
}

impl MemoryRosterStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Store pre-populated with records.
    #[must_use]
    pub fn with_players(players: Vec<Player>) -> Self {
        let store = Self::new();
        if let Ok(mut state) = store.state.lock() {
            state.records = players;
        }
        store
    }

    /// Make the next call of `operation` (`"list"`, `"create"`, `"update"`,
    /// `"delete"`, `"delete_all"`, or `"apply_batch"`) fail once.
    pub fn fail_next(&self, operation: &'static str) {
        if let Ok(mut state) = self.state.lock() {
            state.pending_failure = Some(operation);
        }
    }

    /// Snapshot of the stored records.
    #[must_use]
    pub fn snapshot(&self) -> Vec<Player> {
        self.state
            .lock()
            .map(|state| state.records.clone())
            .unwrap_or_default()
    }

    /// Number of successful write calls (a batch counts once).
    #[must_use]
    pub fn writes(&self) -> u64 {
        self.state.lock().map(|state| state.writes).unwrap_or(0)
    }

    fn lock(&self) -> Result<MutexGuard<'_, MemoryState>, StoreError> {
        self.state
            .lock()
            .map_err(|_| StoreError::new("lock", "memory store poisoned"))
    }

    fn write(&self, operation: &'static str, op: &RosterOp) -> Result<(), StoreError> {
        let mut state = self.lock()?;
        state.take_failure(operation)?;
        MemoryState::apply(&mut state.records, op)?;
        state.writes += 1;
        Ok(())
    }
}

#[async_trait]
impl RosterStore for MemoryRosterStore {
    async fn list(&self) -> Result<Vec<Player>, StoreError> {
        let mut state = self.lock()?;
        state.take_failure("list")?;
        Ok(state.records.clone())
    }

    async fn create(&self, player: &Player) -> Result<(), StoreError> {
        self.write(
            "create",
            &RosterOp::Create {
                player: player.clone(),
            },
        )
    }

    async fn update(&self, id: PlayerId, patch: PlayerPatch) -> Result<(), StoreError> {
        self.write("update", &RosterOp::Update { id, patch })
    }

    async fn delete(&self, id: PlayerId) -> Result<(), StoreError> {
        self.write("delete", &RosterOp::Delete { id })
    }

    async fn delete_all(&self) -> Result<(), StoreError> {
        self.write("delete_all", &RosterOp::DeleteAll)
    }

    async fn apply_batch(&self, ops: &[RosterOp]) -> Result<(), StoreError> {
        let mut state = self.lock()?;
        state.take_failure("apply_batch")?;
        let mut staged = state.records.clone();
        for op in ops {
            MemoryState::apply(&mut staged, op)?;
        }
        state.records = staged;
        state.writes += 1;
        Ok(())
    }
}
