use std::sync::{
    Mutex,
    atomic::{AtomicBool, Ordering},
};

use crate::domain::{
    PlayerId, RepoDeleteError, RepoError, RepoRetrieveError, RepoUpdateError,
    player::{NewPlayer, Player, PlayerRepository},
};

/// In-memory repository for tests. Keeps players in insertion order and hands
/// out ids from 1 upwards. `fail_storage` makes every call report a storage
/// error.
#[derive(Default)]
pub struct MockPlayerRepository {
    state: Mutex<MockState>,
    failing: AtomicBool,
}

#[derive(Default)]
struct MockState {
    players: Vec<Player>,
    last_id: i64,
}

impl MockPlayerRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_players(players: Vec<Player>) -> Self {
        let last_id = players.iter().map(|p| p.id.0).max().unwrap_or(0);
        Self {
            state: Mutex::new(MockState { players, last_id }),
            failing: AtomicBool::new(false),
        }
    }

    pub fn fail_storage(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    pub fn players(&self) -> Vec<Player> {
        self.lock().players.clone()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, MockState> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn is_failing(&self) -> bool {
        self.failing.load(Ordering::SeqCst)
    }
}

const STORAGE_DOWN: &str = "storage unavailable";

#[async_trait::async_trait]
impl PlayerRepository for MockPlayerRepository {
    async fn find_all(&self) -> Result<Vec<Player>, RepoError> {
        if self.is_failing() {
            return Err(RepoError::StorageError(STORAGE_DOWN.to_string()));
        }
        Ok(self.lock().players.clone())
    }

    async fn find_by_id(&self, id: PlayerId) -> Result<Player, RepoRetrieveError> {
        if self.is_failing() {
            return Err(RepoRetrieveError::StorageError(STORAGE_DOWN.to_string()));
        }
        self.lock()
            .players
            .iter()
            .find(|p| p.id == id)
            .cloned()
            .ok_or(RepoRetrieveError::NotFound)
    }

    async fn insert_player(&self, player: NewPlayer) -> Result<Player, RepoError> {
        if self.is_failing() {
            return Err(RepoError::StorageError(STORAGE_DOWN.to_string()));
        }
        let mut state = self.lock();
        state.last_id += 1;
        let player = player.with_id(PlayerId(state.last_id));
        state.players.push(player.clone());
        Ok(player)
    }

    async fn update_player<R: std::fmt::Display + std::fmt::Debug + Send + 'static>(
        &self,
        id: PlayerId,
        update_fn: impl FnOnce(Player) -> Result<Player, R> + Send + 'static,
    ) -> Result<Player, RepoUpdateError<R>> {
        if self.is_failing() {
            return Err(RepoUpdateError::StorageError(STORAGE_DOWN.to_string()));
        }
        let mut state = self.lock();
        let Some(slot) = state.players.iter_mut().find(|p| p.id == id) else {
            return Err(RepoUpdateError::NotFound);
        };
        let mut updated = update_fn(slot.clone()).map_err(RepoUpdateError::Rejected)?;
        updated.id = id;
        *slot = updated.clone();
        Ok(updated)
    }

    async fn delete_player(&self, id: PlayerId) -> Result<(), RepoDeleteError> {
        if self.is_failing() {
            return Err(RepoDeleteError::StorageError(STORAGE_DOWN.to_string()));
        }
        let mut state = self.lock();
        let before = state.players.len();
        state.players.retain(|p| p.id != id);
        if state.players.len() == before {
            return Err(RepoDeleteError::NotFound);
        }
        Ok(())
    }
}
