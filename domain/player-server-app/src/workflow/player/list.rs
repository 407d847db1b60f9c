use std::sync::Arc;

use crate::domain::{
    RepoError,
    player::{Player, PlayerRepository},
    query::PlayerQuery,
};

#[async_trait::async_trait]
pub trait ListPlayersUseCase {
    async fn list_players(&self, query: PlayerQuery) -> Result<Vec<Player>, ListPlayersError>;
}

#[derive(Debug, PartialEq)]
pub enum ListPlayersError {
    RepositoryError,
}

pub struct ListPlayersUseCaseImpl<PR: PlayerRepository> {
    player_repository: Arc<PR>,
}

impl<PR: PlayerRepository> ListPlayersUseCaseImpl<PR> {
    pub fn new(player_repository: Arc<PR>) -> Self {
        Self { player_repository }
    }
}

#[async_trait::async_trait]
impl<PR: PlayerRepository + Send + Sync + 'static> ListPlayersUseCase
    for ListPlayersUseCaseImpl<PR>
{
    async fn list_players(&self, query: PlayerQuery) -> Result<Vec<Player>, ListPlayersError> {
        match self.player_repository.find_all().await {
            Ok(players) => Ok(query.execute(players)),
            Err(RepoError::StorageError(e)) => {
                log::error!("Error listing players: {}", e);
                Err(ListPlayersError::RepositoryError)
            }
        }
    }
}
