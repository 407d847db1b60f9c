use std::sync::Arc;

use crate::domain::{
    RepoError,
    player::{Player, PlayerPayload, PlayerRepository},
    validation::{PlayerValidationError, validate_for_create},
};

#[async_trait::async_trait]
pub trait CreatePlayerUseCase {
    async fn create_player(&self, payload: Option<PlayerPayload>)
    -> Result<Player, CreatePlayerError>;
}

#[derive(Debug, PartialEq)]
pub enum CreatePlayerError {
    Invalid(PlayerValidationError),
    RepositoryError,
}

pub struct CreatePlayerUseCaseImpl<PR: PlayerRepository> {
    player_repository: Arc<PR>,
}

impl<PR: PlayerRepository> CreatePlayerUseCaseImpl<PR> {
    pub fn new(player_repository: Arc<PR>) -> Self {
        Self { player_repository }
    }
}

#[async_trait::async_trait]
impl<PR: PlayerRepository + Send + Sync + 'static> CreatePlayerUseCase
    for CreatePlayerUseCaseImpl<PR>
{
    async fn create_player(
        &self,
        payload: Option<PlayerPayload>,
    ) -> Result<Player, CreatePlayerError> {
        let new_player = validate_for_create(payload).map_err(CreatePlayerError::Invalid)?;
        match self.player_repository.insert_player(new_player).await {
            Ok(player) => {
                log::info!("Created player {} ({})", player.id, player.name);
                Ok(player)
            }
            Err(RepoError::StorageError(e)) => {
                log::error!("Error creating player: {}", e);
                Err(CreatePlayerError::RepositoryError)
            }
        }
    }
}
