use std::sync::Arc;

use crate::domain::{
    PlayerId, RepoUpdateError,
    player::{Player, PlayerPatch, PlayerRepository},
    validation::{PlayerValidationError, validate_for_update},
};

#[async_trait::async_trait]
pub trait UpdatePlayerUseCase {
    async fn update_player(
        &self,
        id: PlayerId,
        patch: Option<PlayerPatch>,
    ) -> Result<Player, UpdatePlayerError>;
}

#[derive(Debug, PartialEq)]
pub enum UpdatePlayerError {
    NotFound,
    Invalid(PlayerValidationError),
    RepositoryError,
}

pub struct UpdatePlayerUseCaseImpl<PR: PlayerRepository> {
    player_repository: Arc<PR>,
}

impl<PR: PlayerRepository> UpdatePlayerUseCaseImpl<PR> {
    pub fn new(player_repository: Arc<PR>) -> Self {
        Self { player_repository }
    }
}

#[async_trait::async_trait]
impl<PR: PlayerRepository + Send + Sync + 'static> UpdatePlayerUseCase
    for UpdatePlayerUseCaseImpl<PR>
{
    async fn update_player(
        &self,
        id: PlayerId,
        patch: Option<PlayerPatch>,
    ) -> Result<Player, UpdatePlayerError> {
        // the patch is checked against the stored record inside the
        // repository transaction, so a missing player wins over a missing patch
        let res = self
            .player_repository
            .update_player(id, move |existing| validate_for_update(existing, patch))
            .await;
        match res {
            Ok(player) => {
                log::info!("Updated player {}", id);
                Ok(player)
            }
            Err(RepoUpdateError::NotFound) => Err(UpdatePlayerError::NotFound),
            Err(RepoUpdateError::Rejected(e)) => {
                log::debug!("Rejected update of player {}: {}", id, e);
                Err(UpdatePlayerError::Invalid(e))
            }
            Err(RepoUpdateError::StorageError(e)) => {
                log::error!("Error updating player {}: {}", id, e);
                Err(UpdatePlayerError::RepositoryError)
            }
        }
    }
}
