use std::sync::Arc;

use crate::{
    domain::player::PlayerRepository,
    workflow::player::{
        count::{CountPlayersUseCase, CountPlayersUseCaseImpl},
        create::{CreatePlayerUseCase, CreatePlayerUseCaseImpl},
        delete::{DeletePlayerUseCase, DeletePlayerUseCaseImpl},
        get::{GetPlayerUseCase, GetPlayerUseCaseImpl},
        list::{ListPlayersUseCase, ListPlayersUseCaseImpl},
        update::{UpdatePlayerUseCase, UpdatePlayerUseCaseImpl},
    },
};

pub mod domain;
pub mod testing;
pub mod workflow;

pub struct Application {
    pub player_list_use_case: Box<dyn ListPlayersUseCase + Send + Sync>,
    pub player_count_use_case: Box<dyn CountPlayersUseCase + Send + Sync>,
    pub player_get_use_case: Box<dyn GetPlayerUseCase + Send + Sync>,
    pub player_create_use_case: Box<dyn CreatePlayerUseCase + Send + Sync>,
    pub player_update_use_case: Box<dyn UpdatePlayerUseCase + Send + Sync>,
    pub player_delete_use_case: Box<dyn DeletePlayerUseCase + Send + Sync>,
}

pub fn build_application<PR: PlayerRepository + Send + Sync + 'static>(
    player_repository: Arc<PR>,
) -> Application {
    Application {
        player_list_use_case: Box::new(ListPlayersUseCaseImpl::new(player_repository.clone())),
        player_count_use_case: Box::new(CountPlayersUseCaseImpl::new(player_repository.clone())),
        player_get_use_case: Box::new(GetPlayerUseCaseImpl::new(player_repository.clone())),
        player_create_use_case: Box::new(CreatePlayerUseCaseImpl::new(player_repository.clone())),
        player_update_use_case: Box::new(UpdatePlayerUseCaseImpl::new(player_repository.clone())),
        player_delete_use_case: Box::new(DeletePlayerUseCaseImpl::new(player_repository)),
    }
}
