use player_server_app::domain::{
    PlayerId, RepoDeleteError, RepoError, RepoRetrieveError, RepoUpdateError,
    player::{NewPlayer, Player, PlayerRepository},
};
use sea_orm::{
    ActiveModelTrait, DatabaseConnection, EntityTrait, NotSet, QueryOrder, Set, TransactionError,
    TransactionTrait,
};

use crate::entity::player;

pub struct PlayerRepositoryImpl {
    db: DatabaseConnection,
}

impl PlayerRepositoryImpl {
    pub fn with_connection(db: DatabaseConnection) -> Self {
        Self { db }
    }

    fn model_to_player(model: player::Model) -> Result<Player, String> {
        Ok(Player {
            id: PlayerId(model.id),
            name: model.name,
            title: model.title,
            race: model.race.parse().map_err(|e| format!("player {}: {}", model.id, e))?,
            profession: model
                .profession
                .parse()
                .map_err(|e| format!("player {}: {}", model.id, e))?,
            birthday: model.birthday,
            experience: model.experience,
            level: model.level,
            until_next_level: model.until_next_level,
            banned: model.banned,
        })
    }

    fn player_to_model(player: &Player) -> player::ActiveModel {
        player::ActiveModel {
            id: Set(player.id.0),
            name: Set(player.name.clone()),
            title: Set(player.title.clone()),
            race: Set(player.race.as_str().to_string()),
            profession: Set(player.profession.as_str().to_string()),
            birthday: Set(player.birthday),
            experience: Set(player.experience),
            level: Set(player.level),
            until_next_level: Set(player.until_next_level),
            banned: Set(player.banned),
        }
    }
}

#[async_trait::async_trait]
impl PlayerRepository for PlayerRepositoryImpl {
    async fn find_all(&self) -> Result<Vec<Player>, RepoError> {
        let models = player::Entity::find()
            .order_by_asc(player::Column::Id)
            .all(&self.db)
            .await
            .map_err(|e| RepoError::StorageError(e.to_string()))?;

        models
            .into_iter()
            .map(|model| Self::model_to_player(model).map_err(RepoError::StorageError))
            .collect()
    }

    async fn find_by_id(&self, id: PlayerId) -> Result<Player, RepoRetrieveError> {
        let player_model = player::Entity::find_by_id(id.0)
            .one(&self.db)
            .await
            .map_err(|e| RepoRetrieveError::StorageError(e.to_string()))?;

        if let Some(model) = player_model {
            Self::model_to_player(model).map_err(RepoRetrieveError::StorageError)
        } else {
            Err(RepoRetrieveError::NotFound)
        }
    }

    async fn insert_player(&self, player: NewPlayer) -> Result<Player, RepoError> {
        let new_player = player::ActiveModel {
            id: NotSet,
            name: Set(player.name),
            title: Set(player.title),
            race: Set(player.race.as_str().to_string()),
            profession: Set(player.profession.as_str().to_string()),
            birthday: Set(player.birthday),
            experience: Set(player.experience),
            level: Set(player.level),
            until_next_level: Set(player.until_next_level),
            banned: Set(player.banned),
        };

        let model = new_player
            .insert(&self.db)
            .await
            .map_err(|e| RepoError::StorageError(e.to_string()))?;
        Self::model_to_player(model).map_err(RepoError::StorageError)
    }

    async fn update_player<R: std::fmt::Display + std::fmt::Debug + Send + 'static>(
        &self,
        id: PlayerId,
        update_fn: impl FnOnce(Player) -> Result<Player, R> + Send + 'static,
    ) -> Result<Player, RepoUpdateError<R>> {
        let res = self
            .db
            .transaction::<_, Player, RepoUpdateError<R>>(|c| {
                Box::pin(async move {
                    let player_model = player::Entity::find_by_id(id.0)
                        .one(c)
                        .await
                        .map_err(|e| RepoUpdateError::StorageError(e.to_string()))?;

                    let existing = if let Some(model) = player_model {
                        Self::model_to_player(model).map_err(RepoUpdateError::StorageError)?
                    } else {
                        return Err(RepoUpdateError::NotFound);
                    };

                    let mut updated = update_fn(existing).map_err(RepoUpdateError::Rejected)?;
                    updated.id = id;

                    Self::player_to_model(&updated)
                        .update(c)
                        .await
                        .map_err(|e| RepoUpdateError::StorageError(e.to_string()))?;

                    Ok(updated)
                })
            })
            .await;

        match res {
            Ok(player) => Ok(player),
            Err(TransactionError::Transaction(e)) => Err(e),
            Err(TransactionError::Connection(e)) => {
                Err(RepoUpdateError::StorageError(e.to_string()))
            }
        }
    }

    async fn delete_player(&self, id: PlayerId) -> Result<(), RepoDeleteError> {
        let res = player::Entity::delete_by_id(id.0)
            .exec(&self.db)
            .await
            .map_err(|e| RepoDeleteError::StorageError(e.to_string()))?;

        if res.rows_affected > 0 {
            Ok(())
        } else {
            Err(RepoDeleteError::NotFound)
        }
    }
}
