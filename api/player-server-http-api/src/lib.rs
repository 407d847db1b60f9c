use std::sync::Arc;

use axum::{
    Router,
    http::StatusCode,
    response::IntoResponse,
    routing::get,
};
use log::info;
use player_server_app::{
    Application,
    workflow::player::{
        count::CountPlayersError, create::CreatePlayerError, delete::DeletePlayerError,
        get::GetPlayerError, list::ListPlayersError, update::UpdatePlayerError,
    },
};

mod player;

#[derive(Clone)]
pub struct AppState {
    app: Arc<Application>,
}

pub fn router(app: Arc<Application>) -> Router {
    let players = Router::new()
        .route(
            "/players",
            get(player::list_players).post(player::create_player),
        )
        .route("/players/count", get(player::count_players))
        .route(
            "/players/{id}",
            get(player::get_player)
                .post(player::update_player)
                .delete(player::delete_player),
        );

    Router::new()
        .merge(players.clone())
        .nest("/rest", players)
        .with_state(AppState { app })
}

pub async fn run(
    app: Arc<Application>,
    shutdown_signal: impl std::future::Future<Output = ()> + Send + 'static,
) -> std::io::Result<()> {
    let host = std::env::var("PLAYER_HTTP_HOST").unwrap_or_else(|_| "127.0.0.1".to_string());
    let port = std::env::var("PLAYER_HTTP_PORT")
        .unwrap_or_else(|_| "8080".to_string())
        .parse::<u16>()
        .expect("PLAYER_HTTP_PORT must be a valid u16");

    let listener = tokio::net::TcpListener::bind((host.as_str(), port)).await?;

    info!("Player API listening on {}:{}", host, port);
    axum::serve(listener, router(app))
        .with_graceful_shutdown(shutdown_signal)
        .await?;

    info!("Player API shut down gracefully");
    Ok(())
}

#[derive(Debug, PartialEq)]
pub enum ServiceError {
    BadRequest(String),
    NotFound(String),
    Internal(String),
}

impl IntoResponse for ServiceError {
    fn into_response(self) -> axum::response::Response {
        let (status, msg) = match self {
            ServiceError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            ServiceError::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
            ServiceError::Internal(msg) => (StatusCode::INTERNAL_SERVER_ERROR, msg),
        };
        let body = serde_json::json!({ "error": msg });
        (status, axum::Json(body)).into_response()
    }
}

fn internal() -> ServiceError {
    ServiceError::Internal("Internal storage error".to_string())
}

fn player_not_found() -> ServiceError {
    ServiceError::NotFound("Player not found".to_string())
}

impl From<ListPlayersError> for ServiceError {
    fn from(value: ListPlayersError) -> Self {
        match value {
            ListPlayersError::RepositoryError => internal(),
        }
    }
}

impl From<CountPlayersError> for ServiceError {
    fn from(value: CountPlayersError) -> Self {
        match value {
            CountPlayersError::RepositoryError => internal(),
        }
    }
}

impl From<GetPlayerError> for ServiceError {
    fn from(value: GetPlayerError) -> Self {
        match value {
            GetPlayerError::NotFound => player_not_found(),
            GetPlayerError::RepositoryError => internal(),
        }
    }
}

impl From<CreatePlayerError> for ServiceError {
    fn from(value: CreatePlayerError) -> Self {
        match value {
            CreatePlayerError::Invalid(e) => ServiceError::BadRequest(e.to_string()),
            CreatePlayerError::RepositoryError => internal(),
        }
    }
}

impl From<UpdatePlayerError> for ServiceError {
    fn from(value: UpdatePlayerError) -> Self {
        match value {
            UpdatePlayerError::NotFound => player_not_found(),
            UpdatePlayerError::Invalid(e) => ServiceError::BadRequest(e.to_string()),
            UpdatePlayerError::RepositoryError => internal(),
        }
    }
}

impl From<DeletePlayerError> for ServiceError {
    fn from(value: DeletePlayerError) -> Self {
        match value {
            DeletePlayerError::NotFound => player_not_found(),
            DeletePlayerError::RepositoryError => internal(),
        }
    }
}
