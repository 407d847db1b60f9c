use std::{fmt::Display, str::FromStr};

use axum::{
    Json,
    extract::{
        Path, Query, State,
        rejection::{JsonRejection, QueryRejection},
    },
};
use chrono::{DateTime, Utc};
use player_server_app::domain::{
    PlayerId,
    player::{Player, PlayerPatch, PlayerPayload},
    query::{Pagination, PlayerFilter, PlayerQuery},
};
use serde::{Deserialize, Deserializer};

use crate::{AppState, ServiceError};

#[derive(serde::Serialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct JsonPlayer {
    id: i64,
    name: String,
    title: String,
    race: &'static str,
    profession: &'static str,
    birthday: i64,
    experience: i32,
    banned: Option<bool>,
    level: i32,
    until_next_level: i32,
}

impl From<Player> for JsonPlayer {
    fn from(player: Player) -> Self {
        JsonPlayer {
            id: player.id.0,
            name: player.name,
            title: player.title,
            race: player.race.as_str(),
            profession: player.profession.as_str(),
            birthday: player.birthday.timestamp_millis(),
            experience: player.experience,
            banned: player.banned,
            level: player.level,
            until_next_level: player.until_next_level,
        }
    }
}

/// Inbound player body. `id`, `level` and `untilNextLevel` are not part of
/// it and get dropped during deserialization.
#[derive(Deserialize, Debug, Default)]
#[serde(rename_all = "camelCase")]
pub struct JsonPlayerInput {
    name: Option<String>,
    title: Option<String>,
    race: Option<String>,
    profession: Option<String>,
    birthday: Option<i64>,
    experience: Option<i32>,
    #[serde(default, deserialize_with = "deserialize_some")]
    banned: Option<Option<bool>>,
}

// distinguishes an explicit null from an absent field
fn deserialize_some<'de, T, D>(deserializer: D) -> Result<Option<T>, D::Error>
where
    T: Deserialize<'de>,
    D: Deserializer<'de>,
{
    T::deserialize(deserializer).map(Some)
}

impl JsonPlayerInput {
    fn into_payload(self) -> Result<PlayerPayload, ServiceError> {
        Ok(PlayerPayload {
            race: parse_param("race", self.race.as_deref())?,
            profession: parse_param("profession", self.profession.as_deref())?,
            birthday: self.birthday.map(millis_to_date).transpose()?,
            name: self.name,
            title: self.title,
            experience: self.experience,
            banned: self.banned.flatten(),
        })
    }

    fn into_patch(self) -> Result<PlayerPatch, ServiceError> {
        Ok(PlayerPatch {
            race: parse_param("race", self.race.as_deref())?,
            profession: parse_param("profession", self.profession.as_deref())?,
            birthday: self.birthday.map(millis_to_date).transpose()?,
            name: self.name,
            title: self.title,
            experience: self.experience,
            banned: self.banned,
        })
    }
}

#[derive(Deserialize, Debug, Default)]
#[serde(rename_all = "camelCase")]
pub struct JsonPlayerFilter {
    name: Option<String>,
    title: Option<String>,
    race: Option<String>,
    profession: Option<String>,
    after: Option<String>,
    before: Option<String>,
    banned: Option<String>,
    min_experience: Option<String>,
    max_experience: Option<String>,
    min_level: Option<String>,
    max_level: Option<String>,
    order: Option<String>,
    page_number: Option<String>,
    page_size: Option<String>,
}

impl JsonPlayerFilter {
    fn to_filter(&self) -> Result<PlayerFilter, ServiceError> {
        Ok(PlayerFilter {
            name: self.name.clone(),
            title: self.title.clone(),
            race: parse_param("race", self.race.as_deref())?,
            profession: parse_param("profession", self.profession.as_deref())?,
            after: parse_param("after", self.after.as_deref())?
                .map(millis_to_date)
                .transpose()?,
            before: parse_param("before", self.before.as_deref())?
                .map(millis_to_date)
                .transpose()?,
            banned: parse_param("banned", self.banned.as_deref())?,
            min_experience: parse_param("minExperience", self.min_experience.as_deref())?,
            max_experience: parse_param("maxExperience", self.max_experience.as_deref())?,
            min_level: parse_param("minLevel", self.min_level.as_deref())?,
            max_level: parse_param("maxLevel", self.max_level.as_deref())?,
        })
    }

    fn to_query(&self) -> Result<PlayerQuery, ServiceError> {
        Ok(PlayerQuery {
            filter: self.to_filter()?,
            order: parse_param("order", self.order.as_deref())?,
            pagination: Pagination::new(
                parse_param("pageNumber", self.page_number.as_deref())?,
                parse_param("pageSize", self.page_size.as_deref())?,
            ),
        })
    }
}

fn parse_param<T>(name: &str, value: Option<&str>) -> Result<Option<T>, ServiceError>
where
    T: FromStr,
    T::Err: Display,
{
    match value.map(str::trim) {
        None | Some("") => Ok(None),
        Some(raw) => raw
            .parse::<T>()
            .map(Some)
            .map_err(|e| ServiceError::BadRequest(format!("Invalid {} '{}': {}", name, raw, e))),
    }
}

fn millis_to_date(millis: i64) -> Result<DateTime<Utc>, ServiceError> {
    DateTime::from_timestamp_millis(millis)
        .ok_or_else(|| ServiceError::BadRequest(format!("Invalid timestamp {}", millis)))
}

/// Ids must be whole, strictly positive numbers.
fn parse_player_id(raw: &str) -> Result<PlayerId, ServiceError> {
    match raw.parse::<i64>() {
        Ok(id) if id > 0 => Ok(PlayerId(id)),
        _ => Err(ServiceError::BadRequest(format!("Invalid player id '{}'", raw))),
    }
}

fn query_params(
    query: Result<Query<JsonPlayerFilter>, QueryRejection>,
) -> Result<JsonPlayerFilter, ServiceError> {
    query
        .map(|Query(filter)| filter)
        .map_err(|e| ServiceError::BadRequest(e.body_text()))
}

fn json_body(
    body: Result<Json<Option<JsonPlayerInput>>, JsonRejection>,
) -> Result<Option<JsonPlayerInput>, ServiceError> {
    body.map(|Json(input)| input)
        .map_err(|e| ServiceError::BadRequest(e.body_text()))
}

pub async fn list_players(
    State(app_state): State<AppState>,
    query: Result<Query<JsonPlayerFilter>, QueryRejection>,
) -> Result<Json<Vec<JsonPlayer>>, ServiceError> {
    let query = query_params(query)?.to_query()?;
    let players = app_state.app.player_list_use_case.list_players(query).await?;
    Ok(Json(players.into_iter().map(JsonPlayer::from).collect()))
}

pub async fn count_players(
    State(app_state): State<AppState>,
    query: Result<Query<JsonPlayerFilter>, QueryRejection>,
) -> Result<Json<usize>, ServiceError> {
    let filter = query_params(query)?.to_filter()?;
    let count = app_state
        .app
        .player_count_use_case
        .count_players(filter)
        .await?;
    Ok(Json(count))
}

pub async fn get_player(
    State(app_state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<JsonPlayer>, ServiceError> {
    let id = parse_player_id(&id)?;
    let player = app_state.app.player_get_use_case.get_player(id).await?;
    Ok(Json(player.into()))
}

pub async fn create_player(
    State(app_state): State<AppState>,
    body: Result<Json<Option<JsonPlayerInput>>, JsonRejection>,
) -> Result<Json<JsonPlayer>, ServiceError> {
    let payload = json_body(body)?
        .map(JsonPlayerInput::into_payload)
        .transpose()?;
    let player = app_state
        .app
        .player_create_use_case
        .create_player(payload)
        .await?;
    Ok(Json(player.into()))
}

pub async fn update_player(
    State(app_state): State<AppState>,
    Path(id): Path<String>,
    body: Result<Json<Option<JsonPlayerInput>>, JsonRejection>,
) -> Result<Json<JsonPlayer>, ServiceError> {
    let id = parse_player_id(&id)?;
    let patch = json_body(body)?
        .map(JsonPlayerInput::into_patch)
        .transpose()?;
    let player = app_state
        .app
        .player_update_use_case
        .update_player(id, patch)
        .await?;
    Ok(Json(player.into()))
}

pub async fn delete_player(
    State(app_state): State<AppState>,
    Path(id): Path<String>,
) -> Result<(), ServiceError> {
    let id = parse_player_id(&id)?;
    app_state.app.player_delete_use_case.delete_player(id).await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use axum::{
        Router,
        body::Body,
        http::{Method, Request, StatusCode, header},
    };
    use player_server_app::{build_application, testing::MockPlayerRepository};
    use serde_json::{Value, json};
    use tower::ServiceExt;

    use crate::router;

    fn app(repo: Arc<MockPlayerRepository>) -> Router {
        router(Arc::new(build_application(repo)))
    }

    async fn send(
        router: &Router,
        method: Method,
        uri: &str,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let request = Request::builder().method(method).uri(uri);
        let request = match body {
            Some(body) => request
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string())),
            None => request.body(Body::empty()),
        }
        .unwrap();

        let response = router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let value = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, value)
    }

    fn body(name: &str, experience: i32) -> Value {
        json!({
            "name": name,
            "title": "Ranger of the North",
            "race": "HUMAN",
            "profession": "WARRIOR",
            "birthday": 1_100_000_000_000i64,
            "experience": experience,
        })
    }

    async fn seeded(count: i32) -> (Arc<MockPlayerRepository>, Router) {
        let repo = Arc::new(MockPlayerRepository::new());
        let router = app(repo.clone());
        for i in 1..=count {
            let (status, _) = send(
                &router,
                Method::POST,
                "/players",
                Some(body(&format!("p{}", i), i * 100)),
            )
            .await;
            assert_eq!(status, StatusCode::OK);
        }
        (repo, router)
    }

    #[tokio::test]
    async fn test_create_and_get() {
        let (_, router) = seeded(0).await;

        let mut input = body("Aragorn", 5000);
        input["id"] = json!(77);
        input["level"] = json!(99);
        let (status, created) = send(&router, Method::POST, "/players", Some(input)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(created["id"], 1);
        assert_eq!(created["level"], 9);
        assert_eq!(created["untilNextLevel"], 500);
        assert_eq!(created["birthday"], 1_100_000_000_000i64);
        assert_eq!(created["banned"], Value::Null);

        let (status, fetched) = send(&router, Method::GET, "/players/1", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(fetched, created);
    }

    #[tokio::test]
    async fn test_create_rejects_bad_payloads() {
        let (repo, router) = seeded(0).await;

        let (status, error) =
            send(&router, Method::POST, "/players", Some(body("ThirteenChars", 1))).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(error["error"].is_string());

        // seven astral-plane characters are fourteen UTF-16 units
        let (status, _) = send(
            &router,
            Method::POST,
            "/players",
            Some(body(&"\u{1F409}".repeat(7), 1)),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let mut unknown_race = body("Legolas", 1);
        unknown_race["race"] = json!("SPACE_ELF");
        let (status, _) = send(&router, Method::POST, "/players", Some(unknown_race)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let mut early = body("Legolas", 1);
        early["birthday"] = json!(915_148_800_000i64); // 1999-01-01
        let (status, _) = send(&router, Method::POST, "/players", Some(early)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let (status, _) = send(&router, Method::POST, "/players", Some(Value::Null)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let (status, _) = send(&router, Method::POST, "/players", Some(json!({}))).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        assert!(repo.players().is_empty());
    }

    #[tokio::test]
    async fn test_malformed_ids() {
        let (_, router) = seeded(1).await;
        for id in ["0", "-1", "1.5", "null", "abc"] {
            let uri = format!("/players/{}", id);
            let (status, _) = send(&router, Method::GET, &uri, None).await;
            assert_eq!(status, StatusCode::BAD_REQUEST, "GET {}", uri);
            let (status, _) = send(&router, Method::DELETE, &uri, None).await;
            assert_eq!(status, StatusCode::BAD_REQUEST, "DELETE {}", uri);
        }

        let (status, _) = send(&router, Method::GET, "/players/2", None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_update_player() {
        let (_, router) = seeded(1).await;

        let (status, _) = send(
            &router,
            Method::POST,
            "/players/1",
            Some(json!({ "banned": true })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);

        let (status, updated) = send(
            &router,
            Method::POST,
            "/players/1",
            Some(json!({ "experience": 7000 })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(updated["experience"], 7000);
        assert_eq!(updated["level"], 11);
        assert_eq!(updated["untilNextLevel"], 800);
        assert_eq!(updated["name"], "p1");
        assert_eq!(updated["banned"], true);

        let (status, cleared) = send(
            &router,
            Method::POST,
            "/players/1",
            Some(json!({ "banned": null })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(cleared["banned"], Value::Null);

        let (status, _) = send(
            &router,
            Method::POST,
            "/players/1",
            Some(json!({ "title": "" })),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let (status, _) = send(&router, Method::POST, "/players/9", Some(Value::Null)).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_list_and_count() {
        let (_, router) = seeded(10).await;

        let (status, page) = send(&router, Method::GET, "/players", None).await;
        assert_eq!(status, StatusCode::OK);
        let ids: Vec<i64> = page
            .as_array()
            .unwrap()
            .iter()
            .map(|p| p["id"].as_i64().unwrap())
            .collect();
        assert_eq!(ids, vec![1, 2, 3]);

        let (_, page) = send(
            &router,
            Method::GET,
            "/players?pageNumber=2&pageSize=3",
            None,
        )
        .await;
        let ids: Vec<i64> = page
            .as_array()
            .unwrap()
            .iter()
            .map(|p| p["id"].as_i64().unwrap())
            .collect();
        assert_eq!(ids, vec![7, 8, 9]);

        let (_, page) = send(
            &router,
            Method::GET,
            "/players?minExperience=250&maxExperience=650&order=experience&pageSize=10",
            None,
        )
        .await;
        assert_eq!(page.as_array().unwrap().len(), 4);

        let (status, count) = send(
            &router,
            Method::GET,
            "/players/count?minExperience=250&maxExperience=650&pageSize=1",
            None,
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(count, 4);

        let (_, count) = send(&router, Method::GET, "/rest/players/count", None).await;
        assert_eq!(count, 10);
    }

    #[tokio::test]
    async fn test_list_rejects_malformed_query() {
        let (_, router) = seeded(1).await;
        for uri in [
            "/players?order=HEIGHT",
            "/players?race=human",
            "/players?pageNumber=-1",
            "/players?minExperience=lots",
            "/players?banned=maybe",
            "/players/count?after=yesterday",
        ] {
            let (status, _) = send(&router, Method::GET, uri, None).await;
            assert_eq!(status, StatusCode::BAD_REQUEST, "{}", uri);
        }
    }

    #[tokio::test]
    async fn test_delete_twice() {
        let (_, router) = seeded(2).await;

        let (status, _) = send(&router, Method::DELETE, "/rest/players/1", None).await;
        assert_eq!(status, StatusCode::OK);
        let (status, _) = send(&router, Method::DELETE, "/players/1", None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        let (_, count) = send(&router, Method::GET, "/players/count", None).await;
        assert_eq!(count, 1);
    }

    #[tokio::test]
    async fn test_storage_failure_is_internal() {
        let (repo, router) = seeded(1).await;
        repo.fail_storage(true);

        let (status, error) = send(&router, Method::GET, "/players/1", None).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(error, json!({ "error": "Internal storage error" }));
    }
}
