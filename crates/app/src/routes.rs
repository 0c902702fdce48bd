use axum::extract::{Query, State};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::{Deserialize, Serialize};

use bee_core::model::{LearnerKey, Tier, TierStats, WordId};
use services::{AnswerOutcome, AppServices, CardView};

use crate::response::{AppError, SuccessResponse};

#[derive(Clone)]
pub struct AppState {
    pub services: AppServices,
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/api/learners", get(list_learners))
        .route("/api/game", get(game))
        .route("/api/set_difficulty", post(set_difficulty))
        .route("/api/toggle_hint", post(toggle_hint))
        .route("/api/check_answer", post(check_answer))
        .route("/api/stats", get(stats))
        .with_state(state)
}

#[derive(Debug, Serialize)]
struct HealthResponse {
    status: &'static str,
}

async fn health() -> Json<HealthResponse> {
    Json(HealthResponse { status: "ok" })
}

#[derive(Debug, Serialize)]
struct LearnerItem {
    id: String,
    username: String,
}

async fn list_learners(
    State(state): State<AppState>,
) -> Result<Json<SuccessResponse<Vec<LearnerItem>>>, AppError> {
    let learners = state.services.learners().list().await?;
    let items = std::iter::once(LearnerItem {
        id: LearnerKey::Guest.to_string(),
        username: "Guest".to_string(),
    })
    .chain(learners.into_iter().map(|l| LearnerItem {
        id: l.id.to_string(),
        username: l.username,
    }))
    .collect();
    Ok(SuccessResponse::ok(items))
}

/// Parse `user_id` and make sure a named learner exists.
async fn learner_key(state: &AppState, raw: &str) -> Result<LearnerKey, AppError> {
    let key: LearnerKey = raw
        .parse()
        .map_err(|_| AppError::validation(format!("invalid user_id: {raw}")))?;

    if let Some(id) = key.learner_id() {
        if state.services.learners().get(id).await?.is_none() {
            return Err(AppError::not_found(format!("learner {id} not found")));
        }
    }
    Ok(key)
}

fn parse_tier(level: i64) -> Result<Tier, AppError> {
    Tier::from_level(level).map_err(|e| AppError::validation(e.to_string()))
}

#[derive(Debug, Deserialize)]
struct UserQuery {
    user_id: String,
}

async fn game(
    State(state): State<AppState>,
    Query(query): Query<UserQuery>,
) -> Result<Json<SuccessResponse<CardView>>, AppError> {
    let key = learner_key(&state, &query.user_id).await?;
    let card = state.services.sessions().current_card(key).await?;
    Ok(SuccessResponse::ok(card))
}

#[derive(Debug, Deserialize)]
struct SetDifficultyRequest {
    user_id: String,
    level: i64,
}

async fn set_difficulty(
    State(state): State<AppState>,
    Json(body): Json<SetDifficultyRequest>,
) -> Result<Json<SuccessResponse<CardView>>, AppError> {
    let key = learner_key(&state, &body.user_id).await?;
    let tier = parse_tier(body.level)?;
    let card = state.services.sessions().set_tier(key, tier).await?;
    Ok(SuccessResponse::ok(card))
}

#[derive(Debug, Deserialize)]
struct ToggleHintRequest {
    user_id: String,
    #[serde(default)]
    answer: Option<String>,
}

async fn toggle_hint(
    State(state): State<AppState>,
    Json(body): Json<ToggleHintRequest>,
) -> Result<Json<SuccessResponse<CardView>>, AppError> {
    let key = learner_key(&state, &body.user_id).await?;
    let card = state
        .services
        .sessions()
        .toggle_hint(key, body.answer)
        .await?;
    Ok(SuccessResponse::ok(card))
}

#[derive(Debug, Deserialize)]
struct CheckAnswerRequest {
    user_id: String,
    word_id: u64,
    answer: String,
}

async fn check_answer(
    State(state): State<AppState>,
    Json(body): Json<CheckAnswerRequest>,
) -> Result<Json<SuccessResponse<AnswerOutcome>>, AppError> {
    let key = learner_key(&state, &body.user_id).await?;
    let outcome = state
        .services
        .sessions()
        .submit_answer(key, WordId::new(body.word_id), &body.answer)
        .await?;
    Ok(SuccessResponse::ok(outcome))
}

#[derive(Debug, Deserialize)]
struct StatsQuery {
    user_id: String,
    level: i64,
}

async fn stats(
    State(state): State<AppState>,
    Query(query): Query<StatsQuery>,
) -> Result<Json<SuccessResponse<TierStats>>, AppError> {
    let key = learner_key(&state, &query.user_id).await?;
    let tier = parse_tier(query.level)?;
    let Some(learner_id) = key.learner_id() else {
        return Err(AppError::bad_request("guests have no stats"));
    };
    let stats = state.services.drill().user_stats(learner_id, tier).await?;
    Ok(SuccessResponse::ok(stats))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::{Body, to_bytes};
    use axum::http::{Request, StatusCode, header};
    use bee_core::catalog::Catalog;
    use bee_core::time::fixed_now;
    use serde_json::{Value, json};
    use services::Clock;
    use services::enrichment::NoEnrichment;
    use storage::repository::Storage;
    use tower::ServiceExt;

    async fn test_app() -> Router {
        let services = AppServices::from_storage(Storage::in_memory(), Clock::fixed(fixed_now()));
        let catalog =
            Catalog::from_json(r#"{"one_bee": ["cat", "dog"], "two_bee": [["gray", "grey"]]}"#)
                .unwrap();
        services
            .bootstrap(&catalog, &NoEnrichment, &["Kira".to_owned()])
            .await
            .unwrap();
        router(AppState { services })
    }

    async fn send(app: Router, request: Request<Body>) -> (StatusCode, Value) {
        let response = app.oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    fn get(uri: &str) -> Request<Body> {
        Request::builder().uri(uri).body(Body::empty()).unwrap()
    }

    fn post_json(uri: &str, body: &Value) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    #[tokio::test]
    async fn health_is_ok() {
        let (status, body) = send(test_app().await, get("/health")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "ok");
    }

    #[tokio::test]
    async fn learners_list_starts_with_guest() {
        let (status, body) = send(test_app().await, get("/api/learners")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"][0]["id"], "guest");
        assert_eq!(body["data"][1]["username"], "Kira");
    }

    #[tokio::test]
    async fn game_returns_a_scrambled_card() {
        let (status, body) = send(test_app().await, get("/api/game?user_id=1")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["success"], true);
        assert_eq!(body["data"]["tier"], 1);
        assert_eq!(body["data"]["word"]["letters"], 3);
        assert_eq!(body["data"]["stats"].as_array().unwrap().len(), 3);
    }

    #[tokio::test]
    async fn check_answer_accepts_alternate_spelling() {
        let app = test_app().await;
        let (_, card) = send(
            app.clone(),
            post_json(
                "/api/set_difficulty",
                &json!({"user_id": "guest", "level": 2}),
            ),
        )
        .await;
        let word_id = card["data"]["word"]["id"].as_u64().unwrap();

        let (status, body) = send(
            app.clone(),
            post_json(
                "/api/set_difficulty",
                &json!({"user_id": "guest", "level": 3}),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["code"], "EMPTY_CATALOG");

        let (status, body) = send(
            app,
            post_json(
                "/api/check_answer",
                &json!({"user_id": "guest", "word_id": word_id, "answer": "GREY"}),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"]["correct"], true);
    }

    #[tokio::test]
    async fn toggle_hint_reveals_hint_and_keeps_answer() {
        let app = test_app().await;
        send(app.clone(), get("/api/game?user_id=guest")).await;
        let (status, body) = send(
            app,
            post_json(
                "/api/toggle_hint",
                &json!({"user_id": "guest", "answer": "do"}),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"]["show_hint"], true);
        assert_eq!(body["data"]["current_answer"], "do");
        assert!(body["data"]["hint"].is_object());
    }

    #[tokio::test]
    async fn stats_for_named_learner() {
        let (status, body) = send(test_app().await, get("/api/stats?user_id=1&level=1")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"]["total"], 2);
        assert_eq!(body["data"]["not_started"], 2);
    }

    #[tokio::test]
    async fn errors_use_json_envelope() {
        let app = test_app().await;

        let (status, body) = send(app.clone(), get("/api/game?user_id=abc")).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["success"], false);
        assert_eq!(body["code"], "VALIDATION_ERROR");

        let (status, body) = send(app.clone(), get("/api/game?user_id=42")).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["code"], "NOT_FOUND");

        let (status, _) = send(app.clone(), get("/api/stats?user_id=guest&level=1")).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let (status, body) = send(
            app.clone(),
            post_json(
                "/api/set_difficulty",
                &json!({"user_id": "guest", "level": 7}),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["code"], "VALIDATION_ERROR");

        let (status, body) = send(
            app,
            post_json(
                "/api/check_answer",
                &json!({"user_id": "guest", "word_id": 999, "answer": "cat"}),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["success"], false);
    }
}
