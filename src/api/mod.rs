use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{get, post, put},
    Json, Router,
};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tracing::{error, info};

use crate::db::models::{Bet, BetResult, BetStats, NewBet};
use crate::db::Database;
use crate::engine::classifier::recommendation_summary;
use crate::engine::{predict_batch, Predictor};
use crate::models::{Fixture, MatchPrediction};
use crate::source::{StatsProvider, TeamRef};

type ApiError = (StatusCode, String);
type ApiResult<T> = Result<Json<T>, ApiError>;

#[derive(Clone)]
pub struct AppState {
    pub db: Database,
    pub predictor: Arc<Predictor>,
    pub provider: Arc<dyn StatsProvider>,
}

/// Build the Axum router for the prediction API.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/api/health", get(health_handler))
        .route("/api/predict", post(predict_handler))
        .route("/api/predict/batch", post(predict_batch_handler))
        .route("/api/analyze", post(analyze_handler))
        .route("/api/teams/search", get(team_search_handler))
        .route("/api/bets", post(create_bet_handler).get(list_bets_handler))
        .route("/api/bets/:id", get(get_bet_handler))
        .route("/api/bets/:id/result", put(update_bet_result_handler))
        .route("/api/stats", get(stats_handler))
        .layer(CorsLayer::permissive())
        .with_state(Arc::new(state))
}

fn internal(context: &str, err: anyhow::Error) -> ApiError {
    error!("{context}: {err:#}");
    (StatusCode::INTERNAL_SERVER_ERROR, err.to_string())
}

fn unprocessable(err: crate::error::ValidationError) -> ApiError {
    (StatusCode::UNPROCESSABLE_ENTITY, err.to_string())
}

/// GET /api/health
async fn health_handler() -> Json<Value> {
    Json(json!({
        "status": "healthy",
        "timestamp": Utc::now().to_rfc3339(),
    }))
}

/// POST /api/predict  body: {home, away, h2h}
async fn predict_handler(
    State(state): State<Arc<AppState>>,
    Json(body): Json<Value>,
) -> ApiResult<MatchPrediction> {
    let fixture = Fixture::from_value(&body, "").map_err(unprocessable)?;
    Ok(Json(state.predictor.predict_fixture(&fixture)))
}

/// POST /api/predict/batch  body: [{home, away, h2h}, ...]
async fn predict_batch_handler(
    State(state): State<Arc<AppState>>,
    Json(body): Json<Value>,
) -> ApiResult<Vec<MatchPrediction>> {
    let fixtures = Fixture::list_from_value(&body).map_err(unprocessable)?;
    let predictor = Arc::clone(&state.predictor);
    let predictions = tokio::task::spawn_blocking(move || predict_batch(&predictor, &fixtures))
        .await
        .map_err(|e| internal("batch prediction", e.into()))?;
    Ok(Json(predictions))
}

#[derive(Debug, Deserialize)]
pub struct AnalyzeRequest {
    pub home_team: String,
    pub away_team: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct AnalyzeResponse {
    pub home_team: String,
    pub away_team: String,
    pub summary: String,
    pub prediction: MatchPrediction,
}

/// POST /api/analyze  body: {home_team, away_team}
async fn analyze_handler(
    State(state): State<Arc<AppState>>,
    Json(req): Json<AnalyzeRequest>,
) -> ApiResult<AnalyzeResponse> {
    if req.home_team.trim().is_empty() || req.away_team.trim().is_empty() {
        return Err((
            StatusCode::BAD_REQUEST,
            "home_team and away_team are required".into(),
        ));
    }
    let provider = &state.provider;
    info!(
        "Analyzing: {} vs {} via {}",
        req.home_team,
        req.away_team,
        provider.name()
    );
    let home = provider
        .search_team(&req.home_team)
        .await
        .map_err(|e| internal("team search", e))?;
    let away = provider
        .search_team(&req.away_team)
        .await
        .map_err(|e| internal("team search", e))?;
    let (home, away) = match (home, away) {
        (Some(h), Some(a)) => (h, a),
        (None, _) => {
            return Err((
                StatusCode::NOT_FOUND,
                format!("team not found: {}", req.home_team),
            ))
        }
        (_, None) => {
            return Err((
                StatusCode::NOT_FOUND,
                format!("team not found: {}", req.away_team),
            ))
        }
    };

    let home_form = provider
        .team_form(home.id)
        .await
        .map_err(|e| internal("team form", e))?;
    let away_form = provider
        .team_form(away.id)
        .await
        .map_err(|e| internal("team form", e))?;
    let h2h = provider
        .head_to_head(home.id, away.id)
        .await
        .map_err(|e| internal("head to head", e))?;

    let prediction = state.predictor.predict(&home_form, &away_form, &h2h);
    Ok(Json(AnalyzeResponse {
        home_team: home.name,
        away_team: away.name,
        summary: recommendation_summary(&prediction.recommendation),
        prediction,
    }))
}

#[derive(Debug, Deserialize)]
pub struct SearchParams {
    pub q: Option<String>,
}

/// GET /api/teams/search?q=fener
async fn team_search_handler(
    State(state): State<Arc<AppState>>,
    Query(params): Query<SearchParams>,
) -> ApiResult<Vec<TeamRef>> {
    let query = params.q.unwrap_or_default();
    if query.trim().chars().count() < 2 {
        return Ok(Json(Vec::new()));
    }
    let found = state
        .provider
        .search_team(&query)
        .await
        .map_err(|e| internal("team search", e))?;
    Ok(Json(found.into_iter().collect()))
}

/// POST /api/bets
async fn create_bet_handler(
    State(state): State<Arc<AppState>>,
    Json(bet): Json<NewBet>,
) -> ApiResult<Value> {
    let id = state
        .db
        .insert_bet(&bet)
        .map_err(|e| internal("saving bet", e))?;
    info!("Bet saved: id {}", id);
    Ok(Json(json!({ "success": true, "bet_id": id })))
}

#[derive(Debug, Deserialize)]
pub struct Pagination {
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

/// GET /api/bets?limit=50&offset=0
async fn list_bets_handler(
    State(state): State<Arc<AppState>>,
    Query(page): Query<Pagination>,
) -> ApiResult<Vec<Bet>> {
    let limit = page.limit.unwrap_or(50).clamp(1, 500);
    let offset = page.offset.unwrap_or(0).max(0);
    state
        .db
        .list_bets(limit, offset)
        .map(Json)
        .map_err(|e| internal("listing bets", e))
}

/// GET /api/bets/:id
async fn get_bet_handler(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> ApiResult<Bet> {
    match state.db.get_bet(id) {
        Ok(Some(bet)) => Ok(Json(bet)),
        Ok(None) => Err((StatusCode::NOT_FOUND, format!("bet {id} not found"))),
        Err(e) => Err(internal("loading bet", e)),
    }
}

#[derive(Debug, Deserialize)]
pub struct ResultUpdate {
    pub result: BetResult,
    pub notes: Option<String>,
}

/// PUT /api/bets/:id/result  body: {result: "win"|"loss"|"pending", notes}
async fn update_bet_result_handler(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
    Json(update): Json<ResultUpdate>,
) -> ApiResult<Value> {
    let changed = state
        .db
        .update_bet_result(id, update.result, update.notes.as_deref())
        .map_err(|e| internal("updating bet", e))?;
    if !changed {
        return Err((StatusCode::NOT_FOUND, format!("bet {id} not found")));
    }
    info!("Bet {} result updated: {:?}", id, update.result);
    Ok(Json(json!({ "success": true })))
}

/// GET /api/stats
async fn stats_handler(State(state): State<Arc<AppState>>) -> ApiResult<BetStats> {
    state
        .db
        .get_stats()
        .map(Json)
        .map_err(|e| internal("computing stats", e))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::SnapshotProvider;

    fn state() -> Arc<AppState> {
        let snapshot = json!({
            "teams": [
                { "id": 1, "name": "Fenerbahce", "wins": 4, "draws": 1, "losses": 1,
                  "goals_for": 15, "goals_against": 6, "recent_results": ["W", "W", "D", "W", "L"] },
                { "id": 2, "name": "Galatasaray", "wins": 2, "draws": 1, "losses": 2,
                  "goals_for": 8, "goals_against": 10, "recent_results": ["W", "D", "L", "W", "L"] }
            ],
            "head_to_head": [
                { "home_id": 1, "away_id": 2, "home_wins": 3, "away_wins": 1, "draws": 1 }
            ]
        });
        Arc::new(AppState {
            db: Database::in_memory().unwrap(),
            predictor: Arc::new(Predictor::default()),
            provider: Arc::new(SnapshotProvider::from_value(&snapshot).unwrap()),
        })
    }

    fn fixture_body() -> Value {
        json!({
            "home": { "name": "A", "wins": 4, "draws": 1, "losses": 1,
                      "goals_for": 15, "goals_against": 6, "recent_results": ["W"] },
            "away": { "name": "B", "wins": 2, "draws": 1, "losses": 2,
                      "goals_for": 8, "goals_against": 10 },
            "h2h": { "home_wins": 3, "away_wins": 1, "draws": 1 }
        })
    }

    #[tokio::test]
    async fn predict_accepts_the_raw_contract() {
        let Json(p) = predict_handler(State(state()), Json(fixture_body()))
            .await
            .unwrap();
        assert!(p.home_win_prob > p.away_win_prob);
    }

    #[tokio::test]
    async fn predict_rejects_missing_field_with_422() {
        let mut body = fixture_body();
        body["away"].as_object_mut().unwrap().remove("draws");
        let (status, msg) = predict_handler(State(state()), Json(body))
            .await
            .unwrap_err();
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert!(msg.contains("away.draws"));
    }

    #[tokio::test]
    async fn batch_returns_one_prediction_per_fixture() {
        let body = json!([fixture_body(), fixture_body(), fixture_body()]);
        let Json(out) = predict_batch_handler(State(state()), Json(body))
            .await
            .unwrap();
        assert_eq!(out.len(), 3);
    }

    #[tokio::test]
    async fn analyze_by_team_name() {
        let req = AnalyzeRequest {
            home_team: "fener".into(),
            away_team: "Galatasaray".into(),
        };
        let Json(resp) = analyze_handler(State(state()), Json(req)).await.unwrap();
        assert_eq!(resp.home_team, "Fenerbahce");
        assert!(resp.prediction.home_win_prob > resp.prediction.away_win_prob);
        assert!(resp.summary.starts_with("Home win"));
    }

    #[tokio::test]
    async fn analyze_unknown_team_is_404() {
        let req = AnalyzeRequest {
            home_team: "Besiktas".into(),
            away_team: "Galatasaray".into(),
        };
        let (status, _) = analyze_handler(State(state()), Json(req))
            .await
            .unwrap_err();
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn short_search_query_returns_nothing() {
        let params = SearchParams {
            q: Some("f".into()),
        };
        let Json(teams) = team_search_handler(State(state()), Query(params))
            .await
            .unwrap();
        assert!(teams.is_empty());
    }

    #[tokio::test]
    async fn bet_lifecycle() {
        let st = state();
        let Json(p) = predict_handler(State(Arc::clone(&st)), Json(fixture_body()))
            .await
            .unwrap();
        let bet = NewBet {
            home_team: "A".into(),
            away_team: "B".into(),
            prediction: p,
            match_date: "2025-04-01".into(),
        };
        let Json(saved) = create_bet_handler(State(Arc::clone(&st)), Json(bet))
            .await
            .unwrap();
        let id = saved["bet_id"].as_i64().unwrap();

        let update = ResultUpdate {
            result: BetResult::Win,
            notes: None,
        };
        update_bet_result_handler(State(Arc::clone(&st)), Path(id), Json(update))
            .await
            .unwrap();

        let Json(stats) = stats_handler(State(Arc::clone(&st))).await.unwrap();
        assert_eq!(stats.wins, 1);
        assert!((stats.win_rate - 100.0).abs() < 1e-9);

        let (status, _) = get_bet_handler(State(st), Path(id + 1)).await.unwrap_err();
        assert_eq!(status, StatusCode::NOT_FOUND);
    }
}
