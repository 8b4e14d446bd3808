use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use tracing::{error, instrument};

use crate::state::AppState;
use crate::users::dto::{
    BulkUserEntry, CreateUserRequest, FindUsersQuery, Reply, UpdateUserRequest,
};

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/users/getAllUsers", get(get_all_users))
        .route("/users/create", post(create_user))
        .route("/users/findUsers", post(find_users))
        .route("/users/bulkCreate", post(bulk_create_users))
        .route(
            "/users/:id",
            get(get_user_by_id).put(update_user).delete(delete_user),
        )
}

impl IntoResponse for Reply {
    fn into_response(self) -> Response {
        let status =
            StatusCode::from_u16(self.code).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        (status, Json(self.message)).into_response()
    }
}

#[instrument(skip(state, body))]
pub async fn create_user(
    State(state): State<AppState>,
    Json(body): Json<CreateUserRequest>,
) -> Result<Reply, (StatusCode, String)> {
    state.users.create_user(body).await.map_err(internal)
}

#[instrument(skip(state))]
pub async fn get_user_by_id(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Reply, (StatusCode, String)> {
    state.users.get_user_by_id(id).await.map_err(internal)
}

#[instrument(skip(state, body))]
pub async fn update_user(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(body): Json<UpdateUserRequest>,
) -> Result<Reply, (StatusCode, String)> {
    state.users.update_user(id, body).await.map_err(internal)
}

#[instrument(skip(state))]
pub async fn delete_user(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Reply, (StatusCode, String)> {
    state.users.delete_user(id).await.map_err(internal)
}

#[instrument(skip(state))]
pub async fn get_all_users(
    State(state): State<AppState>,
) -> Result<Reply, (StatusCode, String)> {
    state.users.get_all_users().await.map_err(internal)
}

#[instrument(skip(state))]
pub async fn find_users(
    State(state): State<AppState>,
    Query(query): Query<FindUsersQuery>,
) -> Result<Reply, (StatusCode, String)> {
    state.users.find_users(query).await.map_err(internal)
}

#[instrument(skip(state, body))]
pub async fn bulk_create_users(
    State(state): State<AppState>,
    Json(body): Json<Vec<BulkUserEntry>>,
) -> Reply {
    state.users.bulk_create_users(body).await
}

fn internal(e: anyhow::Error) -> (StatusCode, String) {
    error!(error = %e, "request failed");
    (StatusCode::INTERNAL_SERVER_ERROR, e.to_string())
}
