use axum::{
    extract::{
        rejection::{JsonRejection, PathRejection},
        Path, State,
    },
    http::StatusCode,
    routing::get,
    Json, Router,
};
use tracing::{info, instrument, warn};

use crate::{
    error::{ApiError, ApiResult},
    state::AppState,
    users::{
        dto::{CreateUserRequest, DataResponse, MessageResponse, UserList},
        repo_types::User,
        services::parse_user_id,
    },
};

pub fn user_routes() -> Router<AppState> {
    Router::new()
        .route("/users", get(list_users).post(create_user))
        .route("/users/ping", get(ping))
        .route("/users/:id", get(get_user))
}

pub async fn ping() -> Json<MessageResponse> {
    Json(MessageResponse::success("pong!"))
}

#[instrument(skip(state, payload))]
pub async fn create_user(
    State(state): State<AppState>,
    payload: Result<Json<CreateUserRequest>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<MessageResponse>)> {
    let Json(request) = payload.map_err(|e| {
        warn!(error = %e, "rejected create user body");
        ApiError::InvalidPayload
    })?;

    let new_user = request.validate().map_err(|e| {
        warn!(error = %e, "invalid create user payload");
        ApiError::from(e)
    })?;

    let user = state.users.create(new_user).await.map_err(|e| {
        warn!(error = %e, "create user failed");
        ApiError::from(e)
    })?;

    info!(user_id = user.id, email = %user.email, "user created");
    Ok((
        StatusCode::CREATED,
        Json(MessageResponse::success(format!("{} was added!", user.email))),
    ))
}

#[instrument(skip(state, path))]
pub async fn get_user(
    State(state): State<AppState>,
    path: Result<Path<String>, PathRejection>,
) -> ApiResult<Json<DataResponse<User>>> {
    // An undecodable segment cannot name a user either.
    let Path(raw_id) = path.map_err(|e| {
        warn!(error = %e, "rejected user id segment");
        ApiError::UserNotFound
    })?;
    let id = parse_user_id(&raw_id)?;
    let user = state.users.get_by_id(id).await?;
    Ok(Json(DataResponse::success(user)))
}

#[instrument(skip(state))]
pub async fn list_users(State(state): State<AppState>) -> ApiResult<Json<DataResponse<UserList>>> {
    let users = state.users.list_all().await?;
    Ok(Json(DataResponse::success(UserList { users })))
}
