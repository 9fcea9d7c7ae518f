use crate::prelude::*;

use godot_delivery_core::prelude::*;

use axum::{
    Json,
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use bytes::Bytes;
use serde::{Deserialize, Serialize};
use tracing::{error, info};

pub struct ApiError(anyhow::Error);

impl<E> From<E> for ApiError
where
    E: Into<anyhow::Error>,
{
    fn from(err: E) -> Self {
        Self(err.into())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        if let Some(err) = self.0.downcast_ref::<RequestError>() {
            return match err {
                RequestError::InvalidRequest(_) => (StatusCode::BAD_REQUEST, err.to_string()),
                RequestError::NotFound(_) => (StatusCode::NOT_FOUND, err.to_string()),
            }
            .into_response();
        }

        if let Some(err) = self.0.downcast_ref::<AuthError>() {
            return (StatusCode::FORBIDDEN, err.to_string()).into_response();
        }

        if let Some(err) = self.0.downcast_ref::<BuildError>() {
            return if err.is_retryable() {
                error!("Build unavailable: {err}");
                (StatusCode::SERVICE_UNAVAILABLE, err.to_string())
            } else {
                error!("Build failed: {err}");
                (StatusCode::INTERNAL_SERVER_ERROR, err.to_string())
            }
            .into_response();
        }

        error!("Internal Server Error: {:?}", self.0);
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            "Internal Server Error".to_string(),
        )
            .into_response()
    }
}

#[derive(Debug, Deserialize)]
pub struct AddRepositoryRequest {
    #[serde(default)]
    pub repository: String,
}

/// POST /godot-delivery/add-repository
///
/// Builds the repository synchronously and replaces the game's packages in the cache.
pub async fn add_repository(
    State(state): State<AppState>,
    _: ManagerAuth,
    body: Bytes,
) -> Result<impl IntoResponse, ApiError> {
    let req: AddRepositoryRequest = serde_json::from_slice(&body)
        .map_err(|e| RequestError::InvalidRequest(format!("Malformed body: {e}")))?;

    let repository = req.repository.trim();
    if repository.is_empty() {
        return Err(RequestError::InvalidRequest("Missing repository url".into()).into());
    }

    match state.queue.submit(repository.to_string()).await? {
        BuildOutput::Skipped(SkipReason::MissingGameName) => {
            info!(%repository, "empty game name, aborting");
            Err(RequestError::InvalidRequest("Project declares no game name".into()).into())
        }
        BuildOutput::Skipped(reason) => {
            info!(%repository, ?reason, "no exports found to add to metadata list");
            Ok(StatusCode::NO_CONTENT)
        }
        BuildOutput::Packages(packages) => {
            info!(%repository, packages = packages.len(), "repository added");
            Ok(StatusCode::NO_CONTENT)
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct NextGameParams {
    platform: Option<String>,
    /// Name of the game the client received last.
    gamename: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NextGameResponse {
    pub download_url: String,
    pub game_name: String,
    pub main_scene: String,
}

/// GET /godot-delivery/next-game?platform=<label>&gamename=<last>
pub async fn next_game(
    State(state): State<AppState>,
    Query(params): Query<NextGameParams>,
) -> Result<impl IntoResponse, ApiError> {
    let label = params
        .platform
        .ok_or_else(|| RequestError::InvalidRequest("Missing platform".into()))?;

    let platform = Platform::from_label(&label);
    if !state.config.platforms.contains(&platform) {
        return Err(RequestError::InvalidRequest(format!("Unknown platform '{label}'")).into());
    }

    let last_game = params.gamename.as_deref().filter(|name| !name.is_empty());
    let next = state
        .cache
        .next_package(&platform, last_game)
        .await
        .ok_or_else(|| RequestError::NotFound(format!("No packages for platform '{platform}'")))?;

    let res = Json(NextGameResponse {
        download_url: state.config.download_url(&next.filename),
        game_name: next.gamename,
        main_scene: next.main_scene,
    });

    Ok(res)
}
