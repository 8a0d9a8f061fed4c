use crate::errors::AppError;
use crate::loyalty::{self, CATALOG, GenerationOptions};
use crate::models::{ClientProfile, LoyaltySummary, Reward, StatsQuery, StatsResponse};
use crate::state::AppState;
use crate::stats::{build_stats, loyalty_summary};
use axum::{
    Json,
    extract::{Query, State, rejection::QueryRejection},
    http::header,
    response::IntoResponse,
};
use std::io::ErrorKind;
use tokio::fs;
use tracing::{error, info};

/// The purchases export, byte for byte.
pub async fn get_data(State(state): State<AppState>) -> Result<impl IntoResponse, AppError> {
    let bytes = fs::read(&state.purchases_path).await.map_err(|err| {
        error!(path = %state.purchases_path.display(), "failed to read purchases file: {err}");
        AppError::internal("Error reading data file")
    })?;
    Ok(json_bytes(bytes))
}

/// The loyalty ledger, byte for byte. Generated first if it does not exist.
pub async fn get_loyalty(State(state): State<AppState>) -> Result<impl IntoResponse, AppError> {
    Ok(json_bytes(loyalty_bytes(&state).await?))
}

pub async fn get_loyalty_summary(
    State(state): State<AppState>,
) -> Result<Json<LoyaltySummary>, AppError> {
    let bytes = loyalty_bytes(&state).await?;
    let profiles: Vec<ClientProfile> = serde_json::from_slice(&bytes).map_err(|err| {
        error!("failed to parse loyalty file: {err}");
        AppError::internal("Error parsing loyalty data")
    })?;
    Ok(Json(loyalty_summary(&profiles)))
}

pub async fn get_rewards() -> Json<&'static [Reward]> {
    let catalog: &'static [Reward] = &CATALOG;
    Json(catalog)
}

pub async fn get_stats(
    State(state): State<AppState>,
    query: Result<Query<StatsQuery>, QueryRejection>,
) -> Result<Json<StatsResponse>, AppError> {
    let Query(query) = query.map_err(|rejection| {
        info!("rejected stats query: {rejection}");
        AppError::bad_request(rejection.body_text())
    })?;
    if let (Some(start), Some(end)) = (query.start, query.end) {
        if start > end {
            return Err(AppError::bad_request("start must not be after end"));
        }
    }
    Ok(Json(build_stats(&state.purchases, &query)))
}

async fn loyalty_bytes(state: &AppState) -> Result<Vec<u8>, AppError> {
    match fs::read(&state.loyalty_path).await {
        Ok(bytes) => return Ok(bytes),
        Err(err) if err.kind() == ErrorKind::NotFound => {}
        Err(err) => {
            error!(path = %state.loyalty_path.display(), "failed to read loyalty file: {err}");
            return Err(AppError::internal("Error reading loyalty data file"));
        }
    }

    let _guard = state.generation.lock().await;
    // Another request may have generated the file while we waited.
    if let Ok(bytes) = fs::read(&state.loyalty_path).await {
        return Ok(bytes);
    }

    info!("loyalty file missing, generating");
    let options = GenerationOptions {
        input: state.purchases_path.clone(),
        output: state.loyalty_path.clone(),
        seed: state.loyalty_seed,
    };
    let generated = loyalty::run_generation(&options).await.map_err(|err| {
        error!("failed to generate loyalty data: {err}");
        AppError::internal("Error generating loyalty data")
    })?;
    Ok(generated.payload)
}

fn json_bytes(bytes: Vec<u8>) -> impl IntoResponse {
    ([(header::CONTENT_TYPE, "application/json")], bytes)
}
