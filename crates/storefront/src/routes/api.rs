//! JSON endpoints used by page scripts.

use axum::{
    Json,
    extract::{Path, State},
};
use tracing::instrument;

use essence_arabe_core::checkout::{CepLookup, lookup_cep};

use crate::error::{AppError, Result};
use crate::state::AppState;

/// Resolve a CEP to an address for the delivery step.
///
/// # Errors
///
/// Returns 404 when the CEP is not eight digits.
#[instrument(skip(state))]
pub async fn cep(State(state): State<AppState>, Path(cep): Path<String>) -> Result<Json<CepLookup>> {
    state.latency().simulate().await;
    lookup_cep(&cep)
        .map(Json)
        .ok_or_else(|| AppError::NotFound(format!("CEP {cep}")))
}
