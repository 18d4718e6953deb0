use super::{ProposalEnvelope, ProposalList};
use crate::AppState;
use crate::access::Requester;
use crate::error::Result;
use crate::model::{ProposalDetails, ProposalForm};
use crate::service::ProposalFilters;
use axum::Json;
use axum::extract::rejection::{JsonRejection, PathRejection, QueryRejection};
use axum::extract::{Extension, Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;

pub(super) async fn list(
    State(state): State<AppState>,
    Extension(requester): Extension<Requester>,
    query: std::result::Result<Query<ProposalFilters>, QueryRejection>,
) -> Result<Json<ProposalList>> {
    let Query(filters) = query?;
    let proposals = state.service.get_all_proposals(&requester, &filters).await?;
    Ok(Json(ProposalList { proposals }))
}

pub(super) async fn list_professor(
    State(state): State<AppState>,
    Extension(requester): Extension<Requester>,
) -> Result<Json<ProposalList>> {
    let proposals = state.service.get_all_professor_proposals(&requester).await?;
    Ok(Json(ProposalList { proposals }))
}

pub(super) async fn get(
    State(state): State<AppState>,
    Extension(requester): Extension<Requester>,
    path: std::result::Result<Path<String>, PathRejection>,
) -> Result<Json<ProposalDetails>> {
    let Path(proposal_id) = path?;
    let details = state
        .service
        .get_proposal_by_id(&requester, &proposal_id)
        .await?;
    Ok(Json(details))
}

pub(super) async fn create(
    State(state): State<AppState>,
    Extension(requester): Extension<Requester>,
    payload: std::result::Result<Json<ProposalForm>, JsonRejection>,
) -> Result<impl IntoResponse> {
    let Json(form) = payload?;
    let proposal = state.service.insert_proposal(&requester, form).await?;
    Ok((StatusCode::CREATED, Json(ProposalEnvelope { proposal })))
}

pub(super) async fn update(
    State(state): State<AppState>,
    Extension(requester): Extension<Requester>,
    path: std::result::Result<Path<String>, PathRejection>,
    payload: std::result::Result<Json<ProposalForm>, JsonRejection>,
) -> Result<Json<ProposalEnvelope>> {
    let Path(proposal_id) = path?;
    let Json(form) = payload?;
    let proposal = state
        .service
        .update_proposal(&requester, &proposal_id, form)
        .await?;
    Ok(Json(ProposalEnvelope { proposal }))
}

pub(super) async fn delete(
    State(state): State<AppState>,
    Extension(requester): Extension<Requester>,
    path: std::result::Result<Path<String>, PathRejection>,
) -> Result<StatusCode> {
    let Path(proposal_id) = path?;
    state
        .service
        .delete_proposal(&requester, &proposal_id)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}
