use super::{ApplicationEnvelope, ApplicationList, ReviewList};
use crate::AppState;
use crate::access::Requester;
use crate::error::Result;
use crate::model::Decision;
use axum::Json;
use axum::extract::rejection::{JsonRejection, PathRejection};
use axum::extract::{Extension, Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;

pub(super) async fn list_student(
    State(state): State<AppState>,
    Extension(requester): Extension<Requester>,
) -> Result<Json<ApplicationList>> {
    let applications = state
        .service
        .get_all_applications_by_student_id(&requester)
        .await?;
    Ok(Json(ApplicationList { applications }))
}

pub(super) async fn list_teacher(
    State(state): State<AppState>,
    Extension(requester): Extension<Requester>,
) -> Result<Json<ReviewList>> {
    let proposals = state
        .service
        .get_all_applications_by_teacher_id(&requester)
        .await?;
    Ok(Json(ReviewList { proposals }))
}

pub(super) async fn apply(
    State(state): State<AppState>,
    Extension(requester): Extension<Requester>,
    path: std::result::Result<Path<String>, PathRejection>,
) -> Result<impl IntoResponse> {
    let Path(proposal_id) = path?;
    let application = state
        .service
        .insert_new_application(&requester, &proposal_id)
        .await?;
    let envelope = ApplicationEnvelope { application };
    Ok((StatusCode::CREATED, Json(envelope)))
}

pub(super) async fn get(
    State(state): State<AppState>,
    Extension(requester): Extension<Requester>,
    path: std::result::Result<Path<i64>, PathRejection>,
) -> Result<Json<ApplicationEnvelope>> {
    let Path(application_id) = path?;
    let application = state
        .service
        .get_application_by_id(&requester, application_id)
        .await?;
    Ok(Json(ApplicationEnvelope { application }))
}

pub(super) async fn decide(
    State(state): State<AppState>,
    Extension(requester): Extension<Requester>,
    path: std::result::Result<Path<i64>, PathRejection>,
    payload: std::result::Result<Json<Decision>, JsonRejection>,
) -> Result<Json<ApplicationEnvelope>> {
    let Path(application_id) = path?;
    let Json(decision) = payload?;
    let application = state
        .service
        .decide_application(&requester, application_id, decision.status)
        .await?;
    Ok(Json(ApplicationEnvelope { application }))
}
