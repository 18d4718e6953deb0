use super::{DegreeList, TeacherList};
use crate::AppState;
use crate::error::Result;
use axum::Json;
use axum::extract::State;

pub(super) async fn teachers(State(state): State<AppState>) -> Result<Json<TeacherList>> {
    let teachers = state.service.get_all_teachers().await?;
    Ok(Json(TeacherList { teachers }))
}

pub(super) async fn degrees(State(state): State<AppState>) -> Result<Json<DegreeList>> {
    let degrees = state.service.get_all_degrees().await?;
    Ok(Json(DegreeList { degrees }))
}
