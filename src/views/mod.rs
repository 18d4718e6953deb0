//! HTTP surface: routing, CORS and the JSON envelopes exchanged with the frontend.

mod applications;
mod directory;
mod proposals;

use crate::AppState;
use crate::auth::{IDENTITY_HEADER, authentication_middleware};
use crate::config::ServerConfig;
use crate::model::{Application, Degree, Proposal, ProposalApplications, Teacher};
use axum::Router;
use axum::http::header::CONTENT_TYPE;
use axum::http::{HeaderName, HeaderValue, Method};
use axum::middleware;
use axum::routing::{get, post};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tower_http::cors::{AllowOrigin, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::warn;

#[derive(Debug, Serialize, Deserialize)]
pub struct ProposalList {
    pub proposals: Vec<Proposal>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ProposalEnvelope {
    pub proposal: Proposal,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ApplicationList {
    pub applications: Vec<Application>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ApplicationEnvelope {
    pub application: Application,
}

/// Proposals of a teacher together with the applications they received.
#[derive(Debug, Serialize, Deserialize)]
pub struct ReviewList {
    pub proposals: Vec<ProposalApplications>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct TeacherList {
    pub teachers: Vec<Teacher>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct DegreeList {
    pub degrees: Vec<Degree>,
}

pub fn router(state: AppState, config: &ServerConfig) -> Router {
    let api = Router::new()
        .route("/proposals", get(proposals::list).post(proposals::create))
        .route("/proposals/professor", get(proposals::list_professor))
        .route(
            "/proposals/{proposal_id}",
            get(proposals::get).delete(proposals::delete),
        )
        .route("/proposals/{proposal_id}/update", post(proposals::update))
        .route("/applications/student", get(applications::list_student))
        .route("/applications/teacher", get(applications::list_teacher))
        .route("/applications/{proposal_id}", post(applications::apply))
        .route(
            "/applications/detail/{application_id}",
            get(applications::get).patch(applications::decide),
        )
        .route("/teachers", get(directory::teachers))
        .route("/degrees", get(directory::degrees))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            authentication_middleware,
        ));

    Router::new()
        .route("/health", get(health))
        .merge(api)
        .layer(TraceLayer::new_for_http())
        .layer(cors(&config.allowed_origins))
        .with_state(state)
}

async fn health() -> &'static str {
    "ok"
}

fn cors(allowed_origins: &[String]) -> CorsLayer {
    let layer = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::PATCH, Method::DELETE])
        .allow_headers([CONTENT_TYPE, HeaderName::from_static(IDENTITY_HEADER)])
        .max_age(Duration::from_secs(60 * 60));
    let origins: Vec<HeaderValue> = allowed_origins
        .iter()
        .filter_map(|origin| match origin.parse() {
            Ok(value) => Some(value),
            Err(_) => {
                warn!(%origin, "ignoring invalid CORS origin");
                None
            }
        })
        .collect();
    if origins.is_empty() {
        layer.allow_origin(AllowOrigin::any())
    } else {
        layer
            .allow_origin(AllowOrigin::list(origins))
            .allow_credentials(true)
    }
}
