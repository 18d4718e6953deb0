use crate::AppState;
use crate::access::Requester;
use crate::error::{Result, ServiceError};
use crate::store::Store;
use axum::extract::{Request, State};
use axum::http::HeaderMap;
use axum::middleware::Next;
use axum::response::Response;
use tracing::debug;

/// Header set by the authenticating gateway in front of the service.
pub const IDENTITY_HEADER: &str = "x-remote-user-identity";

/// Resolve the identity header to a known student or teacher.
pub async fn authenticate(store: &Store, headers: &HeaderMap) -> Result<Requester> {
    let identity = headers
        .get(IDENTITY_HEADER)
        .ok_or_else(|| ServiceError::unauthorized("Not authenticated"))?
        .to_str()
        .map_err(|_| ServiceError::validation("Malformed identity header"))?
        .trim();
    if let Some(student) = store.load_student(identity).await? {
        return Ok(Requester::Student(student));
    }
    if let Some(teacher) = store.load_teacher(identity).await? {
        return Ok(Requester::Teacher(teacher));
    }
    Err(ServiceError::unauthorized("Not authenticated"))
}

pub async fn authentication_middleware(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<Response> {
    let requester = authenticate(state.service.store(), req.headers()).await?;
    debug!(%requester, method = %req.method(), uri = %req.uri(), "authenticated request");
    req.extensions_mut().insert(requester);
    Ok(next.run(req).await)
}
