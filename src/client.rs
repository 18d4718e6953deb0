//! Typed HTTP client for the thesis manager API.

use crate::auth::IDENTITY_HEADER;
use crate::model::{
    Application, ApplicationStatus, Decision, Degree, Proposal, ProposalApplications,
    ProposalDetails, ProposalForm, Teacher,
};
use crate::service::ProposalFilters;
use crate::views::{
    ApplicationEnvelope, ApplicationList, DegreeList, ProposalEnvelope, ProposalList, ReviewList,
    TeacherList,
};
use reqwest::{Method, RequestBuilder, Response, StatusCode};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use thiserror::Error;
use tracing::trace;

#[derive(Debug, Error)]
pub enum ClientError {
    /// The server answered with an error status.
    #[error("{status}: {message}")]
    Api { status: StatusCode, message: String },

    #[error(transparent)]
    Http(#[from] reqwest::Error),
}

impl ClientError {
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            ClientError::Api { status, .. } => Some(*status),
            ClientError::Http(e) => e.status(),
        }
    }
}

#[derive(Deserialize)]
struct ErrorBody {
    error: String,
}

#[derive(Debug, Clone)]
pub struct ApiClient {
    inner: reqwest::Client,
    base_url: String,
    identity: Option<String>,
}

impl ApiClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            inner: reqwest::Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_owned(),
            identity: None,
        }
    }

    /// Act as the given student or teacher.
    pub fn with_identity(mut self, identity: impl Into<String>) -> Self {
        self.identity = Some(identity.into());
        self
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        trace!(%method, path, "api request");
        let builder = self
            .inner
            .request(method, format!("{}{path}", self.base_url));
        match &self.identity {
            Some(identity) => builder.header(IDENTITY_HEADER, identity),
            None => builder,
        }
    }

    async fn check(response: Response) -> Result<Response, ClientError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let text = response.text().await?;
        let message = serde_json::from_str::<ErrorBody>(&text)
            .map(|body| body.error)
            .unwrap_or(text);
        Err(ClientError::Api { status, message })
    }

    async fn fetch<T: DeserializeOwned>(builder: RequestBuilder) -> Result<T, ClientError> {
        let response = Self::check(builder.send().await?).await?;
        Ok(response.json().await?)
    }

    pub async fn health(&self) -> Result<String, ClientError> {
        let response = Self::check(self.request(Method::GET, "/health").send().await?).await?;
        Ok(response.text().await?)
    }

    pub async fn get_all_proposals(
        &self,
        filters: &ProposalFilters,
    ) -> Result<Vec<Proposal>, ClientError> {
        let list: ProposalList =
            Self::fetch(self.request(Method::GET, "/proposals").query(filters)).await?;
        Ok(list.proposals)
    }

    pub async fn get_all_professor_proposals(&self) -> Result<Vec<Proposal>, ClientError> {
        let list: ProposalList =
            Self::fetch(self.request(Method::GET, "/proposals/professor")).await?;
        Ok(list.proposals)
    }

    pub async fn get_proposal_by_id(
        &self,
        proposal_id: &str,
    ) -> Result<ProposalDetails, ClientError> {
        let path = format!("/proposals/{proposal_id}");
        Self::fetch(self.request(Method::GET, &path)).await
    }

    pub async fn insert_new_proposal(&self, form: &ProposalForm) -> Result<Proposal, ClientError> {
        let envelope: ProposalEnvelope =
            Self::fetch(self.request(Method::POST, "/proposals").json(form)).await?;
        Ok(envelope.proposal)
    }

    pub async fn update_proposal(
        &self,
        proposal_id: &str,
        form: &ProposalForm,
    ) -> Result<Proposal, ClientError> {
        let path = format!("/proposals/{proposal_id}/update");
        let envelope: ProposalEnvelope =
            Self::fetch(self.request(Method::POST, &path).json(form)).await?;
        Ok(envelope.proposal)
    }

    pub async fn delete_proposal(&self, proposal_id: &str) -> Result<(), ClientError> {
        let path = format!("/proposals/{proposal_id}");
        Self::check(self.request(Method::DELETE, &path).send().await?).await?;
        Ok(())
    }

    pub async fn get_student_applications(&self) -> Result<Vec<Application>, ClientError> {
        let list: ApplicationList =
            Self::fetch(self.request(Method::GET, "/applications/student")).await?;
        Ok(list.applications)
    }

    pub async fn get_teacher_applications(
        &self,
    ) -> Result<Vec<ProposalApplications>, ClientError> {
        let list: ReviewList =
            Self::fetch(self.request(Method::GET, "/applications/teacher")).await?;
        Ok(list.proposals)
    }

    pub async fn apply(&self, proposal_id: &str) -> Result<Application, ClientError> {
        let path = format!("/applications/{proposal_id}");
        let envelope: ApplicationEnvelope = Self::fetch(self.request(Method::POST, &path)).await?;
        Ok(envelope.application)
    }

    pub async fn get_application(&self, id: i64) -> Result<Application, ClientError> {
        let path = format!("/applications/detail/{id}");
        let envelope: ApplicationEnvelope = Self::fetch(self.request(Method::GET, &path)).await?;
        Ok(envelope.application)
    }

    pub async fn decide_application(
        &self,
        id: i64,
        status: ApplicationStatus,
    ) -> Result<Application, ClientError> {
        let path = format!("/applications/detail/{id}");
        let body = Decision { status };
        let request = self.request(Method::PATCH, &path).json(&body);
        let envelope: ApplicationEnvelope = Self::fetch(request).await?;
        Ok(envelope.application)
    }

    pub async fn get_all_teachers(&self) -> Result<Vec<Teacher>, ClientError> {
        let list: TeacherList = Self::fetch(self.request(Method::GET, "/teachers")).await?;
        Ok(list.teachers)
    }

    pub async fn get_all_degrees(&self) -> Result<Vec<Degree>, ClientError> {
        let list: DegreeList = Self::fetch(self.request(Method::GET, "/degrees")).await?;
        Ok(list.degrees)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::AppState;
    use crate::config::ServerConfig;
    use crate::testing::{fixture_service, form};
    use crate::views::router;
    use tokio::net::TcpListener;

    async fn spawn_server() -> String {
        let app = router(
            AppState::new(fixture_service().await),
            &ServerConfig::default(),
        );
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let address = listener.local_addr().unwrap();
        tokio::spawn(async move { axum::serve(listener, app).await.unwrap() });
        format!("http://{address}/")
    }

    #[tokio::test]
    async fn test_student_flow() {
        let base_url = spawn_server().await;
        assert_eq!(ApiClient::new(&base_url).health().await.unwrap(), "ok");

        let student = ApiClient::new(&base_url).with_identity("S004");
        let proposals = student
            .get_all_proposals(&ProposalFilters {
                search: Some("quantum".into()),
                ..ProposalFilters::default()
            })
            .await
            .unwrap();
        assert_eq!(proposals.len(), 1);
        assert_eq!(proposals[0].proposal_id, "P003");

        let details = student.get_proposal_by_id("P003").await.unwrap();
        assert_eq!(details.supervisor_surname, "Bianchi");

        let application = student.apply("P003").await.unwrap();
        assert_eq!(application.status, ApplicationStatus::Pending);
        let mine = student.get_student_applications().await.unwrap();
        assert_eq!(mine, vec![application.clone()]);

        let supervisor = ApiClient::new(&base_url).with_identity("T002");
        let decided = supervisor
            .decide_application(application.id, ApplicationStatus::Rejected)
            .await
            .unwrap();
        assert_eq!(decided.status, ApplicationStatus::Rejected);
        let seen = student.get_application(application.id).await.unwrap();
        assert_eq!(seen.status, ApplicationStatus::Rejected);
    }

    #[tokio::test]
    async fn test_teacher_flow() {
        let base_url = spawn_server().await;
        let teacher = ApiClient::new(&base_url).with_identity("T001");
        assert_eq!(teacher.get_all_teachers().await.unwrap().len(), 2);
        assert_eq!(teacher.get_all_degrees().await.unwrap().len(), 4);

        let created = teacher.insert_new_proposal(&form()).await.unwrap();
        assert_eq!(created.proposal_id, "P016");
        let mut edited = form();
        edited.keywords.push("benchmarks".into());
        edited.notes = Some("Two students at most".into());
        let updated = teacher.update_proposal("P016", &edited).await.unwrap();
        assert_eq!(updated.notes.as_deref(), Some("Two students at most"));
        assert_eq!(updated.keywords.len(), 3);

        let own = teacher.get_all_professor_proposals().await.unwrap();
        assert!(own.iter().any(|p| p.proposal_id == "P016"));
        let reviews = teacher.get_teacher_applications().await.unwrap();
        assert_eq!(reviews.len(), 1);

        teacher.delete_proposal("P016").await.unwrap();
        let error = teacher.get_proposal_by_id("P016").await.unwrap_err();
        assert_eq!(error.status(), Some(StatusCode::NOT_FOUND));
    }

    #[tokio::test]
    async fn test_api_errors() {
        let base_url = spawn_server().await;
        let anonymous = ApiClient::new(&base_url);
        match anonymous.get_all_teachers().await.unwrap_err() {
            ClientError::Api { status, message } => {
                assert_eq!(status, StatusCode::UNAUTHORIZED);
                assert_eq!(message, "Not authenticated");
            }
            other => panic!("unexpected error {other:?}"),
        }
        let student = ApiClient::new(&base_url).with_identity("S001");
        let error = student.insert_new_proposal(&form()).await.unwrap_err();
        assert_eq!(error.status(), Some(StatusCode::UNAUTHORIZED));
        let error = student.delete_proposal("P001").await.unwrap_err();
        assert_eq!(error.status(), Some(StatusCode::FORBIDDEN));
    }
}
