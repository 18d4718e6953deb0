use super::{Service, proposal_resource};
use crate::access::{Action, Requester, Resource, can_access};
use crate::error::{Result, ServiceError};
use crate::model::{Application, ApplicationStatus, ProposalApplications};
use tracing::info;

impl Service {
    pub async fn get_all_applications_by_student_id(
        &self,
        requester: &Requester,
    ) -> Result<Vec<Application>> {
        let Requester::Student(student) = requester else {
            return Err(ServiceError::unauthorized(
                "Only students can list their applications",
            ));
        };
        if self.store.load_student(&student.id).await?.is_none() {
            return Err(ServiceError::not_found("Student not found"));
        }
        Ok(self.store.load_applications_by_student(&student.id).await?)
    }

    pub async fn get_all_applications_by_teacher_id(
        &self,
        requester: &Requester,
    ) -> Result<Vec<ProposalApplications>> {
        let Requester::Teacher(teacher) = requester else {
            return Err(ServiceError::unauthorized(
                "Only teachers can review applications",
            ));
        };
        Ok(self
            .store
            .load_applications_by_supervisor(&teacher.id)
            .await?)
    }

    pub async fn get_application_by_id(
        &self,
        requester: &Requester,
        id: i64,
    ) -> Result<Application> {
        let (application, supervisor_id) = self
            .store
            .load_application(id)
            .await?
            .ok_or_else(|| ServiceError::not_found("Application not found"))?;
        let resource = Resource::Application {
            student_id: &application.student_id,
            supervisor_id: &supervisor_id,
        };
        if !can_access(requester, resource, Action::Read) {
            return Err(ServiceError::unauthorized(
                "Access to this application is unauthorized",
            ));
        }
        Ok(application)
    }

    pub async fn insert_new_application(
        &self,
        requester: &Requester,
        proposal_id: &str,
    ) -> Result<Application> {
        let Requester::Student(student) = requester else {
            return Err(ServiceError::unauthorized(
                "Only students can apply to proposals",
            ));
        };
        let today = self.today();
        let proposal = self
            .store
            .load_proposal(proposal_id)
            .await?
            .filter(|p| {
                can_access(requester, proposal_resource(p, today), Action::Read)
            })
            .ok_or_else(|| ServiceError::not_found("Proposal not found!"))?;
        let applications = self.store.load_applications_by_student(&student.id).await?;
        if applications.iter().any(|a| a.status.is_active()) {
            return Err(ServiceError::conflict(
                "You already have an active application",
            ));
        }
        if self
            .store
            .has_accepted_application(&proposal.proposal_id)
            .await?
        {
            return Err(ServiceError::conflict(
                "This proposal has already been assigned",
            ));
        }
        let application = self
            .store
            .insert_application(&proposal.proposal_id, &student.id, today)
            .await?;
        info!(id = application.id, proposal_id, %student, "application filed");
        Ok(application)
    }

    /// Accept or reject a pending application on behalf of the proposal supervisor.
    pub async fn decide_application(
        &self,
        requester: &Requester,
        id: i64,
        status: ApplicationStatus,
    ) -> Result<Application> {
        let (mut application, supervisor_id) = self
            .store
            .load_application(id)
            .await?
            .ok_or_else(|| ServiceError::not_found("Application not found"))?;
        let resource = Resource::Application {
            student_id: &application.student_id,
            supervisor_id: &supervisor_id,
        };
        if !can_access(requester, resource, Action::Write) {
            return Err(ServiceError::forbidden("Not authorized!"));
        }
        let accept = match status {
            ApplicationStatus::Accepted => true,
            ApplicationStatus::Rejected => false,
            other => {
                return Err(ServiceError::validation(format!(
                    "An application cannot be set to {other}"
                )));
            }
        };
        if application.status != ApplicationStatus::Pending {
            return Err(ServiceError::conflict(format!(
                "Application is already {}",
                application.status
            )));
        }
        let decided = if accept {
            self.store.accept_application(&application).await?
        } else {
            self.store.reject_application(id).await?
        };
        if !decided {
            return Err(ServiceError::conflict("Application is no longer pending"));
        }
        application.status = status;
        info!(id, %status, "application decided");
        Ok(application)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::access::tests::{student, teacher};
    use crate::testing::fixture_service;

    #[tokio::test]
    async fn test_student_applications() {
        let service = fixture_service().await;
        let applications = service
            .get_all_applications_by_student_id(&student("S001", "MSC001"))
            .await
            .unwrap();
        assert_eq!(applications.len(), 1);
        assert_eq!(applications[0].proposal_id, "P001");
        assert_eq!(applications[0].status, ApplicationStatus::Pending);
        assert!(matches!(
            service
                .get_all_applications_by_student_id(&student("S999", "MSC001"))
                .await,
            Err(ServiceError::NotFound(_))
        ));
        assert!(matches!(
            service
                .get_all_applications_by_student_id(&teacher("T001"))
                .await,
            Err(ServiceError::Unauthorized(_))
        ));
    }

    #[tokio::test]
    async fn test_teacher_applications_are_grouped() {
        let service = fixture_service().await;
        let grouped = service
            .get_all_applications_by_teacher_id(&teacher("T001"))
            .await
            .unwrap();
        assert_eq!(grouped.len(), 1);
        assert_eq!(grouped[0].proposal_id, "P001");
        assert_eq!(grouped[0].title, "Mobile App Development");
        let students: Vec<_> = grouped[0]
            .applications
            .iter()
            .map(|a| a.student_id.as_str())
            .collect();
        assert_eq!(students, vec!["S001", "S002"]);
        assert_eq!(grouped[0].applications[1].surname, "Johnson");
        let none = service
            .get_all_applications_by_teacher_id(&teacher("T003"))
            .await
            .unwrap();
        assert!(none.is_empty());
    }

    #[tokio::test]
    async fn test_application_visibility() {
        let service = fixture_service().await;
        let owner = student("S001", "MSC001");
        let other = student("S002", "MSC001");
        assert!(service.get_application_by_id(&owner, 1).await.is_ok());
        assert!(service.get_application_by_id(&teacher("T001"), 1).await.is_ok());
        assert!(matches!(
            service.get_application_by_id(&other, 1).await,
            Err(ServiceError::Unauthorized(_))
        ));
        assert!(matches!(
            service.get_application_by_id(&teacher("T002"), 1).await,
            Err(ServiceError::Unauthorized(_))
        ));
        assert!(matches!(
            service.get_application_by_id(&teacher("T001"), 99).await,
            Err(ServiceError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_insert_new_application() {
        let service = fixture_service().await;
        let applicant = student("S004", "MSC002");
        let application = service
            .insert_new_application(&applicant, "P003")
            .await
            .unwrap();
        assert_eq!(application.status, ApplicationStatus::Pending);
        assert_eq!(application.application_date, service.today());
        let stored = service
            .get_application_by_id(&applicant, application.id)
            .await
            .unwrap();
        assert_eq!(stored, application);
        assert!(matches!(
            service.insert_new_application(&applicant, "P003").await,
            Err(ServiceError::Conflict(_))
        ));
    }

    #[tokio::test]
    async fn test_insert_new_application_hidden_proposals() {
        let service = fixture_service().await;
        let applicant = student("S004", "MSC002");
        // Expired, other degree, nonexistent.
        for id in ["P002", "P004", "P404"] {
            assert!(matches!(
                service.insert_new_application(&applicant, id).await,
                Err(ServiceError::NotFound(_))
            ));
        }
        let supervisor = teacher("T001");
        assert!(matches!(
            service.insert_new_application(&supervisor, "P003").await,
            Err(ServiceError::Unauthorized(_))
        ));
    }

    #[tokio::test]
    async fn test_accept_application() {
        let service = fixture_service().await;
        assert!(matches!(
            service
                .decide_application(&teacher("T002"), 1, ApplicationStatus::Accepted)
                .await,
            Err(ServiceError::Forbidden(_))
        ));
        let accepted = service
            .decide_application(&teacher("T001"), 1, ApplicationStatus::Accepted)
            .await
            .unwrap();
        assert_eq!(accepted.status, ApplicationStatus::Accepted);
        let competing = service
            .get_application_by_id(&teacher("T001"), 2)
            .await
            .unwrap();
        assert_eq!(competing.status, ApplicationStatus::Rejected);
        assert!(matches!(
            service
                .decide_application(&teacher("T001"), 1, ApplicationStatus::Rejected)
                .await,
            Err(ServiceError::Conflict(_))
        ));
        assert!(matches!(
            service.delete_proposal(&teacher("T001"), "P001").await,
            Err(ServiceError::Conflict(_))
        ));
    }

    #[tokio::test]
    async fn test_reject_application() {
        let service = fixture_service().await;
        assert!(matches!(
            service
                .decide_application(&teacher("T002"), 3, ApplicationStatus::Canceled)
                .await,
            Err(ServiceError::Validation(_))
        ));
        let rejected = service
            .decide_application(&teacher("T002"), 3, ApplicationStatus::Rejected)
            .await
            .unwrap();
        assert_eq!(rejected.status, ApplicationStatus::Rejected);
        // A rejected student may apply again.
        service
            .insert_new_application(&student("S003", "BSC001"), "P015")
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_invalid_status_is_checked_before_pending() {
        let service = fixture_service().await;
        service
            .decide_application(&teacher("T002"), 3, ApplicationStatus::Rejected)
            .await
            .unwrap();
        assert!(matches!(
            service
                .decide_application(&teacher("T002"), 3, ApplicationStatus::Canceled)
                .await,
            Err(ServiceError::Validation(_))
        ));
        assert!(matches!(
            service
                .decide_application(&teacher("T002"), 3, ApplicationStatus::Accepted)
                .await,
            Err(ServiceError::Conflict(_))
        ));
    }

    #[tokio::test]
    async fn test_assigned_proposal_takes_no_more_applications() {
        let service = fixture_service().await;
        service
            .decide_application(&teacher("T001"), 1, ApplicationStatus::Accepted)
            .await
            .unwrap();
        // S002 was rejected by the acceptance and has no active application left.
        let result = service
            .insert_new_application(&student("S002", "MSC001"), "P001")
            .await;
        match result {
            Err(ServiceError::Conflict(message)) => {
                assert_eq!(message, "This proposal has already been assigned");
            }
            other => panic!("unexpected result {other:?}"),
        }
    }
}
