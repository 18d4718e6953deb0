use super::{Service, proposal_resource};
use crate::access::{Action, Requester, can_access};
use crate::error::{Result, ServiceError};
use crate::model::{Level, Proposal, ProposalDetails, ProposalForm, Teacher, next_proposal_id};
use eyre::OptionExt;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

const PROPOSAL_NOT_FOUND: &str = "Proposal not found!";
const UNAUTHORIZED_PROPOSAL: &str = "Access to this thesis proposal is unauthorized. \
     Please ensure you have the necessary permissions to view this content.";

/// Optional narrowing of the proposal lists.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct ProposalFilters {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub search: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub level: Option<Level>,
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
}

impl ProposalFilters {
    fn accepts(&self, proposal: &Proposal) -> bool {
        self.search
            .as_deref()
            .is_none_or(|s| s.trim().is_empty() || proposal.matches(s.trim()))
            && self.level.is_none_or(|l| proposal.level == l)
            && self
                .kind
                .as_deref()
                .is_none_or(|k| proposal.kind.eq_ignore_ascii_case(k))
    }
}

fn require_teacher(requester: &Requester) -> Result<&Teacher> {
    match requester {
        Requester::Teacher(teacher) => Ok(teacher),
        Requester::Student(_) => Err(ServiceError::unauthorized(
            "Only teachers can perform this operation",
        )),
    }
}

impl Service {
    /// Students get the open proposals of their degree, teachers their own open proposals.
    pub async fn get_all_proposals(
        &self,
        requester: &Requester,
        filters: &ProposalFilters,
    ) -> Result<Vec<Proposal>> {
        let today = self.today();
        let proposals = match requester {
            Requester::Student(_) => self
                .store
                .load_active_proposals(today)
                .await?
                .into_iter()
                .filter(|p| {
                    can_access(requester, proposal_resource(p, today), Action::Read)
                })
                .collect(),
            Requester::Teacher(teacher) => {
                self.store
                    .load_proposals_by_supervisor(&teacher.id, today)
                    .await?
            }
        };
        let proposals: Vec<_> = proposals
            .into_iter()
            .filter(|p| filters.accepts(p))
            .collect();
        debug!(%requester, count = proposals.len(), "listed proposals");
        Ok(proposals)
    }

    pub async fn get_all_professor_proposals(
        &self,
        requester: &Requester,
    ) -> Result<Vec<Proposal>> {
        let teacher = require_teacher(requester)?;
        Ok(self
            .store
            .load_proposals_by_supervisor(&teacher.id, self.today())
            .await?)
    }

    /// A non-owning teacher is refused; students do not learn that a proposal they
    /// cannot see exists.
    pub async fn get_proposal_by_id(
        &self,
        requester: &Requester,
        proposal_id: &str,
    ) -> Result<ProposalDetails> {
        if proposal_id.trim().is_empty() {
            return Err(ServiceError::validation("Missing proposal_id"));
        }
        let details = self
            .store
            .load_proposal_details(proposal_id)
            .await?
            .ok_or_else(|| ServiceError::not_found(PROPOSAL_NOT_FOUND))?;
        let resource = proposal_resource(&details.proposal, self.today());
        if !can_access(requester, resource, Action::Read) {
            return Err(match requester {
                Requester::Teacher(_) => ServiceError::unauthorized(UNAUTHORIZED_PROPOSAL),
                Requester::Student(_) => ServiceError::not_found(PROPOSAL_NOT_FOUND),
            });
        }
        Ok(details)
    }

    pub async fn get_max_proposal_id_number(&self) -> Result<u32> {
        Ok(self.store.max_proposal_id_number().await?)
    }

    pub async fn insert_proposal(
        &self,
        requester: &Requester,
        form: ProposalForm,
    ) -> Result<Proposal> {
        let teacher = require_teacher(requester)?;
        self.validate_form(&form).await?;
        let proposal_id = next_proposal_id(self.get_max_proposal_id_number().await?)
            .ok_or_eyre("proposal identifiers are exhausted")?;
        let proposal = form.into_proposal(proposal_id, teacher.id.clone(), &teacher.cod_group);
        self.store.insert_proposal(&proposal).await?;
        info!(proposal_id = %proposal.proposal_id, supervisor = %teacher, "proposal created");
        Ok(proposal)
    }

    pub async fn update_proposal(
        &self,
        requester: &Requester,
        proposal_id: &str,
        form: ProposalForm,
    ) -> Result<Proposal> {
        let existing = self
            .store
            .load_proposal(proposal_id)
            .await?
            .ok_or_else(|| ServiceError::not_found(PROPOSAL_NOT_FOUND))?;
        let resource = proposal_resource(&existing, self.today());
        if !can_access(requester, resource, Action::Write) {
            return Err(ServiceError::forbidden("Not authorized!"));
        }
        let Requester::Teacher(owner) = requester else {
            return Err(ServiceError::forbidden("Not authorized!"));
        };
        self.validate_form(&form).await?;
        let proposal = form.into_proposal(
            existing.proposal_id,
            existing.supervisor_id,
            &owner.cod_group,
        );
        self.store.update_proposal(&proposal).await?;
        info!(proposal_id = %proposal.proposal_id, "proposal updated");
        Ok(proposal)
    }

    pub async fn delete_proposal(&self, requester: &Requester, proposal_id: &str) -> Result<()> {
        let existing = self
            .store
            .load_proposal(proposal_id)
            .await?
            .ok_or_else(|| ServiceError::not_found(PROPOSAL_NOT_FOUND))?;
        let resource = proposal_resource(&existing, self.today());
        if !can_access(requester, resource, Action::Write) {
            return Err(ServiceError::forbidden("Not authorized!"));
        }
        if !self.store.delete_proposal(proposal_id).await? {
            return Err(ServiceError::conflict(
                "A proposal with an accepted application cannot be deleted",
            ));
        }
        info!(proposal_id, "proposal deleted");
        Ok(())
    }

    async fn validate_form(&self, form: &ProposalForm) -> Result<()> {
        form.check(self.today()).map_err(ServiceError::validation)?;
        let degrees = self.store.load_degrees().await?;
        for programme in &form.programmes {
            let degree = degrees
                .iter()
                .find(|d| d.cod_degree == *programme)
                .ok_or_else(|| {
                    ServiceError::validation(format!("Unknown programme {programme}"))
                })?;
            if !form.level.admits(degree) {
                return Err(ServiceError::validation(
                    "Please select programmes compatible with the chosen level.",
                ));
            }
        }
        Ok(())
    }
}
