use super::Level;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ApplicationStatus {
    Pending,
    Accepted,
    Rejected,
    Canceled,
}

impl ApplicationStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            ApplicationStatus::Pending => "Pending",
            ApplicationStatus::Accepted => "Accepted",
            ApplicationStatus::Rejected => "Rejected",
            ApplicationStatus::Canceled => "Canceled",
        }
    }

    /// Pending and accepted applications prevent the student from applying elsewhere.
    pub fn is_active(self) -> bool {
        matches!(
            self,
            ApplicationStatus::Pending | ApplicationStatus::Accepted
        )
    }
}

impl fmt::Display for ApplicationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ApplicationStatus {
    type Err = eyre::Report;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s {
            "Pending" => ApplicationStatus::Pending,
            "Accepted" => ApplicationStatus::Accepted,
            "Rejected" => ApplicationStatus::Rejected,
            "Canceled" => ApplicationStatus::Canceled,
            other => eyre::bail!("unknown application status {other:?}"),
        })
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Application {
    pub id: i64,
    pub proposal_id: String,
    pub student_id: String,
    pub status: ApplicationStatus,
    pub application_date: NaiveDate,
}

/// An application as listed to the supervisor, with the applicant's record.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Applicant {
    pub application_id: i64,
    pub status: ApplicationStatus,
    pub application_date: NaiveDate,
    pub student_id: String,
    pub surname: String,
    pub name: String,
    pub email: String,
    pub enrollment_year: i64,
    pub cod_degree: String,
}

/// The applications received by one proposal.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProposalApplications {
    pub proposal_id: String,
    pub title: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub description: String,
    pub expiration_date: NaiveDate,
    pub level: Level,
    pub applications: Vec<Applicant>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Decision {
    pub status: ApplicationStatus,
}
