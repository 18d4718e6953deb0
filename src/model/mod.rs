pub use self::application::{
    Applicant, Application, ApplicationStatus, Decision, ProposalApplications,
};
pub use self::proposal::{
    Level, Proposal, ProposalDetails, ProposalForm, next_proposal_id, proposal_id_number,
};
pub use self::student::{Degree, Student, Teacher};

mod application;
mod proposal;
mod student;
