//! Ownership and visibility rule shared by every proposal and application operation.

use crate::model::{Student, Teacher};
use std::fmt;

/// The authenticated issuer of a request.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Requester {
    Student(Student),
    Teacher(Teacher),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Role {
    Student,
    Teacher,
}

impl Requester {
    pub fn id(&self) -> &str {
        match self {
            Requester::Student(s) => &s.id,
            Requester::Teacher(t) => &t.id,
        }
    }

    pub fn role(&self) -> Role {
        match self {
            Requester::Student(_) => Role::Student,
            Requester::Teacher(_) => Role::Teacher,
        }
    }
}

impl fmt::Display for Requester {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Requester::Student(s) => write!(f, "student {s}"),
            Requester::Teacher(t) => write!(f, "teacher {t}"),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Action {
    Read,
    Write,
}

/// What the rule needs to know about the resource being accessed.
#[derive(Clone, Copy, Debug)]
pub enum Resource<'a> {
    Proposal {
        supervisor_id: &'a str,
        programmes: &'a [String],
        expired: bool,
    },
    Application {
        student_id: &'a str,
        supervisor_id: &'a str,
    },
}

pub fn can_access(requester: &Requester, resource: Resource<'_>, action: Action) -> bool {
    match (requester, resource, action) {
        (Requester::Teacher(t), Resource::Proposal { supervisor_id, .. }, _) => {
            t.id == supervisor_id
        }
        (
            Requester::Student(s),
            Resource::Proposal {
                programmes,
                expired,
                ..
            },
            Action::Read,
        ) => !expired && s.is_enrolled_in(programmes),
        (Requester::Student(_), Resource::Proposal { .. }, Action::Write) => false,
        (Requester::Teacher(t), Resource::Application { supervisor_id, .. }, _) => {
            t.id == supervisor_id
        }
        (Requester::Student(s), Resource::Application { student_id, .. }, Action::Read) => {
            s.id == student_id
        }
        (Requester::Student(_), Resource::Application { .. }, Action::Write) => false,
    }
}
