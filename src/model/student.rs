use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Student {
    pub id: String,
    pub surname: String,
    pub name: String,
    pub email: String,
    pub cod_degree: String,
    pub enrollment_year: i64,
}

impl Student {
    pub fn is_enrolled_in(&self, programmes: &[String]) -> bool {
        programmes.iter().any(|p| *p == self.cod_degree)
    }
}

impl fmt::Display for Student {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} ({})", self.name, self.surname, self.id)
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Teacher {
    pub id: String,
    pub surname: String,
    pub name: String,
    pub email: String,
    pub cod_group: String,
    pub cod_department: String,
}

impl fmt::Display for Teacher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} ({})", self.name, self.surname, self.id)
    }
}

/// A degree programme a proposal can be offered to.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Degree {
    pub cod_degree: String,
    pub title_degree: String,
}
