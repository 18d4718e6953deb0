use super::Degree;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Level {
    Bachelor,
    Master,
}

impl Level {
    pub fn as_str(self) -> &'static str {
        match self {
            Level::Bachelor => "Bachelor",
            Level::Master => "Master",
        }
    }

    /// Bachelor proposals go to `B…` degrees, master proposals to `M…` and `D…` ones.
    pub fn admits(self, degree: &Degree) -> bool {
        match (self, degree.title_degree.chars().next()) {
            (Level::Bachelor, Some('B')) => true,
            (Level::Master, Some('M' | 'D')) => true,
            _ => false,
        }
    }
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Level {
    type Err = eyre::Report;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Bachelor" => Ok(Level::Bachelor),
            "Master" => Ok(Level::Master),
            other => eyre::bail!("unknown proposal level {other:?}"),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Proposal {
    pub proposal_id: String,
    pub title: String,
    pub supervisor_id: String,
    pub keywords: Vec<String>,
    #[serde(rename = "type")]
    pub kind: String,
    pub groups: Vec<String>,
    pub description: String,
    pub required_knowledge: Option<String>,
    pub notes: Option<String>,
    pub expiration_date: NaiveDate,
    pub level: Level,
    pub programmes: Vec<String>,
}

impl Proposal {
    pub fn is_expired(&self, today: NaiveDate) -> bool {
        self.expiration_date < today
    }

    /// Case-insensitive match against the title, the description and the keywords.
    pub fn matches(&self, needle: &str) -> bool {
        let needle = needle.to_lowercase();
        self.title.to_lowercase().contains(&needle)
            || self.description.to_lowercase().contains(&needle)
            || self
                .keywords
                .iter()
                .any(|k| k.to_lowercase().contains(&needle))
    }
}

/// A proposal together with the name of its supervisor, as shown on the details page.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProposalDetails {
    pub supervisor_name: String,
    pub supervisor_surname: String,
    #[serde(flatten)]
    pub proposal: Proposal,
}

/// Editable fields of a proposal, as submitted by the creation and edition forms.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProposalForm {
    pub title: String,
    pub keywords: Vec<String>,
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub groups: Vec<String>,
    pub description: String,
    #[serde(default)]
    pub required_knowledge: Option<String>,
    #[serde(default)]
    pub notes: Option<String>,
    pub expiration_date: NaiveDate,
    pub level: Level,
    pub programmes: Vec<String>,
}

impl ProposalForm {
    /// Check the fields that do not need the degree catalog. Returns the first problem found.
    pub fn check(&self, today: NaiveDate) -> Result<(), &'static str> {
        if self.title.trim().is_empty() {
            return Err("Please enter a valid title.");
        }
        if self.kind.trim().is_empty() {
            return Err("Please select a valid type.");
        }
        if self.description.trim().is_empty() {
            return Err("Please enter a valid description.");
        }
        if self.keywords.iter().all(|k| k.trim().is_empty()) {
            return Err("Please enter at least one keyword.");
        }
        if self.programmes.is_empty() {
            return Err("Please select at least one programme.");
        }
        if self.expiration_date < today {
            return Err("Please select a valid expiration date.");
        }
        Ok(())
    }

    /// Build the stored proposal. The owner's group always comes first.
    pub fn into_proposal(
        self,
        proposal_id: String,
        supervisor_id: String,
        owner_group: &str,
    ) -> Proposal {
        let mut groups = vec![owner_group.to_owned()];
        for group in self.groups {
            let group = group.trim().to_owned();
            if !group.is_empty() && !groups.contains(&group) {
                groups.push(group);
            }
        }
        let keywords = self
            .keywords
            .into_iter()
            .map(|k| k.trim().to_owned())
            .filter(|k| !k.is_empty())
            .collect();
        Proposal {
            proposal_id,
            title: self.title.trim().to_owned(),
            supervisor_id,
            keywords,
            kind: self.kind.trim().to_owned(),
            groups,
            description: self.description,
            required_knowledge: non_blank(self.required_knowledge),
            notes: non_blank(self.notes),
            expiration_date: self.expiration_date,
            level: self.level,
            programmes: self.programmes,
        }
    }
}

fn non_blank(text: Option<String>) -> Option<String> {
    text.filter(|s| !s.trim().is_empty())
}

/// Format the identifier of the proposal following the one numbered `max`, if any is left.
pub fn next_proposal_id(max: u32) -> Option<String> {
    max.checked_add(1).map(|next| format!("P{next:03}"))
}

/// Numeric part of a `P###` identifier.
pub fn proposal_id_number(id: &str) -> Option<u32> {
    id.strip_prefix('P')?.parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    fn form() -> ProposalForm {
        ProposalForm {
            title: " Graph databases ".into(),
            keywords: vec!["graphs".into(), " ".into(), "storage".into()],
            kind: "Research".into(),
            groups: vec!["G02".into(), "G01".into()],
            description: "Benchmark graph engines".into(),
            required_knowledge: Some("".into()),
            notes: None,
            expiration_date: date("2024-06-30"),
            level: Level::Master,
            programmes: vec!["MSC001".into()],
        }
    }

    #[test]
    fn test_level_admits() {
        let bachelor = Degree {
            cod_degree: "BSC001".into(),
            title_degree: "Bachelor of Computer Engineering".into(),
        };
        let doctorate = Degree {
            cod_degree: "DOC001".into(),
            title_degree: "Doctorate in Physics".into(),
        };
        assert!(Level::Bachelor.admits(&bachelor));
        assert!(!Level::Master.admits(&bachelor));
        assert!(Level::Master.admits(&doctorate));
        assert!(!Level::Bachelor.admits(&doctorate));
    }

    #[test]
    fn test_form_check() {
        let today = date("2024-01-15");
        assert_eq!(form().check(today), Ok(()));
        let f = ProposalForm { title: "  ".into(), ..form() };
        assert_eq!(f.check(today), Err("Please enter a valid title."));
        let f = ProposalForm { keywords: vec![" ".into()], ..form() };
        assert_eq!(f.check(today), Err("Please enter at least one keyword."));
        let f = ProposalForm { programmes: vec![], ..form() };
        assert_eq!(f.check(today), Err("Please select at least one programme."));
        assert_eq!(
            form().check(date("2024-07-01")),
            Err("Please select a valid expiration date.")
        );
    }

    #[test]
    fn test_into_proposal() {
        let p = form().into_proposal("P007".into(), "T001".into(), "G01");
        assert_eq!(p.title, "Graph databases");
        assert_eq!(p.groups, vec!["G01", "G02"]);
        assert_eq!(p.keywords, vec!["graphs", "storage"]);
        assert_eq!(p.required_knowledge, None);
        assert_eq!(p.supervisor_id, "T001");
    }

    #[test]
    fn test_proposal_ids() {
        assert_eq!(next_proposal_id(0).as_deref(), Some("P001"));
        assert_eq!(next_proposal_id(41).as_deref(), Some("P042"));
        assert_eq!(next_proposal_id(999).as_deref(), Some("P1000"));
        assert_eq!(next_proposal_id(u32::MAX), None);
        assert_eq!(proposal_id_number("P015"), Some(15));
        assert_eq!(proposal_id_number("X015"), None);
        assert_eq!(proposal_id_number("P"), None);
    }

    #[test]
    fn test_matches() {
        let p = form().into_proposal("P001".into(), "T001".into(), "G01");
        assert!(p.matches("GRAPH"));
        assert!(p.matches("storage"));
        assert!(!p.matches("quantum"));
    }
}
