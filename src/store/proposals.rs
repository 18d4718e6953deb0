use super::{Store, encode_date, encode_list, get_date, get_list};
use crate::model::{Proposal, ProposalDetails, proposal_id_number};
use chrono::NaiveDate;
use eyre::{Error, WrapErr};
use sqlx::Row;
use sqlx::any::AnyRow;
use tracing::{debug, trace};

const PROPOSAL_COLUMNS: &str = "p.proposal_id AS proposal_id, p.title AS title, \
     p.supervisor_id AS supervisor_id, p.keywords AS keywords, p.type AS type, \
     p.research_groups AS research_groups, p.description AS description, \
     p.required_knowledge AS required_knowledge, p.notes AS notes, \
     p.expiration_date AS expiration_date, p.level AS level, p.programmes AS programmes";

fn proposal_from_row(row: &AnyRow) -> Result<Proposal, Error> {
    let level: String = row.try_get("level")?;
    Ok(Proposal {
        proposal_id: row.try_get("proposal_id")?,
        title: row.try_get("title")?,
        supervisor_id: row.try_get("supervisor_id")?,
        keywords: get_list(row, "keywords")?,
        kind: row.try_get("type")?,
        groups: get_list(row, "research_groups")?,
        description: row.try_get("description")?,
        required_knowledge: row.try_get("required_knowledge")?,
        notes: row.try_get("notes")?,
        expiration_date: get_date(row, "expiration_date")?,
        level: level.parse()?,
        programmes: get_list(row, "programmes")?,
    })
}

impl Store {
    /// Load a proposal which has not been deleted.
    pub async fn load_proposal(&self, proposal_id: &str) -> Result<Option<Proposal>, Error> {
        let sql = format!(
            "SELECT {PROPOSAL_COLUMNS} FROM proposals p WHERE p.proposal_id = ? AND p.deleted = 0"
        );
        sqlx::query(&sql)
            .bind(proposal_id)
            .fetch_optional(&self.pool)
            .await
            .wrap_err("cannot load proposal")?
            .map(|row| proposal_from_row(&row))
            .transpose()
    }

    pub async fn load_proposal_details(
        &self,
        proposal_id: &str,
    ) -> Result<Option<ProposalDetails>, Error> {
        let sql = format!(
            "SELECT {PROPOSAL_COLUMNS}, t.name AS supervisor_name, t.surname AS supervisor_surname \
             FROM proposals p JOIN teachers t ON t.id = p.supervisor_id \
             WHERE p.proposal_id = ? AND p.deleted = 0"
        );
        let Some(row) = sqlx::query(&sql)
            .bind(proposal_id)
            .fetch_optional(&self.pool)
            .await
            .wrap_err("cannot load proposal details")?
        else {
            return Ok(None);
        };
        Ok(Some(ProposalDetails {
            supervisor_name: row.try_get("supervisor_name")?,
            supervisor_surname: row.try_get("supervisor_surname")?,
            proposal: proposal_from_row(&row)?,
        }))
    }

    /// Proposals still open on `today`, ordered by identifier.
    pub async fn load_active_proposals(&self, today: NaiveDate) -> Result<Vec<Proposal>, Error> {
        let sql = format!(
            "SELECT {PROPOSAL_COLUMNS} FROM proposals p \
             WHERE p.deleted = 0 AND p.expiration_date >= ? ORDER BY p.proposal_id"
        );
        sqlx::query(&sql)
            .bind(encode_date(today))
            .fetch_all(&self.pool)
            .await
            .wrap_err("cannot load proposals")?
            .iter()
            .map(proposal_from_row)
            .collect()
    }

    pub async fn load_proposals_by_supervisor(
        &self,
        supervisor_id: &str,
        today: NaiveDate,
    ) -> Result<Vec<Proposal>, Error> {
        let sql = format!(
            "SELECT {PROPOSAL_COLUMNS} FROM proposals p \
             WHERE p.supervisor_id = ? AND p.deleted = 0 AND p.expiration_date >= ? \
             ORDER BY p.proposal_id"
        );
        sqlx::query(&sql)
            .bind(supervisor_id)
            .bind(encode_date(today))
            .fetch_all(&self.pool)
            .await
            .wrap_err("cannot load supervisor proposals")?
            .iter()
            .map(proposal_from_row)
            .collect()
    }

    /// Highest number used by a `P###` identifier, deleted proposals included.
    pub async fn max_proposal_id_number(&self) -> Result<u32, Error> {
        let ids: Vec<String> = sqlx::query("SELECT proposal_id FROM proposals")
            .map(|row: AnyRow| row.get("proposal_id"))
            .fetch_all(&self.pool)
            .await
            .wrap_err("cannot load proposal identifiers")?;
        let max = ids
            .iter()
            .filter_map(|id| proposal_id_number(id))
            .max()
            .unwrap_or(0);
        trace!(count = ids.len(), max, "scanned proposal identifiers");
        Ok(max)
    }

    pub async fn insert_proposal(&self, proposal: &Proposal) -> Result<(), Error> {
        sqlx::query(
            "INSERT INTO proposals (proposal_id, title, supervisor_id, keywords, type, \
             research_groups, description, required_knowledge, notes, expiration_date, level, \
             programmes, deleted) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, 0)",
        )
        .bind(&proposal.proposal_id)
        .bind(&proposal.title)
        .bind(&proposal.supervisor_id)
        .bind(encode_list(&proposal.keywords)?)
        .bind(&proposal.kind)
        .bind(encode_list(&proposal.groups)?)
        .bind(&proposal.description)
        .bind(proposal.required_knowledge.as_deref())
        .bind(proposal.notes.as_deref())
        .bind(encode_date(proposal.expiration_date))
        .bind(proposal.level.as_str())
        .bind(encode_list(&proposal.programmes)?)
        .execute(&self.pool)
        .await
        .wrap_err("cannot insert proposal")?;
        debug!(proposal_id = %proposal.proposal_id, "proposal inserted");
        Ok(())
    }

    /// Overwrite the editable fields of a proposal. The supervisor never changes.
    pub async fn update_proposal(&self, proposal: &Proposal) -> Result<(), Error> {
        sqlx::query(
            "UPDATE proposals SET title = ?, keywords = ?, type = ?, research_groups = ?, \
             description = ?, required_knowledge = ?, notes = ?, expiration_date = ?, level = ?, \
             programmes = ? WHERE proposal_id = ? AND deleted = 0",
        )
        .bind(&proposal.title)
        .bind(encode_list(&proposal.keywords)?)
        .bind(&proposal.kind)
        .bind(encode_list(&proposal.groups)?)
        .bind(&proposal.description)
        .bind(proposal.required_knowledge.as_deref())
        .bind(proposal.notes.as_deref())
        .bind(encode_date(proposal.expiration_date))
        .bind(proposal.level.as_str())
        .bind(encode_list(&proposal.programmes)?)
        .bind(&proposal.proposal_id)
        .execute(&self.pool)
        .await
        .wrap_err("cannot update proposal")?;
        debug!(proposal_id = %proposal.proposal_id, "proposal updated");
        Ok(())
    }

    /// Mark a proposal deleted and cancel the applications still waiting on it.
    /// Returns `false`, changing nothing, if an application has already been accepted.
    pub async fn delete_proposal(&self, proposal_id: &str) -> Result<bool, Error> {
        let mut tx = self.pool.begin().await?;
        let accepted: i64 = sqlx::query(
            "SELECT COUNT(*) AS n FROM applications WHERE proposal_id = ? AND status = 'Accepted'",
        )
        .bind(proposal_id)
        .map(|row: AnyRow| row.get("n"))
        .fetch_one(&mut *tx)
        .await
        .wrap_err("cannot count accepted applications")?;
        if accepted > 0 {
            tx.rollback()
                .await
                .wrap_err("error when rolling back transaction")?;
            return Ok(false);
        }
        sqlx::query("UPDATE proposals SET deleted = 1 WHERE proposal_id = ?")
            .bind(proposal_id)
            .execute(&mut *tx)
            .await
            .wrap_err("cannot delete proposal")?;
        let canceled = sqlx::query(
            "UPDATE applications SET status = 'Canceled' \
             WHERE proposal_id = ? AND status = 'Pending'",
        )
        .bind(proposal_id)
        .execute(&mut *tx)
        .await
        .wrap_err("cannot cancel applications of deleted proposal")?
        .rows_affected();
        tx.commit()
            .await
            .wrap_err("error when committing transaction")?;
        debug!(proposal_id, canceled, "proposal deleted");
        Ok(true)
    }
}
