use super::{Store, encode_date, get_date};
use crate::model::{Applicant, Application, ApplicationStatus, ProposalApplications};
use chrono::NaiveDate;
use eyre::{Error, OptionExt, WrapErr};
use sqlx::Row;
use sqlx::any::AnyRow;
use tracing::{debug, trace};

fn application_from_row(row: &AnyRow) -> Result<Application, Error> {
    let status: String = row.try_get("status")?;
    Ok(Application {
        id: row.try_get("id")?,
        proposal_id: row.try_get("proposal_id")?,
        student_id: row.try_get("student_id")?,
        status: status.parse()?,
        application_date: get_date(row, "application_date")?,
    })
}

impl Store {
    pub async fn load_applications_by_student(
        &self,
        student_id: &str,
    ) -> Result<Vec<Application>, Error> {
        sqlx::query(
            "SELECT id, proposal_id, student_id, status, application_date FROM applications \
             WHERE student_id = ? ORDER BY application_date DESC, id DESC",
        )
        .bind(student_id)
        .fetch_all(&self.pool)
        .await
        .wrap_err("cannot load student applications")?
        .iter()
        .map(application_from_row)
        .collect()
    }

    /// Applications received by the proposals of a supervisor, grouped by proposal.
    pub async fn load_applications_by_supervisor(
        &self,
        supervisor_id: &str,
    ) -> Result<Vec<ProposalApplications>, Error> {
        let rows = sqlx::query(
            "SELECT p.proposal_id AS proposal_id, p.title AS title, p.type AS type, \
             p.description AS description, p.expiration_date AS expiration_date, \
             p.level AS level, a.id AS application_id, a.status AS application_status, \
             a.application_date AS application_date, s.id AS student_id, s.surname AS surname, \
             s.name AS name, s.email AS email, s.enrollment_year AS enrollment_year, \
             s.cod_degree AS cod_degree \
             FROM proposals p \
             JOIN applications a ON a.proposal_id = p.proposal_id \
             JOIN students s ON s.id = a.student_id \
             WHERE p.supervisor_id = ? AND p.deleted = 0 \
             ORDER BY p.proposal_id, a.id",
        )
        .bind(supervisor_id)
        .fetch_all(&self.pool)
        .await
        .wrap_err("cannot load supervisor applications")?;
        let mut grouped: Vec<ProposalApplications> = Vec::new();
        for row in &rows {
            let proposal_id: String = row.try_get("proposal_id")?;
            let status: String = row.try_get("application_status")?;
            let applicant = Applicant {
                application_id: row.try_get("application_id")?,
                status: status.parse()?,
                application_date: get_date(row, "application_date")?,
                student_id: row.try_get("student_id")?,
                surname: row.try_get("surname")?,
                name: row.try_get("name")?,
                email: row.try_get("email")?,
                enrollment_year: row.try_get("enrollment_year")?,
                cod_degree: row.try_get("cod_degree")?,
            };
            match grouped.last_mut() {
                Some(group) if group.proposal_id == proposal_id => {
                    group.applications.push(applicant);
                }
                _ => {
                    let level: String = row.try_get("level")?;
                    grouped.push(ProposalApplications {
                        proposal_id,
                        title: row.try_get("title")?,
                        kind: row.try_get("type")?,
                        description: row.try_get("description")?,
                        expiration_date: get_date(row, "expiration_date")?,
                        level: level.parse()?,
                        applications: vec![applicant],
                    });
                }
            }
        }
        trace!(
            supervisor_id,
            rows = rows.len(),
            proposals = grouped.len(),
            "grouped applications"
        );
        Ok(grouped)
    }

    /// Load an application together with the supervisor of its proposal.
    pub async fn load_application(&self, id: i64) -> Result<Option<(Application, String)>, Error> {
        let Some(row) = sqlx::query(
            "SELECT a.id AS id, a.proposal_id AS proposal_id, a.student_id AS student_id, \
             a.status AS status, a.application_date AS application_date, \
             p.supervisor_id AS supervisor_id \
             FROM applications a JOIN proposals p ON p.proposal_id = a.proposal_id \
             WHERE a.id = ?",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .wrap_err("cannot load application")?
        else {
            return Ok(None);
        };
        let application = application_from_row(&row)?;
        Ok(Some((application, row.try_get("supervisor_id")?)))
    }

    pub async fn has_accepted_application(&self, proposal_id: &str) -> Result<bool, Error> {
        let count: i64 = sqlx::query(
            "SELECT COUNT(*) AS n FROM applications WHERE proposal_id = ? AND status = 'Accepted'",
        )
        .bind(proposal_id)
        .map(|row: AnyRow| row.get("n"))
        .fetch_one(&self.pool)
        .await
        .wrap_err("cannot count accepted applications")?;
        Ok(count > 0)
    }

    /// Insert a pending application and read its identifier back on the same connection.
    pub async fn insert_application(
        &self,
        proposal_id: &str,
        student_id: &str,
        date: NaiveDate,
    ) -> Result<Application, Error> {
        let status = ApplicationStatus::Pending;
        let mut tx = self.pool.begin().await?;
        sqlx::query(
            "INSERT INTO applications (proposal_id, student_id, status, application_date) \
             VALUES (?, ?, ?, ?)",
        )
        .bind(proposal_id)
        .bind(student_id)
        .bind(status.as_str())
        .bind(encode_date(date))
        .execute(&mut *tx)
        .await
        .wrap_err("cannot insert application")?;
        let row = sqlx::query(
            "SELECT MAX(id) AS id FROM applications WHERE student_id = ? AND proposal_id = ?",
        )
        .bind(student_id)
        .bind(proposal_id)
        .fetch_one(&mut *tx)
        .await
        .wrap_err("cannot read the new application id")?;
        let id = row
            .try_get::<Option<i64>, _>("id")?
            .ok_or_eyre("new application is missing")?;
        tx.commit()
            .await
            .wrap_err("error when committing transaction")?;
        debug!(id, proposal_id, student_id, "application inserted");
        Ok(Application {
            id,
            proposal_id: proposal_id.to_owned(),
            student_id: student_id.to_owned(),
            status,
            application_date: date,
        })
    }

    /// Reject a pending application. Returns `false` if it was no longer pending.
    pub async fn reject_application(&self, id: i64) -> Result<bool, Error> {
        let updated = sqlx::query(
            "UPDATE applications SET status = 'Rejected' WHERE id = ? AND status = 'Pending'",
        )
        .bind(id)
        .execute(&self.pool)
        .await
        .wrap_err("cannot reject application")?
        .rows_affected();
        debug!(id, updated, "application rejected");
        Ok(updated == 1)
    }

    /// Accept a pending application. Competing pending applications on the same proposal
    /// are rejected and the other pending applications of the student are canceled.
    /// Returns `false`, changing nothing, if the application was no longer pending.
    pub async fn accept_application(&self, application: &Application) -> Result<bool, Error> {
        let mut tx = self.pool.begin().await?;
        let accepted = sqlx::query(
            "UPDATE applications SET status = 'Accepted' WHERE id = ? AND status = 'Pending'",
        )
        .bind(application.id)
        .execute(&mut *tx)
        .await
        .wrap_err("cannot accept application")?
        .rows_affected();
        if accepted != 1 {
            tx.rollback()
                .await
                .wrap_err("error when rolling back transaction")?;
            debug!(id = application.id, "application no longer pending");
            return Ok(false);
        }
        let rejected = sqlx::query(
            "UPDATE applications SET status = 'Rejected' \
             WHERE proposal_id = ? AND id <> ? AND status = 'Pending'",
        )
        .bind(&application.proposal_id)
        .bind(application.id)
        .execute(&mut *tx)
        .await
        .wrap_err("cannot reject competing applications")?
        .rows_affected();
        let canceled = sqlx::query(
            "UPDATE applications SET status = 'Canceled' \
             WHERE student_id = ? AND id <> ? AND status = 'Pending'",
        )
        .bind(&application.student_id)
        .bind(application.id)
        .execute(&mut *tx)
        .await
        .wrap_err("cannot cancel other applications of the student")?
        .rows_affected();
        tx.commit()
            .await
            .wrap_err("error when committing transaction")?;
        debug!(
            id = application.id,
            rejected, canceled, "application accepted"
        );
        Ok(true)
    }
}
