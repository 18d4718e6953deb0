use super::Store;
use crate::model::{Degree, Student, Teacher};
use eyre::{Error, WrapErr};
use sqlx::Row;
use sqlx::any::AnyRow;

fn student_from_row(row: &AnyRow) -> Result<Student, Error> {
    Ok(Student {
        id: row.try_get("id")?,
        surname: row.try_get("surname")?,
        name: row.try_get("name")?,
        email: row.try_get("email")?,
        cod_degree: row.try_get("cod_degree")?,
        enrollment_year: row.try_get("enrollment_year")?,
    })
}

fn teacher_from_row(row: &AnyRow) -> Result<Teacher, Error> {
    Ok(Teacher {
        id: row.try_get("id")?,
        surname: row.try_get("surname")?,
        name: row.try_get("name")?,
        email: row.try_get("email")?,
        cod_group: row.try_get("cod_group")?,
        cod_department: row.try_get("cod_department")?,
    })
}

impl Store {
    pub async fn load_student(&self, id: &str) -> Result<Option<Student>, Error> {
        sqlx::query(
            "SELECT id, surname, name, email, cod_degree, enrollment_year FROM students \
             WHERE id = ?",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .wrap_err("cannot load student")?
        .map(|row| student_from_row(&row))
        .transpose()
    }

    pub async fn load_teacher(&self, id: &str) -> Result<Option<Teacher>, Error> {
        sqlx::query(
            "SELECT id, surname, name, email, cod_group, cod_department FROM teachers \
             WHERE id = ?",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .wrap_err("cannot load teacher")?
        .map(|row| teacher_from_row(&row))
        .transpose()
    }

    pub async fn load_teachers(&self) -> Result<Vec<Teacher>, Error> {
        sqlx::query(
            "SELECT id, surname, name, email, cod_group, cod_department FROM teachers \
             ORDER BY surname, name",
        )
        .fetch_all(&self.pool)
        .await
        .wrap_err("cannot load teachers")?
        .iter()
        .map(teacher_from_row)
        .collect()
    }

    pub async fn load_degrees(&self) -> Result<Vec<Degree>, Error> {
        let sql = "SELECT cod_degree, title_degree FROM degrees ORDER BY cod_degree";
        sqlx::query(sql)
            .map(|row: AnyRow| Degree {
                cod_degree: row.get("cod_degree"),
                title_degree: row.get("title_degree"),
            })
            .fetch_all(&self.pool)
            .await
            .wrap_err("cannot load degrees")
    }
}
