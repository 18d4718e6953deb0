//! In-memory database filled with a small catalog, for tests.
//!
//! Today is 2024-01-15 for every fixture service. Proposals:
//!
//! | id   | supervisor | level    | programmes       | expires    |
//! |------|------------|----------|------------------|------------|
//! | P001 | T001       | Master   | MSC001           | 2024-06-30 |
//! | P002 | T001       | Master   | MSC001, MSC002   | 2023-12-31 |
//! | P003 | T002       | Master   | MSC002, DOC001   | 2024-09-30 |
//! | P004 | T002       | Bachelor | BSC001           | 2024-05-31 |
//! | P015 | T001       | Bachelor | BSC001           | 2024-03-01 |
//!
//! Pending applications: #1 S001→P001, #2 S002→P001, #3 S003→P004.

use crate::clock::Clock;
use crate::config::DatabaseConfig;
use crate::model::{Level, ProposalForm};
use crate::service::Service;
use crate::store::Store;
use chrono::NaiveDate;
use sqlx::AnyPool;
use sqlx::any::AnyPoolOptions;

const FIXTURES: &str = r#"
INSERT INTO degrees VALUES ('BSC001', 'Bachelor of Computer Engineering');
INSERT INTO degrees VALUES ('MSC001', 'Master of Computer Engineering');
INSERT INTO degrees VALUES ('MSC002', 'Master of Data Science');
INSERT INTO degrees VALUES ('DOC001', 'Doctorate in Physics');
INSERT INTO students VALUES ('S001', 'Smith', 'John', 'john.smith@example.com', 'MSC001', 2021);
INSERT INTO students VALUES ('S002', 'Johnson', 'Emily', 'emily.johnson@example.com', 'MSC001', 2022);
INSERT INTO students VALUES ('S003', 'Brown', 'Luca', 'luca.brown@example.com', 'BSC001', 2022);
INSERT INTO students VALUES ('S004', 'Verdi', 'Anna', 'anna.verdi@example.com', 'MSC002', 2023);
INSERT INTO teachers VALUES ('T001', 'Rossi', 'Maria', 'maria.rossi@example.com', 'G01', 'DEP01');
INSERT INTO teachers VALUES ('T002', 'Bianchi', 'Marco', 'marco.bianchi@example.com', 'G02', 'DEP01');
INSERT INTO proposals VALUES ('P001', 'Mobile App Development', 'T001', '["mobile","android"]', 'Research', '["G01"]', 'A mobile app development project description.', 'Kotlin', NULL, '2024-06-30', 'Master', '["MSC001"]', 0);
INSERT INTO proposals VALUES ('P002', 'Legacy Systems Audit', 'T001', '["cobol"]', 'Company', '["G01"]', 'Audit of a mainframe estate.', NULL, NULL, '2023-12-31', 'Master', '["MSC001","MSC002"]', 0);
INSERT INTO proposals VALUES ('P003', 'Quantum Error Correction', 'T002', '["quantum","codes"]', 'Research', '["G02"]', 'Surface codes on noisy hardware.', 'Linear algebra', 'Co-supervised with DEP02', '2024-09-30', 'Master', '["MSC002","DOC001"]', 0);
INSERT INTO proposals VALUES ('P004', 'Web Accessibility', 'T002', '["web","a11y"]', 'Experimental', '["G02"]', 'Audit public sites against WCAG.', NULL, NULL, '2024-05-31', 'Bachelor', '["BSC001"]', 0);
INSERT INTO proposals VALUES ('P015', 'Embedded Vision', 'T001', '["cameras","fpga"]', 'Research', '["G01"]', 'Object detection on small boards.', NULL, NULL, '2024-03-01', 'Bachelor', '["BSC001"]', 0);
INSERT INTO applications VALUES (1, 'P001', 'S001', 'Pending', '2023-11-22');
INSERT INTO applications VALUES (2, 'P001', 'S002', 'Pending', '2023-11-22');
INSERT INTO applications VALUES (3, 'P004', 'S003', 'Pending', '2023-12-01')
"#;

pub fn today() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 1, 15).unwrap()
}

pub async fn fixture_pool() -> AnyPool {
    sqlx::any::install_default_drivers();
    let url = "sqlite::memory:";
    // A single connection that never expires keeps the in-memory database alive.
    let pool = AnyPoolOptions::new()
        .max_connections(1)
        .idle_timeout(None)
        .max_lifetime(None)
        .connect(url)
        .await
        .unwrap();
    crate::db::init_schema(&pool, url).await.unwrap();
    for statement in FIXTURES.split(";\n").map(str::trim).filter(|s| !s.is_empty()) {
        sqlx::query(statement).execute(&pool).await.unwrap();
    }
    pool
}

pub async fn fixture_service() -> Service {
    Service::new(Store::new(fixture_pool().await), Clock::fixed(today()))
}

pub fn database_config() -> DatabaseConfig {
    DatabaseConfig {
        url: "sqlite::memory:".to_owned(),
        max_connections: 1,
    }
}

/// A valid master-level form for MSC001.
pub fn form() -> ProposalForm {
    ProposalForm {
        title: "Graph Databases at Scale".into(),
        keywords: vec!["graphs".into(), "storage".into()],
        kind: "Research".into(),
        groups: vec![],
        description: "Benchmark graph engines on social datasets.".into(),
        required_knowledge: Some("Databases".into()),
        notes: None,
        expiration_date: NaiveDate::from_ymd_opt(2024, 6, 30).unwrap(),
        level: Level::Master,
        programmes: vec!["MSC001".into()],
    }
}
