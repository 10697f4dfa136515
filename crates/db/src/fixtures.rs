use sqlx::Executor;

use crate::connection::DbPool;
use crate::repositories::RepositoryError;

/// Expected row counts for the demo dataset, checked by `verify`.
const SEED_CONTRACT: &[SeedTableContract] = &[
    SeedTableContract {
        label: "common-intents",
        count_sql: "SELECT COUNT(1) FROM common_intents WHERE intent_name IN
            ('greeting', 'services', 'contact', 'hours', 'location', 'pricing', 'thanks', 'goodbye')",
        expected: 8,
    },
    SeedTableContract {
        label: "carreras",
        count_sql: "SELECT COUNT(1) FROM carreras WHERE codigo IN ('ISC', 'II', 'LCP', 'LAE')",
        expected: 4,
    },
    SeedTableContract {
        label: "carreras-activas",
        count_sql: "SELECT COUNT(1) FROM carreras WHERE codigo IN ('ISC', 'II', 'LCP', 'LAE') AND activa <> 0",
        expected: 3,
    },
    SeedTableContract {
        label: "estudiantes",
        count_sql: "SELECT COUNT(1) FROM estudiantes WHERE matricula LIKE 'A2026%'",
        expected: 7,
    },
    SeedTableContract {
        label: "estudiantes-pendientes",
        count_sql: "SELECT COUNT(1) FROM estudiantes WHERE matricula LIKE 'A2026%' AND inscripcion_pagada = 0",
        expected: 3,
    },
];

/// Deterministic demo data: the intent catalogue, four careers, seven students.
pub struct SeedDataset;

impl SeedDataset {
    pub const SQL: &str = include_str!("../../../config/fixtures/seed_data.sql");

    /// Load the dataset. Existing rows with the same keys are left untouched.
    pub async fn load(pool: &DbPool) -> Result<SeedResult, RepositoryError> {
        let mut tx = pool.begin().await?;
        tx.execute(sqlx::query(Self::SQL)).await?;
        tx.commit().await?;

        Ok(SeedResult {
            tables_seeded: SEED_CONTRACT
                .iter()
                .map(|table| TableSeedInfo { label: table.label, expected_rows: table.expected })
                .collect(),
        })
    }

    pub async fn verify(pool: &DbPool) -> Result<VerificationResult, RepositoryError> {
        let mut checks = Vec::with_capacity(SEED_CONTRACT.len());
        for table in SEED_CONTRACT {
            let actual: i64 = sqlx::query_scalar(table.count_sql).fetch_one(pool).await?;
            checks.push((table.label, actual == table.expected));
        }

        let all_present = checks.iter().all(|(_, ok)| *ok);
        Ok(VerificationResult { all_present, checks })
    }

    /// Remove seeded academic rows. Chat history is left alone.
    pub async fn clean(pool: &DbPool) -> Result<(), RepositoryError> {
        let mut tx = pool.begin().await?;
        sqlx::query("DELETE FROM estudiantes WHERE matricula LIKE 'A2026%'")
            .execute(&mut *tx)
            .await?;
        sqlx::query("DELETE FROM carreras WHERE codigo IN ('ISC', 'II', 'LCP', 'LAE')")
            .execute(&mut *tx)
            .await?;
        tx.commit().await?;
        Ok(())
    }
}

#[derive(Debug, Clone, Copy)]
struct SeedTableContract {
    label: &'static str,
    count_sql: &'static str,
    expected: i64,
}

#[derive(Debug)]
pub struct SeedResult {
    pub tables_seeded: Vec<TableSeedInfo>,
}

#[derive(Debug)]
pub struct TableSeedInfo {
    pub label: &'static str,
    pub expected_rows: i64,
}

#[derive(Debug)]
pub struct VerificationResult {
    pub all_present: bool,
    pub checks: Vec<(&'static str, bool)>,
}
