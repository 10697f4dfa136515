use std::str::FromStr;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use sqlx::{sqlite::SqliteRow, Row};

use frontdesk_core::domain::enrollment::{
    Career, CareerHeadcount, EnrollmentStatistics, Student,
};

use super::{decode_error, EnrollmentRepository, RepositoryError};
use crate::DbPool;

pub struct SqlEnrollmentRepository {
    pool: DbPool,
}

impl SqlEnrollmentRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn small_count(row: &SqliteRow, column: &str) -> Result<u8, RepositoryError> {
    let value: i64 = row.try_get(column).map_err(decode_error)?;
    u8::try_from(value)
        .map_err(|_| RepositoryError::Decode(format!("{column} value {value} is out of range")))
}

fn row_to_student(row: &SqliteRow) -> Result<Student, RepositoryError> {
    let matricula: String = row.try_get("matricula").map_err(decode_error)?;
    let enrolled_on_raw: String = row.try_get("fecha_inscripcion").map_err(decode_error)?;
    let enrolled_on = NaiveDate::parse_from_str(&enrolled_on_raw, "%Y-%m-%d").map_err(|error| {
        RepositoryError::Decode(format!(
            "student {matricula} has invalid fecha_inscripcion `{enrolled_on_raw}`: {error}"
        ))
    })?;

    let student = Student {
        first_name: row.try_get("nombre").map_err(decode_error)?,
        last_name: row.try_get("apellido").map_err(decode_error)?,
        career_code: row.try_get("carrera_codigo").map_err(decode_error)?,
        career_name: row.try_get("carrera_nombre").map_err(decode_error)?,
        semester: small_count(row, "semestre")?,
        enrolled_on,
        enrollment_paid: row.try_get("inscripcion_pagada").map_err(decode_error)?,
        email: row.try_get("email").map_err(decode_error)?,
        phone: row.try_get("telefono").map_err(decode_error)?,
        matricula,
    };
    student.validate().map_err(decode_error)?;
    Ok(student)
}

fn row_to_career(row: &SqliteRow) -> Result<Career, RepositoryError> {
    let code: String = row.try_get("codigo").map_err(decode_error)?;
    let cost_raw: String = row.try_get("costo_inscripcion").map_err(decode_error)?;
    let enrollment_cost = Decimal::from_str(cost_raw.trim()).map_err(|error| {
        RepositoryError::Decode(format!("career {code} has invalid costo_inscripcion: {error}"))
    })?;

    let career = Career {
        name: row.try_get("nombre").map_err(decode_error)?,
        duration_semesters: small_count(row, "duracion_semestres")?,
        enrollment_cost,
        active: row.try_get("activa").map_err(decode_error)?,
        code,
    };
    career.validate().map_err(decode_error)?;
    Ok(career)
}

#[async_trait::async_trait]
impl EnrollmentRepository for SqlEnrollmentRepository {
    async fn fetch_statistics(&self) -> Result<Option<EnrollmentStatistics>, RepositoryError> {
        // Both aggregates read the same snapshot.
        let mut tx = self.pool.begin().await?;

        let totals = sqlx::query(
            "SELECT COUNT(*) AS total,
                    COALESCE(SUM(CASE WHEN inscripcion_pagada <> 0 THEN 1 ELSE 0 END), 0) AS pagados,
                    COALESCE(SUM(CASE WHEN inscripcion_pagada = 0 THEN 1 ELSE 0 END), 0) AS pendientes
             FROM estudiantes",
        )
        .fetch_one(&mut *tx)
        .await?;

        let total: i64 = totals.try_get("total").map_err(decode_error)?;
        if total == 0 {
            tx.commit().await?;
            return Ok(None);
        }

        let by_career_rows = sqlx::query(
            "SELECT COALESCE(c.nombre, e.carrera_codigo) AS carrera, COUNT(*) AS cantidad
             FROM estudiantes e
             LEFT JOIN carreras c ON c.codigo = e.carrera_codigo
             GROUP BY e.carrera_codigo, c.nombre
             ORDER BY cantidad DESC, carrera ASC",
        )
        .fetch_all(&mut *tx)
        .await?;
        tx.commit().await?;

        let by_career = by_career_rows
            .iter()
            .map(|row| {
                Ok(CareerHeadcount {
                    career: row.try_get("carrera").map_err(decode_error)?,
                    count: row.try_get("cantidad").map_err(decode_error)?,
                })
            })
            .collect::<Result<Vec<_>, RepositoryError>>()?;

        Ok(Some(EnrollmentStatistics {
            total,
            paid: totals.try_get("pagados").map_err(decode_error)?,
            pending: totals.try_get("pendientes").map_err(decode_error)?,
            by_career,
        }))
    }

    async fn fetch_pending_enrollment_students(&self) -> Result<Vec<Student>, RepositoryError> {
        let rows = sqlx::query(
            "SELECT e.matricula, e.nombre, e.apellido, e.carrera_codigo, c.nombre AS carrera_nombre,
                    e.semestre, e.fecha_inscripcion, e.inscripcion_pagada, e.email, e.telefono
             FROM estudiantes e
             LEFT JOIN carreras c ON c.codigo = e.carrera_codigo
             WHERE e.inscripcion_pagada = 0
             ORDER BY e.fecha_inscripcion DESC, e.matricula ASC",
        )
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(row_to_student).collect()
    }

    async fn fetch_careers(&self) -> Result<Vec<Career>, RepositoryError> {
        let rows = sqlx::query(
            "SELECT codigo, nombre, duracion_semestres, costo_inscripcion, activa
             FROM carreras
             WHERE activa <> 0
             ORDER BY nombre ASC",
        )
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(row_to_career).collect()
    }
}
