use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::errors::DomainError;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Student {
    pub matricula: String,
    pub first_name: String,
    pub last_name: String,
    pub career_code: String,
    /// Display name of the career when the store could resolve it.
    pub career_name: Option<String>,
    pub semester: u8,
    pub enrolled_on: NaiveDate,
    pub enrollment_paid: bool,
    pub email: Option<String>,
    pub phone: Option<String>,
}

impl Student {
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name).trim().to_string()
    }

    pub fn career_label(&self) -> &str {
        self.career_name.as_deref().unwrap_or(&self.career_code)
    }

    pub fn validate(&self) -> Result<(), DomainError> {
        if self.semester == 0 {
            return Err(DomainError::InvariantViolation(format!(
                "student {} has semester 0",
                self.matricula
            )));
        }
        Ok(())
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Career {
    pub code: String,
    pub name: String,
    pub duration_semesters: u8,
    pub enrollment_cost: Decimal,
    pub active: bool,
}

impl Career {
    pub fn validate(&self) -> Result<(), DomainError> {
        if self.duration_semesters == 0 {
            return Err(DomainError::InvariantViolation(format!(
                "career {} has a duration of 0 semesters",
                self.code
            )));
        }
        Ok(())
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CareerHeadcount {
    #[serde(rename = "carrera")]
    pub career: String,
    #[serde(rename = "cantidad")]
    pub count: i64,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnrollmentStatistics {
    #[serde(rename = "total_estudiantes")]
    pub total: i64,
    #[serde(rename = "inscritos_pagados")]
    pub paid: i64,
    #[serde(rename = "pendientes_inscripcion")]
    pub pending: i64,
    #[serde(rename = "por_carrera")]
    pub by_career: Vec<CareerHeadcount>,
}

impl EnrollmentStatistics {
    pub fn is_consistent(&self) -> bool {
        self.total == self.paid + self.pending
    }
}
