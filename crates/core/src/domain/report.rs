use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::enrollment::{Career, Student};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReportKind {
    InscripcionesPendientes,
    Carreras,
}

impl ReportKind {
    pub const ALL: [ReportKind; 2] = [Self::InscripcionesPendientes, Self::Carreras];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::InscripcionesPendientes => "inscripciones_pendientes",
            Self::Carreras => "carreras",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "inscripciones_pendientes" | "pendientes" => Some(Self::InscripcionesPendientes),
            "carreras" => Some(Self::Carreras),
            _ => None,
        }
    }

    pub fn title(&self) -> &'static str {
        match self {
            Self::InscripcionesPendientes => "Estudiantes con inscripción pendiente",
            Self::Carreras => "Catálogo de carreras activas",
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ReportRows {
    Students(Vec<Student>),
    Careers(Vec<Career>),
}

impl ReportRows {
    pub fn len(&self) -> usize {
        match self {
            Self::Students(rows) => rows.len(),
            Self::Careers(rows) => rows.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// A point-in-time snapshot handed to renderers. Only its metadata is stored.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportDescriptor {
    pub id: String,
    pub kind: ReportKind,
    pub rows: ReportRows,
    pub total: usize,
    pub generated_at: DateTime<Utc>,
}

impl ReportDescriptor {
    pub fn new(kind: ReportKind, rows: ReportRows, generated_at: DateTime<Utc>) -> Self {
        let id = format!("{}_{}", kind.as_str(), generated_at.format("%Y%m%d_%H%M%S"));
        let total = rows.len();
        Self { id, kind, rows, total, generated_at }
    }

    pub fn metadata(&self) -> ReportMetadata {
        ReportMetadata {
            id: self.id.clone(),
            kind: self.kind,
            total_rows: self.total as i64,
            generated_at: self.generated_at,
        }
    }

    pub fn to_table(&self) -> TabularReport {
        let (columns, rows): (Vec<&str>, Vec<Vec<String>>) = match &self.rows {
            ReportRows::Students(students) => (
                vec!["Matrícula", "Nombre", "Carrera", "Semestre", "Fecha de inscripción", "Email"],
                students
                    .iter()
                    .map(|student| {
                        vec![
                            student.matricula.clone(),
                            student.full_name(),
                            student.career_label().to_string(),
                            student.semester.to_string(),
                            student.enrolled_on.format("%Y-%m-%d").to_string(),
                            student.email.clone().unwrap_or_default(),
                        ]
                    })
                    .collect(),
            ),
            ReportRows::Careers(careers) => (
                vec!["Código", "Carrera", "Duración (semestres)", "Costo de inscripción"],
                careers
                    .iter()
                    .map(|career| {
                        vec![
                            career.code.clone(),
                            career.name.clone(),
                            career.duration_semesters.to_string(),
                            format!("{:.2}", career.enrollment_cost),
                        ]
                    })
                    .collect(),
            ),
        };

        TabularReport {
            title: self.kind.title().to_string(),
            generated_at: self.generated_at,
            columns: columns.into_iter().map(str::to_string).collect(),
            rows,
        }
    }
}

/// Audit row persisted for every generated report.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportMetadata {
    pub id: String,
    pub kind: ReportKind,
    pub total_rows: i64,
    pub generated_at: DateTime<Utc>,
}

/// Uniform rows plus a title: the whole contract with report renderers.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TabularReport {
    pub title: String,
    pub generated_at: DateTime<Utc>,
    pub columns: Vec<String>,
    pub rows: Vec<Vec<String>>,
}
