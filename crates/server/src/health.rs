use std::sync::Arc;

use axum::{extract::State, http::StatusCode, routing::get, Json, Router};
use chrono::Utc;
use serde::Serialize;

use frontdesk_db::repositories::{IntentRepository, SqlIntentRepository};
use frontdesk_db::{ping, DbPool};

use crate::pdf::PdfGenerator;

#[derive(Clone)]
pub struct HealthState {
    db_pool: DbPool,
    pdf: Arc<PdfGenerator>,
}

impl HealthState {
    pub fn new(db_pool: DbPool, pdf: Arc<PdfGenerator>) -> Self {
        Self { db_pool, pdf }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct HealthCheck {
    pub status: &'static str,
    pub detail: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub database: HealthCheck,
    pub intents: HealthCheck,
    pub pdf_export: HealthCheck,
    pub checked_at: String,
}

pub fn router(state: HealthState) -> Router {
    Router::new().route("/health", get(health)).with_state(state)
}

/// Readiness hinges on the database alone. An empty intent catalog or a
/// missing PDF converter degrades answers, not availability.
pub async fn health(State(state): State<HealthState>) -> (StatusCode, Json<HealthResponse>) {
    let database = database_check(&state.db_pool).await;
    let ready = database.status == "ready";
    let intents = if ready {
        intent_catalog_check(&state.db_pool).await
    } else {
        HealthCheck { status: "skipped", detail: "database unreachable".to_string() }
    };

    let payload = HealthResponse {
        status: if ready { "ready" } else { "degraded" },
        database,
        intents,
        pdf_export: pdf_export_check(&state.pdf),
        checked_at: Utc::now().to_rfc3339(),
    };

    let status_code = if ready { StatusCode::OK } else { StatusCode::SERVICE_UNAVAILABLE };
    (status_code, Json(payload))
}

async fn database_check(pool: &DbPool) -> HealthCheck {
    match ping(pool).await {
        Ok(()) => HealthCheck { status: "ready", detail: "database query succeeded".to_string() },
        Err(error) => {
            HealthCheck { status: "degraded", detail: format!("database query failed: {error}") }
        }
    }
}

async fn intent_catalog_check(pool: &DbPool) -> HealthCheck {
    match SqlIntentRepository::new(pool.clone()).fetch_intents().await {
        Ok(intents) if intents.is_empty() => HealthCheck {
            status: "degraded",
            detail: "no intents loaded; replies fall back to built-in answers".to_string(),
        },
        Ok(intents) => {
            HealthCheck { status: "ready", detail: format!("{} intents loaded", intents.len()) }
        }
        Err(error) => {
            HealthCheck { status: "degraded", detail: format!("intent catalog unreadable: {error}") }
        }
    }
}

fn pdf_export_check(pdf: &PdfGenerator) -> HealthCheck {
    match pdf.converter() {
        Some(path) => HealthCheck {
            status: "ready",
            detail: format!("wkhtmltopdf at `{}`", path.display()),
        },
        None => HealthCheck {
            status: "degraded",
            detail: "wkhtmltopdf not found; PDF exports are served as HTML".to_string(),
        },
    }
}
