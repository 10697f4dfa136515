use sqlx::{sqlite::SqliteRow, Row};

use frontdesk_core::domain::intent::Intent;

use super::{decode_error, IntentRepository, RepositoryError};
use crate::DbPool;

pub struct SqlIntentRepository {
    pool: DbPool,
}

impl SqlIntentRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn row_to_intent(row: &SqliteRow) -> Result<Intent, RepositoryError> {
    let name: String = row.try_get("intent_name").map_err(decode_error)?;
    let raw_examples: String = row.try_get("example_questions").map_err(decode_error)?;
    let response_template: String = row.try_get("response_template").map_err(decode_error)?;

    let example_phrases = serde_json::from_str::<Vec<String>>(&raw_examples).map_err(|error| {
        RepositoryError::Decode(format!("intent `{name}` has malformed example_questions: {error}"))
    })?;

    Ok(Intent { name, example_phrases, response_template })
}

#[async_trait::async_trait]
impl IntentRepository for SqlIntentRepository {
    async fn fetch_intents(&self) -> Result<Vec<Intent>, RepositoryError> {
        let rows = sqlx::query(
            "SELECT intent_name, example_questions, response_template
             FROM common_intents
             ORDER BY intent_name",
        )
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(row_to_intent).collect()
    }
}
