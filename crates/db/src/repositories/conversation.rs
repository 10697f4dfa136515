use chrono::{DateTime, SecondsFormat, Utc};
use sqlx::{sqlite::SqliteRow, Row};

use frontdesk_core::domain::conversation::{
    ChatAnalytics, ChatMessage, IntentCount, MessageType, NewChatMessage,
};
use frontdesk_core::domain::intent::Confidence;
use frontdesk_core::domain::utterance::SessionId;

use super::{decode_error, ConversationRepository, RepositoryError};
use crate::DbPool;

const TOP_INTENT_LIMIT: i64 = 5;

pub struct SqlConversationRepository {
    pool: DbPool,
}

impl SqlConversationRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn row_to_chat_message(row: &SqliteRow) -> Result<ChatMessage, RepositoryError> {
    let message_type_raw: String = row.try_get("message_type").map_err(decode_error)?;
    let message_type = MessageType::parse(&message_type_raw).ok_or_else(|| {
        RepositoryError::Decode(format!("unknown message_type `{message_type_raw}`"))
    })?;
    let created_at_raw: String = row.try_get("created_at").map_err(decode_error)?;
    let created_at = DateTime::parse_from_rfc3339(&created_at_raw)
        .map_err(|error| {
            RepositoryError::Decode(format!("invalid created_at `{created_at_raw}`: {error}"))
        })?
        .with_timezone(&Utc);
    let confidence: f64 = row.try_get("confidence").map_err(decode_error)?;

    Ok(ChatMessage {
        id: row.try_get("id").map_err(decode_error)?,
        session_id: SessionId(row.try_get("session_id").map_err(decode_error)?),
        message_type,
        user_message: row.try_get("user_message").map_err(decode_error)?,
        bot_response: row.try_get("bot_response").map_err(decode_error)?,
        intent_detected: row.try_get("intent_detected").map_err(decode_error)?,
        confidence: Confidence::new(confidence).map_err(decode_error)?,
        created_at,
    })
}

#[async_trait::async_trait]
impl ConversationRepository for SqlConversationRepository {
    async fn insert_chat_message(&self, message: NewChatMessage) -> Result<i64, RepositoryError> {
        let created_at = Utc::now().to_rfc3339_opts(SecondsFormat::Micros, true);

        let result = sqlx::query(
            "INSERT INTO chat_messages
                (session_id, message_type, user_message, bot_response, intent_detected, confidence, created_at)
             VALUES (?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(&message.session_id.0)
        .bind(message.message_type.as_str())
        .bind(&message.user_message)
        .bind(&message.bot_response)
        .bind(&message.intent_detected)
        .bind(message.confidence.value())
        .bind(created_at)
        .execute(&self.pool)
        .await?;

        Ok(result.last_insert_rowid())
    }

    async fn chat_history(
        &self,
        session_id: &SessionId,
        limit: u32,
    ) -> Result<Vec<ChatMessage>, RepositoryError> {
        let rows = sqlx::query(
            "SELECT id, session_id, message_type, user_message, bot_response, intent_detected,
                    confidence, created_at
             FROM chat_messages
             WHERE session_id = ?
             ORDER BY created_at DESC, id DESC
             LIMIT ?",
        )
        .bind(&session_id.0)
        .bind(i64::from(limit))
        .fetch_all(&self.pool)
        .await?;

        let mut messages = rows.iter().map(row_to_chat_message).collect::<Result<Vec<_>, _>>()?;
        messages.reverse();
        Ok(messages)
    }

    async fn analytics(&self) -> Result<ChatAnalytics, RepositoryError> {
        let totals = sqlx::query(
            "SELECT COUNT(*) AS total_messages, COUNT(DISTINCT session_id) AS unique_sessions
             FROM chat_messages",
        )
        .fetch_one(&self.pool)
        .await?;

        let intent_rows = sqlx::query(
            "SELECT intent_detected AS intent, COUNT(*) AS count
             FROM chat_messages
             WHERE intent_detected IS NOT NULL
             GROUP BY intent_detected
             ORDER BY count DESC, intent ASC
             LIMIT ?",
        )
        .bind(TOP_INTENT_LIMIT)
        .fetch_all(&self.pool)
        .await?;

        let top_intents = intent_rows
            .iter()
            .map(|row| {
                Ok(IntentCount {
                    intent: row.try_get("intent").map_err(decode_error)?,
                    count: row.try_get("count").map_err(decode_error)?,
                })
            })
            .collect::<Result<Vec<_>, RepositoryError>>()?;

        Ok(ChatAnalytics {
            total_messages: totals.try_get("total_messages").map_err(decode_error)?,
            unique_sessions: totals.try_get("unique_sessions").map_err(decode_error)?,
            top_intents,
        })
    }
}

#[cfg(test)]
mod tests {
    use frontdesk_core::domain::conversation::{MessageType, NewChatMessage};
    use frontdesk_core::domain::intent::Confidence;
    use frontdesk_core::domain::utterance::SessionId;

    use super::SqlConversationRepository;
    use crate::repositories::ConversationRepository;
    use crate::{connect_with_settings, migrations, DbPool};

    async fn setup() -> DbPool {
        let pool = connect_with_settings("sqlite::memory:", 1, 30).await.expect("connect");
        migrations::run_pending(&pool).await.expect("migrations");
        pool
    }

    fn turn(session: &str, text: &str, intent: Option<&str>) -> NewChatMessage {
        NewChatMessage {
            session_id: SessionId(session.to_string()),
            message_type: MessageType::User,
            user_message: text.to_string(),
            bot_response: format!("respuesta a {text}"),
            intent_detected: intent.map(str::to_string),
            confidence: Confidence::MATCHED,
        }
    }

    #[tokio::test]
    async fn history_returns_latest_turns_in_chronological_order() {
        let pool = setup().await;
        let repo = SqlConversationRepository::new(pool.clone());

        for index in 0..5 {
            repo.insert_chat_message(turn("s-1", &format!("mensaje {index}"), Some("hours")))
                .await
                .expect("insert");
        }
        repo.insert_chat_message(turn("s-2", "otra sesión", None)).await.expect("insert");

        let history =
            repo.chat_history(&SessionId("s-1".to_string()), 3).await.expect("history");

        let texts: Vec<&str> = history.iter().map(|m| m.user_message.as_str()).collect();
        assert_eq!(texts, vec!["mensaje 2", "mensaje 3", "mensaje 4"]);
        assert!(history.iter().all(|m| m.session_id.0 == "s-1"));
        assert_eq!(history[0].message_type, MessageType::User);
        assert_eq!(history[0].confidence, Confidence::MATCHED);

        pool.close().await;
    }

    #[tokio::test]
    async fn unknown_session_has_empty_history() {
        let pool = setup().await;
        let repo = SqlConversationRepository::new(pool.clone());

        let history =
            repo.chat_history(&SessionId("nadie".to_string()), 20).await.expect("history");
        assert!(history.is_empty());

        pool.close().await;
    }

    #[tokio::test]
    async fn analytics_counts_sessions_and_ranks_intents() {
        let pool = setup().await;
        let repo = SqlConversationRepository::new(pool.clone());

        repo.insert_chat_message(turn("s-1", "horario de atención", Some("hours")))
            .await
            .expect("insert");
        repo.insert_chat_message(turn("s-1", "horario del sábado", Some("hours")))
            .await
            .expect("insert");
        repo.insert_chat_message(turn("s-2", "dónde están ubicados", Some("location")))
            .await
            .expect("insert");
        repo.insert_chat_message(turn("s-3", "una pregunta larga sin intención", None))
            .await
            .expect("insert");

        let analytics = repo.analytics().await.expect("analytics");

        assert_eq!(analytics.total_messages, 4);
        assert_eq!(analytics.unique_sessions, 3);
        assert_eq!(analytics.top_intents.len(), 2);
        assert_eq!(analytics.top_intents[0].intent, "hours");
        assert_eq!(analytics.top_intents[0].count, 2);

        pool.close().await;
    }
}
