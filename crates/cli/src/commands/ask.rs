use frontdesk_agent::{AssistantRuntime, Repositories};
use frontdesk_core::domain::intent::Confidence;
use serde_json::Value;

use crate::commands::{open_migrated_store, prepare, CommandResult};

/// Runs a single chat turn against the configured store. The exchange is
/// persisted only when a session is supplied and the filter keeps it.
pub fn run(message: &str, session: Option<&str>) -> CommandResult {
    let (config, runtime) = match prepare("ask") {
        Ok(prepared) => prepared,
        Err(result) => return result,
    };

    let result = runtime.block_on(async {
        let pool = open_migrated_store(&config).await?;
        let assistant = AssistantRuntime::new(Repositories::sql(pool.clone()))
            .with_history_limit(config.chat.history_limit);

        let turn = assistant
            .respond(message, session)
            .await
            .map_err(|error| ("invalid_message", error.to_string(), 2u8));

        pool.close().await;
        turn
    });

    match result {
        Ok(turn) if turn.reply.confidence == Confidence::NONE => {
            CommandResult::failure("ask", "store_failure", turn.reply.bot_response, 4)
        }
        Ok(turn) => match serde_json::to_value(&turn.reply) {
            Ok(mut data) => {
                data["persisted"] = Value::Bool(turn.persisted);
                CommandResult::success_with_data("ask", turn.reply.bot_response, Some(data))
            }
            Err(error) => CommandResult::failure("ask", "serialization", error.to_string(), 3),
        },
        Err(failure) => CommandResult::from_step("ask", failure),
    }
}
