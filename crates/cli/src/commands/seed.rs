use crate::commands::{open_migrated_store, prepare, CommandResult, StepFailure};
use frontdesk_db::{SeedDataset, TableSeedInfo};

pub fn run() -> CommandResult {
    let (config, runtime) = match prepare("seed") {
        Ok(prepared) => prepared,
        Err(result) => return result,
    };

    let result = runtime.block_on(async {
        let pool = open_migrated_store(&config).await?;

        let seed_result = SeedDataset::load(&pool)
            .await
            .map_err(|error| ("seed_execution", error.to_string(), 5u8))?;

        let verification = SeedDataset::verify(&pool)
            .await
            .map_err(|error| ("seed_verification", error.to_string(), 6u8))?;

        let run_result: Result<Vec<TableSeedInfo>, StepFailure> = if verification.all_present {
            Ok(seed_result.tables_seeded)
        } else {
            Err(("seed_verification", verification_failure_message(&verification.checks), 6u8))
        };

        pool.close().await;
        run_result
    });

    match result {
        Ok(tables) => {
            let lines: Vec<String> = tables
                .iter()
                .map(|table| format!("  - {}: {} rows", table.label, table.expected_rows))
                .collect();
            CommandResult::success(
                "seed",
                format!("demo dataset loaded and verified:\n{}", lines.join("\n")),
            )
        }
        Err(failure) => CommandResult::from_step("seed", failure),
    }
}

fn verification_failure_message(checks: &[(&'static str, bool)]) -> String {
    let failed_checks = checks
        .iter()
        .filter_map(|(check, passed)| (!passed).then_some(*check))
        .collect::<Vec<_>>();

    if failed_checks.is_empty() {
        "Some seed data failed to load".to_string()
    } else {
        format!("Seed verification failed for checks: {}", failed_checks.join(", "))
    }
}

#[cfg(test)]
mod tests {
    use super::verification_failure_message;

    #[test]
    fn verification_error_message_targets_failed_checks() {
        let checks = [
            ("common-intents", true),
            ("carreras-activas", false),
            ("estudiantes-pendientes", false),
        ];

        assert_eq!(
            verification_failure_message(&checks),
            "Seed verification failed for checks: carreras-activas, estudiantes-pendientes"
        );
    }

    #[test]
    fn verification_error_message_falls_back_to_generic_when_no_labels() {
        let checks = [("common-intents", true), ("estudiantes", true)];

        assert_eq!(verification_failure_message(&checks), "Some seed data failed to load");
    }
}
