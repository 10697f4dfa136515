use frontdesk_db::repositories::{
    EnrollmentRepository, IntentRepository, SqlEnrollmentRepository, SqlIntentRepository,
};
use frontdesk_db::{connect_with_settings, migrations, DbPool, SeedDataset};

type SeedContractTestResult<T = ()> = Result<T, String>;

macro_rules! require {
    ($cond:expr) => {
        if !$cond {
            return Err(format!("assertion failed: `{}`", stringify!($cond)));
        }
    };
    ($cond:expr, $($arg:tt)*) => {
        if !$cond {
            return Err(format!($($arg)*));
        }
    };
}

macro_rules! require_eq {
    ($left:expr, $right:expr) => {
        if $left != $right {
            return Err(format!(
                "assertion failed: `left == right` (`{:?}` != `{:?}`)",
                $left,
                $right
            ));
        }
    };
}

async fn seeded_pool() -> SeedContractTestResult<DbPool> {
    let pool = connect_with_settings("sqlite::memory:", 1, 30)
        .await
        .map_err(|error| format!("connect: {error}"))?;
    migrations::run_pending(&pool).await.map_err(|error| format!("migrate: {error}"))?;
    SeedDataset::load(&pool).await.map_err(|error| format!("seed: {error}"))?;
    Ok(pool)
}

#[tokio::test]
async fn seeded_intents_cover_every_local_keyword() -> SeedContractTestResult {
    let pool = seeded_pool().await?;
    let intents = SqlIntentRepository::new(pool.clone())
        .fetch_intents()
        .await
        .map_err(|error| error.to_string())?;

    for name in
        ["greeting", "services", "contact", "hours", "location", "pricing", "thanks", "goodbye"]
    {
        require!(
            intents.iter().any(|intent| intent.name == name),
            "intent `{name}` missing from seed data"
        );
    }
    require!(intents.iter().all(|intent| !intent.example_phrases.is_empty()));
    require!(intents.iter().all(|intent| !intent.response_template.trim().is_empty()));

    pool.close().await;
    Ok(())
}

#[tokio::test]
async fn seeded_enrollment_data_is_internally_consistent() -> SeedContractTestResult {
    let pool = seeded_pool().await?;
    let repo = SqlEnrollmentRepository::new(pool.clone());

    let statistics = repo
        .fetch_statistics()
        .await
        .map_err(|error| error.to_string())?
        .ok_or_else(|| "seeded store should have statistics".to_string())?;
    require!(statistics.is_consistent());
    require_eq!(statistics.total, 7);
    require_eq!(statistics.pending, 3);

    let headcount: i64 = statistics.by_career.iter().map(|entry| entry.count).sum();
    require_eq!(headcount, statistics.total);

    let pending = repo.fetch_pending_enrollment_students().await.map_err(|e| e.to_string())?;
    require_eq!(pending.len() as i64, statistics.pending);
    require!(pending.windows(2).all(|pair| pair[0].enrolled_on >= pair[1].enrolled_on));

    let careers = repo.fetch_careers().await.map_err(|error| error.to_string())?;
    require_eq!(careers.len(), 3);
    require!(careers.iter().all(|career| career.active));

    pool.close().await;
    Ok(())
}
