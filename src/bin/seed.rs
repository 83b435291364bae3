//! Apply versioned seeds: `seed [--force-all | --force <version>]`.

use std::env;
use std::time::Duration;

use dotenvy::dotenv;
use salonbook::app::config::Config;
use salonbook::seeds::{self, Seed, SeedOutcome};
use sqlx::sqlite::SqlitePoolOptions;
use sqlx::SqlitePool;

struct Flags {
    force_all: bool,
    force_version: Option<i64>,
}

impl Flags {
    fn parse(args: &[String]) -> Self {
        Self {
            force_all: args.iter().any(|a| a == "--force-all"),
            force_version: args
                .iter()
                .position(|a| a == "--force")
                .and_then(|i| args.get(i + 1))
                .and_then(|v| v.parse().ok()),
        }
    }

    fn forces(&self, version: i64) -> bool {
        self.force_all || self.force_version == Some(version)
    }
}

async fn apply(pool: &SqlitePool, seed: &dyn Seed, rerun: bool) {
    let (version, description) = (seed.version(), seed.description());
    if rerun {
        seeds::forget_seed(pool, version)
            .await
            .expect("Failed to untrack seed for re-run");
    }

    eprintln!("Running {description}...");
    match seed.run(pool).await {
        Ok(SeedOutcome::Applied) => {
            seeds::record_seed(pool, version, description)
                .await
                .expect("Failed to record seed");
            eprintln!("Done {description}");
        }
        Ok(SeedOutcome::Skipped) => eprintln!("Skipped {description} (preconditions not met)"),
        Err(err) => {
            eprintln!("Seed {description} failed: {err}");
            std::process::exit(1);
        }
    }
}

#[tokio::main]
async fn main() {
    dotenv().ok();
    let config = Config::from_env().unwrap_or_else(|err| {
        eprintln!("Failed to load config: {err}");
        std::process::exit(1);
    });

    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .acquire_timeout(Duration::from_secs(3))
        .connect(&config.database_url)
        .await
        .expect("Failed to connect to database");
    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .expect("Failed to run database migrations");
    seeds::ensure_seeds_table(&pool)
        .await
        .expect("Failed to create seeds table");

    let args: Vec<String> = env::args().collect();
    let flags = Flags::parse(&args);
    let applied = seeds::applied_versions(&pool)
        .await
        .expect("Failed to read applied seeds");

    for seed in seeds::all_seeds() {
        let done = applied.contains(&seed.version());
        let forced = flags.forces(seed.version());
        if done && !forced {
            eprintln!("Skipping {} (already applied)", seed.description());
            continue;
        }
        apply(&pool, seed.as_ref(), done).await;
    }
}
