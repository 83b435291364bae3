mod common;

use common::*;
use salonbook::seeds::{self, SEEDS_TABLE};

// One test function: the demo seed reads a process-wide env var.
#[tokio::test]
async fn demo_salon_seed_is_opt_in_and_idempotent() {
    let pool = test_pool().await;

    std::env::remove_var("SEED_DEMO_OWNER_EMAIL");
    seeds::run_seeds(&pool).await.unwrap();
    assert_eq!(count(&pool, SEEDS_TABLE).await, 0, "skipped seeds are not recorded");
    assert_eq!(count(&pool, "users").await, 0);

    std::env::set_var("SEED_DEMO_OWNER_EMAIL", "Demo@Salon.Example.jp");
    seeds::run_seeds(&pool).await.unwrap();
    seeds::run_seeds(&pool).await.unwrap();
    std::env::remove_var("SEED_DEMO_OWNER_EMAIL");

    assert_eq!(count(&pool, SEEDS_TABLE).await, 1);
    assert_eq!(count(&pool, "users").await, 1);
    assert_eq!(count(&pool, "organizations").await, 1);
    assert_eq!(count(&pool, "stores").await, 1);

    let role: String = sqlx::query_scalar(
        "SELECT m.role FROM organization_members m JOIN users u ON u.id = m.user_id WHERE u.email = ?",
    )
    .bind("demo@salon.example.jp")
    .fetch_one(&pool)
    .await
    .unwrap();
    assert_eq!(role, "owner");
}
