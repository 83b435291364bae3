use std::env;

use async_trait::async_trait;
use rand::prelude::{IndexedRandom, SliceRandom};
use sqlx::SqlitePool;

use crate::app::{
    db::{self, stores::NewStore, NewUser},
    domain::{Email, HashedPassword, OrganizationId, Password, StoreId, UserId},
    error::AppError,
    features::organization,
};
use crate::seeds::{Seed, SeedOutcome};

const UPPER: &[u8] = b"ABCDEFGHJKLMNPQRSTUVWXYZ";
const LOWER: &[u8] = b"abcdefghijkmnopqrstuvwxyz";
const DIGIT: &[u8] = b"23456789";

/// 15 characters with at least one of each class.
fn random_password() -> String {
    let mut rng = rand::rng();
    let pick = |set: &[u8], rng: &mut rand::rngs::ThreadRng| set.choose(rng).copied().unwrap_or(b'x') as char;
    let mut chars: Vec<char> = vec![
        pick(UPPER, &mut rng),
        pick(LOWER, &mut rng),
        pick(DIGIT, &mut rng),
    ];
    let all: Vec<u8> = UPPER.iter().chain(LOWER).chain(DIGIT).copied().collect();
    for _ in 0..12 {
        chars.push(pick(&all, &mut rng));
    }
    chars.shuffle(&mut rng);
    chars.into_iter().collect()
}

/// Demo owner with one salon and one store, for local development.
/// Runs only when `SEED_DEMO_OWNER_EMAIL` is set.
pub struct DemoSalon;

#[async_trait]
impl Seed for DemoSalon {
    fn version(&self) -> i64 {
        20260301090000
    }

    fn description(&self) -> &str {
        "demo_salon"
    }

    async fn run(&self, pool: &SqlitePool) -> Result<SeedOutcome, AppError> {
        let email = match env::var("SEED_DEMO_OWNER_EMAIL") {
            Ok(s) if !s.trim().is_empty() => s,
            _ => return Ok(SeedOutcome::Skipped),
        };
        let Ok(email) = Email::new(email) else {
            return Ok(SeedOutcome::Skipped);
        };
        if db::find_by_email(pool, &email).await?.is_some() {
            return Ok(SeedOutcome::Applied);
        }

        let plaintext = random_password();
        let password = Password::new(plaintext.clone()).map_err(|_| AppError::Internal)?;
        let password_hash = HashedPassword::from_password(&password).map_err(|_| AppError::Internal)?;
        let user_id = UserId::new();
        db::users::insert(
            pool,
            &NewUser {
                id: user_id.clone(),
                email: email.clone(),
                password_hash,
            },
        )
        .await?;

        let salon = organization::create_organization(pool, Some(&user_id), "デモサロン").await?;
        let organization_id = OrganizationId::from_string(&salon.id).map_err(|_| AppError::Internal)?;
        db::stores::insert(
            pool,
            &NewStore {
                id: StoreId::new(),
                organization_id,
                name: "本店".to_string(),
                address: "東京都渋谷区".to_string(),
            },
        )
        .await?;

        eprintln!(
            "Created demo owner: {} / {}",
            email.as_str(),
            plaintext
        );
        eprintln!("Demo organization id (DEFAULT_ORGANIZATION_ID): {}", salon.id);
        Ok(SeedOutcome::Applied)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn random_password_meets_strength_rules() {
        for _ in 0..20 {
            let p = random_password();
            assert_eq!(p.len(), 15);
            assert!(Password::new(p).is_ok());
        }
    }
}
