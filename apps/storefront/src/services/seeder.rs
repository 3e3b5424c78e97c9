// apps/storefront/src/services/seeder.rs

//! Demo data for local runs, applied at startup when `SEED_DB=true`.

use crate::errors::Result;
use crate::models::{NewUser, ProductDraft, Role};
use crate::repos::Repos;
use crate::services::auth_service;
use chrono::{Duration, Utc};
use rust_decimal::Decimal;
use tracing::{info, instrument};
use uuid::Uuid;

pub const DEMO_PASSWORD: &str = "12345678";

const CATEGORY_NAMES: [&str; 3] = ["Clothing", "Footwear", "Electronics"];
const PRODUCTS: [(&str, i64, &str); 3] = [
  ("T-Shirt", 9990, "https://example.com/images/t-shirt.jpg"),
  ("Sneakers", 24950, "https://example.com/images/sneakers.jpg"),
  ("Laptop", 899999, "https://example.com/images/laptop.jpg"),
];
const FIRST_NAMES: [&str; 8] = ["Ayse", "Mehmet", "Elif", "Can", "Zeynep", "Emre", "Deniz", "Selin"];
const LAST_NAMES: [&str; 6] = ["Yilmaz", "Kaya", "Demir", "Sahin", "Celik", "Arslan"];

#[derive(Debug, Default, PartialEq, Eq)]
pub struct SeedReport {
  pub categories: usize,
  pub products: usize,
  pub users: usize,
}

/// Inserts only what is missing, so running it twice changes nothing.
#[instrument(name = "seeder::seed", skip(repos))]
pub async fn seed(repos: &Repos, target_user_count: usize) -> Result<SeedReport> {
  let mut report = SeedReport::default();

  if repos.categories.count().await? == 0 {
    let mut category_ids = Vec::with_capacity(CATEGORY_NAMES.len());
    for name in CATEGORY_NAMES {
      category_ids.push(repos.categories.create(name).await?.id);
      report.categories += 1;
    }

    if repos.products.count().await? == 0 {
      for ((name, cents, image), category_id) in PRODUCTS.into_iter().zip(category_ids) {
        let draft = ProductDraft {
          name: name.to_string(),
          price: Decimal::new(cents, 2),
          image: image.to_string(),
          category_id,
        };
        repos.products.create(draft, None).await?;
        report.products += 1;
      }
    }
  }

  let existing = usize::try_from(repos.users.count().await?).unwrap_or(0);
  if existing < target_user_count {
    let password_hash = auth_service::hash_password(DEMO_PASSWORD)?;
    for i in existing..target_user_count {
      repos.users.create(demo_user(i, &password_hash)).await?;
      report.users += 1;
    }
  }

  info!(?report, "Database seeding finished.");
  Ok(report)
}

fn demo_user(i: usize, password_hash: &str) -> NewUser {
  let name = FIRST_NAMES[i % FIRST_NAMES.len()];
  let last_name = LAST_NAMES[(i / FIRST_NAMES.len()) % LAST_NAMES.len()];
  let age_days = 365 * (18 + (i % 30) as i64) + (i as i64 * 37) % 365;

  NewUser {
    name: name.to_string(),
    last_name: last_name.to_string(),
    email: format!("{}.{}{}@example.com", name.to_lowercase(), last_name.to_lowercase(), Uuid::new_v4()),
    password_hash: password_hash.to_string(),
    role: Role::ALL[i % Role::ALL.len()],
    phone_number: Some(format!("5{:09}", (i as u64 * 7_919_993) % 1_000_000_000)),
    birth_date: Some(Utc::now() - Duration::days(age_days)),
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[tokio::test]
  async fn test_seeding_is_idempotent() {
    let repos = Repos::in_memory();

    let first = seed(&repos, 4).await.unwrap();
    assert_eq!(
      first,
      SeedReport {
        categories: 3,
        products: 3,
        users: 4
      }
    );

    let second = seed(&repos, 4).await.unwrap();
    assert_eq!(second, SeedReport::default());

    let laptop = repos
      .products
      .list(None)
      .await
      .unwrap()
      .into_iter()
      .find(|p| p.name == "Laptop")
      .unwrap();
    assert_eq!(laptop.price.to_string(), "8999.99");
  }

  #[tokio::test]
  async fn test_demo_users_can_log_in_and_rotate_roles() {
    let repos = Repos::in_memory();
    seed(&repos, 3).await.unwrap();

    let users = repos.users.list().await.unwrap();
    let roles: Vec<Role> = users.iter().map(|u| u.role).collect();
    assert_eq!(roles, vec![Role::User, Role::Seller, Role::Admin]);
    assert!(auth_service::verify_password(&users[0].password_hash, DEMO_PASSWORD).unwrap());
    assert!(users[0].email.ends_with("@example.com"));
  }
}
