// apps/storefront/src/repos/postgres.rs

use super::{quantity_too_large, CartsRepo, CategoriesRepo, ProductsRepo, UsersRepo};
use crate::errors::{map_db_error, AppError, Result};
use crate::models::{
  Cart, CartLine, CartLookup, CartView, Category, CategoryWithProducts, NewUser, Product, ProductDraft,
  ProductSummary, User, UserChanges,
};
use async_trait::async_trait;
use rust_decimal::Decimal;
use sqlx::PgPool;
use std::collections::BTreeMap;
use tracing::{debug, instrument, warn};

const USER_COLUMNS: &str = "id, name, last_name, email, password_hash, role, phone_number, birth_date";
const PRODUCT_COLUMNS: &str = "id, name, price, image, category_id, seller_id";
/// SQLSTATE for `integer out of range` on the merged quantity.
const NUMERIC_OUT_OF_RANGE: &str = "22003";

pub struct PgStore {
  pool: PgPool,
}

impl PgStore {
  pub fn new(pool: PgPool) -> Self {
    Self { pool }
  }

  async fn find_cart(&self, user_id: i32) -> Result<Option<Cart>> {
    sqlx::query_as::<_, Cart>("SELECT id, user_id FROM carts WHERE user_id = $1")
      .bind(user_id)
      .fetch_optional(&self.pool)
      .await
      .map_err(AppError::Sqlx)
  }

  async fn load_cart_view(&self, cart: Cart) -> Result<CartView> {
    let rows: Vec<(i32, i32, i32, i32, String, Decimal, String)> = sqlx::query_as(
      "SELECT ci.id, ci.product_id, ci.quantity, p.id, p.name, p.price, p.image \
       FROM cart_items ci JOIN products p ON p.id = ci.product_id \
       WHERE ci.cart_id = $1 ORDER BY ci.id",
    )
    .bind(cart.id)
    .fetch_all(&self.pool)
    .await?;

    let lines = rows
      .into_iter()
      .map(|(id, product_id, quantity, pid, name, price, image)| CartLine {
        id,
        product_id,
        quantity,
        product: ProductSummary {
          id: pid,
          name,
          price,
          image,
        },
      })
      .collect();
    Ok(CartView::new(cart, lines))
  }
}

#[async_trait]
impl UsersRepo for PgStore {
  async fn list(&self) -> Result<Vec<User>> {
    let sql = format!("SELECT {USER_COLUMNS} FROM users ORDER BY id");
    Ok(sqlx::query_as::<_, User>(&sql).fetch_all(&self.pool).await?)
  }

  async fn find(&self, id: i32) -> Result<Option<User>> {
    let sql = format!("SELECT {USER_COLUMNS} FROM users WHERE id = $1");
    Ok(sqlx::query_as::<_, User>(&sql).bind(id).fetch_optional(&self.pool).await?)
  }

  async fn find_by_email(&self, email: &str) -> Result<Option<User>> {
    let sql = format!("SELECT {USER_COLUMNS} FROM users WHERE email = $1");
    Ok(sqlx::query_as::<_, User>(&sql).bind(email).fetch_optional(&self.pool).await?)
  }

  async fn email_taken(&self, email: &str, except_id: Option<i32>) -> Result<bool> {
    Ok(
      sqlx::query_scalar::<_, bool>(
        "SELECT EXISTS(SELECT 1 FROM users WHERE email = $1 AND ($2::int IS NULL OR id <> $2))",
      )
      .bind(email)
      .bind(except_id)
      .fetch_one(&self.pool)
      .await?,
    )
  }

  #[instrument(name = "pg::users::create", skip(self, new_user), fields(email = %new_user.email))]
  async fn create(&self, new_user: NewUser) -> Result<User> {
    let sql = format!(
      "INSERT INTO users (name, last_name, email, password_hash, role, phone_number, birth_date) \
       VALUES ($1, $2, $3, $4, $5, $6, $7) RETURNING {USER_COLUMNS}"
    );
    sqlx::query_as::<_, User>(&sql)
      .bind(&new_user.name)
      .bind(&new_user.last_name)
      .bind(&new_user.email)
      .bind(&new_user.password_hash)
      .bind(new_user.role.as_str())
      .bind(&new_user.phone_number)
      .bind(new_user.birth_date)
      .fetch_one(&self.pool)
      .await
      .map_err(map_db_error)
  }

  async fn update(&self, id: i32, changes: UserChanges) -> Result<Option<User>> {
    let sql = format!(
      "UPDATE users SET name = $2, last_name = $3, email = $4, phone_number = $5, birth_date = $6, role = $7 \
       WHERE id = $1 RETURNING {USER_COLUMNS}"
    );
    sqlx::query_as::<_, User>(&sql)
      .bind(id)
      .bind(&changes.name)
      .bind(&changes.last_name)
      .bind(&changes.email)
      .bind(&changes.phone_number)
      .bind(changes.birth_date)
      .bind(changes.role.as_str())
      .fetch_optional(&self.pool)
      .await
      .map_err(map_db_error)
  }

  async fn delete(&self, id: i32) -> Result<bool> {
    let result = sqlx::query("DELETE FROM users WHERE id = $1")
      .bind(id)
      .execute(&self.pool)
      .await?;
    Ok(result.rows_affected() > 0)
  }

  async fn count(&self) -> Result<i64> {
    Ok(sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM users").fetch_one(&self.pool).await?)
  }
}

#[async_trait]
impl CategoriesRepo for PgStore {
  #[instrument(name = "pg::categories::list_with_products", skip(self))]
  async fn list_with_products(&self) -> Result<Vec<CategoryWithProducts>> {
    let categories = sqlx::query_as::<_, Category>("SELECT id, name FROM categories ORDER BY id")
      .fetch_all(&self.pool)
      .await?;
    let products: Vec<(i32, i32, String, Decimal, String)> =
      sqlx::query_as("SELECT category_id, id, name, price, image FROM products ORDER BY id")
        .fetch_all(&self.pool)
        .await?;

    let mut by_category: BTreeMap<i32, Vec<ProductSummary>> = BTreeMap::new();
    for (category_id, id, name, price, image) in products {
      by_category
        .entry(category_id)
        .or_default()
        .push(ProductSummary { id, name, price, image });
    }
    debug!(categories = categories.len(), "Loaded categories with products.");

    Ok(
      categories
        .into_iter()
        .map(|c| CategoryWithProducts {
          products: by_category.remove(&c.id).unwrap_or_default(),
          id: c.id,
          name: c.name,
        })
        .collect(),
    )
  }

  async fn find(&self, id: i32) -> Result<Option<Category>> {
    Ok(
      sqlx::query_as::<_, Category>("SELECT id, name FROM categories WHERE id = $1")
        .bind(id)
        .fetch_optional(&self.pool)
        .await?,
    )
  }

  async fn create(&self, name: &str) -> Result<Category> {
    sqlx::query_as::<_, Category>("INSERT INTO categories (name) VALUES ($1) RETURNING id, name")
      .bind(name)
      .fetch_one(&self.pool)
      .await
      .map_err(map_db_error)
  }

  async fn rename(&self, id: i32, name: &str) -> Result<Option<Category>> {
    sqlx::query_as::<_, Category>("UPDATE categories SET name = $2 WHERE id = $1 RETURNING id, name")
      .bind(id)
      .bind(name)
      .fetch_optional(&self.pool)
      .await
      .map_err(map_db_error)
  }

  async fn product_count(&self, id: i32) -> Result<i64> {
    Ok(
      sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM products WHERE category_id = $1")
        .bind(id)
        .fetch_one(&self.pool)
        .await?,
    )
  }

  async fn delete(&self, id: i32) -> Result<bool> {
    let result = sqlx::query("DELETE FROM categories WHERE id = $1")
      .bind(id)
      .execute(&self.pool)
      .await;
    match result {
      Ok(done) => Ok(done.rows_affected() > 0),
      Err(sqlx::Error::Database(db_err)) if db_err.code().as_deref() == Some("23503") => {
        warn!(category_id = id, "Category delete blocked by referencing products.");
        Err(AppError::Conflict("Category still has products.".to_string()))
      }
      Err(e) => Err(AppError::Sqlx(e)),
    }
  }

  async fn count(&self) -> Result<i64> {
    Ok(sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM categories").fetch_one(&self.pool).await?)
  }
}

#[async_trait]
impl ProductsRepo for PgStore {
  async fn list(&self, category_id: Option<i32>) -> Result<Vec<Product>> {
    let sql = format!("SELECT {PRODUCT_COLUMNS} FROM products WHERE ($1::int IS NULL OR category_id = $1) ORDER BY id");
    Ok(
      sqlx::query_as::<_, Product>(&sql)
        .bind(category_id)
        .fetch_all(&self.pool)
        .await?,
    )
  }

  async fn list_by_seller(&self, seller_id: i32) -> Result<Vec<Product>> {
    let sql = format!("SELECT {PRODUCT_COLUMNS} FROM products WHERE seller_id = $1 ORDER BY id");
    Ok(
      sqlx::query_as::<_, Product>(&sql)
        .bind(seller_id)
        .fetch_all(&self.pool)
        .await?,
    )
  }

  async fn find(&self, id: i32) -> Result<Option<Product>> {
    let sql = format!("SELECT {PRODUCT_COLUMNS} FROM products WHERE id = $1");
    Ok(sqlx::query_as::<_, Product>(&sql).bind(id).fetch_optional(&self.pool).await?)
  }

  #[instrument(name = "pg::products::create", skip(self, draft), fields(name = %draft.name))]
  async fn create(&self, draft: ProductDraft, seller_id: Option<i32>) -> Result<Product> {
    let sql = format!(
      "INSERT INTO products (name, price, image, category_id, seller_id) VALUES ($1, $2, $3, $4, $5) \
       RETURNING {PRODUCT_COLUMNS}"
    );
    sqlx::query_as::<_, Product>(&sql)
      .bind(&draft.name)
      .bind(draft.price)
      .bind(&draft.image)
      .bind(draft.category_id)
      .bind(seller_id)
      .fetch_one(&self.pool)
      .await
      .map_err(map_db_error)
  }

  async fn update(&self, id: i32, draft: ProductDraft) -> Result<Option<Product>> {
    let sql = format!(
      "UPDATE products SET name = $2, price = $3, image = $4, category_id = $5 WHERE id = $1 \
       RETURNING {PRODUCT_COLUMNS}"
    );
    sqlx::query_as::<_, Product>(&sql)
      .bind(id)
      .bind(&draft.name)
      .bind(draft.price)
      .bind(&draft.image)
      .bind(draft.category_id)
      .fetch_optional(&self.pool)
      .await
      .map_err(map_db_error)
  }

  async fn delete(&self, id: i32) -> Result<bool> {
    let result = sqlx::query("DELETE FROM products WHERE id = $1")
      .bind(id)
      .execute(&self.pool)
      .await?;
    Ok(result.rows_affected() > 0)
  }

  async fn count(&self) -> Result<i64> {
    Ok(sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM products").fetch_one(&self.pool).await?)
  }
}

#[async_trait]
impl CartsRepo for PgStore {
  #[instrument(name = "pg::carts::add_item", skip(self))]
  async fn add_item(&self, user_id: i32, product_id: i32, quantity: i32) -> Result<CartView> {
    let mut tx = self.pool.begin().await?;

    // The no-op update makes RETURNING yield the existing row on conflict.
    let cart = sqlx::query_as::<_, Cart>(
      "INSERT INTO carts (user_id) VALUES ($1) \
       ON CONFLICT (user_id) DO UPDATE SET user_id = EXCLUDED.user_id RETURNING id, user_id",
    )
    .bind(user_id)
    .fetch_one(&mut *tx)
    .await
    .map_err(map_db_error)?;

    sqlx::query(
      "INSERT INTO cart_items (cart_id, product_id, quantity) VALUES ($1, $2, $3) \
       ON CONFLICT (cart_id, product_id) DO UPDATE SET quantity = cart_items.quantity + EXCLUDED.quantity",
    )
    .bind(cart.id)
    .bind(product_id)
    .bind(quantity)
    .execute(&mut *tx)
    .await
    .map_err(|e| {
      let overflowed = matches!(
        &e,
        sqlx::Error::Database(db_err) if db_err.code().as_deref() == Some(NUMERIC_OUT_OF_RANGE)
      );
      if overflowed {
        quantity_too_large()
      } else {
        map_db_error(e)
      }
    })?;

    tx.commit().await?;
    self.load_cart_view(cart).await
  }

  async fn find_by_user(&self, user_id: i32) -> Result<Option<CartView>> {
    match self.find_cart(user_id).await? {
      Some(cart) => Ok(Some(self.load_cart_view(cart).await?)),
      None => Ok(None),
    }
  }

  async fn set_quantity(&self, user_id: i32, product_id: i32, quantity: i32) -> Result<CartLookup> {
    let Some(cart) = self.find_cart(user_id).await? else {
      return Ok(CartLookup::NoCart);
    };
    let result = sqlx::query("UPDATE cart_items SET quantity = $3 WHERE cart_id = $1 AND product_id = $2")
      .bind(cart.id)
      .bind(product_id)
      .bind(quantity)
      .execute(&self.pool)
      .await?;
    if result.rows_affected() == 0 {
      return Ok(CartLookup::NoLine);
    }
    Ok(CartLookup::Found(self.load_cart_view(cart).await?))
  }

  async fn remove_item(&self, user_id: i32, product_id: i32) -> Result<CartLookup> {
    let Some(cart) = self.find_cart(user_id).await? else {
      return Ok(CartLookup::NoCart);
    };
    let result = sqlx::query("DELETE FROM cart_items WHERE cart_id = $1 AND product_id = $2")
      .bind(cart.id)
      .bind(product_id)
      .execute(&self.pool)
      .await?;
    if result.rows_affected() == 0 {
      return Ok(CartLookup::NoLine);
    }
    Ok(CartLookup::Found(self.load_cart_view(cart).await?))
  }
}
