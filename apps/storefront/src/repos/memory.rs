// apps/storefront/src/repos/memory.rs

use super::{quantity_too_large, CartsRepo, CategoriesRepo, ProductsRepo, UsersRepo};
use crate::errors::{AppError, Result};
use crate::models::{
  Cart, CartLine, CartLookup, CartView, Category, CategoryWithProducts, NewUser, Product, ProductDraft,
  ProductSummary, User, UserChanges,
};
use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::BTreeMap;

#[derive(Debug, Clone, Copy)]
struct CartItemRow {
  id: i32,
  cart_id: i32,
  product_id: i32,
  quantity: i32,
}

#[derive(Default)]
struct Tables {
  users: BTreeMap<i32, User>,
  categories: BTreeMap<i32, Category>,
  products: BTreeMap<i32, Product>,
  carts: BTreeMap<i32, Cart>,
  cart_items: BTreeMap<i32, CartItemRow>,
  last_id: i32,
}

impl Tables {
  /// One sequence shared by every table; ids only need to be unique per table.
  fn next_id(&mut self) -> i32 {
    self.last_id += 1;
    self.last_id
  }

  fn email_taken(&self, email: &str, except_id: Option<i32>) -> bool {
    self
      .users
      .values()
      .any(|u| u.email == email && Some(u.id) != except_id)
  }

  fn cart_of(&self, user_id: i32) -> Option<Cart> {
    self.carts.values().find(|c| c.user_id == user_id).copied()
  }

  fn line_of(&self, cart_id: i32, product_id: i32) -> Option<i32> {
    self
      .cart_items
      .values()
      .find(|i| i.cart_id == cart_id && i.product_id == product_id)
      .map(|i| i.id)
  }

  fn cart_view(&self, cart: Cart) -> CartView {
    let lines = self
      .cart_items
      .values()
      .filter(|i| i.cart_id == cart.id)
      .filter_map(|i| {
        self.products.get(&i.product_id).map(|p| CartLine {
          id: i.id,
          product_id: i.product_id,
          quantity: i.quantity,
          product: ProductSummary::from(p),
        })
      })
      .collect();
    CartView::new(cart, lines)
  }

  fn check_category(&self, category_id: i32) -> Result<()> {
    if self.categories.contains_key(&category_id) {
      Ok(())
    } else {
      Err(missing_reference())
    }
  }
}

fn missing_reference() -> AppError {
  AppError::Validation("A referenced record does not exist.".to_string())
}

fn duplicate_email() -> AppError {
  AppError::Validation("An account with this email already exists.".to_string())
}

/// All tables behind one mutex, so every operation is atomic and the same
/// constraints as the SQL schema are enforced here.
#[derive(Default)]
pub struct MemoryStore {
  tables: Mutex<Tables>,
}

#[async_trait]
impl UsersRepo for MemoryStore {
  async fn list(&self) -> Result<Vec<User>> {
    Ok(self.tables.lock().users.values().cloned().collect())
  }

  async fn find(&self, id: i32) -> Result<Option<User>> {
    Ok(self.tables.lock().users.get(&id).cloned())
  }

  async fn find_by_email(&self, email: &str) -> Result<Option<User>> {
    Ok(self.tables.lock().users.values().find(|u| u.email == email).cloned())
  }

  async fn email_taken(&self, email: &str, except_id: Option<i32>) -> Result<bool> {
    Ok(self.tables.lock().email_taken(email, except_id))
  }

  async fn create(&self, new_user: NewUser) -> Result<User> {
    let mut tables = self.tables.lock();
    if tables.email_taken(&new_user.email, None) {
      return Err(duplicate_email());
    }
    let user = User {
      id: tables.next_id(),
      name: new_user.name,
      last_name: new_user.last_name,
      email: new_user.email,
      password_hash: new_user.password_hash,
      role: new_user.role,
      phone_number: new_user.phone_number,
      birth_date: new_user.birth_date,
    };
    tables.users.insert(user.id, user.clone());
    Ok(user)
  }

  async fn update(&self, id: i32, changes: UserChanges) -> Result<Option<User>> {
    let mut tables = self.tables.lock();
    if !tables.users.contains_key(&id) {
      return Ok(None);
    }
    if tables.email_taken(&changes.email, Some(id)) {
      return Err(duplicate_email());
    }
    let Some(user) = tables.users.get_mut(&id) else {
      return Ok(None);
    };
    user.name = changes.name;
    user.last_name = changes.last_name;
    user.email = changes.email;
    user.phone_number = changes.phone_number;
    user.birth_date = changes.birth_date;
    user.role = changes.role;
    Ok(Some(user.clone()))
  }

  async fn delete(&self, id: i32) -> Result<bool> {
    let mut tables = self.tables.lock();
    if tables.users.remove(&id).is_none() {
      return Ok(false);
    }
    for product in tables.products.values_mut() {
      if product.seller_id == Some(id) {
        product.seller_id = None;
      }
    }
    if let Some(cart) = tables.cart_of(id) {
      tables.carts.remove(&cart.id);
      tables.cart_items.retain(|_, i| i.cart_id != cart.id);
    }
    Ok(true)
  }

  async fn count(&self) -> Result<i64> {
    Ok(self.tables.lock().users.len() as i64)
  }
}

#[async_trait]
impl CategoriesRepo for MemoryStore {
  async fn list_with_products(&self) -> Result<Vec<CategoryWithProducts>> {
    let tables = self.tables.lock();
    Ok(
      tables
        .categories
        .values()
        .map(|c| CategoryWithProducts {
          id: c.id,
          name: c.name.clone(),
          products: tables
            .products
            .values()
            .filter(|p| p.category_id == c.id)
            .map(ProductSummary::from)
            .collect(),
        })
        .collect(),
    )
  }

  async fn find(&self, id: i32) -> Result<Option<Category>> {
    Ok(self.tables.lock().categories.get(&id).cloned())
  }

  async fn create(&self, name: &str) -> Result<Category> {
    let mut tables = self.tables.lock();
    let category = Category {
      id: tables.next_id(),
      name: name.to_string(),
    };
    tables.categories.insert(category.id, category.clone());
    Ok(category)
  }

  async fn rename(&self, id: i32, name: &str) -> Result<Option<Category>> {
    let mut tables = self.tables.lock();
    Ok(tables.categories.get_mut(&id).map(|c| {
      c.name = name.to_string();
      c.clone()
    }))
  }

  async fn product_count(&self, id: i32) -> Result<i64> {
    Ok(
      self
        .tables
        .lock()
        .products
        .values()
        .filter(|p| p.category_id == id)
        .count() as i64,
    )
  }

  async fn delete(&self, id: i32) -> Result<bool> {
    let mut tables = self.tables.lock();
    if tables.products.values().any(|p| p.category_id == id) {
      return Err(AppError::Conflict("Category still has products.".to_string()));
    }
    Ok(tables.categories.remove(&id).is_some())
  }

  async fn count(&self) -> Result<i64> {
    Ok(self.tables.lock().categories.len() as i64)
  }
}

#[async_trait]
impl ProductsRepo for MemoryStore {
  async fn list(&self, category_id: Option<i32>) -> Result<Vec<Product>> {
    Ok(
      self
        .tables
        .lock()
        .products
        .values()
        .filter(|p| category_id.map_or(true, |c| p.category_id == c))
        .cloned()
        .collect(),
    )
  }

  async fn list_by_seller(&self, seller_id: i32) -> Result<Vec<Product>> {
    Ok(
      self
        .tables
        .lock()
        .products
        .values()
        .filter(|p| p.seller_id == Some(seller_id))
        .cloned()
        .collect(),
    )
  }

  async fn find(&self, id: i32) -> Result<Option<Product>> {
    Ok(self.tables.lock().products.get(&id).cloned())
  }

  async fn create(&self, draft: ProductDraft, seller_id: Option<i32>) -> Result<Product> {
    let mut tables = self.tables.lock();
    tables.check_category(draft.category_id)?;
    if let Some(seller) = seller_id {
      if !tables.users.contains_key(&seller) {
        return Err(missing_reference());
      }
    }
    let product = Product {
      id: tables.next_id(),
      name: draft.name,
      price: draft.price,
      image: draft.image,
      category_id: draft.category_id,
      seller_id,
    };
    tables.products.insert(product.id, product.clone());
    Ok(product)
  }

  async fn update(&self, id: i32, draft: ProductDraft) -> Result<Option<Product>> {
    let mut tables = self.tables.lock();
    if !tables.products.contains_key(&id) {
      return Ok(None);
    }
    tables.check_category(draft.category_id)?;
    Ok(tables.products.get_mut(&id).map(|p| {
      p.name = draft.name;
      p.price = draft.price;
      p.image = draft.image;
      p.category_id = draft.category_id;
      p.clone()
    }))
  }

  async fn delete(&self, id: i32) -> Result<bool> {
    let mut tables = self.tables.lock();
    if tables.products.remove(&id).is_none() {
      return Ok(false);
    }
    tables.cart_items.retain(|_, i| i.product_id != id);
    Ok(true)
  }

  async fn count(&self) -> Result<i64> {
    Ok(self.tables.lock().products.len() as i64)
  }
}

#[async_trait]
impl CartsRepo for MemoryStore {
  async fn add_item(&self, user_id: i32, product_id: i32, quantity: i32) -> Result<CartView> {
    let mut tables = self.tables.lock();
    if !tables.users.contains_key(&user_id) || !tables.products.contains_key(&product_id) {
      return Err(missing_reference());
    }

    let cart = match tables.cart_of(user_id) {
      Some(cart) => cart,
      None => {
        let cart = Cart {
          id: tables.next_id(),
          user_id,
        };
        tables.carts.insert(cart.id, cart);
        cart
      }
    };

    match tables.line_of(cart.id, product_id) {
      Some(line_id) => {
        if let Some(line) = tables.cart_items.get_mut(&line_id) {
          line.quantity = line.quantity.checked_add(quantity).ok_or_else(quantity_too_large)?;
        }
      }
      None => {
        let id = tables.next_id();
        tables.cart_items.insert(
          id,
          CartItemRow {
            id,
            cart_id: cart.id,
            product_id,
            quantity,
          },
        );
      }
    }
    Ok(tables.cart_view(cart))
  }

  async fn find_by_user(&self, user_id: i32) -> Result<Option<CartView>> {
    let tables = self.tables.lock();
    Ok(tables.cart_of(user_id).map(|cart| tables.cart_view(cart)))
  }

  async fn set_quantity(&self, user_id: i32, product_id: i32, quantity: i32) -> Result<CartLookup> {
    let mut tables = self.tables.lock();
    let Some(cart) = tables.cart_of(user_id) else {
      return Ok(CartLookup::NoCart);
    };
    let Some(line_id) = tables.line_of(cart.id, product_id) else {
      return Ok(CartLookup::NoLine);
    };
    if let Some(line) = tables.cart_items.get_mut(&line_id) {
      line.quantity = quantity;
    }
    Ok(CartLookup::Found(tables.cart_view(cart)))
  }

  async fn remove_item(&self, user_id: i32, product_id: i32) -> Result<CartLookup> {
    let mut tables = self.tables.lock();
    let Some(cart) = tables.cart_of(user_id) else {
      return Ok(CartLookup::NoCart);
    };
    let Some(line_id) = tables.line_of(cart.id, product_id) else {
      return Ok(CartLookup::NoLine);
    };
    tables.cart_items.remove(&line_id);
    Ok(CartLookup::Found(tables.cart_view(cart)))
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::models::Role;
  use rust_decimal::Decimal;

  fn new_user(email: &str) -> NewUser {
    NewUser {
      name: "Test".into(),
      last_name: "User".into(),
      email: email.into(),
      password_hash: "hash".into(),
      role: Role::User,
      phone_number: None,
      birth_date: None,
    }
  }

  fn draft(category_id: i32) -> ProductDraft {
    ProductDraft {
      name: "Mug".into(),
      price: Decimal::new(1250, 2),
      image: String::new(),
      category_id,
    }
  }

  #[tokio::test]
  async fn test_duplicate_email_is_rejected() {
    let store = MemoryStore::default();
    UsersRepo::create(&store, new_user("a@example.com")).await.unwrap();
    let err = UsersRepo::create(&store, new_user("a@example.com")).await.unwrap_err();
    assert!(matches!(err, AppError::Validation(_)));
  }

  #[tokio::test]
  async fn test_cart_lines_merge_and_cascade_on_product_delete() {
    let store = MemoryStore::default();
    let user = UsersRepo::create(&store, new_user("b@example.com")).await.unwrap();
    let cat = CategoriesRepo::create(&store, "Kitchen").await.unwrap();
    let product = ProductsRepo::create(&store, draft(cat.id), None).await.unwrap();

    store.add_item(user.id, product.id, 1).await.unwrap();
    let view = store.add_item(user.id, product.id, 2).await.unwrap();
    assert_eq!(view.cart_items.len(), 1);
    assert_eq!(view.cart_items[0].quantity, 3);
    assert_eq!(view.total, Decimal::new(3750, 2));

    assert!(ProductsRepo::delete(&store, product.id).await.unwrap());
    let view = store.find_by_user(user.id).await.unwrap().unwrap();
    assert!(view.cart_items.is_empty());
  }

  #[tokio::test]
  async fn test_merged_quantity_overflow_is_rejected_and_line_kept() {
    let store = MemoryStore::default();
    let user = UsersRepo::create(&store, new_user("big@example.com")).await.unwrap();
    let cat = CategoriesRepo::create(&store, "Bulk").await.unwrap();
    let product = ProductsRepo::create(&store, draft(cat.id), None).await.unwrap();

    store.add_item(user.id, product.id, i32::MAX).await.unwrap();
    let err = store.add_item(user.id, product.id, i32::MAX).await.unwrap_err();
    assert!(matches!(err, AppError::Validation(_)));

    let view = store.find_by_user(user.id).await.unwrap().unwrap();
    assert_eq!(view.cart_items[0].quantity, i32::MAX);
  }

  #[tokio::test]
  async fn test_category_with_products_cannot_be_deleted() {
    let store = MemoryStore::default();
    let cat = CategoriesRepo::create(&store, "Garden").await.unwrap();
    ProductsRepo::create(&store, draft(cat.id), None).await.unwrap();

    let err = CategoriesRepo::delete(&store, cat.id).await.unwrap_err();
    assert!(matches!(err, AppError::Conflict(_)));
  }

  #[tokio::test]
  async fn test_deleting_seller_clears_product_ownership() {
    let store = MemoryStore::default();
    let seller = UsersRepo::create(&store, new_user("s@example.com")).await.unwrap();
    let cat = CategoriesRepo::create(&store, "Books").await.unwrap();
    let product = ProductsRepo::create(&store, draft(cat.id), Some(seller.id)).await.unwrap();

    assert!(UsersRepo::delete(&store, seller.id).await.unwrap());
    let product = ProductsRepo::find(&store, product.id).await.unwrap().unwrap();
    assert_eq!(product.seller_id, None);
  }

  #[tokio::test]
  async fn test_cart_line_operations_report_missing_cart_and_line() {
    let store = MemoryStore::default();
    let user = UsersRepo::create(&store, new_user("c@example.com")).await.unwrap();
    assert_eq!(store.remove_item(user.id, 1).await.unwrap(), CartLookup::NoCart);

    let cat = CategoriesRepo::create(&store, "Toys").await.unwrap();
    let product = ProductsRepo::create(&store, draft(cat.id), None).await.unwrap();
    store.add_item(user.id, product.id, 1).await.unwrap();
    assert_eq!(
      store.set_quantity(user.id, product.id + 100, 2).await.unwrap(),
      CartLookup::NoLine
    );
  }
}
