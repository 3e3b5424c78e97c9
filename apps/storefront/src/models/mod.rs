// apps/storefront/src/models/mod.rs

//! Data structures representing database entities and the response shapes built from them.

pub mod cart;
pub mod category;
pub mod product;
pub mod user;

pub use cart::{Cart, CartLine, CartLookup, CartView};
pub use category::{Category, CategoryWithProducts};
pub use product::{Product, ProductDraft, ProductSummary};
pub use user::{NewUser, Role, User, UserChanges};
