//! User domain
//!
//! Account entity, its sanitized view, validation rules and the hashing seam.

mod entity;
mod hasher;
mod validation;

pub use entity::{User, UserView, COMPANY_ALIAS_FIELD, EMAIL_FIELD, PASSWORD_FIELD};
pub use hasher::PasswordHasher;
#[cfg(test)]
pub use hasher::mock;
pub use validation::{validate_email, validate_password, UserValidationError};
