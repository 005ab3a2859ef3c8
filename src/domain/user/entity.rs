//! User entity and its client-facing view

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::entity::{Entity, EntityMeta};

pub const EMAIL_FIELD: &str = "email";
pub const PASSWORD_FIELD: &str = "password";
pub const COMPANY_ALIAS_FIELD: &str = "companyAlias";

/// Stored user account
#[derive(Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    #[serde(flatten)]
    meta: EntityMeta,
    /// Unique among active users
    email: String,
    /// Argon2 password hash. Stored, never part of [`UserView`].
    password: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    company_alias: Option<String>,
}

impl std::fmt::Debug for User {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("User")
            .field("meta", &self.meta)
            .field("email", &self.email)
            .field("password", &"[hidden]")
            .field("name", &self.name)
            .field("company_alias", &self.company_alias)
            .finish()
    }
}

impl User {
    /// Create an unsaved user
    pub fn new(email: impl Into<String>, password_hash: impl Into<String>) -> Self {
        Self {
            meta: EntityMeta::default(),
            email: email.into(),
            password: password_hash.into(),
            name: None,
            company_alias: None,
        }
    }

    pub fn with_name(mut self, name: Option<String>) -> Self {
        self.name = name;
        self
    }

    pub fn with_company_alias(mut self, company_alias: Option<String>) -> Self {
        self.company_alias = company_alias;
        self
    }

    // Getters

    pub fn email(&self) -> &str {
        &self.email
    }

    pub fn password_hash(&self) -> &str {
        &self.password
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub fn company_alias(&self) -> Option<&str> {
        self.company_alias.as_deref()
    }

    /// Members of the main company are administrators
    pub fn is_admin(&self, main_company_alias: &str) -> bool {
        !main_company_alias.is_empty() && self.company_alias() == Some(main_company_alias)
    }

    /// Sanitized view, without the password hash
    pub fn view(&self, main_company_alias: &str) -> UserView {
        UserView {
            id: self.meta.id.clone(),
            email: self.email.clone(),
            name: self.name.clone(),
            company_alias: self.company_alias.clone(),
            is_admin: self.is_admin(main_company_alias),
            active: self.meta.active,
            created_at: self.meta.created_at,
            updated_at: self.meta.updated_at,
        }
    }
}

impl Entity for User {
    fn meta(&self) -> &EntityMeta {
        &self.meta
    }

    fn required_fields() -> &'static [&'static str] {
        &[EMAIL_FIELD, PASSWORD_FIELD]
    }
}

/// Client-facing user representation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserView {
    pub id: String,
    pub email: String,
    pub name: Option<String>,
    pub company_alias: Option<String>,
    pub is_admin: bool,
    pub active: bool,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl UserView {
    /// Blank view carrying only the email, for a sign-up in progress
    pub fn draft(email: impl Into<String>) -> Self {
        Self {
            id: String::new(),
            email: email.into(),
            name: None,
            company_alias: None,
            is_admin: false,
            active: true,
            created_at: None,
            updated_at: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn create_test_user() -> User {
        User::new("ana@example.com", "$argon2id$hash")
            .with_name(Some("Ana".to_string()))
            .with_company_alias(Some("acme".to_string()))
    }

    #[test]
    fn test_user_creation() {
        let user = create_test_user();

        assert_eq!(user.email(), "ana@example.com");
        assert_eq!(user.password_hash(), "$argon2id$hash");
        assert_eq!(user.name(), Some("Ana"));
        assert!(user.is_active());
        assert!(user.id().is_empty());
    }

    #[test]
    fn test_is_admin_derived_from_company_alias() {
        let user = create_test_user();
        assert!(user.is_admin("acme"));
        assert!(!user.is_admin("other"));
        assert!(!User::new("x@y.com", "h").is_admin(""));
    }

    #[test]
    fn test_view_excludes_password() {
        let view = create_test_user().view("acme");
        let json = serde_json::to_string(&view).unwrap();

        assert!(view.is_admin);
        assert!(!json.contains("argon2"));
        assert!(!json.contains("password"));
    }

    #[test]
    fn test_stored_form_keeps_password() {
        let value = serde_json::to_value(create_test_user()).unwrap();
        assert_eq!(value["password"], "$argon2id$hash");
        assert_eq!(value["companyAlias"], "acme");
        assert_eq!(value["active"], true);
    }

    #[test]
    fn test_debug_hides_password() {
        let debug = format!("{:?}", create_test_user());
        assert!(!debug.contains("argon2"));
    }

    #[test]
    fn test_draft_view() {
        let draft = UserView::draft("new@example.com");
        assert_eq!(draft.email, "new@example.com");
        assert!(draft.id.is_empty());
        assert!(!draft.is_admin);
        assert!(draft.name.is_none());
    }
}
