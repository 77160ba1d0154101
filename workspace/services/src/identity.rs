//! User accounts and role membership.
//!
//! The rest of the services only talk to [`IdentityProvider`]; the database
//! backed implementation keeps users and roles in the same store as the
//! domain tables and hashes passwords with argon2.

use argon2::{
    Argon2,
    password_hash::{PasswordHasher, SaltString, rand_core::OsRng},
};
use async_trait::async_trait;
use chrono::Utc;
use common::Role;
use model::entities::{user, user_role};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, Set,
    sea_query::{Expr, Func},
};
use tracing::{debug, info, instrument, warn};

use crate::error::{Result, ServiceError};

/// Minimum password length accepted by [`password_errors`].
pub const MIN_PASSWORD_LENGTH: usize = 6;

/// Input for [`IdentityProvider::create_user`].
#[derive(Debug, Clone)]
pub struct NewUser {
    pub full_name: String,
    pub email: String,
    pub password: String,
    pub phone: Option<String>,
}

#[async_trait]
pub trait IdentityProvider: Send + Sync {
    /// Looks a user up by id, deleted or not.
    async fn find_user(&self, user_id: i32) -> Result<Option<user::Model>>;

    /// Looks up a non-deleted user by email, ignoring case.
    async fn find_by_email(&self, email: &str) -> Result<Option<user::Model>>;

    /// Creates an account. Policy violations come back as
    /// [`ServiceError::Validation`].
    async fn create_user(&self, new_user: NewUser) -> Result<user::Model>;

    async fn update_user(
        &self,
        user_id: i32,
        full_name: String,
        email: String,
        phone: Option<String>,
    ) -> Result<user::Model>;

    /// Grants a role; granting a held role is a no-op.
    async fn add_role(&self, user_id: i32, role: Role) -> Result<()>;

    /// Revokes every role of the user.
    async fn remove_roles(&self, user_id: i32) -> Result<()>;

    /// Non-deleted users holding `role`, ordered by name.
    async fn users_in_role(&self, role: Role) -> Result<Vec<user::Model>>;

    async fn roles_for(&self, user_id: i32) -> Result<Vec<Role>>;
}

/// Returns one message per password rule the candidate breaks.
pub fn password_errors(password: &str) -> Vec<String> {
    let mut errors = Vec::new();
    if password.chars().count() < MIN_PASSWORD_LENGTH {
        errors.push(format!(
            "Passwords must be at least {} characters.",
            MIN_PASSWORD_LENGTH
        ));
    }
    if !password.chars().any(|c| c.is_ascii_digit()) {
        errors.push("Passwords must have at least one digit ('0'-'9').".to_string());
    }
    if !password.chars().any(|c| c.is_lowercase()) {
        errors.push("Passwords must have at least one lowercase ('a'-'z').".to_string());
    }
    if !password.chars().any(|c| c.is_uppercase()) {
        errors.push("Passwords must have at least one uppercase ('A'-'Z').".to_string());
    }
    if password.chars().all(|c| c.is_alphanumeric()) {
        errors.push("Passwords must have at least one non alphanumeric character.".to_string());
    }
    errors
}

/// Checks that `user_id` names a live account holding `role`, returning the
/// message to show otherwise.
pub(crate) async fn role_holder_error(
    identity: &dyn IdentityProvider,
    user_id: i32,
    role: Role,
) -> Result<Option<String>> {
    match identity.find_user(user_id).await? {
        Some(user) if !user.is_deleted => {
            if identity.roles_for(user_id).await?.contains(&role) {
                Ok(None)
            } else {
                Ok(Some(format!("Selected user is not in {} role.", role)))
            }
        }
        _ => Ok(Some("Selected user not found.".to_string())),
    }
}

fn profile_errors(full_name: &str, email: &str) -> Vec<String> {
    let mut errors = Vec::new();
    if full_name.trim().is_empty() {
        errors.push("Full name is required.".to_string());
    }
    let email = email.trim();
    if email.is_empty() {
        errors.push("Email is required.".to_string());
    } else if !email.contains('@') || email.starts_with('@') || email.ends_with('@') {
        errors.push(format!("Email '{}' is invalid.", email));
    }
    errors
}

/// [`IdentityProvider`] backed by the `users` and `user_roles` tables.
#[derive(Debug, Clone)]
pub struct DbIdentityProvider {
    db: DatabaseConnection,
}

impl DbIdentityProvider {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    fn hash_password(password: &str) -> Result<String> {
        let salt = SaltString::generate(&mut OsRng);
        Argon2::default()
            .hash_password(password.as_bytes(), &salt)
            .map(|hash| hash.to_string())
            .map_err(|e| ServiceError::Identity(format!("Failed to hash password: {}", e)))
    }

    async fn email_taken(&self, email: &str, except_user: Option<i32>) -> Result<bool> {
        Ok(match self.find_by_email(email).await? {
            Some(existing) => Some(existing.id) != except_user,
            None => false,
        })
    }
}

#[async_trait]
impl IdentityProvider for DbIdentityProvider {
    #[instrument(skip(self))]
    async fn find_user(&self, user_id: i32) -> Result<Option<user::Model>> {
        Ok(user::Entity::find_by_id(user_id).one(&self.db).await?)
    }

    #[instrument(skip(self))]
    async fn find_by_email(&self, email: &str) -> Result<Option<user::Model>> {
        let wanted = email.trim().to_lowercase();
        Ok(user::Entity::find()
            .filter(user::Column::IsDeleted.eq(false))
            .filter(Expr::expr(Func::lower(Expr::col(user::Column::Email))).eq(wanted))
            .one(&self.db)
            .await?)
    }

    #[instrument(skip(self, new_user), fields(email = %new_user.email))]
    async fn create_user(&self, new_user: NewUser) -> Result<user::Model> {
        let mut errors = profile_errors(&new_user.full_name, &new_user.email);
        errors.extend(password_errors(&new_user.password));
        if errors.is_empty() && self.email_taken(&new_user.email, None).await? {
            errors.push(format!("Email '{}' is already taken.", new_user.email.trim()));
        }
        if !errors.is_empty() {
            warn!("Rejected new user '{}': {:?}", new_user.email, errors);
            return Err(ServiceError::Validation(errors));
        }

        let password_hash = Self::hash_password(&new_user.password)?;
        let created = user::ActiveModel {
            full_name: Set(new_user.full_name.trim().to_string()),
            email: Set(new_user.email.trim().to_string()),
            password_hash: Set(password_hash),
            phone: Set(new_user.phone),
            is_deleted: Set(false),
            created_at: Set(Utc::now().naive_utc()),
            ..Default::default()
        }
        .insert(&self.db)
        .await?;

        info!("Created user {} <{}>", created.id, created.email);
        Ok(created)
    }

    #[instrument(skip(self))]
    async fn update_user(
        &self,
        user_id: i32,
        full_name: String,
        email: String,
        phone: Option<String>,
    ) -> Result<user::Model> {
        let existing = user::Entity::find_by_id(user_id)
            .one(&self.db)
            .await?
            .ok_or_else(|| ServiceError::not_found("User not found."))?;

        let mut errors = profile_errors(&full_name, &email);
        if errors.is_empty() && self.email_taken(&email, Some(user_id)).await? {
            errors.push(format!("Email '{}' is already taken.", email.trim()));
        }
        if !errors.is_empty() {
            return Err(ServiceError::Validation(errors));
        }

        let mut active: user::ActiveModel = existing.into();
        active.full_name = Set(full_name.trim().to_string());
        active.email = Set(email.trim().to_string());
        active.phone = Set(phone);
        let updated = active.update(&self.db).await?;
        debug!("Updated user {}", updated.id);
        Ok(updated)
    }

    #[instrument(skip(self))]
    async fn add_role(&self, user_id: i32, role: Role) -> Result<()> {
        let held = user_role::Entity::find()
            .filter(user_role::Column::UserId.eq(user_id))
            .filter(user_role::Column::Role.eq(role))
            .one(&self.db)
            .await?;
        if held.is_some() {
            debug!("User {} already holds role {}", user_id, role);
            return Ok(());
        }

        user_role::ActiveModel {
            user_id: Set(user_id),
            role: Set(role),
            ..Default::default()
        }
        .insert(&self.db)
        .await?;
        info!("Granted role {} to user {}", role, user_id);
        Ok(())
    }

    #[instrument(skip(self))]
    async fn remove_roles(&self, user_id: i32) -> Result<()> {
        let result = user_role::Entity::delete_many()
            .filter(user_role::Column::UserId.eq(user_id))
            .exec(&self.db)
            .await?;
        debug!("Revoked {} role(s) from user {}", result.rows_affected, user_id);
        Ok(())
    }

    #[instrument(skip(self))]
    async fn users_in_role(&self, role: Role) -> Result<Vec<user::Model>> {
        let users = user::Entity::find()
            .inner_join(user_role::Entity)
            .filter(user_role::Column::Role.eq(role))
            .filter(user::Column::IsDeleted.eq(false))
            .order_by_asc(user::Column::FullName)
            .all(&self.db)
            .await?;
        Ok(users)
    }

    #[instrument(skip(self))]
    async fn roles_for(&self, user_id: i32) -> Result<Vec<Role>> {
        let roles = user_role::Entity::find()
            .filter(user_role::Column::UserId.eq(user_id))
            .all(&self.db)
            .await?;
        Ok(roles.into_iter().map(|r| r.role).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::setup_db;

    fn new_user(email: &str, password: &str) -> NewUser {
        NewUser {
            full_name: "Grace Hopper".to_string(),
            email: email.to_string(),
            password: password.to_string(),
            phone: None,
        }
    }

    #[test]
    fn test_password_policy_reports_each_rule() {
        assert!(password_errors("Admin@123").is_empty());
        let errors = password_errors("abc");
        assert_eq!(errors.len(), 4);
        assert!(errors[0].contains("at least 6 characters"));
        assert_eq!(password_errors("abcdefG1").len(), 1);
    }

    #[tokio::test]
    async fn test_create_user_hashes_password_and_rejects_duplicates() {
        let db = setup_db().await;
        let identity = DbIdentityProvider::new(db.clone());

        let created = identity
            .create_user(new_user("grace@example.com", "Navy#1906"))
            .await
            .unwrap();
        assert_ne!(created.password_hash, "Navy#1906");
        assert!(created.password_hash.starts_with("$argon2"));

        let duplicate = identity
            .create_user(new_user("GRACE@example.com", "Navy#1906"))
            .await;
        match duplicate {
            Err(ServiceError::Validation(errors)) => {
                assert_eq!(errors, vec!["Email 'GRACE@example.com' is already taken.".to_string()]);
            }
            other => panic!("expected validation failure, got {:?}", other),
        }

        let weak = identity.create_user(new_user("weak@example.com", "short")).await;
        assert!(matches!(weak, Err(ServiceError::Validation(_))));
    }

    #[tokio::test]
    async fn test_email_lookup_ignores_case_and_deleted_accounts() {
        let db = setup_db().await;
        let identity = DbIdentityProvider::new(db.clone());
        let created = identity
            .create_user(new_user("Grace@Example.com", "Navy#1906"))
            .await
            .unwrap();

        let found = identity.find_by_email("  grace@EXAMPLE.com ").await.unwrap();
        assert_eq!(found.map(|u| u.id), Some(created.id));
        assert!(identity.find_by_email("grace@example.org").await.unwrap().is_none());

        crate::recycle::soft_delete::<user::Entity>(&db, created.id).await.unwrap();
        assert!(identity.find_by_email("grace@example.com").await.unwrap().is_none());
        // The address is free again once its owner is in the recycle bin
        identity
            .create_user(new_user("grace@example.com", "Navy#1906"))
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_roles_are_granted_once_and_listed() {
        let db = setup_db().await;
        let identity = DbIdentityProvider::new(db.clone());
        let user = identity
            .create_user(new_user("alan@example.com", "Enigma#42"))
            .await
            .unwrap();

        identity.add_role(user.id, Role::Faculty).await.unwrap();
        identity.add_role(user.id, Role::Faculty).await.unwrap();
        assert_eq!(identity.roles_for(user.id).await.unwrap(), vec![Role::Faculty]);

        let faculty = identity.users_in_role(Role::Faculty).await.unwrap();
        assert_eq!(faculty.len(), 1);
        assert!(identity.users_in_role(Role::Student).await.unwrap().is_empty());

        identity.remove_roles(user.id).await.unwrap();
        assert!(identity.roles_for(user.id).await.unwrap().is_empty());
    }
}
