use common::{CreateUserRequest, Role, UpdateUserRequest, UserDto};
use model::entities::user;
use sea_orm::{ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder};
use tracing::{debug, info, instrument};

use crate::error::{Result, ServiceError};
use crate::identity::{IdentityProvider, NewUser};
use crate::recycle;

/// Account administration. Every account holds exactly the one role picked
/// on the form, `Guest` when none is picked.
pub struct UserService<'a> {
    db: &'a DatabaseConnection,
    identity: &'a dyn IdentityProvider,
}

impl<'a> UserService<'a> {
    pub fn new(db: &'a DatabaseConnection, identity: &'a dyn IdentityProvider) -> Self {
        Self { db, identity }
    }

    async fn to_dto(&self, user: user::Model) -> Result<UserDto> {
        let mut roles = self.identity.roles_for(user.id).await?;
        roles.sort_by_key(|r| r.as_str());
        Ok(UserDto {
            id: user.id,
            full_name: user.full_name,
            email: user.email,
            phone: user.phone,
            roles,
            created_at: user.created_at,
            is_deleted: user.is_deleted,
        })
    }

    async fn list(&self, deleted: bool) -> Result<Vec<UserDto>> {
        let users = user::Entity::find()
            .filter(user::Column::IsDeleted.eq(deleted))
            .order_by_asc(user::Column::FullName)
            .all(self.db)
            .await?;
        debug!("Found {} user(s) with is_deleted={}", users.len(), deleted);

        let mut views = Vec::with_capacity(users.len());
        for user in users {
            views.push(self.to_dto(user).await?);
        }
        Ok(views)
    }

    #[instrument(skip(self))]
    pub async fn list_active(&self) -> Result<Vec<UserDto>> {
        self.list(false).await
    }

    #[instrument(skip(self))]
    pub async fn list_deleted(&self) -> Result<Vec<UserDto>> {
        self.list(true).await
    }

    #[instrument(skip(self))]
    pub async fn get(&self, id: i32) -> Result<Option<UserDto>> {
        match self.identity.find_user(id).await? {
            Some(user) if !user.is_deleted => Ok(Some(self.to_dto(user).await?)),
            _ => Ok(None),
        }
    }

    #[instrument(skip(self, request), fields(email = %request.email))]
    pub async fn create(&self, request: CreateUserRequest) -> Result<UserDto> {
        let role = request.role.unwrap_or(Role::Guest);
        let created = self
            .identity
            .create_user(NewUser {
                full_name: request.full_name,
                email: request.email,
                password: request.password,
                phone: request.phone,
            })
            .await?;
        self.identity.add_role(created.id, role).await?;

        info!("Created user {} as {}", created.id, role);
        self.to_dto(created).await
    }

    /// Updates the profile fields and replaces the role set with the selected
    /// role.
    #[instrument(skip(self))]
    pub async fn update(&self, id: i32, request: UpdateUserRequest) -> Result<UserDto> {
        match self.identity.find_user(id).await? {
            Some(existing) if !existing.is_deleted => {}
            _ => return Err(ServiceError::not_found("User not found.")),
        }

        let updated = self
            .identity
            .update_user(id, request.full_name, request.email, request.phone)
            .await?;
        let role = request.role.unwrap_or(Role::Guest);
        self.identity.remove_roles(id).await?;
        self.identity.add_role(id, role).await?;

        info!("Updated user {} with role {}", id, role);
        self.to_dto(updated).await
    }

    pub async fn soft_delete(&self, id: i32) -> Result<bool> {
        recycle::soft_delete::<user::Entity>(self.db, id).await
    }

    /// Restores an account unless its email was taken by an active account
    /// in the meantime.
    pub async fn restore(&self, id: i32) -> Result<bool> {
        let Some(existing) = self.identity.find_user(id).await? else {
            return Ok(false);
        };
        if existing.is_deleted {
            if let Some(other) = self.identity.find_by_email(&existing.email).await? {
                if other.id != id {
                    return Err(ServiceError::validation(format!(
                        "Email '{}' is already taken.",
                        existing.email
                    )));
                }
            }
        }
        recycle::restore::<user::Entity>(self.db, id).await
    }

    /// Removes the account with its roles and profiles. Fails with a
    /// database error while enrollments or submissions still reference it.
    pub async fn hard_delete(&self, id: i32) -> Result<bool> {
        recycle::hard_delete::<user::Entity>(self.db, id).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::identity::DbIdentityProvider;
    use crate::testing::*;

    fn new_account(email: &str, role: Option<Role>) -> CreateUserRequest {
        CreateUserRequest {
            full_name: "Katherine Johnson".to_string(),
            email: email.to_string(),
            password: "Orbit#1962".to_string(),
            phone: Some("555-0100".to_string()),
            role,
        }
    }

    #[tokio::test]
    async fn test_create_defaults_to_guest() {
        let db = setup_db().await;
        let identity = DbIdentityProvider::new(db.clone());
        let service = UserService::new(&db, &identity);

        let guest = service.create(new_account("kj@example.com", None)).await.unwrap();
        assert_eq!(guest.roles, vec![Role::Guest]);
        let teacher = service
            .create(new_account("kj2@example.com", Some(Role::Faculty)))
            .await
            .unwrap();
        assert_eq!(teacher.roles, vec![Role::Faculty]);

        let mut weak = new_account("kj3@example.com", None);
        weak.password = "password".to_string();
        match service.create(weak).await {
            Err(ServiceError::Validation(errors)) => assert_eq!(errors.len(), 3),
            other => panic!("expected password policy failure, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_update_replaces_roles() {
        let db = setup_db().await;
        let identity = DbIdentityProvider::new(db.clone());
        let service = UserService::new(&db, &identity);
        let created = service
            .create(new_account("kj@example.com", Some(Role::Student)))
            .await
            .unwrap();

        let updated = service
            .update(
                created.id,
                UpdateUserRequest {
                    full_name: "K. Johnson".to_string(),
                    email: "katherine@example.com".to_string(),
                    phone: None,
                    role: Some(Role::Admin),
                },
            )
            .await
            .unwrap();
        assert_eq!(updated.full_name, "K. Johnson");
        assert_eq!(updated.roles, vec![Role::Admin]);

        let cleared = service
            .update(
                created.id,
                UpdateUserRequest {
                    full_name: "K. Johnson".to_string(),
                    email: "katherine@example.com".to_string(),
                    phone: None,
                    role: None,
                },
            )
            .await
            .unwrap();
        assert_eq!(cleared.roles, vec![Role::Guest]);

        assert!(matches!(
            service
                .update(
                    404,
                    UpdateUserRequest {
                        full_name: "Nobody".to_string(),
                        email: "nobody@example.com".to_string(),
                        phone: None,
                        role: None,
                    },
                )
                .await,
            Err(ServiceError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_recycle_bin_and_email_reuse() {
        let db = setup_db().await;
        let identity = DbIdentityProvider::new(db.clone());
        let service = UserService::new(&db, &identity);
        let first = service.create(new_account("kj@example.com", None)).await.unwrap();

        assert!(service.soft_delete(first.id).await.unwrap());
        assert!(service.get(first.id).await.unwrap().is_none());
        assert_eq!(service.list_deleted().await.unwrap()[0].id, first.id);

        let second = service.create(new_account("kj@example.com", None)).await.unwrap();
        assert!(matches!(
            service.restore(first.id).await,
            Err(ServiceError::Validation(_))
        ));

        assert!(service.hard_delete(second.id).await.unwrap());
        assert!(service.restore(first.id).await.unwrap());
        assert_eq!(service.list_active().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_hard_delete_cascades_profile() {
        let db = setup_db().await;
        let identity = DbIdentityProvider::new(db.clone());
        let service = UserService::new(&db, &identity);
        let (user, _) = create_faculty(&db, "Gone Teacher").await;

        assert!(service.hard_delete(user.id).await.unwrap());
        assert!(model::entities::faculty::Entity::find().all(&db).await.unwrap().is_empty());
        assert!(identity.roles_for(user.id).await.unwrap().is_empty());
    }
}
