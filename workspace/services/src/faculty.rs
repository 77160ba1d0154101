use chrono::Utc;
use common::{FacultyDto, FacultyRequest, ProfileFormOptions, Role, UserOption};
use model::entities::{faculty, user};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, Set,
};
use std::collections::HashSet;
use tracing::{debug, info, instrument, warn};

use crate::error::{Result, ServiceError};
use crate::identity::{IdentityProvider, role_holder_error};
use crate::recycle;

/// Faculty profiles. Each one links a user holding the Faculty role.
pub struct FacultyService<'a> {
    db: &'a DatabaseConnection,
    identity: &'a dyn IdentityProvider,
}

fn to_dto(faculty: faculty::Model, user: user::Model) -> FacultyDto {
    FacultyDto {
        id: faculty.id,
        code: faculty.code(),
        user_id: faculty.user_id,
        full_name: user.full_name,
        email: user.email,
        phone: user.phone,
        department: faculty.department,
        title: faculty.title,
        created_at: faculty.created_at,
        is_deleted: faculty.is_deleted,
    }
}

impl<'a> FacultyService<'a> {
    pub fn new(db: &'a DatabaseConnection, identity: &'a dyn IdentityProvider) -> Self {
        Self { db, identity }
    }

    async fn list(&self, deleted: bool) -> Result<Vec<FacultyDto>> {
        let rows = faculty::Entity::find()
            .filter(faculty::Column::IsDeleted.eq(deleted))
            .find_also_related(user::Entity)
            .all(self.db)
            .await?;
        let mut faculty: Vec<FacultyDto> = rows
            .into_iter()
            .filter_map(|(f, u)| u.map(|u| to_dto(f, u)))
            .collect();
        faculty.sort_by(|a, b| a.full_name.cmp(&b.full_name).then(a.id.cmp(&b.id)));
        debug!("Found {} faculty profile(s) with is_deleted={}", faculty.len(), deleted);
        Ok(faculty)
    }

    #[instrument(skip(self))]
    pub async fn list_active(&self) -> Result<Vec<FacultyDto>> {
        self.list(false).await
    }

    #[instrument(skip(self))]
    pub async fn list_deleted(&self) -> Result<Vec<FacultyDto>> {
        self.list(true).await
    }

    #[instrument(skip(self))]
    pub async fn get(&self, id: i32) -> Result<Option<FacultyDto>> {
        let found = faculty::Entity::find_by_id(id)
            .filter(faculty::Column::IsDeleted.eq(false))
            .find_also_related(user::Entity)
            .one(self.db)
            .await?;
        Ok(found.and_then(|(f, u)| u.map(|u| to_dto(f, u))))
    }

    /// Users in the Faculty role who do not have an active profile yet. When
    /// editing, pass the profile's own user so it stays selectable.
    #[instrument(skip(self))]
    pub async fn form_options(&self, keep_user_id: Option<i32>) -> Result<ProfileFormOptions> {
        let linked: HashSet<i32> = faculty::Entity::find()
            .filter(faculty::Column::IsDeleted.eq(false))
            .all(self.db)
            .await?
            .into_iter()
            .map(|f| f.user_id)
            .collect();

        let users = self
            .identity
            .users_in_role(Role::Faculty)
            .await?
            .into_iter()
            .filter(|u| !linked.contains(&u.id) || Some(u.id) == keep_user_id)
            .map(|u| UserOption {
                id: u.id,
                full_name: u.full_name,
                email: u.email,
            })
            .collect();
        Ok(ProfileFormOptions { users })
    }

    async fn active_profile_for(&self, user_id: i32, except_id: Option<i32>) -> Result<bool> {
        let mut query = faculty::Entity::find()
            .filter(faculty::Column::IsDeleted.eq(false))
            .filter(faculty::Column::UserId.eq(user_id));
        if let Some(id) = except_id {
            query = query.filter(faculty::Column::Id.ne(id));
        }
        Ok(query.one(self.db).await?.is_some())
    }

    async fn validate(&self, user_id: i32, except_id: Option<i32>) -> Result<()> {
        if let Some(message) = role_holder_error(self.identity, user_id, Role::Faculty).await? {
            warn!("Faculty profile rejected for user {}: {}", user_id, message);
            return Err(ServiceError::validation(message));
        }
        if self.active_profile_for(user_id, except_id).await? {
            let message = match except_id {
                None => "This user already has a faculty profile.",
                Some(_) => "This user already has another faculty profile.",
            };
            warn!("Faculty profile rejected for user {}: {}", user_id, message);
            return Err(ServiceError::validation(message));
        }
        Ok(())
    }

    #[instrument(skip(self))]
    pub async fn create(&self, request: FacultyRequest) -> Result<FacultyDto> {
        self.validate(request.user_id, None).await?;

        let created = faculty::ActiveModel {
            user_id: Set(request.user_id),
            department: Set(request.department),
            title: Set(request.title),
            created_at: Set(Utc::now().naive_utc()),
            is_deleted: Set(false),
            ..Default::default()
        }
        .insert(self.db)
        .await?;

        info!("Created faculty profile {} for user {}", created.id, created.user_id);
        self.get(created.id)
            .await?
            .ok_or_else(|| ServiceError::not_found("Faculty profile not found."))
    }

    #[instrument(skip(self))]
    pub async fn update(&self, id: i32, request: FacultyRequest) -> Result<FacultyDto> {
        let existing = faculty::Entity::find_by_id(id)
            .filter(faculty::Column::IsDeleted.eq(false))
            .one(self.db)
            .await?
            .ok_or_else(|| ServiceError::not_found("Faculty profile not found."))?;

        self.validate(request.user_id, Some(id)).await?;

        let mut active: faculty::ActiveModel = existing.into();
        active.user_id = Set(request.user_id);
        active.department = Set(request.department);
        active.title = Set(request.title);
        let updated = active.update(self.db).await?;

        info!("Updated faculty profile {}", updated.id);
        self.get(updated.id)
            .await?
            .ok_or_else(|| ServiceError::not_found("Faculty profile not found."))
    }

    pub async fn soft_delete(&self, id: i32) -> Result<bool> {
        recycle::soft_delete::<faculty::Entity>(self.db, id).await
    }

    /// Restores a profile unless its user has been given another one since.
    pub async fn restore(&self, id: i32) -> Result<bool> {
        let Some(existing) = faculty::Entity::find_by_id(id).one(self.db).await? else {
            return Ok(false);
        };
        if existing.is_deleted && self.active_profile_for(existing.user_id, Some(id)).await? {
            return Err(ServiceError::validation(
                "This user already has another faculty profile.",
            ));
        }
        recycle::restore::<faculty::Entity>(self.db, id).await
    }

    pub async fn hard_delete(&self, id: i32) -> Result<bool> {
        recycle::hard_delete::<faculty::Entity>(self.db, id).await
    }
}
