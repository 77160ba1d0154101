use chrono::Utc;
use common::{ProfileFormOptions, Role, StudentDto, StudentOption, StudentRequest, UserOption};
use model::entities::{student, user};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, Set,
};
use std::collections::HashSet;
use tracing::{debug, info, instrument, warn};

use crate::error::{Result, ServiceError};
use crate::identity::{IdentityProvider, role_holder_error};
use crate::recycle;

pub struct StudentService<'a> {
    db: &'a DatabaseConnection,
    identity: &'a dyn IdentityProvider,
}

fn to_dto(student: student::Model, user: user::Model) -> StudentDto {
    StudentDto {
        id: student.id,
        code: student.code(),
        user_id: student.user_id,
        full_name: user.full_name,
        email: user.email,
        phone: user.phone,
        created_at: student.created_at,
        is_deleted: student.is_deleted,
    }
}

/// Active students whose user is not deleted, ordered by name.
pub(crate) async fn active_students(db: &DatabaseConnection) -> Result<Vec<(student::Model, user::Model)>> {
    let mut rows: Vec<(student::Model, user::Model)> = student::Entity::find()
        .filter(student::Column::IsDeleted.eq(false))
        .find_also_related(user::Entity)
        .all(db)
        .await?
        .into_iter()
        .filter_map(|(s, u)| u.filter(|u| !u.is_deleted).map(|u| (s, u)))
        .collect();
    rows.sort_by(|a, b| a.1.full_name.cmp(&b.1.full_name).then(a.0.id.cmp(&b.0.id)));
    Ok(rows)
}

pub(crate) fn student_option(student: &student::Model, user: &user::Model) -> StudentOption {
    StudentOption {
        id: student.id,
        code: student.code(),
        full_name: user.full_name.clone(),
        email: user.email.clone(),
    }
}

impl<'a> StudentService<'a> {
    pub fn new(db: &'a DatabaseConnection, identity: &'a dyn IdentityProvider) -> Self {
        Self { db, identity }
    }

    async fn list(&self, deleted: bool) -> Result<Vec<StudentDto>> {
        let rows = student::Entity::find()
            .filter(student::Column::IsDeleted.eq(deleted))
            .find_also_related(user::Entity)
            .all(self.db)
            .await?;
        let mut students: Vec<StudentDto> = rows
            .into_iter()
            .filter_map(|(s, u)| u.map(|u| to_dto(s, u)))
            .collect();
        students.sort_by(|a, b| a.full_name.cmp(&b.full_name).then(a.id.cmp(&b.id)));
        debug!("Found {} student(s) with is_deleted={}", students.len(), deleted);
        Ok(students)
    }

    #[instrument(skip(self))]
    pub async fn list_active(&self) -> Result<Vec<StudentDto>> {
        self.list(false).await
    }

    #[instrument(skip(self))]
    pub async fn list_deleted(&self) -> Result<Vec<StudentDto>> {
        self.list(true).await
    }

    #[instrument(skip(self))]
    pub async fn get(&self, id: i32) -> Result<Option<StudentDto>> {
        let found = student::Entity::find_by_id(id)
            .filter(student::Column::IsDeleted.eq(false))
            .find_also_related(user::Entity)
            .one(self.db)
            .await?;
        Ok(found.and_then(|(s, u)| u.map(|u| to_dto(s, u))))
    }

    /// Active students for select lists.
    #[instrument(skip(self))]
    pub async fn options(&self) -> Result<Vec<StudentOption>> {
        Ok(active_students(self.db)
            .await?
            .iter()
            .map(|(s, u)| student_option(s, u))
            .collect())
    }

    /// Users in the Student role without an active student profile, plus
    /// `keep_user_id` when editing.
    #[instrument(skip(self))]
    pub async fn form_options(&self, keep_user_id: Option<i32>) -> Result<ProfileFormOptions> {
        let linked: HashSet<i32> = student::Entity::find()
            .filter(student::Column::IsDeleted.eq(false))
            .all(self.db)
            .await?
            .into_iter()
            .map(|s| s.user_id)
            .collect();

        let users = self
            .identity
            .users_in_role(Role::Student)
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

    async fn linked_elsewhere(&self, user_id: i32, except_id: Option<i32>) -> Result<bool> {
        let mut query = student::Entity::find()
            .filter(student::Column::IsDeleted.eq(false))
            .filter(student::Column::UserId.eq(user_id));
        if let Some(id) = except_id {
            query = query.filter(student::Column::Id.ne(id));
        }
        Ok(query.one(self.db).await?.is_some())
    }

    async fn validate(&self, user_id: i32, except_id: Option<i32>) -> Result<()> {
        let message = match role_holder_error(self.identity, user_id, Role::Student).await? {
            Some(message) => Some(message),
            None if self.linked_elsewhere(user_id, except_id).await? => Some(
                match except_id {
                    None => "This user already has a student profile.",
                    Some(_) => "This user is already linked to another student.",
                }
                .to_string(),
            ),
            None => None,
        };
        match message {
            Some(message) => {
                warn!("Student profile rejected for user {}: {}", user_id, message);
                Err(ServiceError::validation(message))
            }
            None => Ok(()),
        }
    }

    #[instrument(skip(self))]
    pub async fn create(&self, request: StudentRequest) -> Result<StudentDto> {
        self.validate(request.user_id, None).await?;

        let created = student::ActiveModel {
            user_id: Set(request.user_id),
            created_at: Set(Utc::now().naive_utc()),
            is_deleted: Set(false),
            ..Default::default()
        }
        .insert(self.db)
        .await?;

        info!("Created student {} for user {}", created.code(), created.user_id);
        self.get(created.id)
            .await?
            .ok_or_else(|| ServiceError::not_found("Student not found."))
    }

    #[instrument(skip(self))]
    pub async fn update(&self, id: i32, request: StudentRequest) -> Result<StudentDto> {
        let existing = student::Entity::find_by_id(id)
            .filter(student::Column::IsDeleted.eq(false))
            .one(self.db)
            .await?
            .ok_or_else(|| ServiceError::not_found("Student not found."))?;

        self.validate(request.user_id, Some(id)).await?;

        let mut active: student::ActiveModel = existing.into();
        active.user_id = Set(request.user_id);
        let updated = active.update(self.db).await?;

        info!("Updated student {}", updated.code());
        self.get(updated.id)
            .await?
            .ok_or_else(|| ServiceError::not_found("Student not found."))
    }

    pub async fn soft_delete(&self, id: i32) -> Result<bool> {
        recycle::soft_delete::<student::Entity>(self.db, id).await
    }

    pub async fn restore(&self, id: i32) -> Result<bool> {
        let Some(existing) = student::Entity::find_by_id(id).one(self.db).await? else {
            return Ok(false);
        };
        if existing.is_deleted && self.linked_elsewhere(existing.user_id, Some(id)).await? {
            return Err(ServiceError::validation(
                "This user is already linked to another student.",
            ));
        }
        recycle::restore::<student::Entity>(self.db, id).await
    }

    /// Fails with a database error while submissions still reference the
    /// student.
    pub async fn hard_delete(&self, id: i32) -> Result<bool> {
        recycle::hard_delete::<student::Entity>(self.db, id).await
    }
}
