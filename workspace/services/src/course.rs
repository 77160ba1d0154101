use chrono::Utc;
use common::{CourseDto, CourseOption, CourseRequest};
use model::entities::course;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, Set,
};
use tracing::{debug, info, instrument, warn};

use crate::error::{Result, ServiceError};
use crate::recycle;

/// Course catalogue with recycle bin.
pub struct CourseService<'a> {
    db: &'a DatabaseConnection,
}

impl<'a> CourseService<'a> {
    pub fn new(db: &'a DatabaseConnection) -> Self {
        Self { db }
    }

    async fn list(&self, deleted: bool) -> Result<Vec<CourseDto>> {
        let courses = course::Entity::find()
            .filter(course::Column::IsDeleted.eq(deleted))
            .order_by_asc(course::Column::Code)
            .all(self.db)
            .await?;
        debug!("Found {} course(s) with is_deleted={}", courses.len(), deleted);
        Ok(courses.into_iter().map(CourseDto::from).collect())
    }

    #[instrument(skip(self))]
    pub async fn list_active(&self) -> Result<Vec<CourseDto>> {
        self.list(false).await
    }

    #[instrument(skip(self))]
    pub async fn list_deleted(&self) -> Result<Vec<CourseDto>> {
        self.list(true).await
    }

    /// Returns a non-deleted course.
    #[instrument(skip(self))]
    pub async fn get(&self, id: i32) -> Result<Option<CourseDto>> {
        let found = course::Entity::find_by_id(id)
            .filter(course::Column::IsDeleted.eq(false))
            .one(self.db)
            .await?;
        Ok(found.map(CourseDto::from))
    }

    /// Active courses for select lists, ordered by name.
    #[instrument(skip(self))]
    pub async fn options(&self) -> Result<Vec<CourseOption>> {
        let courses = course::Entity::find()
            .filter(course::Column::IsDeleted.eq(false))
            .order_by_asc(course::Column::Name)
            .all(self.db)
            .await?;
        Ok(courses
            .into_iter()
            .map(|c| CourseOption {
                id: c.id,
                code: c.code,
                name: c.name,
            })
            .collect())
    }

    async fn code_in_use(&self, code: &str, except_id: Option<i32>) -> Result<bool> {
        let mut query = course::Entity::find()
            .filter(course::Column::IsDeleted.eq(false))
            .filter(course::Column::Code.eq(code));
        if let Some(id) = except_id {
            query = query.filter(course::Column::Id.ne(id));
        }
        Ok(query.one(self.db).await?.is_some())
    }

    async fn validate(&self, request: &CourseRequest, except_id: Option<i32>) -> Result<()> {
        let mut errors = Vec::new();
        if request.code.trim().is_empty() {
            errors.push("Course code is required.".to_string());
        }
        if request.name.trim().is_empty() {
            errors.push("Course name is required.".to_string());
        }
        if request.credits.is_some_and(|c| c < 0) {
            errors.push("Credits cannot be negative.".to_string());
        }
        if errors.is_empty() && self.code_in_use(request.code.trim(), except_id).await? {
            errors.push("Course code already exists.".to_string());
        }

        if errors.is_empty() {
            Ok(())
        } else {
            warn!("Course request rejected: {:?}", errors);
            Err(ServiceError::Validation(errors))
        }
    }

    #[instrument(skip(self))]
    pub async fn create(&self, request: CourseRequest) -> Result<CourseDto> {
        self.validate(&request, None).await?;

        let created = course::ActiveModel {
            code: Set(request.code.trim().to_string()),
            name: Set(request.name.trim().to_string()),
            description: Set(request.description),
            credits: Set(request.credits),
            created_at: Set(Utc::now().naive_utc()),
            is_deleted: Set(false),
            ..Default::default()
        }
        .insert(self.db)
        .await?;

        info!("Created course {} ({})", created.id, created.code);
        Ok(created.into())
    }

    #[instrument(skip(self))]
    pub async fn update(&self, id: i32, request: CourseRequest) -> Result<CourseDto> {
        let existing = course::Entity::find_by_id(id)
            .filter(course::Column::IsDeleted.eq(false))
            .one(self.db)
            .await?
            .ok_or_else(|| ServiceError::not_found("Course not found."))?;

        self.validate(&request, Some(id)).await?;

        let mut active: course::ActiveModel = existing.into();
        active.code = Set(request.code.trim().to_string());
        active.name = Set(request.name.trim().to_string());
        active.description = Set(request.description);
        active.credits = Set(request.credits);
        let updated = active.update(self.db).await?;

        info!("Updated course {}", updated.id);
        Ok(updated.into())
    }

    pub async fn soft_delete(&self, id: i32) -> Result<bool> {
        recycle::soft_delete::<course::Entity>(self.db, id).await
    }

    /// Restores a course unless an active course took its code meanwhile.
    pub async fn restore(&self, id: i32) -> Result<bool> {
        let Some(existing) = course::Entity::find_by_id(id).one(self.db).await? else {
            return Ok(false);
        };
        if existing.is_deleted && self.code_in_use(&existing.code, Some(id)).await? {
            return Err(ServiceError::validation("Course code already exists."));
        }
        recycle::restore::<course::Entity>(self.db, id).await
    }

    pub async fn hard_delete(&self, id: i32) -> Result<bool> {
        recycle::hard_delete::<course::Entity>(self.db, id).await
    }
}
