use common::{
    DEFAULT_PERIOD, DayOfWeek, ScheduleDto, ScheduleFormOptions, ScheduleRequest, period_to_time,
    periods, time_to_period,
};
use model::entities::{class_schedule, class_section, enrollment};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, Set,
};
use tracing::{debug, info, instrument, warn};

use crate::class_section::ClassSectionService;
use crate::error::{Result, ServiceError};
use crate::lookup;
use crate::recycle;

/// Weekly schedule slots of class sections, entered by period index.
pub struct ScheduleService<'a> {
    db: &'a DatabaseConnection,
}

/// Keeps the slots that fall on `day`.
pub fn on_day(slots: Vec<ScheduleDto>, day: DayOfWeek) -> Vec<ScheduleDto> {
    slots.into_iter().filter(|s| s.day_of_week == day).collect()
}

fn normalize_room(room: Option<String>) -> Option<String> {
    room.map(|r| r.trim().to_string()).filter(|r| !r.is_empty())
}

impl<'a> ScheduleService<'a> {
    pub fn new(db: &'a DatabaseConnection) -> Self {
        Self { db }
    }

    async fn list(&self, deleted: bool) -> Result<Vec<ScheduleDto>> {
        let slots = class_schedule::Entity::find()
            .filter(class_schedule::Column::IsDeleted.eq(deleted))
            .order_by_asc(class_schedule::Column::DayOfWeek)
            .order_by_asc(class_schedule::Column::StartTime)
            .all(self.db)
            .await?;
        debug!("Found {} schedule slot(s) with is_deleted={}", slots.len(), deleted);
        lookup::schedule_views(self.db, slots).await
    }

    #[instrument(skip(self))]
    pub async fn list_active(&self) -> Result<Vec<ScheduleDto>> {
        self.list(false).await
    }

    #[instrument(skip(self))]
    pub async fn list_deleted(&self) -> Result<Vec<ScheduleDto>> {
        self.list(true).await
    }

    #[instrument(skip(self))]
    pub async fn get(&self, id: i32) -> Result<Option<ScheduleDto>> {
        let Some(slot) = class_schedule::Entity::find_by_id(id)
            .filter(class_schedule::Column::IsDeleted.eq(false))
            .one(self.db)
            .await?
        else {
            return Ok(None);
        };
        Ok(lookup::schedule_views(self.db, vec![slot]).await?.pop())
    }

    /// The stored slot as form input. A start time outside the period table
    /// is shown as the first period.
    #[instrument(skip(self))]
    pub async fn edit_form(&self, id: i32) -> Result<Option<ScheduleRequest>> {
        let slot = class_schedule::Entity::find_by_id(id)
            .filter(class_schedule::Column::IsDeleted.eq(false))
            .one(self.db)
            .await?;
        Ok(slot.map(|s| ScheduleRequest {
            class_section_id: s.class_section_id,
            day_of_week: s.day_of_week,
            period: time_to_period(s.start_time).unwrap_or(DEFAULT_PERIOD),
            room: s.room,
        }))
    }

    #[instrument(skip(self))]
    pub async fn form_options(&self) -> Result<ScheduleFormOptions> {
        Ok(ScheduleFormOptions {
            sections: ClassSectionService::new(self.db).section_options().await?,
            periods: periods(),
            days: DayOfWeek::ALL.to_vec(),
        })
    }

    async fn ensure_section(&self, section_id: i32) -> Result<()> {
        let section = class_section::Entity::find_by_id(section_id).one(self.db).await?;
        if section.is_some_and(|s| !s.is_deleted) {
            Ok(())
        } else {
            warn!("Schedule rejected: section {} not found", section_id);
            Err(ServiceError::validation("Selected class section not found."))
        }
    }

    #[instrument(skip(self))]
    pub async fn create(&self, request: ScheduleRequest) -> Result<ScheduleDto> {
        let (start, end) = period_to_time(request.period)?;
        self.ensure_section(request.class_section_id).await?;

        let created = class_schedule::ActiveModel {
            class_section_id: Set(request.class_section_id),
            day_of_week: Set(request.day_of_week),
            start_time: Set(start),
            end_time: Set(end),
            room: Set(normalize_room(request.room)),
            is_deleted: Set(false),
            ..Default::default()
        }
        .insert(self.db)
        .await?;

        info!(
            "Scheduled section {} on {:?} period {}",
            created.class_section_id, created.day_of_week, request.period
        );
        lookup::schedule_views(self.db, vec![created])
            .await?
            .pop()
            .ok_or_else(|| ServiceError::not_found("Schedule not found."))
    }

    #[instrument(skip(self))]
    pub async fn update(&self, id: i32, request: ScheduleRequest) -> Result<ScheduleDto> {
        let existing = class_schedule::Entity::find_by_id(id)
            .filter(class_schedule::Column::IsDeleted.eq(false))
            .one(self.db)
            .await?
            .ok_or_else(|| ServiceError::not_found("Schedule not found."))?;

        let (start, end) = period_to_time(request.period)?;
        self.ensure_section(request.class_section_id).await?;

        let mut active: class_schedule::ActiveModel = existing.into();
        active.class_section_id = Set(request.class_section_id);
        active.day_of_week = Set(request.day_of_week);
        active.start_time = Set(start);
        active.end_time = Set(end);
        active.room = Set(normalize_room(request.room));
        let updated = active.update(self.db).await?;

        info!("Updated schedule slot {}", updated.id);
        lookup::schedule_views(self.db, vec![updated])
            .await?
            .pop()
            .ok_or_else(|| ServiceError::not_found("Schedule not found."))
    }

    pub async fn soft_delete(&self, id: i32) -> Result<bool> {
        recycle::soft_delete::<class_schedule::Entity>(self.db, id).await
    }

    pub async fn restore(&self, id: i32) -> Result<bool> {
        recycle::restore::<class_schedule::Entity>(self.db, id).await
    }

    pub async fn hard_delete(&self, id: i32) -> Result<bool> {
        recycle::hard_delete::<class_schedule::Entity>(self.db, id).await
    }

    async fn slots_of_sections(&self, section_ids: Vec<i32>) -> Result<Vec<ScheduleDto>> {
        if section_ids.is_empty() {
            return Ok(Vec::new());
        }
        let active_sections: Vec<i32> = class_section::Entity::find()
            .filter(class_section::Column::Id.is_in(section_ids))
            .filter(class_section::Column::IsDeleted.eq(false))
            .all(self.db)
            .await?
            .into_iter()
            .map(|s| s.id)
            .collect();
        if active_sections.is_empty() {
            return Ok(Vec::new());
        }

        let slots = class_schedule::Entity::find()
            .filter(class_schedule::Column::ClassSectionId.is_in(active_sections))
            .filter(class_schedule::Column::IsDeleted.eq(false))
            .order_by_asc(class_schedule::Column::DayOfWeek)
            .order_by_asc(class_schedule::Column::StartTime)
            .all(self.db)
            .await?;
        lookup::schedule_views(self.db, slots).await
    }

    /// Slots of the active sections taught by the user's faculty profile.
    #[instrument(skip(self))]
    pub async fn faculty_schedule(&self, user_id: i32) -> Result<Vec<ScheduleDto>> {
        let Some(faculty) = lookup::active_faculty_for_user(self.db, user_id).await? else {
            debug!("User {} has no active faculty profile", user_id);
            return Ok(Vec::new());
        };
        let sections = class_section::Entity::find()
            .filter(class_section::Column::TeacherId.eq(faculty.id))
            .all(self.db)
            .await?
            .into_iter()
            .map(|s| s.id)
            .collect();
        self.slots_of_sections(sections).await
    }

    /// Slots of the active sections the user's student profile is enrolled in.
    #[instrument(skip(self))]
    pub async fn student_schedule(&self, user_id: i32) -> Result<Vec<ScheduleDto>> {
        let Some(student) = lookup::active_student_for_user(self.db, user_id).await? else {
            debug!("User {} has no active student profile", user_id);
            return Ok(Vec::new());
        };
        let sections = enrollment::Entity::find()
            .filter(enrollment::Column::StudentId.eq(student.id))
            .filter(enrollment::Column::IsDeleted.eq(false))
            .all(self.db)
            .await?
            .into_iter()
            .map(|e| e.class_section_id)
            .collect();
        self.slots_of_sections(sections).await
    }
}
