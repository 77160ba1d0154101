//! Batched loaders used to assemble view models without N+1 queries.

use common::{ClassSectionDto, ScheduleDto, time_to_period};
use model::entities::{class_schedule, class_section, course, faculty, student, user};
use sea_orm::{ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter};
use std::collections::{HashMap, HashSet};

use crate::error::Result;

fn distinct(ids: impl IntoIterator<Item = i32>) -> Vec<i32> {
    ids.into_iter().collect::<HashSet<_>>().into_iter().collect()
}

pub(crate) async fn courses_by_id(
    db: &DatabaseConnection,
    ids: impl IntoIterator<Item = i32>,
) -> Result<HashMap<i32, course::Model>> {
    let ids = distinct(ids);
    if ids.is_empty() {
        return Ok(HashMap::new());
    }
    let courses = course::Entity::find()
        .filter(course::Column::Id.is_in(ids))
        .all(db)
        .await?;
    Ok(courses.into_iter().map(|c| (c.id, c)).collect())
}

pub(crate) async fn sections_by_id(
    db: &DatabaseConnection,
    ids: impl IntoIterator<Item = i32>,
) -> Result<HashMap<i32, class_section::Model>> {
    let ids = distinct(ids);
    if ids.is_empty() {
        return Ok(HashMap::new());
    }
    let sections = class_section::Entity::find()
        .filter(class_section::Column::Id.is_in(ids))
        .all(db)
        .await?;
    Ok(sections.into_iter().map(|s| (s.id, s)).collect())
}

/// Maps faculty ids to the full name of their user.
pub(crate) async fn teacher_names(
    db: &DatabaseConnection,
    faculty_ids: impl IntoIterator<Item = i32>,
) -> Result<HashMap<i32, String>> {
    let ids = distinct(faculty_ids);
    if ids.is_empty() {
        return Ok(HashMap::new());
    }
    let faculties = faculty::Entity::find()
        .filter(faculty::Column::Id.is_in(ids))
        .find_also_related(user::Entity)
        .all(db)
        .await?;
    Ok(faculties
        .into_iter()
        .map(|(f, u)| (f.id, u.map(|u| u.full_name).unwrap_or_default()))
        .collect())
}

/// Maps student ids to the student row and its user.
pub(crate) async fn students_by_id(
    db: &DatabaseConnection,
    ids: impl IntoIterator<Item = i32>,
) -> Result<HashMap<i32, (student::Model, user::Model)>> {
    let ids = distinct(ids);
    if ids.is_empty() {
        return Ok(HashMap::new());
    }
    let students = student::Entity::find()
        .filter(student::Column::Id.is_in(ids))
        .find_also_related(user::Entity)
        .all(db)
        .await?;
    Ok(students
        .into_iter()
        .filter_map(|(s, u)| u.map(|u| (s.id, (s, u))))
        .collect())
}

/// The caller's non-deleted faculty profile.
pub(crate) async fn active_faculty_for_user(
    db: &DatabaseConnection,
    user_id: i32,
) -> Result<Option<faculty::Model>> {
    Ok(faculty::Entity::find()
        .filter(faculty::Column::UserId.eq(user_id))
        .filter(faculty::Column::IsDeleted.eq(false))
        .one(db)
        .await?)
}

/// The caller's non-deleted student profile.
pub(crate) async fn active_student_for_user(
    db: &DatabaseConnection,
    user_id: i32,
) -> Result<Option<student::Model>> {
    Ok(student::Entity::find()
        .filter(student::Column::UserId.eq(user_id))
        .filter(student::Column::IsDeleted.eq(false))
        .one(db)
        .await?)
}

pub(crate) async fn section_views(
    db: &DatabaseConnection,
    sections: Vec<class_section::Model>,
) -> Result<Vec<ClassSectionDto>> {
    let courses = courses_by_id(db, sections.iter().map(|s| s.course_id)).await?;
    let teachers = teacher_names(db, sections.iter().map(|s| s.teacher_id)).await?;

    Ok(sections
        .into_iter()
        .map(|s| {
            let course = courses.get(&s.course_id);
            ClassSectionDto {
                id: s.id,
                code: s.code,
                name: s.name,
                course_id: s.course_id,
                course_code: course.map(|c| c.code.clone()).unwrap_or_default(),
                course_name: course.map(|c| c.name.clone()).unwrap_or_default(),
                credits: course.and_then(|c| c.credits),
                teacher_id: s.teacher_id,
                teacher_name: teachers.get(&s.teacher_id).cloned().unwrap_or_default(),
                created_at: s.created_at,
                is_deleted: s.is_deleted,
            }
        })
        .collect())
}

pub(crate) async fn schedule_views(
    db: &DatabaseConnection,
    schedules: Vec<class_schedule::Model>,
) -> Result<Vec<ScheduleDto>> {
    let sections = sections_by_id(db, schedules.iter().map(|s| s.class_section_id)).await?;
    let courses = courses_by_id(db, sections.values().map(|s| s.course_id)).await?;
    let teachers = teacher_names(db, sections.values().map(|s| s.teacher_id)).await?;

    Ok(schedules
        .into_iter()
        .map(|slot| {
            let section = sections.get(&slot.class_section_id);
            let course_name = section
                .and_then(|s| courses.get(&s.course_id))
                .map(|c| c.name.clone())
                .unwrap_or_default();
            let teacher_name = section
                .and_then(|s| teachers.get(&s.teacher_id))
                .cloned()
                .unwrap_or_default();
            ScheduleDto {
                id: slot.id,
                class_section_id: slot.class_section_id,
                class_code: section.map(|s| s.code.clone()).unwrap_or_default(),
                course_name,
                teacher_name,
                day_of_week: slot.day_of_week,
                start_time: slot.start_time,
                end_time: slot.end_time,
                period: time_to_period(slot.start_time),
                room: slot.room,
                is_deleted: slot.is_deleted,
            }
        })
        .collect())
}
