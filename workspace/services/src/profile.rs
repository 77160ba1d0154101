use common::{
    AdminDashboardDto, DayOfWeek, FacultyProfileDto, ProfileDto, StudentProfileDto, UserSummary,
};
use model::entities::{class_schedule, class_section, course, faculty, student, user};
use sea_orm::{ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter};
use std::collections::HashSet;
use tracing::{debug, instrument};

use crate::caller::Caller;
use crate::class_section::ClassSectionService;
use crate::error::{Result, ServiceError};
use crate::lookup;
use crate::schedule::{ScheduleService, on_day};

/// Landing dashboards, one shape per role.
pub struct ProfileService<'a> {
    db: &'a DatabaseConnection,
}

fn summary(user: user::Model) -> UserSummary {
    UserSummary {
        id: user.id,
        full_name: user.full_name,
        email: user.email,
        phone: user.phone,
    }
}

impl<'a> ProfileService<'a> {
    pub fn new(db: &'a DatabaseConnection) -> Self {
        Self { db }
    }

    /// Builds the caller's dashboard. `today` selects the schedule slots
    /// shown as today's.
    #[instrument(skip(self))]
    pub async fn profile(&self, caller: Caller, today: DayOfWeek) -> Result<ProfileDto> {
        let user = user::Entity::find_by_id(caller.user_id())
            .filter(user::Column::IsDeleted.eq(false))
            .one(self.db)
            .await?
            .ok_or_else(|| ServiceError::not_found("User not found."))?;

        match caller {
            Caller::Admin { .. } => self.admin(user, today).await.map(ProfileDto::Admin),
            Caller::Faculty { .. } => self.faculty(user, today).await.map(ProfileDto::Faculty),
            Caller::Student { .. } => self.student(user, today).await.map(ProfileDto::Student),
        }
    }

    async fn student(&self, user: user::Model, today: DayOfWeek) -> Result<StudentProfileDto> {
        let student = lookup::active_student_for_user(self.db, user.id)
            .await?
            .ok_or_else(|| ServiceError::not_found("Student profile not found."))?;

        let classes = ClassSectionService::new(self.db).student_classes(user.id).await?;
        let total_credits = classes.iter().filter_map(|c| c.credits).sum();
        let schedule = ScheduleService::new(self.db).student_schedule(user.id).await?;

        Ok(StudentProfileDto {
            student_id: student.id,
            student_code: student.code(),
            classes,
            total_credits,
            today_schedule: on_day(schedule, today),
            user: summary(user),
        })
    }

    async fn faculty(&self, user: user::Model, today: DayOfWeek) -> Result<FacultyProfileDto> {
        let faculty = lookup::active_faculty_for_user(self.db, user.id)
            .await?
            .ok_or_else(|| ServiceError::not_found("Faculty profile not found."))?;

        let classes = ClassSectionService::new(self.db).teaching_classes(user.id).await?;
        let total_courses = classes.iter().map(|c| c.course_id).collect::<HashSet<_>>().len() as u64;
        let total_credits = classes.iter().filter_map(|c| c.credits).sum();
        let schedule = ScheduleService::new(self.db).faculty_schedule(user.id).await?;

        Ok(FacultyProfileDto {
            faculty_id: faculty.id,
            faculty_code: faculty.code(),
            department: faculty.department,
            title: faculty.title,
            classes,
            total_courses,
            total_credits,
            today_schedule: on_day(schedule, today),
            user: summary(user),
        })
    }

    async fn admin(&self, user: user::Model, today: DayOfWeek) -> Result<AdminDashboardDto> {
        let total_students = student::Entity::find()
            .filter(student::Column::IsDeleted.eq(false))
            .count(self.db)
            .await?;
        let total_faculty = faculty::Entity::find()
            .filter(faculty::Column::IsDeleted.eq(false))
            .count(self.db)
            .await?;
        let total_courses = course::Entity::find()
            .filter(course::Column::IsDeleted.eq(false))
            .count(self.db)
            .await?;
        let active_classes = class_section::Entity::find()
            .filter(class_section::Column::IsDeleted.eq(false))
            .count(self.db)
            .await?;
        let today_schedules = class_schedule::Entity::find()
            .filter(class_schedule::Column::IsDeleted.eq(false))
            .filter(class_schedule::Column::DayOfWeek.eq(today))
            .count(self.db)
            .await?;
        debug!(
            "Dashboard: {} students, {} faculty, {} courses, {} classes",
            total_students, total_faculty, total_courses, active_classes
        );

        Ok(AdminDashboardDto {
            user: summary(user),
            total_students,
            total_faculty,
            total_courses,
            active_classes,
            today_schedules,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::*;
    use chrono::NaiveTime;
    use common::Role;
    use sea_orm::{ActiveModelTrait, Set};

    async fn add_slot(db: &DatabaseConnection, section_id: i32, day: DayOfWeek, hour: u32) {
        class_schedule::ActiveModel {
            class_section_id: Set(section_id),
            day_of_week: Set(day),
            start_time: Set(NaiveTime::from_hms_opt(hour, 0, 0).unwrap()),
            end_time: Set(NaiveTime::from_hms_opt(hour + 1, 0, 0).unwrap()),
            room: Set(None),
            is_deleted: Set(false),
            ..Default::default()
        }
        .insert(db)
        .await
        .unwrap();
    }

    #[tokio::test]
    async fn test_dashboards_per_role() {
        let db = setup_db().await;
        let admin = create_user(&db, "Root Admin", Some(Role::Admin)).await;
        let (teacher_user, teacher) = create_faculty(&db, "Fay Teacher").await;
        let (student_user, student) = create_student(&db, "Stan Student").await;
        let math = create_course(&db, "MATH", 4).await;
        let art = create_course(&db, "ART", 2).await;
        let math_a = create_section(&db, "MATH-A", math.id, teacher.id).await;
        let math_b = create_section(&db, "MATH-B", math.id, teacher.id).await;
        let art_a = create_section(&db, "ART-A", art.id, teacher.id).await;
        enroll(&db, student.id, math_a.id).await;
        enroll(&db, student.id, art_a.id).await;
        add_slot(&db, math_a.id, DayOfWeek::Tuesday, 8).await;
        add_slot(&db, math_b.id, DayOfWeek::Tuesday, 10).await;
        add_slot(&db, art_a.id, DayOfWeek::Thursday, 8).await;

        let service = ProfileService::new(&db);

        match service
            .profile(Caller::Student { user_id: student_user.id }, DayOfWeek::Tuesday)
            .await
            .unwrap()
        {
            ProfileDto::Student(p) => {
                assert_eq!(p.classes.len(), 2);
                assert_eq!(p.total_credits, 6);
                assert_eq!(p.today_schedule.len(), 1);
                assert_eq!(p.today_schedule[0].class_code, "MATH-A");
            }
            other => panic!("expected student profile, got {:?}", other),
        }

        match service
            .profile(Caller::Faculty { user_id: teacher_user.id }, DayOfWeek::Tuesday)
            .await
            .unwrap()
        {
            ProfileDto::Faculty(p) => {
                assert_eq!(p.classes.len(), 3);
                assert_eq!(p.total_courses, 2);
                assert_eq!(p.total_credits, 10);
                assert_eq!(p.today_schedule.len(), 2);
                let math_a_card = p.classes.iter().find(|c| c.code == "MATH-A").unwrap();
                assert_eq!(math_a_card.student_count, 1);
            }
            other => panic!("expected faculty profile, got {:?}", other),
        }

        match service
            .profile(Caller::Admin { user_id: admin.id }, DayOfWeek::Thursday)
            .await
            .unwrap()
        {
            ProfileDto::Admin(d) => {
                assert_eq!(d.total_students, 1);
                assert_eq!(d.total_faculty, 1);
                assert_eq!(d.total_courses, 2);
                assert_eq!(d.active_classes, 3);
                assert_eq!(d.today_schedules, 1);
            }
            other => panic!("expected admin dashboard, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_missing_profile_is_not_found() {
        let db = setup_db().await;
        let user = create_user(&db, "No Profile", Some(Role::Student)).await;
        let service = ProfileService::new(&db);
        assert!(matches!(
            service
                .profile(Caller::Student { user_id: user.id }, DayOfWeek::Monday)
                .await,
            Err(ServiceError::NotFound(_))
        ));
        assert!(matches!(
            service.profile(Caller::Admin { user_id: 999 }, DayOfWeek::Monday).await,
            Err(ServiceError::NotFound(_))
        ));
    }
}
