use chrono::Utc;
use common::{EnrolledStudentDto, EnrollmentDto, EnrollmentManageView, EnrollmentResult};
use model::entities::{class_section, enrollment};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, Set,
    TransactionTrait, sea_query::Expr,
};
use std::collections::{BTreeSet, HashSet};
use tracing::{debug, info, instrument, warn};

use crate::error::{Result, ServiceError};
use crate::lookup;
use crate::recycle;
use crate::student::{active_students, student_option};

/// Membership of students in class sections.
pub struct EnrollmentService<'a> {
    db: &'a DatabaseConnection,
}

impl<'a> EnrollmentService<'a> {
    pub fn new(db: &'a DatabaseConnection) -> Self {
        Self { db }
    }

    async fn active_section(&self, section_id: i32) -> Result<class_section::Model> {
        class_section::Entity::find_by_id(section_id)
            .filter(class_section::Column::IsDeleted.eq(false))
            .one(self.db)
            .await?
            .ok_or_else(|| ServiceError::not_found("Class section not found."))
    }

    /// The section with its enrolled students and the active students that
    /// could still be added. `None` when the section is missing or deleted.
    #[instrument(skip(self))]
    pub async fn manage_view(&self, section_id: i32) -> Result<Option<EnrollmentManageView>> {
        let Some(section) = class_section::Entity::find_by_id(section_id)
            .filter(class_section::Column::IsDeleted.eq(false))
            .one(self.db)
            .await?
        else {
            return Ok(None);
        };

        let rows = enrollment::Entity::find()
            .filter(enrollment::Column::ClassSectionId.eq(section_id))
            .filter(enrollment::Column::IsDeleted.eq(false))
            .all(self.db)
            .await?;
        let students = lookup::students_by_id(self.db, rows.iter().map(|e| e.student_id)).await?;

        let mut enrolled: Vec<EnrolledStudentDto> = rows
            .iter()
            .filter_map(|e| {
                students.get(&e.student_id).map(|(s, u)| EnrolledStudentDto {
                    enrollment_id: e.id,
                    student_id: s.id,
                    student_code: s.code(),
                    full_name: u.full_name.clone(),
                    email: u.email.clone(),
                    enrolled_at: e.enrolled_at,
                })
            })
            .collect();
        enrolled.sort_by(|a, b| a.full_name.cmp(&b.full_name));

        let taken: HashSet<i32> = rows.iter().map(|e| e.student_id).collect();
        let available = active_students(self.db)
            .await?
            .iter()
            .filter(|(s, _)| !taken.contains(&s.id))
            .map(|(s, u)| student_option(s, u))
            .collect();

        let class_section = lookup::section_views(self.db, vec![section])
            .await?
            .pop()
            .ok_or_else(|| ServiceError::not_found("Class section not found."))?;

        Ok(Some(EnrollmentManageView {
            class_section,
            enrolled,
            available,
        }))
    }

    /// Enrolls each distinct student: a new row when none exists, the
    /// deleted row brought back when there is one, nothing when already
    /// active. Runs in one transaction.
    #[instrument(skip(self))]
    pub async fn add_students(&self, section_id: i32, student_ids: &[i32]) -> Result<EnrollmentResult> {
        let ids: BTreeSet<i32> = student_ids.iter().copied().collect();
        if ids.is_empty() {
            return Err(ServiceError::validation("No students selected."));
        }
        self.active_section(section_id).await?;

        let known = lookup::students_by_id(self.db, ids.iter().copied()).await?;
        let unknown: Vec<String> = ids
            .iter()
            .filter(|id| !known.get(id).is_some_and(|(s, u)| !s.is_deleted && !u.is_deleted))
            .map(|id| format!("Student {} not found.", id))
            .collect();
        if !unknown.is_empty() {
            warn!("Rejected enrollment into section {}: {:?}", section_id, unknown);
            return Err(ServiceError::Validation(unknown));
        }

        let now = Utc::now().naive_utc();
        let mut result = EnrollmentResult::default();
        let txn = self.db.begin().await?;

        let existing = enrollment::Entity::find()
            .filter(enrollment::Column::ClassSectionId.eq(section_id))
            .filter(enrollment::Column::StudentId.is_in(ids.iter().copied()))
            .order_by_asc(enrollment::Column::Id)
            .all(&txn)
            .await?;

        for student_id in ids {
            let rows: Vec<&enrollment::Model> =
                existing.iter().filter(|e| e.student_id == student_id).collect();
            if rows.iter().any(|e| !e.is_deleted) {
                debug!("Student {} already enrolled in section {}", student_id, section_id);
                continue;
            }
            match rows.first() {
                Some(deleted) => {
                    let mut active: enrollment::ActiveModel = (*deleted).clone().into();
                    active.is_deleted = Set(false);
                    active.enrolled_at = Set(now);
                    active.update(&txn).await?;
                    result.restored += 1;
                }
                None => {
                    enrollment::ActiveModel {
                        student_id: Set(student_id),
                        class_section_id: Set(section_id),
                        enrolled_at: Set(now),
                        is_deleted: Set(false),
                        ..Default::default()
                    }
                    .insert(&txn)
                    .await?;
                    result.created += 1;
                }
            }
        }

        txn.commit().await?;
        info!(
            "Section {}: added {} new, restored {} enrollment(s)",
            section_id, result.created, result.restored
        );
        Ok(result)
    }

    /// Soft-deletes the active enrollment of the student in the section.
    #[instrument(skip(self))]
    pub async fn remove_student(&self, section_id: i32, student_id: i32) -> Result<bool> {
        let result = enrollment::Entity::update_many()
            .col_expr(enrollment::Column::IsDeleted, Expr::value(true))
            .filter(enrollment::Column::ClassSectionId.eq(section_id))
            .filter(enrollment::Column::StudentId.eq(student_id))
            .filter(enrollment::Column::IsDeleted.eq(false))
            .exec(self.db)
            .await?;
        debug!(
            "Removed student {} from section {} ({} row(s))",
            student_id, section_id, result.rows_affected
        );
        Ok(result.rows_affected > 0)
    }

    /// Recycle bin of removed enrollments.
    #[instrument(skip(self))]
    pub async fn list_deleted(&self) -> Result<Vec<EnrollmentDto>> {
        let rows = enrollment::Entity::find()
            .filter(enrollment::Column::IsDeleted.eq(true))
            .order_by_desc(enrollment::Column::EnrolledAt)
            .all(self.db)
            .await?;
        let students = lookup::students_by_id(self.db, rows.iter().map(|e| e.student_id)).await?;
        let sections = lookup::sections_by_id(self.db, rows.iter().map(|e| e.class_section_id)).await?;

        Ok(rows
            .into_iter()
            .map(|e| {
                let student = students.get(&e.student_id);
                EnrollmentDto {
                    id: e.id,
                    student_id: e.student_id,
                    student_code: common::student_code(e.student_id),
                    student_name: student.map(|(_, u)| u.full_name.clone()).unwrap_or_default(),
                    class_section_id: e.class_section_id,
                    class_code: sections
                        .get(&e.class_section_id)
                        .map(|s| s.code.clone())
                        .unwrap_or_default(),
                    enrolled_at: e.enrolled_at,
                    is_deleted: e.is_deleted,
                }
            })
            .collect())
    }

    /// Restores a removed enrollment unless the student has been enrolled
    /// in the section again since.
    #[instrument(skip(self))]
    pub async fn restore(&self, id: i32) -> Result<bool> {
        let Some(existing) = enrollment::Entity::find_by_id(id).one(self.db).await? else {
            return Ok(false);
        };
        if existing.is_deleted {
            let active = enrollment::Entity::find()
                .filter(enrollment::Column::ClassSectionId.eq(existing.class_section_id))
                .filter(enrollment::Column::StudentId.eq(existing.student_id))
                .filter(enrollment::Column::IsDeleted.eq(false))
                .one(self.db)
                .await?;
            if active.is_some() {
                return Err(ServiceError::validation(
                    "Student is already enrolled in this class.",
                ));
            }
        }
        recycle::restore::<enrollment::Entity>(self.db, id).await
    }

    pub async fn hard_delete(&self, id: i32) -> Result<bool> {
        recycle::hard_delete::<enrollment::Entity>(self.db, id).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::class_section::active_enrollment_count;
    use crate::testing::*;
    use model::entities::user;

    struct Fixture {
        section: class_section::Model,
        students: Vec<i32>,
    }

    async fn fixture(db: &DatabaseConnection) -> Fixture {
        let course = create_course(db, "MATH1", 4).await;
        let (_, teacher) = create_faculty(db, "Tess Teacher").await;
        let section = create_section(db, "MATH1-A", course.id, teacher.id).await;
        let mut students = Vec::new();
        for name in ["Amy Student", "Bea Student", "Cal Student"] {
            students.push(create_student(db, name).await.1.id);
        }
        Fixture { section, students }
    }

    #[tokio::test]
    async fn test_add_then_remove_students() {
        let db = setup_db().await;
        let f = fixture(&db).await;
        let service = EnrollmentService::new(&db);

        let added = service
            .add_students(f.section.id, &[f.students[0], f.students[1], f.students[0]])
            .await
            .unwrap();
        assert_eq!(added, EnrollmentResult { created: 2, restored: 0 });
        assert_eq!(active_enrollment_count(&db, f.section.id).await.unwrap(), 2);

        assert!(service.remove_student(f.section.id, f.students[0]).await.unwrap());
        assert!(!service.remove_student(f.section.id, f.students[0]).await.unwrap());
        assert_eq!(active_enrollment_count(&db, f.section.id).await.unwrap(), 1);

        // The removed row is kept in the recycle bin
        let removed = service.list_deleted().await.unwrap();
        assert_eq!(removed.len(), 1);
        assert_eq!(removed[0].student_id, f.students[0]);
        assert!(removed[0].is_deleted);
    }

    #[tokio::test]
    async fn test_add_is_idempotent_and_restores() {
        let db = setup_db().await;
        let f = fixture(&db).await;
        let service = EnrollmentService::new(&db);

        service.add_students(f.section.id, &f.students[..2]).await.unwrap();
        service.remove_student(f.section.id, f.students[1]).await.unwrap();

        let again = service.add_students(f.section.id, &f.students).await.unwrap();
        assert_eq!(again, EnrollmentResult { created: 1, restored: 1 });

        let noop = service.add_students(f.section.id, &f.students).await.unwrap();
        assert_eq!(noop, EnrollmentResult::default());

        let rows = enrollment::Entity::find().all(&db).await.unwrap();
        assert_eq!(rows.len(), 3);
        assert!(rows.iter().all(|e| !e.is_deleted));
    }

    #[tokio::test]
    async fn test_students_with_deleted_accounts_are_rejected() {
        let db = setup_db().await;
        let f = fixture(&db).await;
        let service = EnrollmentService::new(&db);

        let (student, owner) = lookup::students_by_id(&db, [f.students[0]])
            .await
            .unwrap()
            .remove(&f.students[0])
            .unwrap();
        assert!(!student.is_deleted);
        recycle::soft_delete::<user::Entity>(&db, owner.id).await.unwrap();

        let err = service
            .add_students(f.section.id, &[f.students[0], f.students[1]])
            .await
            .unwrap_err();
        match err {
            ServiceError::Validation(errors) => {
                assert_eq!(errors, vec![format!("Student {} not found.", f.students[0])]);
            }
            other => panic!("expected a validation error, got {:?}", other),
        }
        assert_eq!(active_enrollment_count(&db, f.section.id).await.unwrap(), 0);

        let view = service.manage_view(f.section.id).await.unwrap().unwrap();
        assert!(view.enrolled.is_empty());
        assert!(view.available.iter().all(|s| s.id != f.students[0]));
    }

    #[tokio::test]
    async fn test_add_rejects_bad_selection() {
        let db = setup_db().await;
        let f = fixture(&db).await;
        let service = EnrollmentService::new(&db);

        match service.add_students(f.section.id, &[]).await {
            Err(ServiceError::Validation(errors)) => {
                assert_eq!(errors, vec!["No students selected.".to_string()])
            }
            other => panic!("expected empty selection rejection, got {:?}", other),
        }

        recycle::soft_delete::<model::entities::student::Entity>(&db, f.students[2])
            .await
            .unwrap();
        assert!(matches!(
            service.add_students(f.section.id, &[f.students[0], f.students[2], 999]).await,
            Err(ServiceError::Validation(errors)) if errors.len() == 2
        ));
        assert!(matches!(
            service.add_students(4242, &[f.students[0]]).await,
            Err(ServiceError::NotFound(_))
        ));
        assert_eq!(active_enrollment_count(&db, f.section.id).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_manage_view_splits_enrolled_and_available() {
        let db = setup_db().await;
        let f = fixture(&db).await;
        let service = EnrollmentService::new(&db);
        service.add_students(f.section.id, &[f.students[1]]).await.unwrap();

        let view = service.manage_view(f.section.id).await.unwrap().unwrap();
        assert_eq!(view.class_section.code, "MATH1-A");
        assert_eq!(view.class_section.teacher_name, "Tess Teacher");
        assert_eq!(view.enrolled.len(), 1);
        assert_eq!(view.enrolled[0].full_name, "Bea Student");
        let available: Vec<&str> = view.available.iter().map(|s| s.full_name.as_str()).collect();
        assert_eq!(available, vec!["Amy Student", "Cal Student"]);

        assert!(service.manage_view(999).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_restore_and_hard_delete_removed_enrollment() {
        let db = setup_db().await;
        let f = fixture(&db).await;
        let service = EnrollmentService::new(&db);
        service.add_students(f.section.id, &[f.students[0]]).await.unwrap();
        service.remove_student(f.section.id, f.students[0]).await.unwrap();
        let removed = service.list_deleted().await.unwrap()[0].id;

        assert!(service.restore(removed).await.unwrap());
        assert_eq!(active_enrollment_count(&db, f.section.id).await.unwrap(), 1);

        service.remove_student(f.section.id, f.students[0]).await.unwrap();
        assert!(service.hard_delete(removed).await.unwrap());
        assert!(service.list_deleted().await.unwrap().is_empty());
    }
}
