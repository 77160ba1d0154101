use chrono::Utc;
use common::{StudentAssignmentDetailDto, StudentAssignmentDto, SubmissionDto};
use model::entities::{assignment, assignment_submission, class_section, enrollment, student};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, Set,
};
use std::collections::HashMap;
use tracing::{debug, info, instrument, warn};

use super::{assignment_views, resources_of, submission_views};
use crate::error::{Result, ServiceError};
use crate::lookup;
use crate::storage::{FileStorage, UploadedFile};

/// Assignments as seen by an enrolled student.
pub struct StudentAssignmentService<'a> {
    db: &'a DatabaseConnection,
    storage: &'a dyn FileStorage,
}

impl<'a> StudentAssignmentService<'a> {
    pub fn new(db: &'a DatabaseConnection, storage: &'a dyn FileStorage) -> Self {
        Self { db, storage }
    }

    /// Active sections the student is actively enrolled in.
    async fn enrolled_section_ids(&self, student_id: i32) -> Result<Vec<i32>> {
        let section_ids: Vec<i32> = enrollment::Entity::find()
            .filter(enrollment::Column::StudentId.eq(student_id))
            .filter(enrollment::Column::IsDeleted.eq(false))
            .all(self.db)
            .await?
            .into_iter()
            .map(|e| e.class_section_id)
            .collect();
        if section_ids.is_empty() {
            return Ok(section_ids);
        }
        Ok(class_section::Entity::find()
            .filter(class_section::Column::Id.is_in(section_ids))
            .filter(class_section::Column::IsDeleted.eq(false))
            .all(self.db)
            .await?
            .into_iter()
            .map(|s| s.id)
            .collect())
    }

    /// The active assignment if the student may see it.
    async fn visible(&self, student: &student::Model, assignment_id: i32) -> Result<Option<assignment::Model>> {
        let Some(found) = assignment::Entity::find_by_id(assignment_id)
            .filter(assignment::Column::IsDeleted.eq(false))
            .one(self.db)
            .await?
        else {
            return Ok(None);
        };
        if self
            .enrolled_section_ids(student.id)
            .await?
            .contains(&found.class_section_id)
        {
            Ok(Some(found))
        } else {
            Ok(None)
        }
    }

    async fn own_submission(
        &self,
        assignment_id: i32,
        student_id: i32,
    ) -> Result<Option<assignment_submission::Model>> {
        Ok(assignment_submission::Entity::find()
            .filter(assignment_submission::Column::AssignmentId.eq(assignment_id))
            .filter(assignment_submission::Column::StudentId.eq(student_id))
            .filter(assignment_submission::Column::IsDeleted.eq(false))
            .one(self.db)
            .await?)
    }

    /// Assignments of the student's classes with their own hand-in status,
    /// soonest due first.
    #[instrument(skip(self))]
    pub async fn list(&self, user_id: i32) -> Result<Vec<StudentAssignmentDto>> {
        let Some(student) = lookup::active_student_for_user(self.db, user_id).await? else {
            debug!("User {} has no active student profile", user_id);
            return Ok(Vec::new());
        };
        let sections = self.enrolled_section_ids(student.id).await?;
        if sections.is_empty() {
            return Ok(Vec::new());
        }

        let assignments = assignment::Entity::find()
            .filter(assignment::Column::ClassSectionId.is_in(sections))
            .filter(assignment::Column::IsDeleted.eq(false))
            .order_by_asc(assignment::Column::DueAt)
            .all(self.db)
            .await?;
        let mine: HashMap<i32, assignment_submission::Model> = assignment_submission::Entity::find()
            .filter(assignment_submission::Column::StudentId.eq(student.id))
            .filter(assignment_submission::Column::IsDeleted.eq(false))
            .filter(assignment_submission::Column::AssignmentId.is_in(assignments.iter().map(|a| a.id)))
            .all(self.db)
            .await?
            .into_iter()
            .map(|s| (s.assignment_id, s))
            .collect();

        let views = assignment_views(self.db, self.storage, assignments).await?;
        Ok(views
            .into_iter()
            .map(|a| {
                let submission = mine.get(&a.id);
                StudentAssignmentDto {
                    id: a.id,
                    title: a.title,
                    class_code: a.class_code,
                    course_name: a.course_name,
                    due_at: a.due_at,
                    max_score: a.max_score,
                    is_submitted: submission.is_some(),
                    score: submission.and_then(|s| s.score),
                    is_late: submission.is_some_and(|s| s.is_late(a.due_at)),
                }
            })
            .collect())
    }

    /// The assignment, its documents and the student's own submission.
    /// `None` without an active enrollment in the assignment's section.
    #[instrument(skip(self))]
    pub async fn detail(
        &self,
        user_id: i32,
        assignment_id: i32,
    ) -> Result<Option<StudentAssignmentDetailDto>> {
        let Some(student) = lookup::active_student_for_user(self.db, user_id).await? else {
            return Ok(None);
        };
        let Some(found) = self.visible(&student, assignment_id).await? else {
            warn!(
                "Assignment {} is not visible to student {}",
                assignment_id,
                student.code()
            );
            return Ok(None);
        };

        let due_at = found.due_at;
        let submission = match self.own_submission(found.id, student.id).await? {
            Some(s) => submission_views(self.db, self.storage, vec![s], due_at).await?.pop(),
            None => None,
        };
        let resources = resources_of(self.db, self.storage, found.id).await?;
        let Some(assignment) = assignment_views(self.db, self.storage, vec![found]).await?.pop() else {
            return Ok(None);
        };
        Ok(Some(StudentAssignmentDetailDto {
            assignment,
            resources,
            submission,
        }))
    }

    /// Hands in a file. A second hand-in replaces the first and clears its
    /// grade.
    #[instrument(skip(self, file), fields(file_name = %file.file_name))]
    pub async fn submit(&self, user_id: i32, assignment_id: i32, file: UploadedFile) -> Result<SubmissionDto> {
        let found = assignment::Entity::find_by_id(assignment_id)
            .filter(assignment::Column::IsDeleted.eq(false))
            .one(self.db)
            .await?
            .ok_or_else(|| ServiceError::not_found("Assignment not found."))?;
        let student = lookup::active_student_for_user(self.db, user_id)
            .await?
            .ok_or_else(|| ServiceError::Forbidden("Only students can submit assignments.".to_string()))?;
        if !self
            .enrolled_section_ids(student.id)
            .await?
            .contains(&found.class_section_id)
        {
            warn!(
                "Student {} tried to submit to assignment {} outside their classes",
                student.code(),
                assignment_id
            );
            return Err(ServiceError::Forbidden(
                "You are not enrolled in this class.".to_string(),
            ));
        }
        if file.is_empty() {
            return Err(ServiceError::validation("Please choose a file to submit."));
        }

        let path = self
            .storage
            .save_submission_file(found.id, student.id, file)
            .await?;
        let now = Utc::now().naive_utc();

        let saved = match self.own_submission(found.id, student.id).await? {
            Some(existing) => {
                let previous = existing.file_path.clone();
                let mut active: assignment_submission::ActiveModel = existing.into();
                active.file_path = Set(path);
                active.submitted_at = Set(now);
                active.score = Set(None);
                active.teacher_comment = Set(None);
                active.graded_at = Set(None);
                let updated = active.update(self.db).await?;
                self.storage.delete_file(&previous).await?;
                info!("Student {} resubmitted assignment {}", student.code(), found.id);
                updated
            }
            None => {
                let created = assignment_submission::ActiveModel {
                    assignment_id: Set(found.id),
                    student_id: Set(student.id),
                    submitted_at: Set(now),
                    file_path: Set(path),
                    score: Set(None),
                    graded_at: Set(None),
                    teacher_comment: Set(None),
                    is_deleted: Set(false),
                    ..Default::default()
                }
                .insert(self.db)
                .await?;
                info!("Student {} submitted assignment {}", student.code(), found.id);
                created
            }
        };

        submission_views(self.db, self.storage, vec![saved], found.due_at)
            .await?
            .pop()
            .ok_or_else(|| ServiceError::not_found("Submission not found."))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assignment::{AssignmentMaterials, FacultyAssignmentService};
    use crate::storage::MemoryFileStorage;
    use crate::testing::*;
    use chrono::Duration;
    use common::{AssignmentRequest, GradeRequest};

    struct Fixture {
        teacher_user: i32,
        student_user: i32,
        outsider_user: i32,
        assignment_id: i32,
    }

    async fn fixture(db: &DatabaseConnection, storage: &MemoryFileStorage, due_in_days: i64) -> Fixture {
        let course = create_course(db, "BIO", 2).await;
        let (teacher_user, teacher) = create_faculty(db, "Tina Teacher").await;
        let section = create_section(db, "BIO-A", course.id, teacher.id).await;
        let (student_user, student) = create_student(db, "Sam Student").await;
        let (outsider_user, _) = create_student(db, "Olly Outsider").await;
        enroll(db, student.id, section.id).await;

        let created = FacultyAssignmentService::new(db, storage)
            .create(
                teacher_user.id,
                AssignmentRequest {
                    class_section_id: section.id,
                    title: "Cell diagram".to_string(),
                    description: None,
                    due_at: Utc::now().naive_utc() + Duration::days(due_in_days),
                    max_score: Some(10),
                },
                AssignmentMaterials::none(),
            )
            .await
            .unwrap();
        Fixture {
            teacher_user: teacher_user.id,
            student_user: student_user.id,
            outsider_user: outsider_user.id,
            assignment_id: created.id,
        }
    }

    #[tokio::test]
    async fn test_resubmission_overwrites_and_clears_grade() {
        let db = setup_db().await;
        let storage = MemoryFileStorage::new();
        let f = fixture(&db, &storage, 7).await;
        let service = StudentAssignmentService::new(&db, &storage);

        let first = service
            .submit(f.student_user, f.assignment_id, UploadedFile::new("cell.png", b"one".to_vec()))
            .await
            .unwrap();
        assert!(!first.is_late);
        FacultyAssignmentService::new(&db, &storage)
            .grade(f.teacher_user, first.id, GradeRequest { score: 8, comment: Some("Nice".to_string()) })
            .await
            .unwrap();

        let second = service
            .submit(f.student_user, f.assignment_id, UploadedFile::new("cell-v2.png", b"two".to_vec()))
            .await
            .unwrap();
        assert_eq!(second.id, first.id);
        assert_ne!(second.file_url, first.file_url);
        assert!(second.submitted_at >= first.submitted_at);
        assert_eq!(second.score, None);
        assert_eq!(second.teacher_comment, None);
        assert_eq!(second.graded_at, None);

        let rows = assignment_submission::Entity::find().all(&db).await.unwrap();
        assert_eq!(rows.len(), 1);
        assert!(!storage.contains(&first.file_url));
        assert_eq!(storage.read(&second.file_url), Some(b"two".to_vec()));
    }

    #[tokio::test]
    async fn test_submission_requires_enrollment() {
        let db = setup_db().await;
        let storage = MemoryFileStorage::new();
        let f = fixture(&db, &storage, 7).await;
        let service = StudentAssignmentService::new(&db, &storage);

        assert!(matches!(
            service
                .submit(f.outsider_user, f.assignment_id, UploadedFile::new("x.txt", b"x".to_vec()))
                .await,
            Err(ServiceError::Forbidden(_))
        ));
        assert!(matches!(
            service
                .submit(f.teacher_user, f.assignment_id, UploadedFile::new("x.txt", b"x".to_vec()))
                .await,
            Err(ServiceError::Forbidden(_))
        ));
        assert!(matches!(
            service
                .submit(f.student_user, f.assignment_id, UploadedFile::new("x.txt", Vec::new()))
                .await,
            Err(ServiceError::Validation(_))
        ));
        assert!(matches!(
            service
                .submit(f.student_user, 9999, UploadedFile::new("x.txt", b"x".to_vec()))
                .await,
            Err(ServiceError::NotFound(_))
        ));
        assert!(service.detail(f.outsider_user, f.assignment_id).await.unwrap().is_none());
        assert!(service.list(f.outsider_user).await.unwrap().is_empty());
        assert!(storage.is_empty());
    }

    #[tokio::test]
    async fn test_list_and_detail_report_own_status() {
        let db = setup_db().await;
        let storage = MemoryFileStorage::new();
        let f = fixture(&db, &storage, -1).await;
        let service = StudentAssignmentService::new(&db, &storage);

        let before = service.list(f.student_user).await.unwrap();
        assert_eq!(before.len(), 1);
        assert!(!before[0].is_submitted);
        assert!(!before[0].is_late);
        assert_eq!(before[0].class_code, "BIO-A");

        service
            .submit(f.student_user, f.assignment_id, UploadedFile::new("late.pdf", b"late".to_vec()))
            .await
            .unwrap();

        let after = service.list(f.student_user).await.unwrap();
        assert!(after[0].is_submitted);
        assert!(after[0].is_late);
        assert_eq!(after[0].score, None);

        let detail = service.detail(f.student_user, f.assignment_id).await.unwrap().unwrap();
        assert_eq!(detail.assignment.max_score, 10);
        let mine = detail.submission.unwrap();
        assert_eq!(mine.student_name, "Sam Student");
        assert!(mine.is_late);
    }
}
