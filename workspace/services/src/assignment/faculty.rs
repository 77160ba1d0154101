use chrono::Utc;
use common::{
    AssignmentDetailDto, AssignmentDto, AssignmentFormOptions, AssignmentRequest, GradeRequest,
    ResourceDto, SubmissionDto,
};
use model::entities::{assignment, assignment_resource, assignment_submission, class_section};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, ModelTrait, QueryFilter,
    QueryOrder, Set,
};
use tracing::{debug, info, instrument, warn};

use super::{
    AssignmentMaterials, assignment_views, non_empty, resource_view, resources_of,
    submission_views,
};
use crate::class_section::section_options;
use crate::error::{Result, ServiceError};
use crate::lookup;
use crate::storage::{FileStorage, MaterialKind, UploadedFile};

const NOT_FOUND: &str = "Assignment not found.";

/// Assignment management for the faculty member teaching the section.
pub struct FacultyAssignmentService<'a> {
    db: &'a DatabaseConnection,
    storage: &'a dyn FileStorage,
}

impl<'a> FacultyAssignmentService<'a> {
    pub fn new(db: &'a DatabaseConnection, storage: &'a dyn FileStorage) -> Self {
        Self { db, storage }
    }

    /// Active sections taught by the user's active faculty profile, by code.
    async fn taught_sections(&self, user_id: i32) -> Result<Vec<class_section::Model>> {
        let Some(faculty) = lookup::active_faculty_for_user(self.db, user_id).await? else {
            debug!("User {} has no active faculty profile", user_id);
            return Ok(Vec::new());
        };
        Ok(class_section::Entity::find()
            .filter(class_section::Column::TeacherId.eq(faculty.id))
            .filter(class_section::Column::IsDeleted.eq(false))
            .order_by_asc(class_section::Column::Code)
            .all(self.db)
            .await?)
    }

    async fn taught_section_ids(&self, user_id: i32) -> Result<Vec<i32>> {
        Ok(self
            .taught_sections(user_id)
            .await?
            .into_iter()
            .map(|s| s.id)
            .collect())
    }

    /// An assignment of a section the user teaches. `deleted` narrows the
    /// match to active or recycled rows.
    async fn owned(
        &self,
        user_id: i32,
        assignment_id: i32,
        deleted: Option<bool>,
    ) -> Result<Option<assignment::Model>> {
        let Some(found) = assignment::Entity::find_by_id(assignment_id).one(self.db).await? else {
            return Ok(None);
        };
        if deleted.is_some_and(|d| d != found.is_deleted) {
            return Ok(None);
        }
        let sections = self.taught_section_ids(user_id).await?;
        if sections.contains(&found.class_section_id) {
            Ok(Some(found))
        } else {
            warn!(
                "Assignment {} is not visible to user {}",
                assignment_id, user_id
            );
            Ok(None)
        }
    }

    async fn list_by_state(&self, user_id: i32, deleted: bool) -> Result<Vec<AssignmentDto>> {
        let sections = self.taught_section_ids(user_id).await?;
        if sections.is_empty() {
            return Ok(Vec::new());
        }
        let assignments = assignment::Entity::find()
            .filter(assignment::Column::ClassSectionId.is_in(sections))
            .filter(assignment::Column::IsDeleted.eq(deleted))
            .order_by_asc(assignment::Column::DueAt)
            .all(self.db)
            .await?;
        debug!(
            "Found {} assignment(s) with is_deleted={} for user {}",
            assignments.len(),
            deleted,
            user_id
        );
        assignment_views(self.db, self.storage, assignments).await
    }

    /// Active assignments of the caller's active sections, soonest due first.
    #[instrument(skip(self))]
    pub async fn list(&self, user_id: i32) -> Result<Vec<AssignmentDto>> {
        self.list_by_state(user_id, false).await
    }

    #[instrument(skip(self))]
    pub async fn list_deleted(&self, user_id: i32) -> Result<Vec<AssignmentDto>> {
        self.list_by_state(user_id, true).await
    }

    #[instrument(skip(self))]
    pub async fn form_options(&self, user_id: i32) -> Result<AssignmentFormOptions> {
        let sections = self.taught_sections(user_id).await?;
        Ok(AssignmentFormOptions {
            sections: section_options(self.db, sections).await?,
        })
    }

    /// The assignment with its resources and all active submissions.
    #[instrument(skip(self))]
    pub async fn detail(&self, user_id: i32, assignment_id: i32) -> Result<Option<AssignmentDetailDto>> {
        let Some(found) = self.owned(user_id, assignment_id, Some(false)).await? else {
            return Ok(None);
        };
        let submissions = assignment_submission::Entity::find()
            .filter(assignment_submission::Column::AssignmentId.eq(found.id))
            .filter(assignment_submission::Column::IsDeleted.eq(false))
            .all(self.db)
            .await?;
        let submissions = submission_views(self.db, self.storage, submissions, found.due_at).await?;
        let resources = resources_of(self.db, self.storage, found.id).await?;

        let Some(assignment) = assignment_views(self.db, self.storage, vec![found]).await?.pop() else {
            return Ok(None);
        };
        Ok(Some(AssignmentDetailDto {
            assignment,
            resources,
            submissions,
        }))
    }

    fn validate(request: &AssignmentRequest) -> Result<()> {
        let mut errors = Vec::new();
        if request.title.trim().is_empty() {
            errors.push("Title is required.".to_string());
        }
        if request.max_score.is_some_and(|m| m <= 0) {
            errors.push("Max score must be greater than zero.".to_string());
        }
        if errors.is_empty() {
            Ok(())
        } else {
            warn!("Assignment request rejected: {:?}", errors);
            Err(ServiceError::Validation(errors))
        }
    }

    async fn ensure_taught(&self, user_id: i32, section_id: i32) -> Result<()> {
        if self.taught_section_ids(user_id).await?.contains(&section_id) {
            Ok(())
        } else {
            warn!("User {} does not teach section {}", user_id, section_id);
            Err(ServiceError::not_found("Class section not found."))
        }
    }

    /// Stores the uploaded materials and points the row at them, dropping
    /// the files they replace.
    async fn attach_materials(
        &self,
        row: assignment::Model,
        materials: AssignmentMaterials,
    ) -> Result<assignment::Model> {
        let exercise = non_empty(materials.exercise);
        let guide = non_empty(materials.guide);
        if exercise.is_none() && guide.is_none() {
            return Ok(row);
        }

        let mut replaced = Vec::new();
        let mut active: assignment::ActiveModel = row.clone().into();
        if let Some(file) = exercise {
            let path = self
                .storage
                .save_assignment_material(row.id, MaterialKind::Exercise, file)
                .await?;
            replaced.extend(row.exercise_file_path.clone());
            active.exercise_file_path = Set(Some(path));
        }
        if let Some(file) = guide {
            let path = self
                .storage
                .save_assignment_material(row.id, MaterialKind::Guide, file)
                .await?;
            replaced.extend(row.guide_file_path.clone());
            active.guide_file_path = Set(Some(path));
        }
        let updated = active.update(self.db).await?;

        for path in replaced {
            self.storage.delete_file(&path).await?;
        }
        Ok(updated)
    }

    #[instrument(skip(self, materials))]
    pub async fn create(
        &self,
        user_id: i32,
        request: AssignmentRequest,
        materials: AssignmentMaterials,
    ) -> Result<AssignmentDto> {
        Self::validate(&request)?;
        self.ensure_taught(user_id, request.class_section_id).await?;

        let created = assignment::ActiveModel {
            class_section_id: Set(request.class_section_id),
            title: Set(request.title.trim().to_string()),
            description: Set(request.description),
            due_at: Set(request.due_at),
            max_score: Set(request.max_score.unwrap_or(assignment::DEFAULT_MAX_SCORE)),
            exercise_file_path: Set(None),
            guide_file_path: Set(None),
            created_at: Set(Utc::now().naive_utc()),
            is_deleted: Set(false),
            ..Default::default()
        }
        .insert(self.db)
        .await?;
        let created = self.attach_materials(created, materials).await?;

        info!(
            "Created assignment {} in section {}",
            created.id, created.class_section_id
        );
        assignment_views(self.db, self.storage, vec![created])
            .await?
            .pop()
            .ok_or_else(|| ServiceError::not_found(NOT_FOUND))
    }

    /// Updates an assignment of the caller. Anything the caller does not
    /// teach is reported as not found and left untouched.
    #[instrument(skip(self, materials))]
    pub async fn update(
        &self,
        user_id: i32,
        assignment_id: i32,
        request: AssignmentRequest,
        materials: AssignmentMaterials,
    ) -> Result<AssignmentDto> {
        let existing = self
            .owned(user_id, assignment_id, Some(false))
            .await?
            .ok_or_else(|| ServiceError::not_found(NOT_FOUND))?;
        Self::validate(&request)?;
        self.ensure_taught(user_id, request.class_section_id).await?;

        let max_score = request.max_score.unwrap_or(assignment::DEFAULT_MAX_SCORE);
        let highest_grade = assignment_submission::Entity::find()
            .filter(assignment_submission::Column::AssignmentId.eq(existing.id))
            .filter(assignment_submission::Column::IsDeleted.eq(false))
            .filter(assignment_submission::Column::Score.is_not_null())
            .order_by_desc(assignment_submission::Column::Score)
            .one(self.db)
            .await?
            .and_then(|s| s.score);
        if let Some(highest) = highest_grade.filter(|&score| score > max_score) {
            warn!(
                "Assignment {} update rejected: max score {} below grade {}",
                existing.id, max_score, highest
            );
            return Err(ServiceError::validation(format!(
                "Max score cannot be lower than an existing grade ({}).",
                highest
            )));
        }

        let mut active: assignment::ActiveModel = existing.into();
        active.class_section_id = Set(request.class_section_id);
        active.title = Set(request.title.trim().to_string());
        active.description = Set(request.description);
        active.due_at = Set(request.due_at);
        active.max_score = Set(max_score);
        let updated = active.update(self.db).await?;
        let updated = self.attach_materials(updated, materials).await?;

        info!("Updated assignment {}", updated.id);
        assignment_views(self.db, self.storage, vec![updated])
            .await?
            .pop()
            .ok_or_else(|| ServiceError::not_found(NOT_FOUND))
    }

    async fn set_deleted(&self, user_id: i32, assignment_id: i32, deleted: bool) -> Result<bool> {
        let Some(found) = self.owned(user_id, assignment_id, Some(!deleted)).await? else {
            return Ok(false);
        };
        let mut active: assignment::ActiveModel = found.into();
        active.is_deleted = Set(deleted);
        active.update(self.db).await?;
        info!("Set deleted={} on assignment {}", deleted, assignment_id);
        Ok(true)
    }

    #[instrument(skip(self))]
    pub async fn soft_delete(&self, user_id: i32, assignment_id: i32) -> Result<bool> {
        self.set_deleted(user_id, assignment_id, true).await
    }

    #[instrument(skip(self))]
    pub async fn restore(&self, user_id: i32, assignment_id: i32) -> Result<bool> {
        self.set_deleted(user_id, assignment_id, false).await
    }

    /// Removes the assignment together with its submissions, resources and
    /// every stored file they reference.
    #[instrument(skip(self))]
    pub async fn hard_delete(&self, user_id: i32, assignment_id: i32) -> Result<bool> {
        let Some(found) = self.owned(user_id, assignment_id, None).await? else {
            return Ok(false);
        };

        let mut files: Vec<String> = found
            .exercise_file_path
            .iter()
            .chain(found.guide_file_path.iter())
            .cloned()
            .collect();
        files.extend(
            found
                .find_related(assignment_submission::Entity)
                .all(self.db)
                .await?
                .into_iter()
                .map(|s| s.file_path),
        );
        files.extend(
            found
                .find_related(assignment_resource::Entity)
                .all(self.db)
                .await?
                .into_iter()
                .map(|r| r.file_path),
        );

        found.delete(self.db).await?;
        for path in &files {
            self.storage.delete_file(path).await?;
        }
        info!(
            "Removed assignment {} and {} stored file(s)",
            assignment_id,
            files.len()
        );
        Ok(true)
    }

    /// Scores a submission to one of the caller's assignments.
    #[instrument(skip(self))]
    pub async fn grade(
        &self,
        user_id: i32,
        submission_id: i32,
        request: GradeRequest,
    ) -> Result<SubmissionDto> {
        let submission = assignment_submission::Entity::find_by_id(submission_id)
            .filter(assignment_submission::Column::IsDeleted.eq(false))
            .one(self.db)
            .await?
            .ok_or_else(|| ServiceError::not_found("Submission not found."))?;
        let owner = self
            .owned(user_id, submission.assignment_id, Some(false))
            .await?
            .ok_or_else(|| ServiceError::not_found("Submission not found."))?;

        if !(0..=owner.max_score).contains(&request.score) {
            return Err(ServiceError::validation(format!(
                "Score must be between 0 and {}.",
                owner.max_score
            )));
        }

        let mut active: assignment_submission::ActiveModel = submission.into();
        active.score = Set(Some(request.score));
        active.teacher_comment = Set(request
            .comment
            .map(|c| c.trim().to_string())
            .filter(|c| !c.is_empty()));
        active.graded_at = Set(Some(Utc::now().naive_utc()));
        let graded = active.update(self.db).await?;

        info!(
            "Graded submission {} with {}/{}",
            graded.id, request.score, owner.max_score
        );
        submission_views(self.db, self.storage, vec![graded], owner.due_at)
            .await?
            .pop()
            .ok_or_else(|| ServiceError::not_found("Submission not found."))
    }

    /// Attaches a supplementary document to one of the caller's assignments.
    #[instrument(skip(self, file), fields(file_name = %file.file_name))]
    pub async fn add_resource(
        &self,
        user_id: i32,
        assignment_id: i32,
        file: UploadedFile,
    ) -> Result<ResourceDto> {
        let owner = self
            .owned(user_id, assignment_id, Some(false))
            .await?
            .ok_or_else(|| ServiceError::not_found(NOT_FOUND))?;
        if file.is_empty() {
            return Err(ServiceError::validation("Please choose a file to upload."));
        }

        let file_name = file.file_name.clone();
        let path = self.storage.save_assignment_file(owner.id, file).await?;
        let resource = assignment_resource::ActiveModel {
            assignment_id: Set(owner.id),
            file_name: Set(file_name),
            file_path: Set(path),
            uploaded_at: Set(Utc::now().naive_utc()),
            ..Default::default()
        }
        .insert(self.db)
        .await?;

        info!("Attached resource {} to assignment {}", resource.id, owner.id);
        Ok(resource_view(self.storage, resource))
    }

    /// Removes a supplementary document and its file. `false` when the
    /// document is missing or belongs to someone else's assignment.
    #[instrument(skip(self))]
    pub async fn delete_resource(&self, user_id: i32, resource_id: i32) -> Result<bool> {
        let Some(resource) = assignment_resource::Entity::find_by_id(resource_id)
            .one(self.db)
            .await?
        else {
            return Ok(false);
        };
        if self
            .owned(user_id, resource.assignment_id, Some(false))
            .await?
            .is_none()
        {
            return Ok(false);
        }

        let path = resource.file_path.clone();
        resource.delete(self.db).await?;
        self.storage.delete_file(&path).await?;
        info!("Removed resource {}", resource_id);
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryFileStorage;
    use crate::testing::*;

    struct Fixture {
        teacher_user: i32,
        other_teacher_user: i32,
        section: class_section::Model,
        other_section: class_section::Model,
    }

    async fn fixture(db: &DatabaseConnection) -> Fixture {
        let course = create_course(db, "ALG", 3).await;
        let (teacher_user, teacher) = create_faculty(db, "Alice Teacher").await;
        let (other_user, other) = create_faculty(db, "Bob Teacher").await;
        let section = create_section(db, "ALG-A", course.id, teacher.id).await;
        let other_section = create_section(db, "ALG-B", course.id, other.id).await;
        Fixture {
            teacher_user: teacher_user.id,
            other_teacher_user: other_user.id,
            section,
            other_section,
        }
    }

    fn request(section_id: i32, title: &str, day: u32) -> AssignmentRequest {
        AssignmentRequest {
            class_section_id: section_id,
            title: title.to_string(),
            description: Some("Solve the exercises".to_string()),
            due_at: at(day, 23),
            max_score: None,
        }
    }

    #[tokio::test]
    async fn test_create_with_materials_and_list_by_due_date() {
        let db = setup_db().await;
        let storage = MemoryFileStorage::new();
        let f = fixture(&db).await;
        let service = FacultyAssignmentService::new(&db, &storage);

        let materials = AssignmentMaterials {
            exercise: Some(UploadedFile::new("sheet.pdf", b"exercise".to_vec())),
            guide: Some(UploadedFile::new("empty.pdf", Vec::new())),
        };
        let later = service
            .create(f.teacher_user, request(f.section.id, "Homework 2", 20), materials)
            .await
            .unwrap();
        assert_eq!(later.max_score, 100);
        let exercise = later.exercise_file_url.clone().unwrap();
        assert!(exercise.starts_with(&format!("/uploads/assignments/materials/{}_exercise_", later.id)));
        assert!(exercise.ends_with(".pdf"));
        assert!(later.guide_file_url.is_none());
        assert!(storage.contains(&exercise));

        service
            .create(
                f.teacher_user,
                request(f.section.id, "Homework 1", 10),
                AssignmentMaterials::none(),
            )
            .await
            .unwrap();

        let titles: Vec<String> = service
            .list(f.teacher_user)
            .await
            .unwrap()
            .into_iter()
            .map(|a| a.title)
            .collect();
        assert_eq!(titles, vec!["Homework 1".to_string(), "Homework 2".to_string()]);
        assert!(service.list(f.other_teacher_user).await.unwrap().is_empty());

        let options = service.form_options(f.teacher_user).await.unwrap();
        assert_eq!(options.sections.len(), 1);
        assert_eq!(options.sections[0].code, "ALG-A");
    }

    #[tokio::test]
    async fn test_other_faculty_cannot_touch_assignment() {
        let db = setup_db().await;
        let storage = MemoryFileStorage::new();
        let f = fixture(&db).await;
        let service = FacultyAssignmentService::new(&db, &storage);
        let created = service
            .create(f.teacher_user, request(f.section.id, "Essay", 12), AssignmentMaterials::none())
            .await
            .unwrap();

        let hijack = service
            .update(
                f.other_teacher_user,
                created.id,
                request(f.other_section.id, "Hijacked", 12),
                AssignmentMaterials::none(),
            )
            .await;
        assert!(matches!(hijack, Err(ServiceError::NotFound(_))));
        assert!(service.detail(f.other_teacher_user, created.id).await.unwrap().is_none());
        assert!(!service.soft_delete(f.other_teacher_user, created.id).await.unwrap());
        assert!(!service.hard_delete(f.other_teacher_user, created.id).await.unwrap());

        let unchanged = service.detail(f.teacher_user, created.id).await.unwrap().unwrap();
        assert_eq!(unchanged.assignment.title, "Essay");
        assert_eq!(unchanged.assignment.class_section_id, f.section.id);

        // Creating in a section someone else teaches is not found either
        assert!(matches!(
            service
                .create(f.teacher_user, request(f.other_section.id, "Sneaky", 12), AssignmentMaterials::none())
                .await,
            Err(ServiceError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_update_replaces_material_file() {
        let db = setup_db().await;
        let storage = MemoryFileStorage::new();
        let f = fixture(&db).await;
        let service = FacultyAssignmentService::new(&db, &storage);
        let created = service
            .create(
                f.teacher_user,
                request(f.section.id, "Lab", 15),
                AssignmentMaterials {
                    exercise: None,
                    guide: Some(UploadedFile::new("guide-v1.md", b"v1".to_vec())),
                },
            )
            .await
            .unwrap();
        let first_guide = created.guide_file_url.clone().unwrap();

        let mut changed = request(f.section.id, "Lab 1", 16);
        changed.max_score = Some(50);
        let updated = service
            .update(
                f.teacher_user,
                created.id,
                changed,
                AssignmentMaterials {
                    exercise: None,
                    guide: Some(UploadedFile::new("guide-v2.md", b"v2".to_vec())),
                },
            )
            .await
            .unwrap();

        assert_eq!(updated.title, "Lab 1");
        assert_eq!(updated.max_score, 50);
        let second_guide = updated.guide_file_url.unwrap();
        assert_ne!(first_guide, second_guide);
        assert!(!storage.contains(&first_guide));
        assert_eq!(storage.read(&second_guide), Some(b"v2".to_vec()));

        let invalid = AssignmentRequest {
            title: "  ".to_string(),
            max_score: Some(0),
            ..request(f.section.id, "", 16)
        };
        match service
            .update(f.teacher_user, created.id, invalid, AssignmentMaterials::none())
            .await
        {
            Err(ServiceError::Validation(errors)) => assert_eq!(errors.len(), 2),
            other => panic!("expected validation failure, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_grading_checks_owner_and_range() {
        let db = setup_db().await;
        let storage = MemoryFileStorage::new();
        let f = fixture(&db).await;
        let service = FacultyAssignmentService::new(&db, &storage);
        let (_, student) = create_student(&db, "Stu Dent").await;
        enroll(&db, student.id, f.section.id).await;

        let created = service
            .create(f.teacher_user, request(f.section.id, "Quiz", 10), AssignmentMaterials::none())
            .await
            .unwrap();
        let submission = assignment_submission::ActiveModel {
            assignment_id: Set(created.id),
            student_id: Set(student.id),
            submitted_at: Set(at(11, 9)),
            file_path: Set("/uploads/submissions/quiz.pdf".to_string()),
            score: Set(None),
            graded_at: Set(None),
            teacher_comment: Set(None),
            is_deleted: Set(false),
            ..Default::default()
        }
        .insert(&db)
        .await
        .unwrap();

        let grade = |score| GradeRequest {
            score,
            comment: Some(" Good work ".to_string()),
        };
        assert!(matches!(
            service.grade(f.other_teacher_user, submission.id, grade(80)).await,
            Err(ServiceError::NotFound(_))
        ));
        assert!(matches!(
            service.grade(f.teacher_user, submission.id, grade(101)).await,
            Err(ServiceError::Validation(_))
        ));
        assert!(matches!(
            service.grade(f.teacher_user, submission.id, grade(-1)).await,
            Err(ServiceError::Validation(_))
        ));

        let graded = service.grade(f.teacher_user, submission.id, grade(100)).await.unwrap();
        assert_eq!(graded.score, Some(100));
        assert_eq!(graded.teacher_comment.as_deref(), Some("Good work"));
        assert!(graded.graded_at.is_some());
        assert!(graded.is_late);
        assert_eq!(graded.student_name, "Stu Dent");

        let detail = service.detail(f.teacher_user, created.id).await.unwrap().unwrap();
        assert_eq!(detail.submissions.len(), 1);
        assert_eq!(detail.submissions[0].score, Some(100));
    }

    #[tokio::test]
    async fn test_max_score_cannot_drop_below_existing_grade() {
        let db = setup_db().await;
        let storage = MemoryFileStorage::new();
        let f = fixture(&db).await;
        let service = FacultyAssignmentService::new(&db, &storage);
        let (_, student) = create_student(&db, "Stu Dent").await;
        enroll(&db, student.id, f.section.id).await;

        let created = service
            .create(f.teacher_user, request(f.section.id, "Quiz", 10), AssignmentMaterials::none())
            .await
            .unwrap();
        let submission = assignment_submission::ActiveModel {
            assignment_id: Set(created.id),
            student_id: Set(student.id),
            submitted_at: Set(at(9, 9)),
            file_path: Set("/uploads/submissions/quiz.pdf".to_string()),
            score: Set(None),
            graded_at: Set(None),
            teacher_comment: Set(None),
            is_deleted: Set(false),
            ..Default::default()
        }
        .insert(&db)
        .await
        .unwrap();
        service
            .grade(f.teacher_user, submission.id, GradeRequest { score: 90, comment: None })
            .await
            .unwrap();

        let lowered = AssignmentRequest {
            max_score: Some(80),
            ..request(f.section.id, "Quiz", 10)
        };
        match service
            .update(f.teacher_user, created.id, lowered, AssignmentMaterials::none())
            .await
        {
            Err(ServiceError::Validation(errors)) => assert_eq!(
                errors,
                vec!["Max score cannot be lower than an existing grade (90).".to_string()]
            ),
            other => panic!("expected validation failure, got {:?}", other),
        }
        let unchanged = service.detail(f.teacher_user, created.id).await.unwrap().unwrap();
        assert_eq!(unchanged.assignment.max_score, 100);

        // Matching the highest grade is still allowed
        let matching = AssignmentRequest {
            max_score: Some(90),
            ..request(f.section.id, "Quiz", 10)
        };
        let updated = service
            .update(f.teacher_user, created.id, matching, AssignmentMaterials::none())
            .await
            .unwrap();
        assert_eq!(updated.max_score, 90);
    }

    #[tokio::test]
    async fn test_resources_and_recycle_bin() {
        let db = setup_db().await;
        let storage = MemoryFileStorage::new();
        let f = fixture(&db).await;
        let service = FacultyAssignmentService::new(&db, &storage);
        let created = service
            .create(
                f.teacher_user,
                request(f.section.id, "Project", 25),
                AssignmentMaterials {
                    exercise: Some(UploadedFile::new("brief.pdf", b"brief".to_vec())),
                    guide: None,
                },
            )
            .await
            .unwrap();

        let resource = service
            .add_resource(f.teacher_user, created.id, UploadedFile::new("slides.pptx", b"deck".to_vec()))
            .await
            .unwrap();
        assert_eq!(resource.file_name, "slides.pptx");
        assert!(resource
            .file_url
            .starts_with(&format!("/uploads/assignments/{}/slides_", created.id)));
        assert!(matches!(
            service
                .add_resource(f.teacher_user, created.id, UploadedFile::new("blank.txt", Vec::new()))
                .await,
            Err(ServiceError::Validation(_))
        ));
        assert!(!service.delete_resource(f.other_teacher_user, resource.id).await.unwrap());

        let extra = service
            .add_resource(f.teacher_user, created.id, UploadedFile::new("notes.txt", b"n".to_vec()))
            .await
            .unwrap();
        assert!(service.delete_resource(f.teacher_user, extra.id).await.unwrap());
        assert!(!storage.contains(&extra.file_url));
        let detail = service.detail(f.teacher_user, created.id).await.unwrap().unwrap();
        assert_eq!(detail.resources.len(), 1);

        assert!(service.soft_delete(f.teacher_user, created.id).await.unwrap());
        assert!(service.list(f.teacher_user).await.unwrap().is_empty());
        assert_eq!(service.list_deleted(f.teacher_user).await.unwrap().len(), 1);
        assert!(service.restore(f.teacher_user, created.id).await.unwrap());
        assert!(service.list_deleted(f.teacher_user).await.unwrap().is_empty());

        assert_eq!(storage.len(), 2);
        assert!(service.hard_delete(f.teacher_user, created.id).await.unwrap());
        assert!(storage.is_empty());
        assert!(service.list(f.teacher_user).await.unwrap().is_empty());
        assert!(assignment_resource::Entity::find().all(&db).await.unwrap().is_empty());
    }
}
