//! Assignments, hand-ins and supplementary documents.
//!
//! The teaching side lives in [`FacultyAssignmentService`], which only ever
//! sees assignments of active sections the caller teaches. The learning side
//! lives in [`StudentAssignmentService`], which requires an active enrollment
//! in the assignment's section. Both take the caller's user id and resolve
//! the matching profile themselves.

mod faculty;
mod student;

pub use faculty::FacultyAssignmentService;
pub use student::StudentAssignmentService;

use common::{AssignmentDto, ResourceDto, SubmissionDto};
use model::entities::{assignment, assignment_resource, assignment_submission};
use sea_orm::{ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder};

use crate::error::Result;
use crate::lookup;
use crate::storage::{FileStorage, UploadedFile};

/// Files sent along with an assignment form. Missing or empty uploads keep
/// the stored file.
#[derive(Debug, Clone, Default)]
pub struct AssignmentMaterials {
    pub exercise: Option<UploadedFile>,
    pub guide: Option<UploadedFile>,
}

impl AssignmentMaterials {
    pub fn none() -> Self {
        Self::default()
    }
}

pub(crate) async fn assignment_views(
    db: &DatabaseConnection,
    storage: &dyn FileStorage,
    assignments: Vec<assignment::Model>,
) -> Result<Vec<AssignmentDto>> {
    let sections = lookup::sections_by_id(db, assignments.iter().map(|a| a.class_section_id)).await?;
    let courses = lookup::courses_by_id(db, sections.values().map(|s| s.course_id)).await?;

    Ok(assignments
        .into_iter()
        .map(|a| {
            let section = sections.get(&a.class_section_id);
            AssignmentDto {
                id: a.id,
                class_section_id: a.class_section_id,
                class_code: section.map(|s| s.code.clone()).unwrap_or_default(),
                course_name: section
                    .and_then(|s| courses.get(&s.course_id))
                    .map(|c| c.name.clone())
                    .unwrap_or_default(),
                title: a.title,
                description: a.description,
                due_at: a.due_at,
                max_score: a.max_score,
                exercise_file_url: a.exercise_file_path.as_deref().map(|p| storage.public_url(p)),
                guide_file_url: a.guide_file_path.as_deref().map(|p| storage.public_url(p)),
                created_at: a.created_at,
                is_deleted: a.is_deleted,
            }
        })
        .collect())
}

pub(crate) fn resource_view(storage: &dyn FileStorage, resource: assignment_resource::Model) -> ResourceDto {
    ResourceDto {
        id: resource.id,
        assignment_id: resource.assignment_id,
        file_name: resource.file_name,
        file_url: storage.public_url(&resource.file_path),
        uploaded_at: resource.uploaded_at,
    }
}

pub(crate) async fn resources_of(
    db: &DatabaseConnection,
    storage: &dyn FileStorage,
    assignment_id: i32,
) -> Result<Vec<ResourceDto>> {
    let resources = assignment_resource::Entity::find()
        .filter(assignment_resource::Column::AssignmentId.eq(assignment_id))
        .order_by_asc(assignment_resource::Column::UploadedAt)
        .all(db)
        .await?;
    Ok(resources
        .into_iter()
        .map(|r| resource_view(storage, r))
        .collect())
}

/// Submission rows as views, ordered by student code, flagged late against
/// `due_at`.
pub(crate) async fn submission_views(
    db: &DatabaseConnection,
    storage: &dyn FileStorage,
    submissions: Vec<assignment_submission::Model>,
    due_at: chrono::NaiveDateTime,
) -> Result<Vec<SubmissionDto>> {
    let students = lookup::students_by_id(db, submissions.iter().map(|s| s.student_id)).await?;

    let mut views: Vec<SubmissionDto> = submissions
        .into_iter()
        .map(|s| {
            let is_late = s.is_late(due_at);
            SubmissionDto {
                id: s.id,
                assignment_id: s.assignment_id,
                student_id: s.student_id,
                student_code: common::student_code(s.student_id),
                student_name: students
                    .get(&s.student_id)
                    .map(|(_, u)| u.full_name.clone())
                    .unwrap_or_default(),
                submitted_at: s.submitted_at,
                file_url: storage.public_url(&s.file_path),
                score: s.score,
                graded_at: s.graded_at,
                teacher_comment: s.teacher_comment,
                is_late,
            }
        })
        .collect();
    views.sort_by(|a, b| a.student_code.cmp(&b.student_code));
    Ok(views)
}

/// The upload, unless it is missing or empty.
fn non_empty(file: Option<UploadedFile>) -> Option<UploadedFile> {
    file.filter(|f| !f.is_empty())
}
