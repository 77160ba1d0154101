//! Common transport-layer types shared by the domain services and the HTTP layer.
//! Services assemble these view shapes and handlers serialize them unchanged.

mod days;
pub mod periods;
mod roles;

pub use days::DayOfWeek;
pub use periods::{DEFAULT_PERIOD, PeriodError, PeriodSlot, period_to_time, periods, time_to_period};
pub use roles::Role;

use chrono::{NaiveDateTime, NaiveTime};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Formats the display code of a student profile, e.g. `STU0007`.
pub fn student_code(id: i32) -> String {
    format!("STU{:04}", id)
}

/// Formats the display code of a faculty profile, e.g. `FAC0012`.
pub fn faculty_code(id: i32) -> String {
    format!("FAC{:04}", id)
}

// ===================== Users =====================

/// Account as seen by administrators.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq)]
pub struct UserDto {
    pub id: i32,
    pub full_name: String,
    pub email: String,
    pub phone: Option<String>,
    pub roles: Vec<Role>,
    pub created_at: NaiveDateTime,
    pub is_deleted: bool,
}

/// Request body for creating a user account.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq)]
pub struct CreateUserRequest {
    pub full_name: String,
    pub email: String,
    pub password: String,
    pub phone: Option<String>,
    /// Defaults to `Guest` when omitted.
    pub role: Option<Role>,
}

/// Request body for editing a user account. The role replaces all current
/// memberships; omitting it leaves the user a `Guest`.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq)]
pub struct UpdateUserRequest {
    pub full_name: String,
    pub email: String,
    pub phone: Option<String>,
    pub role: Option<Role>,
}

/// Compact user reference for select lists.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq)]
pub struct UserOption {
    pub id: i32,
    pub full_name: String,
    pub email: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq)]
pub struct UserSummary {
    pub id: i32,
    pub full_name: String,
    pub email: String,
    pub phone: Option<String>,
}

// ===================== Courses =====================

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq)]
pub struct CourseDto {
    pub id: i32,
    pub code: String,
    pub name: String,
    pub description: Option<String>,
    pub credits: Option<i32>,
    pub created_at: NaiveDateTime,
    pub is_deleted: bool,
}

/// Request body for creating or editing a course.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq)]
pub struct CourseRequest {
    pub code: String,
    pub name: String,
    pub description: Option<String>,
    pub credits: Option<i32>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq)]
pub struct CourseOption {
    pub id: i32,
    pub code: String,
    pub name: String,
}

// ===================== Faculty =====================

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq)]
pub struct FacultyDto {
    pub id: i32,
    /// Display code, e.g. `FAC0001`
    pub code: String,
    pub user_id: i32,
    pub full_name: String,
    pub email: String,
    pub phone: Option<String>,
    pub department: Option<String>,
    pub title: Option<String>,
    pub created_at: NaiveDateTime,
    pub is_deleted: bool,
}

/// Request body for creating or editing a faculty profile.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq)]
pub struct FacultyRequest {
    pub user_id: i32,
    pub department: Option<String>,
    pub title: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq)]
pub struct FacultyOption {
    pub id: i32,
    pub code: String,
    pub full_name: String,
}

// ===================== Students =====================

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq)]
pub struct StudentDto {
    pub id: i32,
    /// Display code, e.g. `STU0001`
    pub code: String,
    pub user_id: i32,
    pub full_name: String,
    pub email: String,
    pub phone: Option<String>,
    pub created_at: NaiveDateTime,
    pub is_deleted: bool,
}

/// Request body for creating or editing a student profile.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq)]
pub struct StudentRequest {
    pub user_id: i32,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq)]
pub struct StudentOption {
    pub id: i32,
    pub code: String,
    pub full_name: String,
    pub email: String,
}

/// Users eligible for a new faculty or student profile.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq)]
pub struct ProfileFormOptions {
    pub users: Vec<UserOption>,
}

// ===================== Class sections =====================

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq)]
pub struct ClassSectionDto {
    pub id: i32,
    pub code: String,
    pub name: Option<String>,
    pub course_id: i32,
    pub course_code: String,
    pub course_name: String,
    pub credits: Option<i32>,
    pub teacher_id: i32,
    pub teacher_name: String,
    pub created_at: NaiveDateTime,
    pub is_deleted: bool,
}

/// Request body for creating or editing a class section.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq)]
pub struct ClassSectionRequest {
    pub code: String,
    pub name: Option<String>,
    pub course_id: i32,
    pub teacher_id: i32,
}

/// Select lists for the class section form.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq)]
pub struct ClassSectionOptions {
    pub courses: Vec<CourseOption>,
    pub teachers: Vec<FacultyOption>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq)]
pub struct SectionOption {
    pub id: i32,
    pub code: String,
    pub name: Option<String>,
    pub course_name: String,
}

/// A section taught by the caller, with its head count.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq)]
pub struct TeachingClassDto {
    pub id: i32,
    pub code: String,
    pub name: Option<String>,
    pub course_id: i32,
    pub course_code: String,
    pub course_name: String,
    pub credits: Option<i32>,
    pub student_count: u64,
}

/// A section the caller is enrolled in.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq)]
pub struct StudentClassDto {
    pub id: i32,
    pub code: String,
    pub name: Option<String>,
    pub course_code: String,
    pub course_name: String,
    pub credits: Option<i32>,
    pub teacher_name: String,
    pub enrolled_at: NaiveDateTime,
}

// ===================== Enrollments =====================

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq)]
pub struct EnrollmentDto {
    pub id: i32,
    pub student_id: i32,
    pub student_code: String,
    pub student_name: String,
    pub class_section_id: i32,
    pub class_code: String,
    pub enrolled_at: NaiveDateTime,
    pub is_deleted: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq)]
pub struct EnrolledStudentDto {
    pub enrollment_id: i32,
    pub student_id: i32,
    pub student_code: String,
    pub full_name: String,
    pub email: String,
    pub enrolled_at: NaiveDateTime,
}

/// Roster of a section plus the active students that could still join it.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq)]
pub struct EnrollmentManageView {
    pub class_section: ClassSectionDto,
    pub enrolled: Vec<EnrolledStudentDto>,
    pub available: Vec<StudentOption>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq)]
pub struct AddStudentsRequest {
    pub student_ids: Vec<i32>,
}

/// Outcome of a bulk enrollment.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, ToSchema, PartialEq, Eq)]
pub struct EnrollmentResult {
    pub created: u32,
    pub restored: u32,
}

// ===================== Schedules =====================

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq)]
pub struct ScheduleDto {
    pub id: i32,
    pub class_section_id: i32,
    pub class_code: String,
    pub course_name: String,
    pub teacher_name: String,
    pub day_of_week: DayOfWeek,
    pub start_time: NaiveTime,
    pub end_time: NaiveTime,
    /// Period starting at `start_time`, if any
    pub period: Option<i32>,
    pub room: Option<String>,
    pub is_deleted: bool,
}

/// Request body for creating or editing a schedule slot. Clock times come
/// from the period table.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq)]
pub struct ScheduleRequest {
    pub class_section_id: i32,
    pub day_of_week: DayOfWeek,
    pub period: i32,
    pub room: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq)]
pub struct ScheduleFormOptions {
    pub sections: Vec<SectionOption>,
    pub periods: Vec<PeriodSlot>,
    pub days: Vec<DayOfWeek>,
}

// ===================== Assignments =====================

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq)]
pub struct AssignmentDto {
    pub id: i32,
    pub class_section_id: i32,
    pub class_code: String,
    pub course_name: String,
    pub title: String,
    pub description: Option<String>,
    pub due_at: NaiveDateTime,
    pub max_score: i32,
    pub exercise_file_url: Option<String>,
    pub guide_file_url: Option<String>,
    pub created_at: NaiveDateTime,
    pub is_deleted: bool,
}

/// Assignment fields shared by the create and edit forms.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq)]
pub struct AssignmentRequest {
    pub class_section_id: i32,
    pub title: String,
    pub description: Option<String>,
    pub due_at: NaiveDateTime,
    /// Defaults to 100
    pub max_score: Option<i32>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq)]
pub struct SubmissionDto {
    pub id: i32,
    pub assignment_id: i32,
    pub student_id: i32,
    pub student_code: String,
    pub student_name: String,
    pub submitted_at: NaiveDateTime,
    pub file_url: String,
    pub score: Option<i32>,
    pub graded_at: Option<NaiveDateTime>,
    pub teacher_comment: Option<String>,
    pub is_late: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq)]
pub struct ResourceDto {
    pub id: i32,
    pub assignment_id: i32,
    pub file_name: String,
    pub file_url: String,
    pub uploaded_at: NaiveDateTime,
}

/// Faculty view of one assignment with every active submission.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq)]
pub struct AssignmentDetailDto {
    pub assignment: AssignmentDto,
    pub resources: Vec<ResourceDto>,
    pub submissions: Vec<SubmissionDto>,
}

/// Row of a student's assignment list.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq)]
pub struct StudentAssignmentDto {
    pub id: i32,
    pub title: String,
    pub class_code: String,
    pub course_name: String,
    pub due_at: NaiveDateTime,
    pub max_score: i32,
    pub is_submitted: bool,
    pub score: Option<i32>,
    pub is_late: bool,
}

/// Student view of one assignment with their own submission.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq)]
pub struct StudentAssignmentDetailDto {
    pub assignment: AssignmentDto,
    pub resources: Vec<ResourceDto>,
    pub submission: Option<SubmissionDto>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq)]
pub struct GradeRequest {
    pub score: i32,
    pub comment: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq)]
pub struct AssignmentFormOptions {
    pub sections: Vec<SectionOption>,
}

// ===================== Profiles =====================

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq)]
pub struct StudentProfileDto {
    pub user: UserSummary,
    pub student_id: i32,
    pub student_code: String,
    pub classes: Vec<StudentClassDto>,
    pub total_credits: i32,
    pub today_schedule: Vec<ScheduleDto>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq)]
pub struct FacultyProfileDto {
    pub user: UserSummary,
    pub faculty_id: i32,
    pub faculty_code: String,
    pub department: Option<String>,
    pub title: Option<String>,
    pub classes: Vec<TeachingClassDto>,
    /// Distinct courses across the caller's sections
    pub total_courses: u64,
    pub total_credits: i32,
    pub today_schedule: Vec<ScheduleDto>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq)]
pub struct AdminDashboardDto {
    pub user: UserSummary,
    pub total_students: u64,
    pub total_faculty: u64,
    pub total_courses: u64,
    pub active_classes: u64,
    pub today_schedules: u64,
}

/// Landing view of the caller, shaped by their role.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq)]
#[serde(tag = "role")]
pub enum ProfileDto {
    Admin(AdminDashboardDto),
    Faculty(FacultyProfileDto),
    Student(StudentProfileDto),
}
