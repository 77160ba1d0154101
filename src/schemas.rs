use axum::Json;
use common::{
    AddStudentsRequest, AdminDashboardDto, AssignmentDetailDto, AssignmentDto,
    AssignmentFormOptions, ClassSectionDto, ClassSectionOptions, ClassSectionRequest,
    CourseDto, CourseOption, CourseRequest, CreateUserRequest, DayOfWeek, EnrolledStudentDto,
    EnrollmentDto, EnrollmentManageView, EnrollmentResult, FacultyDto, FacultyOption,
    FacultyProfileDto, FacultyRequest, GradeRequest, PeriodSlot, ProfileDto, ProfileFormOptions,
    ResourceDto, Role, ScheduleDto, ScheduleFormOptions, ScheduleRequest, SectionOption,
    StudentAssignmentDetailDto, StudentAssignmentDto, StudentClassDto, StudentDto, StudentOption,
    StudentProfileDto, StudentRequest, SubmissionDto, TeachingClassDto, UpdateUserRequest,
    UserDto, UserOption, UserSummary,
};
use sea_orm::DatabaseConnection;
use serde::{Deserialize, Serialize};
use services::identity::IdentityProvider;
use services::storage::FileStorage;
use std::path::PathBuf;
use std::sync::Arc;
use utoipa::openapi::security::{ApiKey, ApiKeyValue, SecurityScheme};
use utoipa::{IntoParams, Modify, OpenApi, ToSchema};
use validator::Validate;

use crate::handlers::assignments::{AssignmentUpload, FileUpload};

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    /// Database connection
    pub db: DatabaseConnection,
    /// Where uploaded files live
    pub storage: Arc<dyn FileStorage>,
    /// Accounts and role membership
    pub identity: Arc<dyn IdentityProvider>,
    /// Directory served under `/uploads`
    pub upload_root: PathBuf,
}

/// Query parameters for listing class sections
#[derive(Debug, Deserialize, ToSchema, IntoParams, Validate)]
#[into_params(parameter_in = Query)]
pub struct SectionListQuery {
    /// Only sections of this course
    #[validate(range(min = 1))]
    pub course_id: Option<i32>,
}

/// Query parameters for faculty and student form options
#[derive(Debug, Deserialize, ToSchema, IntoParams, Validate)]
#[into_params(parameter_in = Query)]
pub struct ProfileFormQuery {
    /// User currently linked to the edited profile, kept selectable
    #[validate(range(min = 1))]
    pub keep_user_id: Option<i32>,
}

/// Query parameters for the profile dashboard
#[derive(Debug, Deserialize, ToSchema, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ProfileQuery {
    /// Day treated as today (defaults to the current UTC weekday)
    pub day: Option<DayOfWeek>,
}

/// API response wrapper
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ApiResponse<T> {
    /// Response data
    pub data: T,
    /// Response message
    pub message: String,
    /// Success status
    pub success: bool,
}

impl<T> ApiResponse<T> {
    pub fn ok(data: T, message: impl Into<String>) -> Json<Self> {
        Json(Self {
            data,
            message: message.into(),
            success: true,
        })
    }
}

/// Error response
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ErrorResponse {
    /// Error message
    pub error: String,
    /// Error code
    pub code: String,
    /// Success status (always false for errors)
    pub success: bool,
    /// Every problem found, one message each
    pub errors: Vec<String>,
}

/// Health check response
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct HealthResponse {
    /// Service status
    pub status: String,
    /// Service version
    pub version: String,
    /// Database connection status
    pub database: String,
}

struct UserIdHeader;

impl Modify for UserIdHeader {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "user_id",
                SecurityScheme::ApiKey(ApiKey::Header(ApiKeyValue::new(
                    crate::auth::USER_ID_HEADER,
                ))),
            );
        }
    }
}

/// OpenAPI documentation
#[derive(OpenApi)]
#[openapi(
    paths(
        crate::handlers::health::health_check,
        crate::handlers::users::list_users,
        crate::handlers::users::list_deleted_users,
        crate::handlers::users::get_user,
        crate::handlers::users::create_user,
        crate::handlers::users::update_user,
        crate::handlers::users::delete_user,
        crate::handlers::users::restore_user,
        crate::handlers::users::purge_user,
        crate::handlers::courses::list_courses,
        crate::handlers::courses::list_deleted_courses,
        crate::handlers::courses::course_options,
        crate::handlers::courses::get_course,
        crate::handlers::courses::create_course,
        crate::handlers::courses::update_course,
        crate::handlers::courses::delete_course,
        crate::handlers::courses::restore_course,
        crate::handlers::courses::purge_course,
        crate::handlers::class_sections::list_class_sections,
        crate::handlers::class_sections::list_deleted_class_sections,
        crate::handlers::class_sections::class_section_form_options,
        crate::handlers::class_sections::get_class_section,
        crate::handlers::class_sections::create_class_section,
        crate::handlers::class_sections::update_class_section,
        crate::handlers::class_sections::delete_class_section,
        crate::handlers::class_sections::restore_class_section,
        crate::handlers::class_sections::purge_class_section,
        crate::handlers::class_sections::teaching_classes,
        crate::handlers::class_sections::enrolled_classes,
        crate::handlers::faculties::list_faculties,
        crate::handlers::faculties::list_deleted_faculties,
        crate::handlers::faculties::faculty_form_options,
        crate::handlers::faculties::get_faculty,
        crate::handlers::faculties::create_faculty,
        crate::handlers::faculties::update_faculty,
        crate::handlers::faculties::delete_faculty,
        crate::handlers::faculties::restore_faculty,
        crate::handlers::faculties::purge_faculty,
        crate::handlers::students::list_students,
        crate::handlers::students::list_deleted_students,
        crate::handlers::students::student_options,
        crate::handlers::students::student_form_options,
        crate::handlers::students::get_student,
        crate::handlers::students::create_student,
        crate::handlers::students::update_student,
        crate::handlers::students::delete_student,
        crate::handlers::students::restore_student,
        crate::handlers::students::purge_student,
        crate::handlers::enrollments::manage_enrollments,
        crate::handlers::enrollments::add_students,
        crate::handlers::enrollments::remove_student,
        crate::handlers::enrollments::list_deleted_enrollments,
        crate::handlers::enrollments::restore_enrollment,
        crate::handlers::enrollments::purge_enrollment,
        crate::handlers::schedules::list_schedules,
        crate::handlers::schedules::list_deleted_schedules,
        crate::handlers::schedules::schedule_form_options,
        crate::handlers::schedules::list_periods,
        crate::handlers::schedules::my_schedule,
        crate::handlers::schedules::get_schedule,
        crate::handlers::schedules::schedule_edit_form,
        crate::handlers::schedules::create_schedule,
        crate::handlers::schedules::update_schedule,
        crate::handlers::schedules::delete_schedule,
        crate::handlers::schedules::restore_schedule,
        crate::handlers::schedules::purge_schedule,
        crate::handlers::assignments::list_assignments,
        crate::handlers::assignments::list_deleted_assignments,
        crate::handlers::assignments::assignment_form_options,
        crate::handlers::assignments::get_assignment,
        crate::handlers::assignments::create_assignment,
        crate::handlers::assignments::update_assignment,
        crate::handlers::assignments::delete_assignment,
        crate::handlers::assignments::restore_assignment,
        crate::handlers::assignments::purge_assignment,
        crate::handlers::assignments::grade_submission,
        crate::handlers::assignments::add_resource,
        crate::handlers::assignments::delete_resource,
        crate::handlers::assignments::my_assignments,
        crate::handlers::assignments::my_assignment,
        crate::handlers::assignments::submit_assignment,
        crate::handlers::profile::get_profile,
    ),
    components(
        schemas(
            ErrorResponse,
            HealthResponse,
            SectionListQuery,
            ProfileFormQuery,
            ProfileQuery,
            AssignmentUpload,
            FileUpload,
            Role,
            DayOfWeek,
            UserDto,
            UserOption,
            UserSummary,
            CreateUserRequest,
            UpdateUserRequest,
            CourseDto,
            CourseRequest,
            CourseOption,
            FacultyDto,
            FacultyRequest,
            FacultyOption,
            StudentDto,
            StudentRequest,
            StudentOption,
            ProfileFormOptions,
            ClassSectionDto,
            ClassSectionRequest,
            ClassSectionOptions,
            SectionOption,
            TeachingClassDto,
            StudentClassDto,
            EnrollmentDto,
            EnrolledStudentDto,
            EnrollmentManageView,
            AddStudentsRequest,
            EnrollmentResult,
            ScheduleDto,
            ScheduleRequest,
            ScheduleFormOptions,
            PeriodSlot,
            AssignmentDto,
            AssignmentDetailDto,
            AssignmentFormOptions,
            SubmissionDto,
            ResourceDto,
            GradeRequest,
            StudentAssignmentDto,
            StudentAssignmentDetailDto,
            StudentProfileDto,
            FacultyProfileDto,
            AdminDashboardDto,
            ProfileDto,
        )
    ),
    modifiers(&UserIdHeader),
    security(("user_id" = [])),
    tags(
        (name = "health", description = "Health check endpoints"),
        (name = "users", description = "Account administration"),
        (name = "courses", description = "Course catalogue"),
        (name = "class-sections", description = "Class sections and class cards"),
        (name = "faculties", description = "Faculty profiles"),
        (name = "students", description = "Student profiles"),
        (name = "enrollments", description = "Section rosters"),
        (name = "schedules", description = "Weekly class schedules"),
        (name = "assignments", description = "Assignments, submissions and grading"),
        (name = "profile", description = "Role dashboards"),
    ),
    info(
        title = "SIMS API",
        description = "Student Information Management System API - courses, sections, enrollments, schedules and assignments",
        version = "0.1.0",
        license(
            name = "MIT",
            url = "https://opensource.org/licenses/MIT"
        )
    )
)]
pub struct ApiDoc;
