use crate::handlers::{
    assignments::{
        add_resource, assignment_form_options, create_assignment, delete_assignment,
        delete_resource, get_assignment, grade_submission, list_assignments,
        list_deleted_assignments, my_assignment, my_assignments, purge_assignment,
        restore_assignment, submit_assignment, update_assignment,
    },
    class_sections::{
        class_section_form_options, create_class_section, delete_class_section, enrolled_classes,
        get_class_section, list_class_sections, list_deleted_class_sections, purge_class_section,
        restore_class_section, teaching_classes, update_class_section,
    },
    courses::{
        course_options, create_course, delete_course, get_course, list_courses,
        list_deleted_courses, purge_course, restore_course, update_course,
    },
    enrollments::{
        add_students, list_deleted_enrollments, manage_enrollments, purge_enrollment,
        remove_student, restore_enrollment,
    },
    faculties::{
        create_faculty, delete_faculty, faculty_form_options, get_faculty, list_deleted_faculties,
        list_faculties, purge_faculty, restore_faculty, update_faculty,
    },
    health::health_check,
    profile::get_profile,
    schedules::{
        create_schedule, delete_schedule, get_schedule, list_deleted_schedules, list_periods,
        list_schedules, my_schedule, purge_schedule, restore_schedule, schedule_edit_form,
        schedule_form_options, update_schedule,
    },
    students::{
        create_student, delete_student, get_student, list_deleted_students, list_students,
        purge_student, restore_student, student_form_options, student_options, update_student,
    },
    users::{
        create_user, delete_user, get_user, list_deleted_users, list_users, purge_user,
        restore_user, update_user,
    },
};
use crate::schemas::{ApiDoc, AppState};
use axum::{
    extract::DefaultBodyLimit,
    routing::{delete, get, post, put},
    Router,
};
use std::time::Duration;
use tower::ServiceBuilder;
use tower_http::{
    compression::CompressionLayer, cors::CorsLayer, services::ServeDir, timeout::TimeoutLayer,
    trace::TraceLayer,
};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

/// Largest accepted request body, uploads included
const MAX_BODY_BYTES: usize = 25 * 1024 * 1024;

/// Create application router with all routes and middleware
pub fn create_router(state: AppState) -> Router {
    let uploads = ServeDir::new(state.upload_root.join("uploads"));

    Router::new()
        // Health check
        .route("/health", get(health_check))
        // Accounts
        .route("/api/v1/users", post(create_user))
        .route("/api/v1/users", get(list_users))
        .route("/api/v1/users/deleted", get(list_deleted_users))
        .route("/api/v1/users/:user_id", get(get_user))
        .route("/api/v1/users/:user_id", put(update_user))
        .route("/api/v1/users/:user_id", delete(delete_user))
        .route("/api/v1/users/:user_id/restore", post(restore_user))
        .route("/api/v1/users/:user_id/permanent", delete(purge_user))
        // Courses
        .route("/api/v1/courses", post(create_course))
        .route("/api/v1/courses", get(list_courses))
        .route("/api/v1/courses/deleted", get(list_deleted_courses))
        .route("/api/v1/courses/options", get(course_options))
        .route("/api/v1/courses/:course_id", get(get_course))
        .route("/api/v1/courses/:course_id", put(update_course))
        .route("/api/v1/courses/:course_id", delete(delete_course))
        .route("/api/v1/courses/:course_id/restore", post(restore_course))
        .route("/api/v1/courses/:course_id/permanent", delete(purge_course))
        // Class sections
        .route("/api/v1/class-sections", post(create_class_section))
        .route("/api/v1/class-sections", get(list_class_sections))
        .route("/api/v1/class-sections/deleted", get(list_deleted_class_sections))
        .route("/api/v1/class-sections/form-options", get(class_section_form_options))
        .route("/api/v1/class-sections/teaching", get(teaching_classes))
        .route("/api/v1/class-sections/enrolled", get(enrolled_classes))
        .route("/api/v1/class-sections/:section_id", get(get_class_section))
        .route("/api/v1/class-sections/:section_id", put(update_class_section))
        .route("/api/v1/class-sections/:section_id", delete(delete_class_section))
        .route("/api/v1/class-sections/:section_id/restore", post(restore_class_section))
        .route("/api/v1/class-sections/:section_id/permanent", delete(purge_class_section))
        // Enrollments
        .route("/api/v1/class-sections/:section_id/enrollments", get(manage_enrollments))
        .route("/api/v1/class-sections/:section_id/enrollments", post(add_students))
        .route(
            "/api/v1/class-sections/:section_id/enrollments/:student_id",
            delete(remove_student),
        )
        .route("/api/v1/enrollments/deleted", get(list_deleted_enrollments))
        .route("/api/v1/enrollments/:enrollment_id/restore", post(restore_enrollment))
        .route("/api/v1/enrollments/:enrollment_id/permanent", delete(purge_enrollment))
        // Faculty profiles
        .route("/api/v1/faculties", post(create_faculty))
        .route("/api/v1/faculties", get(list_faculties))
        .route("/api/v1/faculties/deleted", get(list_deleted_faculties))
        .route("/api/v1/faculties/form-options", get(faculty_form_options))
        .route("/api/v1/faculties/:faculty_id", get(get_faculty))
        .route("/api/v1/faculties/:faculty_id", put(update_faculty))
        .route("/api/v1/faculties/:faculty_id", delete(delete_faculty))
        .route("/api/v1/faculties/:faculty_id/restore", post(restore_faculty))
        .route("/api/v1/faculties/:faculty_id/permanent", delete(purge_faculty))
        // Student profiles
        .route("/api/v1/students", post(create_student))
        .route("/api/v1/students", get(list_students))
        .route("/api/v1/students/deleted", get(list_deleted_students))
        .route("/api/v1/students/options", get(student_options))
        .route("/api/v1/students/form-options", get(student_form_options))
        .route("/api/v1/students/:student_id", get(get_student))
        .route("/api/v1/students/:student_id", put(update_student))
        .route("/api/v1/students/:student_id", delete(delete_student))
        .route("/api/v1/students/:student_id/restore", post(restore_student))
        .route("/api/v1/students/:student_id/permanent", delete(purge_student))
        // Schedules
        .route("/api/v1/schedules", post(create_schedule))
        .route("/api/v1/schedules", get(list_schedules))
        .route("/api/v1/schedules/deleted", get(list_deleted_schedules))
        .route("/api/v1/schedules/form-options", get(schedule_form_options))
        .route("/api/v1/schedules/periods", get(list_periods))
        .route("/api/v1/schedules/mine", get(my_schedule))
        .route("/api/v1/schedules/:schedule_id", get(get_schedule))
        .route("/api/v1/schedules/:schedule_id", put(update_schedule))
        .route("/api/v1/schedules/:schedule_id", delete(delete_schedule))
        .route("/api/v1/schedules/:schedule_id/edit", get(schedule_edit_form))
        .route("/api/v1/schedules/:schedule_id/restore", post(restore_schedule))
        .route("/api/v1/schedules/:schedule_id/permanent", delete(purge_schedule))
        // Assignments, teaching side
        .route("/api/v1/assignments", post(create_assignment))
        .route("/api/v1/assignments", get(list_assignments))
        .route("/api/v1/assignments/deleted", get(list_deleted_assignments))
        .route("/api/v1/assignments/form-options", get(assignment_form_options))
        .route("/api/v1/assignments/:assignment_id", get(get_assignment))
        .route("/api/v1/assignments/:assignment_id", put(update_assignment))
        .route("/api/v1/assignments/:assignment_id", delete(delete_assignment))
        .route("/api/v1/assignments/:assignment_id/restore", post(restore_assignment))
        .route("/api/v1/assignments/:assignment_id/permanent", delete(purge_assignment))
        .route("/api/v1/assignments/:assignment_id/resources", post(add_resource))
        .route("/api/v1/resources/:resource_id", delete(delete_resource))
        .route("/api/v1/submissions/:submission_id/grade", post(grade_submission))
        // Assignments, learning side
        .route("/api/v1/my-assignments", get(my_assignments))
        .route("/api/v1/my-assignments/:assignment_id", get(my_assignment))
        .route(
            "/api/v1/my-assignments/:assignment_id/submission",
            post(submit_assignment),
        )
        // Dashboards
        .route("/api/v1/profile", get(get_profile))
        // Uploaded files
        .nest_service("/uploads", uploads)
        // Swagger UI
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        // Add middleware
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(CompressionLayer::new())
                .layer(TimeoutLayer::new(Duration::from_secs(30)))
                .layer(CorsLayer::permissive())
                .layer(DefaultBodyLimit::max(MAX_BODY_BYTES)),
        )
        .with_state(state)
}
