#[cfg(test)]
mod integration_tests {
    use crate::router::create_router;
    use crate::schemas::{ApiResponse, ErrorResponse};
    use crate::test_utils::test_utils::*;
    use axum::http::StatusCode;
    use axum_test::TestServer;
    use axum_test::multipart::{MultipartForm, Part};
    use common::{
        AddStudentsRequest, CourseRequest, CreateUserRequest, DayOfWeek, GradeRequest, Role,
        ScheduleRequest,
    };

    #[tokio::test]
    async fn test_health_check() {
        let app = setup_test_app().await;
        let server = TestServer::new(app).unwrap();

        let response = server.get("/health").await;

        response.assert_status(StatusCode::OK);
        let body: serde_json::Value = response.json();
        assert_eq!(body["status"], "healthy");
        assert_eq!(body["database"], "connected");
    }

    #[tokio::test]
    async fn test_requests_without_user_are_rejected() {
        let _guard = init_test_tracing();
        let state = setup_test_app_state().await;
        let server = TestServer::new(create_router(state)).unwrap();

        let response = server.get("/api/v1/courses").await;
        response.assert_status(StatusCode::UNAUTHORIZED);
        let body: ErrorResponse = response.json();
        assert!(!body.success);
        assert_eq!(body.code, "UNAUTHORIZED");

        let (name, value) = signed_in(4242);
        let response = server.get("/api/v1/courses").add_header(name, value).await;
        response.assert_status(StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_admin_endpoints_require_admin_role() {
        let state = setup_test_app_state().await;
        let (student_user, _) = create_student(&state.db, "Grace Student").await;
        let guest = create_user(&state.db, "Gus Guest", None).await;
        let server = TestServer::new(create_router(state)).unwrap();

        let (name, value) = signed_in(student_user.id);
        let response = server.get("/api/v1/courses").add_header(name, value).await;
        response.assert_status(StatusCode::FORBIDDEN);
        let body: ErrorResponse = response.json();
        assert_eq!(body.error, "This action requires the Admin role.");

        // Guests hold no usable role at all
        let (name, value) = signed_in(guest.id);
        let response = server.get("/api/v1/profile").add_header(name, value).await;
        response.assert_status(StatusCode::FORBIDDEN);
    }

    #[tokio::test]
    async fn test_user_lifecycle() {
        let state = setup_test_app_state().await;
        let admin = create_admin(&state.db).await;
        let server = TestServer::new(create_router(state)).unwrap();
        let (name, value) = signed_in(admin.id);

        let request = CreateUserRequest {
            full_name: "Katherine Johnson".to_string(),
            email: "katherine@example.com".to_string(),
            password: "Orbit#1962".to_string(),
            phone: None,
            role: Some(Role::Faculty),
        };
        let response = server
            .post("/api/v1/users")
            .add_header(name.clone(), value.clone())
            .json(&request)
            .await;
        response.assert_status(StatusCode::CREATED);
        let body: ApiResponse<serde_json::Value> = response.json();
        let user_id = body.data["id"].as_i64().unwrap();
        assert_eq!(body.data["roles"], serde_json::json!(["Faculty"]));

        // Same email again
        let response = server
            .post("/api/v1/users")
            .add_header(name.clone(), value.clone())
            .json(&request)
            .await;
        response.assert_status(StatusCode::BAD_REQUEST);
        let body: ErrorResponse = response.json();
        assert_eq!(body.code, "VALIDATION_ERROR");

        let response = server
            .delete(&format!("/api/v1/users/{}", user_id))
            .add_header(name.clone(), value.clone())
            .await;
        response.assert_status(StatusCode::OK);

        let response = server
            .get(&format!("/api/v1/users/{}", user_id))
            .add_header(name.clone(), value.clone())
            .await;
        response.assert_status(StatusCode::NOT_FOUND);

        let response = server
            .get("/api/v1/users/deleted")
            .add_header(name.clone(), value.clone())
            .await;
        let body: ApiResponse<Vec<serde_json::Value>> = response.json();
        assert!(body.data.iter().any(|u| u["id"] == user_id));

        let response = server
            .post(&format!("/api/v1/users/{}/restore", user_id))
            .add_header(name.clone(), value.clone())
            .await;
        response.assert_status(StatusCode::OK);

        let response = server
            .delete(&format!("/api/v1/users/{}/permanent", user_id))
            .add_header(name.clone(), value.clone())
            .await;
        response.assert_status(StatusCode::OK);

        let response = server
            .post(&format!("/api/v1/users/{}/restore", user_id))
            .add_header(name, value)
            .await;
        response.assert_status(StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_course_lifecycle() {
        let state = setup_test_app_state().await;
        let admin = create_admin(&state.db).await;
        let server = TestServer::new(create_router(state)).unwrap();
        let (name, value) = signed_in(admin.id);

        let request = CourseRequest {
            code: "CS101".to_string(),
            name: "Introduction to Programming".to_string(),
            description: None,
            credits: Some(3),
        };
        let response = server
            .post("/api/v1/courses")
            .add_header(name.clone(), value.clone())
            .json(&request)
            .await;
        response.assert_status(StatusCode::CREATED);
        let body: ApiResponse<serde_json::Value> = response.json();
        assert_eq!(body.message, "Course created successfully");
        let course_id = body.data["id"].as_i64().unwrap();

        let invalid = CourseRequest {
            code: " ".to_string(),
            name: String::new(),
            description: None,
            credits: Some(-1),
        };
        let response = server
            .post("/api/v1/courses")
            .add_header(name.clone(), value.clone())
            .json(&invalid)
            .await;
        response.assert_status(StatusCode::BAD_REQUEST);
        let body: ErrorResponse = response.json();
        assert_eq!(body.errors.len(), 3);

        let response = server
            .delete(&format!("/api/v1/courses/{}", course_id))
            .add_header(name.clone(), value.clone())
            .await;
        response.assert_status(StatusCode::OK);

        // The code is free again while the course sits in the recycle bin
        let response = server
            .post("/api/v1/courses")
            .add_header(name.clone(), value.clone())
            .json(&request)
            .await;
        response.assert_status(StatusCode::CREATED);

        let response = server
            .post(&format!("/api/v1/courses/{}/restore", course_id))
            .add_header(name.clone(), value.clone())
            .await;
        response.assert_status(StatusCode::BAD_REQUEST);
        let body: ErrorResponse = response.json();
        assert_eq!(body.error, "Course code already exists.");

        let response = server
            .get("/api/v1/courses/options")
            .add_header(name, value)
            .await;
        response.assert_status(StatusCode::OK);
        let body: ApiResponse<Vec<serde_json::Value>> = response.json();
        assert_eq!(body.data.len(), 1);
    }

    #[tokio::test]
    async fn test_enrollment_management() {
        let state = setup_test_app_state().await;
        let admin = create_admin(&state.db).await;
        let (_, teacher) = create_faculty(&state.db, "Alan Turing").await;
        let (_, first) = create_student(&state.db, "Grace Hopper").await;
        let (_, second) = create_student(&state.db, "Edsger Dijkstra").await;
        let course = create_course(&state.db, "CS101", 3).await;
        let section = create_section(&state.db, "CS101-A", course.id, teacher.id).await;
        let server = TestServer::new(create_router(state)).unwrap();
        let (name, value) = signed_in(admin.id);
        let url = format!("/api/v1/class-sections/{}/enrollments", section.id);

        let response = server
            .post(&url)
            .add_header(name.clone(), value.clone())
            .json(&AddStudentsRequest { student_ids: vec![] })
            .await;
        response.assert_status(StatusCode::BAD_REQUEST);

        let response = server
            .post(&url)
            .add_header(name.clone(), value.clone())
            .json(&AddStudentsRequest {
                student_ids: vec![first.id, second.id],
            })
            .await;
        response.assert_status(StatusCode::OK);
        let body: ApiResponse<serde_json::Value> = response.json();
        assert_eq!(body.data["created"], 2);
        assert_eq!(body.message, "Added 2 new, restored 0 enrollment(s).");

        let response = server
            .delete(&format!("{}/{}", url, first.id))
            .add_header(name.clone(), value.clone())
            .await;
        response.assert_status(StatusCode::OK);

        let response = server.get(&url).add_header(name.clone(), value.clone()).await;
        let body: ApiResponse<serde_json::Value> = response.json();
        assert_eq!(body.data["enrolled"].as_array().unwrap().len(), 1);
        assert_eq!(body.data["available"].as_array().unwrap().len(), 1);

        // Adding the removed student again brings the old enrollment back
        let response = server
            .post(&url)
            .add_header(name, value)
            .json(&AddStudentsRequest {
                student_ids: vec![first.id],
            })
            .await;
        let body: ApiResponse<serde_json::Value> = response.json();
        assert_eq!(body.data["restored"], 1);
        assert_eq!(body.data["created"], 0);
    }

    #[tokio::test]
    async fn test_schedule_periods_and_weekly_view() {
        let state = setup_test_app_state().await;
        let admin = create_admin(&state.db).await;
        let (teacher_user, teacher) = create_faculty(&state.db, "Alan Turing").await;
        let course = create_course(&state.db, "CS101", 3).await;
        let section = create_section(&state.db, "CS101-A", course.id, teacher.id).await;
        let server = TestServer::new(create_router(state)).unwrap();
        let (name, value) = signed_in(admin.id);

        let response = server
            .post("/api/v1/schedules")
            .add_header(name.clone(), value.clone())
            .json(&ScheduleRequest {
                class_section_id: section.id,
                day_of_week: DayOfWeek::Monday,
                period: 99,
                room: None,
            })
            .await;
        response.assert_status(StatusCode::BAD_REQUEST);
        let body: ErrorResponse = response.json();
        assert_eq!(body.code, "INVALID_PERIOD");

        let response = server
            .post("/api/v1/schedules")
            .add_header(name.clone(), value.clone())
            .json(&ScheduleRequest {
                class_section_id: section.id,
                day_of_week: DayOfWeek::Monday,
                period: 1,
                room: Some(" B204 ".to_string()),
            })
            .await;
        response.assert_status(StatusCode::CREATED);
        let body: ApiResponse<serde_json::Value> = response.json();
        let schedule_id = body.data["id"].as_i64().unwrap();
        assert_eq!(body.data["period"], 1);
        assert_eq!(body.data["room"], "B204");

        let response = server
            .get(&format!("/api/v1/schedules/{}/edit", schedule_id))
            .add_header(name, value)
            .await;
        let body: ApiResponse<ScheduleRequest> = response.json();
        assert_eq!(body.data.period, 1);

        let (name, value) = signed_in(teacher_user.id);
        let response = server.get("/api/v1/schedules/mine").add_header(name.clone(), value.clone()).await;
        response.assert_status(StatusCode::OK);
        let body: ApiResponse<Vec<serde_json::Value>> = response.json();
        assert_eq!(body.data.len(), 1);

        let response = server.get("/api/v1/schedules/periods").add_header(name, value).await;
        let body: ApiResponse<Vec<serde_json::Value>> = response.json();
        assert_eq!(body.data[0]["index"], 1);
    }

    #[tokio::test]
    async fn test_assignment_submission_and_grading() {
        let state = setup_test_app_state().await;
        let (teacher_user, teacher) = create_faculty(&state.db, "Alan Turing").await;
        let (student_user, student) = create_student(&state.db, "Grace Hopper").await;
        let (outsider_user, _) = create_student(&state.db, "Edsger Dijkstra").await;
        let course = create_course(&state.db, "CS101", 3).await;
        let section = create_section(&state.db, "CS101-A", course.id, teacher.id).await;
        enroll(&state.db, student.id, section.id).await;
        let server = TestServer::new(create_router(state)).unwrap();

        let (name, value) = signed_in(teacher_user.id);
        let form = MultipartForm::new()
            .add_text("class_section_id", section.id.to_string())
            .add_text("title", "Lab 1")
            .add_text("due_at", "2099-01-31T23:59")
            .add_part(
                "exercise_file",
                Part::bytes(b"Write a compiler.".to_vec())
                    .file_name("lab1.txt")
                    .mime_type("text/plain"),
            );
        let response = server
            .post("/api/v1/assignments")
            .add_header(name.clone(), value.clone())
            .multipart(form)
            .await;
        response.assert_status(StatusCode::CREATED);
        let body: ApiResponse<serde_json::Value> = response.json();
        let assignment_id = body.data["id"].as_i64().unwrap();
        assert_eq!(body.data["max_score"], 100);
        assert!(body.data["exercise_file_url"].as_str().unwrap().starts_with("/uploads/"));

        let response = server
            .post("/api/v1/assignments")
            .add_header(name.clone(), value.clone())
            .multipart(MultipartForm::new().add_text("title", "No section"))
            .await;
        response.assert_status(StatusCode::BAD_REQUEST);

        // Only enrolled students may hand in
        let (outsider, outsider_value) = signed_in(outsider_user.id);
        let response = server
            .post(&format!("/api/v1/my-assignments/{}/submission", assignment_id))
            .add_header(outsider, outsider_value)
            .multipart(
                MultipartForm::new().add_part("file", Part::bytes(b"x".to_vec()).file_name("x.txt")),
            )
            .await;
        assert!(response.status_code().is_client_error());

        let (student_name, student_value) = signed_in(student_user.id);
        let response = server
            .post(&format!("/api/v1/my-assignments/{}/submission", assignment_id))
            .add_header(student_name.clone(), student_value.clone())
            .multipart(
                MultipartForm::new()
                    .add_part("file", Part::bytes(b"fn main() {}".to_vec()).file_name("main.rs")),
            )
            .await;
        response.assert_status(StatusCode::OK);
        let body: ApiResponse<serde_json::Value> = response.json();
        let submission_id = body.data["id"].as_i64().unwrap();
        assert_eq!(body.data["is_late"], false);

        let response = server
            .post(&format!("/api/v1/submissions/{}/grade", submission_id))
            .add_header(name.clone(), value.clone())
            .json(&GradeRequest {
                score: 101,
                comment: None,
            })
            .await;
        response.assert_status(StatusCode::BAD_REQUEST);

        let response = server
            .post(&format!("/api/v1/submissions/{}/grade", submission_id))
            .add_header(name.clone(), value.clone())
            .json(&GradeRequest {
                score: 95,
                comment: Some("Tidy work".to_string()),
            })
            .await;
        response.assert_status(StatusCode::OK);

        let response = server
            .get("/api/v1/my-assignments")
            .add_header(student_name, student_value)
            .await;
        let body: ApiResponse<Vec<serde_json::Value>> = response.json();
        assert_eq!(body.data.len(), 1);
        assert_eq!(body.data[0]["is_submitted"], true);
        assert_eq!(body.data[0]["score"], 95);

        let response = server
            .get(&format!("/api/v1/assignments/{}", assignment_id))
            .add_header(name, value)
            .await;
        let body: ApiResponse<serde_json::Value> = response.json();
        assert_eq!(body.data["submissions"].as_array().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_profile_dashboards() {
        let state = setup_test_app_state().await;
        let admin = create_admin(&state.db).await;
        let (teacher_user, teacher) = create_faculty(&state.db, "Alan Turing").await;
        let (student_user, student) = create_student(&state.db, "Grace Hopper").await;
        let course = create_course(&state.db, "CS101", 4).await;
        let section = create_section(&state.db, "CS101-A", course.id, teacher.id).await;
        enroll(&state.db, student.id, section.id).await;
        let server = TestServer::new(create_router(state)).unwrap();

        let (name, value) = signed_in(student_user.id);
        let response = server
            .get("/api/v1/profile")
            .add_query_param("day", "Monday")
            .add_header(name, value)
            .await;
        response.assert_status(StatusCode::OK);
        let body: ApiResponse<serde_json::Value> = response.json();
        assert_eq!(body.data["role"], "Student");
        assert_eq!(body.data["total_credits"], 4);
        assert_eq!(body.data["classes"].as_array().unwrap().len(), 1);

        let (name, value) = signed_in(teacher_user.id);
        let response = server.get("/api/v1/profile").add_header(name, value).await;
        let body: ApiResponse<serde_json::Value> = response.json();
        assert_eq!(body.data["role"], "Faculty");
        assert_eq!(body.data["total_courses"], 1);

        let (name, value) = signed_in(admin.id);
        let response = server.get("/api/v1/profile").add_header(name, value).await;
        let body: ApiResponse<serde_json::Value> = response.json();
        assert_eq!(body.data["role"], "Admin");
        assert_eq!(body.data["total_students"], 1);
        assert_eq!(body.data["active_classes"], 1);
    }
}
