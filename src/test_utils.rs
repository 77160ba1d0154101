#[cfg(test)]
pub mod test_utils {
    use crate::auth::USER_ID_HEADER;
    use crate::router::create_router;
    use crate::schemas::AppState;
    use axum::Router;
    use axum::http::{HeaderName, HeaderValue};
    use chrono::Utc;
    use common::Role;
    use migration::{Migrator, MigratorTrait};
    use model::entities::{class_section, course, enrollment, faculty, student, user, user_role};
    use sea_orm::{ActiveModelTrait, Database, DatabaseConnection, Set};
    use services::identity::DbIdentityProvider;
    use services::storage::MemoryFileStorage;
    use std::sync::Arc;
    use tracing::Level;
    use tracing_subscriber::FmtSubscriber;

    /// Create an in-memory SQLite database for testing
    pub async fn setup_test_db() -> DatabaseConnection {
        let db = Database::connect("sqlite::memory:")
            .await
            .expect("Failed to connect to in-memory database");

        // Run migrations
        Migrator::up(&db, None)
            .await
            .expect("Failed to run migrations");

        db
    }

    /// Create AppState for testing. Uploads are kept in memory.
    pub async fn setup_test_app_state() -> AppState {
        let db = setup_test_db().await;

        AppState {
            identity: Arc::new(DbIdentityProvider::new(db.clone())),
            storage: Arc::new(MemoryFileStorage::new()),
            upload_root: "target/test-uploads".into(),
            db,
        }
    }

    /// Initialize tracing for tests with output to STDERR.
    ///
    /// The log level is taken from the RUST_LOG environment variable,
    /// defaulting to WARN if not set.
    pub fn init_test_tracing() -> tracing::subscriber::DefaultGuard {
        let log_level = std::env::var("RUST_LOG")
            .ok()
            .and_then(|level| match level.to_uppercase().as_str() {
                "ERROR" => Some(Level::ERROR),
                "WARN" => Some(Level::WARN),
                "INFO" => Some(Level::INFO),
                "DEBUG" => Some(Level::DEBUG),
                "TRACE" => Some(Level::TRACE),
                _ => None,
            })
            .unwrap_or(Level::WARN);

        let subscriber = FmtSubscriber::builder()
            .with_max_level(log_level)
            .with_writer(std::io::stderr)
            .finish();
        tracing::subscriber::set_default(subscriber)
    }

    /// Create axum app for testing
    pub async fn setup_test_app() -> Router {
        let state = setup_test_app_state().await;
        create_router(state)
    }

    /// Header identifying the signed-in user
    pub fn signed_in(user_id: i32) -> (HeaderName, HeaderValue) {
        (
            HeaderName::from_static(USER_ID_HEADER),
            HeaderValue::from(user_id),
        )
    }

    pub async fn create_user(db: &DatabaseConnection, name: &str, role: Option<Role>) -> user::Model {
        let user = user::ActiveModel {
            full_name: Set(name.to_string()),
            email: Set(format!("{}@example.com", name.to_lowercase().replace(' ', "."))),
            password_hash: Set("not-a-real-hash".to_string()),
            phone: Set(None),
            is_deleted: Set(false),
            created_at: Set(Utc::now().naive_utc()),
            ..Default::default()
        }
        .insert(db)
        .await
        .expect("Failed to create test user");

        if let Some(role) = role {
            user_role::ActiveModel {
                user_id: Set(user.id),
                role: Set(role),
                ..Default::default()
            }
            .insert(db)
            .await
            .expect("Failed to grant test role");
        }
        user
    }

    pub async fn create_admin(db: &DatabaseConnection) -> user::Model {
        create_user(db, "Ada Admin", Some(Role::Admin)).await
    }

    pub async fn create_faculty(db: &DatabaseConnection, name: &str) -> (user::Model, faculty::Model) {
        let user = create_user(db, name, Some(Role::Faculty)).await;
        let faculty = faculty::ActiveModel {
            user_id: Set(user.id),
            department: Set(Some("Computing".to_string())),
            title: Set(Some("Lecturer".to_string())),
            created_at: Set(Utc::now().naive_utc()),
            is_deleted: Set(false),
            ..Default::default()
        }
        .insert(db)
        .await
        .expect("Failed to create test faculty");
        (user, faculty)
    }

    pub async fn create_student(db: &DatabaseConnection, name: &str) -> (user::Model, student::Model) {
        let user = create_user(db, name, Some(Role::Student)).await;
        let student = student::ActiveModel {
            user_id: Set(user.id),
            created_at: Set(Utc::now().naive_utc()),
            is_deleted: Set(false),
            ..Default::default()
        }
        .insert(db)
        .await
        .expect("Failed to create test student");
        (user, student)
    }

    pub async fn create_course(db: &DatabaseConnection, code: &str, credits: i32) -> course::Model {
        course::ActiveModel {
            code: Set(code.to_string()),
            name: Set(format!("{} course", code)),
            description: Set(None),
            credits: Set(Some(credits)),
            created_at: Set(Utc::now().naive_utc()),
            is_deleted: Set(false),
            ..Default::default()
        }
        .insert(db)
        .await
        .expect("Failed to create test course")
    }

    pub async fn create_section(
        db: &DatabaseConnection,
        code: &str,
        course_id: i32,
        teacher_id: i32,
    ) -> class_section::Model {
        class_section::ActiveModel {
            code: Set(code.to_string()),
            name: Set(None),
            course_id: Set(course_id),
            teacher_id: Set(teacher_id),
            created_at: Set(Utc::now().naive_utc()),
            is_deleted: Set(false),
            ..Default::default()
        }
        .insert(db)
        .await
        .expect("Failed to create test class section")
    }

    pub async fn enroll(db: &DatabaseConnection, student_id: i32, class_section_id: i32) -> enrollment::Model {
        enrollment::ActiveModel {
            student_id: Set(student_id),
            class_section_id: Set(class_section_id),
            enrolled_at: Set(Utc::now().naive_utc()),
            is_deleted: Set(false),
            ..Default::default()
        }
        .insert(db)
        .await
        .expect("Failed to create test enrollment")
    }
}
