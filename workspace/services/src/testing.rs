//! Shared fixtures for the service tests.

use chrono::{NaiveDate, NaiveDateTime};
use common::Role;
use migration::{Migrator, MigratorTrait};
use model::entities::{class_section, course, enrollment, faculty, student, user, user_role};
use sea_orm::{ActiveModelTrait, Database, DatabaseConnection, Set};

/// In-memory SQLite database with all migrations applied.
pub async fn setup_db() -> DatabaseConnection {
    let db = Database::connect("sqlite::memory:")
        .await
        .expect("Failed to connect to in-memory database");
    Migrator::up(&db, None)
        .await
        .expect("Failed to run migrations");
    db
}

pub fn at(day: u32, hour: u32) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2025, 3, day)
        .unwrap()
        .and_hms_opt(hour, 0, 0)
        .unwrap()
}

pub async fn create_user(db: &DatabaseConnection, name: &str, role: Option<Role>) -> user::Model {
    let user = user::ActiveModel {
        full_name: Set(name.to_string()),
        email: Set(format!("{}@example.com", name.to_lowercase().replace(' ', "."))),
        password_hash: Set("not-a-real-hash".to_string()),
        phone: Set(None),
        is_deleted: Set(false),
        created_at: Set(at(1, 8)),
        ..Default::default()
    }
    .insert(db)
    .await
    .expect("insert user");

    if let Some(role) = role {
        user_role::ActiveModel {
            user_id: Set(user.id),
            role: Set(role),
            ..Default::default()
        }
        .insert(db)
        .await
        .expect("insert role");
    }
    user
}

pub async fn create_faculty(db: &DatabaseConnection, name: &str) -> (user::Model, faculty::Model) {
    let user = create_user(db, name, Some(Role::Faculty)).await;
    let faculty = faculty::ActiveModel {
        user_id: Set(user.id),
        department: Set(Some("Computing".to_string())),
        title: Set(Some("Lecturer".to_string())),
        created_at: Set(at(1, 9)),
        is_deleted: Set(false),
        ..Default::default()
    }
    .insert(db)
    .await
    .expect("insert faculty");
    (user, faculty)
}

pub async fn create_student(db: &DatabaseConnection, name: &str) -> (user::Model, student::Model) {
    let user = create_user(db, name, Some(Role::Student)).await;
    let student = student::ActiveModel {
        user_id: Set(user.id),
        created_at: Set(at(1, 9)),
        is_deleted: Set(false),
        ..Default::default()
    }
    .insert(db)
    .await
    .expect("insert student");
    (user, student)
}

pub async fn create_course(db: &DatabaseConnection, code: &str, credits: i32) -> course::Model {
    course::ActiveModel {
        code: Set(code.to_string()),
        name: Set(format!("{} course", code)),
        description: Set(None),
        credits: Set(Some(credits)),
        created_at: Set(at(1, 10)),
        is_deleted: Set(false),
        ..Default::default()
    }
    .insert(db)
    .await
    .expect("insert course")
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
        created_at: Set(at(1, 11)),
        is_deleted: Set(false),
        ..Default::default()
    }
    .insert(db)
    .await
    .expect("insert class section")
}

pub async fn enroll(db: &DatabaseConnection, student_id: i32, class_section_id: i32) -> enrollment::Model {
    enrollment::ActiveModel {
        student_id: Set(student_id),
        class_section_id: Set(class_section_id),
        enrolled_at: Set(at(2, 8)),
        is_deleted: Set(false),
        ..Default::default()
    }
    .insert(db)
    .await
    .expect("insert enrollment")
}
