pub mod assignments;
pub mod class_sections;
pub mod courses;
pub mod enrollments;
pub mod faculties;
pub mod health;
pub mod profile;
pub mod schedules;
pub mod students;
pub mod users;
