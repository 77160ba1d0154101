//! This file serves as the root for all SeaORM entity modules.
//! Every mutable entity carries an `is_deleted` flag so rows can move to a
//! recycle bin before they are physically removed.

pub mod assignment;
pub mod assignment_resource;
pub mod assignment_submission;
pub mod class_schedule;
pub mod class_section;
pub mod course;
pub mod enrollment;
pub mod faculty;
pub mod student;
pub mod user;
pub mod user_role;

pub mod prelude {
    //! A prelude module for easy importing of all entities.
    pub use super::assignment::Entity as Assignment;
    pub use super::assignment_resource::Entity as AssignmentResource;
    pub use super::assignment_submission::Entity as AssignmentSubmission;
    pub use super::class_schedule::Entity as ClassSchedule;
    pub use super::class_section::Entity as ClassSection;
    pub use super::course::Entity as Course;
    pub use super::enrollment::Entity as Enrollment;
    pub use super::faculty::Entity as Faculty;
    pub use super::student::Entity as Student;
    pub use super::user::Entity as User;
    pub use super::user_role::Entity as UserRole;
}
