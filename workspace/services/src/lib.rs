pub mod assignment;
pub mod caller;
pub mod class_section;
pub mod course;
pub mod enrollment;
pub mod error;
pub mod faculty;
pub mod identity;
pub mod profile;
pub mod recycle;
pub mod schedule;
pub mod seed;
pub mod storage;
pub mod student;
pub mod user;

mod lookup;

#[cfg(test)]
mod testing;

pub use caller::Caller;
pub use error::{Result, ServiceError};
