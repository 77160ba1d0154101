pub mod entities;
pub mod soft_delete;

pub use soft_delete::SoftDelete;
