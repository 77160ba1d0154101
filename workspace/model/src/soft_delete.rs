//! Recycle-bin support shared by every mutable entity.
//!
//! Each entity with an `is_deleted` flag names its key and flag columns so the
//! services can flip or purge rows without per-entity boilerplate.

use sea_orm::EntityTrait;

use crate::entities::{class_schedule, class_section, course, enrollment, faculty, student, user};

pub trait SoftDelete: EntityTrait {
    /// Integer primary key column.
    fn id_column() -> Self::Column;
    /// Boolean column marking a row as deleted.
    fn deleted_column() -> Self::Column;
}

macro_rules! soft_delete {
    ($($module:ident),* $(,)?) => {
        $(
            impl SoftDelete for $module::Entity {
                fn id_column() -> Self::Column {
                    $module::Column::Id
                }

                fn deleted_column() -> Self::Column {
                    $module::Column::IsDeleted
                }
            }
        )*
    };
}

soft_delete!(
    user,
    student,
    faculty,
    course,
    class_section,
    enrollment,
    class_schedule,
);
