use common::DayOfWeek;
use sea_orm::entity::prelude::*;

/// A weekly meeting slot of a class section.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "class_schedules")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub class_section_id: i32,
    pub day_of_week: DayOfWeek,
    /// Always earlier than `end_time`.
    pub start_time: Time,
    pub end_time: Time,
    pub room: Option<String>,
    #[sea_orm(default_value = "false")]
    pub is_deleted: bool,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::class_section::Entity",
        from = "Column::ClassSectionId",
        to = "super::class_section::Column::Id",
        on_delete = "Cascade"
    )]
    ClassSection,
}

impl Related<super::class_section::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::ClassSection.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
