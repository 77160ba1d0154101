use common::CourseDto;
use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "courses")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    /// Unique among non-deleted courses, e.g. "CS101".
    pub code: String,
    pub name: String,
    pub description: Option<String>,
    pub credits: Option<i32>,
    pub created_at: DateTime,
    #[sea_orm(default_value = "false")]
    pub is_deleted: bool,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::class_section::Entity")]
    ClassSection,
}

impl Related<super::class_section::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::ClassSection.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl From<Model> for CourseDto {
    fn from(model: Model) -> Self {
        Self {
            id: model.id,
            code: model.code,
            name: model.name,
            description: model.description,
            credits: model.credits,
            created_at: model.created_at,
            is_deleted: model.is_deleted,
        }
    }
}
