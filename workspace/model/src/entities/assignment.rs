use sea_orm::entity::prelude::*;

/// Default maximum score of a new assignment.
pub const DEFAULT_MAX_SCORE: i32 = 100;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "assignments")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub class_section_id: i32,
    pub title: String,
    pub description: Option<String>,
    pub due_at: DateTime,
    #[sea_orm(default_value = 100)]
    pub max_score: i32,
    /// Storage path of the exercise sheet, if uploaded.
    pub exercise_file_path: Option<String>,
    /// Storage path of the guide, if uploaded.
    pub guide_file_path: Option<String>,
    pub created_at: DateTime,
    #[sea_orm(default_value = "false")]
    pub is_deleted: bool,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::class_section::Entity",
        from = "Column::ClassSectionId",
        to = "super::class_section::Column::Id",
        on_delete = "Restrict"
    )]
    ClassSection,
    #[sea_orm(has_many = "super::assignment_submission::Entity")]
    AssignmentSubmission,
    #[sea_orm(has_many = "super::assignment_resource::Entity")]
    AssignmentResource,
}

impl Related<super::class_section::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::ClassSection.def()
    }
}

impl Related<super::assignment_submission::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::AssignmentSubmission.def()
    }
}

impl Related<super::assignment_resource::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::AssignmentResource.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
