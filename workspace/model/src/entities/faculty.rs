use sea_orm::entity::prelude::*;

/// Faculty (teacher) profile of a user.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "faculties")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub user_id: i32,
    pub department: Option<String>,
    pub title: Option<String>,
    pub created_at: DateTime,
    #[sea_orm(default_value = "false")]
    pub is_deleted: bool,
}

impl Model {
    /// Display code such as `FAC0001`.
    pub fn code(&self) -> String {
        common::faculty_code(self.id)
    }
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::user::Entity",
        from = "Column::UserId",
        to = "super::user::Column::Id",
        on_delete = "Cascade"
    )]
    User,
    /// Sections taught by this faculty member.
    #[sea_orm(has_many = "super::class_section::Entity")]
    ClassSection,
}

impl Related<super::user::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::User.def()
    }
}

impl Related<super::class_section::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::ClassSection.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
