use sea_orm::entity::prelude::*;

/// A student's hand-in for an assignment. Resubmitting overwrites the row and
/// clears any previous grade.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "assignment_submissions")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub assignment_id: i32,
    pub student_id: i32,
    pub submitted_at: DateTime,
    pub file_path: String,
    /// Set only by grading.
    pub score: Option<i32>,
    pub graded_at: Option<DateTime>,
    pub teacher_comment: Option<String>,
    #[sea_orm(default_value = "false")]
    pub is_deleted: bool,
}

impl Model {
    pub fn is_graded(&self) -> bool {
        self.score.is_some()
    }

    /// Whether the hand-in arrived after `due_at`.
    pub fn is_late(&self, due_at: DateTime) -> bool {
        self.submitted_at > due_at
    }
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::assignment::Entity",
        from = "Column::AssignmentId",
        to = "super::assignment::Column::Id",
        on_delete = "Cascade"
    )]
    Assignment,
    #[sea_orm(
        belongs_to = "super::student::Entity",
        from = "Column::StudentId",
        to = "super::student::Column::Id",
        on_delete = "Restrict"
    )]
    Student,
}

impl Related<super::assignment::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Assignment.def()
    }
}

impl Related<super::student::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Student.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
