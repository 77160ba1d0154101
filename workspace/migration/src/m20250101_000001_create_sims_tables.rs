use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // Create users table
        manager
            .create_table(
                Table::create()
                    .table(Users::Table)
                    .if_not_exists()
                    .col(pk_auto(Users::Id))
                    .col(string(Users::FullName))
                    .col(string(Users::Email))
                    .col(string(Users::PasswordHash))
                    .col(string_null(Users::Phone))
                    .col(boolean(Users::IsDeleted).default(false))
                    .col(date_time(Users::CreatedAt))
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_users_email")
                    .table(Users::Table)
                    .col(Users::Email)
                    .to_owned(),
            )
            .await?;

        // Create user_roles table
        manager
            .create_table(
                Table::create()
                    .table(UserRoles::Table)
                    .if_not_exists()
                    .col(pk_auto(UserRoles::Id))
                    .col(integer(UserRoles::UserId))
                    .col(string_len(UserRoles::Role, 20))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_user_roles_user")
                            .from(UserRoles::Table, UserRoles::UserId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_user_roles_user_role")
                    .table(UserRoles::Table)
                    .col(UserRoles::UserId)
                    .col(UserRoles::Role)
                    .unique()
                    .to_owned(),
            )
            .await?;

        // Create students table
        manager
            .create_table(
                Table::create()
                    .table(Students::Table)
                    .if_not_exists()
                    .col(pk_auto(Students::Id))
                    .col(integer(Students::UserId))
                    .col(date_time(Students::CreatedAt))
                    .col(boolean(Students::IsDeleted).default(false))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_students_user")
                            .from(Students::Table, Students::UserId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // Create faculties table
        manager
            .create_table(
                Table::create()
                    .table(Faculties::Table)
                    .if_not_exists()
                    .col(pk_auto(Faculties::Id))
                    .col(integer(Faculties::UserId))
                    .col(string_null(Faculties::Department))
                    .col(string_null(Faculties::Title))
                    .col(date_time(Faculties::CreatedAt))
                    .col(boolean(Faculties::IsDeleted).default(false))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_faculties_user")
                            .from(Faculties::Table, Faculties::UserId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // Create courses table
        manager
            .create_table(
                Table::create()
                    .table(Courses::Table)
                    .if_not_exists()
                    .col(pk_auto(Courses::Id))
                    .col(string(Courses::Code))
                    .col(string(Courses::Name))
                    .col(string_null(Courses::Description))
                    .col(integer_null(Courses::Credits))
                    .col(date_time(Courses::CreatedAt))
                    .col(boolean(Courses::IsDeleted).default(false))
                    .to_owned(),
            )
            .await?;

        // Create class_sections table
        manager
            .create_table(
                Table::create()
                    .table(ClassSections::Table)
                    .if_not_exists()
                    .col(pk_auto(ClassSections::Id))
                    .col(string(ClassSections::Code))
                    .col(string_null(ClassSections::Name))
                    .col(integer(ClassSections::CourseId))
                    .col(integer(ClassSections::TeacherId))
                    .col(date_time(ClassSections::CreatedAt))
                    .col(boolean(ClassSections::IsDeleted).default(false))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_class_sections_course")
                            .from(ClassSections::Table, ClassSections::CourseId)
                            .to(Courses::Table, Courses::Id)
                            .on_delete(ForeignKeyAction::Restrict)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_class_sections_teacher")
                            .from(ClassSections::Table, ClassSections::TeacherId)
                            .to(Faculties::Table, Faculties::Id)
                            .on_delete(ForeignKeyAction::Restrict)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // Create enrollments table
        manager
            .create_table(
                Table::create()
                    .table(Enrollments::Table)
                    .if_not_exists()
                    .col(pk_auto(Enrollments::Id))
                    .col(integer(Enrollments::StudentId))
                    .col(integer(Enrollments::ClassSectionId))
                    .col(date_time(Enrollments::EnrolledAt))
                    .col(boolean(Enrollments::IsDeleted).default(false))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_enrollments_student")
                            .from(Enrollments::Table, Enrollments::StudentId)
                            .to(Students::Table, Students::Id)
                            .on_delete(ForeignKeyAction::Restrict)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_enrollments_class_section")
                            .from(Enrollments::Table, Enrollments::ClassSectionId)
                            .to(ClassSections::Table, ClassSections::Id)
                            .on_delete(ForeignKeyAction::Restrict)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_enrollments_student_section")
                    .table(Enrollments::Table)
                    .col(Enrollments::StudentId)
                    .col(Enrollments::ClassSectionId)
                    .to_owned(),
            )
            .await?;

        // Create class_schedules table
        manager
            .create_table(
                Table::create()
                    .table(ClassSchedules::Table)
                    .if_not_exists()
                    .col(pk_auto(ClassSchedules::Id))
                    .col(integer(ClassSchedules::ClassSectionId))
                    .col(integer(ClassSchedules::DayOfWeek))
                    .col(time(ClassSchedules::StartTime))
                    .col(time(ClassSchedules::EndTime))
                    .col(string_null(ClassSchedules::Room))
                    .col(boolean(ClassSchedules::IsDeleted).default(false))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_class_schedules_class_section")
                            .from(ClassSchedules::Table, ClassSchedules::ClassSectionId)
                            .to(ClassSections::Table, ClassSections::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // Create assignments table
        manager
            .create_table(
                Table::create()
                    .table(Assignments::Table)
                    .if_not_exists()
                    .col(pk_auto(Assignments::Id))
                    .col(integer(Assignments::ClassSectionId))
                    .col(string(Assignments::Title))
                    .col(text_null(Assignments::Description))
                    .col(date_time(Assignments::DueAt))
                    .col(integer(Assignments::MaxScore).default(100))
                    .col(string_null(Assignments::ExerciseFilePath))
                    .col(string_null(Assignments::GuideFilePath))
                    .col(date_time(Assignments::CreatedAt))
                    .col(boolean(Assignments::IsDeleted).default(false))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_assignments_class_section")
                            .from(Assignments::Table, Assignments::ClassSectionId)
                            .to(ClassSections::Table, ClassSections::Id)
                            .on_delete(ForeignKeyAction::Restrict)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // Create assignment_submissions table
        manager
            .create_table(
                Table::create()
                    .table(AssignmentSubmissions::Table)
                    .if_not_exists()
                    .col(pk_auto(AssignmentSubmissions::Id))
                    .col(integer(AssignmentSubmissions::AssignmentId))
                    .col(integer(AssignmentSubmissions::StudentId))
                    .col(date_time(AssignmentSubmissions::SubmittedAt))
                    .col(string(AssignmentSubmissions::FilePath))
                    .col(integer_null(AssignmentSubmissions::Score))
                    .col(date_time_null(AssignmentSubmissions::GradedAt))
                    .col(text_null(AssignmentSubmissions::TeacherComment))
                    .col(boolean(AssignmentSubmissions::IsDeleted).default(false))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_assignment_submissions_assignment")
                            .from(AssignmentSubmissions::Table, AssignmentSubmissions::AssignmentId)
                            .to(Assignments::Table, Assignments::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_assignment_submissions_student")
                            .from(AssignmentSubmissions::Table, AssignmentSubmissions::StudentId)
                            .to(Students::Table, Students::Id)
                            .on_delete(ForeignKeyAction::Restrict)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // Create assignment_resources table
        manager
            .create_table(
                Table::create()
                    .table(AssignmentResources::Table)
                    .if_not_exists()
                    .col(pk_auto(AssignmentResources::Id))
                    .col(integer(AssignmentResources::AssignmentId))
                    .col(string(AssignmentResources::FileName))
                    .col(string(AssignmentResources::FilePath))
                    .col(date_time(AssignmentResources::UploadedAt))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_assignment_resources_assignment")
                            .from(AssignmentResources::Table, AssignmentResources::AssignmentId)
                            .to(Assignments::Table, Assignments::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // Drop children before their parents
        manager
            .drop_table(Table::drop().table(AssignmentResources::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(AssignmentSubmissions::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Assignments::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(ClassSchedules::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Enrollments::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(ClassSections::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Courses::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Faculties::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Students::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(UserRoles::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Users::Table).to_owned())
            .await?;

        Ok(())
    }
}

#[derive(DeriveIden)]
enum Users {
    Table,
    Id,
    FullName,
    Email,
    PasswordHash,
    Phone,
    IsDeleted,
    CreatedAt,
}

#[derive(DeriveIden)]
enum UserRoles {
    Table,
    Id,
    UserId,
    Role,
}

#[derive(DeriveIden)]
enum Students {
    Table,
    Id,
    UserId,
    CreatedAt,
    IsDeleted,
}

#[derive(DeriveIden)]
enum Faculties {
    Table,
    Id,
    UserId,
    Department,
    Title,
    CreatedAt,
    IsDeleted,
}

#[derive(DeriveIden)]
enum Courses {
    Table,
    Id,
    Code,
    Name,
    Description,
    Credits,
    CreatedAt,
    IsDeleted,
}

#[derive(DeriveIden)]
enum ClassSections {
    Table,
    Id,
    Code,
    Name,
    CourseId,
    TeacherId,
    CreatedAt,
    IsDeleted,
}

#[derive(DeriveIden)]
enum Enrollments {
    Table,
    Id,
    StudentId,
    ClassSectionId,
    EnrolledAt,
    IsDeleted,
}

#[derive(DeriveIden)]
enum ClassSchedules {
    Table,
    Id,
    ClassSectionId,
    DayOfWeek,
    StartTime,
    EndTime,
    Room,
    IsDeleted,
}

#[derive(DeriveIden)]
enum Assignments {
    Table,
    Id,
    ClassSectionId,
    Title,
    Description,
    DueAt,
    MaxScore,
    ExerciseFilePath,
    GuideFilePath,
    CreatedAt,
    IsDeleted,
}

#[derive(DeriveIden)]
enum AssignmentSubmissions {
    Table,
    Id,
    AssignmentId,
    StudentId,
    SubmittedAt,
    FilePath,
    Score,
    GradedAt,
    TeacherComment,
    IsDeleted,
}

#[derive(DeriveIden)]
enum AssignmentResources {
    Table,
    Id,
    AssignmentId,
    FileName,
    FilePath,
    UploadedAt,
}
