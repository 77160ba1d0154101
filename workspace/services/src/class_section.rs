use chrono::Utc;
use common::{
    ClassSectionDto, ClassSectionOptions, ClassSectionRequest, FacultyOption, SectionOption,
    StudentClassDto, TeachingClassDto,
};
use model::entities::{class_section, course, enrollment, faculty, student, user};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, Set,
};
use tracing::{debug, info, instrument, warn};

use crate::course::CourseService;
use crate::error::{Result, ServiceError};
use crate::lookup;
use crate::recycle;

/// Class sections: offerings of a course taught by one faculty member.
pub struct ClassSectionService<'a> {
    db: &'a DatabaseConnection,
}

impl<'a> ClassSectionService<'a> {
    pub fn new(db: &'a DatabaseConnection) -> Self {
        Self { db }
    }

    /// Active sections ordered by code, optionally limited to one course.
    #[instrument(skip(self))]
    pub async fn list_active(&self, course_id: Option<i32>) -> Result<Vec<ClassSectionDto>> {
        let mut query = class_section::Entity::find().filter(class_section::Column::IsDeleted.eq(false));
        if let Some(course_id) = course_id {
            query = query.filter(class_section::Column::CourseId.eq(course_id));
        }
        let sections = query
            .order_by_asc(class_section::Column::Code)
            .all(self.db)
            .await?;
        debug!("Found {} active class section(s)", sections.len());
        lookup::section_views(self.db, sections).await
    }

    #[instrument(skip(self))]
    pub async fn list_deleted(&self) -> Result<Vec<ClassSectionDto>> {
        let sections = class_section::Entity::find()
            .filter(class_section::Column::IsDeleted.eq(true))
            .order_by_asc(class_section::Column::Code)
            .all(self.db)
            .await?;
        lookup::section_views(self.db, sections).await
    }

    #[instrument(skip(self))]
    pub async fn get(&self, id: i32) -> Result<Option<ClassSectionDto>> {
        let Some(section) = class_section::Entity::find_by_id(id)
            .filter(class_section::Column::IsDeleted.eq(false))
            .one(self.db)
            .await?
        else {
            return Ok(None);
        };
        Ok(lookup::section_views(self.db, vec![section]).await?.pop())
    }

    /// Select lists for the section form: active courses and active teachers.
    #[instrument(skip(self))]
    pub async fn options(&self) -> Result<ClassSectionOptions> {
        let courses = CourseService::new(self.db).options().await?;

        let mut teachers: Vec<(faculty::Model, user::Model)> = faculty::Entity::find()
            .filter(faculty::Column::IsDeleted.eq(false))
            .find_also_related(user::Entity)
            .all(self.db)
            .await?
            .into_iter()
            .filter_map(|(f, u)| u.filter(|u| !u.is_deleted).map(|u| (f, u)))
            .collect();
        teachers.sort_by(|a, b| a.1.full_name.cmp(&b.1.full_name));

        Ok(ClassSectionOptions {
            courses,
            teachers: teachers
                .into_iter()
                .map(|(f, u)| FacultyOption {
                    id: f.id,
                    code: f.code(),
                    full_name: u.full_name,
                })
                .collect(),
        })
    }

    /// Active sections as compact select entries.
    #[instrument(skip(self))]
    pub async fn section_options(&self) -> Result<Vec<SectionOption>> {
        let sections = class_section::Entity::find()
            .filter(class_section::Column::IsDeleted.eq(false))
            .order_by_asc(class_section::Column::Code)
            .all(self.db)
            .await?;
        section_options(self.db, sections).await
    }

    async fn code_in_use(&self, code: &str, except_id: Option<i32>) -> Result<bool> {
        let mut query = class_section::Entity::find()
            .filter(class_section::Column::IsDeleted.eq(false))
            .filter(class_section::Column::Code.eq(code));
        if let Some(id) = except_id {
            query = query.filter(class_section::Column::Id.ne(id));
        }
        Ok(query.one(self.db).await?.is_some())
    }

    async fn validate(&self, request: &ClassSectionRequest, except_id: Option<i32>) -> Result<()> {
        let mut errors = Vec::new();
        if request.code.trim().is_empty() {
            errors.push("Class code is required.".to_string());
        } else if self.code_in_use(request.code.trim(), except_id).await? {
            errors.push("Class code already exists.".to_string());
        }

        let course = course::Entity::find_by_id(request.course_id).one(self.db).await?;
        if !course.is_some_and(|c| !c.is_deleted) {
            errors.push("Selected course not found.".to_string());
        }
        let teacher = faculty::Entity::find_by_id(request.teacher_id).one(self.db).await?;
        if !teacher.is_some_and(|t| !t.is_deleted) {
            errors.push("Selected teacher not found.".to_string());
        }

        if errors.is_empty() {
            Ok(())
        } else {
            warn!("Class section request rejected: {:?}", errors);
            Err(ServiceError::Validation(errors))
        }
    }

    #[instrument(skip(self))]
    pub async fn create(&self, request: ClassSectionRequest) -> Result<ClassSectionDto> {
        self.validate(&request, None).await?;

        let created = class_section::ActiveModel {
            code: Set(request.code.trim().to_string()),
            name: Set(request.name),
            course_id: Set(request.course_id),
            teacher_id: Set(request.teacher_id),
            created_at: Set(Utc::now().naive_utc()),
            is_deleted: Set(false),
            ..Default::default()
        }
        .insert(self.db)
        .await?;

        info!("Created class section {} ({})", created.id, created.code);
        lookup::section_views(self.db, vec![created])
            .await?
            .pop()
            .ok_or_else(|| ServiceError::not_found("Class section not found."))
    }

    #[instrument(skip(self))]
    pub async fn update(&self, id: i32, request: ClassSectionRequest) -> Result<ClassSectionDto> {
        let existing = class_section::Entity::find_by_id(id)
            .filter(class_section::Column::IsDeleted.eq(false))
            .one(self.db)
            .await?
            .ok_or_else(|| ServiceError::not_found("Class section not found."))?;

        self.validate(&request, Some(id)).await?;

        let mut active: class_section::ActiveModel = existing.into();
        active.code = Set(request.code.trim().to_string());
        active.name = Set(request.name);
        active.course_id = Set(request.course_id);
        active.teacher_id = Set(request.teacher_id);
        let updated = active.update(self.db).await?;

        info!("Updated class section {}", updated.id);
        lookup::section_views(self.db, vec![updated])
            .await?
            .pop()
            .ok_or_else(|| ServiceError::not_found("Class section not found."))
    }

    pub async fn soft_delete(&self, id: i32) -> Result<bool> {
        recycle::soft_delete::<class_section::Entity>(self.db, id).await
    }

    /// Restores a section unless an active section took its code meanwhile.
    pub async fn restore(&self, id: i32) -> Result<bool> {
        let Some(existing) = class_section::Entity::find_by_id(id).one(self.db).await? else {
            return Ok(false);
        };
        if existing.is_deleted && self.code_in_use(&existing.code, Some(id)).await? {
            return Err(ServiceError::validation("Class code already exists."));
        }
        recycle::restore::<class_section::Entity>(self.db, id).await
    }

    pub async fn hard_delete(&self, id: i32) -> Result<bool> {
        recycle::hard_delete::<class_section::Entity>(self.db, id).await
    }

    /// Active sections taught by the faculty profile of `user_id`, with the
    /// number of actively enrolled students.
    #[instrument(skip(self))]
    pub async fn teaching_classes(&self, user_id: i32) -> Result<Vec<TeachingClassDto>> {
        let Some(teacher) = lookup::active_faculty_for_user(self.db, user_id).await? else {
            debug!("User {} has no active faculty profile", user_id);
            return Ok(Vec::new());
        };

        let sections = class_section::Entity::find()
            .filter(class_section::Column::TeacherId.eq(teacher.id))
            .filter(class_section::Column::IsDeleted.eq(false))
            .order_by_asc(class_section::Column::Code)
            .all(self.db)
            .await?;
        let courses = lookup::courses_by_id(self.db, sections.iter().map(|s| s.course_id)).await?;

        let mut classes = Vec::with_capacity(sections.len());
        for section in sections {
            let student_count = active_enrollment_count(self.db, section.id).await?;
            let course = courses.get(&section.course_id);
            classes.push(TeachingClassDto {
                id: section.id,
                code: section.code,
                name: section.name,
                course_id: section.course_id,
                course_code: course.map(|c| c.code.clone()).unwrap_or_default(),
                course_name: course.map(|c| c.name.clone()).unwrap_or_default(),
                credits: course.and_then(|c| c.credits),
                student_count,
            });
        }
        Ok(classes)
    }

    /// Active sections the student profile of `user_id` is enrolled in.
    #[instrument(skip(self))]
    pub async fn student_classes(&self, user_id: i32) -> Result<Vec<StudentClassDto>> {
        let Some(student) = lookup::active_student_for_user(self.db, user_id).await? else {
            debug!("User {} has no active student profile", user_id);
            return Ok(Vec::new());
        };

        let enrollments = enrollment::Entity::find()
            .filter(enrollment::Column::StudentId.eq(student.id))
            .filter(enrollment::Column::IsDeleted.eq(false))
            .all(self.db)
            .await?;
        let sections =
            lookup::sections_by_id(self.db, enrollments.iter().map(|e| e.class_section_id)).await?;
        let courses = lookup::courses_by_id(self.db, sections.values().map(|s| s.course_id)).await?;
        let teachers = lookup::teacher_names(self.db, sections.values().map(|s| s.teacher_id)).await?;

        let mut classes: Vec<StudentClassDto> = enrollments
            .into_iter()
            .filter_map(|e| {
                let section = sections.get(&e.class_section_id).filter(|s| !s.is_deleted)?;
                let course = courses.get(&section.course_id);
                Some(StudentClassDto {
                    id: section.id,
                    code: section.code.clone(),
                    name: section.name.clone(),
                    course_code: course.map(|c| c.code.clone()).unwrap_or_default(),
                    course_name: course.map(|c| c.name.clone()).unwrap_or_default(),
                    credits: course.and_then(|c| c.credits),
                    teacher_name: teachers.get(&section.teacher_id).cloned().unwrap_or_default(),
                    enrolled_at: e.enrolled_at,
                })
            })
            .collect();
        classes.sort_by(|a, b| a.code.cmp(&b.code));
        Ok(classes)
    }
}

/// Active enrollments of active students in a section.
pub(crate) async fn active_enrollment_count(db: &DatabaseConnection, section_id: i32) -> Result<u64> {
    Ok(enrollment::Entity::find()
        .inner_join(student::Entity)
        .filter(enrollment::Column::ClassSectionId.eq(section_id))
        .filter(enrollment::Column::IsDeleted.eq(false))
        .filter(student::Column::IsDeleted.eq(false))
        .count(db)
        .await?)
}

pub(crate) async fn section_options(
    db: &DatabaseConnection,
    sections: Vec<class_section::Model>,
) -> Result<Vec<SectionOption>> {
    let courses = lookup::courses_by_id(db, sections.iter().map(|s| s.course_id)).await?;
    Ok(sections
        .into_iter()
        .map(|s| SectionOption {
            course_name: courses
                .get(&s.course_id)
                .map(|c| c.name.clone())
                .unwrap_or_default(),
            id: s.id,
            code: s.code,
            name: s.name,
        })
        .collect())
}
