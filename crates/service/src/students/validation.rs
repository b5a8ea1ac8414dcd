//! Structural checks run before a student reaches storage.

use models::student::Student;
use uuid::Uuid;

use super::errors::StudentValidationError;

/// Warning emitted when a listing finds no students.
pub const EMPTY_STORAGE_WARNING: &str = "Students storage is empty.";

/// Checks applied on register and modify: presence, then id, then name.
pub fn validate_student(student: Option<Student>) -> Result<Student, StudentValidationError> {
    let student = student.ok_or(StudentValidationError::NullStudent)?;
    validate_student_id(student.id)?;
    if student.name.trim().is_empty() {
        return Err(StudentValidationError::InvalidStudent {
            parameter_name: "name",
            parameter_value: student.name.clone(),
        });
    }
    Ok(student)
}

pub fn validate_student_id(id: Uuid) -> Result<(), StudentValidationError> {
    if id.is_nil() {
        return Err(StudentValidationError::InvalidStudent {
            parameter_name: "id",
            parameter_value: id.to_string(),
        });
    }
    Ok(())
}

/// Unwrap the result of a lookup by `id`.
pub fn validate_storage_student(maybe_student: Option<Student>, id: Uuid) -> Result<Student, StudentValidationError> {
    maybe_student.ok_or(StudentValidationError::NotFoundStudent { id })
}
