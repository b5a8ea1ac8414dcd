use thiserror::Error;
use uuid::Uuid;

/// Failures reported by a student storage broker.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum StorageError {
    #[error("duplicate key: {0}")]
    DuplicateKey(String),
    #[error("update conflict: {0}")]
    UpdateConflict(String),
    #[error("storage unreachable: {0}")]
    Connectivity(String),
    #[error("storage failure: {0}")]
    Unknown(String),
}

/// Caller-fixable problems with a student or its lookup key.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum StudentValidationError {
    #[error("student is null")]
    NullStudent,
    #[error("invalid student, parameter name: {parameter_name}, parameter value: {parameter_value}")]
    InvalidStudent { parameter_name: &'static str, parameter_value: String },
    #[error("couldn't find student with id: {id}")]
    NotFoundStudent { id: Uuid },
    #[error("student with the same id already exists")]
    AlreadyExistsStudent(#[source] StorageError),
}

/// Classified failure returned by every student service operation.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum StudentError {
    #[error("student validation error occurred: {0}")]
    Validation(#[source] StudentValidationError),
    #[error("student dependency error occurred, contact support")]
    Dependency(#[source] StorageError),
    #[error("student service error occurred, contact support")]
    Service(#[source] StorageError),
}

impl StudentError {
    /// Stable numeric code for external mapping/logging
    pub fn code(&self) -> u16 {
        match self {
            StudentError::Validation(StudentValidationError::NullStudent) => 1001,
            StudentError::Validation(StudentValidationError::InvalidStudent { .. }) => 1002,
            StudentError::Validation(StudentValidationError::NotFoundStudent { .. }) => 1003,
            StudentError::Validation(StudentValidationError::AlreadyExistsStudent(_)) => 1004,
            StudentError::Dependency(_) => 1100,
            StudentError::Service(_) => 1200,
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, StudentError::Validation(StudentValidationError::NotFoundStudent { .. }))
    }

    pub fn is_already_exists(&self) -> bool {
        matches!(self, StudentError::Validation(StudentValidationError::AlreadyExistsStudent(_)))
    }
}

/// Raw failure raised inside an operation body, before classification.
#[derive(Debug)]
pub(crate) enum StudentFailure {
    Validation(StudentValidationError),
    Storage(StorageError),
}

impl From<StudentValidationError> for StudentFailure {
    fn from(e: StudentValidationError) -> Self { StudentFailure::Validation(e) }
}

impl From<StorageError> for StudentFailure {
    fn from(e: StorageError) -> Self { StudentFailure::Storage(e) }
}

/// Log severity chosen for a classified failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Severity {
    Error,
    Critical,
}

/// Map a raw failure to its tier and log severity.
pub(crate) fn classify(failure: StudentFailure) -> (StudentError, Severity) {
    match failure {
        StudentFailure::Validation(v) => (StudentError::Validation(v), Severity::Error),
        StudentFailure::Storage(e @ StorageError::DuplicateKey(_)) => (
            StudentError::Validation(StudentValidationError::AlreadyExistsStudent(e)),
            Severity::Error,
        ),
        StudentFailure::Storage(e @ StorageError::UpdateConflict(_)) => (StudentError::Dependency(e), Severity::Error),
        StudentFailure::Storage(e @ StorageError::Connectivity(_)) => (StudentError::Dependency(e), Severity::Critical),
        StudentFailure::Storage(e @ StorageError::Unknown(_)) => (StudentError::Service(e), Severity::Error),
    }
}
