use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use async_trait::async_trait;
use futures::stream::BoxStream;
use futures::StreamExt;
use models::student::Student;
use tracing::{debug, instrument};
use uuid::Uuid;

use super::broker::StudentStorageBroker;
use super::errors::{classify, Severity, StudentError, StudentFailure};
use super::logging::LoggingBroker;
use super::validation::{self, EMPTY_STORAGE_WARNING};

/// Listing handed to callers; items that fail mid-stream arrive already classified.
pub type StudentResultStream = BoxStream<'static, Result<Student, StudentError>>;

/// Student operations exposed to the transport layer.
#[async_trait]
pub trait StudentService: Send + Sync {
    async fn register_student(&self, student: Option<Student>) -> Result<Student, StudentError>;
    async fn retrieve_student_by_id(&self, id: Uuid) -> Result<Student, StudentError>;
    async fn retrieve_all_students(&self) -> Result<StudentResultStream, StudentError>;
    async fn delete_student_by_id(&self, id: Uuid) -> Result<Student, StudentError>;
    async fn modify_student(&self, student: Option<Student>) -> Result<Student, StudentError>;
}

/// Validating student service over injected storage and logging brokers.
///
/// Every operation body runs inside [`StudentServiceImpl::try_catch`], which
/// classifies a failure, logs it exactly once and returns it.
///
/// # Examples
/// ```
/// use service::students::{
///     broker::memory::InMemoryStudentStorageBroker,
///     logging::TracingLoggingBroker,
///     service::{StudentService, StudentServiceImpl},
/// };
/// use models::student::Student;
/// use std::sync::Arc;
/// let svc = StudentServiceImpl::new(Arc::new(InMemoryStudentStorageBroker::new()), Arc::new(TracingLoggingBroker));
/// let ada = Student { id: uuid::Uuid::new_v4(), name: "Ada".into(), email: None, grade: None };
/// let stored = tokio_test::block_on(svc.register_student(Some(ada.clone()))).unwrap();
/// assert_eq!(stored, ada);
/// let found = tokio_test::block_on(svc.retrieve_student_by_id(ada.id)).unwrap();
/// assert_eq!(found, ada);
/// ```
pub struct StudentServiceImpl<S: StudentStorageBroker, L: LoggingBroker> {
    storage: Arc<S>,
    logging: Arc<L>,
}

impl<S, L> StudentServiceImpl<S, L>
where
    S: StudentStorageBroker + 'static,
    L: LoggingBroker + 'static,
{
    pub fn new(storage: Arc<S>, logging: Arc<L>) -> Self { Self { storage, logging } }

    async fn try_catch<T>(&self, body: impl Future<Output = Result<T, StudentFailure>>) -> Result<T, StudentError> {
        match body.await {
            Ok(value) => Ok(value),
            Err(failure) => Err(report(self.logging.as_ref(), failure)),
        }
    }

    async fn register(&self, student: Option<Student>) -> Result<Student, StudentFailure> {
        let student = validation::validate_student(student)?;
        Ok(self.storage.insert_student(student).await?)
    }

    async fn retrieve(&self, id: Uuid) -> Result<Student, StudentFailure> {
        validation::validate_student_id(id)?;
        let maybe_student = self.storage.select_student_by_id(id).await?;
        Ok(validation::validate_storage_student(maybe_student, id)?)
    }

    async fn retrieve_all(&self) -> Result<StudentResultStream, StudentFailure> {
        let mut students = self.storage.select_all_students().peekable();

        // pull one row to learn whether storage is empty; the rest stays lazy
        let first_ok = Pin::new(&mut students).peek().await.map(Result::is_ok);
        match first_ok {
            None => self.logging.log_warning(EMPTY_STORAGE_WARNING),
            Some(true) => {}
            Some(false) => {
                if let Some(Err(e)) = students.next().await {
                    return Err(e.into());
                }
            }
        }

        let logging = Arc::clone(&self.logging);
        Ok(students
            .map(move |row| row.map_err(|e| report(logging.as_ref(), e.into())))
            .boxed())
    }

    async fn delete(&self, id: Uuid) -> Result<Student, StudentFailure> {
        validation::validate_student_id(id)?;
        let maybe_student = self.storage.select_student_by_id(id).await?;
        let student = validation::validate_storage_student(maybe_student, id)?;
        Ok(self.storage.delete_student(student).await?)
    }

    async fn modify(&self, student: Option<Student>) -> Result<Student, StudentFailure> {
        let student = validation::validate_student(student)?;
        // existence lookup only; a missing row does not stop the update
        let maybe_student = self.storage.select_student_by_id(student.id).await?;
        if maybe_student.is_none() {
            debug!(student_id = %student.id, "modifying student not found in storage");
        }
        Ok(self.storage.update_student(student).await?)
    }
}

/// Classify, log once at the chosen severity, hand back the classified error.
fn report<L: LoggingBroker + ?Sized>(logging: &L, failure: StudentFailure) -> StudentError {
    let (error, severity) = classify(failure);
    match severity {
        Severity::Critical => logging.log_critical(&error),
        Severity::Error => logging.log_error(&error),
    }
    error
}

#[async_trait]
impl<S, L> StudentService for StudentServiceImpl<S, L>
where
    S: StudentStorageBroker + 'static,
    L: LoggingBroker + 'static,
{
    #[instrument(skip_all, fields(student_id = ?student.as_ref().map(|s| s.id)))]
    async fn register_student(&self, student: Option<Student>) -> Result<Student, StudentError> {
        self.try_catch(self.register(student)).await
    }

    #[instrument(skip(self), fields(student_id = %id))]
    async fn retrieve_student_by_id(&self, id: Uuid) -> Result<Student, StudentError> {
        self.try_catch(self.retrieve(id)).await
    }

    #[instrument(skip(self))]
    async fn retrieve_all_students(&self) -> Result<StudentResultStream, StudentError> {
        self.try_catch(self.retrieve_all()).await
    }

    #[instrument(skip(self), fields(student_id = %id))]
    async fn delete_student_by_id(&self, id: Uuid) -> Result<Student, StudentError> {
        self.try_catch(self.delete(id)).await
    }

    #[instrument(skip_all, fields(student_id = ?student.as_ref().map(|s| s.id)))]
    async fn modify_student(&self, student: Option<Student>) -> Result<Student, StudentError> {
        self.try_catch(self.modify(student)).await
    }
}
