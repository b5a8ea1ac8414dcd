use async_trait::async_trait;
use futures::stream::BoxStream;
use models::student::Student;
use uuid::Uuid;

use super::errors::StorageError;

/// Lazily evaluated listing; storage is only touched as the stream is polled.
pub type StudentStream = BoxStream<'static, Result<Student, StorageError>>;

/// Storage abstraction for student records.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait StudentStorageBroker: Send + Sync {
    async fn insert_student(&self, student: Student) -> Result<Student, StorageError>;
    async fn select_student_by_id(&self, id: Uuid) -> Result<Option<Student>, StorageError>;
    fn select_all_students(&self) -> StudentStream;
    async fn update_student(&self, student: Student) -> Result<Student, StorageError>;
    async fn delete_student(&self, student: Student) -> Result<Student, StorageError>;
}

/// In-process broker, used when no database is configured and in tests.
pub mod memory {
    use super::*;
    use std::collections::BTreeMap;
    use std::sync::Arc;

    use futures::{stream, StreamExt};
    use tokio::sync::RwLock;

    #[derive(Default, Clone)]
    pub struct InMemoryStudentStorageBroker {
        inner: Arc<RwLock<BTreeMap<Uuid, Student>>>,
    }

    impl InMemoryStudentStorageBroker {
        pub fn new() -> Self { Self::default() }

        pub async fn len(&self) -> usize { self.inner.read().await.len() }

        pub async fn is_empty(&self) -> bool { self.inner.read().await.is_empty() }
    }

    #[async_trait]
    impl StudentStorageBroker for InMemoryStudentStorageBroker {
        async fn insert_student(&self, student: Student) -> Result<Student, StorageError> {
            let mut students = self.inner.write().await;
            if students.contains_key(&student.id) {
                return Err(StorageError::DuplicateKey(format!("student {} already stored", student.id)));
            }
            students.insert(student.id, student.clone());
            Ok(student)
        }

        async fn select_student_by_id(&self, id: Uuid) -> Result<Option<Student>, StorageError> {
            Ok(self.inner.read().await.get(&id).cloned())
        }

        fn select_all_students(&self) -> StudentStream {
            let inner = Arc::clone(&self.inner);
            stream::once(async move { inner.read().await.values().cloned().collect::<Vec<_>>() })
                .flat_map(|rows| stream::iter(rows.into_iter().map(Ok)))
                .boxed()
        }

        async fn update_student(&self, student: Student) -> Result<Student, StorageError> {
            let mut students = self.inner.write().await;
            match students.get_mut(&student.id) {
                Some(slot) => {
                    *slot = student.clone();
                    Ok(student)
                }
                None => Err(StorageError::UpdateConflict(format!("student {} not stored", student.id))),
            }
        }

        async fn delete_student(&self, student: Student) -> Result<Student, StorageError> {
            let mut students = self.inner.write().await;
            students
                .remove(&student.id)
                .ok_or_else(|| StorageError::UpdateConflict(format!("student {} not stored", student.id)))
        }
    }

}
