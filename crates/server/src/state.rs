use std::sync::Arc;

use service::students::{
    broker::{memory::InMemoryStudentStorageBroker, StudentStorageBroker},
    logging::TracingLoggingBroker,
    StudentService, StudentServiceImpl,
};

#[derive(Clone)]
pub struct ServerState {
    pub students: Arc<dyn StudentService>,
}

impl ServerState {
    /// Wire a student service over `broker`, logging through `tracing`.
    pub fn with_broker<B: StudentStorageBroker + 'static>(broker: B) -> Self {
        let svc = StudentServiceImpl::new(Arc::new(broker), Arc::new(TracingLoggingBroker));
        Self { students: Arc::new(svc) }
    }

    /// State backed by process memory; nothing survives a restart.
    pub fn in_memory() -> Self {
        Self::with_broker(InMemoryStudentStorageBroker::new())
    }
}
