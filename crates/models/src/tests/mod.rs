/// Student entity serde and active-model behaviour
pub mod student_tests;
