pub mod quiz;
pub mod quiz_attempt;
pub mod quiz_question;
pub mod timestamp;
pub mod user;
pub use quiz::{Quiz, QuizPatch};
pub use quiz_attempt::{AnswerMap, AttemptInsert, QuizAttempt};
pub use quiz_question::{QuestionKind, QuizQuestion};
pub use user::UserRole;
