use serde::{Deserialize, Serialize};

/// One gradable item inside a quiz. Questions have no lifecycle of their own;
/// they live embedded in the owning quiz document.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
pub struct QuizQuestion {
    pub id: String,
    pub title: String,
    pub points: i32,
    pub question: String,
    #[serde(flatten)]
    pub kind: QuestionKind,
}

#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum QuestionKind {
    MultipleChoice {
        choices: Vec<String>,
        correct_answer: u32,
    },
    /// The correct value is kept as the literal string "true" or "false".
    TrueFalse { correct_answer: String },
    FillBlank { possible_answers: Vec<String> },
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum QuizQuestionType {
    MultipleChoice,
    TrueFalse,
    FillBlank,
}

impl QuestionKind {
    pub fn question_type(&self) -> QuizQuestionType {
        match self {
            QuestionKind::MultipleChoice { .. } => QuizQuestionType::MultipleChoice,
            QuestionKind::TrueFalse { .. } => QuizQuestionType::TrueFalse,
            QuestionKind::FillBlank { .. } => QuizQuestionType::FillBlank,
        }
    }
}

/// Sum of question points. Saturates instead of overflowing; request
/// validation bounds both points and question count far below that.
pub fn total_points(questions: &[QuizQuestion]) -> i32 {
    questions
        .iter()
        .fold(0i32, |total, q| total.saturating_add(q.points))
}
