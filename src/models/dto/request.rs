use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use validator::Validate;

use crate::errors::{AppError, AppResult};
use crate::models::domain::quiz::{QuizType, RevealPolicy};
use crate::models::domain::{AnswerMap, QuestionKind, QuizPatch, QuizQuestion};

const DEFAULT_CHOICE_COUNT: usize = 4;
const DEFAULT_QUESTION_TITLE: &str = "New Question";

/// Upper bounds keep a quiz's point total well inside `i32`.
pub const MAX_QUESTION_POINTS: i32 = 1000;
pub const MAX_QUESTIONS_PER_QUIZ: usize = 500;

/// Quiz fields accepted on create and update. Everything is optional: create
/// fills gaps with defaults, update leaves them untouched.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct QuizRequest {
    #[validate(length(min = 1, max = 200))]
    pub title: Option<String>,

    #[validate(length(max = 10000))]
    pub description: Option<String>,

    pub quiz_type: Option<QuizType>,

    #[validate(length(min = 1, max = 100))]
    pub category: Option<String>,

    pub shuffle_answers: Option<bool>,

    #[validate(range(max = 1440))]
    pub time_limit: Option<u32>,

    pub multiple_attempts: Option<bool>,

    #[validate(range(min = 1, max = 100))]
    pub attempt_limit: Option<u32>,

    pub reveal_policy: Option<RevealPolicy>,

    #[validate(length(max = 100))]
    pub access_code: Option<String>,

    pub one_question_at_a_time: Option<bool>,
    pub proctoring_required: Option<bool>,
    pub lock_after_answer: Option<bool>,
    pub available_from: Option<DateTime<Utc>>,
    pub available_until: Option<DateTime<Utc>>,
    pub due_at: Option<DateTime<Utc>>,
    pub published: Option<bool>,

    #[validate(length(max = 500), nested)]
    pub questions: Option<Vec<QuestionRequest>>,
}

impl QuizRequest {
    /// Split into the scalar field patch and the (not yet normalized) questions.
    pub fn into_patch(self) -> (QuizPatch, Option<Vec<QuestionRequest>>) {
        let patch = QuizPatch {
            title: self.title,
            description: self.description,
            quiz_type: self.quiz_type,
            category: self.category,
            shuffle_answers: self.shuffle_answers,
            time_limit: self.time_limit,
            multiple_attempts: self.multiple_attempts,
            attempt_limit: self.attempt_limit,
            reveal_policy: self.reveal_policy,
            access_code: self.access_code,
            one_question_at_a_time: self.one_question_at_a_time,
            proctoring_required: self.proctoring_required,
            lock_after_answer: self.lock_after_answer,
            available_from: self.available_from,
            available_until: self.available_until,
            due_at: self.due_at,
            published: self.published,
            ..Default::default()
        };
        (patch, self.questions)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct QuestionRequest {
    /// Only honoured when a whole question list is replaced through a quiz
    /// update; single-question operations always assign or keep the id.
    pub id: Option<String>,

    #[validate(length(max = 200))]
    pub title: Option<String>,

    #[validate(range(min = 1, max = 1000))]
    pub points: Option<i32>,

    #[validate(length(max = 10000))]
    pub question: Option<String>,

    #[serde(flatten)]
    pub kind: QuestionKindRequest,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum QuestionKindRequest {
    MultipleChoice {
        choices: Option<Vec<String>>,
        correct_answer: Option<u32>,
    },
    TrueFalse {
        correct_answer: Option<String>,
    },
    FillBlank {
        possible_answers: Option<Vec<String>>,
    },
}

impl QuestionRequest {
    /// Build a stored question, filling type-specific defaults.
    pub fn into_question(self, id: String) -> AppResult<QuizQuestion> {
        self.validate()?;

        let kind = match self.kind {
            QuestionKindRequest::MultipleChoice {
                choices,
                correct_answer,
            } => {
                let choices = choices.unwrap_or_else(|| vec![String::new(); DEFAULT_CHOICE_COUNT]);
                let correct_answer = correct_answer.unwrap_or(0);
                if choices.is_empty() {
                    return Err(AppError::ValidationError(
                        "Multiple choice question needs at least one choice".to_string(),
                    ));
                }
                if correct_answer as usize >= choices.len() {
                    return Err(AppError::ValidationError(format!(
                        "Correct answer index {} is out of range for {} choices",
                        correct_answer,
                        choices.len()
                    )));
                }
                QuestionKind::MultipleChoice {
                    choices,
                    correct_answer,
                }
            }
            QuestionKindRequest::TrueFalse { correct_answer } => {
                let correct_answer = correct_answer.unwrap_or_else(|| "true".to_string());
                if correct_answer != "true" && correct_answer != "false" {
                    return Err(AppError::ValidationError(format!(
                        "True/false answer must be \"true\" or \"false\", got {:?}",
                        correct_answer
                    )));
                }
                QuestionKind::TrueFalse { correct_answer }
            }
            QuestionKindRequest::FillBlank { possible_answers } => {
                let possible_answers = match possible_answers {
                    Some(answers) if !answers.is_empty() => answers,
                    _ => vec![String::new()],
                };
                QuestionKind::FillBlank { possible_answers }
            }
        };

        Ok(QuizQuestion {
            id,
            title: self
                .title
                .unwrap_or_else(|| DEFAULT_QUESTION_TITLE.to_string()),
            points: self.points.unwrap_or(1),
            question: self.question.unwrap_or_default(),
            kind,
        })
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct PublishQuizRequest {
    #[serde(default)]
    pub published: Value,
}

impl PublishQuizRequest {
    pub fn published(&self) -> AppResult<bool> {
        self.published.as_bool().ok_or_else(|| {
            AppError::ValidationError("Published must be a boolean value".to_string())
        })
    }
}

#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct SubmitAttemptRequest {
    #[serde(default)]
    pub answers: AnswerMap,

    #[validate(range(max = 1440))]
    pub time_spent: Option<u32>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct AttemptListQuery {
    pub user_id: Option<String>,
}
