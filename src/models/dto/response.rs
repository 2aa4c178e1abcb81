use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::models::domain::quiz::{QuizType, RevealPolicy};
use crate::models::domain::quiz_question::QuizQuestionType;
use crate::models::domain::{QuestionKind, Quiz, QuizQuestion};

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct QuizStats {
    pub total_attempts: u64,
    pub unique_students: u64,
    pub average_score: f64,
    pub highest_score: i32,
    pub lowest_score: i32,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct QuizExistence {
    pub exists: bool,
    pub course_matches: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub quiz: Option<QuizSummary>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct QuizSummary {
    pub id: String,
    pub title: String,
    pub course_id: String,
    pub question_count: usize,
    pub published: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub modified_at: Option<DateTime<Utc>>,
}

impl From<&Quiz> for QuizSummary {
    fn from(quiz: &Quiz) -> Self {
        QuizSummary {
            id: quiz.id.clone(),
            title: quiz.title.clone(),
            course_id: quiz.course_id.clone(),
            question_count: quiz.questions.len(),
            published: quiz.published,
            created_at: quiz.created_at,
            modified_at: quiz.modified_at,
        }
    }
}

/// Quiz as shown to students: settings and prompts, no answer keys.
#[derive(Debug, Clone, Serialize)]
pub struct QuizForTaking {
    pub id: String,
    pub course_id: String,
    pub title: String,
    pub description: String,
    pub quiz_type: QuizType,
    pub points: i32,
    pub shuffle_answers: bool,
    pub time_limit: u32,
    pub multiple_attempts: bool,
    pub attempt_limit: u32,
    pub reveal_policy: RevealPolicy,
    pub one_question_at_a_time: bool,
    pub proctoring_required: bool,
    pub lock_after_answer: bool,
    pub requires_access_code: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub available_from: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub available_until: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub due_at: Option<DateTime<Utc>>,
    pub published: bool,
    pub questions: Vec<QuestionForTaking>,
}

#[derive(Debug, Clone, Serialize)]
pub struct QuestionForTaking {
    pub id: String,
    #[serde(rename = "type")]
    pub question_type: QuizQuestionType,
    pub title: String,
    pub points: i32,
    pub question: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub choices: Option<Vec<String>>,
}

impl From<QuizQuestion> for QuestionForTaking {
    fn from(question: QuizQuestion) -> Self {
        let question_type = question.kind.question_type();
        let choices = match question.kind {
            QuestionKind::MultipleChoice { choices, .. } => Some(choices),
            _ => None,
        };

        QuestionForTaking {
            id: question.id,
            question_type,
            title: question.title,
            points: question.points,
            question: question.question,
            choices,
        }
    }
}

impl From<Quiz> for QuizForTaking {
    fn from(quiz: Quiz) -> Self {
        QuizForTaking {
            id: quiz.id,
            course_id: quiz.course_id,
            title: quiz.title,
            description: quiz.description,
            quiz_type: quiz.quiz_type,
            points: quiz.points,
            shuffle_answers: quiz.shuffle_answers,
            time_limit: quiz.time_limit,
            multiple_attempts: quiz.multiple_attempts,
            attempt_limit: quiz.attempt_limit,
            reveal_policy: quiz.reveal_policy,
            one_question_at_a_time: quiz.one_question_at_a_time,
            proctoring_required: quiz.proctoring_required,
            lock_after_answer: quiz.lock_after_answer,
            requires_access_code: !quiz.access_code.is_empty(),
            available_from: quiz.available_from,
            available_until: quiz.available_until,
            due_at: quiz.due_at,
            published: quiz.published,
            questions: quiz
                .questions
                .into_iter()
                .map(QuestionForTaking::from)
                .collect(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: String,
}
