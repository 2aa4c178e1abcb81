use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::domain::Quiz;
use crate::services::grading::ScoreBreakdown;

/// Submitted answers keyed by question id. The value shape depends on the
/// question type (number for multiple choice, string otherwise), so it is
/// kept as raw JSON and interpreted by the grader.
pub type AnswerMap = HashMap<String, serde_json::Value>;

#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
pub struct QuizAttempt {
    pub id: String,
    pub quiz_id: String,
    pub user_id: String,
    pub course_id: String,
    pub answers: AnswerMap,
    pub score: i32,
    pub max_score: i32,
    pub percentage: i32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time_spent: Option<u32>, // minutes
    pub attempt_number: u32,
    #[serde(with = "crate::models::domain::timestamp")]
    pub submitted_at: DateTime<Utc>,
}

impl QuizAttempt {
    pub fn new(
        quiz: &Quiz,
        user_id: &str,
        answers: AnswerMap,
        breakdown: ScoreBreakdown,
        time_spent: Option<u32>,
        attempt_number: u32,
    ) -> Self {
        QuizAttempt {
            id: Uuid::new_v4().to_string(),
            quiz_id: quiz.id.clone(),
            user_id: user_id.to_string(),
            course_id: quiz.course_id.clone(),
            answers,
            score: breakdown.score,
            max_score: breakdown.max_score,
            percentage: breakdown.percentage,
            time_spent,
            attempt_number,
            submitted_at: Utc::now(),
        }
    }

    pub fn breakdown(&self) -> ScoreBreakdown {
        ScoreBreakdown {
            score: self.score,
            max_score: self.max_score,
            percentage: self.percentage,
        }
    }
}

/// Outcome of a conditional attempt insert.
#[derive(Clone, Debug, PartialEq)]
pub enum AttemptInsert {
    Inserted(QuizAttempt),
    /// Another submission already holds this (quiz, user, attempt number) slot.
    SlotTaken,
}
