use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::domain::quiz_question::{total_points, QuizQuestion};

pub const DEFAULT_CATEGORY: &str = "Quizzes";
pub const DEFAULT_TIME_LIMIT_MINUTES: u32 = 20;

#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
pub struct Quiz {
    pub id: String,
    pub course_id: String,
    pub title: String,
    pub description: String,
    pub quiz_type: QuizType,
    pub category: String,
    pub points: i32, // always the sum of question points
    pub shuffle_answers: bool,
    pub time_limit: u32, // minutes
    pub multiple_attempts: bool,
    pub attempt_limit: u32, // only meaningful when multiple_attempts is set
    pub reveal_policy: RevealPolicy,
    pub access_code: String,
    pub one_question_at_a_time: bool,
    pub proctoring_required: bool,
    pub lock_after_answer: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub available_from: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub available_until: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub due_at: Option<DateTime<Utc>>,
    pub published: bool,
    #[serde(default)]
    pub questions: Vec<QuizQuestion>,
    #[serde(
        default,
        with = "crate::models::domain::timestamp::option",
        skip_serializing_if = "Option::is_none"
    )]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(
        default,
        with = "crate::models::domain::timestamp::option",
        skip_serializing_if = "Option::is_none"
    )]
    pub modified_at: Option<DateTime<Utc>>,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize, Serialize)]
pub enum QuizType {
    #[default]
    #[serde(rename = "Graded Quiz")]
    GradedQuiz,
    #[serde(rename = "Practice Quiz")]
    PracticeQuiz,
    #[serde(rename = "Graded Survey")]
    GradedSurvey,
    #[serde(rename = "Ungraded Survey")]
    UngradedSurvey,
}

/// When students get to see the correct answers of a submitted attempt.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize, Serialize)]
pub enum RevealPolicy {
    #[default]
    Immediately,
    #[serde(rename = "After Last Attempt")]
    AfterLastAttempt,
    #[serde(rename = "After Due Date")]
    AfterDueDate,
    Never,
}

impl Quiz {
    pub fn new(course_id: &str, title: &str) -> Self {
        let now = Utc::now();
        Quiz {
            id: Uuid::new_v4().to_string(),
            course_id: course_id.to_string(),
            title: title.to_string(),
            description: String::new(),
            quiz_type: QuizType::default(),
            category: DEFAULT_CATEGORY.to_string(),
            points: 0,
            shuffle_answers: true,
            time_limit: DEFAULT_TIME_LIMIT_MINUTES,
            multiple_attempts: false,
            attempt_limit: 1,
            reveal_policy: RevealPolicy::default(),
            access_code: String::new(),
            one_question_at_a_time: true,
            proctoring_required: false,
            lock_after_answer: false,
            available_from: None,
            available_until: None,
            due_at: None,
            published: false,
            questions: Vec::new(),
            created_at: Some(now),
            modified_at: Some(now),
        }
    }

    pub fn set_questions(&mut self, questions: Vec<QuizQuestion>) {
        self.points = total_points(&questions);
        self.questions = questions;
    }

    pub fn find_question(&self, question_id: &str) -> Option<&QuizQuestion> {
        self.questions.iter().find(|q| q.id == question_id)
    }

    /// How many attempts a single user may submit under the current policy.
    pub fn max_attempts(&self) -> u32 {
        if self.multiple_attempts {
            self.attempt_limit.max(1)
        } else {
            1
        }
    }
}

/// A partial quiz update. Unset fields are left untouched in storage; the
/// serialized form is used directly as a `$set` document.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct QuizPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub quiz_type: Option<QuizType>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub shuffle_answers: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub time_limit: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub multiple_attempts: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub attempt_limit: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reveal_policy: Option<RevealPolicy>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub access_code: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub one_question_at_a_time: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub proctoring_required: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lock_after_answer: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub available_from: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub available_until: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub due_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub published: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) questions: Option<Vec<QuizQuestion>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) points: Option<i32>,
    #[serde(
        serialize_with = "crate::models::domain::timestamp::option::serialize",
        skip_serializing_if = "Option::is_none"
    )]
    pub modified_at: Option<DateTime<Utc>>,
}

impl QuizPatch {
    pub fn published(published: bool) -> Self {
        QuizPatch {
            published: Some(published),
            modified_at: Some(Utc::now()),
            ..Default::default()
        }
    }

    /// Replaces the whole question list. The point total travels with it so
    /// both land in the same write.
    pub fn with_questions(mut self, questions: Vec<QuizQuestion>) -> Self {
        self.points = Some(total_points(&questions));
        self.questions = Some(questions);
        self
    }

    pub fn questions(&self) -> Option<&[QuizQuestion]> {
        self.questions.as_deref()
    }

    pub fn apply(&self, quiz: &mut Quiz) {
        if let Some(title) = &self.title {
            quiz.title = title.clone();
        }
        if let Some(description) = &self.description {
            quiz.description = description.clone();
        }
        if let Some(quiz_type) = self.quiz_type {
            quiz.quiz_type = quiz_type;
        }
        if let Some(category) = &self.category {
            quiz.category = category.clone();
        }
        if let Some(shuffle_answers) = self.shuffle_answers {
            quiz.shuffle_answers = shuffle_answers;
        }
        if let Some(time_limit) = self.time_limit {
            quiz.time_limit = time_limit;
        }
        if let Some(multiple_attempts) = self.multiple_attempts {
            quiz.multiple_attempts = multiple_attempts;
        }
        if let Some(attempt_limit) = self.attempt_limit {
            quiz.attempt_limit = attempt_limit;
        }
        if let Some(reveal_policy) = self.reveal_policy {
            quiz.reveal_policy = reveal_policy;
        }
        if let Some(access_code) = &self.access_code {
            quiz.access_code = access_code.clone();
        }
        if let Some(one_question_at_a_time) = self.one_question_at_a_time {
            quiz.one_question_at_a_time = one_question_at_a_time;
        }
        if let Some(proctoring_required) = self.proctoring_required {
            quiz.proctoring_required = proctoring_required;
        }
        if let Some(lock_after_answer) = self.lock_after_answer {
            quiz.lock_after_answer = lock_after_answer;
        }
        if self.available_from.is_some() {
            quiz.available_from = self.available_from;
        }
        if self.available_until.is_some() {
            quiz.available_until = self.available_until;
        }
        if self.due_at.is_some() {
            quiz.due_at = self.due_at;
        }
        if let Some(published) = self.published {
            quiz.published = published;
        }
        if let Some(questions) = &self.questions {
            quiz.set_questions(questions.clone());
        }
        if self.modified_at.is_some() {
            quiz.modified_at = self.modified_at;
        }
    }
}
