use std::{collections::HashSet, sync::Arc};

use chrono::Utc;
use uuid::Uuid;
use validator::Validate;

use crate::{
    errors::{AppError, AppResult},
    models::{
        domain::{Quiz, QuizPatch, QuizQuestion},
        dto::{
            request::{QuestionRequest, QuizRequest},
            response::{QuizExistence, QuizSummary},
        },
    },
    repositories::{QuizAttemptRepository, QuizRepository},
};

pub const DEFAULT_QUIZ_TITLE: &str = "New Quiz";

pub struct QuizService {
    repository: Arc<dyn QuizRepository>,
    attempt_repository: Arc<dyn QuizAttemptRepository>,
}

fn quiz_not_found(id: &str) -> AppError {
    AppError::NotFound(format!("Quiz with id '{}' not found", id))
}

/// Turn requested questions into stored ones. Supplied ids are kept so a full
/// list replacement does not orphan answers keyed by existing question ids,
/// but they must be distinct within the list.
fn normalize_questions(requests: Vec<QuestionRequest>) -> AppResult<Vec<QuizQuestion>> {
    let mut seen = HashSet::new();

    requests
        .into_iter()
        .map(|request| {
            let id = request
                .id
                .clone()
                .filter(|id| !id.trim().is_empty())
                .unwrap_or_else(|| Uuid::new_v4().to_string());
            if !seen.insert(id.clone()) {
                return Err(AppError::ValidationError(format!(
                    "Duplicate question id '{}'",
                    id
                )));
            }
            request.into_question(id)
        })
        .collect()
}

impl QuizService {
    pub fn new(
        repository: Arc<dyn QuizRepository>,
        attempt_repository: Arc<dyn QuizAttemptRepository>,
    ) -> Self {
        Self {
            repository,
            attempt_repository,
        }
    }

    pub async fn list_quizzes_for_course(&self, course_id: &str) -> AppResult<Vec<Quiz>> {
        self.repository.find_by_course(course_id).await
    }

    pub async fn get_quiz(&self, id: &str) -> AppResult<Quiz> {
        let quiz = self
            .repository
            .find_by_id(id)
            .await?
            .ok_or_else(|| quiz_not_found(id))?;

        Ok(quiz)
    }

    pub async fn create_quiz(&self, course_id: &str, request: QuizRequest) -> AppResult<Quiz> {
        if course_id.trim().is_empty() {
            return Err(AppError::ValidationError(
                "Course id cannot be empty".to_string(),
            ));
        }
        request.validate()?;

        let title = request
            .title
            .clone()
            .unwrap_or_else(|| DEFAULT_QUIZ_TITLE.to_string());
        let mut quiz = Quiz::new(course_id, &title);

        let (patch, questions) = request.into_patch();
        patch.apply(&mut quiz);
        if let Some(questions) = questions {
            quiz.set_questions(normalize_questions(questions)?);
        }

        let created = self.repository.create(quiz).await?;
        log::info!(
            "Created quiz '{}' in course '{}' with {} questions",
            created.id,
            created.course_id,
            created.questions.len()
        );
        Ok(created)
    }

    pub async fn update_quiz(&self, id: &str, request: QuizRequest) -> AppResult<Quiz> {
        request.validate()?;

        let (mut patch, questions) = request.into_patch();
        if let Some(questions) = questions {
            patch = patch.with_questions(normalize_questions(questions)?);
        }
        patch.modified_at = Some(Utc::now());

        let quiz = self
            .repository
            .update_fields(id, patch)
            .await?
            .ok_or_else(|| quiz_not_found(id))?;

        log::info!("Updated quiz '{}'", id);
        Ok(quiz)
    }

    /// Update through a course-scoped route; the quiz must belong to that course.
    pub async fn update_quiz_in_course(
        &self,
        course_id: &str,
        id: &str,
        request: QuizRequest,
    ) -> AppResult<Quiz> {
        let quiz = self.get_quiz(id).await?;
        if quiz.course_id != course_id {
            return Err(AppError::ValidationError(format!(
                "Quiz '{}' does not belong to course '{}'",
                id, course_id
            )));
        }

        self.update_quiz(id, request).await
    }

    /// Removes the quiz and then every attempt recorded against it.
    pub async fn delete_quiz(&self, id: &str) -> AppResult<()> {
        if !self.repository.delete(id).await? {
            return Err(quiz_not_found(id));
        }

        let removed = self.attempt_repository.delete_by_quiz(id).await?;
        log::info!("Deleted quiz '{}' and {} attempts", id, removed);
        Ok(())
    }

    pub async fn set_published(&self, id: &str, published: bool) -> AppResult<Quiz> {
        let quiz = self
            .repository
            .update_fields(id, QuizPatch::published(published))
            .await?
            .ok_or_else(|| quiz_not_found(id))?;

        log::info!("Quiz '{}' published = {}", id, published);
        Ok(quiz)
    }

    pub async fn quiz_exists(&self, course_id: &str, id: &str) -> AppResult<QuizExistence> {
        let existence = match self.repository.find_by_id(id).await? {
            Some(quiz) => QuizExistence {
                exists: true,
                course_matches: quiz.course_id == course_id,
                quiz: Some(QuizSummary::from(&quiz)),
            },
            None => QuizExistence {
                exists: false,
                course_matches: false,
                quiz: None,
            },
        };

        Ok(existence)
    }

    pub async fn add_question(
        &self,
        quiz_id: &str,
        request: QuestionRequest,
    ) -> AppResult<QuizQuestion> {
        let question = request.into_question(Uuid::new_v4().to_string())?;
        let question_id = question.id.clone();

        let quiz = self
            .repository
            .push_question(quiz_id, question)
            .await?
            .ok_or_else(|| quiz_not_found(quiz_id))?;

        log::info!(
            "Added question '{}' to quiz '{}' (points now {})",
            question_id,
            quiz_id,
            quiz.points
        );
        Self::question_in(&quiz, &question_id)
    }

    /// Replace a question wholesale. The stored id is kept whatever the request says.
    pub async fn update_question(
        &self,
        quiz_id: &str,
        question_id: &str,
        request: QuestionRequest,
    ) -> AppResult<QuizQuestion> {
        let question = request.into_question(question_id.to_string())?;

        match self.repository.replace_question(quiz_id, question).await? {
            Some(quiz) => {
                log::info!("Updated question '{}' in quiz '{}'", question_id, quiz_id);
                Self::question_in(&quiz, question_id)
            }
            None => Err(self.missing_question_error(quiz_id, question_id).await),
        }
    }

    pub async fn delete_question(&self, quiz_id: &str, question_id: &str) -> AppResult<()> {
        match self.repository.pull_question(quiz_id, question_id).await? {
            Some(quiz) => {
                log::info!(
                    "Removed question '{}' from quiz '{}' (points now {})",
                    question_id,
                    quiz_id,
                    quiz.points
                );
                Ok(())
            }
            None => Err(self.missing_question_error(quiz_id, question_id).await),
        }
    }

    fn question_in(quiz: &Quiz, question_id: &str) -> AppResult<QuizQuestion> {
        quiz.find_question(question_id).cloned().ok_or_else(|| {
            AppError::InternalError(format!(
                "Question '{}' missing from quiz '{}' after write",
                question_id, quiz.id
            ))
        })
    }

    // A `None` from a question mutation means either the quiz or the question
    // is missing; report whichever it was.
    async fn missing_question_error(&self, quiz_id: &str, question_id: &str) -> AppError {
        match self.repository.find_by_id(quiz_id).await {
            Ok(Some(_)) => AppError::NotFound(format!(
                "Question with id '{}' not found in quiz '{}'",
                question_id, quiz_id
            )),
            Ok(None) => quiz_not_found(quiz_id),
            Err(err) => err,
        }
    }
}
