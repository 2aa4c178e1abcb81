#![allow(dead_code)]

use std::{collections::HashMap, sync::Arc};

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;

use quiz_engine_server::{
    app_state::AppState,
    config::Config,
    errors::{AppError, AppResult},
    models::domain::{AttemptInsert, QuestionKind, Quiz, QuizAttempt, QuizPatch, QuizQuestion},
    repositories::{QuizAttemptRepository, QuizRepository},
    services::{quiz_attempt_service::QuizAttemptService, quiz_service::QuizService},
};

/// Quiz storage backed by a map. Every mutation happens under one write lock,
/// matching the single-document atomicity of the MongoDB implementation.
#[derive(Clone, Default)]
pub struct InMemoryQuizRepository {
    quizzes: Arc<RwLock<HashMap<String, Quiz>>>,
}

impl InMemoryQuizRepository {
    pub fn new() -> Self {
        Self::default()
    }

    async fn mutate<F>(&self, quiz_id: &str, change: F) -> AppResult<Option<Quiz>>
    where
        F: FnOnce(&mut Quiz) -> bool + Send,
    {
        let mut quizzes = self.quizzes.write().await;
        let Some(quiz) = quizzes.get_mut(quiz_id) else {
            return Ok(None);
        };

        if !change(quiz) {
            return Ok(None);
        }
        quiz.modified_at = Some(Utc::now());
        Ok(Some(quiz.clone()))
    }
}

#[async_trait]
impl QuizRepository for InMemoryQuizRepository {
    async fn find_by_id(&self, id: &str) -> AppResult<Option<Quiz>> {
        let quizzes = self.quizzes.read().await;
        Ok(quizzes.get(id).cloned())
    }

    async fn find_by_course(&self, course_id: &str) -> AppResult<Vec<Quiz>> {
        let quizzes = self.quizzes.read().await;
        let mut items: Vec<_> = quizzes
            .values()
            .filter(|q| q.course_id == course_id)
            .cloned()
            .collect();
        items.sort_by(|a, b| a.created_at.cmp(&b.created_at).then(a.id.cmp(&b.id)));
        Ok(items)
    }

    async fn create(&self, quiz: Quiz) -> AppResult<Quiz> {
        let mut quizzes = self.quizzes.write().await;
        if quizzes.contains_key(&quiz.id) {
            return Err(AppError::AlreadyExists(format!(
                "Quiz with id '{}' already exists",
                quiz.id
            )));
        }
        quizzes.insert(quiz.id.clone(), quiz.clone());
        Ok(quiz)
    }

    async fn update_fields(&self, id: &str, patch: QuizPatch) -> AppResult<Option<Quiz>> {
        let mut quizzes = self.quizzes.write().await;
        Ok(quizzes.get_mut(id).map(|quiz| {
            patch.apply(quiz);
            quiz.clone()
        }))
    }

    async fn push_question(&self, quiz_id: &str, question: QuizQuestion) -> AppResult<Option<Quiz>> {
        self.mutate(quiz_id, |quiz| {
            let mut questions = quiz.questions.clone();
            questions.push(question);
            quiz.set_questions(questions);
            true
        })
        .await
    }

    async fn replace_question(
        &self,
        quiz_id: &str,
        question: QuizQuestion,
    ) -> AppResult<Option<Quiz>> {
        let question_id = question.id.clone();
        self.mutate(quiz_id, move |quiz| {
            let mut questions = quiz.questions.clone();
            match questions.iter_mut().find(|q| q.id == question_id) {
                Some(slot) => *slot = question,
                None => return false,
            }
            quiz.set_questions(questions);
            true
        })
        .await
    }

    async fn pull_question(&self, quiz_id: &str, question_id: &str) -> AppResult<Option<Quiz>> {
        self.mutate(quiz_id, |quiz| {
            if quiz.find_question(question_id).is_none() {
                return false;
            }
            let questions = quiz
                .questions
                .iter()
                .filter(|q| q.id != question_id)
                .cloned()
                .collect();
            quiz.set_questions(questions);
            true
        })
        .await
    }

    async fn delete(&self, id: &str) -> AppResult<bool> {
        let mut quizzes = self.quizzes.write().await;
        Ok(quizzes.remove(id).is_some())
    }
}

/// Attempt storage that enforces the (quiz, user, attempt number) slot rule
/// under a single write lock.
#[derive(Clone, Default)]
pub struct InMemoryQuizAttemptRepository {
    attempts: Arc<RwLock<Vec<QuizAttempt>>>,
}

impl InMemoryQuizAttemptRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn len(&self) -> usize {
        self.attempts.read().await.len()
    }
}

fn newest_first(mut attempts: Vec<QuizAttempt>) -> Vec<QuizAttempt> {
    attempts.sort_by(|a, b| {
        b.submitted_at
            .cmp(&a.submitted_at)
            .then(b.attempt_number.cmp(&a.attempt_number))
    });
    attempts
}

#[async_trait]
impl QuizAttemptRepository for InMemoryQuizAttemptRepository {
    async fn insert_if_slot_free(&self, attempt: QuizAttempt) -> AppResult<AttemptInsert> {
        let mut attempts = self.attempts.write().await;
        let taken = attempts.iter().any(|a| {
            a.quiz_id == attempt.quiz_id
                && a.user_id == attempt.user_id
                && a.attempt_number == attempt.attempt_number
        });
        if taken {
            return Ok(AttemptInsert::SlotTaken);
        }

        attempts.push(attempt.clone());
        Ok(AttemptInsert::Inserted(attempt))
    }

    async fn find_by_id(&self, id: &str) -> AppResult<Option<QuizAttempt>> {
        let attempts = self.attempts.read().await;
        Ok(attempts.iter().find(|a| a.id == id).cloned())
    }

    async fn find_by_quiz(&self, quiz_id: &str) -> AppResult<Vec<QuizAttempt>> {
        let attempts = self.attempts.read().await;
        Ok(newest_first(
            attempts
                .iter()
                .filter(|a| a.quiz_id == quiz_id)
                .cloned()
                .collect(),
        ))
    }

    async fn find_by_quiz_and_user(
        &self,
        quiz_id: &str,
        user_id: &str,
    ) -> AppResult<Vec<QuizAttempt>> {
        let attempts = self.attempts.read().await;
        Ok(newest_first(
            attempts
                .iter()
                .filter(|a| a.quiz_id == quiz_id && a.user_id == user_id)
                .cloned()
                .collect(),
        ))
    }

    async fn count_user_attempts(&self, quiz_id: &str, user_id: &str) -> AppResult<u64> {
        let attempts = self.attempts.read().await;
        Ok(attempts
            .iter()
            .filter(|a| a.quiz_id == quiz_id && a.user_id == user_id)
            .count() as u64)
    }

    async fn delete_by_quiz(&self, quiz_id: &str) -> AppResult<u64> {
        let mut attempts = self.attempts.write().await;
        let before = attempts.len();
        attempts.retain(|a| a.quiz_id != quiz_id);
        Ok((before - attempts.len()) as u64)
    }
}

pub struct TestEngine {
    pub quizzes: InMemoryQuizRepository,
    pub attempts: InMemoryQuizAttemptRepository,
    pub quiz_service: QuizService,
    pub attempt_service: Arc<QuizAttemptService>,
}

pub fn engine() -> TestEngine {
    let quizzes = InMemoryQuizRepository::new();
    let attempts = InMemoryQuizAttemptRepository::new();

    TestEngine {
        quiz_service: QuizService::new(Arc::new(quizzes.clone()), Arc::new(attempts.clone())),
        attempt_service: Arc::new(QuizAttemptService::new(
            Arc::new(quizzes.clone()),
            Arc::new(attempts.clone()),
        )),
        quizzes,
        attempts,
    }
}

pub fn app_state() -> (AppState, InMemoryQuizRepository, InMemoryQuizAttemptRepository) {
    let quizzes = InMemoryQuizRepository::new();
    let attempts = InMemoryQuizAttemptRepository::new();
    let state = AppState::from_repositories(
        Config::test_config(),
        Arc::new(quizzes.clone()),
        Arc::new(attempts.clone()),
    );
    (state, quizzes, attempts)
}

pub fn multiple_choice(id: &str, points: i32, correct_answer: u32) -> QuizQuestion {
    QuizQuestion {
        id: id.to_string(),
        title: "Pick one".to_string(),
        points,
        question: "What is JSX?".to_string(),
        kind: QuestionKind::MultipleChoice {
            choices: vec![
                "A syntax extension".to_string(),
                "A database".to_string(),
                "A bundler".to_string(),
                "A test runner".to_string(),
            ],
            correct_answer,
        },
    }
}

pub fn true_false(id: &str, points: i32, correct_answer: &str) -> QuizQuestion {
    QuizQuestion {
        id: id.to_string(),
        title: "True or false".to_string(),
        points,
        question: "Components must return a single root element.".to_string(),
        kind: QuestionKind::TrueFalse {
            correct_answer: correct_answer.to_string(),
        },
    }
}

pub fn fill_blank(id: &str, points: i32, possible_answers: &[&str]) -> QuizQuestion {
    QuizQuestion {
        id: id.to_string(),
        title: "Fill in the blank".to_string(),
        points,
        question: "The hook for local state is ____.".to_string(),
        kind: QuestionKind::FillBlank {
            possible_answers: possible_answers.iter().map(|a| a.to_string()).collect(),
        },
    }
}

pub fn make_quiz(course_id: &str, questions: Vec<QuizQuestion>) -> Quiz {
    let mut quiz = Quiz::new(course_id, "React Basics");
    quiz.set_questions(questions);
    quiz
}
