use std::sync::Arc;

use crate::{
    config::Config,
    db::Database,
    errors::AppResult,
    repositories::{
        MongoQuizAttemptRepository, MongoQuizRepository, QuizAttemptRepository, QuizRepository,
    },
    services::{quiz_attempt_service::QuizAttemptService, quiz_service::QuizService},
};

#[derive(Clone)]
pub struct AppState {
    pub quiz_service: Arc<QuizService>,
    pub quiz_attempt_service: Arc<QuizAttemptService>,
    pub config: Arc<Config>,
    pub db: Option<Database>,
}

impl AppState {
    pub async fn new(config: Config) -> AppResult<Self> {
        let db = Database::connect(&config).await?;

        let quiz_repository = MongoQuizRepository::new(&db, &config.quizzes_collection);
        quiz_repository.ensure_indexes().await?;

        let attempt_repository =
            MongoQuizAttemptRepository::new(&db, &config.quiz_attempts_collection);
        attempt_repository.ensure_indexes().await?;

        let mut state = Self::from_repositories(
            config,
            Arc::new(quiz_repository),
            Arc::new(attempt_repository),
        );
        state.db = Some(db);
        Ok(state)
    }

    /// Wire the services over any repository implementation, with no
    /// database handle for readiness checks.
    pub fn from_repositories(
        config: Config,
        quiz_repository: Arc<dyn QuizRepository>,
        attempt_repository: Arc<dyn QuizAttemptRepository>,
    ) -> Self {
        let quiz_service = Arc::new(QuizService::new(
            Arc::clone(&quiz_repository),
            Arc::clone(&attempt_repository),
        ));
        let quiz_attempt_service = Arc::new(QuizAttemptService::new(
            quiz_repository,
            attempt_repository,
        ));

        Self {
            quiz_service,
            quiz_attempt_service,
            config: Arc::new(config),
            db: None,
        }
    }
}
