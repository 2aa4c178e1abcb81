use std::{collections::HashSet, sync::Arc};

use validator::Validate;

use crate::{
    auth::{require_self_or_staff, require_staff, Caller},
    errors::{AppError, AppResult},
    models::{
        domain::{AttemptInsert, Quiz, QuizAttempt},
        dto::{request::SubmitAttemptRequest, response::QuizStats},
    },
    repositories::{QuizAttemptRepository, QuizRepository},
    services::grading::score_answers,
};

/// How many times a submission re-checks eligibility after losing an attempt
/// slot to a concurrent submission by the same user.
const MAX_SLOT_CLAIMS: usize = 8;

pub struct QuizAttemptService {
    quiz_repository: Arc<dyn QuizRepository>,
    repository: Arc<dyn QuizAttemptRepository>,
}

/// Decide whether a user holding `prior_attempts` may submit another attempt.
pub fn check_eligibility(quiz: &Quiz, prior_attempts: u64) -> AppResult<()> {
    if prior_attempts < u64::from(quiz.max_attempts()) {
        return Ok(());
    }

    let message = if quiz.multiple_attempts {
        "maximum attempts exceeded"
    } else {
        "multiple attempts not allowed"
    };
    Err(AppError::InvalidState(message.to_string()))
}

/// Aggregate statistics over a quiz's attempts. All zero when there are none.
pub fn summarize(attempts: &[QuizAttempt]) -> QuizStats {
    if attempts.is_empty() {
        return QuizStats::default();
    }

    let unique_students = attempts
        .iter()
        .map(|a| a.user_id.as_str())
        .collect::<HashSet<_>>()
        .len() as u64;
    let total: i64 = attempts.iter().map(|a| i64::from(a.score)).sum();
    let highest_score = attempts.iter().map(|a| a.score).max().unwrap_or(0);
    let lowest_score = attempts.iter().map(|a| a.score).min().unwrap_or(0);

    QuizStats {
        total_attempts: attempts.len() as u64,
        unique_students,
        average_score: total as f64 / attempts.len() as f64,
        highest_score,
        lowest_score,
    }
}

impl QuizAttemptService {
    pub fn new(
        quiz_repository: Arc<dyn QuizRepository>,
        repository: Arc<dyn QuizAttemptRepository>,
    ) -> Self {
        Self {
            quiz_repository,
            repository,
        }
    }

    async fn find_quiz(&self, quiz_id: &str) -> AppResult<Quiz> {
        self.quiz_repository
            .find_by_id(quiz_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Quiz with id '{}' not found", quiz_id)))
    }

    /// Grade and record a submission as the user's next attempt.
    ///
    /// The attempt number is claimed with a conditional insert. When another
    /// submission by the same user claims the slot first, the prior count is
    /// re-read and eligibility checked again, so the attempt limit holds under
    /// concurrent submissions. Storage errors are returned as they occur.
    pub async fn submit_attempt(
        &self,
        quiz_id: &str,
        user_id: &str,
        request: SubmitAttemptRequest,
    ) -> AppResult<QuizAttempt> {
        request.validate()?;
        let quiz = self.find_quiz(quiz_id).await?;
        let breakdown = score_answers(&quiz.questions, &request.answers);

        for _ in 0..MAX_SLOT_CLAIMS {
            let prior = self
                .repository
                .count_user_attempts(quiz_id, user_id)
                .await?;

            if let Err(err) = check_eligibility(&quiz, prior) {
                log::warn!(
                    "Rejected submission by '{}' on quiz '{}': {}",
                    user_id,
                    quiz_id,
                    err
                );
                return Err(err);
            }

            let attempt_number = u32::try_from(prior + 1).map_err(|_| {
                AppError::InternalError(format!("Attempt count overflow for quiz '{}'", quiz_id))
            })?;
            let attempt = QuizAttempt::new(
                &quiz,
                user_id,
                request.answers.clone(),
                breakdown,
                request.time_spent,
                attempt_number,
            );

            match self.repository.insert_if_slot_free(attempt).await? {
                AttemptInsert::Inserted(attempt) => {
                    log::info!(
                        "Recorded attempt {} by '{}' on quiz '{}': {}/{}",
                        attempt.attempt_number,
                        user_id,
                        quiz_id,
                        attempt.score,
                        attempt.max_score
                    );
                    return Ok(attempt);
                }
                AttemptInsert::SlotTaken => continue,
            }
        }

        Err(AppError::InvalidState(
            "too many concurrent submissions, try again".to_string(),
        ))
    }

    pub async fn get_attempt(&self, caller: &Caller, attempt_id: &str) -> AppResult<QuizAttempt> {
        let not_found =
            || AppError::NotFound(format!("Attempt with id '{}' not found", attempt_id));

        let attempt = self
            .repository
            .find_by_id(attempt_id)
            .await?
            .ok_or_else(not_found)?;

        // Other users' attempts look missing rather than forbidden.
        if !caller.is_staff() && attempt.user_id != caller.user_id {
            return Err(not_found());
        }
        Ok(attempt)
    }

    /// Attempts for a quiz, newest first. Without `user_id` every user's
    /// attempts are listed, which like listing someone else's needs staff.
    pub async fn list_attempts(
        &self,
        caller: &Caller,
        quiz_id: &str,
        user_id: Option<&str>,
    ) -> AppResult<Vec<QuizAttempt>> {
        match user_id {
            Some(user_id) => {
                require_self_or_staff(caller, user_id)?;
                self.repository.find_by_quiz_and_user(quiz_id, user_id).await
            }
            None => {
                require_staff(caller)?;
                self.repository.find_by_quiz(quiz_id).await
            }
        }
    }

    pub async fn get_stats(&self, caller: &Caller, quiz_id: &str) -> AppResult<QuizStats> {
        require_staff(caller)?;
        let attempts = self.repository.find_by_quiz(quiz_id).await?;
        Ok(summarize(&attempts))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::domain::{AnswerMap, UserRole};
    use crate::repositories::{
        quiz_attempt_repository::MockQuizAttemptRepository,
        quiz_repository::MockQuizRepository,
    };
    use crate::services::grading::ScoreBreakdown;
    use crate::test_utils::quiz_with_limit;
    use serde_json::json;

    fn attempt(quiz: &Quiz, user_id: &str, score: i32, number: u32) -> QuizAttempt {
        let breakdown = ScoreBreakdown {
            score,
            max_score: 10,
            percentage: score * 10,
        };
        QuizAttempt::new(quiz, user_id, AnswerMap::new(), breakdown, None, number)
    }

    fn service(quizzes: MockQuizRepository, attempts: MockQuizAttemptRepository) -> QuizAttemptService {
        QuizAttemptService::new(Arc::new(quizzes), Arc::new(attempts))
    }

    fn student(id: &str) -> Caller {
        Caller::new(id, UserRole::Student)
    }

    #[test]
    fn single_attempt_quiz_allows_only_the_first() {
        let quiz = quiz_with_limit(false, 5);
        assert!(check_eligibility(&quiz, 0).is_ok());

        match check_eligibility(&quiz, 1) {
            Err(AppError::InvalidState(message)) => {
                assert_eq!(message, "multiple attempts not allowed")
            }
            other => panic!("expected InvalidState, got {:?}", other),
        }
    }

    #[test]
    fn multiple_attempt_quiz_stops_at_limit() {
        let quiz = quiz_with_limit(true, 2);
        assert!(check_eligibility(&quiz, 0).is_ok());
        assert!(check_eligibility(&quiz, 1).is_ok());

        match check_eligibility(&quiz, 2) {
            Err(AppError::InvalidState(message)) => assert_eq!(message, "maximum attempts exceeded"),
            other => panic!("expected InvalidState, got {:?}", other),
        }
    }

    #[test]
    fn attempt_limit_is_ignored_without_multiple_attempts() {
        let quiz = quiz_with_limit(false, 5);
        assert_eq!(quiz.max_attempts(), 1);
        assert!(check_eligibility(&quiz, 1).is_err());
        assert!(check_eligibility(&quiz, 4).is_err());

        let quiz = quiz_with_limit(true, 5);
        assert!(check_eligibility(&quiz, 4).is_ok());
        assert!(check_eligibility(&quiz, 5).is_err());
    }

    #[test]
    fn summarize_empty_is_all_zero() {
        assert_eq!(summarize(&[]), QuizStats::default());
    }

    #[test]
    fn summarize_counts_unique_students_and_extremes() {
        let quiz = quiz_with_limit(true, 3);
        let attempts = vec![
            attempt(&quiz, "ann", 4, 1),
            attempt(&quiz, "ann", 8, 2),
            attempt(&quiz, "bob", 3, 1),
        ];

        let stats = summarize(&attempts);
        assert_eq!(stats.total_attempts, 3);
        assert_eq!(stats.unique_students, 2);
        assert_eq!(stats.highest_score, 8);
        assert_eq!(stats.lowest_score, 3);
        assert!((stats.average_score - 5.0).abs() < f64::EPSILON);
    }

    #[tokio::test]
    async fn submit_retries_after_losing_a_slot() {
        let quiz = quiz_with_limit(true, 3);
        let quiz_id = quiz.id.clone();

        let mut quizzes = MockQuizRepository::new();
        quizzes
            .expect_find_by_id()
            .returning(move |_| Ok(Some(quiz.clone())));

        let mut attempts = MockQuizAttemptRepository::new();
        let mut counts = vec![0u64, 1].into_iter();
        attempts
            .expect_count_user_attempts()
            .times(2)
            .returning(move |_, _| Ok(counts.next().unwrap_or(1)));
        let mut outcomes = 0;
        attempts
            .expect_insert_if_slot_free()
            .times(2)
            .returning(move |attempt| {
                outcomes += 1;
                if outcomes == 1 {
                    Ok(AttemptInsert::SlotTaken)
                } else {
                    Ok(AttemptInsert::Inserted(attempt))
                }
            });

        let mut answers = AnswerMap::new();
        answers.insert("q1".to_string(), json!("true"));
        let request = SubmitAttemptRequest {
            answers,
            time_spent: Some(5),
        };

        let attempt = service(quizzes, attempts)
            .submit_attempt(&quiz_id, "ann", request)
            .await
            .expect("second claim should succeed");

        assert_eq!(attempt.attempt_number, 2);
        assert_eq!(attempt.score, 2);
        assert_eq!(attempt.max_score, 2);
        assert_eq!(attempt.time_spent, Some(5));
    }

    #[tokio::test]
    async fn submit_gives_up_when_slot_is_never_free() {
        let quiz = quiz_with_limit(true, 100);

        let mut quizzes = MockQuizRepository::new();
        quizzes
            .expect_find_by_id()
            .returning(move |_| Ok(Some(quiz.clone())));
        let mut attempts = MockQuizAttemptRepository::new();
        attempts.expect_count_user_attempts().returning(|_, _| Ok(0));
        attempts
            .expect_insert_if_slot_free()
            .times(MAX_SLOT_CLAIMS)
            .returning(|_| Ok(AttemptInsert::SlotTaken));

        let result = service(quizzes, attempts)
            .submit_attempt("q", "ann", SubmitAttemptRequest::default())
            .await;
        assert!(matches!(result, Err(AppError::InvalidState(_))));
    }

    #[tokio::test]
    async fn submit_propagates_storage_failure_without_retry() {
        let quiz = quiz_with_limit(true, 3);

        let mut quizzes = MockQuizRepository::new();
        quizzes
            .expect_find_by_id()
            .returning(move |_| Ok(Some(quiz.clone())));
        let mut attempts = MockQuizAttemptRepository::new();
        attempts.expect_count_user_attempts().times(1).returning(|_, _| Ok(0));
        attempts
            .expect_insert_if_slot_free()
            .times(1)
            .returning(|_| Err(AppError::DatabaseError("write concern".to_string())));

        let result = service(quizzes, attempts)
            .submit_attempt("q", "ann", SubmitAttemptRequest::default())
            .await;
        assert!(matches!(result, Err(AppError::DatabaseError(_))));
    }

    #[tokio::test]
    async fn submit_to_missing_quiz_is_not_found() {
        let mut quizzes = MockQuizRepository::new();
        quizzes.expect_find_by_id().returning(|_| Ok(None));
        let mut attempts = MockQuizAttemptRepository::new();
        attempts.expect_insert_if_slot_free().never();

        let result = service(quizzes, attempts)
            .submit_attempt("missing", "ann", SubmitAttemptRequest::default())
            .await;
        assert!(matches!(result, Err(AppError::NotFound(_))));
    }

    #[tokio::test]
    async fn students_cannot_list_all_attempts_or_read_stats() {
        let mut attempts = MockQuizAttemptRepository::new();
        attempts.expect_find_by_quiz().never();
        let svc = service(MockQuizRepository::new(), attempts);

        let listed = svc.list_attempts(&student("ann"), "q", None).await;
        assert!(matches!(listed, Err(AppError::Forbidden(_))));

        let others = svc.list_attempts(&student("ann"), "q", Some("bob")).await;
        assert!(matches!(others, Err(AppError::Forbidden(_))));

        let stats = svc.get_stats(&student("ann"), "q").await;
        assert!(matches!(stats, Err(AppError::Forbidden(_))));
    }

    #[tokio::test]
    async fn student_lists_own_attempts() {
        let quiz = quiz_with_limit(true, 3);
        let mine = attempt(&quiz, "ann", 4, 1);

        let mut attempts = MockQuizAttemptRepository::new();
        attempts
            .expect_find_by_quiz_and_user()
            .withf(|quiz_id, user_id| quiz_id == "q" && user_id == "ann")
            .returning(move |_, _| Ok(vec![mine.clone()]));

        let listed = service(MockQuizRepository::new(), attempts)
            .list_attempts(&student("ann"), "q", Some("ann"))
            .await
            .expect("own attempts are visible");
        assert_eq!(listed.len(), 1);
    }

    #[tokio::test]
    async fn get_attempt_hides_other_users_attempts() {
        let quiz = quiz_with_limit(true, 3);
        let theirs = attempt(&quiz, "bob", 4, 1);

        let mut attempts = MockQuizAttemptRepository::new();
        attempts
            .expect_find_by_id()
            .returning(move |_| Ok(Some(theirs.clone())));
        let svc = service(MockQuizRepository::new(), attempts);

        let hidden = svc.get_attempt(&student("ann"), "a1").await;
        assert!(matches!(hidden, Err(AppError::NotFound(_))));

        let staff = Caller::new("prof", UserRole::Faculty);
        assert!(svc.get_attempt(&staff, "a1").await.is_ok());
    }
}
