pub mod health_handler;
pub mod quiz_attempt_handler;
pub mod quiz_handler;

use actix_web::{error::JsonPayloadError, web, HttpRequest};

use crate::errors::AppError;

pub use health_handler::{health_check, health_check_live, health_check_ready};

/// Routes mounted under the authenticated `/api` scope.
pub fn configure_api(cfg: &mut web::ServiceConfig) {
    cfg.service(quiz_handler::list_course_quizzes)
        .service(quiz_handler::create_quiz)
        .service(quiz_handler::quiz_exists)
        .service(quiz_handler::update_course_quiz)
        .service(quiz_handler::get_quiz)
        .service(quiz_handler::update_quiz)
        .service(quiz_handler::delete_quiz)
        .service(quiz_handler::publish_quiz)
        .service(quiz_handler::add_question)
        .service(quiz_handler::update_question)
        .service(quiz_handler::delete_question)
        .service(quiz_attempt_handler::submit_attempt)
        .service(quiz_attempt_handler::list_my_attempts)
        .service(quiz_attempt_handler::list_attempts)
        .service(quiz_attempt_handler::get_attempt)
        .service(quiz_attempt_handler::get_quiz_stats);
}

pub fn configure_health(cfg: &mut web::ServiceConfig) {
    cfg.service(health_check)
        .service(health_check_ready)
        .service(health_check_live);
}

/// JSON extractor settings: malformed or mistyped bodies become a 400 with
/// the usual error body instead of actix's plain-text response.
pub fn json_config() -> web::JsonConfig {
    web::JsonConfig::default()
        .limit(1024 * 1024)
        .error_handler(|err: JsonPayloadError, _req: &HttpRequest| {
            AppError::ValidationError(format!("Invalid JSON body: {}", err)).into()
        })
}
