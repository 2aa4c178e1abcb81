use actix_web::{get, post, web, HttpResponse};

use crate::{
    app_state::AppState,
    auth::AuthenticatedUser,
    errors::AppError,
    models::dto::request::{AttemptListQuery, SubmitAttemptRequest},
};

/// The attempt is always recorded for the authenticated user.
#[post("/quizzes/{quiz_id}/attempts")]
async fn submit_attempt(
    state: web::Data<AppState>,
    quiz_id: web::Path<String>,
    request: web::Json<SubmitAttemptRequest>,
    auth: AuthenticatedUser,
) -> Result<HttpResponse, AppError> {
    let attempt = state
        .quiz_attempt_service
        .submit_attempt(&quiz_id, auth.user_id(), request.into_inner())
        .await?;
    Ok(HttpResponse::Created().json(attempt))
}

#[get("/quizzes/{quiz_id}/attempts")]
async fn list_attempts(
    state: web::Data<AppState>,
    quiz_id: web::Path<String>,
    query: web::Query<AttemptListQuery>,
    auth: AuthenticatedUser,
) -> Result<HttpResponse, AppError> {
    let attempts = state
        .quiz_attempt_service
        .list_attempts(&auth.caller(), &quiz_id, query.user_id.as_deref())
        .await?;
    Ok(HttpResponse::Ok().json(attempts))
}

#[get("/quizzes/{quiz_id}/attempts/me")]
async fn list_my_attempts(
    state: web::Data<AppState>,
    quiz_id: web::Path<String>,
    auth: AuthenticatedUser,
) -> Result<HttpResponse, AppError> {
    let attempts = state
        .quiz_attempt_service
        .list_attempts(&auth.caller(), &quiz_id, Some(auth.user_id()))
        .await?;
    Ok(HttpResponse::Ok().json(attempts))
}

#[get("/attempts/{attempt_id}")]
async fn get_attempt(
    state: web::Data<AppState>,
    attempt_id: web::Path<String>,
    auth: AuthenticatedUser,
) -> Result<HttpResponse, AppError> {
    let attempt = state
        .quiz_attempt_service
        .get_attempt(&auth.caller(), &attempt_id)
        .await?;
    Ok(HttpResponse::Ok().json(attempt))
}

#[get("/quizzes/{quiz_id}/stats")]
async fn get_quiz_stats(
    state: web::Data<AppState>,
    quiz_id: web::Path<String>,
    auth: AuthenticatedUser,
) -> Result<HttpResponse, AppError> {
    let stats = state
        .quiz_attempt_service
        .get_stats(&auth.caller(), &quiz_id)
        .await?;
    Ok(HttpResponse::Ok().json(stats))
}
