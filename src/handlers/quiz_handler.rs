use actix_web::{delete, get, patch, post, put, web, HttpResponse};

use crate::{
    app_state::AppState,
    auth::{require_staff, AuthenticatedUser},
    errors::AppError,
    models::dto::{
        request::{PublishQuizRequest, QuestionRequest, QuizRequest},
        response::{MessageResponse, QuizForTaking},
    },
};

/// Like `get_quiz`, students see each quiz without answer keys.
#[get("/courses/{course_id}/quizzes")]
async fn list_course_quizzes(
    state: web::Data<AppState>,
    course_id: web::Path<String>,
    auth: AuthenticatedUser,
) -> Result<HttpResponse, AppError> {
    let quizzes = state
        .quiz_service
        .list_quizzes_for_course(&course_id)
        .await?;

    if auth.caller().is_staff() {
        Ok(HttpResponse::Ok().json(quizzes))
    } else {
        let views: Vec<QuizForTaking> = quizzes.into_iter().map(QuizForTaking::from).collect();
        Ok(HttpResponse::Ok().json(views))
    }
}

#[post("/courses/{course_id}/quizzes")]
async fn create_quiz(
    state: web::Data<AppState>,
    course_id: web::Path<String>,
    request: web::Json<QuizRequest>,
    auth: AuthenticatedUser,
) -> Result<HttpResponse, AppError> {
    require_staff(&auth.caller())?;

    let quiz = state
        .quiz_service
        .create_quiz(&course_id, request.into_inner())
        .await?;
    Ok(HttpResponse::Created().json(quiz))
}

#[get("/courses/{course_id}/quizzes/{quiz_id}/exists")]
async fn quiz_exists(
    state: web::Data<AppState>,
    path: web::Path<(String, String)>,
    _auth: AuthenticatedUser,
) -> Result<HttpResponse, AppError> {
    let (course_id, quiz_id) = path.into_inner();
    let existence = state.quiz_service.quiz_exists(&course_id, &quiz_id).await?;
    Ok(HttpResponse::Ok().json(existence))
}

#[put("/courses/{course_id}/quizzes/{quiz_id}")]
async fn update_course_quiz(
    state: web::Data<AppState>,
    path: web::Path<(String, String)>,
    request: web::Json<QuizRequest>,
    auth: AuthenticatedUser,
) -> Result<HttpResponse, AppError> {
    require_staff(&auth.caller())?;

    let (course_id, quiz_id) = path.into_inner();
    let quiz = state
        .quiz_service
        .update_quiz_in_course(&course_id, &quiz_id, request.into_inner())
        .await?;
    Ok(HttpResponse::Ok().json(quiz))
}

/// Staff get the full quiz; students get it without answer keys.
#[get("/quizzes/{quiz_id}")]
async fn get_quiz(
    state: web::Data<AppState>,
    quiz_id: web::Path<String>,
    auth: AuthenticatedUser,
) -> Result<HttpResponse, AppError> {
    let quiz = state.quiz_service.get_quiz(&quiz_id).await?;

    if auth.caller().is_staff() {
        Ok(HttpResponse::Ok().json(quiz))
    } else {
        Ok(HttpResponse::Ok().json(QuizForTaking::from(quiz)))
    }
}

#[put("/quizzes/{quiz_id}")]
async fn update_quiz(
    state: web::Data<AppState>,
    quiz_id: web::Path<String>,
    request: web::Json<QuizRequest>,
    auth: AuthenticatedUser,
) -> Result<HttpResponse, AppError> {
    require_staff(&auth.caller())?;

    let quiz = state
        .quiz_service
        .update_quiz(&quiz_id, request.into_inner())
        .await?;
    Ok(HttpResponse::Ok().json(quiz))
}

#[delete("/quizzes/{quiz_id}")]
async fn delete_quiz(
    state: web::Data<AppState>,
    quiz_id: web::Path<String>,
    auth: AuthenticatedUser,
) -> Result<HttpResponse, AppError> {
    require_staff(&auth.caller())?;

    state.quiz_service.delete_quiz(&quiz_id).await?;
    Ok(HttpResponse::Ok().json(MessageResponse {
        message: "Quiz deleted successfully".to_string(),
    }))
}

#[patch("/quizzes/{quiz_id}/publish")]
async fn publish_quiz(
    state: web::Data<AppState>,
    quiz_id: web::Path<String>,
    request: web::Json<PublishQuizRequest>,
    auth: AuthenticatedUser,
) -> Result<HttpResponse, AppError> {
    require_staff(&auth.caller())?;

    let published = request.published()?;
    let quiz = state.quiz_service.set_published(&quiz_id, published).await?;
    Ok(HttpResponse::Ok().json(quiz))
}

#[post("/quizzes/{quiz_id}/questions")]
async fn add_question(
    state: web::Data<AppState>,
    quiz_id: web::Path<String>,
    request: web::Json<QuestionRequest>,
    auth: AuthenticatedUser,
) -> Result<HttpResponse, AppError> {
    require_staff(&auth.caller())?;

    let question = state
        .quiz_service
        .add_question(&quiz_id, request.into_inner())
        .await?;
    Ok(HttpResponse::Created().json(question))
}

#[put("/quizzes/{quiz_id}/questions/{question_id}")]
async fn update_question(
    state: web::Data<AppState>,
    path: web::Path<(String, String)>,
    request: web::Json<QuestionRequest>,
    auth: AuthenticatedUser,
) -> Result<HttpResponse, AppError> {
    require_staff(&auth.caller())?;

    let (quiz_id, question_id) = path.into_inner();
    let question = state
        .quiz_service
        .update_question(&quiz_id, &question_id, request.into_inner())
        .await?;
    Ok(HttpResponse::Ok().json(question))
}

#[delete("/quizzes/{quiz_id}/questions/{question_id}")]
async fn delete_question(
    state: web::Data<AppState>,
    path: web::Path<(String, String)>,
    auth: AuthenticatedUser,
) -> Result<HttpResponse, AppError> {
    require_staff(&auth.caller())?;

    let (quiz_id, question_id) = path.into_inner();
    state
        .quiz_service
        .delete_question(&quiz_id, &question_id)
        .await?;
    Ok(HttpResponse::Ok().json(MessageResponse {
        message: "Question deleted successfully".to_string(),
    }))
}
