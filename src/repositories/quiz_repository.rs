use async_trait::async_trait;
use chrono::Utc;
use futures::TryStreamExt;
use mongodb::{
    bson::{self, doc, Bson, Document},
    options::{IndexOptions, ReturnDocument},
    Collection, IndexModel,
};

use crate::{
    db::Database,
    errors::{AppError, AppResult},
    models::domain::{timestamp, Quiz, QuizPatch, QuizQuestion},
    repositories::is_duplicate_key,
};

/// Storage for quizzes and their embedded questions.
///
/// Question mutations return the updated quiz, or `None` when the quiz (or,
/// for replace/remove, the question inside it) does not exist. Each of them
/// must update the question list and the point total in one atomic write.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait QuizRepository: Send + Sync {
    async fn find_by_id(&self, id: &str) -> AppResult<Option<Quiz>>;
    async fn find_by_course(&self, course_id: &str) -> AppResult<Vec<Quiz>>;
    async fn create(&self, quiz: Quiz) -> AppResult<Quiz>;
    async fn update_fields(&self, id: &str, patch: QuizPatch) -> AppResult<Option<Quiz>>;
    async fn push_question(&self, quiz_id: &str, question: QuizQuestion) -> AppResult<Option<Quiz>>;
    async fn replace_question(
        &self,
        quiz_id: &str,
        question: QuizQuestion,
    ) -> AppResult<Option<Quiz>>;
    async fn pull_question(&self, quiz_id: &str, question_id: &str) -> AppResult<Option<Quiz>>;
    async fn delete(&self, id: &str) -> AppResult<bool>;
}

pub struct MongoQuizRepository {
    collection: Collection<Quiz>,
}

impl MongoQuizRepository {
    pub fn new(db: &Database, collection_name: &str) -> Self {
        let collection = db.get_collection(collection_name);
        Self { collection }
    }

    pub async fn ensure_indexes(&self) -> AppResult<()> {
        log::info!("Creating indexes for quizzes collection");

        let id_index = IndexModel::builder()
            .keys(doc! { "id": 1 })
            .options(
                IndexOptions::builder()
                    .unique(true)
                    .name("id_unique".to_string())
                    .build(),
            )
            .build();

        let course_index = IndexModel::builder()
            .keys(doc! { "course_id": 1 })
            .options(
                IndexOptions::builder()
                    .name("course_id".to_string())
                    .build(),
            )
            .build();

        self.collection.create_index(id_index).await?;
        self.collection.create_index(course_index).await?;

        log::info!("Successfully created indexes for quizzes collection");
        Ok(())
    }

    /// Run a question-list pipeline followed by the point-total recompute as a
    /// single `findOneAndUpdate`.
    async fn update_questions(
        &self,
        filter: Document,
        questions_expr: Bson,
    ) -> AppResult<Option<Quiz>> {
        let now = timestamp::format(&Utc::now());
        let pipeline = vec![
            doc! { "$set": { "questions": questions_expr } },
            doc! {
                "$set": {
                    "points": { "$sum": "$questions.points" },
                    "modified_at": now,
                }
            },
        ];

        let quiz = self
            .collection
            .find_one_and_update(filter, pipeline)
            .return_document(ReturnDocument::After)
            .await?;
        Ok(quiz)
    }
}

// Embedded as `$literal` so user text such as "$5" is never read as a field path.
fn literal_question(question: &QuizQuestion) -> AppResult<Bson> {
    let value = bson::to_bson(question)?;
    Ok(Bson::Document(doc! { "$literal": value }))
}

#[async_trait]
impl QuizRepository for MongoQuizRepository {
    async fn find_by_id(&self, id: &str) -> AppResult<Option<Quiz>> {
        let quiz = self.collection.find_one(doc! { "id": id }).await?;
        Ok(quiz)
    }

    async fn find_by_course(&self, course_id: &str) -> AppResult<Vec<Quiz>> {
        let quizzes = self
            .collection
            .find(doc! { "course_id": course_id })
            .sort(doc! { "created_at": 1 })
            .await?
            .try_collect()
            .await?;
        Ok(quizzes)
    }

    async fn create(&self, quiz: Quiz) -> AppResult<Quiz> {
        match self.collection.insert_one(&quiz).await {
            Ok(_) => Ok(quiz),
            Err(err) if is_duplicate_key(&err) => Err(AppError::AlreadyExists(format!(
                "Quiz with id '{}' already exists",
                quiz.id
            ))),
            Err(err) => Err(err.into()),
        }
    }

    async fn update_fields(&self, id: &str, patch: QuizPatch) -> AppResult<Option<Quiz>> {
        let set = bson::to_document(&patch)?;
        if set.is_empty() {
            return self.find_by_id(id).await;
        }

        let quiz = self
            .collection
            .find_one_and_update(doc! { "id": id }, doc! { "$set": set })
            .return_document(ReturnDocument::After)
            .await?;
        Ok(quiz)
    }

    async fn push_question(&self, quiz_id: &str, question: QuizQuestion) -> AppResult<Option<Quiz>> {
        let appended = literal_question(&question)?;
        let questions = doc! {
            "$concatArrays": [
                { "$ifNull": ["$questions", []] },
                [appended],
            ]
        };
        self.update_questions(doc! { "id": quiz_id }, Bson::Document(questions))
            .await
    }

    async fn replace_question(
        &self,
        quiz_id: &str,
        question: QuizQuestion,
    ) -> AppResult<Option<Quiz>> {
        let question_id = question.id.clone();
        let replacement = literal_question(&question)?;
        let questions = doc! {
            "$map": {
                "input": "$questions",
                "as": "q",
                "in": {
                    "$cond": [
                        { "$eq": ["$$q.id", question_id.as_str()] },
                        replacement,
                        "$$q",
                    ]
                }
            }
        };
        self.update_questions(
            doc! { "id": quiz_id, "questions.id": question_id.as_str() },
            Bson::Document(questions),
        )
        .await
    }

    async fn pull_question(&self, quiz_id: &str, question_id: &str) -> AppResult<Option<Quiz>> {
        let questions = doc! {
            "$filter": {
                "input": "$questions",
                "as": "q",
                "cond": { "$ne": ["$$q.id", question_id] },
            }
        };
        self.update_questions(
            doc! { "id": quiz_id, "questions.id": question_id },
            Bson::Document(questions),
        )
        .await
    }

    async fn delete(&self, id: &str) -> AppResult<bool> {
        let result = self.collection.delete_one(doc! { "id": id }).await?;
        Ok(result.deleted_count > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::domain::QuestionKind;

    #[test]
    fn literal_question_wraps_the_serialized_question() {
        let question = QuizQuestion {
            id: "q1".to_string(),
            title: "$price".to_string(),
            points: 2,
            question: "How much is $5?".to_string(),
            kind: QuestionKind::FillBlank {
                possible_answers: vec!["$5".to_string()],
            },
        };

        let literal = literal_question(&question).expect("question should serialize");
        let inner = literal
            .as_document()
            .and_then(|d| d.get_document("$literal").ok())
            .expect("literal wrapper");

        assert_eq!(inner.get_str("id").unwrap(), "q1");
        assert_eq!(inner.get_str("type").unwrap(), "fill-blank");
        assert_eq!(inner.get_str("title").unwrap(), "$price");
    }

    #[test]
    fn patch_document_contains_only_set_fields() {
        let patch = QuizPatch {
            title: Some("Renamed".to_string()),
            ..Default::default()
        };
        let set = bson::to_document(&patch).expect("patch should serialize");

        assert_eq!(set.len(), 1);
        assert_eq!(set.get_str("title").unwrap(), "Renamed");
    }

    #[test]
    fn stored_timestamps_have_fixed_width() {
        let whole_second = chrono::DateTime::parse_from_rfc3339("2024-03-01T12:00:00Z")
            .unwrap()
            .with_timezone(&Utc);
        let patch = QuizPatch {
            modified_at: Some(whole_second),
            ..Default::default()
        };
        let set = bson::to_document(&patch).expect("patch should serialize");
        assert_eq!(
            set.get_str("modified_at").unwrap(),
            "2024-03-01T12:00:00.000000000Z"
        );

        let mut quiz = Quiz::new("RS101", "Quiz");
        quiz.created_at = Some(whole_second);
        let stored = bson::to_document(&quiz).expect("quiz should serialize");
        assert_eq!(
            stored.get_str("created_at").unwrap().len(),
            "2024-03-01T12:00:00.000000000Z".len()
        );
        let read: Quiz = bson::from_document(stored).expect("quiz should deserialize");
        assert_eq!(read.created_at, Some(whole_second));
    }
}
