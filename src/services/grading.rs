use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::models::domain::{AnswerMap, QuestionKind, QuizQuestion};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct ScoreBreakdown {
    pub score: i32,
    pub max_score: i32,
    pub percentage: i32,
}

/// Grade a set of answers against the quiz questions.
///
/// Every question counts towards `max_score` whether or not it was answered.
/// Questions are graded independently, and an answer of the wrong JSON shape
/// for its question type simply earns nothing.
pub fn score_answers(questions: &[QuizQuestion], answers: &AnswerMap) -> ScoreBreakdown {
    let mut score: i32 = 0;
    let mut max_score: i32 = 0;

    for question in questions {
        max_score = max_score.saturating_add(question.points);

        let is_correct = answers
            .get(&question.id)
            .map(|answer| is_answer_correct(&question.kind, answer))
            .unwrap_or(false);

        if is_correct {
            score = score.saturating_add(question.points);
        }
    }

    ScoreBreakdown {
        score,
        max_score,
        percentage: percentage(score, max_score),
    }
}

pub fn is_answer_correct(kind: &QuestionKind, answer: &Value) -> bool {
    match kind {
        QuestionKind::MultipleChoice { correct_answer, .. } => match answer {
            // Numeric equality only: "0" is not 0.
            Value::Number(n) => n.as_f64() == Some(f64::from(*correct_answer)),
            _ => false,
        },
        // String-to-string comparison. A JSON `true` never equals "true";
        // clients have always sent the string form and stored attempts rely on it.
        QuestionKind::TrueFalse { correct_answer } => match answer {
            Value::String(s) => s == correct_answer,
            _ => false,
        },
        QuestionKind::FillBlank { possible_answers } => match answer {
            Value::String(s) => {
                let submitted = normalize_blank(s);
                possible_answers
                    .iter()
                    .any(|accepted| normalize_blank(accepted) == submitted)
            }
            _ => false,
        },
    }
}

fn normalize_blank(value: &str) -> String {
    value.trim().to_lowercase()
}

/// `round(score / max_score * 100)`, rounding halves away from zero.
pub fn percentage(score: i32, max_score: i32) -> i32 {
    if max_score <= 0 {
        return 0;
    }
    (f64::from(score) / f64::from(max_score) * 100.0).round() as i32
}
