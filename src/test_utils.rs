use crate::models::domain::{QuestionKind, Quiz, QuizQuestion};

pub fn true_false_question(id: &str, points: i32) -> QuizQuestion {
    QuizQuestion {
        id: id.to_string(),
        title: "True or false".to_string(),
        points,
        question: "Rust has a garbage collector.".to_string(),
        kind: QuestionKind::TrueFalse {
            correct_answer: "true".to_string(),
        },
    }
}

pub fn multiple_choice_question(id: &str, points: i32, correct_answer: u32) -> QuizQuestion {
    QuizQuestion {
        id: id.to_string(),
        title: "Pick one".to_string(),
        points,
        question: "Which keyword declares a constant?".to_string(),
        kind: QuestionKind::MultipleChoice {
            choices: vec![
                "const".to_string(),
                "let".to_string(),
                "static".to_string(),
                "mut".to_string(),
            ],
            correct_answer,
        },
    }
}

pub fn fill_blank_question(id: &str, points: i32, possible_answers: &[&str]) -> QuizQuestion {
    QuizQuestion {
        id: id.to_string(),
        title: "Fill in the blank".to_string(),
        points,
        question: "The React hook for local state is ____.".to_string(),
        kind: QuestionKind::FillBlank {
            possible_answers: possible_answers.iter().map(|a| a.to_string()).collect(),
        },
    }
}

/// A quiz with a single two-point true/false question `q1`.
pub fn quiz_with_limit(multiple_attempts: bool, attempt_limit: u32) -> Quiz {
    let mut quiz = Quiz::new("RS101", "Ownership Quiz");
    quiz.multiple_attempts = multiple_attempts;
    quiz.attempt_limit = attempt_limit;
    quiz.set_questions(vec![true_false_question("q1", 2)]);
    quiz
}
