// src/disclosure.rs

//! Progressive disclosure of quiz questions.
//!
//! Questions are revealed in order. A stop question is always shown itself,
//! but nothing after it is shown until every question up to and including it
//! has a submitted answer.

use crate::models::{
    question::PublicQuestion,
    quiz::Quiz,
    quiz_record::QuizRecord,
    student::{StudentQuiz, StudentQuizRecord},
};

/// Number of leading questions the student may see.
pub fn revealed_len(quiz: &Quiz, record: &QuizRecord) -> usize {
    let mut fully_submitted = true;

    for (i, question) in quiz.questions.iter().enumerate() {
        if !record.answers.get(i).is_some_and(|a| a.submitted) {
            fully_submitted = false;
        }
        if question.is_stop && !fully_submitted {
            return i + 1;
        }
    }

    quiz.questions.len()
}

/// Student view of a quiz and its record. Answer keys never leave here.
/// Callers must have rejected disabled quizzes already.
pub fn reveal(quiz: &Quiz, record: &QuizRecord) -> (StudentQuiz, StudentQuizRecord) {
    let shown = revealed_len(quiz, record);

    let student_quiz = StudentQuiz {
        title: quiz.title.clone(),
        questions: quiz.questions[..shown]
            .iter()
            .map(PublicQuestion::from)
            .collect(),
        num_questions: quiz.questions.len(),
    };

    let student_record = StudentQuizRecord {
        id: record.id.clone(),
        name: record.name.clone(),
        answers: record.answers.clone(),
        version: record.version,
    };

    (student_quiz, student_record)
}
