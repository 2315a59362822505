use std::collections::HashMap;

use crate::models::domain::{
    submission::QuestionOutcome, Question, QuestionAnswer, SubmissionResult,
};

/// Grades `answers` against `questions`.
///
/// Unanswered questions count as wrong. If a question id appears more than
/// once in `answers`, the first answer is the one graded. Answers for unknown
/// question ids are ignored.
pub fn score(questions: &[Question], answers: &[QuestionAnswer]) -> SubmissionResult {
    let mut by_question: HashMap<&str, u8> = HashMap::with_capacity(answers.len());
    for answer in answers {
        by_question
            .entry(answer.question_id.as_str())
            .or_insert(answer.selected_option_number);
    }

    let outcomes: Vec<QuestionOutcome> = questions
        .iter()
        .map(|question| {
            let selected = by_question.get(question.id.as_str()).copied();
            let is_correct = selected.is_some_and(|option| question.is_correct(option));
            QuestionOutcome {
                question_id: question.id.clone(),
                selected_option_number: selected,
                is_correct,
                points_earned: if is_correct { question.point_value } else { 0 },
            }
        })
        .collect();

    let correct_count = outcomes.iter().filter(|o| o.is_correct).count();
    let points_earned = outcomes.iter().map(|o| u64::from(o.points_earned)).sum();

    SubmissionResult {
        score: percentage(correct_count, questions.len()),
        points_earned,
        correct_count,
        total_questions: questions.len(),
        outcomes,
    }
}

/// `correct / total * 100`, rounded half away from zero.
fn percentage(correct: usize, total: usize) -> u8 {
    if total == 0 {
        return 0;
    }
    let correct = correct.min(total) as u64;
    let total = total as u64;
    ((correct * 200 + total) / (total * 2)) as u8
}
