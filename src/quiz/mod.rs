pub mod capitals;
pub mod responses;

use rand::Rng;
use thiserror::Error;

use self::capitals::Atlas;
use self::responses::ResponseSheet;

#[derive(Debug, Error)]
pub enum QuizError {
    #[error("asked for {requested} questions but only {available} states are known")]
    InsufficientData { requested: usize, available: usize },
    #[error("{state} has no capital")]
    MissingCapital { state: String },
    #[error("response index {index} is out of bounds for a {len}-question quiz")]
    IndexOutOfRange { index: usize, len: usize },
}

#[derive(Debug, Clone, Default, serde::Serialize, serde::Deserialize)]
pub struct Question {
    pub state: String,
    pub answers: Vec<Answer>,
}
impl Question {
    pub fn new(state: String, answers: Vec<Answer>) -> Self {
        Self { state, answers }
    }

    /// Every generated question carries exactly one correct answer.
    pub fn correct_answer(&self) -> &Answer {
        self.answers
            .iter()
            .find(|a| a.is_correct)
            .expect("question has a correct answer")
    }
}

#[derive(Debug, Clone, Default, serde::Serialize, serde::Deserialize)]
pub struct Answer {
    pub text: String,
    pub is_correct: bool,
}
impl Answer {
    pub fn new(text: String, is_correct: bool) -> Self {
        Self { text, is_correct }
    }
}

/// One quiz run: the generated questions plus one response slot per question.
///
/// Creating a session is the start transition; `submit` consumes it, so a
/// finished quiz can no longer be answered. Starting over means building a
/// fresh session.
#[derive(Debug, Clone, Default, serde::Serialize, serde::Deserialize)]
pub struct QuizSession {
    questions: Vec<Question>,
    responses: ResponseSheet,
}

impl QuizSession {
    pub const DEFAULT_QUESTION_COUNT: usize = 10;

    pub fn start<R: Rng + ?Sized>(
        atlas: &Atlas,
        count: usize,
        rng: &mut R,
    ) -> Result<Self, QuizError> {
        let questions = capitals::generate_questions(count, atlas, rng)?;
        let responses = ResponseSheet::new(questions.len());
        Ok(Self {
            questions,
            responses,
        })
    }

    pub fn questions(&self) -> &[Question] {
        &self.questions
    }

    pub fn len(&self) -> usize {
        self.questions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.questions.is_empty()
    }

    /// Records the user's pick for one question. Picking again overwrites.
    pub fn set_response(&mut self, index: usize, correct: bool) -> Result<(), QuizError> {
        self.responses.record(index, correct)
    }

    pub fn is_complete(&self) -> bool {
        self.responses.is_complete()
    }

    /// Scores the sheet and seals the quiz. The caller is expected to have
    /// checked `is_complete` first; unanswered slots simply score nothing.
    pub fn submit(self) -> FinishedQuiz {
        let score = self.responses.score();
        FinishedQuiz {
            questions: self.questions,
            responses: self.responses,
            score,
        }
    }
}

/// A sealed quiz: questions, the final sheet, and the score, all read-only.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct FinishedQuiz {
    pub questions: Vec<Question>,
    pub responses: ResponseSheet,
    pub score: usize,
}

#[cfg(test)]
mod tests {
    use super::*;
    use super::capitals::{Atlas, City, UsState};
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn three_state_atlas() -> Atlas {
        let state = |name: &str, capital: &str, other: &str| UsState {
            name: name.to_string(),
            cities: vec![
                City {
                    name: other.to_string(),
                    is_capital: false,
                },
                City {
                    name: capital.to_string(),
                    is_capital: true,
                },
            ],
        };
        Atlas {
            states: vec![
                state("Texas", "Austin", "Houston"),
                state("California", "Sacramento", "Los Angeles"),
                state("New York", "Albany", "Buffalo"),
            ],
        }
    }

    #[test]
    fn test_start_creates_unanswered_session() {
        let mut rng = StdRng::seed_from_u64(7);
        let session = QuizSession::start(&three_state_atlas(), 3, &mut rng).unwrap();
        assert_eq!(session.len(), 3);
        assert!(!session.is_empty());
        assert!(!session.is_complete());
    }

    #[test]
    fn test_each_capital_is_the_correct_answer_exactly_once() {
        let mut rng = StdRng::seed_from_u64(3);
        let session = QuizSession::start(&three_state_atlas(), 3, &mut rng).unwrap();

        let mut capitals: Vec<&str> = session
            .questions()
            .iter()
            .map(|q| q.correct_answer().text.as_str())
            .collect();
        capitals.sort_unstable();
        assert_eq!(capitals, ["Albany", "Austin", "Sacramento"]);
    }

    #[test]
    fn test_start_with_too_many_questions_fails() {
        let mut rng = StdRng::seed_from_u64(7);
        let err = QuizSession::start(&three_state_atlas(), 5, &mut rng).unwrap_err();
        assert!(matches!(
            err,
            QuizError::InsufficientData {
                requested: 5,
                available: 3
            }
        ));
    }

    #[test]
    fn test_submit_scores_correct_picks() {
        let mut rng = StdRng::seed_from_u64(42);
        let mut session = QuizSession::start(&three_state_atlas(), 3, &mut rng).unwrap();

        session.set_response(0, true).unwrap();
        session.set_response(1, false).unwrap();
        assert!(!session.is_complete());
        session.set_response(2, true).unwrap();
        assert!(session.is_complete());

        let finished = session.submit();
        assert_eq!(finished.score, 2);
        assert_eq!(finished.questions.len(), 3);
    }

    #[test]
    fn test_changing_a_pick_overwrites_the_slot() {
        let mut rng = StdRng::seed_from_u64(42);
        let mut session = QuizSession::start(&three_state_atlas(), 3, &mut rng).unwrap();

        session.set_response(0, true).unwrap();
        session.set_response(1, true).unwrap();
        session.set_response(2, true).unwrap();
        session.set_response(2, false).unwrap();

        assert!(session.is_complete());
        assert_eq!(session.submit().score, 2);
    }

    #[test]
    fn test_correct_answer_finds_the_capital() {
        let question = Question::new(
            "Texas".to_string(),
            vec![
                Answer::new("Houston".to_string(), false),
                Answer::new("Austin".to_string(), true),
            ],
        );
        assert_eq!(question.correct_answer().text, "Austin");
    }

    #[test]
    fn test_error_messages_name_the_fault() {
        let err = QuizError::MissingCapital {
            state: "Atlantis".to_string(),
        };
        assert_eq!(err.to_string(), "Atlantis has no capital");
    }
}
