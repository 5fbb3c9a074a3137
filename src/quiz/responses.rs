use crate::quiz::QuizError;

/// What the user has done with one question so far.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum Response {
    Unanswered,
    Correct,
    Incorrect,
}

impl Default for Response {
    fn default() -> Self {
        Response::Unanswered
    }
}

/// One slot per question, fixed length for the whole quiz.
#[derive(Debug, Clone, Default, serde::Serialize, serde::Deserialize)]
pub struct ResponseSheet {
    slots: Vec<Response>,
}

impl ResponseSheet {
    pub fn new(len: usize) -> Self {
        Self {
            slots: vec![Response::Unanswered; len],
        }
    }

    /// Marks the slot at `index`. Recording twice keeps the last write, which
    /// is how a changed pick is modeled.
    pub fn record(&mut self, index: usize, correct: bool) -> Result<(), QuizError> {
        let len = self.slots.len();
        let slot = self
            .slots
            .get_mut(index)
            .ok_or(QuizError::IndexOutOfRange { index, len })?;
        *slot = if correct {
            Response::Correct
        } else {
            Response::Incorrect
        };
        Ok(())
    }

    pub fn get(&self, index: usize) -> Option<Response> {
        self.slots.get(index).copied()
    }

    pub fn slots(&self) -> &[Response] {
        &self.slots
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    pub fn is_complete(&self) -> bool {
        self.slots.iter().all(|slot| *slot != Response::Unanswered)
    }

    /// How many questions were answered correctly.
    pub fn score(&self) -> usize {
        self.slots
            .iter()
            .filter(|slot| **slot == Response::Correct)
            .count()
    }
}
