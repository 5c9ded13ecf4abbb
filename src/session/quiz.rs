use crate::bank::question::Question;

/// What locking in an answer produced. The caller decides what to do with
/// it (update the wrong set, badges).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AnswerOutcome {
    pub question_id: String,
    pub correct: bool,
}

/// State for one pass through a list of questions: pick an option, reveal
/// the answer with its analysis, move on. Pure in-memory state; persistence
/// of outcomes belongs to the caller.
pub struct QuizSession {
    questions: Vec<Question>,
    cursor: usize,
    selected: usize,
    revealed: bool,
    correct_count: usize,
    wrong_count: usize,
}

impl QuizSession {
    pub fn new(questions: Vec<Question>) -> Self {
        Self {
            questions,
            cursor: 0,
            selected: 0,
            revealed: false,
            correct_count: 0,
            wrong_count: 0,
        }
    }

    pub fn current(&self) -> Option<&Question> {
        self.questions.get(self.cursor)
    }

    pub fn selected(&self) -> usize {
        self.selected
    }

    pub fn revealed(&self) -> bool {
        self.revealed
    }

    pub fn is_finished(&self) -> bool {
        self.cursor >= self.questions.len()
    }

    pub fn total(&self) -> usize {
        self.questions.len()
    }

    /// 1-based position for display, capped at the total.
    pub fn position(&self) -> usize {
        (self.cursor + 1).min(self.questions.len().max(1))
    }

    pub fn correct_count(&self) -> usize {
        self.correct_count
    }

    pub fn wrong_count(&self) -> usize {
        self.wrong_count
    }

    /// Fraction of answered questions that were correct, in 0..=1.
    pub fn accuracy(&self) -> f64 {
        let answered = self.correct_count + self.wrong_count;
        if answered == 0 {
            return 0.0;
        }
        self.correct_count as f64 / answered as f64
    }

    pub fn select_next(&mut self) {
        if self.revealed {
            return;
        }
        if let Some(q) = self.current() {
            if !q.options.is_empty() {
                self.selected = (self.selected + 1) % q.options.len();
            }
        }
    }

    pub fn select_prev(&mut self) {
        if self.revealed {
            return;
        }
        if let Some(q) = self.current() {
            if !q.options.is_empty() {
                self.selected = (self.selected + q.options.len() - 1) % q.options.len();
            }
        }
    }

    /// Locks in the selected option and shows the answer. Returns `None`
    /// when already revealed or when the question has no options to pick.
    pub fn reveal(&mut self) -> Option<AnswerOutcome> {
        if self.revealed {
            return None;
        }
        let question = self.questions.get(self.cursor)?;
        let option = question.options.get(self.selected)?;
        let correct = option.label == question.answer;
        if correct {
            self.correct_count += 1;
        } else {
            self.wrong_count += 1;
        }
        self.revealed = true;
        Some(AnswerOutcome {
            question_id: question.id.clone(),
            correct,
        })
    }

    /// Moves to the next question. Before reveal this only applies to
    /// questions with nothing to answer, which are skipped unscored.
    pub fn advance(&mut self) {
        let skippable = self
            .current()
            .map(|q| q.options.is_empty())
            .unwrap_or(false);
        if !self.revealed && !skippable {
            return;
        }
        self.cursor += 1;
        self.selected = 0;
        self.revealed = false;
    }
}
