//! The GDPR self-assessment questionnaire completed by Controllers and DPOs.
//!
//! Each visible question scores green, orange or red according to its
//! answer; a question whose visibility condition is unmet is skipped.
//! Unanswered questions and answers outside the known sets score red.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{Error, Result};

/// The overall traffic-light rating of an application.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Vote {
  Red,
  Orange,
  Green,
}

/// Show a question only when another question has a given answer.
#[derive(Debug, Clone)]
pub struct VisibleIf {
  pub question: usize,
  pub equals:   &'static str,
}

#[derive(Debug, Clone)]
pub struct Question {
  pub text:       &'static str,
  pub green:      &'static [&'static str],
  pub orange:     &'static [&'static str],
  pub red:        &'static [&'static str],
  pub visible_if: Option<VisibleIf>,
  /// Whether a free-text note may accompany the answer.
  pub allows_note: bool,
}

impl Question {
  fn new(
    text: &'static str,
    green: &'static [&'static str],
    orange: &'static [&'static str],
    red: &'static [&'static str],
  ) -> Self {
    Self { text, green, orange, red, visible_if: None, allows_note: false }
  }

  fn shown_when(mut self, question: usize, equals: &'static str) -> Self {
    self.visible_if = Some(VisibleIf { question, equals });
    self
  }

  fn with_note(mut self) -> Self {
    self.allows_note = true;
    self
  }
}

/// Score counts and the derived vote.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Evaluation {
  pub vote:   Vote,
  pub red:    u32,
  pub orange: u32,
  pub green:  u32,
}

/// A stored questionnaire submission.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuestionnaireResult {
  pub evaluation:   Evaluation,
  pub answers:      Vec<Option<String>>,
  pub notes:        Vec<Option<String>>,
  pub evaluated_by: Uuid,
  pub evaluated_at: DateTime<Utc>,
}

/// An ordered set of questions; answers are addressed by index.
#[derive(Debug, Clone)]
pub struct Questionnaire {
  questions: Vec<Question>,
}

impl Questionnaire {
  pub fn new(questions: Vec<Question>) -> Self { Self { questions } }

  /// The built-in GDPR baseline assessment.
  pub fn baseline() -> Self {
    const YES: &[&str] = &["yes"];
    const NO: &[&str] = &["no"];
    const PARTIAL: &[&str] = &["partially"];
    const NONE: &[&str] = &[];

    Self::new(vec![
      Question::new(
        "Is a legal basis documented for every processing purpose?",
        YES, PARTIAL, NO,
      ),
      Question::new(
        "Are special categories of personal data (Art. 9) processed?",
        NO, YES, NONE,
      ),
      Question::new(
        "Is explicit consent or another Art. 9(2) condition documented?",
        YES, PARTIAL, NO,
      )
      .shown_when(1, "yes"),
      Question::new(
        "Is personal data transferred outside the EEA?",
        NO, YES, NONE,
      ),
      Question::new(
        "Are transfers covered by an adequacy decision or standard clauses?",
        YES, PARTIAL, NO,
      )
      .shown_when(3, "yes"),
      Question::new(
        "Is a retention period defined for each data category?",
        YES, PARTIAL, NO,
      ),
      Question::new(
        "Can subjects exercise access, erasure and portability rights?",
        YES, PARTIAL, NO,
      ),
      Question::new(
        "Is there a procedure to notify breaches within 72 hours?",
        YES, NONE, NO,
      )
      .with_note(),
      Question::new(
        "Has an impact assessment (DPIA) been carried out where required?",
        &["yes", "not_applicable"], PARTIAL, NO,
      )
      .with_note(),
    ])
  }

  pub fn questions(&self) -> &[Question] { &self.questions }

  pub fn len(&self) -> usize { self.questions.len() }

  pub fn is_empty(&self) -> bool { self.questions.is_empty() }

  /// Score `answers`. Missing trailing answers count as unanswered.
  pub fn evaluate(&self, answers: &[Option<String>]) -> Result<Evaluation> {
    if answers.len() > self.questions.len() {
      return Err(Error::validation(format!(
        "{} answers given for {} questions",
        answers.len(),
        self.questions.len()
      )));
    }

    let answer_at = |idx: usize| answers.get(idx).and_then(|a| a.as_deref());
    let (mut red, mut orange, mut green) = (0, 0, 0);

    for (idx, question) in self.questions.iter().enumerate() {
      if let Some(cond) = &question.visible_if
        && answer_at(cond.question) != Some(cond.equals)
      {
        continue;
      }

      match answer_at(idx) {
        Some(a) if question.green.contains(&a) => green += 1,
        Some(a) if question.orange.contains(&a) => orange += 1,
        _ => red += 1,
      }
    }

    let vote = if red > 0 {
      Vote::Red
    } else if orange > 0 {
      Vote::Orange
    } else {
      Vote::Green
    };

    Ok(Evaluation { vote, red, orange, green })
  }

  /// Keep notes only for questions that accept one; pad to the question
  /// count.
  pub fn normalize_notes(&self, notes: Vec<Option<String>>) -> Vec<Option<String>> {
    let mut notes = notes.into_iter();
    self
      .questions
      .iter()
      .map(|q| {
        let note = notes.next().flatten();
        note.filter(|n| q.allows_note && !n.trim().is_empty())
      })
      .collect()
  }
}
