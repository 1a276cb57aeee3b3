//! services/api/src/adapters/question_file.rs
//!
//! Loads the question catalog from a JSON file and serves it through the
//! `QuestionBank` port. The file is read once at startup and never written.

use async_trait::async_trait;
use quiz_core::domain::{Choice, ChoiceId, Question, QuestionId};
use quiz_core::ports::{PortError, PortResult, QuestionBank};
use serde::Deserialize;
use std::collections::{HashMap, HashSet};
use std::path::Path;
use std::sync::Arc;

/// Failures while reading the question file. All of them are fatal at startup.
#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    #[error("Failed to read question file {0}: {1}")]
    Io(String, std::io::Error),
    #[error("Malformed question file: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("Invalid question data: {0}")]
    Invalid(String),
}

//=========================================================================================
// "Impure" File Record Structs
//=========================================================================================

/// The file is either `{ "questions": [...] }` or a bare array of records.
#[derive(Deserialize)]
#[serde(untagged)]
enum QuestionFile {
    Wrapped { questions: Vec<QuestionRecord> },
    Bare(Vec<QuestionRecord>),
}

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct QuestionRecord {
    id: QuestionId,
    prompt: String,
    choices: Vec<ChoiceRecord>,
    correct: ChoiceId,
    #[serde(default)]
    audio: Option<String>,
}

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct ChoiceRecord {
    id: ChoiceId,
    text: String,
    #[serde(default)]
    audio: Option<String>,
}

impl QuestionRecord {
    fn to_domain(self) -> Result<Question, LoadError> {
        if self.prompt.trim().is_empty() {
            return Err(LoadError::Invalid(format!(
                "question {} has an empty prompt",
                self.id
            )));
        }
        if self.choices.is_empty() {
            return Err(LoadError::Invalid(format!(
                "question {} has no choices",
                self.id
            )));
        }
        let mut seen = HashSet::new();
        for choice in &self.choices {
            if !seen.insert(choice.id) {
                return Err(LoadError::Invalid(format!(
                    "question {} lists choice {} twice",
                    self.id, choice.id
                )));
            }
        }
        if !seen.contains(&self.correct) {
            return Err(LoadError::Invalid(format!(
                "question {} marks choice {} as correct but does not offer it",
                self.id, self.correct
            )));
        }

        Ok(Question {
            id: self.id,
            prompt: self.prompt,
            choices: self
                .choices
                .into_iter()
                .map(|c| Choice {
                    id: c.id,
                    text: c.text,
                    audio: non_blank(c.audio),
                })
                .collect(),
            correct_choice: self.correct,
            audio: non_blank(self.audio),
        })
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

//=========================================================================================
// The Main Adapter Struct
//=========================================================================================

/// An immutable question catalog that implements the `QuestionBank` port.
#[derive(Debug, Clone)]
pub struct JsonQuestionBank {
    order: Vec<QuestionId>,
    questions: HashMap<QuestionId, Arc<Question>>,
}

impl JsonQuestionBank {
    /// Reads and validates the question file at `path`.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, LoadError> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path)
            .map_err(|e| LoadError::Io(path.display().to_string(), e))?;
        Self::from_json(&raw)
    }

    pub fn from_json(raw: &str) -> Result<Self, LoadError> {
        let records = match serde_json::from_str::<QuestionFile>(raw)? {
            QuestionFile::Wrapped { questions } => questions,
            QuestionFile::Bare(questions) => questions,
        };
        let questions = records
            .into_iter()
            .map(QuestionRecord::to_domain)
            .collect::<Result<Vec<_>, _>>()?;
        Self::from_questions(questions)
    }

    /// Builds a bank from already-constructed questions, enforcing unique ids.
    pub fn from_questions(questions: Vec<Question>) -> Result<Self, LoadError> {
        if questions.is_empty() {
            return Err(LoadError::Invalid("the catalog has no questions".to_string()));
        }
        let mut order = Vec::with_capacity(questions.len());
        let mut by_id = HashMap::with_capacity(questions.len());
        for question in questions {
            let id = question.id;
            if by_id.insert(id, Arc::new(question)).is_some() {
                return Err(LoadError::Invalid(format!("duplicate question id {}", id)));
            }
            order.push(id);
        }
        Ok(Self {
            order,
            questions: by_id,
        })
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Questions in file order.
    pub fn iter(&self) -> impl Iterator<Item = &Arc<Question>> {
        self.order.iter().filter_map(|id| self.questions.get(id))
    }
}

//=========================================================================================
// `QuestionBank` Trait Implementation
//=========================================================================================

#[async_trait]
impl QuestionBank for JsonQuestionBank {
    async fn get(&self, id: QuestionId) -> PortResult<Arc<Question>> {
        self.questions
            .get(&id)
            .cloned()
            .ok_or_else(|| PortError::NotFound(format!("question {}", id)))
    }

    async fn all_ids(&self) -> PortResult<Vec<QuestionId>> {
        Ok(self.order.clone())
    }
}
