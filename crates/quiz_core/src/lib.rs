pub mod domain;
pub mod engine;
pub mod ports;

pub use domain::{AnswerRecord, Choice, ChoiceId, Progress, Question, QuestionId, Session, Summary};
pub use engine::{AnswerOutcome, CurrentQuestion, NextStep, QuizEngine, QuizError, QuizResult, StartedQuiz};
pub use ports::{PortError, PortResult, QuestionBank, SessionStore, Shuffler};
