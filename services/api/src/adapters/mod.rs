pub mod memory_store;
pub mod question_file;
pub mod shuffle;

pub use memory_store::InMemorySessionStore;
pub use question_file::{JsonQuestionBank, LoadError};
pub use shuffle::{SeededShuffler, ThreadRngShuffler};
