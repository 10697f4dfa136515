pub mod conversation;
pub mod enrollment;
pub mod intent;
pub mod report;
pub mod utterance;
