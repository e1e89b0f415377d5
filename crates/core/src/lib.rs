pub mod audit;
pub mod config;
pub mod errors;
pub mod message;
pub mod recognition;
pub mod richtext;

pub use audit::{
    InMemoryRecognitionLog, NoopRecognitionLog, RecognitionLog, RecognitionLogError,
    RecognitionRecord,
};
pub use errors::MentionError;
pub use message::{prepare_kudos, MessageComposer, PreparedKudos};
pub use recognition::{Recognition, RecognitionCatalog};
pub use richtext::{extract, extract_field, resolve_recipient, RichTextDocument};
