pub mod config;
pub mod diff;
pub mod drafts;
pub mod provider;
pub mod server;

pub use translations_publisher::{LocaleId, PublishOutcome, Publisher, TranslationMap};
