pub mod config;
pub mod error;
pub mod event;
pub mod extractor;
pub mod ics;
pub mod llm;
pub mod pipeline;
pub mod sink;
pub mod startup;
pub mod utils;

pub use event::EventRecord;
pub use extractor::Extractor;
pub use pipeline::Pipeline;
