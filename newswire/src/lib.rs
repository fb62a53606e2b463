// Library interface for newswire modules
// This allows tests and the binary to import modules

pub mod item;
pub mod keywords;
pub mod normalize;
pub mod ingestion;
pub mod scraping;
pub mod llm;
pub mod enrichment;
pub mod output;
pub mod pipeline;

pub use item::{Item, NewsPayload};
pub use pipeline::Pipeline;
