pub mod interface;
pub mod page_highlighter;
pub mod prompts;
pub mod recorded;
pub mod text_source;
