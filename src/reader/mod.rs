pub mod text_reader;

pub use text_reader::{TextDocument, TextReader};
