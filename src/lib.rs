//! A parser and converter for a lightweight, line-oriented structured
//! markup language.
//!
//! Pipeline: [`tokenizer`] → [`parser`] (with [`inline`] sub-parsing and
//! include expansion) → cross-reference resolution → [`convert`]. The
//! [`process::Processor`] facade wires the whole pipeline together for the
//! common "parse this text, convert it to HTML" case.

pub mod ast;
pub mod convert;
pub mod error;
pub mod inline;
pub mod parser;
pub mod process;
pub mod tokenizer;
pub mod tools;

pub use ast::Document;
pub use convert::{Converter, ConvertOptions};
pub use error::ProcessError;
pub use parser::{Diagnostic, Parser, ParserOptions, SafeMode};
pub use process::Processor;
