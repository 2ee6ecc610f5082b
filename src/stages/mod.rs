// src/stages/mod.rs

//! Concrete pipeline stages.
//!
//! These are the transformation implementations behind the opaque
//! [`Stage`](crate::pipeline::Stage) contract: include splicing, an SCSS
//! subset compiler, comment stripping, CSS/JS minification, output
//! renaming, and source map emission. The orchestration core never looks
//! inside them; each is the smallest rendition that honours the stream
//! in / stream out contract.

pub mod comments;
pub mod include;
pub mod minify;
pub mod rename;
pub mod sass;
pub mod sourcemap;

pub use comments::StripComments;
pub use include::IncludeResolve;
pub use minify::{MinifyCss, MinifyJs};
pub use rename::Rename;
pub use sass::ScssCompile;
pub use sourcemap::SourceMap;
