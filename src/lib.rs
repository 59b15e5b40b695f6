//! srcmark — annotate rendered source-code pages.
//!
//! Highlights witness lines with an inline reason and links called function
//! names to their definition pages. Every operation takes markup and returns
//! the rewritten markup; nothing is mutated in place.

pub mod highlight;
pub mod link;
pub mod markup;
pub mod model;
pub mod rewrite;
pub mod viewer;

pub use highlight::{highlight_lines, highlight_term, HighlightConfig};
pub use link::{link_called_functions, make_function_link, DEFAULT_EXTENSION};
pub use model::{FunctionLink, PageAnnotations, Witness};
pub use viewer::{MarkupExt, Viewer, ViewerConfig};
