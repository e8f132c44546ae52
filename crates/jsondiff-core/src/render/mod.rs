//! Page rendering
//!
//! - `embed`: JSON re-serialization safe to drop into a `<script>` block
//! - `page`: the immutable renderer that fills the HTML template

pub mod embed;
pub mod page;

pub use embed::{embed_json, EmbedFormatter, EMPTY_STATE_LITERAL};
pub use page::{PageContext, PageRenderer, DEFAULT_TITLE};
