use askama::Template;

use crate::errors::{DiffError, Result};

/// Page title used when none is configured
pub const DEFAULT_TITLE: &str = "JSON Diff";

#[derive(Template)]
#[template(path = "index.html")]
struct IndexPage<'a> {
    title: &'a str,
    asset_prefix: &'a str,
    state_json_str: &'a str,
}

/// Static inputs of every rendered page
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageContext {
    pub title: String,
    /// URL prefix the client scripts and stylesheets are served under
    pub asset_prefix: String,
}

impl PageContext {
    /// The prefix is normalized to end with `/`
    pub fn new(title: impl Into<String>, asset_prefix: impl Into<String>) -> Self {
        let mut asset_prefix = asset_prefix.into();
        if !asset_prefix.ends_with('/') {
            asset_prefix.push('/');
        }
        Self {
            title: title.into(),
            asset_prefix,
        }
    }
}

impl Default for PageContext {
    fn default() -> Self {
        Self::new(DEFAULT_TITLE, "/")
    }
}

/// Renders the viewer page
///
/// Built once at startup and shared read-only by every request.
#[derive(Debug, Clone, Default)]
pub struct PageRenderer {
    context: PageContext,
}

impl PageRenderer {
    pub fn new(context: PageContext) -> Self {
        Self { context }
    }

    pub fn context(&self) -> &PageContext {
        &self.context
    }

    /// Render the page around an embedded state literal
    ///
    /// `state_literal` is inserted unescaped; it must come from
    /// `embed_json` or be `EMPTY_STATE_LITERAL`.
    ///
    /// # Errors
    ///
    /// Returns `Render` if the template engine fails.
    pub fn render(&self, state_literal: &str) -> Result<String> {
        IndexPage {
            title: &self.context.title,
            asset_prefix: &self.context.asset_prefix,
            state_json_str: state_literal,
        }
        .render()
        .map_err(|e| DiffError::Render {
            reason: e.to_string(),
        })
    }
}
