//! Slot rendering seam.
//!
//! The pool owns slot identity and bookkeeping; renderers own what a slot
//! looks like. A renderer hands back an opaque handle per slot so the pool
//! never depends on a concrete UI toolkit.

use askama::Template;
use console::style;
use indicatif::ProgressBar;

use crate::models::{ResultDomain, SearchResult};

/// Creates placeholder slots and fills them with concrete results.
///
/// `fill_slot` must be idempotent: filling an already-filled handle
/// replaces its content, it never duplicates the slot.
pub trait Renderer {
    type Handle;

    /// Create a placeholder slot for `index` in its pending visual state.
    fn create_slot(&mut self, domain: ResultDomain, index: usize) -> Self::Handle;

    /// Replace the slot's content with a concrete result.
    fn fill_slot(&mut self, handle: &mut Self::Handle, index: usize, result: &SearchResult);
}

// ---------------------------------------------------------------------------
// HTML rendering
// ---------------------------------------------------------------------------

#[derive(Template)]
#[template(path = "result_skeleton.html")]
struct ResultSkeletonTemplate {
    index: usize,
}

#[derive(Template)]
#[template(path = "result.html")]
struct ResultTemplate<'a> {
    index: usize,
    result: &'a SearchResult,
}

#[derive(Template)]
#[template(path = "image_skeleton.html")]
struct ImageSkeletonTemplate {
    index: usize,
}

#[derive(Template)]
#[template(path = "image_result.html")]
struct ImageResultTemplate<'a> {
    index: usize,
    result: &'a SearchResult,
}

/// One rendered HTML slot.
#[derive(Debug, Clone)]
pub struct HtmlSlot {
    pub index: usize,
    pub domain: ResultDomain,
    pub html: String,
    pub filled: bool,
}

/// Renders slots as HTML fragments matching the search page's markup.
/// General results get the listing layout, image results the gallery one.
#[derive(Debug, Clone, Default)]
pub struct HtmlRenderer;

impl Renderer for HtmlRenderer {
    type Handle = HtmlSlot;

    fn create_slot(&mut self, domain: ResultDomain, index: usize) -> HtmlSlot {
        let html = match domain {
            ResultDomain::General => ResultSkeletonTemplate { index }.render(),
            ResultDomain::Images => ImageSkeletonTemplate { index }.render(),
        }
        .expect("render skeleton template");

        HtmlSlot {
            index,
            domain,
            html,
            filled: false,
        }
    }

    fn fill_slot(&mut self, handle: &mut HtmlSlot, index: usize, result: &SearchResult) {
        handle.html = match handle.domain {
            ResultDomain::General => ResultTemplate { index, result }.render(),
            ResultDomain::Images => ImageResultTemplate { index, result }.render(),
        }
        .expect("render result template");
        handle.filled = true;
    }
}

// ---------------------------------------------------------------------------
// Console rendering
// ---------------------------------------------------------------------------

/// Prints filled results as styled terminal lines. Placeholder slots have
/// no visual representation on a terminal, so `create_slot` is bookkeeping
/// only.
#[derive(Default)]
pub struct ConsoleRenderer {
    progress: Option<ProgressBar>,
}

impl ConsoleRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Route output through a progress bar so result lines do not tear it.
    pub fn with_progress(progress: ProgressBar) -> Self {
        Self {
            progress: Some(progress),
        }
    }

    fn print(&self, line: String) {
        match &self.progress {
            Some(bar) => bar.println(line),
            None => println!("{}", line),
        }
    }
}

impl Renderer for ConsoleRenderer {
    type Handle = ();

    fn create_slot(&mut self, _domain: ResultDomain, _index: usize) {}

    fn fill_slot(&mut self, _handle: &mut (), index: usize, result: &SearchResult) {
        let mut tags = result
            .engines
            .iter()
            .map(|engine| format!("[{}]", engine))
            .collect::<Vec<_>>()
            .join(" ");
        if result.cached {
            if !tags.is_empty() {
                tags.push(' ');
            }
            tags.push_str("[cached]");
        }

        self.print(format!(
            "{:>4}. {} {}",
            index,
            style(&result.title).bold(),
            style(&tags).dim()
        ));
        self.print(format!("      {}", style(&result.url).cyan()));
        if !result.description.is_empty() {
            self.print(format!("      {}", result.description));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::EngineTags;

    fn result() -> SearchResult {
        SearchResult {
            url: "https://example.com".to_string(),
            title: "Example".to_string(),
            description: "An example result".to_string(),
            engines: EngineTags(vec!["duckduckgo".to_string()]),
            cached: true,
        }
    }

    #[test]
    fn test_html_skeleton_then_fill() {
        let mut renderer = HtmlRenderer;
        let mut slot = renderer.create_slot(ResultDomain::General, 3);
        assert!(!slot.filled);
        assert!(slot.html.contains("result-skeleton"));
        assert!(slot.html.contains(r#"data-result-id="3""#));

        renderer.fill_slot(&mut slot, 3, &result());
        assert!(slot.filled);
        assert!(slot.html.contains("https://example.com"));
        assert!(slot.html.contains("engine-tag"));
        assert!(slot.html.contains("Cached"));
        assert!(!slot.html.contains("result-skeleton"));
    }

    #[test]
    fn test_html_fill_overwrites_in_place() {
        let mut renderer = HtmlRenderer;
        let mut slot = renderer.create_slot(ResultDomain::General, 0);

        renderer.fill_slot(&mut slot, 0, &result());
        let mut second = result();
        second.title = "Replacement".to_string();
        renderer.fill_slot(&mut slot, 0, &second);

        assert!(slot.html.contains("Replacement"));
        assert!(!slot.html.contains(">Example<"));
    }

    #[test]
    fn test_image_markup_differs_from_general() {
        let mut renderer = HtmlRenderer;
        let mut slot = renderer.create_slot(ResultDomain::Images, 0);
        renderer.fill_slot(&mut slot, 0, &result());
        assert!(slot.html.contains("image-result"));
        assert!(slot.html.contains("image-thumb"));
    }
}
