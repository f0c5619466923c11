//! Rendering of server-supplied interview plans.
//!
//! The service intentionally returns rich HTML (headings, lists, a prep-tips
//! section), so the document is kept as markup rather than escaped. It still
//! crosses a trust boundary: every document passes through an allowlist
//! sanitizer before it is shown or written anywhere, so a compromised or
//! misconfigured endpoint cannot smuggle executable content into the page.

use ammonia::Builder;
use once_cell::sync::Lazy;
use std::collections::{HashMap, HashSet};

/// Structural and formatting elements the service is expected to emit.
/// Anything outside this list (scripts, styles, links, images, frames) is
/// stripped, content included where ammonia deems it unsafe.
const ALLOWED_TAGS: &[&str] = &[
    "article", "section", "header", "footer", "h1", "h2", "h3", "h4", "p", "ul", "ol", "li",
    "strong", "em", "b", "i", "blockquote", "code", "pre", "hr", "br", "span", "details",
    "summary",
];

static SANITIZER: Lazy<Builder<'static>> = Lazy::new(|| {
    let mut builder = Builder::default();
    builder
        .tags(HashSet::from_iter(ALLOWED_TAGS.iter().copied()))
        .generic_attributes(HashSet::new())
        .tag_attributes(HashMap::from([
            ("span", HashSet::from(["aria-label", "title"])),
            ("details", HashSet::from(["open"])),
        ]));
    builder
});

/// A sanitized interview plan, safe to display or write to disk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedPlan {
    pub html: String,
}

/// Sanitize a server document into displayable content.
pub fn render(document: &str) -> RenderedPlan {
    RenderedPlan {
        html: SANITIZER.clean(document).to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_structural_markup_is_preserved() {
        let plan = render("<article><h2>Topics</h2><ul><li>Ownership</li></ul></article>");
        assert_eq!(
            plan.html,
            "<article><h2>Topics</h2><ul><li>Ownership</li></ul></article>"
        );
    }

    #[test]
    fn test_script_elements_are_stripped_entirely() {
        let plan = render("<article>Plan<script>alert(1)</script></article>");
        assert!(!plan.html.contains("script"));
        assert!(!plan.html.contains("alert"));
        assert!(plan.html.contains("Plan"));
    }

    #[test]
    fn test_event_handler_attributes_are_stripped() {
        let plan = render(r#"<p onclick="steal()">Prep Tips</p>"#);
        assert!(!plan.html.contains("onclick"));
        assert!(plan.html.contains("Prep Tips"));
    }

    #[test]
    fn test_javascript_uris_are_stripped() {
        let plan = render(r#"<p><a href="javascript:alert(1)">click</a></p>"#);
        assert!(!plan.html.contains("javascript:"));
        assert!(!plan.html.contains("href"));
        assert!(plan.html.contains("click"));
    }

    #[test]
    fn test_allowed_attributes_survive() {
        let plan = render(r#"<details open><summary>Follow-ups</summary></details>"#);
        assert!(plan.html.contains("open"));
        assert!(plan.html.contains("<summary>"));

        let plan = render(r#"<span title="note">hint</span>"#);
        assert!(plan.html.contains(r#"title="note""#));
    }

    #[test]
    fn test_unknown_attributes_are_dropped() {
        let plan = render(r#"<span data-tracking="id-1" title="ok">hint</span>"#);
        assert!(!plan.html.contains("data-tracking"));
        assert!(plan.html.contains(r#"title="ok""#));
    }

    #[test]
    fn test_images_and_styles_are_stripped() {
        let plan = render(r#"<article><img src="https://evil/px.gif"><style>*{}</style>Plan</article>"#);
        assert!(!plan.html.contains("img"));
        assert!(!plan.html.contains("style"));
        assert!(plan.html.contains("Plan"));
    }
}
