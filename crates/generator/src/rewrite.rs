use once_cell::sync::Lazy;
use regex::{Captures, Regex};

/// Root-relative asset references: `Assets/`, `css/` or `js/` directly
/// after the opening quote, with an optional `./`. Anything already
/// starting with `../` falls outside the pattern, which is what makes
/// the rewrite idempotent.
static ASSET_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"(href|src)="(?:\./)?((?:Assets|css|js)/)"#).unwrap());

/// Bare root-level page links like `href="contact.html"`. Links with a
/// scheme, a path separator, an anchor or an existing `../` prefix do not
/// match.
static ROOT_PAGE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"href="([A-Za-z0-9-]+\.html)""#).unwrap());

/// Prefix root-relative references with one `../` per level of nesting
/// so the document resolves its assets from `depth` directories down.
///
/// Applying this to already-rewritten output leaves it unchanged.
pub fn rewrite_links(html: &str, depth: usize) -> String {
    if depth == 0 {
        return html.to_string();
    }
    let prefix = "../".repeat(depth);

    let html = ASSET_RE.replace_all(html, |caps: &Captures| {
        format!(r#"{}="{}{}"#, &caps[1], prefix, &caps[2])
    });
    let html = ROOT_PAGE_RE.replace_all(&html, |caps: &Captures| {
        format!(r#"href="{}{}""#, prefix, &caps[1])
    });
    html.into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_assets_prefixed_at_depth_two() {
        let html = r#"<img src="Assets/foo.jpg"><link href="css/style.css">"#;
        let out = rewrite_links(html, 2);
        assert_eq!(
            out,
            r#"<img src="../../Assets/foo.jpg"><link href="../../css/style.css">"#
        );
    }

    #[test]
    fn test_script_src_prefixed() {
        let html = r#"<script type="module" src="js/main.js"></script>"#;
        assert_eq!(
            rewrite_links(html, 2),
            r#"<script type="module" src="../../js/main.js"></script>"#
        );
    }

    #[test]
    fn test_dot_slash_normalized() {
        let html = r#"<img src="./Assets/foo.jpg">"#;
        assert_eq!(rewrite_links(html, 1), r#"<img src="../Assets/foo.jpg">"#);
    }

    #[test]
    fn test_bare_page_links_prefixed() {
        let html = r#"<a href="contact.html">Contacto</a>"#;
        assert_eq!(
            rewrite_links(html, 2),
            r#"<a href="../../contact.html">Contacto</a>"#
        );
    }

    #[test]
    fn test_rewrite_is_idempotent() {
        let html = r#"<img src="Assets/a.jpg"><a href="contact.html">x</a><link href="css/s.css">"#;
        let once = rewrite_links(html, 2);
        let twice = rewrite_links(&once, 2);
        assert_eq!(once, twice);
    }

    #[test]
    fn test_absolute_urls_untouched() {
        let html = r#"<a href="https://example.com/page.html">x</a><img src="https://cdn.example.com/Assets/a.jpg">"#;
        assert_eq!(rewrite_links(html, 2), html);
    }

    #[test]
    fn test_anchors_and_mailto_untouched() {
        let html = r##"<a href="#presupuesto">x</a><a href="mailto:info@example.com">y</a>"##;
        assert_eq!(rewrite_links(html, 2), html);
    }

    #[test]
    fn test_nested_page_links_untouched() {
        // Only bare root-level links are rewritten
        let html = r#"<a href="pages/about.html">x</a>"#;
        assert_eq!(rewrite_links(html, 2), html);
    }

    #[test]
    fn test_depth_zero_is_noop() {
        let html = r#"<img src="Assets/a.jpg">"#;
        assert_eq!(rewrite_links(html, 0), html);
    }

    #[test]
    fn test_depth_one_single_prefix() {
        let html = r#"<img src="Assets/a.jpg">"#;
        assert_eq!(rewrite_links(html, 1), r#"<img src="../Assets/a.jpg">"#);
    }
}
