use anyhow::Result;
use once_cell::sync::Lazy;
use regex::{Captures, Regex};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::warn;
use walkdir::{DirEntry, WalkDir};

/// Directories never worth scanning for pages
const SKIP_DIRS: &[&str] = &[".git", "node_modules", "target", "__pycache__"];

/// Class/id fragments marking above-the-fold sections whose images must
/// not be lazy-loaded
const HERO_MARKERS: &[&str] = &[
    "class=\"hero",
    "class='hero",
    "id=\"hero",
    "id='hero",
    "class=\"banner",
    "class=\"nav-logo",
    "class=\"footer-logo",
    "id=\"langToggle",
    "class=\"lang-flag",
    "class=\"lang-option",
];

static IMG_TAG_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"<img\s[^>]*>").unwrap());

// Shape left behind by a bad merge: <img ...> on one line, a stray <
// on the next, the rest of the attributes on a third
static SPLIT_IMG_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)(<img\b[^>]*?)>\s*\n\s*<\s*\n\s*([^>]*?)\s*>").unwrap());

static SCRIPT_SRC_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"(?i)<script\s+([^>]*src=["'][^"']*js/(?:main|consent)\.js["'][^>]*)>"#).unwrap()
});

static TYPE_ATTR_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\btype=").unwrap());

/// Add `loading="lazy"` to every image outside hero sections.
pub fn lazy_images(dir: PathBuf) -> Result<()> {
    println!("🖼  Adding lazy loading under {}\n", dir.display());
    patch_html_files(&dir, "lazy-images", add_lazy_loading)
}

/// Add `type="module"` to script tags loading local page scripts.
pub fn script_modules(dir: PathBuf) -> Result<()> {
    println!("📜 Marking page scripts as modules under {}\n", dir.display());
    patch_html_files(&dir, "script-modules", add_module_type)
}

/// Rejoin img tags that were split across lines.
pub fn img_tags(dir: PathBuf) -> Result<()> {
    println!("🔧 Repairing split img tags under {}\n", dir.display());
    patch_html_files(&dir, "img-tags", join_split_img_tags)
}

/// Walk `dir` for HTML files and rewrite each one through `apply`.
///
/// Unreadable entries are skipped with a warning; only files whose
/// content actually changes are written back.
fn patch_html_files(dir: &Path, label: &str, apply: impl Fn(&str) -> String) -> Result<()> {
    if !dir.is_dir() {
        anyhow::bail!("Not a directory: {}", dir.display());
    }

    let mut scanned = 0usize;
    let mut changed = 0usize;

    for entry in WalkDir::new(dir).into_iter().filter_entry(|e| !is_skipped(e)) {
        let entry = match entry {
            Ok(e) => e,
            Err(e) => {
                warn!(error = %e, "skipping unreadable entry");
                continue;
            }
        };
        if !is_html(&entry) {
            continue;
        }
        scanned += 1;

        let path = entry.path();
        let content = match fs::read_to_string(path) {
            Ok(c) => c,
            Err(e) => {
                warn!(path = %path.display(), error = %e, "skipping unreadable file");
                continue;
            }
        };

        let patched = apply(&content);
        if patched != content {
            fs::write(path, patched)?;
            changed += 1;
            println!("✓ {}", path.display());
        }
    }

    println!("\n✅ {}: {} file(s) scanned, {} updated", label, scanned, changed);
    Ok(())
}

fn is_skipped(entry: &DirEntry) -> bool {
    entry.depth() > 0
        && entry.file_type().is_dir()
        && entry
            .file_name()
            .to_str()
            .is_some_and(|name| SKIP_DIRS.contains(&name) || name.starts_with('.'))
}

fn is_html(entry: &DirEntry) -> bool {
    entry.file_type().is_file()
        && entry.path().extension().is_some_and(|ext| {
            ext.eq_ignore_ascii_case("html") || ext.eq_ignore_ascii_case("htm")
        })
}

fn add_lazy_loading(html: &str) -> String {
    let mut out = String::with_capacity(html.len());
    let mut last = 0;

    for m in IMG_TAG_RE.find_iter(html) {
        out.push_str(&html[last..m.start()]);
        let tag = m.as_str();
        if tag.contains("loading=") || in_hero_section(html, m.start()) {
            out.push_str(tag);
        } else {
            out.push_str(&with_lazy_attr(tag));
        }
        last = m.end();
    }

    out.push_str(&html[last..]);
    out
}

/// True when the nearest enclosing container opened before `img_at`
/// carries a hero marker
fn in_hero_section(html: &str, img_at: usize) -> bool {
    let before = &html[..img_at];
    let last_open = ["<div", "<section", "<header", "<nav"]
        .iter()
        .filter_map(|tag| before.rfind(tag))
        .max();
    let Some(open_at) = last_open else {
        return false;
    };

    let opener = &html[open_at..img_at];
    HERO_MARKERS.iter().any(|marker| opener.contains(marker))
}

fn with_lazy_attr(tag: &str) -> String {
    if let Some(stripped) = tag.strip_suffix("/>") {
        format!("{} loading=\"lazy\"/>", stripped.trim_end())
    } else if let Some(stripped) = tag.strip_suffix('>') {
        format!("{} loading=\"lazy\">", stripped.trim_end())
    } else {
        tag.to_string()
    }
}

fn join_split_img_tags(html: &str) -> String {
    let mut current = html.to_string();
    // One join can expose another split tag, so run to a fixed point
    loop {
        let next = SPLIT_IMG_RE
            .replace_all(&current, |caps: &Captures| {
                format!("{} {}>", &caps[1], &caps[2])
            })
            .into_owned();
        if next == current {
            return next;
        }
        current = next;
    }
}

fn add_module_type(html: &str) -> String {
    SCRIPT_SRC_RE
        .replace_all(html, |caps: &Captures| {
            let inner = &caps[1];
            if TYPE_ATTR_RE.is_match(inner) {
                format!("<script {}>", inner)
            } else {
                format!("<script type=\"module\" {}>", inner)
            }
        })
        .into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lazy_added_to_content_images() {
        let html = r#"<section class="features"><img src="a.jpg" alt="a"></section>"#;
        let fixed = add_lazy_loading(html);
        assert!(fixed.contains(r#"<img src="a.jpg" alt="a" loading="lazy">"#));
    }

    #[test]
    fn test_lazy_skips_hero_images() {
        let html = r#"<header class="hero"><img src="hero.jpg" alt="h"></header>
<section class="features"><img src="a.jpg" alt="a"></section>"#;
        let fixed = add_lazy_loading(html);

        assert!(fixed.contains(r#"<img src="hero.jpg" alt="h">"#));
        assert!(fixed.contains(r#"<img src="a.jpg" alt="a" loading="lazy">"#));
    }

    #[test]
    fn test_lazy_skips_language_toggle_images() {
        let html = r#"<nav><div id="langToggle"><img src="flag-es.png" alt="ES"></div></nav>
<div class="lang-option" data-lang="en"><img src="flag-en.png" alt="EN"></div>
<section class="gallery"><img src="photo.jpg" alt="p"></section>"#;
        let fixed = add_lazy_loading(html);

        assert!(fixed.contains(r#"<img src="flag-es.png" alt="ES">"#));
        assert!(fixed.contains(r#"<img src="flag-en.png" alt="EN">"#));
        assert!(fixed.contains(r#"<img src="photo.jpg" alt="p" loading="lazy">"#));
    }

    #[test]
    fn test_lazy_respects_existing_attribute() {
        let html = r#"<div><img src="a.jpg" loading="eager"></div>"#;
        assert_eq!(add_lazy_loading(html), html);
    }

    #[test]
    fn test_lazy_handles_self_closing_tags() {
        let html = r#"<div><img src="a.jpg" /></div>"#;
        let fixed = add_lazy_loading(html);
        assert!(fixed.contains(r#"<img src="a.jpg" loading="lazy"/>"#));
    }

    #[test]
    fn test_lazy_is_idempotent() {
        let html = r#"<div><img src="a.jpg" alt="a"></div>"#;
        let once = add_lazy_loading(html);
        assert_eq!(add_lazy_loading(&once), once);
    }

    #[test]
    fn test_join_split_img_tags() {
        let html = "<img src=\"a.jpg\">\n<\nalt=\"a\" class=\"photo\" >\n<p>text</p>";
        let fixed = join_split_img_tags(html);

        assert!(fixed.contains(r#"<img src="a.jpg" alt="a" class="photo">"#));
        assert!(fixed.contains("<p>text</p>"));
    }

    #[test]
    fn test_join_runs_to_fixed_point() {
        let html = "<img a=\"1\">\n<\nb=\"2\" >\n<\nc=\"3\" >";
        let fixed = join_split_img_tags(html);
        assert_eq!(fixed, r#"<img a="1" b="2" c="3">"#);
    }

    #[test]
    fn test_join_leaves_clean_markup_alone() {
        let html = "<img src=\"a.jpg\" alt=\"a\">\n<p>fine</p>";
        assert_eq!(join_split_img_tags(html), html);
    }

    #[test]
    fn test_module_type_added() {
        let html = r#"<script src="js/main.js"></script>"#;
        let fixed = add_module_type(html);
        assert_eq!(fixed, r#"<script type="module" src="js/main.js"></script>"#);
    }

    #[test]
    fn test_module_type_added_at_depth() {
        let html = r#"<script defer src="../../js/consent.js"></script>"#;
        let fixed = add_module_type(html);
        assert_eq!(
            fixed,
            r#"<script type="module" defer src="../../js/consent.js"></script>"#
        );
    }

    #[test]
    fn test_module_type_not_duplicated() {
        let html = r#"<script type="module" src="js/main.js"></script>"#;
        assert_eq!(add_module_type(html), html);
    }

    #[test]
    fn test_module_type_ignores_external_scripts() {
        let html = r#"<script src="https://cdn.example.com/lib.js"></script>"#;
        assert_eq!(add_module_type(html), html);
    }
}
