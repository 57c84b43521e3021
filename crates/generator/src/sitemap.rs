use chrono::NaiveDate;
use landing_kit_core::{City, Product, SitemapEntry};

const ROOT_PRIORITY: f32 = 1.0;
const PAGE_PRIORITY: f32 = 0.8;

/// Entry for the site root
pub fn root_entry(base_url: &str, date: NaiveDate) -> SitemapEntry {
    SitemapEntry {
        location: format!("{}/", base_url),
        last_modified: date,
        priority: ROOT_PRIORITY,
    }
}

/// Entry for one emitted page
pub fn page_entry(base_url: &str, product: &Product, city: &City, date: NaiveDate) -> SitemapEntry {
    SitemapEntry {
        location: format!("{}/{}/{}/", base_url, product.slug, city.slug),
        last_modified: date,
        priority: PAGE_PRIORITY,
    }
}

/// Serialize entries into a sitemap document.
///
/// Entries are written in the order given, which the pipeline keeps
/// product-major then city-minor, so unchanged data diffs cleanly
/// between runs.
pub fn build_sitemap(entries: &[SitemapEntry]) -> String {
    let mut xml = String::from(
        "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n<urlset xmlns=\"http://www.sitemaps.org/schemas/sitemap/0.9\">\n",
    );
    for entry in entries {
        xml.push_str(&format!(
            "  <url>\n    <loc>{}</loc>\n    <lastmod>{}</lastmod>\n    <priority>{:.1}</priority>\n  </url>\n",
            xml_escape(&entry.location),
            entry.last_modified.format("%Y-%m-%d"),
            entry.priority
        ));
    }
    xml.push_str("</urlset>\n");
    xml
}

/// Escape the five XML-reserved characters
fn xml_escape(s: &str) -> String {
    s.chars()
        .map(|c| match c {
            '&' => "&amp;".to_string(),
            '<' => "&lt;".to_string(),
            '>' => "&gt;".to_string(),
            '"' => "&quot;".to_string(),
            '\'' => "&apos;".to_string(),
            _ => c.to_string(),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    fn date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 6, 1).unwrap()
    }

    fn product(slug: &str) -> Product {
        Product {
            slug: slug.to_string(),
            name: slug.to_string(),
            description: String::new(),
            descriptions: BTreeMap::new(),
            source_ref: None,
        }
    }

    #[test]
    fn test_root_entry_priority_one() {
        let entry = root_entry("https://costaglass.es", date());
        assert_eq!(entry.location, "https://costaglass.es/");
        assert_eq!(entry.priority, 1.0);
    }

    #[test]
    fn test_page_entry_url_shape() {
        let entry = page_entry(
            "https://costaglass.es",
            &product("pergolas-bioclimaticas"),
            &City::new("Marbella"),
            date(),
        );
        assert_eq!(
            entry.location,
            "https://costaglass.es/pergolas-bioclimaticas/marbella/"
        );
        assert_eq!(entry.priority, 0.8);
    }

    #[test]
    fn test_sitemap_well_formed() {
        let entries = vec![
            root_entry("https://costaglass.es", date()),
            page_entry(
                "https://costaglass.es",
                &product("pergolas"),
                &City::new("Marbella"),
                date(),
            ),
        ];
        let xml = build_sitemap(&entries);

        assert!(xml.starts_with("<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n<urlset"));
        assert!(xml.ends_with("</urlset>\n"));
        assert_eq!(xml.matches("<url>").count(), 2);
        assert!(xml.contains("<loc>https://costaglass.es/</loc>"));
        assert!(xml.contains("<loc>https://costaglass.es/pergolas/marbella/</loc>"));
        assert!(xml.contains("<lastmod>2025-06-01</lastmod>"));
        assert!(xml.contains("<priority>1.0</priority>"));
        assert!(xml.contains("<priority>0.8</priority>"));
    }

    #[test]
    fn test_sitemap_preserves_entry_order() {
        let entries = vec![
            root_entry("https://costaglass.es", date()),
            page_entry("https://costaglass.es", &product("b"), &City::new("Zafra"), date()),
            page_entry("https://costaglass.es", &product("a"), &City::new("Adra"), date()),
        ];
        let xml = build_sitemap(&entries);
        let b = xml.find("/b/zafra/").unwrap();
        let a = xml.find("/a/adra/").unwrap();
        assert!(b < a);
    }

    #[test]
    fn test_loc_values_escaped() {
        let entries = vec![SitemapEntry {
            location: "https://example.com/?a=1&b=2".to_string(),
            last_modified: date(),
            priority: 0.8,
        }];
        let xml = build_sitemap(&entries);
        assert!(xml.contains("<loc>https://example.com/?a=1&amp;b=2</loc>"));
        assert!(!xml.contains("a=1&b"));
    }

    #[test]
    fn test_xml_escape_all_five() {
        assert_eq!(xml_escape(r#"&<>"'"#), "&amp;&lt;&gt;&quot;&apos;");
        assert_eq!(xml_escape("plain/path"), "plain/path");
    }
}
