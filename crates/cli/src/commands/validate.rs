use anyhow::{Context, Result};
use landing_kit_core::{DatasetSourceKind, TemplateSource, parse_site_toml};
use landing_kit_dataset::FileSource;
use std::path::PathBuf;
use walkdir::WalkDir;

/// Validate a site directory without building anything.
///
/// Checks that site.toml parses, that the configured template source is
/// present on disk, and that a file dataset loads cleanly. Remote
/// datasets are only checked for configuration here; the network is not
/// touched until build time.
pub async fn run(path: PathBuf) -> Result<()> {
    println!("Validating site directory: {}\n", path.display());

    let site_toml_path = path.join("site.toml");
    if !site_toml_path.exists() {
        anyhow::bail!(
            "No site.toml found at {}\nHint: Run 'landing-kit init {}' first",
            site_toml_path.display(),
            path.display()
        );
    }

    let manifest = parse_site_toml(&site_toml_path)
        .with_context(|| format!("Failed to parse {}", site_toml_path.display()))?;

    println!("✓ site.toml parsed");
    println!("  Brand:    {}", manifest.site.brand);
    println!("  Base URL: {}", manifest.site.base_url);
    println!("  Language: {}", manifest.site.language);

    match manifest.template.source {
        TemplateSource::Static => {
            let template_path = path.join(&manifest.template.file);
            if !template_path.is_file() {
                anyhow::bail!(
                    "Template not found: {}\nHint: Check [template] file in site.toml",
                    template_path.display()
                );
            }
            println!("✓ Template: {}", manifest.template.file.display());
        }
        TemplateSource::Artifact => {
            let artifact_dir = path.join(&manifest.template.artifact_dir);
            if !artifact_dir.is_dir() {
                anyhow::bail!(
                    "Artifact directory not found: {}\nHint: Check [template] artifact_dir in site.toml",
                    artifact_dir.display()
                );
            }
            let pages = count_html_pages(&artifact_dir);
            println!(
                "✓ Artifacts: {} ({} page(s))",
                manifest.template.artifact_dir.display(),
                pages
            );
            // Products without a source_ref fall back to the static template
            let template_path = path.join(&manifest.template.file);
            if !template_path.is_file() {
                println!(
                    "⚠ Fallback template missing: {}",
                    manifest.template.file.display()
                );
            }
        }
    }

    match manifest.dataset.source {
        DatasetSourceKind::File => {
            let dataset_path = path.join(&manifest.dataset.file);
            let (dataset, skipped) = FileSource::new(dataset_path).load()?;
            println!(
                "✓ Dataset: {} cities × {} products = {} pages",
                dataset.cities.len(),
                dataset.products.len(),
                dataset.page_count()
            );
            if skipped > 0 {
                println!("⚠ {} invalid row(s) would be skipped", skipped);
            }
        }
        DatasetSourceKind::Remote => {
            // Presence of [dataset.remote] is enforced by the parser
            let remote = manifest
                .dataset
                .remote
                .as_ref()
                .context("Remote dataset source without [dataset.remote]")?;
            println!("✓ Remote dataset configured: {}", remote.endpoint);
            println!("  Tables: {} / {}", remote.cities_table, remote.products_table);
            println!("  (fetched at build time)");
        }
    }

    println!("\n✓ Site is ready to build");
    Ok(())
}

fn count_html_pages(dir: &std::path::Path) -> usize {
    WalkDir::new(dir)
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| {
            e.file_type().is_file()
                && e.path()
                    .extension()
                    .is_some_and(|ext| ext.eq_ignore_ascii_case("html"))
        })
        .count()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_count_html_pages() {
        let dir = TempDir::new().unwrap();
        fs::create_dir_all(dir.path().join("sub")).unwrap();
        fs::write(dir.path().join("index.html"), "<html></html>").unwrap();
        fs::write(dir.path().join("sub/page.HTML"), "<html></html>").unwrap();
        fs::write(dir.path().join("style.css"), "body {}").unwrap();

        assert_eq!(count_html_pages(dir.path()), 2);
    }

    #[test]
    fn test_count_html_pages_empty_dir() {
        let dir = TempDir::new().unwrap();
        assert_eq!(count_html_pages(dir.path()), 0);
    }
}
