use anyhow::{Context, Result};
use landing_kit_core::{Dataset, DatasetSourceKind, SiteManifest, parse_site_toml};
use landing_kit_dataset::{FileSource, RemoteSource};
use landing_kit_generator::build_site;
use std::path::{Path, PathBuf};

/// Environment variable holding the API key for remote datasets.
/// The key never appears in site.toml.
const API_KEY_ENV: &str = "LANDING_KIT_API_KEY";

/// Build every landing page plus the sitemap into the output directory.
///
/// Loads site.toml, pulls the dataset from the configured source, and
/// renders one page per (product, city) pair. Rows the dataset source
/// skipped are reported but do not fail the build; pages that cannot be
/// written do, after every other page has been attempted.
pub async fn run(path: PathBuf, output: PathBuf) -> Result<()> {
    println!("🔨 Building site: {}", path.display());
    println!("   Output: {}\n", output.display());

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
    println!("✓ Loaded site: {}", manifest.site.brand);

    let (dataset, skipped) = load_dataset(&path, &manifest).await?;
    println!(
        "✓ Dataset: {} cities × {} products",
        dataset.cities.len(),
        dataset.products.len()
    );
    if skipped > 0 {
        println!("⚠ Skipped {} invalid row(s)", skipped);
    }

    println!("\n📄 Generating {} page(s)...", dataset.page_count());
    let mut summary = build_site(&path, &output, &manifest, &dataset)?;
    summary.rows_skipped = skipped;

    println!("✓ {} page(s) written", summary.pages_written);
    println!("✓ sitemap.xml written");

    if !summary.is_clean() {
        println!();
        for failure in &summary.failed {
            println!("✗ {}: {}", failure.rel_path.display(), failure.reason);
        }
        anyhow::bail!(
            "{} of {} page(s) failed to write",
            summary.failed.len(),
            dataset.page_count()
        );
    }

    println!("\n✅ Build complete: {}", output.display());
    println!("   Preview it: landing-kit preview {}", output.display());
    Ok(())
}

async fn load_dataset(site_dir: &Path, manifest: &SiteManifest) -> Result<(Dataset, usize)> {
    match manifest.dataset.source {
        DatasetSourceKind::File => {
            let dataset_path = site_dir.join(&manifest.dataset.file);
            println!("📂 Reading dataset: {}", dataset_path.display());
            Ok(FileSource::new(dataset_path).load()?)
        }
        DatasetSourceKind::Remote => {
            let remote = manifest
                .dataset
                .remote
                .as_ref()
                .context("Remote dataset source without [dataset.remote]")?;
            println!("🌐 Fetching dataset: {}", remote.endpoint);
            let api_key = std::env::var(API_KEY_ENV).with_context(|| {
                format!(
                    "Remote dataset needs an API key. Set the {} environment variable",
                    API_KEY_ENV
                )
            })?;
            let source = RemoteSource::new(remote, &api_key)?;
            Ok(source.fetch_dataset().await?)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use landing_kit_core::{DatasetConfig, SiteInfo, TemplateConfig, TemplateSource};
    use std::fs;
    use tempfile::TempDir;

    fn file_manifest() -> SiteManifest {
        SiteManifest {
            site: SiteInfo {
                brand: "CostaGlass".to_string(),
                base_url: "https://costaglass.es".to_string(),
                language: "es-ES".to_string(),
                region: "la Costa del Sol".to_string(),
            },
            template: TemplateConfig {
                source: TemplateSource::Static,
                file: PathBuf::from("templates/landing.html"),
                artifact_dir: PathBuf::from("dist"),
            },
            dataset: DatasetConfig {
                source: DatasetSourceKind::File,
                file: PathBuf::from("data/dataset.json"),
                remote: None,
            },
        }
    }

    #[tokio::test]
    async fn test_load_dataset_from_file() {
        let dir = TempDir::new().unwrap();
        fs::create_dir_all(dir.path().join("data")).unwrap();
        fs::write(
            dir.path().join("data/dataset.json"),
            r#"{
                "cities": [{"name": "Marbella", "slug": "marbella"}],
                "products": [{"slug": "toldos", "name": "Toldos", "description": "Toldos en {{CITY}}"}]
            }"#,
        )
        .unwrap();

        let (dataset, skipped) = load_dataset(dir.path(), &file_manifest()).await.unwrap();
        assert_eq!(skipped, 0);
        assert_eq!(dataset.cities.len(), 1);
        assert_eq!(dataset.products.len(), 1);
    }

    #[tokio::test]
    async fn test_load_dataset_skips_city_without_slug() {
        let dir = TempDir::new().unwrap();
        fs::create_dir_all(dir.path().join("data")).unwrap();
        fs::write(
            dir.path().join("data/dataset.json"),
            r#"{
                "cities": [{"name": "Marbella"}],
                "products": [{"slug": "toldos", "name": "Toldos", "description": "Toldos en {{CITY}}"}]
            }"#,
        )
        .unwrap();

        let (dataset, skipped) = load_dataset(dir.path(), &file_manifest()).await.unwrap();
        assert_eq!(skipped, 1);
        assert!(dataset.cities.is_empty());
        assert_eq!(dataset.products.len(), 1);
    }

    #[tokio::test]
    async fn test_load_dataset_missing_file_fails() {
        let dir = TempDir::new().unwrap();
        let result = load_dataset(dir.path(), &file_manifest()).await;
        assert!(result.is_err());
    }
}
