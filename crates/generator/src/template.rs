use landing_kit_core::{Error, Product, Result, SiteManifest, TemplateSource};
use std::fs;
use std::path::{Path, PathBuf};

/// Resolve where `product`'s template lives under `site_dir`.
///
/// In artifact mode a product may name its own page via `source_ref`;
/// products without one fall back to the shared template file, same as
/// static mode.
pub fn template_path(site_dir: &Path, manifest: &SiteManifest, product: &Product) -> PathBuf {
    if manifest.template.source == TemplateSource::Artifact
        && let Some(source_ref) = &product.source_ref
    {
        return site_dir.join(&manifest.template.artifact_dir).join(source_ref);
    }
    site_dir.join(&manifest.template.file)
}

/// Read a template into memory.
///
/// A missing template aborts the whole run; without it there is nothing
/// meaningful to emit. The content is treated as an opaque string, and
/// whether the transformation anchors are present is not checked here.
pub fn load_template(path: &Path) -> Result<String> {
    if !path.is_file() {
        return Err(Error::TemplateNotFound(path.to_path_buf()));
    }
    Ok(fs::read_to_string(path)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use landing_kit_core::{
        DatasetConfig, DatasetSourceKind, SiteInfo, TemplateConfig,
    };
    use std::collections::BTreeMap;
    use tempfile::TempDir;

    fn manifest(source: TemplateSource) -> SiteManifest {
        SiteManifest {
            site: SiteInfo {
                brand: "CostaGlass".to_string(),
                base_url: "https://costaglass.es".to_string(),
                language: "es-ES".to_string(),
                region: "la Costa del Sol".to_string(),
            },
            template: TemplateConfig {
                source,
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

    fn product(source_ref: Option<&str>) -> Product {
        Product {
            slug: "pergolas".to_string(),
            name: "Pérgolas".to_string(),
            description: String::new(),
            descriptions: BTreeMap::new(),
            source_ref: source_ref.map(String::from),
        }
    }

    #[test]
    fn test_static_mode_uses_template_file() {
        let path = template_path(
            Path::new("site"),
            &manifest(TemplateSource::Static),
            &product(Some("pergolas.html")),
        );
        assert_eq!(path, Path::new("site/templates/landing.html"));
    }

    #[test]
    fn test_artifact_mode_uses_source_ref() {
        let path = template_path(
            Path::new("site"),
            &manifest(TemplateSource::Artifact),
            &product(Some("pergolas.html")),
        );
        assert_eq!(path, Path::new("site/dist/pergolas.html"));
    }

    #[test]
    fn test_artifact_mode_without_source_ref_falls_back() {
        let path = template_path(
            Path::new("site"),
            &manifest(TemplateSource::Artifact),
            &product(None),
        );
        assert_eq!(path, Path::new("site/templates/landing.html"));
    }

    #[test]
    fn test_load_template_reads_content() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("landing.html");
        fs::write(&path, "<html></html>").unwrap();
        assert_eq!(load_template(&path).unwrap(), "<html></html>");
    }

    #[test]
    fn test_load_template_missing_is_fatal() {
        let dir = TempDir::new().unwrap();
        let result = load_template(&dir.path().join("missing.html"));
        assert!(result.is_err());
        assert!(
            result
                .unwrap_err()
                .to_string()
                .contains("Template not found")
        );
    }
}
