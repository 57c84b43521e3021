use crate::error::{Error, Result};
use crate::types::*;
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

const DEFAULT_LANGUAGE: &str = "es-ES";
const DEFAULT_REGION: &str = "la Costa del Sol";
const DEFAULT_TEMPLATE_FILE: &str = "templates/landing.html";
const DEFAULT_ARTIFACT_DIR: &str = "dist";
const DEFAULT_DATASET_FILE: &str = "data/dataset.json";
const DEFAULT_CITIES_TABLE: &str = "cities";
const DEFAULT_PRODUCTS_TABLE: &str = "products";
const DEFAULT_PAGE_SIZE: u32 = 100;
const DEFAULT_TIMEOUT_SECS: u64 = 10;

/// Raw TOML configuration structure
/// This matches the site.toml file structure exactly
#[derive(Debug, Deserialize)]
struct RawManifest {
    site: RawSite,
    template: RawTemplate,
    dataset: RawDataset,
}

#[derive(Debug, Deserialize)]
struct RawSite {
    brand: String,
    base_url: String,
    language: Option<String>,
    region: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RawTemplate {
    source: TemplateSource,
    file: Option<String>,     // Convert to PathBuf
    artifact_dir: Option<String>, // Convert to PathBuf
}

#[derive(Debug, Deserialize)]
struct RawDataset {
    source: DatasetSourceKind,
    file: Option<String>, // Convert to PathBuf
    remote: Option<RawRemote>,
}

#[derive(Debug, Deserialize)]
struct RawRemote {
    endpoint: String,
    cities_table: Option<String>,
    products_table: Option<String>,
    page_size: Option<u32>,
    timeout_secs: Option<u64>,
}

/// Parse site.toml from a file path
pub fn parse_site_toml<P: AsRef<Path>>(path: P) -> Result<SiteManifest> {
    let content = fs::read_to_string(path)?;
    parse_site_toml_str(&content)
}

/// Parse site.toml from a string (useful for testing)
pub fn parse_site_toml_str(content: &str) -> Result<SiteManifest> {
    let raw: RawManifest = toml::from_str(content)?;

    // Validate brand
    let brand = raw.site.brand.trim().to_string();
    if brand.is_empty() {
        return Err(Error::ConfigParse(
            "site.brand must not be empty".to_string(),
        ));
    }

    // Validate and normalize the canonical origin
    let base_url = normalize_base_url(&raw.site.base_url, "site.base_url")?;

    let site = SiteInfo {
        brand,
        base_url,
        language: raw
            .site
            .language
            .unwrap_or_else(|| DEFAULT_LANGUAGE.to_string()),
        region: raw
            .site
            .region
            .unwrap_or_else(|| DEFAULT_REGION.to_string()),
    };

    // Convert template selection, validating paths
    let template_file = raw
        .template
        .file
        .unwrap_or_else(|| DEFAULT_TEMPLATE_FILE.to_string());
    let artifact_dir = raw
        .template
        .artifact_dir
        .unwrap_or_else(|| DEFAULT_ARTIFACT_DIR.to_string());

    let template = TemplateConfig {
        source: raw.template.source,
        file: validate_path(&template_file, "template.file")?,
        artifact_dir: validate_path(&artifact_dir, "template.artifact_dir")?,
    };

    // Convert dataset selection
    let dataset_file = raw
        .dataset
        .file
        .unwrap_or_else(|| DEFAULT_DATASET_FILE.to_string());

    let remote = match raw.dataset.remote {
        Some(r) => Some(convert_remote(r)?),
        None => None,
    };

    if raw.dataset.source == DatasetSourceKind::Remote && remote.is_none() {
        return Err(Error::ConfigParse(
            "dataset.source = \"remote\" requires a [dataset.remote] section".to_string(),
        ));
    }

    let dataset = DatasetConfig {
        source: raw.dataset.source,
        file: validate_path(&dataset_file, "dataset.file")?,
        remote,
    };

    Ok(SiteManifest {
        site,
        template,
        dataset,
    })
}

fn convert_remote(raw: RawRemote) -> Result<RemoteConfig> {
    let endpoint = normalize_base_url(&raw.endpoint, "dataset.remote.endpoint")?;

    let page_size = raw.page_size.unwrap_or(DEFAULT_PAGE_SIZE);
    if page_size == 0 {
        return Err(Error::ConfigParse(
            "dataset.remote.page_size must be at least 1".to_string(),
        ));
    }

    Ok(RemoteConfig {
        endpoint,
        cities_table: raw
            .cities_table
            .unwrap_or_else(|| DEFAULT_CITIES_TABLE.to_string()),
        products_table: raw
            .products_table
            .unwrap_or_else(|| DEFAULT_PRODUCTS_TABLE.to_string()),
        page_size,
        timeout_secs: raw.timeout_secs.unwrap_or(DEFAULT_TIMEOUT_SECS),
    })
}

/// Require an absolute http(s) URL and strip any trailing slash
fn normalize_base_url(url: &str, field_name: &str) -> Result<String> {
    let url = url.trim();
    if !url.starts_with("http://") && !url.starts_with("https://") {
        return Err(Error::ConfigParse(format!(
            "'{}' must start with http:// or https://, got '{}'",
            field_name, url
        )));
    }
    Ok(url.trim_end_matches('/').to_string())
}

/// Validate and convert a path string to PathBuf.
///
/// This function prevents path traversal vulnerabilities by rejecting:
/// - Absolute paths (starting with `/` or Windows drive letters)
/// - Paths containing parent directory references (`..`)
///
/// # Security
///
/// This is critical for preventing malicious site.toml files from
/// reading or writing outside the site directory.
///
/// # Arguments
///
/// * `path_str` - The path string from user input (site.toml)
/// * `field_name` - Name of the field for error messages
///
/// # Returns
///
/// A validated relative PathBuf, or an error if the path is unsafe
fn validate_path(path_str: &str, field_name: &str) -> Result<PathBuf> {
    let path = Path::new(path_str);

    // Reject absolute paths
    if path.is_absolute() {
        return Err(Error::ConfigParse(format!(
            "Absolute paths not allowed in '{}': '{}'. Use relative paths only.",
            field_name, path_str
        )));
    }

    // Check for parent directory references
    for component in path.components() {
        if component == std::path::Component::ParentDir {
            return Err(Error::ConfigParse(format!(
                "Parent directory references (..) not allowed in '{}': '{}'",
                field_name, path_str
            )));
        }
    }

    // Ensure path is not empty
    if path_str.trim().is_empty() {
        return Err(Error::ConfigParse(format!(
            "Empty path in '{}' field",
            field_name
        )));
    }

    Ok(path.to_path_buf())
}
