use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// Complete site manifest
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SiteManifest {
    pub site: SiteInfo,
    pub template: TemplateConfig,
    pub dataset: DatasetConfig,
}

/// Brand identity and canonical URL settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SiteInfo {
    pub brand: String,
    /// Canonical origin, no trailing slash (e.g. "https://example.com")
    pub base_url: String,
    pub language: String,
    /// Service area named in marketing copy (e.g. "la Costa del Sol")
    pub region: String,
}

/// Where page templates come from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TemplateSource {
    /// A single template file shared by every product
    Static,
    /// Pages from a previously built artifact tree, one per product
    Artifact,
}

/// Template selection
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TemplateConfig {
    pub source: TemplateSource,
    pub file: PathBuf,
    pub artifact_dir: PathBuf,
}

/// Where the cities and products tables come from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DatasetSourceKind {
    File,
    Remote,
}

/// Dataset selection
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatasetConfig {
    pub source: DatasetSourceKind,
    pub file: PathBuf,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub remote: Option<RemoteConfig>,
}

/// Remote dataset endpoint settings
///
/// The API key is never part of the manifest; it comes from the
/// environment at build time.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RemoteConfig {
    pub endpoint: String,
    pub cities_table: String,
    pub products_table: String,
    pub page_size: u32,
    pub timeout_secs: u64,
}

/// A target city for landing-page generation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct City {
    pub name: String,
    pub slug: String,
}

impl City {
    /// Build a city with a slug derived from its display name
    pub fn new(name: impl Into<String>) -> Self {
        let name = name.into();
        let slug = slugify(&name);
        Self { name, slug }
    }
}

/// A product line with its marketing copy
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Product {
    pub slug: String,
    pub name: String,
    /// Default description; may embed `{{CITY}}` and `{{PRODUCT}}` tokens
    pub description: String,
    /// Per-language description overrides keyed by language code
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub descriptions: BTreeMap<String, String>,
    /// Page file this product's template comes from in artifact mode
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source_ref: Option<String>,
}

impl Product {
    /// Description for `lang`, falling back to the default copy
    pub fn localized_description(&self, lang: &str) -> &str {
        self.descriptions
            .get(lang)
            .map(String::as_str)
            .unwrap_or(&self.description)
    }
}

/// The two relational tables driving a build, immutable for the run
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Dataset {
    pub cities: Vec<City>,
    pub products: Vec<Product>,
}

impl Dataset {
    /// Number of pages a build over this dataset will attempt
    pub fn page_count(&self) -> usize {
        self.cities.len() * self.products.len()
    }
}

/// One (product, city) pair rendering into exactly one output page
#[derive(Debug, Clone, Copy)]
pub struct PageTask<'a> {
    pub product: &'a Product,
    pub city: &'a City,
}

impl PageTask<'_> {
    /// Output path of this task's page, relative to the output root
    pub fn rel_path(&self) -> PathBuf {
        Path::new(&self.product.slug)
            .join(&self.city.slug)
            .join("index.html")
    }

    /// Canonical URL path below the site root, with trailing slash
    pub fn url_path(&self) -> String {
        format!("{}/{}/", self.product.slug, self.city.slug)
    }
}

/// One `<url>` entry in the generated sitemap
#[derive(Debug, Clone, PartialEq)]
pub struct SitemapEntry {
    pub location: String,
    pub last_modified: NaiveDate,
    pub priority: f32,
}

/// A page whose write failed; the run continues without it
#[derive(Debug)]
pub struct FailedPage {
    pub rel_path: PathBuf,
    pub reason: String,
}

/// End-of-run accounting for a build
#[derive(Debug, Default)]
pub struct BuildSummary {
    pub pages_written: usize,
    pub rows_skipped: usize,
    pub failed: Vec<FailedPage>,
}

impl BuildSummary {
    /// True when every attempted page landed on disk
    pub fn is_clean(&self) -> bool {
        self.failed.is_empty()
    }
}

/// Fold a Latin accented character to its ASCII base letter
fn fold_accent(c: char) -> char {
    match c {
        'á' | 'à' | 'ä' | 'â' | 'ã' | 'å' => 'a',
        'é' | 'è' | 'ë' | 'ê' => 'e',
        'í' | 'ì' | 'ï' | 'î' => 'i',
        'ó' | 'ò' | 'ö' | 'ô' | 'õ' => 'o',
        'ú' | 'ù' | 'ü' | 'û' => 'u',
        'ñ' => 'n',
        'ç' => 'c',
        _ => c,
    }
}

/// Derive a URL-safe slug: lowercase, accents folded, spaces to hyphens.
///
/// "Pérgolas Bioclimáticas" becomes "pergolas-bioclimaticas" and
/// "Benalmádena" becomes "benalmadena". Characters with no ASCII mapping
/// are dropped rather than guessed at.
pub fn slugify(text: &str) -> String {
    text.to_lowercase()
        .chars()
        .map(fold_accent)
        .map(|c| if c.is_whitespace() { '-' } else { c })
        .filter(|c| c.is_ascii_alphanumeric() || *c == '-')
        .collect::<String>()
        .split('-')
        .filter(|s| !s.is_empty())
        .collect::<Vec<_>>()
        .join("-")
}
