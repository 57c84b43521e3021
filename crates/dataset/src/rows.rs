use landing_kit_core::{City, Dataset, Product};
use serde::Deserialize;
use std::collections::{BTreeMap, HashSet};
use tracing::warn;

/// A city row as fetched, before validation
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawCityRow {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub slug: String,
}

/// A product row as fetched, before validation.
///
/// Older datasets use `id` where newer ones use `slug`; both are accepted,
/// with `slug` winning when a row carries both.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawProductRow {
    #[serde(default)]
    pub slug: Option<String>,
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub descriptions: BTreeMap<String, String>,
    #[serde(default)]
    pub source_ref: Option<String>,
}

impl RawProductRow {
    fn slug(&self) -> &str {
        self.slug
            .as_deref()
            .or(self.id.as_deref())
            .unwrap_or("")
            .trim()
    }
}

/// Filter fetched rows down to a valid dataset.
///
/// Rows missing a name or slug, and rows whose slug repeats an earlier
/// row in the same table, are dropped with a warning. Returns the dataset
/// plus the number of rows dropped; the first occurrence of a duplicated
/// slug always wins so row order decides ties.
pub fn validate_rows(
    cities: Vec<RawCityRow>,
    products: Vec<RawProductRow>,
) -> (Dataset, usize) {
    let mut skipped = 0;

    let mut seen = HashSet::new();
    let mut valid_cities = Vec::with_capacity(cities.len());
    for row in cities {
        let name = row.name.trim();
        let slug = row.slug.trim();
        if name.is_empty() || slug.is_empty() {
            warn!(table = "cities", name, slug, "skipping row with missing name or slug");
            skipped += 1;
            continue;
        }
        if !seen.insert(slug.to_string()) {
            warn!(table = "cities", slug, "skipping row with duplicate slug");
            skipped += 1;
            continue;
        }
        valid_cities.push(City {
            name: name.to_string(),
            slug: slug.to_string(),
        });
    }

    let mut seen = HashSet::new();
    let mut valid_products = Vec::with_capacity(products.len());
    for row in products {
        let name = row.name.trim().to_string();
        let slug = row.slug().to_string();
        if name.is_empty() || slug.is_empty() {
            warn!(table = "products", name, slug, "skipping row with missing name or slug");
            skipped += 1;
            continue;
        }
        if !seen.insert(slug.clone()) {
            warn!(table = "products", slug, "skipping row with duplicate slug");
            skipped += 1;
            continue;
        }
        valid_products.push(Product {
            slug,
            name,
            description: row.description.trim().to_string(),
            descriptions: row.descriptions,
            source_ref: row.source_ref,
        });
    }

    (
        Dataset {
            cities: valid_cities,
            products: valid_products,
        },
        skipped,
    )
}
