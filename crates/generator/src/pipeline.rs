use crate::{emit, rewrite, sitemap, template, transform};
use chrono::Local;
use landing_kit_core::{
    BuildSummary, Dataset, Error, FailedPage, PageTask, Result, SiteManifest,
};
use std::fs;
use std::path::Path;
use tracing::{info, warn};

/// Generated pages sit two directories below the output root,
/// `<product-slug>/<city-slug>/index.html`
pub const PAGE_DEPTH: usize = 2;

/// Run the full generation pipeline over an already-loaded dataset.
///
/// A missing template aborts the run. A failed page write fails only its
/// own task; the run continues and the failure lands in the summary. The
/// sitemap covers the site root plus every page actually written, in
/// product-major then city-minor order.
pub fn build_site(
    site_dir: &Path,
    out_root: &Path,
    manifest: &SiteManifest,
    dataset: &Dataset,
) -> Result<BuildSummary> {
    fs::create_dir_all(out_root).map_err(|e| Error::PageWrite {
        path: out_root.to_path_buf(),
        source: e,
    })?;

    let today = Local::now().date_naive();
    let mut summary = BuildSummary::default();
    let mut entries = vec![sitemap::root_entry(&manifest.site.base_url, today)];

    for product in &dataset.products {
        let template_path = template::template_path(site_dir, manifest, product);
        let template = template::load_template(&template_path)?;

        for city in &dataset.cities {
            let task = PageTask { product, city };
            let html = transform::render(&template, product, city, manifest);
            let html = rewrite::rewrite_links(&html, PAGE_DEPTH);

            match emit::emit_page(out_root, &task.rel_path(), &html) {
                Ok(_) => {
                    summary.pages_written += 1;
                    entries.push(sitemap::page_entry(
                        &manifest.site.base_url,
                        product,
                        city,
                        today,
                    ));
                }
                Err(e) => {
                    warn!(
                        page = %task.rel_path().display(),
                        error = %e,
                        "page write failed, continuing"
                    );
                    summary.failed.push(FailedPage {
                        rel_path: task.rel_path(),
                        reason: e.to_string(),
                    });
                }
            }
        }
    }

    let sitemap_xml = sitemap::build_sitemap(&entries);
    let sitemap_path = out_root.join("sitemap.xml");
    fs::write(&sitemap_path, sitemap_xml).map_err(|e| Error::PageWrite {
        path: sitemap_path,
        source: e,
    })?;

    info!(
        pages = summary.pages_written,
        failed = summary.failed.len(),
        "build finished"
    );
    Ok(summary)
}
