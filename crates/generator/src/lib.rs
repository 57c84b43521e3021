//! Page generation for landing-kit.
//!
//! One shared template goes in; one personalized page per (product, city)
//! pair comes out, plus a sitemap over everything that was written. The
//! stages are deliberately small and pure: load a template, transform its
//! content, rewrite its links for nesting depth, write it to disk.

pub mod emit;
pub mod pipeline;
pub mod rewrite;
pub mod sitemap;
pub mod template;
pub mod transform;

pub use pipeline::{PAGE_DEPTH, build_site};
