use anyhow::{Context, Result};
use landing_kit_core::config::parse_site_toml_str;
use landing_kit_core::{City, Product, slugify};
use serde_json::json;
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

const SAMPLE_CITIES: &[&str] = &["Marbella", "Estepona", "Benalmádena", "Fuengirola", "Mijas"];

const SAMPLE_PRODUCTS: &[(&str, &str)] = &[
    (
        "Cortinas de Cristal",
        "Cortinas de cristal a medida en {{CITY}}. Cerramientos sin perfiles verticales para terrazas y negocios.",
    ),
    (
        "Pérgolas Bioclimáticas",
        "Pérgolas bioclimáticas de lamas orientables en {{CITY}}. Disfrute de su terraza todo el año.",
    ),
    (
        "Techos Móviles",
        "Techos móviles de policarbonato y cristal en {{CITY}}. Apertura total con un solo gesto.",
    ),
];

const STARTER_TEMPLATE: &str = r#"<!DOCTYPE html>
<html lang="es-ES">
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <title>Cerramientos y pérgolas a medida</title>
    <meta name="description" content="Fabricación e instalación de cerramientos a medida.">
    <link rel="stylesheet" href="css/style.css">
</head>
<body>
    <header class="hero hero-section">
        <img src="Assets/hero.jpg" alt="Instalación a medida" class="hero-image">
        <h1>Cerramientos a medida <span class="hero-accent">para tu terraza</span></h1>
        <p class="hero-subtitle">Fabricación propia, medición e instalación con garantía.</p>
    </header>
    <main>
        <section class="features">
            <div class="container">
                <h2>Fabricación propia</h2>
                <p>Medimos, fabricamos e instalamos sin intermediarios.</p>
            </div>
        </section>
        <!-- CTA -->
        <section class="cta">
            <div class="container">
                <a class="btn btn-primary" href="contact.html">Pide tu presupuesto</a>
            </div>
        </section>
    </main>
    <!-- Footer -->
    <footer>
        <div class="container">
            <p>Fabricantes e instaladores locales.</p>
        </div>
    </footer>
    <script type="module" src="js/main.js"></script>
</body>
</html>
"#;

const STARTER_CSS: &str = r#"* { margin: 0; padding: 0; box-sizing: border-box; }

body {
    font-family: -apple-system, BlinkMacSystemFont, "Segoe UI", Roboto, sans-serif;
    line-height: 1.6;
    color: #333;
}

.container { max-width: 1100px; margin: 0 auto; padding: 0 1rem; }

.hero { padding: 4rem 0; text-align: center; }
.hero-accent { color: #0a7cbf; }
.hero-subtitle { color: #666; margin-top: 0.5rem; }

.local-seo, .local-faq { padding: 3rem 0; }
.local-benefits { list-style: none; margin: 1rem 0; }
.faq-item { margin-bottom: 1.5rem; }

.btn-primary {
    display: inline-block;
    background: #0a7cbf;
    color: white;
    padding: 0.75rem 1.5rem;
    border-radius: 4px;
    text-decoration: none;
}
"#;

const STARTER_JS: &str = r#"// Page interactions; loaded as a module from every generated page.
document.addEventListener('DOMContentLoaded', () => {
    document.body.classList.add('js');
});
"#;

/// Escape a string for safe inclusion in TOML per TOML v1.0.0 spec
///
/// Handles the required escape sequences for TOML basic strings. This
/// manual implementation is used instead of toml crate serialization
/// because we're generating a template with comments and specific
/// formatting, not a complete TOML document.
///
/// See: https://toml.io/en/v1.0.0#string
fn toml_escape_string(s: &str) -> String {
    s.replace('\\', "\\\\")
        .replace('"', "\\\"")
        .replace('\x08', "\\b")
        .replace('\x0C', "\\f")
        .replace('\n', "\\n")
        .replace('\r', "\\r")
        .replace('\t', "\\t")
}

/// Initialize a new site directory with a working starter setup.
///
/// Creates the directory structure (templates/, data/, css/, js/,
/// Assets/), a site.toml with commented defaults, a starter landing
/// template carrying every anchor the generator recognizes, and a sample
/// dataset that builds out of the box.
///
/// # Arguments
///
/// * `path` - Path to the directory to initialize (must exist)
/// * `brand` - Brand name to bake into site.toml, TODO comment if absent
/// * `base_url` - Canonical origin to bake into site.toml
///
/// # Errors
///
/// Returns an error if the directory doesn't exist, if site.toml is
/// already present, or if file operations fail.
pub async fn run(path: PathBuf, brand: Option<String>, base_url: Option<String>) -> Result<()> {
    println!("Initializing site directory: {}", path.display());

    if !path.exists() {
        anyhow::bail!(
            "Directory '{}' does not exist. Create it first: mkdir {}",
            path.display(),
            path.display()
        );
    }

    let site_toml_path = path.join("site.toml");
    if site_toml_path.exists() {
        anyhow::bail!(
            "site.toml already exists at {}\nHint: Delete it first or use a different directory",
            site_toml_path.display()
        );
    }

    create_directory_structure(&path)?;
    generate_site_toml(&path, brand.as_deref(), base_url.as_deref())?;
    generate_starter_template(&path)?;
    generate_sample_dataset(&path)?;

    println!("\n✓ Initialization complete!");
    println!("\nGenerated structure:");
    println!("  {}/", path.display());
    println!("  ├── site.toml            ← Edit brand and base URL");
    println!("  ├── templates/");
    println!("  │   └── landing.html     ← Shared page template");
    println!("  ├── data/");
    println!("  │   └── dataset.json     ← Cities and products");
    println!("  ├── css/");
    println!("  │   └── style.css");
    println!("  ├── js/");
    println!("  │   └── main.js");
    println!("  └── Assets/");

    println!("\nNext steps:");
    println!("  1. Edit site.toml (set brand and base_url)");
    println!("  2. Adjust data/dataset.json (your cities and products)");
    println!("  3. Build: landing-kit build {} --output dist-pages", path.display());
    println!("  4. Preview: landing-kit preview dist-pages");

    Ok(())
}

fn create_directory_structure(base: &Path) -> Result<()> {
    fs::create_dir_all(base.join("templates"))?;
    fs::create_dir_all(base.join("data"))?;
    fs::create_dir_all(base.join("css"))?;
    fs::create_dir_all(base.join("js"))?;
    fs::create_dir_all(base.join("Assets"))?;
    Ok(())
}

fn generate_site_toml(base: &Path, brand: Option<&str>, base_url: Option<&str>) -> Result<()> {
    let brand_value = toml_escape_string(brand.unwrap_or("Mi Empresa"));
    let base_url_value = toml_escape_string(base_url.unwrap_or("https://example.com"));

    let brand_comment = if brand.is_some() {
        ""
    } else {
        "  # TODO: Set brand name"
    };
    let base_url_comment = if base_url.is_some() {
        ""
    } else {
        "  # TODO: Set canonical origin"
    };

    let toml = format!(
        "# Generated by landing-kit init\n\
# Edit this file to customize your site\n\
\n\
[site]\n\
brand = \"{brand_value}\"{brand_comment}\n\
base_url = \"{base_url_value}\"{base_url_comment}\n\
language = \"es-ES\"\n\
region = \"la Costa del Sol\"  # Named in marketing copy and FAQ answers\n\
\n\
[template]\n\
# \"static\" renders every product from template.file;\n\
# \"artifact\" prefers a product's source_ref page under artifact_dir\n\
source = \"static\"\n\
file = \"templates/landing.html\"\n\
artifact_dir = \"dist\"\n\
\n\
[dataset]\n\
# \"file\" reads dataset.file; \"remote\" fetches the tables below\n\
source = \"file\"\n\
file = \"data/dataset.json\"\n\
\n\
# Uncomment for a hosted dataset. The API key is read from the\n\
# LANDING_KIT_API_KEY environment variable, never from this file.\n\
# [dataset.remote]\n\
# endpoint = \"https://your-project.example.com/rest/v1\"\n\
# cities_table = \"cities\"\n\
# products_table = \"products\"\n\
# page_size = 100\n\
# timeout_secs = 10\n"
    );

    // Validate the generated TOML can be parsed
    parse_site_toml_str(&toml)
        .context("Generated TOML is invalid - this is a bug in the template generator")?;

    fs::write(base.join("site.toml"), toml)?;

    Ok(())
}

fn generate_starter_template(base: &Path) -> Result<()> {
    fs::write(base.join("templates/landing.html"), STARTER_TEMPLATE)?;
    fs::write(base.join("css/style.css"), STARTER_CSS)?;
    fs::write(base.join("js/main.js"), STARTER_JS)?;
    Ok(())
}

fn generate_sample_dataset(base: &Path) -> Result<()> {
    let cities: Vec<City> = SAMPLE_CITIES.iter().map(|name| City::new(*name)).collect();
    let products: Vec<Product> = SAMPLE_PRODUCTS
        .iter()
        .map(|(name, description)| Product {
            slug: slugify(name),
            name: (*name).to_string(),
            description: (*description).to_string(),
            descriptions: BTreeMap::new(),
            source_ref: None,
        })
        .collect();

    let doc = json!({
        "cities": cities,
        "products": products,
    });

    let pretty = serde_json::to_string_pretty(&doc).context("Failed to serialize dataset")?;
    fs::write(base.join("data/dataset.json"), pretty + "\n")?;

    Ok(())
}
