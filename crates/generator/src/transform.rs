use landing_kit_core::{City, Product, SiteManifest};
use once_cell::sync::Lazy;
use regex::{Captures, NoExpand, Regex};
use serde_json::json;

static HTML_LANG_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"<html lang="[^"]*""#).unwrap());
static TITLE_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?s)<title>.*?</title>").unwrap());
static META_DESC_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"<meta name="description" content="[^"]*"\s*/?>"#).unwrap());
static HERO_ACCENT_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"(<span class="hero-accent">)[^<]*(</span>)"#).unwrap());
static HERO_SUBTITLE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"(<p class="hero-subtitle">)[^<]*(</p>)"#).unwrap());

/// Insertion points for the localized content block, in preference order.
/// The first one present in the template wins.
const SECTION_ANCHORS: &[&str] = &["<!-- CTA -->", "</main>", "<!-- Footer -->"];

/// One question/answer pair, rendered identically into the visible FAQ
/// section and the FAQPage structured data
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Faq {
    pub question: String,
    pub answer: String,
}

/// Personalize one template for one (product, city) pair.
///
/// Pure function of its inputs. Each step targets an anchor in the
/// template and skips silently when the anchor is absent; for singleton
/// elements like `<title>` the first occurrence wins and later ones are
/// left alone. Only `{{CITY}}` and `{{PRODUCT}}` tokens inside dataset
/// copy are replaced globally.
pub fn render(template: &str, product: &Product, city: &City, manifest: &SiteManifest) -> String {
    let site = &manifest.site;
    let mut html = template.to_string();

    // 1. Document language
    html = HTML_LANG_RE
        .replace(
            &html,
            NoExpand(&format!(r#"<html lang="{}""#, site.language)),
        )
        .into_owned();

    // 2. SEO title
    let title = format!("{} en {} | {}", product.name, city.name, site.brand);
    html = TITLE_RE
        .replace(&html, NoExpand(&format!("<title>{}</title>", title)))
        .into_owned();

    // 3. Meta description
    let description = page_description(product, city, manifest);
    html = META_DESC_RE
        .replace(
            &html,
            NoExpand(&format!(
                r#"<meta name="description" content="{}">"#,
                html_escape(&description)
            )),
        )
        .into_owned();

    // 4. Hero accent and subtitle
    let accent = format!("en {}", city.name);
    html = HERO_ACCENT_RE
        .replace(&html, |caps: &Captures| {
            format!("{}{}{}", &caps[1], accent, &caps[2])
        })
        .into_owned();

    let subtitle = format!(
        "Fabricante e instalador de {} en {} y toda {}.",
        product.name.to_lowercase(),
        city.name,
        site.region
    );
    html = HERO_SUBTITLE_RE
        .replace(&html, |caps: &Captures| {
            format!("{}{}{}", &caps[1], subtitle, &caps[2])
        })
        .into_owned();

    // 5. Localized marketing and FAQ sections, before the first anchor found
    let faqs = faqs_for(product, city, manifest);
    let sections = format!(
        "{}\n{}\n",
        localized_section(product, city, manifest),
        faq_section(city, &faqs)
    );
    if let Some(anchor) = SECTION_ANCHORS.iter().find(|a| html.contains(**a)).copied() {
        html = html.replacen(anchor, &format!("{}{}", sections, anchor), 1);
    }

    // 6. Structured data, immediately before </head>
    let scripts = schema_scripts(product, city, manifest, &faqs, &description);
    html = html.replacen("</head>", &format!("{}</head>", scripts), 1);

    html
}

/// Replace every `{{CITY}}` and `{{PRODUCT}}` token in dataset copy
pub fn substitute_tokens(text: &str, product: &Product, city: &City) -> String {
    text.replace("{{CITY}}", &city.name)
        .replace("{{PRODUCT}}", &product.name)
}

/// Meta description for one page: the product's localized copy with
/// tokens substituted, or standard copy when the dataset carries none
fn page_description(product: &Product, city: &City, manifest: &SiteManifest) -> String {
    let localized = product
        .localized_description(&manifest.site.language)
        .trim();
    if localized.is_empty() {
        return format!(
            "{} en {}, {}. Fabricación e instalación con garantía y presupuesto sin compromiso.",
            product.name, city.name, manifest.site.region
        );
    }
    substitute_tokens(localized, product, city)
}

/// Question/answer pairs for one page.
///
/// Shared by the visible FAQ section and the FAQPage structured data so
/// the two can never drift apart.
fn faqs_for(product: &Product, city: &City, manifest: &SiteManifest) -> Vec<Faq> {
    let product_lower = product.name.to_lowercase();
    let region = &manifest.site.region;
    vec![
        Faq {
            question: format!(
                "¿Cuánto cuesta instalar {} en {}?",
                product_lower, city.name
            ),
            answer: format!(
                "El precio depende de las medidas, el material y las características de su terraza o negocio en {}. Como fabricantes e instaladores directos en {}, preparamos un presupuesto a medida sin compromiso.",
                city.name, region
            ),
        },
        Faq {
            question: "¿Resisten el viento y el clima costero?".to_string(),
            answer: format!(
                "Sí. Nuestros sistemas están diseñados para el clima de {}: brisa marina, humedad y rachas de viento. Trabajamos con aluminio tratado contra la corrosión y materiales de alta resistencia.",
                region
            ),
        },
        Faq {
            question: format!("¿Necesito permiso de la comunidad en {}?", city.name),
            answer: format!(
                "En la mayoría de los casos no, porque se trata de estructuras desmontables que no alteran la fachada. Aun así, recomendamos consultar los estatutos de su comunidad en {}.",
                city.name
            ),
        },
    ]
}

/// Visible marketing section localized to the city.
///
/// Links and image sources are root-relative here; the link rewriter owns
/// depth prefixing for the whole document, injected content included.
fn localized_section(product: &Product, city: &City, manifest: &SiteManifest) -> String {
    let site = &manifest.site;
    let product_lower = product.name.to_lowercase();
    format!(
        r#"<section class="local-seo" id="local-{city_slug}">
    <div class="container">
        <h2>{product} en {city} y {region}</h2>
        <p>En <strong>{brand}</strong> fabricamos e instalamos {product_lower} en {city}. Medición, fabricación e instalación propias, sin intermediarios y con garantía por escrito.</p>
        <ul class="local-benefits">
            <li>✓ Medición y presupuesto sin compromiso en {city}</li>
            <li>✓ Fabricación propia a medida</li>
            <li>✓ Materiales preparados para el clima de {region}</li>
        </ul>
        <img src="Assets/products/{product_slug}.jpg" alt="{product} en {city} - {brand}" loading="lazy">
        <a class="btn btn-primary" href="contact.html">Solicitar presupuesto en {city}</a>
    </div>
</section>"#,
        city_slug = city.slug,
        product_slug = product.slug,
        product = product.name,
        product_lower = product_lower,
        city = city.name,
        region = site.region,
        brand = site.brand,
    )
}

/// Visible FAQ section
fn faq_section(city: &City, faqs: &[Faq]) -> String {
    let mut items = String::new();
    for faq in faqs {
        items.push_str(&format!(
            r#"        <div class="faq-item">
            <h3>{}</h3>
            <p>{}</p>
        </div>
"#,
            faq.question, faq.answer
        ));
    }
    format!(
        r#"<section class="local-faq">
    <div class="container">
        <h2>Preguntas frecuentes en {}</h2>
{}    </div>
</section>"#,
        city.name, items
    )
}

/// The three JSON-LD blocks for one page, ready to splice before `</head>`
fn schema_scripts(
    product: &Product,
    city: &City,
    manifest: &SiteManifest,
    faqs: &[Faq],
    description: &str,
) -> String {
    let schemas = [
        local_business_schema(city, manifest),
        product_schema(product, city, manifest, description),
        faq_schema(faqs),
    ];

    let mut out = String::new();
    for schema in &schemas {
        out.push_str(&format!(
            "\n    <script type=\"application/ld+json\">\n    {}\n    </script>",
            schema
        ));
    }
    out.push('\n');
    out
}

fn local_business_schema(city: &City, manifest: &SiteManifest) -> serde_json::Value {
    let site = &manifest.site;
    json!({
        "@context": "https://schema.org",
        "@type": "LocalBusiness",
        "name": site.brand,
        "url": format!("{}/", site.base_url),
        "areaServed": {
            "@type": "City",
            "name": city.name,
        },
    })
}

fn product_schema(
    product: &Product,
    city: &City,
    manifest: &SiteManifest,
    description: &str,
) -> serde_json::Value {
    json!({
        "@context": "https://schema.org",
        "@type": "Product",
        "name": format!("{} en {}", product.name, city.name),
        "description": description,
        "brand": {
            "@type": "Brand",
            "name": manifest.site.brand,
        },
    })
}

fn faq_schema(faqs: &[Faq]) -> serde_json::Value {
    let entities: Vec<serde_json::Value> = faqs
        .iter()
        .map(|faq| {
            json!({
                "@type": "Question",
                "name": faq.question,
                "acceptedAnswer": {
                    "@type": "Answer",
                    "text": faq.answer,
                },
            })
        })
        .collect();

    json!({
        "@context": "https://schema.org",
        "@type": "FAQPage",
        "mainEntity": entities,
    })
}

fn html_escape(s: &str) -> String {
    s.chars()
        .map(|c| match c {
            '&' => "&amp;".to_string(),
            '<' => "&lt;".to_string(),
            '>' => "&gt;".to_string(),
            '"' => "&quot;".to_string(),
            '\'' => "&#x27;".to_string(),
            _ => c.to_string(),
        })
        .collect()
}
