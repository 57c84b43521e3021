use anyhow::{Context, Result};
use axum::{
    Router,
    extract::State,
    http::{StatusCode, Uri, header},
    response::{
        Html, IntoResponse, Response,
        sse::{Event, KeepAlive, Sse},
    },
    routing::get,
};
use notify::{Event as NotifyEvent, EventKind, RecursiveMode, Watcher};
use std::{
    net::SocketAddr,
    path::{Component, Path, PathBuf},
};
use tokio::sync::broadcast;
use tower_http::services::ServeDir;

#[derive(Clone)]
struct AppState {
    site_root: PathBuf,
    reload_tx: broadcast::Sender<()>,
}

/// Injected before `</body>` of every served page so the browser
/// reloads when the output directory changes.
const RELOAD_SNIPPET: &str = r#"<script>
    const eventSource = new EventSource('/_reload');
    eventSource.onmessage = () => location.reload();
    eventSource.onerror = () => eventSource.close();
</script>
"#;

/// Serve a built output directory locally with live reload.
///
/// This command:
/// - Serves the generated pages and sitemap from the output directory
/// - Serves Assets/, css/ and js/ as plain static files
/// - Injects a reload snippet into every HTML page
/// - Watches the directory and triggers a browser reload on changes
///
/// # Arguments
///
/// * `path` - Path to a built output directory
/// * `port` - Port to serve on (default: 8080)
pub async fn run(path: PathBuf, port: u16) -> Result<()> {
    println!("👀 Starting preview server...");
    println!("   Serving: {}", path.display());

    if !path.is_dir() {
        anyhow::bail!(
            "Output directory does not exist: {}\nHint: Run 'landing-kit build' first",
            path.display()
        );
    }
    if !path.join("sitemap.xml").exists() {
        println!("   ⚠ No sitemap.xml here; is this a built output directory?");
    }

    // Create broadcast channel for reload events
    let (reload_tx, _) = broadcast::channel::<()>(100);

    let state = AppState {
        site_root: path.clone(),
        reload_tx: reload_tx.clone(),
    };

    // Asset directories are served as-is; pages go through the
    // reload-injecting fallback
    let app = Router::new()
        .route("/_reload", get(sse_handler))
        .nest_service("/Assets", ServeDir::new(path.join("Assets")))
        .nest_service("/css", ServeDir::new(path.join("css")))
        .nest_service("/js", ServeDir::new(path.join("js")))
        .fallback(get(serve_page))
        .with_state(state);

    // Start file watcher
    let watcher_path = path.clone();
    let watcher_tx = reload_tx.clone();
    tokio::spawn(async move {
        if let Err(e) = watch_files(watcher_path, watcher_tx).await {
            eprintln!("File watcher error: {}", e);
        }
    });

    // Start server
    let addr = SocketAddr::from(([127, 0, 0, 1], port));
    println!("\n🚀 Preview ready at: http://localhost:{}/", port);
    println!("   Press Ctrl+C to stop\n");

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .context("Failed to bind to port")?;

    axum::serve(listener, app).await.context("Server error")?;

    Ok(())
}

/// Watch for file changes and trigger reload
async fn watch_files(path: PathBuf, reload_tx: broadcast::Sender<()>) -> Result<()> {
    let (tx, mut rx) = tokio::sync::mpsc::channel(100);

    let mut watcher =
        notify::recommended_watcher(move |res: Result<NotifyEvent, notify::Error>| {
            if let Ok(event) = res {
                let _ = tx.blocking_send(event);
            }
        })?;

    // Watch output directory recursively
    watcher.watch(&path, RecursiveMode::Recursive)?;

    while let Some(event) = rx.recv().await {
        match event.kind {
            EventKind::Modify(_) | EventKind::Create(_) | EventKind::Remove(_) => {
                // Filter out temporary files and hidden files
                if event.paths.iter().any(|p| {
                    let filename = p.file_name().unwrap_or_default().to_string_lossy();
                    !filename.starts_with('.') && !filename.ends_with('~')
                }) {
                    println!("   📝 Output changed, reloading...");
                    let _ = reload_tx.send(());
                }
            }
            _ => {}
        }
    }

    Ok(())
}

/// SSE endpoint for hot reload
async fn sse_handler(
    State(state): State<AppState>,
) -> Sse<impl futures::Stream<Item = Result<Event, std::convert::Infallible>>> {
    let mut rx = state.reload_tx.subscribe();

    let stream = async_stream::stream! {
        loop {
            if rx.recv().await.is_ok() {
                yield Ok(Event::default().data("reload"));
            }
        }
    };

    Sse::new(stream).keep_alive(KeepAlive::default())
}

/// Fallback handler for pages and the sitemap.
///
/// Maps `/` and `/<product>/<city>/` onto index.html files, injects the
/// reload snippet into HTML, and serves anything else with a guessed
/// content type.
async fn serve_page(State(state): State<AppState>, uri: Uri) -> Response {
    let Some(rel) = sanitize_request_path(uri.path()) else {
        return StatusCode::NOT_FOUND.into_response();
    };

    let mut full = state.site_root.join(&rel);
    if full.is_dir() {
        full = full.join("index.html");
    }

    let Ok(bytes) = tokio::fs::read(&full).await else {
        return StatusCode::NOT_FOUND.into_response();
    };

    let is_html = full
        .extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("html"));
    if is_html {
        let page = String::from_utf8_lossy(&bytes);
        return Html(inject_reload_snippet(&page)).into_response();
    }

    let mime = mime_guess::from_path(&full).first_or_octet_stream();
    ([(header::CONTENT_TYPE, mime.as_ref())], bytes).into_response()
}

/// Reject request paths that try to escape the served directory
fn sanitize_request_path(raw: &str) -> Option<PathBuf> {
    let mut clean = PathBuf::new();
    for component in Path::new(raw.trim_start_matches('/')).components() {
        match component {
            Component::Normal(part) => clean.push(part),
            Component::CurDir => {}
            _ => return None,
        }
    }
    Some(clean)
}

fn inject_reload_snippet(page: &str) -> String {
    if page.contains("</body>") {
        page.replacen("</body>", &format!("{RELOAD_SNIPPET}</body>"), 1)
    } else {
        let mut page = page.to_string();
        page.push_str(RELOAD_SNIPPET);
        page
    }
}
