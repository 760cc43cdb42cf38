use std::net::SocketAddr;
use std::path::{Component, Path, PathBuf};
use std::sync::Arc;

use axum::Router;
use axum::extract::State;
use axum::handler::Handler;
use axum::http::{StatusCode, Uri};
use axum::response::{Html, IntoResponse, Response};
use tower_http::services::ServeDir;

use crate::{ServeArgs, config::SiteConfig};

use super::build::{build_site, print_summary};

const NOT_FOUND_PAGE: &str = "404.html";

pub async fn run(args: &ServeArgs) -> Result<(), anyhow::Error> {
    let config = SiteConfig::load_from_arg(args.config_file.as_deref())?;
    let output_dir = config.site.output.clone();

    if args.no_build {
        tracing::info!("skipping build, serving existing output");
    } else {
        println!("Building site...");
        let result = build_site(config).await?;
        print_summary("Built", &result);
    }

    if !output_dir.is_dir() {
        anyhow::bail!(
            "output directory {} does not exist; run `quire build` first",
            output_dir.display()
        );
    }

    let app = router(output_dir);

    // Parse the address
    let addr: SocketAddr = format!("{}:{}", args.bind, args.port).parse()?;

    // Determine the URL to display
    let display_host = if args.bind == "0.0.0.0" {
        "localhost"
    } else {
        &args.bind
    };
    let url = format!("http://{}:{}", display_host, args.port);

    println!("\nServing site at {}", url);
    println!("Press Ctrl+C to stop\n");

    // Open browser if requested
    if args.open
        && let Err(e) = open::that(&url)
    {
        tracing::warn!("failed to open browser: {}", e);
    }

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

/// Static file server over the output tree. Directories resolve to their
/// `index.html`; anything missing goes through [`not_found`].
fn router(output_dir: PathBuf) -> Router {
    let root = Arc::new(output_dir);
    let serve_dir = ServeDir::new(root.as_path())
        .append_index_html_on_directories(true)
        .not_found_service(not_found.with_state(root.clone()));

    Router::new().fallback_service(serve_dir)
}

/// Serve the closest 404 page: the requested directory's, then the site
/// root's, then a plain-text message.
async fn not_found(State(root): State<Arc<PathBuf>>, uri: Uri) -> Response {
    for candidate in not_found_candidates(&root, uri.path()) {
        if let Ok(content) = tokio::fs::read_to_string(&candidate).await {
            tracing::debug!(path = uri.path(), page = %candidate.display(), "serving 404 page");
            return (StatusCode::NOT_FOUND, Html(content)).into_response();
        }
    }

    (StatusCode::NOT_FOUND, "404 Not Found").into_response()
}

/// 404 pages to try for a request path, closest first.
///
/// The requested directory is the path itself when it ends in `/`, otherwise
/// its parent. Only plain path segments are kept, so the search never leaves
/// `root`.
fn not_found_candidates(root: &Path, request_path: &str) -> Vec<PathBuf> {
    let dir_part = if request_path.ends_with('/') {
        request_path
    } else {
        request_path
            .rsplit_once('/')
            .map(|(dir, _)| dir)
            .unwrap_or("")
    };

    let mut dir = PathBuf::new();
    for component in Path::new(dir_part.trim_start_matches('/')).components() {
        if let Component::Normal(segment) = component {
            dir.push(segment);
        }
    }

    let mut candidates = Vec::with_capacity(2);
    if !dir.as_os_str().is_empty() {
        candidates.push(root.join(&dir).join(NOT_FOUND_PAGE));
    }
    candidates.push(root.join(NOT_FOUND_PAGE));
    candidates
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::to_bytes;

    #[test]
    fn test_not_found_candidates() {
        let root = Path::new("/site");
        assert_eq!(
            not_found_candidates(root, "/blog/posts/missing.html"),
            vec![
                PathBuf::from("/site/blog/posts/404.html"),
                PathBuf::from("/site/404.html")
            ]
        );
        assert_eq!(
            not_found_candidates(root, "/docs/"),
            vec![
                PathBuf::from("/site/docs/404.html"),
                PathBuf::from("/site/404.html")
            ]
        );
        assert_eq!(
            not_found_candidates(root, "/missing.html"),
            vec![PathBuf::from("/site/404.html")]
        );
        assert_eq!(
            not_found_candidates(root, "/../../etc/passwd"),
            vec![PathBuf::from("/site/404.html")]
        );
    }

    async fn body_of(response: Response) -> String {
        let bytes = to_bytes(response.into_body(), 1024 * 1024).await.unwrap();
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    #[tokio::test]
    async fn test_not_found_fallback_chain() {
        let dir = tempfile::tempdir().unwrap();
        let root = Arc::new(dir.path().to_path_buf());

        let plain = not_found(State(root.clone()), Uri::from_static("/blog/x.html")).await;
        assert_eq!(plain.status(), StatusCode::NOT_FOUND);
        assert_eq!(body_of(plain).await, "404 Not Found");

        std::fs::write(dir.path().join("404.html"), "<p>root</p>").unwrap();
        let site = not_found(State(root.clone()), Uri::from_static("/blog/x.html")).await;
        assert_eq!(site.status(), StatusCode::NOT_FOUND);
        assert_eq!(body_of(site).await, "<p>root</p>");

        std::fs::create_dir_all(dir.path().join("blog")).unwrap();
        std::fs::write(dir.path().join("blog/404.html"), "<p>blog</p>").unwrap();
        let local = not_found(State(root.clone()), Uri::from_static("/blog/x.html")).await;
        assert_eq!(body_of(local).await, "<p>blog</p>");

        let other = not_found(State(root), Uri::from_static("/docs/x.html")).await;
        assert_eq!(body_of(other).await, "<p>root</p>");
    }
}
