use std::path::Path;

use anyhow::Context;

use crate::{
    BuildArgs,
    build::{BuildResult, Builder},
    config::SiteConfig,
};

use super::clean::remove_output;

pub async fn run(args: &BuildArgs) -> Result<(), anyhow::Error> {
    let config = SiteConfig::load_from_arg(args.config_file.as_deref())?;

    if args.clean {
        remove_output(&config.site.output, false).await?;
    }

    let result = build_site(config).await?;
    print_summary("Built", &result);

    Ok(())
}

/// Run the synchronous build off the async runtime.
pub async fn build_site(config: SiteConfig) -> Result<BuildResult, anyhow::Error> {
    let name = config.site.name.clone();
    let builder = Builder::new(config);
    let result = tokio::task::spawn_blocking(move || builder.build())
        .await
        .context("build task panicked")?
        .with_context(|| format!("failed to build site '{}'", name))?;
    Ok(result)
}

pub fn print_summary(verb: &str, result: &BuildResult) {
    println!(
        "{} site to {} ({} posts, {} tags, {} blog pages, {} tag pages, {} content pages, {} static files)",
        verb,
        display_path(&result.output_dir),
        result.posts,
        result.tags,
        result.blog_pages,
        result.tag_pages,
        result.content_pages,
        result.static_files
    );
}

fn display_path(path: &Path) -> String {
    std::env::current_dir()
        .ok()
        .and_then(|cwd| path.strip_prefix(cwd).ok().map(|p| p.display().to_string()))
        .unwrap_or_else(|| path.display().to_string())
}
