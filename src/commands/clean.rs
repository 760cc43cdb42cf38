use std::path::Path;

use crate::{CleanArgs, config::SiteConfig};

pub async fn run(args: &CleanArgs) -> Result<(), anyhow::Error> {
    let config = SiteConfig::load_from_arg(args.config_file.as_deref())?;

    if !remove_output(&config.site.output, args.dry_run).await? {
        println!("Nothing to clean at {}", config.site.output.display());
    }

    Ok(())
}

/// Delete the generated site folder. Returns whether there was one.
pub async fn remove_output(output: &Path, dry_run: bool) -> Result<bool, anyhow::Error> {
    if !output.exists() {
        return Ok(false);
    }

    if dry_run {
        println!("Would delete {}", output.display());
    } else {
        tokio::fs::remove_dir_all(output).await?;
        tracing::info!(dir = %output.display(), "deleted output directory");
        println!("Deleted {}", output.display());
    }

    Ok(true)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_remove_output() {
        let dir = tempfile::tempdir().unwrap();
        let output = dir.path().join("public");
        std::fs::create_dir_all(output.join("blog")).unwrap();
        std::fs::write(output.join("blog/index.html"), "x").unwrap();

        assert!(remove_output(&output, true).await.unwrap());
        assert!(output.exists());

        assert!(remove_output(&output, false).await.unwrap());
        assert!(!output.exists());

        assert!(!remove_output(&output, false).await.unwrap());
    }
}
