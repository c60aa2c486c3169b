//! Test fixtures: release pages, fake `deno` executables and archives.

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use std::process::Command;

/// Minimal release page listing `assets` for `tag`.
///
/// Each asset gets its own line carrying a `/denoland/...` download href,
/// preceded by unrelated markup so line selection is exercised.
pub fn release_page(tag: &str, assets: &[&str]) -> String {
    let mut page = String::from(
        "<!DOCTYPE html>\n<html>\n<head><link href=\"/assets/site.css\" rel=\"stylesheet\"></head>\n<body>\n",
    );
    page.push_str(&format!("<h1>Release {tag}</h1>\n"));
    for asset in assets {
        page.push_str(&format!(
            "<li><a href=\"/denoland/deno/releases/download/{tag}/{asset}\" rel=\"nofollow\">{asset}</a></li>\n"
        ));
    }
    page.push_str("</body>\n</html>\n");
    page
}

/// Shell script that answers `--version` the way `deno` does.
pub fn fake_deno_script(version: &str) -> String {
    format!("#!/bin/sh\necho \"deno {version}\"\necho \"v8 7.8.279.2\"\necho \"typescript 3.7.2\"\n")
}

/// Write an executable file at `path`.
#[cfg(unix)]
pub fn write_executable(path: &Path, contents: &str) -> Result<()> {
    use std::os::unix::fs::PermissionsExt;

    std::fs::write(path, contents).with_context(|| format!("Failed to write {}", path.display()))?;
    std::fs::set_permissions(path, std::fs::Permissions::from_mode(0o755))
        .with_context(|| format!("Failed to chmod {}", path.display()))?;
    Ok(())
}

/// Whether a `gzip` binary is available for building archives.
pub fn gzip_available() -> bool {
    which::which("gzip").is_ok() && which::which("gunzip").is_ok()
}

/// Gzip `contents` using the system `gzip` tool.
pub fn gzip_bytes(dir: &Path, contents: &[u8]) -> Result<Vec<u8>> {
    let source: PathBuf = dir.join("fixture-payload");
    std::fs::write(&source, contents)
        .with_context(|| format!("Failed to write {}", source.display()))?;

    let output = Command::new("gzip")
        .arg("-c")
        .arg(&source)
        .output()
        .context("Failed to run gzip")?;
    anyhow::ensure!(output.status.success(), "gzip exited with {:?}", output.status.code());

    std::fs::remove_file(&source).ok();
    Ok(output.stdout)
}
