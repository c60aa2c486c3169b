//! Release resolution: from an optional tag to a concrete download URL.
//!
//! The release page is scraped rather than queried through an API. The page
//! body is split into lines, the first line mentioning both `href` and the
//! platform's asset filename is picked, and the href value is pulled out with
//! a regex. This tolerates layout drift on the page but depends on the href
//! being quoted (single or double quotes are both accepted).

use crate::config::InstallerConfig;
use crate::core::InstallerError;
use crate::http::{HttpClient, follow};
use anyhow::{Context, Result};
use regex::Regex;
use std::fmt;
use std::str::FromStr;
use std::sync::LazyLock;
use tracing::debug;

static TAG_EXACT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^v(\d+)\.(\d+)\.(\d+)$").expect("valid tag regex"));

static TAG_SEARCH: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"v\d+\.\d+\.\d+").expect("valid tag search regex"));

static HREF: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"href=["']([^"']*)["']"#).expect("valid href regex"));

/// A release tag of the form `vMAJOR.MINOR.PATCH`.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ReleaseTag(semver::Version);

impl ReleaseTag {
    pub fn version(&self) -> &semver::Version {
        &self.0
    }
}

impl FromStr for ReleaseTag {
    type Err = InstallerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || InstallerError::InvalidTag {
            tag: s.to_string(),
        };
        let caps = TAG_EXACT.captures(s).ok_or_else(invalid)?;
        let part = |i: usize| caps[i].parse::<u64>().map_err(|_| invalid());
        Ok(Self(semver::Version::new(part(1)?, part(2)?, part(3)?)))
    }
}

impl fmt::Display for ReleaseTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "v{}", self.0)
    }
}

/// What the user asked for: a specific tag, or the latest release.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReleaseReference {
    pub tag: Option<ReleaseTag>,
}

impl ReleaseReference {
    pub const fn latest() -> Self {
        Self {
            tag: None,
        }
    }

    pub const fn tag(tag: ReleaseTag) -> Self {
        Self {
            tag: Some(tag),
        }
    }
}

impl fmt::Display for ReleaseReference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.tag {
            Some(tag) => write!(f, "{tag}"),
            None => f.write_str("latest"),
        }
    }
}

/// The concrete asset chosen for this run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedRelease {
    /// Absolute download URL under the configured origin.
    pub url: String,
    pub tag: ReleaseTag,
}

/// First line of `body` that mentions `href` and `asset`.
pub fn find_asset_line<'a>(body: &'a str, asset: &str) -> Option<&'a str> {
    body.lines().find(|line| line.contains("href") && line.contains(asset))
}

/// The href value on `line` that points at `asset`.
pub fn extract_href(line: &str, asset: &str) -> Option<String> {
    HREF.captures_iter(line)
        .map(|caps| caps[1].to_string())
        .find(|href| href.contains(asset))
}

/// Turns a [`ReleaseReference`] into a [`ResolvedRelease`] by scraping the
/// release page.
pub struct ReleaseLocator<'a, C> {
    client: &'a C,
    config: &'a InstallerConfig,
    asset: &'a str,
}

impl<'a, C: HttpClient> ReleaseLocator<'a, C> {
    pub const fn new(client: &'a C, config: &'a InstallerConfig, asset: &'a str) -> Self {
        Self {
            client,
            config,
            asset,
        }
    }

    /// Release page for `reference`: `<root>/latest` or `<root>/tag/<tag>`.
    pub fn page_url(&self, reference: &ReleaseReference) -> String {
        let root = self.config.release_root.trim_end_matches('/');
        match &reference.tag {
            Some(tag) => format!("{root}/tag/{tag}"),
            None => format!("{root}/latest"),
        }
    }

    pub async fn resolve(&self, reference: &ReleaseReference) -> Result<ResolvedRelease> {
        let page = self.page_url(reference);
        debug!("Resolving {} from {page}", self.asset);

        let response = follow(self.client, &page, self.config.max_requests)
            .await
            .with_context(|| format!("Failed to fetch release page {page}"))?;

        Ok(self.parse_page(&response.text(), &page)?)
    }

    /// Pick the asset out of a release page body.
    pub fn parse_page(&self, body: &str, page: &str) -> Result<ResolvedRelease, InstallerError> {
        let not_found = || InstallerError::AssetNotFound {
            asset: self.asset.to_string(),
            page: page.to_string(),
        };

        let line = find_asset_line(body, self.asset).ok_or_else(not_found)?;
        let href = extract_href(line, self.asset).ok_or_else(not_found)?;

        if !href.starts_with(&self.config.asset_path_prefix) {
            debug!("Rejecting href {href}: outside {}", self.config.asset_path_prefix);
            return Err(not_found());
        }

        let tag = TAG_SEARCH
            .find(&href)
            .and_then(|m| m.as_str().parse::<ReleaseTag>().ok())
            .ok_or_else(not_found)?;

        let origin = self.config.download_origin.trim_end_matches('/');
        Ok(ResolvedRelease {
            url: format!("{origin}{href}"),
            tag,
        })
    }
}
