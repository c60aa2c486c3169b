//! End-to-end pipeline runs against a scripted release server.
//!
//! The "archive" is a gzip of a shell script that answers `--version` like
//! deno, so the whole chain runs for real: download, gunzip, chmod, symlink
//! and the version check. Skipped when `gzip`/`gunzip` are unavailable.
#![cfg(unix)]

use deno_installer::config::{InstallerConfig, PlatformConfig};
use deno_installer::core::InstallerError;
use deno_installer::http::HttpResponse;
use deno_installer::installer::Integration;
use deno_installer::pipeline::{InstallOptions, InstallOutcome, Pipeline};
use deno_installer::release::ReleaseReference;
use deno_installer::test_utils::fixtures::{
    fake_deno_script, gzip_available, gzip_bytes, release_page, write_executable,
};
use deno_installer::test_utils::{ScriptedClient, init_test_logging};
use deno_installer::utils::progress::Reporter;
use serial_test::serial;
use std::os::unix::fs::PermissionsExt;
use tempfile::TempDir;

const LATEST: &str = "https://github.com/denoland/deno/releases/latest";
const TAG_PAGE: &str = "https://github.com/denoland/deno/releases/tag/v1.4.0";
const ASSET: &str =
    "https://github.com/denoland/deno/releases/download/v1.4.0/deno_linux_x64.gz";

struct Sandbox {
    root: TempDir,
    config: InstallerConfig,
    env: PlatformConfig,
}

impl Sandbox {
    fn new() -> Self {
        let root = TempDir::new().unwrap();
        let home = root.path().join("home");
        let link_dir = root.path().join("usr-local-bin");
        std::fs::create_dir_all(&home).unwrap();
        std::fs::create_dir_all(&link_dir).unwrap();

        let config = InstallerConfig {
            link_dir,
            ..InstallerConfig::default()
        };
        let env = PlatformConfig::new("linux", &home);
        Self {
            root,
            config,
            env,
        }
    }

    fn client_serving(&self, reported_version: &str) -> ScriptedClient {
        let archive =
            gzip_bytes(self.root.path(), fake_deno_script(reported_version).as_bytes()).unwrap();
        ScriptedClient::new()
            .route(LATEST, HttpResponse::redirect("/denoland/deno/releases/tag/v1.4.0"))
            .route(TAG_PAGE, HttpResponse::ok(release_page("v1.4.0", &["deno_linux_x64.gz"])))
            .route(ASSET, HttpResponse::redirect("https://objects.test/deno_linux_x64.gz"))
            .route("https://objects.test/deno_linux_x64.gz", HttpResponse::ok(archive))
    }
}

#[tokio::test]
#[serial]
async fn test_fresh_install() {
    init_test_logging(None);
    if !gzip_available() {
        eprintln!("gzip not available, skipping");
        return;
    }

    let sandbox = Sandbox::new();
    let client = sandbox.client_serving("1.4.0");
    let pipeline =
        Pipeline::new(&client, &sandbox.config, &sandbox.env, Reporter::silent()).unwrap();
    let paths = pipeline.paths().clone();

    let outcome = pipeline.run(&InstallOptions::default()).await.unwrap();

    match outcome {
        InstallOutcome::Installed {
            tag,
            integration,
            replaced_previous,
        } => {
            assert_eq!(tag.to_string(), "v1.4.0");
            assert_eq!(integration, Integration::Linked(paths.integration_target.clone()));
            assert!(!replaced_previous);
        }
        other => panic!("unexpected outcome: {other:?}"),
    }

    let mode = std::fs::metadata(&paths.binary_path).unwrap().permissions().mode();
    assert_eq!(mode & 0o777, 0o744);
    assert_eq!(std::fs::read_link(&paths.integration_target).unwrap(), paths.binary_path);
    assert!(!paths.backup_binary_path.exists());
}

#[tokio::test]
#[serial]
async fn test_update_keeps_previous_binary() {
    init_test_logging(None);
    if !gzip_available() {
        return;
    }

    let sandbox = Sandbox::new();
    let client = sandbox.client_serving("1.4.0");
    let pipeline =
        Pipeline::new(&client, &sandbox.config, &sandbox.env, Reporter::silent()).unwrap();
    let paths = pipeline.paths().clone();

    std::fs::create_dir_all(&paths.bin_dir).unwrap();
    write_executable(&paths.binary_path, &fake_deno_script("1.3.0")).unwrap();

    let outcome = pipeline.run(&InstallOptions::default()).await.unwrap();
    assert!(matches!(
        outcome,
        InstallOutcome::Installed {
            replaced_previous: true,
            ..
        }
    ));

    let previous = std::fs::read_to_string(&paths.backup_binary_path).unwrap();
    assert!(previous.contains("deno 1.3.0"));
    let current = std::fs::read_to_string(&paths.binary_path).unwrap();
    assert!(current.contains("deno 1.4.0"));
}

#[tokio::test]
#[serial]
async fn test_second_run_is_idempotent() {
    init_test_logging(None);
    if !gzip_available() {
        return;
    }

    let sandbox = Sandbox::new();
    let client = sandbox.client_serving("1.4.0");
    let pipeline =
        Pipeline::new(&client, &sandbox.config, &sandbox.env, Reporter::silent()).unwrap();
    let paths = pipeline.paths().clone();

    pipeline.run(&InstallOptions::default()).await.unwrap();
    let requests_after_first = client.requests().len();

    let outcome = pipeline.run(&InstallOptions::default()).await.unwrap();
    assert!(matches!(outcome, InstallOutcome::AlreadyCurrent { .. }));
    // Only the release page is fetched again
    assert_eq!(client.requests().len(), requests_after_first + 2);

    let forced = pipeline
        .run(&InstallOptions {
            force: true,
            ..InstallOptions::default()
        })
        .await
        .unwrap();
    assert!(matches!(
        forced,
        InstallOutcome::Installed {
            integration: Integration::AlreadyLinked(_),
            replaced_previous: true,
            ..
        }
    ));

    let links: Vec<_> = std::fs::read_dir(&sandbox.config.link_dir).unwrap().collect();
    assert_eq!(links.len(), 1);
    assert_eq!(std::fs::read_link(&paths.integration_target).unwrap(), paths.binary_path);
}

#[tokio::test]
#[serial]
async fn test_version_mismatch_restores_previous_binary() {
    init_test_logging(None);
    if !gzip_available() {
        return;
    }

    let sandbox = Sandbox::new();
    // The archive claims to be 1.4.0 on the page but reports 1.3.9
    let client = sandbox.client_serving("1.3.9");
    let pipeline =
        Pipeline::new(&client, &sandbox.config, &sandbox.env, Reporter::silent()).unwrap();
    let paths = pipeline.paths().clone();

    std::fs::create_dir_all(&paths.bin_dir).unwrap();
    write_executable(&paths.binary_path, &fake_deno_script("1.2.0")).unwrap();

    let err = pipeline
        .run(&InstallOptions {
            reference: ReleaseReference::latest(),
            force: false,
            link: false,
        })
        .await
        .unwrap_err();

    assert!(matches!(
        err.downcast_ref::<InstallerError>(),
        Some(InstallerError::VersionMismatch { .. })
    ));
    let restored = std::fs::read_to_string(&paths.binary_path).unwrap();
    assert!(restored.contains("deno 1.2.0"));
    assert!(!paths.backup_binary_path.exists());
    assert!(!paths.integration_target.exists());
}

#[tokio::test]
#[serial]
async fn test_failed_fresh_install_leaves_nothing_behind() {
    init_test_logging(None);
    if !gzip_available() {
        return;
    }

    let sandbox = Sandbox::new();
    let client = sandbox.client_serving("1.3.9");
    let pipeline =
        Pipeline::new(&client, &sandbox.config, &sandbox.env, Reporter::silent()).unwrap();
    let paths = pipeline.paths().clone();

    let err = pipeline.run(&InstallOptions::default()).await.unwrap_err();

    assert!(matches!(
        err.downcast_ref::<InstallerError>(),
        Some(InstallerError::VersionMismatch { .. })
    ));
    assert!(!paths.binary_path.exists());
    assert!(!paths.backup_binary_path.exists());
    assert!(std::fs::symlink_metadata(&paths.integration_target).is_err());
}
