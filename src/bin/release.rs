use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;
use std::time::Duration;

use anyhow::{Context, Result, bail};
use clap::Parser;
use log::info;

#[derive(Parser)]
#[command(
    name = "release",
    about = "Build the production artifact and upload it to the hosting endpoint"
)]
struct Cli {
    /// Release version; defaults to the crate version
    #[arg(long)]
    version: Option<String>,

    /// Release notes; defaults to the latest commit, then to a timestamp
    #[arg(long)]
    desc: Option<String>,

    /// Upload worker slot
    #[arg(long, default_value_t = 1, value_parser = clap::value_parser!(u8).range(1..=30))]
    robot: u8,

    /// App identifier; falls back to the QUIZDR_APP_ID environment variable
    #[arg(long)]
    app_id: Option<String>,

    /// Upload endpoint; falls back to the QUIZDR_UPLOAD_URL environment variable
    #[arg(long)]
    endpoint: Option<String>,
}

// ── Metadata resolution ──────────────────────────────────────────────────

fn resolve_version(cli: &Cli) -> String {
    cli.version
        .clone()
        .unwrap_or_else(|| env!("CARGO_PKG_VERSION").to_string())
}

/// `--desc`, else the latest commit as `author: subject`, else a timestamp.
fn resolve_desc(cli: &Cli) -> String {
    if let Some(desc) = &cli.desc {
        return desc.clone();
    }
    if let Some(summary) = git_summary() {
        return summary;
    }
    format!("Uploaded at {}", chrono::Local::now().format("%Y-%m-%d %H:%M:%S"))
}

fn git_summary() -> Option<String> {
    let output = Command::new("git")
        .args(["log", "-1", "--pretty=%an: %s"])
        .output()
        .ok()?;
    if !output.status.success() {
        return None;
    }
    let summary = String::from_utf8_lossy(&output.stdout).trim().to_string();
    if summary.is_empty() { None } else { Some(summary) }
}

fn resolve_app_id(cli: &Cli) -> Result<String> {
    if let Some(app_id) = &cli.app_id {
        return Ok(app_id.clone());
    }
    match env::var("QUIZDR_APP_ID") {
        Ok(app_id) if !app_id.is_empty() => Ok(app_id),
        _ => bail!("no app id: pass --app-id or set QUIZDR_APP_ID"),
    }
}

fn resolve_endpoint(cli: &Cli) -> Result<String> {
    if let Some(endpoint) = &cli.endpoint {
        return Ok(endpoint.clone());
    }
    match env::var("QUIZDR_UPLOAD_URL") {
        Ok(url) if !url.is_empty() => Ok(url),
        _ => bail!("no upload endpoint: pass --endpoint or set QUIZDR_UPLOAD_URL"),
    }
}

/// `private.<app_id>.key` in the project root, falling back to `private.key`.
fn find_key_file(root: &Path, app_id: &str) -> Result<PathBuf> {
    let scoped = root.join(format!("private.{app_id}.key"));
    if scoped.is_file() {
        return Ok(scoped);
    }
    let shared = root.join("private.key");
    if shared.is_file() {
        return Ok(shared);
    }
    bail!(
        "no key file: expected {} or {}",
        scoped.display(),
        shared.display()
    );
}

// ── Build & upload ───────────────────────────────────────────────────────

fn build_artifact() -> Result<PathBuf> {
    info!("building release artifact");
    let status = Command::new("cargo")
        .args(["build", "--release"])
        .status()
        .context("failed to run cargo")?;
    if !status.success() {
        bail!("cargo build --release exited with {status}");
    }

    let name = if cfg!(windows) { "quizdr.exe" } else { "quizdr" };
    let artifact = Path::new("target").join("release").join(name);
    if !artifact.is_file() {
        bail!("build reported success but {} is missing", artifact.display());
    }
    Ok(artifact)
}

fn upload(
    endpoint: &str,
    artifact: &Path,
    key_path: &Path,
    version: &str,
    desc: &str,
    robot: u8,
) -> Result<()> {
    let key = fs::read_to_string(key_path)
        .with_context(|| format!("failed to read key file {}", key_path.display()))?
        .trim()
        .to_string();
    let body = fs::read(artifact)
        .with_context(|| format!("failed to read artifact {}", artifact.display()))?;
    info!("uploading {} bytes to {endpoint}", body.len());

    let client = reqwest::blocking::Client::builder()
        .timeout(Duration::from_secs(300))
        .build()
        .context("failed to build HTTP client")?;
    let response = client
        .put(endpoint)
        .bearer_auth(key)
        .header("x-release-version", version)
        .header("x-release-desc", desc)
        .header("x-release-robot", robot.to_string())
        .body(body)
        .send()
        .context("upload request failed")?;

    let status = response.status();
    if !status.is_success() {
        let detail = response.text().unwrap_or_default();
        bail!("upload rejected with {status}: {detail}");
    }
    Ok(())
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let cli = Cli::parse();

    let version = resolve_version(&cli);
    let desc = resolve_desc(&cli);

    // Configuration problems should surface before the slow build step.
    let app_id = resolve_app_id(&cli)?;
    let endpoint = resolve_endpoint(&cli)?;
    let key_path = find_key_file(Path::new("."), &app_id)?;
    info!("releasing v{version} for app {app_id} (robot {}): {desc}", cli.robot);

    let artifact = build_artifact()?;
    upload(&endpoint, &artifact, &key_path, &version, &desc, cli.robot)?;

    println!("Uploaded quizdr v{version} (robot {}).", cli.robot);
    Ok(())
}
