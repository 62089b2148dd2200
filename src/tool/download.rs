//! src/tool/download.rs
//! Handles fetching the release descriptor and downloading release assets.

use indicatif::{ProgressBar, ProgressStyle};
use serde::Deserialize;
use sha2::{Digest, Sha256};
use std::fs::File;
use std::io::{self, BufReader, Read, Write};
use std::path::Path;

// --- Data Structures for the release descriptor ---
// These mirror the subset of a GitHub "latest release" response we read.

/// A single downloadable file attached to a release.
#[derive(Deserialize, Debug, Clone)]
pub struct ReleaseAsset {
    pub name: String,
    pub browser_download_url: String,
    /// `sha256:<hex>` when the host publishes one.
    #[serde(default)]
    pub digest: Option<String>,
}

#[derive(Deserialize, Debug, Clone)]
pub struct Release {
    #[serde(default)]
    pub tag_name: String,
    #[serde(default)]
    pub assets: Vec<ReleaseAsset>,
}

impl Release {
    /// Picks the `<tool>*<arch>*.AppImage` asset for this architecture.
    pub fn find_asset(&self, tool: &str, arch: &str) -> Option<&ReleaseAsset> {
        self.assets.iter().find(|asset| {
            let name = asset.name.as_str();
            name.starts_with(tool) && name.contains(arch) && name.ends_with(".AppImage")
        })
    }
}

impl ReleaseAsset {
    pub fn sha256(&self) -> Option<&str> {
        self.digest.as_deref().and_then(|d| d.strip_prefix("sha256:"))
    }
}

// --- Public API ---

pub fn client(user_agent: &str) -> Result<reqwest::blocking::Client, reqwest::Error> {
    // GitHub's API rejects requests without a User-Agent.
    reqwest::blocking::Client::builder().user_agent(user_agent).build()
}

/// Fetches and parses the release descriptor.
pub fn fetch_release(
    client: &reqwest::blocking::Client,
    url: &str,
) -> Result<Release, Box<dyn std::error::Error>> {
    let release = client
        .get(url)
        .header("Accept", "application/vnd.github+json")
        .send()?
        .error_for_status()? // Fail on HTTP errors like 404
        .json::<Release>()?;
    Ok(release)
}

/// Streams `url` into `dest`, showing a progress bar. Returns the byte count.
///
/// The caller owns `dest` and decides what happens to it when this fails.
pub fn download_file_with_progress<W: Write>(
    client: &reqwest::blocking::Client,
    url: &str,
    dest: &mut W,
) -> Result<u64, Box<dyn std::error::Error>> {
    let response = client.get(url).send()?.error_for_status()?;

    // Get total file size from headers, if available.
    let total_size = response.content_length().unwrap_or(0);

    let pb = ProgressBar::new(total_size);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {bytes}/{total_bytes} ({bytes_per_sec})")?
            .progress_chars("#>-"),
    );

    let result = io::copy(&mut pb.wrap_read(response), dest);
    pb.finish_and_clear();
    let written = result?;
    dest.flush()?;
    Ok(written)
}

/// Compute SHA-256 checksum of a file, returning lowercase hex.
pub fn sha256_file(path: &Path) -> Result<String, Box<dyn std::error::Error>> {
    let file = File::open(path)?;
    let mut reader = BufReader::new(file);
    let mut hasher = Sha256::new();
    let mut buf = [0u8; 64 * 1024];
    loop {
        let n = reader.read(&mut buf)?;
        if n == 0 { break; }
        hasher.update(&buf[..n]);
    }
    Ok(hex::encode(hasher.finalize()))
}
