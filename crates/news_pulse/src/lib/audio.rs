//! Combining synthesized MP3 segments into a single track.

use std::path::PathBuf;

use anyhow::{bail, Context};
use uuid::Uuid;

/// How audio segments get merged.
///
/// `Ffmpeg` re-muxes via the concat demuxer, producing a track with correct
/// duration metadata. `Bytes` falls back to raw concatenation, which most
/// players handle but which reports the first segment's duration.
#[derive(Debug, Clone)]
pub enum AudioCombiner {
    Ffmpeg { workdir: PathBuf },
    Bytes,
}

impl AudioCombiner {
    /// Probes for an `ffmpeg` binary and picks the best available combiner.
    pub fn detect(workdir: impl Into<PathBuf>) -> Self {
        let available = std::process::Command::new("ffmpeg")
            .arg("-version")
            .stdout(std::process::Stdio::null())
            .stderr(std::process::Stdio::null())
            .status()
            .map(|s| s.success())
            .unwrap_or(false);

        if available {
            tracing::info!("ffmpeg found, using concat demuxer for audio combining");
            Self::Ffmpeg {
                workdir: workdir.into(),
            }
        } else {
            tracing::warn!("ffmpeg not found, falling back to byte concatenation");
            Self::Bytes
        }
    }

    /// Merges `segments` into one MP3 byte stream.
    pub async fn combine(&self, segments: &[Vec<u8>]) -> anyhow::Result<Vec<u8>> {
        if segments.is_empty() {
            bail!("no audio segments to combine");
        }
        if segments.len() == 1 {
            return Ok(segments[0].clone());
        }

        match self {
            Self::Ffmpeg { workdir } => combine_with_ffmpeg(workdir, segments).await,
            Self::Bytes => Ok(segments.concat()),
        }
    }
}

async fn combine_with_ffmpeg(workdir: &PathBuf, segments: &[Vec<u8>]) -> anyhow::Result<Vec<u8>> {
    let scratch = workdir.join(format!("combine-{}", Uuid::new_v4()));
    tokio::fs::create_dir_all(&scratch)
        .await
        .context("Failed to create ffmpeg scratch directory")?;

    let result = run_concat(&scratch, segments).await;

    if let Err(e) = tokio::fs::remove_dir_all(&scratch).await {
        tracing::warn!(error = ?e, path = %scratch.display(), "Failed to clean up scratch directory");
    }

    result
}

async fn run_concat(scratch: &PathBuf, segments: &[Vec<u8>]) -> anyhow::Result<Vec<u8>> {
    let mut list = String::new();
    for (i, segment) in segments.iter().enumerate() {
        let name = format!("segment-{i:03}.mp3");
        tokio::fs::write(scratch.join(&name), segment)
            .await
            .with_context(|| format!("Failed to write {name}"))?;
        list.push_str(&format!("file '{name}'\n"));
    }
    tokio::fs::write(scratch.join("list.txt"), list)
        .await
        .context("Failed to write concat list")?;

    let output_path = scratch.join("combined.mp3");
    let status = tokio::process::Command::new("ffmpeg")
        .current_dir(scratch)
        .args([
            "-y",
            "-f",
            "concat",
            "-safe",
            "0",
            "-i",
            "list.txt",
            "-c",
            "copy",
            "combined.mp3",
        ])
        .stdout(std::process::Stdio::null())
        .stderr(std::process::Stdio::null())
        .status()
        .await
        .context("Failed to spawn ffmpeg")?;

    if !status.success() {
        bail!("ffmpeg concat exited with {status}");
    }

    tokio::fs::read(&output_path)
        .await
        .context("Failed to read combined audio")
}
