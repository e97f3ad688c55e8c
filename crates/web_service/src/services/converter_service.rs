//! Format conversions delegated to external executables: LibreOffice for
//! PDF→DOCX, ffmpeg for audio extraction and GIF rendering. This module
//! marshals temp files in and out; it never parses the formats itself.

use std::path::{Path, PathBuf};

use anyhow::anyhow;
use log::debug;
use tokio::process::Command;

use crate::error::{AppError, Result};

async fn run_tool(bin: &str, args: &[&str]) -> Result<()> {
    debug!("running {bin} {}", args.join(" "));
    let output = Command::new(bin)
        .args(args)
        .output()
        .await
        .map_err(|e| AppError::ServiceUnavailable(format!("failed to run {bin}: {e}")))?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        // ffmpeg is chatty; keep the tail where the actual error lives.
        let tail: String = stderr
            .lines()
            .rev()
            .take(5)
            .collect::<Vec<_>>()
            .into_iter()
            .rev()
            .collect::<Vec<_>>()
            .join("\n");
        return Err(AppError::InternalError(anyhow!("{bin} failed: {tail}")));
    }
    Ok(())
}

fn sibling_with_suffix(input: &Path, suffix: &str) -> PathBuf {
    let mut name = input
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "converted".to_string());
    name.push_str(suffix);
    input.with_file_name(name)
}

/// LibreOffice writes `<stem>.docx` into the output directory.
pub async fn pdf_to_docx(soffice: &str, input: &Path, outdir: &Path) -> Result<PathBuf> {
    run_tool(
        soffice,
        &[
            "--headless",
            "--convert-to",
            "docx",
            "--outdir",
            &outdir.to_string_lossy(),
            &input.to_string_lossy(),
        ],
    )
    .await?;

    let stem = input
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "converted".to_string());
    let output = outdir.join(format!("{stem}.docx"));
    if !output.exists() {
        return Err(AppError::InternalError(anyhow!(
            "conversion produced no output file"
        )));
    }
    Ok(output)
}

pub async fn extract_audio(ffmpeg: &str, input: &Path) -> Result<PathBuf> {
    let output = sibling_with_suffix(input, ".mp3");
    run_tool(
        ffmpeg,
        &[
            "-y",
            "-i",
            &input.to_string_lossy(),
            "-vn",
            "-acodec",
            "libmp3lame",
            "-q:a",
            "2",
            &output.to_string_lossy(),
        ],
    )
    .await?;
    Ok(output)
}

pub async fn video_to_gif(ffmpeg: &str, input: &Path) -> Result<PathBuf> {
    let output = sibling_with_suffix(input, ".gif");
    run_tool(
        ffmpeg,
        &[
            "-y",
            "-i",
            &input.to_string_lossy(),
            "-vf",
            "fps=12,scale=480:-1:flags=lanczos",
            &output.to_string_lossy(),
        ],
    )
    .await?;
    Ok(output)
}

/// Best-effort removal of conversion leftovers; errors are swallowed.
pub fn cleanup(paths: Vec<PathBuf>) {
    tokio::task::spawn_blocking(move || {
        for path in paths {
            if path.exists() {
                let _ = std::fs::remove_file(&path);
            }
        }
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sibling_output_keeps_directory() {
        let out = sibling_with_suffix(Path::new("/tmp/work/upload123"), ".mp3");
        assert_eq!(out, PathBuf::from("/tmp/work/upload123.mp3"));
    }

    #[tokio::test]
    async fn missing_binary_is_service_unavailable() {
        let err = run_tool("definitely-not-a-real-binary-xyz", &["-h"])
            .await
            .expect_err("must fail");
        assert!(matches!(err, AppError::ServiceUnavailable(_)));
    }

    #[tokio::test]
    async fn failing_tool_reports_stderr_tail() {
        // `false` exits non-zero with no output on any unix box.
        let err = run_tool("false", &[]).await.expect_err("must fail");
        assert!(matches!(err, AppError::InternalError(_)));
    }
}
