//! Media metadata extraction via the `yt-dlp` executable.
//!
//! The heavy lifting is delegated wholesale to yt-dlp (`-J` dumps the full
//! info JSON without downloading); this module only reshapes the result
//! into the direct-link picks the API exposes.

use gateway_core::UpstreamError;
use serde_json::{json, Value};
use tokio::process::Command;

pub async fn extract_media_info(bin: &str, url: &str) -> Result<Value, UpstreamError> {
    let output = Command::new(bin)
        .args(["-J", "--no-warnings", "--no-playlist", url])
        .output()
        .await
        .map_err(|e| UpstreamError::Unreachable(format!("failed to run {bin}: {e}")))?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(UpstreamError::rejected(400, stderr.trim().to_string()));
    }

    let info: Value = serde_json::from_slice(&output.stdout)
        .map_err(|e| UpstreamError::Unreachable(format!("unparseable yt-dlp output: {e}")))?;
    Ok(collapse_playlist(info))
}

/// Search results and playlists come back as a wrapper object; the API
/// only ever serves the first entry.
fn collapse_playlist(info: Value) -> Value {
    let is_playlist = matches!(
        info.get("_type").and_then(Value::as_str),
        Some("playlist") | Some("multi_video")
    );
    if !is_playlist {
        return info;
    }
    info.get("entries")
        .and_then(Value::as_array)
        .and_then(|entries| entries.iter().find(|e| !e.is_null()))
        .cloned()
        .unwrap_or(info)
}

fn has_codec(format: &Value, key: &str) -> bool {
    match format.get(key) {
        Some(Value::String(s)) => s != "none",
        _ => false,
    }
}

fn has_url(format: &Value) -> bool {
    format.get("url").and_then(Value::as_str).is_some()
}

fn num(format: &Value, key: &str) -> f64 {
    format.get(key).and_then(Value::as_f64).unwrap_or(0.0)
}

fn best_by<'a>(
    formats: &'a [Value],
    filter: impl Fn(&Value) -> bool,
    score: impl Fn(&Value) -> (f64, f64, f64),
) -> Option<&'a Value> {
    formats
        .iter()
        .filter(|f| filter(f) && has_url(f))
        .max_by(|a, b| {
            score(a)
                .partial_cmp(&score(b))
                .unwrap_or(std::cmp::Ordering::Equal)
        })
}

fn pick(format: Option<&Value>, quality_key: &str) -> Value {
    match format {
        Some(f) => json!({
            "url": f.get("url"),
            "ext": f.get("ext"),
            quality_key: f.get(quality_key),
            "format_id": f.get("format_id"),
        }),
        None => Value::Null,
    }
}

/// Reshapes the raw info into the best progressive / video-only /
/// audio-only direct links, quality-ordered roughly by height, total
/// bitrate and file size (audio bitrate for audio-only).
pub fn build_direct_links(info: &Value) -> Value {
    let empty = vec![];
    let formats = info
        .get("formats")
        .and_then(Value::as_array)
        .unwrap_or(&empty);

    let av_score = |f: &Value| (num(f, "height"), num(f, "tbr"), num(f, "filesize"));
    let audio_score = |f: &Value| (num(f, "abr"), num(f, "tbr"), num(f, "filesize"));

    let progressive = best_by(
        formats,
        |f| has_codec(f, "vcodec") && has_codec(f, "acodec"),
        av_score,
    );
    let video_only = best_by(
        formats,
        |f| has_codec(f, "vcodec") && !has_codec(f, "acodec"),
        av_score,
    );
    let audio_only = best_by(
        formats,
        |f| has_codec(f, "acodec") && !has_codec(f, "vcodec"),
        audio_score,
    );

    json!({
        "title": info.get("title"),
        "extractor": info.get("extractor"),
        "duration": info.get("duration"),
        "thumbnail": info.get("thumbnail"),
        "webpage_url": info.get("webpage_url"),
        "direct": {
            "progressive": pick(progressive, "height"),
            "video_only": pick(video_only, "height"),
            "audio_only": pick(audio_only, "abr"),
        },
        "note": "Direct URLs expire; if a link returns 403, call this endpoint again.",
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fmt(id: &str, vcodec: &str, acodec: &str, height: u32, tbr: f64, abr: f64) -> Value {
        json!({
            "format_id": id,
            "url": format!("https://cdn.test/{id}"),
            "ext": "mp4",
            "vcodec": vcodec,
            "acodec": acodec,
            "height": height,
            "tbr": tbr,
            "abr": abr,
        })
    }

    fn sample_info() -> Value {
        json!({
            "title": "clip",
            "extractor": "youtube",
            "duration": 60,
            "webpage_url": "https://y.test/w",
            "formats": [
                fmt("prog-low", "avc1", "mp4a", 360, 700.0, 0.0),
                fmt("prog-high", "avc1", "mp4a", 1080, 2500.0, 0.0),
                fmt("video-4k", "vp9", "none", 2160, 9000.0, 0.0),
                fmt("audio-160", "none", "opus", 0, 160.0, 160.0),
                fmt("audio-64", "none", "opus", 0, 64.0, 64.0),
                { "format_id": "no-url", "vcodec": "avc1", "acodec": "mp4a", "height": 4320 },
            ]
        })
    }

    #[test]
    fn picks_best_of_each_class() {
        let links = build_direct_links(&sample_info());
        assert_eq!(links["direct"]["progressive"]["format_id"], "prog-high");
        assert_eq!(links["direct"]["video_only"]["format_id"], "video-4k");
        assert_eq!(links["direct"]["audio_only"]["format_id"], "audio-160");
        assert_eq!(links["direct"]["audio_only"]["abr"], 160.0);
    }

    #[test]
    fn missing_classes_become_null() {
        let info = json!({ "title": "t", "formats": [fmt("a", "none", "opus", 0, 64.0, 64.0)] });
        let links = build_direct_links(&info);
        assert!(links["direct"]["progressive"].is_null());
        assert!(links["direct"]["video_only"].is_null());
        assert_eq!(links["direct"]["audio_only"]["format_id"], "a");
    }

    #[test]
    fn formats_without_url_are_skipped() {
        let links = build_direct_links(&sample_info());
        assert_ne!(links["direct"]["progressive"]["format_id"], "no-url");
    }

    #[test]
    fn playlist_collapses_to_first_entry() {
        let wrapped = json!({
            "_type": "playlist",
            "entries": [null, { "title": "first", "formats": [] }]
        });
        let collapsed = collapse_playlist(wrapped);
        assert_eq!(collapsed["title"], "first");
    }

    #[test]
    fn non_playlist_passes_through() {
        let info = json!({ "title": "plain" });
        assert_eq!(collapse_playlist(info.clone()), info);
    }
}
