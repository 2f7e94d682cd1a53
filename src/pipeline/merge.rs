//! Lossless clip concatenation through an external ffmpeg binary.

use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::time::Duration;

use anyhow::{Context, Result, ensure};
use tempfile::NamedTempFile;
use tokio::process::Command;
use tracing::{debug, info};

use crate::audio::Clip;
use crate::pipeline::PipelineError;

/// Default number of seconds one merge invocation may take.
pub const DEFAULT_MERGE_TIMEOUT_SECS: u64 = 60;

/// Concatenates finished clips into one file via ffmpeg's concat demuxer.
///
/// The audio stream is copied, never re-encoded, so merging the same clips
/// twice produces the same audio content.
#[derive(Debug, Clone)]
pub struct MergeOrchestrator {
    ffmpeg_bin: String, // Binary name or path, resolved through PATH
    timeout: Duration,  // Hard cap on one merge invocation
}

impl MergeOrchestrator {
    pub fn new(ffmpeg_bin: impl Into<String>, timeout: Duration) -> Self {
        Self { ffmpeg_bin: ffmpeg_bin.into(), timeout }
    }

    /// Merge `clips` in slice order into `output`.
    ///
    /// The concat manifest is a temporary file next to the clips and is
    /// removed as soon as the tool exits, pass or fail. A non-zero exit, a
    /// missing binary and a timeout each map to their own
    /// [`PipelineError`] variant; none of them is retried.
    pub async fn merge(&self, clips: &[Clip], output: &Path) -> Result<()> {
        ensure!(!clips.is_empty(), "no clips to merge");
        if let Some(parent) = output.parent()
            && !parent.as_os_str().is_empty()
        {
            std::fs::create_dir_all(parent).with_context(|| format!("creating merge directory {}", parent.display()))?;
        }

        let manifest = write_manifest(clips)?;
        self.run_tool(manifest.path(), output).await?;
        info!("🔊 Merged {} clip(s) into {}", clips.len(), output.display());
        Ok(())
    }

    async fn run_tool(&self, manifest: &Path, output: &Path) -> Result<()> {
        let mut cmd = Command::new(&self.ffmpeg_bin);
        cmd.args(["-hide_banner", "-ignore_unknown", "-y", "-f", "concat", "-safe", "0", "-i"])
            .arg(manifest)
            .args(["-c:a", "copy"])
            .arg(output)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);
        #[cfg(windows)]
        cmd.creation_flags(0x0800_0000); // CREATE_NO_WINDOW

        debug!("Running {} -> {}", self.ffmpeg_bin, output.display());
        let out = match tokio::time::timeout(self.timeout, cmd.output()).await {
            Ok(result) => {
                result.map_err(|source| PipelineError::MergeToolUnavailable { bin: self.ffmpeg_bin.clone(), source })?
            }
            Err(_) => return Err(PipelineError::MergeTimeout { timeout: self.timeout }.into()),
        };
        if !out.status.success() {
            let stderr = String::from_utf8_lossy(&out.stderr).trim().to_string();
            return Err(PipelineError::MergeToolFailed { status: out.status, stderr }.into());
        }
        Ok(())
    }
}

/// Write a concat-demuxer manifest listing each clip on its own line.
///
/// The demuxer resolves relative entries against the manifest's directory,
/// so entries are written as absolute paths.
fn write_manifest(clips: &[Clip]) -> Result<NamedTempFile> {
    let dir = clips[0].path.parent().map(Path::to_path_buf).unwrap_or_else(|| PathBuf::from("."));
    let mut manifest = tempfile::Builder::new()
        .prefix("concat-")
        .suffix(".txt")
        .tempfile_in(&dir)
        .with_context(|| format!("creating concat manifest in {}", dir.display()))?;
    for clip in clips {
        let path = std::path::absolute(&clip.path).with_context(|| format!("resolving {}", clip.path.display()))?;
        debug!("Manifest entry {}: {}", clip.index, path.display());
        writeln!(manifest, "file '{}'", escape_concat_path(&path))?;
    }
    manifest.flush()?;
    Ok(manifest)
}

/// Quote a path for a single-quoted concat manifest entry.
fn escape_concat_path(path: &Path) -> String {
    path.to_string_lossy().replace('\'', r"'\''")
}

/// Whether `bin` resolves to an executable file, either directly or on PATH.
pub fn command_exists(bin: &str) -> bool {
    let path = Path::new(bin);
    if path.components().count() > 1 {
        return path.is_file();
    }
    std::env::var_os("PATH")
        .map(|paths| std::env::split_paths(&paths).any(|dir| dir.join(bin).is_file()))
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn clip(path: &Path, index: usize) -> Clip {
        Clip { index, path: path.to_path_buf(), samples: 1 }
    }

    fn touch(path: &Path) {
        std::fs::write(path, b"").unwrap();
    }

    #[test]
    fn manifest_lists_clips_in_order_with_quoting() {
        let dir = tempfile::tempdir().unwrap();
        let first = dir.path().join("a_0_t.wav");
        let second = dir.path().join("it's_1_t.wav");
        touch(&first);
        touch(&second);

        let manifest = write_manifest(&[clip(&first, 0), clip(&second, 1)]).unwrap();
        assert!(manifest.path().starts_with(dir.path()));

        let body = std::fs::read_to_string(manifest.path()).unwrap();
        let lines: Vec<&str> = body.lines().collect();
        assert_eq!(lines.len(), 2);
        assert!(lines[0].starts_with("file '") && lines[0].contains("a_0_t.wav"), "line: {}", lines[0]);
        assert!(lines[1].contains(r"it'\''s_1_t.wav"), "line: {}", lines[1]);
    }

    #[test]
    fn command_exists_rejects_nonsense() {
        assert!(!command_exists("definitely-not-a-real-binary-xyz"));
        assert!(!command_exists("/definitely/not/here/ffmpeg-xyz"));
    }

    #[tokio::test]
    async fn missing_binary_reports_unavailable() {
        let dir = tempfile::tempdir().unwrap();
        let wav = dir.path().join("a_0_t.wav");
        touch(&wav);

        let merger = MergeOrchestrator::new("/definitely/not/here/ffmpeg-xyz", Duration::from_secs(5));
        let err = merger.merge(&[clip(&wav, 0)], &dir.path().join("out.wav")).await.unwrap_err();
        match err.downcast_ref::<PipelineError>() {
            Some(PipelineError::MergeToolUnavailable { bin, .. }) => assert!(bin.contains("ffmpeg-xyz")),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn refuses_to_merge_nothing() {
        let merger = MergeOrchestrator::new("ffmpeg", Duration::from_secs(5));
        assert!(merger.merge(&[], Path::new("out.wav")).await.is_err());
    }

    #[cfg(unix)]
    mod with_stub_tool {
        use super::*;
        use std::os::unix::fs::PermissionsExt;

        fn fake_tool(dir: &Path, script: &str) -> PathBuf {
            let path = dir.join("fake-ffmpeg");
            std::fs::write(&path, script).unwrap();
            std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755)).unwrap();
            path
        }

        #[tokio::test]
        async fn nonzero_exit_reports_failure_with_stderr() {
            let dir = tempfile::tempdir().unwrap();
            let wav = dir.path().join("a_0_t.wav");
            touch(&wav);

            let tool = fake_tool(dir.path(), "#!/bin/sh\necho boom >&2\nexit 1\n");
            let merger = MergeOrchestrator::new(tool.to_string_lossy(), Duration::from_secs(5));
            let err = merger.merge(&[clip(&wav, 0)], &dir.path().join("out.wav")).await.unwrap_err();
            match err.downcast_ref::<PipelineError>() {
                Some(PipelineError::MergeToolFailed { status, stderr }) => {
                    assert!(!status.success());
                    assert!(stderr.contains("boom"), "stderr: {stderr}");
                }
                other => panic!("unexpected error: {other:?}"),
            }
        }

        #[tokio::test]
        async fn slow_tool_times_out() {
            let dir = tempfile::tempdir().unwrap();
            let wav = dir.path().join("a_0_t.wav");
            touch(&wav);

            let tool = fake_tool(dir.path(), "#!/bin/sh\nsleep 5\n");
            let merger = MergeOrchestrator::new(tool.to_string_lossy(), Duration::from_millis(100));
            let err = merger.merge(&[clip(&wav, 0)], &dir.path().join("out.wav")).await.unwrap_err();
            match err.downcast_ref::<PipelineError>() {
                Some(PipelineError::MergeTimeout { timeout }) => assert_eq!(*timeout, Duration::from_millis(100)),
                other => panic!("unexpected error: {other:?}"),
            }
        }

        #[tokio::test]
        async fn manifest_is_gone_and_output_dir_created_after_merge() {
            let dir = tempfile::tempdir().unwrap();
            let wav = dir.path().join("a_0_t.wav");
            touch(&wav);

            // Touches its last argument, like a merge that succeeds.
            let tool = fake_tool(dir.path(), "#!/bin/sh\nfor last; do :; done\n: > \"$last\"\n");
            let merger = MergeOrchestrator::new(tool.to_string_lossy(), Duration::from_secs(5));
            let out = dir.path().join("merge/out.wav");
            merger.merge(&[clip(&wav, 0)], &out).await.unwrap();

            assert!(out.is_file());
            let leftovers: Vec<_> = std::fs::read_dir(dir.path())
                .unwrap()
                .filter_map(|e| e.ok())
                .map(|e| e.path())
                .filter(|p| p.extension().is_some_and(|ext| ext == "txt"))
                .collect();
            assert!(leftovers.is_empty(), "manifest should be deleted: {leftovers:?}");
        }
    }
}
