//! Fast-start remuxing of staged MP4 uploads.
//!
//! Consumer MP4s usually carry the moov atom at the end of the file, which
//! forces a full download before playback can begin. Remuxing moves it to
//! the front without re-encoding, so the copy is cheap and lossless.

use std::path::Path;
use std::sync::Arc;
use tempfile::TempPath;
use vidvault_core::AppError;

use crate::runner::{SubprocessRunner, ToolError};

#[derive(Debug, thiserror::Error)]
pub enum RemuxError {
    #[error("remux tool exited with an error: {stderr}")]
    ToolFailed { stderr: String },

    #[error(transparent)]
    Tool(#[from] ToolError),
}

impl From<RemuxError> for AppError {
    fn from(err: RemuxError) -> Self {
        AppError::Remux(err.to_string())
    }
}

/// Rewrites a staged MP4 with the moov atom at the front of the file.
///
/// The output lands next to the input with a `.faststart.mp4` suffix and is
/// returned as a [`TempPath`] so it is deleted on drop once the caller is
/// done with it.
pub struct FastStartRemuxer {
    runner: Arc<dyn SubprocessRunner>,
    ffmpeg_path: String,
}

impl FastStartRemuxer {
    pub fn new(runner: Arc<dyn SubprocessRunner>, ffmpeg_path: String) -> Self {
        Self {
            runner,
            ffmpeg_path,
        }
    }

    pub async fn remux(&self, input: &Path) -> Result<TempPath, RemuxError> {
        let output = format!("{}.faststart.mp4", input.display());

        let args = vec![
            "-y".to_string(),
            "-i".to_string(),
            input.to_string_lossy().to_string(),
            "-c".to_string(),
            "copy".to_string(),
            "-movflags".to_string(),
            "faststart".to_string(),
            "-f".to_string(),
            "mp4".to_string(),
            output.clone(),
        ];

        let result = self.runner.run(&self.ffmpeg_path, &args).await?;

        if !result.success {
            // The tool may have left a partial output behind.
            let _ = tokio::fs::remove_file(&output).await;
            return Err(RemuxError::ToolFailed {
                stderr: result.stderr_lossy(),
            });
        }

        tracing::info!(
            input = %input.display(),
            output = %output,
            "fast-start remux completed"
        );

        Ok(TempPath::from_path(output))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;

    use crate::runner::ToolOutput;

    /// Pretends to be ffmpeg: on success it creates the output file named by
    /// the last argument, on failure it leaves a partial file behind.
    struct FakeFfmpeg {
        success: bool,
        stderr: &'static str,
    }

    #[async_trait]
    impl SubprocessRunner for FakeFfmpeg {
        async fn run(&self, _program: &str, args: &[String]) -> Result<ToolOutput, ToolError> {
            let output = args.last().expect("output path argument");
            std::fs::write(output, b"remuxed").expect("write output");
            Ok(ToolOutput {
                success: self.success,
                stdout: Vec::new(),
                stderr: self.stderr.as_bytes().to_vec(),
            })
        }
    }

    #[tokio::test]
    async fn test_success_yields_output_deleted_on_drop() {
        let input = tempfile::NamedTempFile::new().expect("input");
        let remuxer = FastStartRemuxer::new(
            Arc::new(FakeFfmpeg {
                success: true,
                stderr: "",
            }),
            "ffmpeg".to_string(),
        );

        let output = remuxer.remux(input.path()).await.expect("remux");
        let output_path = output.to_path_buf();
        assert!(output_path.exists());
        assert!(output_path.to_string_lossy().ends_with(".faststart.mp4"));

        drop(output);
        assert!(!output_path.exists());
    }

    #[tokio::test]
    async fn test_tool_failure_removes_partial_output() {
        let input = tempfile::NamedTempFile::new().expect("input");
        let expected_output = format!("{}.faststart.mp4", input.path().display());
        let remuxer = FastStartRemuxer::new(
            Arc::new(FakeFfmpeg {
                success: false,
                stderr: "invalid data found when processing input",
            }),
            "ffmpeg".to_string(),
        );

        let err = remuxer.remux(input.path()).await.expect_err("must fail");
        match err {
            RemuxError::ToolFailed { stderr } => assert!(stderr.contains("invalid data")),
            other => panic!("unexpected error: {other}"),
        }
        assert!(!Path::new(&expected_output).exists());
    }
}
