//! Container probing: extract stream geometry from a staged video file.

use serde::Deserialize;
use std::path::Path;
use std::sync::Arc;
use vidvault_core::models::Orientation;
use vidvault_core::AppError;

use crate::runner::{SubprocessRunner, ToolError};

/// Geometry of the first video stream of a staged file.
///
/// Never mutated after creation; orientation is a pure function of the
/// width/height ratio.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ContainerProfile {
    pub width: u32,
    pub height: u32,
}

impl ContainerProfile {
    pub fn orientation(&self) -> Orientation {
        Orientation::classify(self.width, self.height)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ProbeError {
    #[error("probe tool exited with an error: {stderr}")]
    ToolFailed { stderr: String },

    #[error(transparent)]
    Tool(#[from] ToolError),

    #[error("unparseable probe output: {0}")]
    InvalidOutput(#[from] serde_json::Error),

    #[error("no video stream present")]
    NoVideoStream,

    #[error("video stream is missing dimensions")]
    MissingDimensions,
}

impl From<ProbeError> for AppError {
    fn from(err: ProbeError) -> Self {
        AppError::Probe(err.to_string())
    }
}

#[derive(Debug, Deserialize)]
struct ProbeOutput {
    #[serde(default)]
    streams: Vec<ProbeStream>,
}

#[derive(Debug, Deserialize)]
struct ProbeStream {
    width: Option<u32>,
    height: Option<u32>,
}

/// Invokes the container inspection tool (ffprobe) in structured-output mode
/// and parses the first video stream's geometry.
pub struct ContainerProber {
    runner: Arc<dyn SubprocessRunner>,
    ffprobe_path: String,
}

impl ContainerProber {
    pub fn new(runner: Arc<dyn SubprocessRunner>, ffprobe_path: String) -> Self {
        Self {
            runner,
            ffprobe_path,
        }
    }

    pub async fn probe(&self, video_path: &Path) -> Result<ContainerProfile, ProbeError> {
        let args = vec![
            "-v".to_string(),
            "error".to_string(),
            "-print_format".to_string(),
            "json".to_string(),
            "-show_streams".to_string(),
            "-select_streams".to_string(),
            "v:0".to_string(),
            video_path.to_string_lossy().to_string(),
        ];

        let output = self.runner.run(&self.ffprobe_path, &args).await?;

        if !output.success {
            return Err(ProbeError::ToolFailed {
                stderr: output.stderr_lossy(),
            });
        }

        let parsed: ProbeOutput = serde_json::from_slice(&output.stdout)?;
        let stream = parsed.streams.first().ok_or(ProbeError::NoVideoStream)?;

        let (width, height) = stream
            .width
            .zip(stream.height)
            .ok_or(ProbeError::MissingDimensions)?;

        tracing::info!(
            path = %video_path.display(),
            width = width,
            height = height,
            "video probe completed"
        );

        Ok(ContainerProfile { width, height })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::sync::Mutex;

    use crate::runner::ToolOutput;

    struct FakeRunner {
        output: ToolOutput,
        calls: Mutex<Vec<(String, Vec<String>)>>,
    }

    impl FakeRunner {
        fn new(success: bool, stdout: &str, stderr: &str) -> Self {
            Self {
                output: ToolOutput {
                    success,
                    stdout: stdout.as_bytes().to_vec(),
                    stderr: stderr.as_bytes().to_vec(),
                },
                calls: Mutex::new(Vec::new()),
            }
        }
    }

    #[async_trait]
    impl SubprocessRunner for FakeRunner {
        async fn run(&self, program: &str, args: &[String]) -> Result<ToolOutput, ToolError> {
            self.calls
                .lock()
                .unwrap()
                .push((program.to_string(), args.to_vec()));
            Ok(self.output.clone())
        }
    }

    fn prober(runner: FakeRunner) -> ContainerProber {
        ContainerProber::new(Arc::new(runner), "ffprobe".to_string())
    }

    #[tokio::test]
    async fn test_parses_first_stream_geometry() {
        let stdout = r#"{"streams":[{"width":1920,"height":1080,"codec_name":"h264"}]}"#;
        let profile = prober(FakeRunner::new(true, stdout, ""))
            .probe(Path::new("/tmp/in.mp4"))
            .await
            .expect("probe");
        assert_eq!(profile.width, 1920);
        assert_eq!(profile.height, 1080);
        assert_eq!(profile.orientation(), Orientation::Landscape);
    }

    #[tokio::test]
    async fn test_requests_structured_output_for_first_video_stream() {
        let stdout = r#"{"streams":[{"width":640,"height":480}]}"#;
        let runner = Arc::new(FakeRunner::new(true, stdout, ""));
        let prober = ContainerProber::new(runner.clone(), "ffprobe".to_string());
        prober.probe(Path::new("/tmp/in.mp4")).await.expect("probe");

        let calls = runner.calls.lock().unwrap();
        let (program, args) = &calls[0];
        assert_eq!(program, "ffprobe");
        assert!(args.windows(2).any(|w| w == ["-print_format", "json"]));
        assert!(args.windows(2).any(|w| w == ["-select_streams", "v:0"]));
        assert_eq!(args.last().unwrap(), "/tmp/in.mp4");
    }

    #[tokio::test]
    async fn test_nonzero_exit_is_tool_failure() {
        let err = prober(FakeRunner::new(false, "", "moov atom not found"))
            .probe(Path::new("/tmp/in.mp4"))
            .await
            .expect_err("must fail");
        match err {
            ProbeError::ToolFailed { stderr } => assert!(stderr.contains("moov atom")),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[tokio::test]
    async fn test_no_streams_is_an_error() {
        let err = prober(FakeRunner::new(true, r#"{"streams":[]}"#, ""))
            .probe(Path::new("/tmp/in.mp4"))
            .await
            .expect_err("must fail");
        assert!(matches!(err, ProbeError::NoVideoStream));
    }

    #[tokio::test]
    async fn test_garbage_output_is_an_error() {
        let err = prober(FakeRunner::new(true, "not json at all", ""))
            .probe(Path::new("/tmp/in.mp4"))
            .await
            .expect_err("must fail");
        assert!(matches!(err, ProbeError::InvalidOutput(_)));
    }

    #[tokio::test]
    async fn test_stream_without_dimensions_is_an_error() {
        let err = prober(FakeRunner::new(true, r#"{"streams":[{"width":1920}]}"#, ""))
            .probe(Path::new("/tmp/in.mp4"))
            .await
            .expect_err("must fail");
        assert!(matches!(err, ProbeError::MissingDimensions));
    }
}
