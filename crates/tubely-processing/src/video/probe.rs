use serde::Deserialize;
use std::ffi::OsString;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use tubely_core::AspectRatio;

use crate::command::{tool_name, validate_tool_path, CommandRunner};
use crate::error::{ProcessingError, ProcessingResult};

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

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VideoDimensions {
    pub width: u32,
    pub height: u32,
}

impl VideoDimensions {
    pub fn aspect_ratio(&self) -> AspectRatio {
        AspectRatio::classify(self.width, self.height)
    }
}

/// Reads stream dimensions with ffprobe
#[derive(Clone)]
pub struct MediaProber {
    runner: Arc<dyn CommandRunner>,
    ffprobe_path: String,
    timeout: Duration,
}

impl MediaProber {
    pub fn new(
        runner: Arc<dyn CommandRunner>,
        ffprobe_path: String,
        timeout: Duration,
    ) -> ProcessingResult<Self> {
        validate_tool_path(&ffprobe_path)?;
        Ok(Self {
            runner,
            ffprobe_path,
            timeout,
        })
    }

    /// Width and height of the first video stream in `path`.
    #[tracing::instrument(skip(self), fields(
        process.executable.name = "ffprobe",
        process.executable.path = %self.ffprobe_path,
        ffmpeg.operation = "probe"
    ))]
    pub async fn probe(&self, path: &Path) -> ProcessingResult<VideoDimensions> {
        let start = std::time::Instant::now();
        let tool = tool_name(&self.ffprobe_path);

        let args: Vec<OsString> = [
            "-v",
            "error",
            "-print_format",
            "json",
            "-show_streams",
            "-select_streams",
            "v:0",
        ]
        .iter()
        .map(OsString::from)
        .chain(std::iter::once(path.as_os_str().to_os_string()))
        .collect();

        let output = self
            .runner
            .run(&self.ffprobe_path, &args, self.timeout)
            .await?
            .into_result(&tool)?;

        let parsed: ProbeOutput =
            serde_json::from_slice(&output.stdout).map_err(|e| ProcessingError::MalformedOutput {
                tool: tool.clone(),
                reason: e.to_string(),
            })?;

        let stream = parsed
            .streams
            .into_iter()
            .next()
            .ok_or(ProcessingError::NoVideoStream)?;

        let dimensions = match (stream.width, stream.height) {
            (Some(width), Some(height)) if width > 0 && height > 0 => {
                VideoDimensions { width, height }
            }
            _ => {
                return Err(ProcessingError::MalformedOutput {
                    tool,
                    reason: "video stream has no dimensions".to_string(),
                })
            }
        };

        tracing::info!(
            width = dimensions.width,
            height = dimensions.height,
            aspect_ratio = %dimensions.aspect_ratio(),
            duration_ms = start.elapsed().as_secs_f64() * 1000.0,
            "Video probed"
        );

        Ok(dimensions)
    }
}
