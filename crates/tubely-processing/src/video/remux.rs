use std::ffi::OsString;
use std::sync::Arc;
use std::time::Duration;

use crate::command::{tool_name, validate_tool_path, CommandRunner};
use crate::error::{ProcessingError, ProcessingResult};
use crate::staging::{ProcessedFile, StagedFile};

const PROCESSING_SUFFIX: &str = ".processing";

/// Moves the moov atom to the front of an mp4 without re-encoding
#[derive(Clone)]
pub struct FastStartRemuxer {
    runner: Arc<dyn CommandRunner>,
    ffmpeg_path: String,
    timeout: Duration,
}

impl FastStartRemuxer {
    pub fn new(
        runner: Arc<dyn CommandRunner>,
        ffmpeg_path: String,
        timeout: Duration,
    ) -> ProcessingResult<Self> {
        validate_tool_path(&ffmpeg_path)?;
        Ok(Self {
            runner,
            ffmpeg_path,
            timeout,
        })
    }

    /// Copy every stream of `staged` into a new file next to it with fast-start enabled.
    #[tracing::instrument(skip(self, staged), fields(
        process.executable.name = "ffmpeg",
        process.executable.path = %self.ffmpeg_path,
        ffmpeg.operation = "faststart",
        input_size_bytes = staged.size()
    ))]
    pub async fn remux<'a>(&self, staged: &'a StagedFile) -> ProcessingResult<ProcessedFile<'a>> {
        let start = std::time::Instant::now();
        let tool = tool_name(&self.ffmpeg_path);

        let input_name = staged
            .path()
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or("upload");
        // Removed on drop if anything below fails.
        let output = ProcessedFile::reserve(staged, &format!("{}{}", input_name, PROCESSING_SUFFIX));

        let mut args: Vec<OsString> = Vec::with_capacity(16);
        args.extend(["-v", "error", "-y", "-i"].map(OsString::from));
        args.push(staged.path().as_os_str().to_os_string());
        args.extend(
            ["-map", "0", "-c", "copy", "-movflags", "+faststart", "-f", "mp4"].map(OsString::from),
        );
        args.push(output.path().as_os_str().to_os_string());

        self.runner
            .run(&self.ffmpeg_path, &args, self.timeout)
            .await?
            .into_result(&tool)?;

        let size = output.size().await.map_err(|_| ProcessingError::MalformedOutput {
            tool: tool.clone(),
            reason: "no output file was written".to_string(),
        })?;

        tracing::info!(
            output_size_bytes = size,
            duration_ms = start.elapsed().as_secs_f64() * 1000.0,
            "Video remuxed for fast start"
        );

        Ok(output)
    }
}
