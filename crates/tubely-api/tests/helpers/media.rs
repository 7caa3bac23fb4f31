use async_trait::async_trait;
use axum_test::multipart::{MultipartForm, Part};
use std::ffi::OsString;
use std::sync::Mutex;
use std::time::Duration;
use tubely_processing::{CommandOutput, CommandRunner, ProcessingResult};

/// Stand-in for ffprobe/ffmpeg over files whose content starts with `WxH`.
///
/// ffprobe reports those dimensions and rejects anything else as invalid data. ffmpeg
/// copies its `-i` input to its last argument.
#[derive(Default)]
pub struct FakeMediaRunner {
    calls: Mutex<Vec<String>>,
}

impl FakeMediaRunner {
    /// Programs invoked so far, in order.
    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }
}

fn output(success: bool, stdout: String, stderr: String) -> CommandOutput {
    CommandOutput {
        success,
        status_code: Some(if success { 0 } else { 1 }),
        stdout: stdout.into_bytes(),
        stderr: stderr.into_bytes(),
    }
}

#[async_trait]
impl CommandRunner for FakeMediaRunner {
    async fn run(
        &self,
        program: &str,
        args: &[OsString],
        _timeout: Duration,
    ) -> ProcessingResult<CommandOutput> {
        self.calls.lock().unwrap().push(program.to_string());
        let args: Vec<String> = args
            .iter()
            .map(|a| a.to_string_lossy().into_owned())
            .collect();

        if program.ends_with("ffprobe") {
            let input = args.last().cloned().unwrap_or_default();
            let content = std::fs::read(&input).unwrap_or_default();
            let head = String::from_utf8_lossy(&content);
            let dims = head
                .split_whitespace()
                .next()
                .and_then(|t| t.split_once('x'))
                .and_then(|(w, h)| Some((w.parse::<u32>().ok()?, h.parse::<u32>().ok()?)));
            return Ok(match dims {
                Some((w, h)) => output(
                    true,
                    format!(
                        r#"{{"streams":[{{"codec_type":"video","width":{},"height":{}}}]}}"#,
                        w, h
                    ),
                    String::new(),
                ),
                None => output(
                    false,
                    String::new(),
                    format!("{}: Invalid data found when processing input", input),
                ),
            });
        }

        let input = args
            .iter()
            .position(|a| a == "-i")
            .and_then(|i| args.get(i + 1))
            .cloned()
            .unwrap_or_default();
        let target = args.last().cloned().unwrap_or_default();
        Ok(match std::fs::copy(&input, &target) {
            Ok(_) => output(true, String::new(), String::new()),
            Err(e) => output(false, String::new(), e.to_string()),
        })
    }
}

/// Bytes the fake ffprobe reads as a `width`x`height` video.
pub fn fake_mp4(width: u32, height: u32) -> Vec<u8> {
    format!("{}x{} fake mp4 payload", width, height).into_bytes()
}

pub fn video_form(data: Vec<u8>, mime: &str) -> MultipartForm {
    MultipartForm::new().add_part(
        "video",
        Part::bytes(data).file_name("boots.mp4").mime_type(mime),
    )
}

pub fn thumbnail_form(data: Vec<u8>, mime: &str) -> MultipartForm {
    MultipartForm::new().add_part(
        "thumbnail",
        Part::bytes(data).file_name("thumb.png").mime_type(mime),
    )
}
