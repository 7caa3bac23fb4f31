//! Command runner doubles for unit tests.

use async_trait::async_trait;
use bytes::Bytes;
use futures::Stream;
use std::ffi::OsString;
use std::path::Path;
use std::sync::Mutex;
use std::time::Duration;

use crate::command::{CommandOutput, CommandRunner};
use crate::error::{ProcessingError, ProcessingResult};

pub fn bytes_body(data: &'static [u8]) -> impl Stream<Item = Result<Bytes, ProcessingError>> + Send {
    futures::stream::iter(vec![Ok(Bytes::from_static(data))])
}

fn lossy(args: &[OsString]) -> Vec<String> {
    args.iter().map(|a| a.to_string_lossy().into_owned()).collect()
}

/// Returns the same output for every call.
pub struct CannedRunner {
    output: CommandOutput,
    calls: Mutex<Vec<Vec<String>>>,
}

impl CannedRunner {
    pub fn new(output: CommandOutput) -> Self {
        Self {
            output,
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn ok(stdout: &str) -> Self {
        Self::new(CommandOutput {
            success: true,
            status_code: Some(0),
            stdout: stdout.as_bytes().to_vec(),
            stderr: Vec::new(),
        })
    }

    pub fn last_args(&self) -> Vec<String> {
        self.calls.lock().unwrap().last().cloned().unwrap_or_default()
    }
}

#[async_trait]
impl CommandRunner for CannedRunner {
    async fn run(
        &self,
        _program: &str,
        args: &[OsString],
        _timeout: Duration,
    ) -> ProcessingResult<CommandOutput> {
        self.calls.lock().unwrap().push(lossy(args));
        Ok(self.output.clone())
    }
}

/// Behaves like ffprobe/ffmpeg over fake media files whose content starts with `WxH`.
///
/// ffprobe reports those dimensions (files without them are rejected as invalid data);
/// ffmpeg copies its `-i` input to the last argument.
#[derive(Default)]
pub struct ScriptedRunner {
    calls: Mutex<Vec<(String, Vec<String>)>>,
}

impl ScriptedRunner {
    pub fn calls(&self) -> Vec<(String, Vec<String>)> {
        self.calls.lock().unwrap().clone()
    }
}

fn failed(stderr: &str) -> CommandOutput {
    CommandOutput {
        success: false,
        status_code: Some(1),
        stdout: Vec::new(),
        stderr: stderr.as_bytes().to_vec(),
    }
}

fn succeeded(stdout: String) -> CommandOutput {
    CommandOutput {
        success: true,
        status_code: Some(0),
        stdout: stdout.into_bytes(),
        stderr: Vec::new(),
    }
}

#[async_trait]
impl CommandRunner for ScriptedRunner {
    async fn run(
        &self,
        program: &str,
        args: &[OsString],
        _timeout: Duration,
    ) -> ProcessingResult<CommandOutput> {
        let args = lossy(args);
        self.calls
            .lock()
            .unwrap()
            .push((program.to_string(), args.clone()));

        if program.ends_with("ffprobe") {
            let input = args.last().cloned().unwrap_or_default();
            let content = std::fs::read_to_string(Path::new(&input)).unwrap_or_default();
            let dims = content
                .split_whitespace()
                .next()
                .and_then(|token| token.split_once('x'))
                .and_then(|(w, h)| Some((w.parse::<u32>().ok()?, h.parse::<u32>().ok()?)));
            return Ok(match dims {
                Some((w, h)) => succeeded(format!(
                    r#"{{"streams":[{{"codec_type":"video","width":{},"height":{}}}]}}"#,
                    w, h
                )),
                None => failed(&format!("{}: Invalid data found when processing input", input)),
            });
        }

        let input = args
            .iter()
            .position(|a| a == "-i")
            .and_then(|i| args.get(i + 1))
            .cloned()
            .unwrap_or_default();
        let output = args.last().cloned().unwrap_or_default();
        match std::fs::copy(&input, &output) {
            Ok(_) => Ok(succeeded(String::new())),
            Err(e) => Ok(failed(&e.to_string())),
        }
    }
}
