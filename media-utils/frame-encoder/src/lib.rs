//! Encode a directory of sequentially numbered image frames into a video by
//! running ffmpeg.
//!
//! ```no_run
//! use std::num::NonZeroU32;
//! use frame_encoder::{EncodeRequest, EncoderConfig, FrameEncoder};
//!
//! let fps = NonZeroU32::new(24).unwrap();
//! let request = EncodeRequest::new("/tmp/frames", "/tmp/out.mp4", fps);
//! let saved = FrameEncoder::new(EncoderConfig::default()).encode(&request)?;
//! println!("{saved}");
//! # Ok::<(), frame_encoder::Error>(())
//! ```
use std::{fmt, num::NonZeroU32};

use camino::{Utf8Path, Utf8PathBuf};

mod command;
mod config;
mod frame_set;
mod launcher;

pub use command::EncoderCommand;
pub use config::{
    DEFAULT_CODEC, DEFAULT_CRF, DEFAULT_PIX_FMT, DEFAULT_PROGRAM, EncoderConfig, FrameNaming,
    parse_config_file, parse_config_str,
};
pub use frame_set::FrameSet;
pub use launcher::{CommandOutput, ProcessLauncher, SystemLauncher};

/// Frame rate used when none is given.
pub const DEFAULT_FPS: u32 = 30;

#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("Frames directory \"{path}\" does not exist")]
    DirectoryNotFound { path: Utf8PathBuf },
    #[error("No {extension} frames found in '{path}'")]
    NoFramesFound {
        path: Utf8PathBuf,
        extension: String,
    },
    #[error("reading frames directory \"{path}\": {source}")]
    ReadDir {
        path: Utf8PathBuf,
        source: std::io::Error,
    },
    #[error("could not launch {program}: {source}")]
    LaunchFailed {
        program: String,
        source: std::io::Error,
    },
    #[error("{program} failed with {status}: {diagnostic}")]
    EncodeFailed {
        program: String,
        status: ExitStatusCode,
        diagnostic: String,
    },
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML deserialization error: {0}")]
    TomlDe(#[from] toml::de::Error),
    #[error("invalid encoder config: {0}")]
    InvalidConfig(String),
}

impl Error {
    /// True for failures detected before any encoder process was launched.
    pub fn is_precondition_failure(&self) -> bool {
        matches!(
            self,
            Error::DirectoryNotFound { .. } | Error::NoFramesFound { .. }
        )
    }
}

pub type Result<T> = std::result::Result<T, Error>;

/// Exit code of the encoder process, `None` if killed by a signal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExitStatusCode(pub Option<i32>);

impl fmt::Display for ExitStatusCode {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self.0 {
            Some(code) => write!(f, "exit code {code}"),
            None => write!(f, "no exit code (terminated by signal)"),
        }
    }
}

/// Inputs to a single [FrameEncoder::encode] call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncodeRequest {
    frames_dir: Utf8PathBuf,
    output_path: Utf8PathBuf,
    fps: NonZeroU32,
}

impl EncodeRequest {
    pub fn new(
        frames_dir: impl Into<Utf8PathBuf>,
        output_path: impl Into<Utf8PathBuf>,
        fps: NonZeroU32,
    ) -> Self {
        Self {
            frames_dir: frames_dir.into(),
            output_path: output_path.into(),
            fps,
        }
    }

    pub fn frames_dir(&self) -> &Utf8Path {
        &self.frames_dir
    }

    pub fn output_path(&self) -> &Utf8Path {
        &self.output_path
    }

    pub fn fps(&self) -> NonZeroU32 {
        self.fps
    }
}

/// A video was written.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncodeSuccess {
    pub output_path: Utf8PathBuf,
    /// Number of frame files present when encoding started.
    pub n_frames: usize,
}

impl fmt::Display for EncodeSuccess {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "Video saved as {}", self.output_path)
    }
}

/// Turns a directory of frames into a video using an external encoder.
pub struct FrameEncoder<L = SystemLauncher> {
    cfg: EncoderConfig,
    launcher: L,
}

impl FrameEncoder<SystemLauncher> {
    pub fn new(cfg: EncoderConfig) -> Self {
        Self::with_launcher(cfg, SystemLauncher)
    }
}

impl<L: ProcessLauncher> FrameEncoder<L> {
    pub fn with_launcher(cfg: EncoderConfig, launcher: L) -> Self {
        Self { cfg, launcher }
    }

    pub fn config(&self) -> &EncoderConfig {
        &self.cfg
    }

    pub fn launcher(&self) -> &L {
        &self.launcher
    }

    /// Check that the frames directory exists and holds at least one frame.
    pub fn check_preconditions(&self, request: &EncodeRequest) -> Result<FrameSet> {
        FrameSet::scan(request.frames_dir(), &self.cfg.naming)
    }

    /// Build the encoder invocation for `request` without touching the
    /// filesystem.
    pub fn build_command(&self, request: &EncodeRequest) -> EncoderCommand {
        let cfg = &self.cfg;
        let mut cmd = EncoderCommand::new(&cfg.program);
        if cfg.overwrite {
            cmd = cmd.arg("-y");
        }
        cmd.flag("-framerate", request.fps().to_string())
            .flag(
                "-i",
                cfg.naming.input_pattern(request.frames_dir()).into_string(),
            )
            .flag("-c:v", &cfg.codec)
            .flag("-pix_fmt", &cfg.pix_fmt)
            .flag("-crf", cfg.crf.to_string())
            .arg(request.output_path().as_str())
    }

    /// Validate the frames directory, run the encoder and wait for it.
    ///
    /// Nothing is launched if a precondition fails. A partially written
    /// output file is left as the encoder left it.
    pub fn encode(&self, request: &EncodeRequest) -> Result<EncodeSuccess> {
        let frames = self.check_preconditions(request)?;
        let cmd = self.build_command(request);
        tracing::info!(
            "Encoding {} frame(s) from \"{}\" at {} fps",
            frames.len(),
            request.frames_dir(),
            request.fps()
        );
        tracing::debug!("Running: {cmd}");

        let output = self
            .launcher
            .run(&cmd)
            .map_err(|source| Error::LaunchFailed {
                program: cmd.program().to_string(),
                source,
            })?;

        if !output.success() {
            let status = ExitStatusCode(output.code);
            tracing::warn!("{} exited with {status}", cmd.program());
            return Err(Error::EncodeFailed {
                program: cmd.program().to_string(),
                status,
                diagnostic: output.diagnostic(),
            });
        }

        Ok(EncodeSuccess {
            output_path: request.output_path().to_owned(),
            n_frames: frames.len(),
        })
    }
}

/// Encode with the default configuration and the system launcher.
pub fn encode(
    frames_dir: impl Into<Utf8PathBuf>,
    output_path: impl Into<Utf8PathBuf>,
    fps: NonZeroU32,
) -> Result<EncodeSuccess> {
    let request = EncodeRequest::new(frames_dir, output_path, fps);
    FrameEncoder::new(EncoderConfig::default()).encode(&request)
}
