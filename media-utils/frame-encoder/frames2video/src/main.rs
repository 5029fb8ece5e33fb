//! Stitch numbered frames (`frame_0001.ppm`, `frame_0002.ppm`, ...) into a
//! video with ffmpeg.
use std::num::NonZeroU32;

use camino::Utf8PathBuf;
use clap::Parser;
use eyre::{Context, Result};

use frame_encoder::{EncodeRequest, EncoderConfig, FrameEncoder};

mod logging;

/// Convert a directory of frames into a video.
///
/// The frames must be named `frame_0001.ppm`, `frame_0002.ppm`, ... (the
/// naming can be changed with a config file). Encoding uses libx264 with the
/// yuv420p pixel format and a CRF of 23 unless configured otherwise.
#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Cli {
    /// Directory containing the frames.
    input_dir: Utf8PathBuf,

    /// Output video file name (e.g. `mandelbrot.mp4`).
    output_file: Utf8PathBuf,

    /// Frames per second of the output video.
    #[arg(long, default_value_t = NonZeroU32::new(frame_encoder::DEFAULT_FPS).unwrap())]
    fps: NonZeroU32,

    /// TOML file with encoder settings.
    #[arg(long)]
    config: Option<Utf8PathBuf>,

    /// ffmpeg executable to run. Overrides the config file.
    #[arg(long, env = "FRAMES2VIDEO_FFMPEG")]
    ffmpeg: Option<String>,

    /// Overwrite the output file if it exists.
    #[arg(long)]
    overwrite: bool,

    /// Check the input and print the ffmpeg command without running it.
    #[arg(long)]
    dry_run: bool,

    /// Also write log messages to this file.
    #[arg(long)]
    log_file: Option<Utf8PathBuf>,
}

impl Cli {
    fn encoder_config(&self) -> Result<EncoderConfig> {
        let mut cfg = match &self.config {
            Some(path) => frame_encoder::parse_config_file(path)
                .with_context(|| format!("While reading config file \"{path}\""))?,
            None => EncoderConfig::default(),
        };
        if let Some(program) = &self.ffmpeg {
            cfg.program = program.clone();
        }
        if self.overwrite {
            cfg.overwrite = true;
        }
        Ok(cfg)
    }
}

fn run_cli(cli: Cli) -> Result<String> {
    let cfg = cli.encoder_config()?;
    let encoder = FrameEncoder::new(cfg);
    let request = EncodeRequest::new(cli.input_dir, cli.output_file, cli.fps);

    if cli.dry_run {
        let frames = encoder.check_preconditions(&request)?;
        tracing::info!("{} frame(s) found in \"{}\"", frames.len(), frames.dir());
        return Ok(encoder.build_command(&request).to_string());
    }

    let saved = encoder.encode(&request)?;
    Ok(saved.to_string())
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    logging::initiate_logging(cli.log_file.as_deref())?;
    let msg = run_cli(cli)?;
    println!("{msg}");
    Ok(())
}

#[cfg(test)]
mod test {
    use super::*;
    use test_log::test;

    fn utf8_tempdir() -> Result<(tempfile::TempDir, Utf8PathBuf)> {
        let tempdir = tempfile::tempdir()?;
        let path = Utf8PathBuf::from_path_buf(tempdir.path().to_path_buf())
            .map_err(|p| eyre::eyre!("non-UTF8 temp path {}", p.display()))?;
        Ok((tempdir, path))
    }

    #[test]
    fn test_parse_defaults() {
        let cli = Cli::try_parse_from(["frames2video", "frames", "out.mp4"]).unwrap();
        assert_eq!(cli.input_dir, "frames");
        assert_eq!(cli.output_file, "out.mp4");
        assert_eq!(cli.fps.get(), 30);
        assert!(!cli.overwrite);
        assert!(!cli.dry_run);
    }

    #[test]
    fn test_parse_fps() {
        let cli =
            Cli::try_parse_from(["frames2video", "frames", "out.mp4", "--fps", "24"]).unwrap();
        assert_eq!(cli.fps.get(), 24);

        assert!(Cli::try_parse_from(["frames2video", "frames", "out.mp4", "--fps", "0"]).is_err());
        assert!(Cli::try_parse_from(["frames2video", "frames", "out.mp4", "--fps", "x"]).is_err());
        assert!(Cli::try_parse_from(["frames2video", "frames"]).is_err());
    }

    #[test]
    fn test_flags_override_config_file() -> Result<()> {
        let (_tempdir, dir) = utf8_tempdir()?;
        let cfg_path = dir.join("encoder.toml");
        std::fs::write(&cfg_path, "program = \"ffmpeg-from-config\"\ncrf = 28\n")?;

        let cli = Cli::try_parse_from([
            "frames2video",
            "frames",
            "out.mp4",
            "--config",
            cfg_path.as_str(),
            "--ffmpeg",
            "/opt/bin/ffmpeg",
            "--overwrite",
        ])?;
        let cfg = cli.encoder_config()?;
        assert_eq!(cfg.program, "/opt/bin/ffmpeg");
        assert_eq!(cfg.crf, 28);
        assert!(cfg.overwrite);
        Ok(())
    }

    #[test]
    fn test_dry_run_prints_command() -> Result<()> {
        let (_tempdir, dir) = utf8_tempdir()?;
        std::fs::write(dir.join("frame_0001.ppm"), b"P6")?;
        let output = dir.join("out.mp4");
        let cli = Cli::try_parse_from([
            "frames2video",
            dir.as_str(),
            output.as_str(),
            "--fps",
            "24",
            "--ffmpeg",
            "ffmpeg",
            "--dry-run",
        ])?;
        let msg = run_cli(cli)?;
        assert!(msg.starts_with("ffmpeg -framerate 24 -i "), "{msg}");
        assert!(msg.contains("frame_%04d.ppm"), "{msg}");
        assert!(msg.ends_with(output.as_str()), "{msg}");
        Ok(())
    }

    #[test]
    fn test_missing_dir_is_error() -> Result<()> {
        let (_tempdir, dir) = utf8_tempdir()?;
        let missing = dir.join("nope");
        let cli = Cli::try_parse_from([
            "frames2video",
            missing.as_str(),
            "out.mp4",
            "--ffmpeg",
            "ffmpeg",
        ])?;
        let err = run_cli(cli).unwrap_err();
        let err = err.downcast_ref::<frame_encoder::Error>().unwrap();
        assert!(matches!(err, frame_encoder::Error::DirectoryNotFound { .. }));
        Ok(())
    }
}
