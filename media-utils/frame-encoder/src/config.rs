use camino::{Utf8Path, Utf8PathBuf};
use serde::{Deserialize, Serialize};

use crate::{Error, Result};

/// The default value for [EncoderConfig::program].
pub const DEFAULT_PROGRAM: &str = "ffmpeg";
/// The default value for [EncoderConfig::codec].
pub const DEFAULT_CODEC: &str = "libx264";
/// The default value for [EncoderConfig::pix_fmt].
pub const DEFAULT_PIX_FMT: &str = "yuv420p";
/// The default value for [EncoderConfig::crf]. Lower is better quality,
/// 18-28 is the useful range for libx264.
pub const DEFAULT_CRF: u8 = 23;

/// How frame files are named inside the frames directory.
///
/// The defaults describe `frame_0001.ppm`, `frame_0002.ppm`, ...
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FrameNaming {
    pub prefix: String,
    /// Width of the zero-padded frame index.
    pub digits: u8,
    /// File extension without the leading dot.
    pub extension: String,
}

impl Default for FrameNaming {
    fn default() -> Self {
        Self {
            prefix: "frame_".into(),
            digits: 4,
            extension: "ppm".into(),
        }
    }
}

impl FrameNaming {
    /// The file name suffix used to recognize frames, e.g. `.ppm`.
    pub fn suffix(&self) -> String {
        format!(".{}", self.extension.trim_start_matches('.'))
    }

    /// printf-style input pattern understood by ffmpeg's image2 demuxer.
    pub fn input_pattern(&self, frames_dir: &Utf8Path) -> Utf8PathBuf {
        frames_dir.join(format!(
            "{}%0{}d{}",
            self.prefix,
            self.digits,
            self.suffix()
        ))
    }
}

/// Encoder settings. Every field has a default so a config file only needs
/// to name what it changes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct EncoderConfig {
    /// Name or path of the ffmpeg executable.
    pub program: String,
    pub codec: String,
    pub pix_fmt: String,
    pub crf: u8,
    /// Replace an existing output file (passes `-y`).
    pub overwrite: bool,
    pub naming: FrameNaming,
}

impl Default for EncoderConfig {
    fn default() -> Self {
        Self {
            program: DEFAULT_PROGRAM.into(),
            codec: DEFAULT_CODEC.into(),
            pix_fmt: DEFAULT_PIX_FMT.into(),
            crf: DEFAULT_CRF,
            overwrite: false,
            naming: FrameNaming::default(),
        }
    }
}

impl EncoderConfig {
    fn validate(&self) -> Result<()> {
        if self.program.is_empty() {
            return Err(Error::InvalidConfig("`program` must not be empty".into()));
        }
        if self.naming.digits == 0 {
            return Err(Error::InvalidConfig(
                "`naming.digits` must be at least 1".into(),
            ));
        }
        if self.naming.extension.trim_start_matches('.').is_empty() {
            return Err(Error::InvalidConfig(
                "`naming.extension` must not be empty".into(),
            ));
        }
        Ok(())
    }
}

/// Parse TOML text into an [EncoderConfig].
pub fn parse_config_str(contents: &str) -> Result<EncoderConfig> {
    let cfg: EncoderConfig = toml::from_str(contents)?;
    cfg.validate()?;
    Ok(cfg)
}

/// Parse a `.toml` file and return an [EncoderConfig] structure.
pub fn parse_config_file<P: AsRef<std::path::Path>>(fname: P) -> Result<EncoderConfig> {
    let contents = std::fs::read_to_string(fname.as_ref())?;
    let cfg = parse_config_str(&contents)?;
    tracing::debug!(
        "Loaded encoder config from \"{}\": {cfg:?}",
        fname.as_ref().display()
    );
    Ok(cfg)
}
