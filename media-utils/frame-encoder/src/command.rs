use std::fmt;

/// A fully-described invocation of the external encoder.
///
/// This is a plain value so the exact arguments can be inspected (and
/// asserted in tests) before anything is launched.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncoderCommand {
    program: String,
    args: Vec<String>,
}

impl EncoderCommand {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
        }
    }

    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    /// Append a flag followed by its value, e.g. `-crf 23`.
    pub fn flag(self, flag: &str, value: impl Into<String>) -> Self {
        self.arg(flag).arg(value)
    }

    pub fn program(&self) -> &str {
        &self.program
    }

    pub fn args(&self) -> &[String] {
        &self.args
    }

    /// The value following `flag`, if `flag` is present.
    pub fn flag_value(&self, flag: &str) -> Option<&str> {
        self.args
            .iter()
            .position(|a| a == flag)
            .and_then(|i| self.args.get(i + 1))
            .map(String::as_str)
    }

    pub fn to_command(&self) -> std::process::Command {
        let mut cmd = std::process::Command::new(&self.program);
        cmd.args(&self.args);
        cmd
    }
}

fn quoted(s: &str) -> std::borrow::Cow<'_, str> {
    if !s.is_empty() && !s.contains(|c: char| c.is_whitespace() || c == '\'' || c == '"') {
        s.into()
    } else {
        format!("'{}'", s.replace('\'', r"'\''")).into()
    }
}

impl fmt::Display for EncoderCommand {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", quoted(&self.program))?;
        for arg in self.args.iter() {
            write!(f, " {}", quoted(arg))?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_builder_and_flag_value() {
        let cmd = EncoderCommand::new("ffmpeg")
            .flag("-framerate", "24")
            .flag("-crf", "23")
            .arg("out.mp4");
        assert_eq!(cmd.program(), "ffmpeg");
        assert_eq!(cmd.args(), &["-framerate", "24", "-crf", "23", "out.mp4"]);
        assert_eq!(cmd.flag_value("-framerate"), Some("24"));
        assert_eq!(cmd.flag_value("-crf"), Some("23"));
        assert_eq!(cmd.flag_value("-i"), None);
    }

    #[test]
    fn test_display_quotes_whitespace() {
        let cmd = EncoderCommand::new("ffmpeg")
            .flag("-i", "/my frames/frame_%04d.ppm")
            .arg("it's.mp4");
        assert_eq!(
            cmd.to_string(),
            r"ffmpeg -i '/my frames/frame_%04d.ppm' 'it'\''s.mp4'"
        );
    }

    #[test]
    fn test_to_command() {
        let cmd = EncoderCommand::new("ffmpeg").flag("-framerate", "30");
        let std_cmd = cmd.to_command();
        assert_eq!(std_cmd.get_program(), "ffmpeg");
        let args: Vec<_> = std_cmd.get_args().collect();
        assert_eq!(args, ["-framerate", "30"]);
    }
}
