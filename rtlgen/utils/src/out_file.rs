use crate::{Error, RtlResult};
use std::{
    io::{self, BufWriter},
    path::{Path, PathBuf},
    str::FromStr,
};

/// Possible choices for output streams. Used by the `-o` option of the driver.
/// * "-" and "<out>" are treated as stdout.
/// * "<err>" is treated as stderr.
/// * "<null>" is treated as a null output stream.
/// * All other strings are treated as file paths.
#[derive(Debug, Clone)]
pub enum OutputFile {
    Null,
    Stdout,
    Stderr,
    File {
        path: PathBuf,
        // Has the writer been initialized?
        init: bool,
    },
}

impl OutputFile {
    pub fn file(path: PathBuf) -> Self {
        OutputFile::File { path, init: false }
    }

    pub fn as_path_string(&self) -> String {
        match self {
            OutputFile::Null => "<null>".to_string(),
            OutputFile::Stdout => "<stdout>".to_string(),
            OutputFile::Stderr => "<stderr>".to_string(),
            OutputFile::File { path, .. } => path.to_string_lossy().to_string(),
        }
    }

    /// Base name used for auxiliary files generated next to this output.
    /// Streams fall back to `default` in the current directory.
    pub fn basename(&self, default: &str) -> PathBuf {
        match self {
            OutputFile::File { path, .. } => path.with_extension(""),
            _ => PathBuf::from(default),
        }
    }

    pub fn get_write(&mut self) -> RtlResult<Box<dyn io::Write>> {
        let w: Box<dyn io::Write> = match self {
            OutputFile::Stdout => Box::new(BufWriter::new(std::io::stdout())),
            OutputFile::Stderr => Box::new(BufWriter::new(std::io::stderr())),
            OutputFile::File { path, init } => {
                // Create the file the first time, append afterwards.
                let file = if *init {
                    std::fs::OpenOptions::new().append(true).open(&*path)
                } else {
                    *init = true;
                    std::fs::File::create(&*path)
                };
                let file = file.map_err(|e| {
                    Error::write_error(format!(
                        "cannot open `{}': {}",
                        path.display(),
                        e
                    ))
                })?;
                Box::new(BufWriter::new(file))
            }
            OutputFile::Null => Box::new(io::sink()),
        };
        Ok(w)
    }
}

/// Write `text` to a standalone file at `path`.
pub fn write_file(path: &Path, text: &str) -> RtlResult<()> {
    std::fs::write(path, text).map_err(|e| {
        Error::write_error(format!("cannot write `{}': {}", path.display(), e))
    })
}

impl FromStr for OutputFile {
    type Err = String;
    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "-" | "<out>" => Ok(OutputFile::Stdout),
            "<err>" => Ok(OutputFile::Stderr),
            "<null>" => Ok(OutputFile::Null),
            _ => Ok(OutputFile::file(PathBuf::from(s))),
        }
    }
}

impl std::fmt::Display for OutputFile {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OutputFile::Stdout => write!(f, "-"),
            OutputFile::Stderr => write!(f, "<err>"),
            OutputFile::Null => write!(f, "<null>"),
            OutputFile::File { path, .. } => write!(f, "{}", path.display()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_streams() {
        assert!(matches!("-".parse::<OutputFile>(), Ok(OutputFile::Stdout)));
        assert!(matches!("<err>".parse::<OutputFile>(), Ok(OutputFile::Stderr)));
        assert!(matches!("<null>".parse::<OutputFile>(), Ok(OutputFile::Null)));
    }

    #[test]
    fn basename_strips_extension() {
        let out = OutputFile::file(PathBuf::from("build/top.v"));
        assert_eq!(out.basename("top"), PathBuf::from("build/top"));
        assert_eq!(OutputFile::Stdout.basename("top"), PathBuf::from("top"));
    }
}
