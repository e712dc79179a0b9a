//! External pandoc invocation
//!
//! The only process boundary in the pipeline. Pandoc is located once per
//! invocation and run with a narrow, fixed argument shape; everything it
//! prints on stderr is surfaced verbatim in the error.

use std::path::{Path, PathBuf};
use std::process::Command;

use super::types::{ConvertError, Result};

/// Handle to a located pandoc binary
#[derive(Debug, Clone)]
pub struct Pandoc {
    binary: PathBuf,
}

impl Pandoc {
    /// Locate pandoc on the PATH
    pub fn locate() -> Result<Self> {
        let binary = which::which("pandoc").map_err(|_| ConvertError::PandocMissing)?;
        tracing::debug!("using pandoc at {}", binary.display());
        Ok(Self { binary })
    }

    /// Use an explicit binary path (tests)
    pub fn with_binary(binary: impl Into<PathBuf>) -> Self {
        Self {
            binary: binary.into(),
        }
    }

    /// First line of `pandoc --version`
    pub fn version(&self) -> Result<String> {
        let output = Command::new(&self.binary).arg("--version").output()?;
        if !output.status.success() {
            return Err(ConvertError::PandocFailed(
                String::from_utf8_lossy(&output.stderr).trim().to_string(),
            ));
        }
        let stdout = String::from_utf8_lossy(&output.stdout);
        Ok(stdout.lines().next().unwrap_or("pandoc").to_string())
    }

    /// Convert a `.docx` file to Markdown, capturing stdout.
    ///
    /// When `media_dir` is given, embedded media are extracted beneath it
    /// via `--extract-media`; the returned Markdown then references files
    /// under that directory.
    pub fn docx_to_markdown(
        &self,
        input: &Path,
        media_dir: Option<&Path>,
        extra_args: &[String],
    ) -> Result<String> {
        let mut cmd = Command::new(&self.binary);
        cmd.arg(input).args(["-f", "docx", "-t", "markdown"]);
        if let Some(dir) = media_dir {
            cmd.arg(format!("--extract-media={}", dir.display()));
        }
        cmd.args(extra_args);

        tracing::debug!("running {:?}", cmd);
        let output = cmd.output()?;
        if !output.status.success() {
            return Err(ConvertError::PandocFailed(
                String::from_utf8_lossy(&output.stderr).trim().to_string(),
            ));
        }

        String::from_utf8(output.stdout)
            .map_err(|e| ConvertError::PandocFailed(format!("output is not UTF-8: {e}")))
    }
}

// ============================================================
// Tests
// ============================================================
