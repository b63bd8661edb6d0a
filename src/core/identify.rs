//! Disc identification through `isoinfo -d`.
//!
//! The primary volume descriptor gives the volume id and the geometry
//! (logical block size and volume size in blocks) that a rip needs.

use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::sync::LazyLock;

use regex::Regex;
use serde::Serialize;
use tokio::process::Command;
use tracing::{debug, info};

use crate::core::error::IdentifyError;

static FIELD_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\s*([A-Za-z ]+?)(?: is)?:\s*(.*?)\s*$").unwrap());

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DiscIdentity {
    pub device: PathBuf,
    pub volume_id: Option<String>,
    pub volume_set_id: Option<String>,
    pub publisher_id: Option<String>,
    pub application_id: Option<String>,
    pub block_size: u64,
    pub block_count: u64,
}

impl DiscIdentity {
    pub fn size_bytes(&self) -> u64 {
        self.block_size.saturating_mul(self.block_count)
    }

    /// Name used for image files and copy labels.
    pub fn label(&self) -> &str {
        self.volume_id.as_deref().unwrap_or("disc")
    }
}

pub struct DiscIdentifier {
    program: PathBuf,
}

impl DiscIdentifier {
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
        }
    }

    pub async fn identify(&self, device: &Path) -> Result<DiscIdentity, IdentifyError> {
        let tool = self
            .program
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_else(|| self.program.to_string_lossy().to_string());

        debug!(tool = %tool, device = %device.display(), "Identifying disc");

        let output = Command::new(&self.program)
            .arg("-d")
            .arg("-i")
            .arg(device)
            .stdin(Stdio::null())
            .output()
            .await
            .map_err(|source| IdentifyError::Spawn {
                tool: tool.clone(),
                source,
            })?;

        if !output.status.success() {
            return Err(IdentifyError::Exit {
                tool,
                status: output.status.to_string(),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }

        let identity = parse_isoinfo(device, &String::from_utf8_lossy(&output.stdout))?;
        info!(
            volume_id = identity.label(),
            block_size = identity.block_size,
            block_count = identity.block_count,
            "Disc identified"
        );
        Ok(identity)
    }
}

impl Default for DiscIdentifier {
    fn default() -> Self {
        Self::new("isoinfo")
    }
}

/// Parse the descriptor dump printed by `isoinfo -d`.
pub fn parse_isoinfo(device: &Path, text: &str) -> Result<DiscIdentity, IdentifyError> {
    let mut volume_id = None;
    let mut volume_set_id = None;
    let mut publisher_id = None;
    let mut application_id = None;
    let mut block_size = None;
    let mut block_count = None;

    for line in text.lines() {
        let Some(caps) = FIELD_RE.captures(line) else {
            continue;
        };
        let value = caps[2].to_string();
        let text_value = (!value.is_empty()).then(|| value.clone());

        match &caps[1] {
            "Volume id" => volume_id = text_value,
            "Volume set id" => volume_set_id = text_value,
            "Publisher id" => publisher_id = text_value,
            "Application id" => application_id = text_value,
            "Logical block size" => block_size = value.parse::<u64>().ok(),
            "Volume size" => block_count = value.parse::<u64>().ok(),
            _ => {}
        }
    }

    Ok(DiscIdentity {
        device: device.to_path_buf(),
        volume_id,
        volume_set_id,
        publisher_id,
        application_id,
        block_size: block_size
            .filter(|n| *n > 0)
            .ok_or(IdentifyError::MissingField("Logical block size"))?,
        block_count: block_count
            .filter(|n| *n > 0)
            .ok_or(IdentifyError::MissingField("Volume size"))?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = "CD-ROM is in ISO 9660 format
System id:
Volume id: MOVIE_DISC
Volume set id:
Publisher id: STUDIO & CO
Data preparer id:
Application id:
Copyright File id:
Volume set size is: 1
Volume set sequence number is: 1
Logical block size is: 2048
Volume size is: 23456
NO Joliet present
";

    #[test]
    fn test_parse_isoinfo_sample() {
        let identity = parse_isoinfo(Path::new("/dev/sr0"), SAMPLE).unwrap();
        assert_eq!(identity.volume_id.as_deref(), Some("MOVIE_DISC"));
        assert_eq!(identity.volume_set_id, None);
        assert_eq!(identity.publisher_id.as_deref(), Some("STUDIO & CO"));
        assert_eq!(identity.application_id, None);
        assert_eq!(identity.block_size, 2048);
        assert_eq!(identity.block_count, 23456);
        assert_eq!(identity.size_bytes(), 2048 * 23456);
        assert_eq!(identity.label(), "MOVIE_DISC");
    }

    #[test]
    fn test_parse_isoinfo_missing_geometry() {
        let err = parse_isoinfo(Path::new("/dev/sr0"), "Volume id: X\n").unwrap_err();
        assert!(matches!(err, IdentifyError::MissingField("Logical block size")));
    }

    #[test]
    fn test_label_falls_back_without_volume_id() {
        let text = "Logical block size is: 2048\nVolume size is: 10\n";
        let identity = parse_isoinfo(Path::new("disc.img"), text).unwrap();
        assert_eq!(identity.label(), "disc");
    }

    #[tokio::test]
    async fn test_identify_missing_tool() {
        let identifier = DiscIdentifier::new("/nonexistent/isoinfo_xyz_12345");
        let err = identifier.identify(Path::new("/dev/sr0")).await.unwrap_err();
        assert!(matches!(err, IdentifyError::Spawn { .. }));
    }
}
