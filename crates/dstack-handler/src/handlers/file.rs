use std::any::Any;
use std::path::{Path, PathBuf};

use crate::data::FrameData;
use crate::error::{HandlerError, Result};
use crate::handler::Handler;

/// Encodes the contents of an existing file named by a `PathBuf`.
///
/// The content type comes from the file extension.
#[derive(Debug, Clone, Copy, Default)]
pub struct FileHandler;

impl FileHandler {
    /// Content type for a path, by extension.
    pub fn content_type_for(path: &Path) -> &'static str {
        let extension = path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(str::to_ascii_lowercase);
        match extension.as_deref() {
            Some("svg") => "image/svg",
            Some("png") => "image/png",
            Some("jpg" | "jpeg") => "image/jpeg",
            Some("csv") => "text/csv",
            Some("json") => "application/json",
            Some("txt") => "text/plain",
            Some("html" | "htm") => "text/html",
            _ => "application/octet-stream",
        }
    }
}

impl Handler for FileHandler {
    fn name(&self) -> &'static str {
        "file"
    }

    fn is_capable(&self, obj: &dyn Any) -> bool {
        obj.downcast_ref::<PathBuf>()
            .is_some_and(|path| path.is_file())
    }

    fn as_frame_data(&self, obj: &dyn Any) -> Result<FrameData> {
        let path = obj
            .downcast_ref::<PathBuf>()
            .ok_or(HandlerError::Mismatch(self.name()))?;
        let data = std::fs::read(path).map_err(|source| HandlerError::Io {
            path: path.clone(),
            source,
        })?;
        Ok(FrameData::new(Self::content_type_for(path), data))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn content_type_by_extension() {
        assert_eq!(FileHandler::content_type_for(Path::new("a.SVG")), "image/svg");
        assert_eq!(FileHandler::content_type_for(Path::new("a.jpeg")), "image/jpeg");
        assert_eq!(FileHandler::content_type_for(Path::new("a.csv")), "text/csv");
        assert_eq!(
            FileHandler::content_type_for(Path::new("noext")),
            "application/octet-stream"
        );
    }

    #[test]
    fn reads_existing_file_and_skips_missing() {
        let dir = std::env::temp_dir().join(format!(
            "dstack-file-handler-{}-{}",
            std::process::id(),
            std::time::SystemTime::now()
                .duration_since(std::time::UNIX_EPOCH)
                .unwrap()
                .as_nanos()
        ));
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("plot.svg");
        std::fs::write(&path, b"<svg/>").unwrap();

        assert!(FileHandler.is_capable(&path));
        let data = FileHandler.as_frame_data(&path).unwrap();
        assert_eq!(data.content_type, "image/svg");
        assert_eq!(data.data.as_ref(), b"<svg/>");

        assert!(!FileHandler.is_capable(&dir.join("missing.svg")));
        assert!(!FileHandler.is_capable(&dir));

        let _ = std::fs::remove_dir_all(&dir);
    }
}
