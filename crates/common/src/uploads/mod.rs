//! Where uploaded files are stored, relative to the media root
//!
//! Only paths are built here; the bytes are handled by whatever serves
//! `site.media_url`.

use crate::errors::{AppError, Result};
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum UploadKind {
    ResearcherPhoto,
    ReferencePdf,
    ProjectImage,
    EventImage,
    TalkSlides,
    PostImage,
}

impl UploadKind {
    /// Directory under the media root, with trailing slash
    pub fn prefix(self) -> &'static str {
        match self {
            UploadKind::ResearcherPhoto => "researcher_photos/",
            UploadKind::ReferencePdf => "references/",
            UploadKind::ProjectImage => "project_images/",
            UploadKind::EventImage => "event_images/",
            UploadKind::TalkSlides => "talk_slides/",
            UploadKind::PostImage => "post_images/",
        }
    }

    /// Relative path stored in the model column
    pub fn path_for(self, file_name: &str) -> Result<String> {
        let name = file_name.trim();
        if name.is_empty() {
            return Err(AppError::Validation {
                message: "Upload file name is empty".into(),
                field: Some(self.field().into()),
            });
        }
        if name.contains(['/', '\\']) || name == "." || name == ".." {
            return Err(AppError::Validation {
                message: format!("Upload file name '{}' is not a plain file name", name),
                field: Some(self.field().into()),
            });
        }

        Ok(format!("{}{}", self.prefix(), name))
    }

    fn field(self) -> &'static str {
        match self {
            UploadKind::ResearcherPhoto => "photo",
            UploadKind::ReferencePdf => "pdf_file",
            UploadKind::ProjectImage | UploadKind::EventImage => "image",
            UploadKind::TalkSlides => "slides",
            UploadKind::PostImage => "featured_image",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_paths_use_kind_prefix() {
        assert_eq!(
            UploadKind::ResearcherPhoto.path_for("ada.jpg").unwrap(),
            "researcher_photos/ada.jpg"
        );
        assert_eq!(
            UploadKind::TalkSlides.path_for(" deck.pdf ").unwrap(),
            "talk_slides/deck.pdf"
        );
        assert_eq!(
            UploadKind::ReferencePdf.path_for("paper.pdf").unwrap(),
            "references/paper.pdf"
        );
    }

    #[test]
    fn test_rejects_empty_and_nested_names() {
        assert!(UploadKind::PostImage.path_for("").is_err());
        assert!(UploadKind::PostImage.path_for("   ").is_err());
        assert!(UploadKind::EventImage.path_for("../etc/passwd").is_err());
        assert!(UploadKind::EventImage.path_for("a\\b.png").is_err());

        match UploadKind::ProjectImage.path_for("..") {
            Err(AppError::Validation { field, .. }) => assert_eq!(field.as_deref(), Some("image")),
            other => panic!("unexpected: {other:?}"),
        }
    }
}
