// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Project document serialization and deserialization.
//!
//! JSON is the canonical format; YAML is accepted and written when the file
//! extension asks for it. Loading a project parses the text and decodes the
//! embedded background image before anything is handed to the editor, so a
//! failure at either step leaves the current plan untouched.

use super::media::{self, LoadedImage};
use crate::error::{Error, Result};
use crate::models::project::ProjectDocument;
use anyhow::Context;
use std::path::Path;

/// On-disk encoding of a project document.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentFormat {
    Json,
    Yaml,
}

impl DocumentFormat {
    /// Pick the format from a file extension.
    pub fn from_path(path: &Path) -> Result<Self> {
        let extension = path
            .extension()
            .and_then(|s| s.to_str())
            .map(str::to_ascii_lowercase);
        match extension.as_deref() {
            Some("json") => Ok(DocumentFormat::Json),
            Some("yaml") | Some("yml") => Ok(DocumentFormat::Yaml),
            _ => Err(Error::UnsupportedFormat(extension)),
        }
    }
}

pub fn to_string(doc: &ProjectDocument, format: DocumentFormat) -> Result<String> {
    Ok(match format {
        DocumentFormat::Json => serde_json::to_string_pretty(doc)?,
        DocumentFormat::Yaml => serde_yaml::to_string(doc)?,
    })
}

pub fn from_str(text: &str, format: DocumentFormat) -> Result<ProjectDocument> {
    Ok(match format {
        DocumentFormat::Json => serde_json::from_str(text)?,
        DocumentFormat::Yaml => serde_yaml::from_str(text)?,
    })
}

/// A parsed document together with its decoded background image.
#[derive(Debug, Clone)]
pub struct LoadedProject {
    pub document: ProjectDocument,
    pub background: Option<LoadedImage>,
}

/// Parse document text and decode its image. Nothing is returned unless both succeed.
pub fn parse_project(text: &str, format: DocumentFormat) -> Result<LoadedProject> {
    let document = from_str(text, format)?;
    let background = match document.background_image.as_deref() {
        Some(url) if !url.is_empty() => Some(media::decode_data_url(url)?),
        _ => None,
    };
    Ok(LoadedProject {
        document,
        background,
    })
}

/// Export a project document, choosing the format from the extension.
pub fn export_project(doc: &ProjectDocument, path: &Path) -> anyhow::Result<()> {
    let format = DocumentFormat::from_path(path)?;
    let text = to_string(doc, format)?;
    std::fs::write(path, text).with_context(|| format!("writing {}", path.display()))?;
    log::info!(
        "Exported {} entities to {}",
        doc.entity_count(),
        path.display()
    );
    Ok(())
}

/// Import a project file and decode its background image.
pub fn load_project(path: &Path) -> anyhow::Result<LoadedProject> {
    let format = DocumentFormat::from_path(path)?;
    let text = std::fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
    let project = parse_project(&text, format).with_context(|| format!("loading {}", path.display()))?;
    log::info!(
        "Imported {} entities from {}",
        project.document.entity_count(),
        path.display()
    );
    Ok(project)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn tiny_png_url() -> String {
        let img = image::RgbaImage::from_pixel(2, 2, image::Rgba([255, 0, 0, 255]));
        let mut buf = Vec::new();
        image::DynamicImage::ImageRgba8(img)
            .write_to(&mut std::io::Cursor::new(&mut buf), image::ImageFormat::Png)
            .unwrap();
        media::encode_data_url("image/png", &buf)
    }

    #[test]
    fn test_format_from_extension() {
        assert_eq!(DocumentFormat::from_path(Path::new("a/plan.json")).unwrap(), DocumentFormat::Json);
        assert_eq!(DocumentFormat::from_path(Path::new("plan.YML")).unwrap(), DocumentFormat::Yaml);
        assert!(matches!(
            DocumentFormat::from_path(Path::new("plan.txt")),
            Err(Error::UnsupportedFormat(Some(ext))) if ext == "txt"
        ));
        assert!(matches!(DocumentFormat::from_path(Path::new("plan")), Err(Error::UnsupportedFormat(None))));
    }

    #[test]
    fn test_json_and_yaml_agree() {
        let doc = ProjectDocument {
            phases: vec!["Phase 1".into(), "Phase 2".into()],
            ..Default::default()
        };
        for format in [DocumentFormat::Json, DocumentFormat::Yaml] {
            let text = to_string(&doc, format).unwrap();
            assert_eq!(from_str(&text, format).unwrap(), doc);
        }
    }

    #[test]
    fn test_malformed_text() {
        assert!(matches!(from_str("{\"pins\": ", DocumentFormat::Json), Err(Error::ImportMalformed(_))));
        assert!(matches!(
            from_str(r#"{"pins": {"pins": [{"id": "x", "type": "router", "x": 0, "y": 0}]}}"#, DocumentFormat::Json),
            Err(Error::ImportMalformed(_))
        ));
        assert!(matches!(from_str("pins: [1, 2", DocumentFormat::Yaml), Err(Error::ImportMalformed(_))));
    }

    #[test]
    fn test_parse_project_decodes_image() {
        let doc = ProjectDocument {
            background_image: Some(tiny_png_url()),
            ..Default::default()
        };
        let text = to_string(&doc, DocumentFormat::Json).unwrap();
        let loaded = parse_project(&text, DocumentFormat::Json).unwrap();
        let image = loaded.background.unwrap();
        assert_eq!((image.width, image.height), (2, 2));
        assert_eq!(Some(image.data_url), doc.background_image);
    }

    #[test]
    fn test_parse_project_fails_on_bad_image() {
        let text = r#"{"image": "data:image/png;base64,AAAA"}"#;
        assert!(matches!(
            parse_project(text, DocumentFormat::Json),
            Err(Error::ImageDecodeFailed(_))
        ));
    }

    #[test]
    fn test_file_roundtrip() {
        let dir = std::env::temp_dir().join(format!("siteplan-test-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        let path: PathBuf = dir.join("plan.yaml");
        let doc = ProjectDocument {
            phases: vec!["Rollout".into()],
            ..Default::default()
        };
        export_project(&doc, &path).unwrap();
        let loaded = load_project(&path).unwrap();
        assert_eq!(loaded.document, doc);
        assert!(loaded.background.is_none());
        std::fs::remove_dir_all(&dir).unwrap();
    }
}
