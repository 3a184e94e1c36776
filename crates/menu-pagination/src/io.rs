//! Document and template files
//!
//! Documents are stored as plain JSON. Templates are wrapped in a small
//! envelope so that files from other tools or newer versions are rejected
//! instead of half-parsed.

use crate::document::Document;
use crate::template::Template;
use crate::types::*;
use std::path::Path;

/// Format tag of template files
pub const TEMPLATE_FORMAT: &str = "menu-template";

/// Newest template file version this build reads and the one it writes
pub const TEMPLATE_VERSION: u32 = 1;

#[derive(serde::Deserialize)]
struct EnvelopeHeader {
    format: String,
    version: u32,
}

#[derive(serde::Deserialize)]
struct EnvelopeBody {
    template: Template,
}

#[derive(serde::Serialize)]
struct EnvelopeRef<'a> {
    format: &'static str,
    version: u32,
    template: &'a Template,
}

/// Parse and validate a template envelope
pub fn template_from_json(json: &str) -> Result<Template> {
    let header: EnvelopeHeader = serde_json::from_str(json)
        .map_err(|e| MenuError::Config(format!("Failed to parse template file: {e}")))?;
    if header.format != TEMPLATE_FORMAT {
        return Err(MenuError::Config(format!(
            "Unknown template format '{}'",
            header.format
        )));
    }
    if header.version > TEMPLATE_VERSION {
        return Err(MenuError::Config(format!(
            "Template file version {} is newer than supported version {TEMPLATE_VERSION}",
            header.version
        )));
    }

    let body: EnvelopeBody = serde_json::from_str(json)
        .map_err(|e| MenuError::Config(format!("Failed to parse template: {e}")))?;
    body.template.validate()?;
    Ok(body.template)
}

pub fn template_to_json(template: &Template) -> Result<String> {
    let envelope = EnvelopeRef {
        format: TEMPLATE_FORMAT,
        version: TEMPLATE_VERSION,
        template,
    };
    Ok(serde_json::to_string_pretty(&envelope)?)
}

pub async fn load_template(path: impl AsRef<Path>) -> Result<Template> {
    let json = tokio::fs::read_to_string(path).await?;
    template_from_json(&json)
}

pub async fn save_template(template: &Template, path: impl AsRef<Path>) -> Result<()> {
    let json = template_to_json(template)?;
    tokio::fs::write(path, json).await?;
    Ok(())
}

/// Load a document. It is not normalized; open it in a session for that.
pub async fn load_document(path: impl AsRef<Path>) -> Result<Document> {
    let bytes = tokio::fs::read(path).await?;
    let document = serde_json::from_slice(&bytes)?;
    Ok(document)
}

pub async fn save_document(document: &Document, path: impl AsRef<Path>) -> Result<()> {
    let json = serde_json::to_string_pretty(document)?;
    tokio::fs::write(path, json).await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rejects_unknown_format() {
        let json = r#"{"format":"label-sheet","version":1,"template":{}}"#;
        let err = template_from_json(json).unwrap_err();
        assert!(err.to_string().contains("label-sheet"));
    }

    #[test]
    fn test_rejects_newer_version() {
        let json = r#"{"format":"menu-template","version":2,"template":{}}"#;
        assert!(matches!(template_from_json(json), Err(MenuError::Config(_))));
    }

    #[test]
    fn test_builtin_survives_envelope() {
        let template = Template::bistro();
        let json = template_to_json(&template).unwrap();
        assert_eq!(template_from_json(&json).unwrap(), template);
    }
}
