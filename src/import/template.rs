//! Import templates: a header row plus one example row per entity kind

use rust_embed::Embed;

use crate::core::identity::EntityKind;

use super::ImportError;

#[derive(Embed)]
#[folder = "templates/"]
struct EmbeddedTemplates;

/// UTF-8 byte order mark, so spreadsheet programs pick the right encoding
const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";

/// Suggested download name, e.g. `users_import_template.csv`
pub fn file_name(kind: EntityKind) -> String {
    format!("{}_import_template.csv", kind.as_str())
}

/// Template text without the byte order mark
pub fn contents(kind: EntityKind) -> Result<String, ImportError> {
    let file = EmbeddedTemplates::get(&format!("{}_template.csv", kind.as_str()))
        .ok_or(ImportError::TemplateMissing(kind))?;
    String::from_utf8(file.data.into_owned()).map_err(|_| ImportError::TemplateMissing(kind))
}

/// Template bytes as served for download (BOM prefixed)
pub fn download(kind: EntityKind) -> Result<Vec<u8>, ImportError> {
    let text = contents(kind)?;
    let mut bytes = Vec::with_capacity(UTF8_BOM.len() + text.len());
    bytes.extend_from_slice(UTF8_BOM);
    bytes.extend_from_slice(text.as_bytes());
    Ok(bytes)
}
