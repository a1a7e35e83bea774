use std::collections::{HashMap, HashSet};
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use roxmltree::{Document, Node};

use crate::iso::AssetId;
use crate::sprite_sheets::validate_sprite_key;

use super::database::{AssetCatalog, AssetCategory, AssetDefinition};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SourceLocation {
    pub line: usize,
    pub column: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CatalogErrorCode {
    ReadDir,
    ReadFile,
    XmlMalformed,
    InvalidRoot,
    UnknownElement,
    UnknownField,
    DuplicateField,
    MissingField,
    InvalidValue,
    DuplicateAsset,
}

#[derive(Debug, Clone)]
pub struct CatalogError {
    pub code: CatalogErrorCode,
    pub message: String,
    pub file_path: PathBuf,
    pub location: Option<SourceLocation>,
}

impl fmt::Display for CatalogError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.location {
            Some(loc) => write!(
                f,
                "{:?}: {} (file={}, line={}, column={})",
                self.code,
                self.message,
                self.file_path.display(),
                loc.line,
                loc.column
            ),
            None => write!(
                f,
                "{:?}: {} (file={})",
                self.code,
                self.message,
                self.file_path.display()
            ),
        }
    }
}

impl std::error::Error for CatalogError {}

/// Compiles every `*.xml` under `catalog_dir`, in path order.
///
/// An asset id may be declared only once across the whole catalog.
pub fn compile_catalog(catalog_dir: &Path) -> Result<AssetCatalog, CatalogError> {
    let xml_files = collect_xml_files_sorted(catalog_dir).map_err(|error| CatalogError {
        code: CatalogErrorCode::ReadDir,
        message: format!("failed to read catalog directory: {}", error.source),
        file_path: error.path,
        location: None,
    })?;

    let mut definitions = Vec::<AssetDefinition>::new();
    let mut first_seen = HashMap::<AssetId, PathBuf>::new();

    for xml_file in xml_files {
        let raw = fs::read_to_string(&xml_file).map_err(|source| CatalogError {
            code: CatalogErrorCode::ReadFile,
            message: format!("failed to read XML file: {source}"),
            file_path: xml_file.clone(),
            location: None,
        })?;
        for def in parse_catalog_document(&xml_file, &raw)? {
            if let Some(previous) = first_seen.get(&def.id) {
                return Err(CatalogError {
                    code: CatalogErrorCode::DuplicateAsset,
                    message: format!(
                        "asset '{}' is already defined in {}",
                        def.id,
                        previous.display()
                    ),
                    file_path: xml_file.clone(),
                    location: None,
                });
            }
            first_seen.insert(def.id.clone(), xml_file.clone());
            definitions.push(def);
        }
    }

    Ok(AssetCatalog::from_definitions(definitions))
}

/// Parses one `<Catalog>` document. Duplicate ids inside the document are rejected here.
pub fn parse_catalog_document(
    file_path: &Path,
    raw: &str,
) -> Result<Vec<AssetDefinition>, CatalogError> {
    let doc = Document::parse(raw).map_err(|error| CatalogError {
        code: CatalogErrorCode::XmlMalformed,
        message: format!("malformed XML: {error}"),
        file_path: file_path.to_path_buf(),
        location: Some(SourceLocation {
            line: error.pos().row as usize,
            column: error.pos().col as usize,
        }),
    })?;

    let root = doc.root_element();
    if root.tag_name().name() != "Catalog" {
        return Err(error_at_node(
            CatalogErrorCode::InvalidRoot,
            "root element must be <Catalog>".to_string(),
            file_path,
            &doc,
            root,
        ));
    }

    let mut seen_ids = HashSet::<AssetId>::new();
    let mut assets = Vec::<AssetDefinition>::new();
    for child in root.children().filter(|node| node.is_element()) {
        if child.tag_name().name() != "Asset" {
            return Err(error_at_node(
                CatalogErrorCode::UnknownElement,
                format!(
                    "unsupported element <{}>; a catalog contains only <Asset>",
                    child.tag_name().name()
                ),
                file_path,
                &doc,
                child,
            ));
        }
        let asset = parse_asset(file_path, &doc, child)?;
        if !seen_ids.insert(asset.id.clone()) {
            return Err(error_at_node(
                CatalogErrorCode::DuplicateAsset,
                format!("duplicate asset id '{}'", asset.id),
                file_path,
                &doc,
                child,
            ));
        }
        assets.push(asset);
    }

    Ok(assets)
}

fn parse_asset(
    file_path: &Path,
    doc: &Document<'_>,
    node: Node<'_, '_>,
) -> Result<AssetDefinition, CatalogError> {
    let mut seen_fields = HashSet::<String>::new();
    let mut id: Option<String> = None;
    let mut name: Option<String> = None;
    let mut category: Option<AssetCategory> = None;
    let mut price: Option<u32> = None;
    let mut sprite_sheet: Option<String> = None;
    let mut description: Option<String> = None;

    for field in node.children().filter(|child| child.is_element()) {
        let field_name = field.tag_name().name().to_string();
        if !seen_fields.insert(field_name.clone()) {
            return Err(error_at_node(
                CatalogErrorCode::DuplicateField,
                format!("duplicate field <{}> in <Asset>", field_name),
                file_path,
                doc,
                field,
            ));
        }

        match field_name.as_str() {
            "id" => {
                let value = required_text(file_path, doc, field, "id")?;
                if !value
                    .chars()
                    .all(|ch| ch.is_ascii_lowercase() || ch.is_ascii_digit() || ch == '_')
                {
                    return Err(error_at_node(
                        CatalogErrorCode::InvalidValue,
                        format!("asset id '{value}' may contain only a-z, 0-9 and '_'"),
                        file_path,
                        doc,
                        field,
                    ));
                }
                id = Some(value);
            }
            "name" => {
                name = Some(required_text(file_path, doc, field, "name")?);
            }
            "type" => {
                let value = required_text(file_path, doc, field, "type")?;
                let Some(parsed) = AssetCategory::parse(&value) else {
                    return Err(error_at_node(
                        CatalogErrorCode::InvalidValue,
                        format!(
                            "invalid type '{}'; allowed values: floor item, non top floor item, surface item, wall item, floor, wall",
                            value
                        ),
                        file_path,
                        doc,
                        field,
                    ));
                };
                category = Some(parsed);
            }
            "price" => {
                let value = required_text(file_path, doc, field, "price")?;
                let parsed = value.parse::<u32>().map_err(|_| {
                    error_at_node(
                        CatalogErrorCode::InvalidValue,
                        format!("price '{}' is not a non-negative integer", value),
                        file_path,
                        doc,
                        field,
                    )
                })?;
                price = Some(parsed);
            }
            "spriteSheet" => {
                let value = required_text(file_path, doc, field, "spriteSheet")?;
                if let Err(error) = validate_sprite_key(&value) {
                    return Err(error_at_node(
                        CatalogErrorCode::InvalidValue,
                        format!("invalid spriteSheet '{}': {error}", value),
                        file_path,
                        doc,
                        field,
                    ));
                }
                sprite_sheet = Some(value);
            }
            "description" => {
                description = Some(field.text().map(str::trim).unwrap_or_default().to_string());
            }
            _ => {
                return Err(error_at_node(
                    CatalogErrorCode::UnknownField,
                    format!("unknown field <{}> in <Asset>", field_name),
                    file_path,
                    doc,
                    field,
                ))
            }
        }
    }

    let missing = |field: &str| {
        error_at_node(
            CatalogErrorCode::MissingField,
            format!("missing required field <{field}> in <Asset>"),
            file_path,
            doc,
            node,
        )
    };
    let id = id.ok_or_else(|| missing("id"))?;
    let name = name.ok_or_else(|| missing("name"))?;
    let category = category.ok_or_else(|| missing("type"))?;
    let price = price.ok_or_else(|| missing("price"))?;
    let sprite_sheet = sprite_sheet.ok_or_else(|| missing("spriteSheet"))?;

    Ok(AssetDefinition {
        id: AssetId(id),
        name,
        description: description.unwrap_or_default(),
        category,
        price,
        sprite_sheet,
    })
}

fn required_text(
    file_path: &Path,
    doc: &Document<'_>,
    node: Node<'_, '_>,
    field_name: &str,
) -> Result<String, CatalogError> {
    let value = node.text().map(str::trim).unwrap_or_default().to_string();
    if value.is_empty() {
        return Err(error_at_node(
            CatalogErrorCode::MissingField,
            format!("field <{}> must not be empty", field_name),
            file_path,
            doc,
            node,
        ));
    }
    Ok(value)
}

fn error_at_node(
    code: CatalogErrorCode,
    message: String,
    file_path: &Path,
    doc: &Document<'_>,
    node: Node<'_, '_>,
) -> CatalogError {
    let pos = doc.text_pos_at(node.range().start);
    CatalogError {
        code,
        message,
        file_path: file_path.to_path_buf(),
        location: Some(SourceLocation {
            line: pos.row as usize,
            column: pos.col as usize,
        }),
    }
}

struct ReadError {
    path: PathBuf,
    source: std::io::Error,
}

fn collect_xml_files_sorted(root: &Path) -> Result<Vec<PathBuf>, ReadError> {
    let mut files = Vec::<PathBuf>::new();
    collect_recursive(root, &mut files)?;
    files.sort_by_key(|path| normalize_rel_path(path.strip_prefix(root).unwrap_or(path)));
    Ok(files)
}

fn collect_recursive(current: &Path, files: &mut Vec<PathBuf>) -> Result<(), ReadError> {
    let entries = fs::read_dir(current).map_err(|source| ReadError {
        path: current.to_path_buf(),
        source,
    })?;
    for entry in entries {
        let entry = entry.map_err(|source| ReadError {
            path: current.to_path_buf(),
            source,
        })?;
        let path = entry.path();
        if path.is_dir() {
            collect_recursive(&path, files)?;
        } else if path
            .extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| ext.eq_ignore_ascii_case("xml"))
        {
            files.push(path);
        }
    }
    Ok(())
}

fn normalize_rel_path(path: &Path) -> String {
    path.components()
        .map(|component| component.as_os_str().to_string_lossy().to_string())
        .collect::<Vec<_>>()
        .join("/")
}
