mod atomic_io;
mod compiler;
mod database;

pub use atomic_io::write_text_atomic;
pub use compiler::{
    compile_catalog, parse_catalog_document, CatalogError, CatalogErrorCode, SourceLocation,
};
pub use database::{AssetCatalog, AssetCategory, AssetDefinition};
