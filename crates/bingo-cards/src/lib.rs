pub mod allocate;
pub mod assets;
pub mod compose;
pub mod constants;
mod draw;
mod generate;
pub mod layout;
mod options;
pub mod render;
mod store;
pub mod theme;
mod types;

pub use allocate::{allocate, center_index, required_images_per_grid};
pub use assets::{AssetCache, AssetSource, FsAssetSource, MemoryAssetSource};
pub use compose::composite;
pub use draw::{DrawSession, is_winning_line};
pub use generate::{
    DocumentRequest, GeneratedDocument, generate_document, generate_grid_group, generate_preview,
    suggested_file_name,
};
pub use options::*;
pub use render::{PreviewDocument, write_pdf};
pub use store::{BingoStore, Catalog, import_images_csv, new_id};
pub use theme::ThemeStyle;
pub use types::*;
