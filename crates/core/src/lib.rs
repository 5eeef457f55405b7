// Core types shared by the pipeline, settings and CLI

pub mod options;
pub mod separator;
pub mod session;
pub mod table;

pub use options::ConvertOptions;
pub use separator::Separator;
pub use session::Session;
pub use table::{Cell, Column, NormalizedTable, RawUpload};
