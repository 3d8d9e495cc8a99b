//! File attachment entity: model and derived file category.

pub mod category;
pub mod model;

pub use category::FileCategory;
pub use model::{Attachment, NewAttachment};
