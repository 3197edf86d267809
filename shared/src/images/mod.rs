//! Image ingestion pipeline: derive variants from an upload, then stage them
//! under the owner's temporary prefix until the relocation worker moves them.

pub mod deriver;
pub mod keys;
pub mod stager;

pub use deriver::{DerivedImage, DerivedVariant, Preview, VariantDeriver, PREVIEW_EXT};
pub use keys::KeyLayout;
pub use stager::TemporaryStager;
