pub mod image_handlers;

use profiles_shared::images::{TemporaryStager, VariantDeriver};
use profiles_shared::storage::ObjectStorage;

pub struct ImageState<O: ObjectStorage> {
    pub deriver: VariantDeriver,
    pub stager: TemporaryStager<O>,
}
