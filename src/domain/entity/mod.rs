//! Entity domain - capability set shared by every stored record

mod entity;

pub use entity::{
    Entity, EntityMeta, ACTIVE_FIELD, CREATED_AT_FIELD, ID_FIELD, UPDATED_AT_FIELD,
};
