//! Typed repositories over the document store

mod generic;

pub use generic::GenericRepository;
