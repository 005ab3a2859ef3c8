//! Domain layer - Core types and the traits at the persistence and transport seams

pub mod clock;
pub mod entity;
pub mod error;
pub mod notification;
pub mod storage;
pub mod token;
pub mod user;

pub use clock::{Clock, SystemClock};
pub use entity::{Entity, EntityMeta};
pub use error::{DomainError, ErrorKind};
pub use notification::NotificationSender;
pub use storage::{
    Condition, Document, DocumentStore, Filter, FilterOperator, OrderBy, PageRequest,
    PaginatedResult, Query, SortDirection,
};
pub use token::{TokenCodec, TokenPayload};
pub use user::{PasswordHasher, User, UserView};
