pub mod organization;
pub mod policy;
pub mod record;
pub mod role;
pub mod user;

pub use organization::Organization;
pub use policy::{FieldAccess, FieldKind, FieldPolicy, FieldSpec};
pub use record::{Record, RecordError};
pub use role::Role;
pub use user::User;
