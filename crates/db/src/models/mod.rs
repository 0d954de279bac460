//! Row models and DTOs.
//!
//! Each submodule contains:
//! - A `FromRow` + `Serialize` entity struct matching the database row
//! - A `Deserialize` create DTO for inserts
//! - A `Deserialize` update DTO (all `Option` fields) for patches

pub mod assignment;
pub mod audit;
pub mod complaint;
pub mod compliance;
pub mod defect;
pub mod inspection_request;
pub mod photo;
pub mod report;
pub mod role;
pub mod roof_element;
pub mod share;
pub mod template;
pub mod user;
