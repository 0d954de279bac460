pub mod assignment;
pub mod audit;
pub mod complaint;
pub mod compliance;
pub mod defect;
pub mod error;
pub mod hashing;
pub mod inspection_request;
pub mod photo;
pub mod report;
pub mod revision;
pub mod roles;
pub mod roof_element;
pub mod search;
pub mod share;
pub mod submission;
pub mod types;
