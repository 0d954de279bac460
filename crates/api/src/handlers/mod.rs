pub mod assignment;
pub mod audit;
pub mod complaint;
pub mod compliance;
pub mod defect;
pub mod inspection_request;
pub mod photo;
pub mod report;
pub mod roof_element;
pub mod share;
pub mod template;
pub mod users;
pub mod workflow;
