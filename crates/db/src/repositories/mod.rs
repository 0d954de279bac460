//! Repository layer.
//!
//! Each repository is a zero-sized struct providing async methods that
//! accept `&PgPool` as the first argument.

pub mod assignment_repo;
pub mod audit_repo;
pub mod complaint_repo;
pub mod compliance_repo;
pub mod defect_repo;
pub mod inspection_request_repo;
pub mod photo_repo;
pub mod report_repo;
pub mod role_repo;
pub mod roof_element_repo;
pub mod share_repo;
pub mod template_repo;
pub mod user_repo;

pub use assignment_repo::AssignmentRepo;
pub use audit_repo::AuditLogRepo;
pub use complaint_repo::ComplaintRepo;
pub use compliance_repo::ComplianceRepo;
pub use defect_repo::DefectRepo;
pub use inspection_request_repo::InspectionRequestRepo;
pub use photo_repo::PhotoRepo;
pub use report_repo::ReportRepo;
pub use role_repo::RoleRepo;
pub use roof_element_repo::RoofElementRepo;
pub use share_repo::ShareRepo;
pub use template_repo::TemplateRepo;
pub use user_repo::UserRepo;
