//! Subject and body text for each notification kind.

use chrono::NaiveDate;
use roofline_core::types::Timestamp;

/// A rendered email.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub subject: String,
    pub body: String,
}

/// The report fields every notification mentions.
#[derive(Debug, Clone, Copy)]
pub struct ReportRef<'a> {
    pub report_number: &'a str,
    pub property_address: Option<&'a str>,
}

impl ReportRef<'_> {
    fn address(&self) -> &str {
        self.property_address.unwrap_or("(address not recorded)")
    }
}

const SIGNATURE: &str = "\n\n-- \nRoofline inspection reports";

pub fn report_submitted(report: ReportRef<'_>, inspector_name: &str) -> Notification {
    Notification {
        subject: format!("Report {} submitted for review", report.report_number),
        body: format!(
            "{inspector_name} submitted report {} for {} and it is awaiting review.{SIGNATURE}",
            report.report_number,
            report.address()
        ),
    }
}

pub fn report_approved(report: ReportRef<'_>, reviewer_name: &str) -> Notification {
    Notification {
        subject: format!("Report {} approved", report.report_number),
        body: format!(
            "Report {} for {} was approved by {reviewer_name}.{SIGNATURE}",
            report.report_number,
            report.address()
        ),
    }
}

pub fn revision_required(
    report: ReportRef<'_>,
    reviewer_name: &str,
    comment: Option<&str>,
) -> Notification {
    let comment = comment
        .map(|c| format!("\n\nReviewer comment:\n{c}"))
        .unwrap_or_default();
    Notification {
        subject: format!("Report {} needs revision", report.report_number),
        body: format!(
            "{reviewer_name} returned report {} for {} for revision.{comment}{SIGNATURE}",
            report.report_number,
            report.address()
        ),
    }
}

pub fn report_finalised(report: ReportRef<'_>) -> Notification {
    Notification {
        subject: format!("Report {} finalised", report.report_number),
        body: format!(
            "Report {} for {} has been finalised and can no longer be edited.{SIGNATURE}",
            report.report_number,
            report.address()
        ),
    }
}

pub fn share_created(
    report: ReportRef<'_>,
    recipient_name: Option<&str>,
    link: &str,
    expires_at: Timestamp,
) -> Notification {
    let greeting = recipient_name.map_or_else(|| "Hello,".to_string(), |n| format!("Kia ora {n},"));
    Notification {
        subject: format!("Roof inspection report for {}", report.address()),
        body: format!(
            "{greeting}\n\nInspection report {} for {} has been shared with you.\n\n\
             View it here: {link}\n\nThis link expires on {}.{SIGNATURE}",
            report.report_number,
            report.address(),
            expires_at.format("%-d %B %Y")
        ),
    }
}

pub fn assignment_created(report: ReportRef<'_>, due_date: Option<NaiveDate>) -> Notification {
    let due = due_date
        .map(|d| format!(" Due {}.", d.format("%-d %B %Y")))
        .unwrap_or_default();
    Notification {
        subject: format!("New inspection assigned: {}", report.report_number),
        body: format!(
            "You have been assigned to report {} for {}.{due}{SIGNATURE}",
            report.report_number,
            report.address()
        ),
    }
}

/// Fields of a complaint sent to the licensing board.
#[derive(Debug, Clone, Copy)]
pub struct ComplaintSummary<'a> {
    pub reference: &'a str,
    pub report_number: &'a str,
    pub complainant_name: &'a str,
    pub complainant_email: &'a str,
    pub practitioner_name: &'a str,
    pub practitioner_lbp_number: &'a str,
    pub site_address: &'a str,
    pub grounds: &'a str,
    pub desired_outcome: Option<&'a str>,
}

pub fn complaint_submitted(c: ComplaintSummary<'_>) -> Notification {
    let outcome = c
        .desired_outcome
        .map(|o| format!("\n\nDesired outcome:\n{o}"))
        .unwrap_or_default();
    Notification {
        subject: format!(
            "LBP complaint {}: {} ({})",
            c.reference, c.practitioner_name, c.practitioner_lbp_number
        ),
        body: format!(
            "Complaint reference: {}\nSupporting inspection report: {}\n\n\
             Complainant: {} <{}>\nPractitioner: {} (LBP {})\nSite address: {}\n\n\
             Grounds:\n{}{outcome}{SIGNATURE}",
            c.reference,
            c.report_number,
            c.complainant_name,
            c.complainant_email,
            c.practitioner_name,
            c.practitioner_lbp_number,
            c.site_address,
            c.grounds,
        ),
    }
}

pub fn inspection_requested(contact_name: &str, address: &str, inspection_type: &str) -> Notification {
    Notification {
        subject: format!("New inspection request: {address}"),
        body: format!(
            "{contact_name} requested a {} inspection at {address}.{SIGNATURE}",
            inspection_type.replace('_', " ")
        ),
    }
}
