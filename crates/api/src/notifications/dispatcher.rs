//! Event-to-email routing.

use std::sync::Arc;

use roofline_core::roles::{ROLE_ADMIN, ROLE_REVIEWER};
use roofline_core::types::DbId;
use roofline_db::models::report::Report;
use roofline_db::repositories::{
    AssignmentRepo, ComplaintRepo, InspectionRequestRepo, ReportRepo, UserRepo,
};
use roofline_db::DbPool;
use roofline_events::templates::{self, ComplaintSummary, ReportRef};
use roofline_events::{event_types, EmailDelivery, Notification, PlatformEvent};
use tokio::sync::broadcast;

type DispatchResult<T> = Result<T, Box<dyn std::error::Error + Send + Sync>>;

/// A rendered message and who should receive it.
struct Outgoing {
    recipients: Vec<String>,
    notification: Notification,
}

/// Turns platform events into emails.
///
/// Without an [`EmailDelivery`] the dispatcher still resolves recipients and
/// logs what it would have sent.
pub struct NotificationDispatcher {
    pool: DbPool,
    email: Option<Arc<EmailDelivery>>,
    board_email: Option<String>,
}

impl NotificationDispatcher {
    pub fn new(
        pool: DbPool,
        email: Option<Arc<EmailDelivery>>,
        board_email: Option<String>,
    ) -> Self {
        Self {
            pool,
            email,
            board_email,
        }
    }

    /// Process events until the bus is dropped.
    pub async fn run(self, mut receiver: broadcast::Receiver<PlatformEvent>) {
        loop {
            match receiver.recv().await {
                Ok(event) => {
                    if let Err(e) = self.route_event(&event).await {
                        tracing::error!(
                            error = %e,
                            event_type = %event.event_type,
                            "Failed to dispatch notification"
                        );
                    }
                }
                Err(broadcast::error::RecvError::Lagged(n)) => {
                    tracing::warn!(skipped = n, "Notification dispatcher lagged");
                }
                Err(broadcast::error::RecvError::Closed) => {
                    tracing::info!("Event bus closed, notification dispatcher shutting down");
                    break;
                }
            }
        }
    }

    async fn route_event(&self, event: &PlatformEvent) -> DispatchResult<()> {
        let Some(outgoing) = self.compose(event).await? else {
            return Ok(());
        };
        self.deliver(&event.event_type, outgoing).await;
        Ok(())
    }

    async fn compose(&self, event: &PlatformEvent) -> DispatchResult<Option<Outgoing>> {
        let outgoing = match event.event_type.as_str() {
            event_types::REPORT_SUBMITTED => {
                let Some(report) = self.source_report(event).await? else {
                    return Ok(None);
                };
                let inspector = self.actor_name(event).await?;
                Outgoing {
                    recipients: self.reviewer_emails().await?,
                    notification: templates::report_submitted(report_ref(&report), &inspector),
                }
            }
            event_types::REPORT_APPROVED => {
                let Some(report) = self.source_report(event).await? else {
                    return Ok(None);
                };
                let reviewer = self.actor_name(event).await?;
                Outgoing {
                    recipients: self.user_emails(report.inspector_id).await?,
                    notification: templates::report_approved(report_ref(&report), &reviewer),
                }
            }
            event_types::REPORT_REVISION_REQUIRED => {
                let Some(report) = self.source_report(event).await? else {
                    return Ok(None);
                };
                let reviewer = self.actor_name(event).await?;
                Outgoing {
                    recipients: self.user_emails(report.inspector_id).await?,
                    notification: templates::revision_required(
                        report_ref(&report),
                        &reviewer,
                        event.payload_str("comment"),
                    ),
                }
            }
            event_types::REPORT_FINALISED => {
                let Some(report) = self.source_report(event).await? else {
                    return Ok(None);
                };
                Outgoing {
                    recipients: self.user_emails(report.inspector_id).await?,
                    notification: templates::report_finalised(report_ref(&report)),
                }
            }
            event_types::SHARE_CREATED => {
                let Some(to) = event.payload_str("recipient_email") else {
                    tracing::debug!("Share has no recipient email, nothing to send");
                    return Ok(None);
                };
                let (Some(report_id), Some(link)) =
                    (event.payload_id("report_id"), event.payload_str("link"))
                else {
                    return Err("share.created event is missing report_id or link".into());
                };
                let expires_at = event
                    .payload_str("expires_at")
                    .and_then(|s| chrono::DateTime::parse_from_rfc3339(s).ok())
                    .map(|t| t.with_timezone(&chrono::Utc))
                    .ok_or("share.created event has no valid expires_at")?;
                let Some(report) = ReportRepo::find_by_id(&self.pool, report_id).await? else {
                    return Ok(None);
                };
                Outgoing {
                    recipients: vec![to.to_string()],
                    notification: templates::share_created(
                        report_ref(&report),
                        event.payload_str("recipient_name"),
                        link,
                        expires_at,
                    ),
                }
            }
            event_types::ASSIGNMENT_CREATED => {
                let Some(assignment_id) = event.source_entity_id else {
                    return Ok(None);
                };
                let Some(assignment) = AssignmentRepo::find_by_id(&self.pool, assignment_id).await?
                else {
                    return Ok(None);
                };
                let Some(report) = ReportRepo::find_by_id(&self.pool, assignment.report_id).await?
                else {
                    return Ok(None);
                };
                Outgoing {
                    recipients: self.user_emails(Some(assignment.inspector_id)).await?,
                    notification: templates::assignment_created(
                        report_ref(&report),
                        assignment.due_date,
                    ),
                }
            }
            event_types::COMPLAINT_SUBMITTED => {
                let Some(board) = self.board_email.clone() else {
                    tracing::warn!("LBP_BOARD_EMAIL is not configured; complaint not emailed");
                    return Ok(None);
                };
                let Some(complaint_id) = event.source_entity_id else {
                    return Ok(None);
                };
                let Some(complaint) = ComplaintRepo::find_by_id(&self.pool, complaint_id).await?
                else {
                    return Ok(None);
                };
                let Some(report) = ReportRepo::find_by_id(&self.pool, complaint.report_id).await?
                else {
                    return Ok(None);
                };
                let summary = ComplaintSummary {
                    reference: complaint.submission_reference.as_deref().unwrap_or(""),
                    report_number: &report.report_number,
                    complainant_name: complaint.complainant_name.as_deref().unwrap_or(""),
                    complainant_email: complaint.complainant_email.as_deref().unwrap_or(""),
                    practitioner_name: complaint.practitioner_name.as_deref().unwrap_or(""),
                    practitioner_lbp_number: complaint
                        .practitioner_lbp_number
                        .as_deref()
                        .unwrap_or(""),
                    site_address: complaint.site_address.as_deref().unwrap_or(""),
                    grounds: complaint.grounds.as_deref().unwrap_or(""),
                    desired_outcome: complaint.desired_outcome.as_deref(),
                };
                Outgoing {
                    recipients: vec![board],
                    notification: templates::complaint_submitted(summary),
                }
            }
            event_types::INSPECTION_REQUESTED => {
                let Some(request_id) = event.source_entity_id else {
                    return Ok(None);
                };
                let Some(request) = InspectionRequestRepo::find_by_id(&self.pool, request_id).await?
                else {
                    return Ok(None);
                };
                Outgoing {
                    recipients: self.reviewer_emails().await?,
                    notification: templates::inspection_requested(
                        &request.contact_name,
                        &request.property_address,
                        &request.inspection_type,
                    ),
                }
            }
            other => {
                tracing::debug!(event_type = other, "No notification for event type");
                return Ok(None);
            }
        };
        Ok(Some(outgoing))
    }

    /// Send to each recipient. One failed recipient does not stop the rest.
    async fn deliver(&self, event_type: &str, outgoing: Outgoing) {
        if outgoing.recipients.is_empty() {
            tracing::debug!(event_type, "Notification has no recipients");
            return;
        }

        let Some(email) = &self.email else {
            tracing::info!(
                event_type,
                recipients = outgoing.recipients.len(),
                subject = %outgoing.notification.subject,
                "Email disabled; notification not sent"
            );
            return;
        };

        for to in &outgoing.recipients {
            if let Err(e) = email.send_notification(to, &outgoing.notification).await {
                tracing::warn!(error = %e, event_type, to = %to, "Failed to send notification email");
            }
        }
    }

    async fn source_report(&self, event: &PlatformEvent) -> DispatchResult<Option<Report>> {
        match event.source_entity_id {
            Some(id) => Ok(ReportRepo::find_by_id(&self.pool, id).await?),
            None => Ok(None),
        }
    }

    async fn actor_name(&self, event: &PlatformEvent) -> DispatchResult<String> {
        let user = match event.actor_user_id {
            Some(id) => UserRepo::find_by_id(&self.pool, id).await?,
            None => None,
        };
        Ok(user.map_or_else(|| "A team member".to_string(), |u| u.display_name))
    }

    async fn reviewer_emails(&self) -> DispatchResult<Vec<String>> {
        let users = UserRepo::list_active_by_roles(&self.pool, &[ROLE_REVIEWER, ROLE_ADMIN]).await?;
        Ok(users.into_iter().map(|u| u.email).collect())
    }

    async fn user_emails(&self, user_id: Option<DbId>) -> DispatchResult<Vec<String>> {
        let Some(id) = user_id else {
            return Ok(Vec::new());
        };
        Ok(UserRepo::find_by_id(&self.pool, id)
            .await?
            .filter(|u| u.is_active)
            .map(|u| vec![u.email])
            .unwrap_or_default())
    }
}

fn report_ref(report: &Report) -> ReportRef<'_> {
    ReportRef {
        report_number: &report.report_number,
        property_address: report.property_address.as_deref(),
    }
}
