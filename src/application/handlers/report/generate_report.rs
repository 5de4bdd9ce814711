//! GenerateReportHandler - loads a window of records and summarizes it.

use std::collections::HashMap;
use std::sync::Arc;

use crate::domain::foundation::{DomainError, UserId};
use crate::domain::people::UserRole;
use crate::domain::report::{generate_report, Report, ReportInputs, ReportPeriod, ReportRange};
use crate::ports::{
    ChildRepository, InvoiceRepository, MilestoneRepository, RequestRepository,
    SessionRepository, UserRepository,
};

#[derive(Debug, Clone, Copy)]
pub struct GenerateReportQuery {
    pub period: ReportPeriod,
    pub range: ReportRange,
}

pub struct GenerateReportHandler {
    sessions: Arc<dyn SessionRepository>,
    invoices: Arc<dyn InvoiceRepository>,
    milestones: Arc<dyn MilestoneRepository>,
    requests: Arc<dyn RequestRepository>,
    users: Arc<dyn UserRepository>,
    children: Arc<dyn ChildRepository>,
}

impl GenerateReportHandler {
    pub fn new(
        sessions: Arc<dyn SessionRepository>,
        invoices: Arc<dyn InvoiceRepository>,
        milestones: Arc<dyn MilestoneRepository>,
        requests: Arc<dyn RequestRepository>,
        users: Arc<dyn UserRepository>,
        children: Arc<dyn ChildRepository>,
    ) -> Self {
        Self {
            sessions,
            invoices,
            milestones,
            requests,
            users,
            children,
        }
    }

    pub async fn handle(&self, query: GenerateReportQuery) -> Result<Report, DomainError> {
        let (from, to) = (&query.range.start, &query.range.end);

        let sessions = self.sessions.find_starting_between(from, to).await?;
        let invoices = self.invoices.find_created_between(from, to).await?;
        let awards = self.milestones.find_awards_between(from, to).await?;
        let requests = self.requests.find_created_between(from, to).await?;

        let coach_names: HashMap<UserId, String> = self
            .users
            .list_by_roles(&[UserRole::Coach])
            .await?
            .into_iter()
            .map(|u| (u.id, u.name))
            .collect();
        let child_names = self
            .children
            .list_all()
            .await?
            .into_iter()
            .map(|c| (c.id, c.name))
            .collect();

        let report = generate_report(
            query.period,
            query.range,
            &ReportInputs {
                sessions: &sessions,
                invoices: &invoices,
                awards: &awards,
                requests: &requests,
                coach_names: &coach_names,
                child_names: &child_names,
            },
        );

        tracing::debug!(
            period = ?query.period,
            sessions = sessions.len(),
            invoices = invoices.len(),
            "Report generated"
        );

        Ok(report)
    }
}
