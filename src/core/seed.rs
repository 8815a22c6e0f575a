//! Demo data for an empty store.

use super::service::CrmServices;
use crate::backend::RecordClient;
use crate::errors::{Error, Result};
use crate::schema::{
    ActivityDraft, ActivityKind, Address, CompanyDraft, CompanySize, ContactDraft, DealDraft, DealStage,
    QuoteDraft, QuoteStatus, RecordSchema, TaskDraft, TaskPriority, TaskStatus,
};
use chrono::{Duration, Utc};
use rust_decimal::Decimal;
use tracing::info;

/// How many records of each kind a seed run created.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SeedReport {
    /// Companies created
    pub companies: usize,
    /// Contacts created
    pub contacts: usize,
    /// Deals created
    pub deals: usize,
    /// Quotes created
    pub quotes: usize,
    /// Tasks created
    pub tasks: usize,
    /// Activities logged
    pub activities: usize,
}

impl SeedReport {
    /// Total number of records created.
    #[must_use]
    pub const fn total(&self) -> usize {
        self.companies + self.contacts + self.deals + self.quotes + self.tasks + self.activities
    }
}

/// Seeded records link to each other by id, so a write that echoes no record is an error here.
fn stored<E: RecordSchema>(created: Option<E>) -> Result<E> {
    created.ok_or(Error::MissingRecord { table: E::TABLE })
}

/// Fills the store with a small connected data set, unless contacts already exist.
pub async fn seed_demo_data<C: RecordClient>(services: &CrmServices<C>) -> Result<SeedReport> {
    let mut report = SeedReport::default();
    if !services.contacts().try_get_all().await?.is_empty() {
        info!("Store already holds contacts, skipping demo data");
        return Ok(report);
    }

    let now = Utc::now();
    let today = now.date_naive();

    let mut companies = Vec::new();
    for (name, industry, size, city) in [
        ("Northwind Traders", "Retail", CompanySize::Medium, "Seattle"),
        ("Globex Corporation", "Manufacturing", CompanySize::Enterprise, "Springfield"),
    ] {
        let company = stored(
            services
                .companies()
                .create(&CompanyDraft {
                    name: name.to_string(),
                    industry: industry.to_string(),
                    size: Some(size),
                    website: None,
                    phone: None,
                    address: Some(city.to_string()),
                    notes: None,
                })
                .await?,
        )?;
        companies.push(company);
        report.companies += 1;
    }

    let mut contacts = Vec::new();
    for (first, last, email, company, position) in [
        ("Ann", "Lee", "ann.lee@northwind.example", "Northwind Traders", "Buyer"),
        ("Hank", "Scorpio", "hank@globex.example", "Globex Corporation", "CEO"),
        ("Dana", "Scully", "dana@globex.example", "Globex Corporation", "Procurement"),
    ] {
        let contact = stored(
            services
                .contacts()
                .create(&ContactDraft {
                    first_name: first.to_string(),
                    last_name: last.to_string(),
                    email: email.to_string(),
                    phone: None,
                    company: company.to_string(),
                    position: Some(position.to_string()),
                    notes: None,
                })
                .await?,
        )?;
        contacts.push(contact);
        report.contacts += 1;
    }

    let mut deals = Vec::new();
    for (title, value, stage, probability, contact, company) in [
        ("Shelf restock", 12_000, DealStage::Qualified, 20, 0, 0),
        ("Plant automation", 85_000, DealStage::Negotiation, 60, 1, 1),
        ("Support renewal", 9_500, DealStage::Won, 100, 2, 1),
        ("Pilot program", 4_000, DealStage::Lost, 0, 0, 0),
    ] {
        let deal = stored(
            services
                .deals()
                .create(&DealDraft {
                    title: title.to_string(),
                    value: Decimal::from(value),
                    stage,
                    probability,
                    close_date: Some(today + Duration::days(30)),
                    notes: None,
                    contact: contacts[contact].id,
                    company: Some(companies[company].id),
                })
                .await?,
        )?;
        deals.push(deal);
        report.deals += 1;
    }

    let billing = Address {
        name: "Globex Corporation".into(),
        street: "1 Globex Way".into(),
        city: "Springfield".into(),
        state: "OR".into(),
        country: "USA".into(),
        pincode: "97477".into(),
    };
    services
        .quotes()
        .create(&QuoteDraft {
            name: "Plant automation - phase 1".into(),
            tags: None,
            quote_date: today,
            expires_on: Some(today + Duration::days(14)),
            status: QuoteStatus::Sent,
            delivery_method: Some("Email".into()),
            shipping: billing.clone(),
            billing,
            company: companies[1].id,
            contact: contacts[1].id,
            deal: Some(deals[1].id),
        })
        .await?;
    report.quotes += 1;

    for (name, status, priority, contact, deal) in [
        ("Send revised proposal", TaskStatus::InProgress, TaskPriority::High, 1, Some(1)),
        ("Schedule store visit", TaskStatus::NotStarted, TaskPriority::Medium, 0, None),
    ] {
        services
            .tasks()
            .create(&TaskDraft {
                name: name.to_string(),
                description: None,
                due: Some(now + Duration::days(3)),
                status,
                priority,
                tags: None,
                contact: Some(contacts[contact].id),
                deal: deal.map(|i: usize| deals[i].id),
            })
            .await?;
        report.tasks += 1;
    }

    for (kind, description, hours_ago, contact, deal) in [
        (ActivityKind::Call, "Discovery call about automation needs", 48, 1, Some(1)),
        (ActivityKind::Email, "Sent renewal paperwork", 24, 2, Some(2)),
        (ActivityKind::Meeting, "Store walkthrough", 2, 0, None),
    ] {
        services
            .activities()
            .create(&ActivityDraft {
                name: None,
                kind,
                description: description.to_string(),
                timestamp: now - Duration::hours(hours_ago),
                contact: Some(contacts[contact].id),
                deal: deal.map(|i: usize| deals[i].id),
            })
            .await?;
        report.activities += 1;
    }

    info!("Seeded {} demo record(s)", report.total());
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::setup_test_services;

    #[tokio::test]
    async fn test_seed_runs_once() -> Result<()> {
        let services = setup_test_services().await?;
        let first = seed_demo_data(&services).await?;
        assert_eq!(first.contacts, 3);
        assert_eq!(first.total(), 15);
        assert_eq!(services.deals().try_get_all().await?.len(), 4);

        let second = seed_demo_data(&services).await?;
        assert_eq!(second.total(), 0);
        Ok(())
    }
}
