//! Headline numbers for the dashboard.

use crate::backend::RecordClient;
use crate::core::CrmServices;
use crate::schema::{Deal, DealStage};
use rust_decimal::{Decimal, RoundingStrategy};

/// Headline numbers of the dashboard.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DashboardMetrics {
    /// Sum of won deal values
    pub total_revenue: Decimal,
    /// Sum of deal values not yet won or lost
    pub pipeline_value: Decimal,
    /// Number of contacts
    pub contact_count: usize,
    /// Number of companies
    pub company_count: usize,
    /// Number of deals in any stage
    pub deal_count: usize,
    /// Revenue per won deal, rounded to a whole amount
    pub average_deal_size: Decimal,
    /// Won deals as a percentage of closed deals, rounded
    pub win_rate: u32,
}

impl DashboardMetrics {
    /// Metrics over `deals` and the given record counts.
    #[must_use]
    pub fn compute(deals: &[Deal], contact_count: usize, company_count: usize) -> Self {
        let value_of = |stage_matches: fn(Option<DealStage>) -> bool| -> Decimal {
            deals
                .iter()
                .filter(|d| stage_matches(d.stage))
                .filter_map(|d| d.value)
                .sum()
        };
        let total_revenue = value_of(|stage| stage == Some(DealStage::Won));
        let pipeline_value = value_of(|stage| !stage.is_some_and(DealStage::is_closed));

        let won = deals.iter().filter(|d| d.stage == Some(DealStage::Won)).count();
        let lost = deals.iter().filter(|d| d.stage == Some(DealStage::Lost)).count();

        let average_deal_size = if deals.is_empty() {
            Decimal::ZERO
        } else {
            (total_revenue / Decimal::from(won.max(1))).round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero)
        };
        let closed = won + lost;
        let win_rate = if closed == 0 {
            0
        } else {
            u32::try_from((won * 200 + closed) / (closed * 2)).unwrap_or(100)
        };

        Self {
            total_revenue,
            pipeline_value,
            contact_count,
            company_count,
            deal_count: deals.len(),
            average_deal_size,
            win_rate,
        }
    }

    /// Loads deals, contacts and companies concurrently. Failed loads count as empty.
    pub async fn load<C: RecordClient>(services: &CrmServices<C>) -> Self {
        let (deals, contacts, companies) = (services.deals(), services.contacts(), services.companies());
        let (deals, contacts, companies) = tokio::join!(deals.get_all(), contacts.get_all(), companies.get_all());
        Self::compute(&deals, contacts.len(), companies.len())
    }
}
