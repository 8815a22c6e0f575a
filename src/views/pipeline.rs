//! The deal pipeline board.

use super::names::NameIndex;
use crate::app::notify::Notifier;
use crate::backend::RecordClient;
use crate::core::{CrmServices, RecordService};
use crate::errors::{Error, Result};
use crate::schema::{Choice, Deal, DealPatch, DealStage, RecordId, RecordSchema};
use rust_decimal::Decimal;
use tracing::{info, instrument, warn};

/// One board column.
#[derive(Debug, Clone, PartialEq)]
pub struct StageColumn<'a> {
    /// Stage of the column
    pub stage: DealStage,
    /// Deals in the stage, in load order
    pub deals: Vec<&'a Deal>,
    /// Sum of the column's deal values
    pub total: Decimal,
}

/// Deals grouped by stage, with contact names resolved.
#[derive(Debug, Clone, Default)]
pub struct PipelineBoard {
    deals: Vec<Deal>,
    names: NameIndex,
}

impl PipelineBoard {
    /// Board over already loaded deals.
    #[must_use]
    pub fn new(deals: Vec<Deal>, names: NameIndex) -> Self {
        Self { deals, names }
    }

    /// Loads deals and contacts concurrently.
    pub async fn load<C: RecordClient>(services: &CrmServices<C>) -> Result<Self> {
        let (deals, contacts) = (services.deals(), services.contacts());
        let (deals, contacts) = tokio::join!(deals.try_get_all(), contacts.try_get_all());
        Ok(Self::new(deals?, NameIndex::from_contacts(&contacts?)))
    }

    /// Every loaded deal.
    #[must_use]
    pub fn deals(&self) -> &[Deal] {
        &self.deals
    }

    /// Whether there are no deals at all.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.deals.is_empty()
    }

    /// The five stage columns, in pipeline order. Deals without a stage are not shown.
    #[must_use]
    pub fn columns(&self) -> Vec<StageColumn<'_>> {
        DealStage::ALL
            .iter()
            .map(|&stage| {
                let deals: Vec<&Deal> = self.deals.iter().filter(|d| d.stage == Some(stage)).collect();
                let total = deals.iter().filter_map(|d| d.value).sum();
                StageColumn { stage, deals, total }
            })
            .collect()
    }

    /// Display name of the deal's contact.
    #[must_use]
    pub fn contact_name(&self, deal: &Deal) -> String {
        self.names.contact_name(deal.contact.as_ref())
    }

    /// Moves a deal to `stage`.
    ///
    /// Only the stage is sent. The local copy changes once the backend accepted it.
    #[instrument(skip(self, service, notifier))]
    pub async fn move_deal<C: RecordClient>(
        &mut self,
        service: &RecordService<'_, Deal, C>,
        id: RecordId,
        stage: DealStage,
        notifier: &dyn Notifier,
    ) -> Result<()> {
        let Some(index) = self.deals.iter().position(|d| d.id == id) else {
            return Err(Error::MissingRecord { table: Deal::TABLE });
        };
        if self.deals[index].stage == Some(stage) {
            return Ok(());
        }
        let patch = DealPatch {
            stage: Some(stage),
            ..DealPatch::default()
        };
        match service.update(id, &patch).await {
            Ok(_) => {
                self.deals[index].stage = Some(stage);
                info!("Deal {} moved to {}", id, stage);
                notifier.success("Deal stage updated successfully");
                Ok(())
            }
            Err(e) => {
                warn!("Failed to move deal {}: {}", id, e);
                notifier.error("Failed to update deal stage");
                Err(e)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use crate::backend::{RecordResult, ResponseEnvelope};
    use crate::test_utils::{RecordingNotifier, ScriptedClient, sample_contact_draft, sample_deal_draft, setup_test_services};
    use crate::views::UNKNOWN_CONTACT;
    use serde_json::json;

    fn deal(id: i64, stage: &str, value: i64, contact: i64) -> Deal {
        serde_json::from_value(json!({
            "Id": id,
            "title_c": format!("Deal {id}"),
            "stage_c": stage,
            "value_c": value,
            "contact_id_c": contact
        }))
        .unwrap()
    }

    #[test]
    fn test_columns_group_and_sum() {
        let board = PipelineBoard::new(
            vec![deal(1, "won", 100, 9), deal(2, "qualified", 50, 9), deal(3, "won", 25, 9)],
            NameIndex::default(),
        );
        let columns = board.columns();
        let stages: Vec<DealStage> = columns.iter().map(|c| c.stage).collect();
        assert_eq!(stages, DealStage::ALL.to_vec());
        assert_eq!(columns[0].deals.len(), 1);
        assert_eq!(columns[3].total, Decimal::from(125));
        assert_eq!(columns[4].total, Decimal::ZERO);
        assert_eq!(board.contact_name(&board.deals()[0]), UNKNOWN_CONTACT);
    }

    #[tokio::test]
    async fn test_move_sends_only_the_stage() {
        let client = ScriptedClient::new();
        client.respond(ResponseEnvelope::with_results(vec![RecordResult::accepted(
            json!({"Id": 2, "stage_c": "proposal"}),
        )]));
        let notifier = RecordingNotifier::default();
        let mut board = PipelineBoard::new(vec![deal(2, "qualified", 50, 9)], NameIndex::default());

        board
            .move_deal(&RecordService::new(&client, 100), RecordId(2), DealStage::Proposal, &notifier)
            .await
            .unwrap();
        assert_eq!(client.calls()[0].body, json!({"records": [{"Id": 2, "stage_c": "proposal"}]}));
        assert_eq!(board.deals()[0].stage, Some(DealStage::Proposal));
        assert_eq!(board.deals()[0].value, Some(Decimal::from(50)));
    }

    #[tokio::test]
    async fn test_failed_move_keeps_local_stage() {
        let client = ScriptedClient::new();
        client.respond(ResponseEnvelope::failure("nope"));
        let notifier = RecordingNotifier::default();
        let mut board = PipelineBoard::new(vec![deal(2, "qualified", 50, 9)], NameIndex::default());

        let result = board
            .move_deal(&RecordService::new(&client, 100), RecordId(2), DealStage::Won, &notifier)
            .await;
        assert!(result.is_err());
        assert_eq!(board.deals()[0].stage, Some(DealStage::Qualified));
        assert_eq!(notifier.notices()[0].message, "Failed to update deal stage");
    }

    #[tokio::test]
    async fn test_load_resolves_contact_names() -> Result<()> {
        let services = setup_test_services().await?;
        let ann = services.contacts().create(&sample_contact_draft("Ann", "Lee")).await?.unwrap();
        services.deals().create(&sample_deal_draft("Renewal", ann.id)).await?;

        let board = PipelineBoard::load(&services).await?;
        let proposal = &board.columns()[1];
        assert_eq!(proposal.deals.len(), 1);
        assert_eq!(board.contact_name(proposal.deals[0]), "Ann Lee");
        Ok(())
    }
}
