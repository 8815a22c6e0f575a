//! Application shell: routing, the session, notices and page rendering.
//!
//! [`AppContext`] carries everything a page needs. It is built once at
//! startup and passed down explicitly.

pub mod notify;
pub mod page;
pub mod render;
pub mod routes;
pub mod session;

pub use notify::{Notice, NoticeLevel, Notifier, TracingNotifier};
pub use page::EntityPage;
pub use routes::Route;
pub use session::Session;

use crate::backend::RecordClient;
use crate::core::CrmServices;
use crate::errors::Result;
use crate::forms::{CompanyForm, ContactForm, DealForm, QuoteForm, RecordForm, TaskForm};
use crate::schema::{DealStage, RecordId};
use crate::views::{ActivityFeed, Confirm, DashboardMetrics, Listed, PipelineBoard};
use std::sync::Arc;
use tracing::{info, instrument, warn};

/// Activities shown on the dashboard.
pub const DASHBOARD_FEED_LIMIT: usize = 5;

/// Everything a page needs: the services, the session and the notice sink.
pub struct AppContext<C> {
    services: CrmServices<C>,
    session: Session,
    notifier: Arc<dyn Notifier>,
}

impl<C: RecordClient> AppContext<C> {
    /// Context for one run of the app.
    pub fn new(services: CrmServices<C>, session: Session, notifier: Arc<dyn Notifier>) -> Self {
        Self {
            services,
            session,
            notifier,
        }
    }

    /// Services over the shared backend client.
    #[must_use]
    pub const fn services(&self) -> &CrmServices<C> {
        &self.services
    }

    /// Current session.
    #[must_use]
    pub const fn session(&self) -> &Session {
        &self.session
    }

    /// Where notices go.
    #[must_use]
    pub fn notifier(&self) -> &dyn Notifier {
        self.notifier.as_ref()
    }

    /// Renders the page at `path`, applying `search` on searchable pages.
    #[instrument(skip(self))]
    pub async fn show(&self, path: &str, search: Option<&str>) -> Result<String> {
        self.session.require()?;
        let route = Route::resolve(path);
        let term = search.filter(|_| route.searchable()).unwrap_or_default();
        let text = match route {
            Route::Dashboard => self.dashboard().await,
            Route::Contacts => self.list_page::<ContactForm>(route, term).await,
            Route::Companies => self.list_page::<CompanyForm>(route, term).await,
            Route::Quotes => self.list_page::<QuoteForm>(route, term).await,
            Route::Tasks => self.list_page::<TaskForm>(route, term).await,
            Route::Deals => self.pipeline().await?,
            Route::NotFound => render::not_found(path),
        };
        Ok(text)
    }

    /// Dashboard metrics and the latest activities.
    pub async fn dashboard(&self) -> String {
        let (metrics, recent) = tokio::join!(
            DashboardMetrics::load(&self.services),
            ActivityFeed::load(&self.services, Some(DASHBOARD_FEED_LIMIT))
        );
        render::dashboard(&metrics, &recent)
    }

    /// The pipeline board, or its retry page when deals or contacts fail to load.
    pub async fn pipeline(&self) -> Result<String> {
        self.session.require()?;
        let text = match PipelineBoard::load(&self.services).await {
            Ok(board) => render::pipeline(&board),
            Err(e) => {
                warn!("Failed to load pipeline: {}", e);
                render::pipeline_failed("Failed to load deals")
            }
        };
        Ok(text)
    }

    /// The activity feed, newest first, capped at `limit` entries when given.
    pub async fn activity(&self, limit: Option<usize>) -> Result<String> {
        self.session.require()?;
        Ok(render::feed(&ActivityFeed::load(&self.services, limit).await))
    }

    async fn list_page<F>(&self, route: Route, term: &str) -> String
    where
        F: RecordForm,
        F::Entity: Listed,
    {
        let mut page = EntityPage::<F>::new();
        page.open(&self.services).await;
        page.search(term);
        render::list(route, page.list())
    }

    /// Moves a deal on the pipeline board.
    pub async fn move_deal(&self, id: RecordId, stage: DealStage) -> Result<()> {
        self.session.require()?;
        let mut board = PipelineBoard::load(&self.services).await?;
        board
            .move_deal(&self.services.deals(), id, stage, self.notifier())
            .await
    }

    /// Deletes a record listed on the page at `path`. Returns whether it was deleted.
    pub async fn delete(&self, path: &str, id: RecordId, confirm: &dyn Confirm) -> Result<bool> {
        self.session.require()?;
        let deleted = match Route::resolve(path) {
            Route::Contacts => self.delete_from::<ContactForm>(id, confirm).await,
            Route::Companies => self.delete_from::<CompanyForm>(id, confirm).await,
            Route::Quotes => self.delete_from::<QuoteForm>(id, confirm).await,
            Route::Tasks => self.delete_from::<TaskForm>(id, confirm).await,
            Route::Deals => self.delete_from::<DealForm>(id, confirm).await,
            Route::Dashboard | Route::NotFound => {
                self.notifier.error(&format!("Nothing to delete on '{path}'"));
                false
            }
        };
        Ok(deleted)
    }

    async fn delete_from<F>(&self, id: RecordId, confirm: &dyn Confirm) -> bool
    where
        F: RecordForm,
        F::Entity: Listed,
    {
        let mut page = EntityPage::<F>::new();
        page.open(&self.services).await;
        page.delete(&self.services, id, confirm, self.notifier()).await
    }

    /// Ends the session.
    pub fn logout(&mut self) -> bool {
        let ended = self.session.logout(self.notifier.as_ref());
        if ended {
            info!("Session closed");
        }
        ended
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use crate::core::seed_demo_data;
    use crate::errors::Error;
    use crate::test_utils::{RecordingNotifier, ScriptedClient, setup_test_services};

    async fn seeded_context() -> Result<(AppContext<crate::backend::StoreRecordClient>, Arc<RecordingNotifier>)> {
        let services = setup_test_services().await?;
        seed_demo_data(&services).await?;
        let notifier = Arc::new(RecordingNotifier::default());
        let context = AppContext::new(
            services,
            Session::signed_in("ann@example.com"),
            Arc::<RecordingNotifier>::clone(&notifier),
        );
        Ok((context, notifier))
    }

    #[tokio::test]
    async fn test_show_routes() -> Result<()> {
        let (context, _) = seeded_context().await?;
        let dashboard = context.show("/", None).await?;
        assert!(dashboard.contains("Total Revenue:     $9,500"));
        assert!(dashboard.contains("Recent Activity"));

        let contacts = context.show("/contacts", Some("scully")).await?;
        assert!(contacts.contains("Dana Scully"));
        assert!(!contacts.contains("Ann Lee"));

        assert!(context.show("/deals", None).await?.contains("Negotiation (1) $85,000"));
        assert!(context.show("/nowhere", None).await?.starts_with("Page Not Found"));
        Ok(())
    }

    #[tokio::test]
    async fn test_deals_page_shows_retry_when_load_fails() -> Result<()> {
        let client = ScriptedClient::new();
        client.fail_next("connection refused");
        let notifier = Arc::new(RecordingNotifier::default());
        let context = AppContext::new(
            CrmServices::new(Arc::new(client), 100),
            Session::signed_in("ann@example.com"),
            Arc::<RecordingNotifier>::clone(&notifier),
        );

        let page = context.show("/deals", None).await?;
        assert!(page.starts_with("Sales Pipeline"));
        assert!(page.contains("Failed to load deals. Run the command again to retry."));
        assert!(!page.contains("No items in sales pipeline"));
        Ok(())
    }

    #[tokio::test]
    async fn test_signed_out_context_refuses_pages() -> Result<()> {
        let (mut context, notifier) = seeded_context().await?;
        assert!(context.logout());
        assert!(matches!(context.show("/", None).await, Err(Error::SignedOut)));
        assert_eq!(notifier.notices()[0].message, "Logged out successfully");
        Ok(())
    }

    #[tokio::test]
    async fn test_delete_respects_references() -> Result<()> {
        let (context, notifier) = seeded_context().await?;
        let company = context.services().companies().try_get_all().await?;
        let globex = company
            .iter()
            .find(|c| c.company_name.as_deref() == Some("Globex Corporation"))
            .unwrap();

        assert!(!context.delete("/companies", globex.id, &|_: &str| true).await?);
        assert_eq!(notifier.notices()[0].level, NoticeLevel::Error);
        assert!(!context.delete("/", globex.id, &|_: &str| true).await?);
        Ok(())
    }
}
