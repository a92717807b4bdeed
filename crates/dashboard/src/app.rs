//! Command execution: builds the transports from configuration, drives
//! a bridge for the requested view, and prints the rendered screen.

use std::io::Write;
use std::sync::Arc;

use bulkwatch_bridge::{
    ActiveBridge, DetailBridge, FeedStatus, ListBridge, LogHandle, Sources, StoreHandle, ViewState,
};
use bulkwatch_client::{BackendApi, LogStreamClient, PushClient};
use bulkwatch_core::{BulkActionStatus, LogStatus, ViewFilter};

use crate::cli::Command;
use crate::config::DashboardConfig;
use crate::view::{render_detail, render_list, DetailScreen, ListScreen};

/// Clear the terminal and home the cursor.
const CLEAR_SCREEN: &str = "\x1b[2J\x1b[H";

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Failed to build HTTP client: {0}")]
    Http(#[from] reqwest::Error),

    #[error("{0}")]
    Load(String),

    #[error("Bulk action '{0}' not found")]
    NotFound(String),

    #[error("Failed to write output: {0}")]
    Output(#[from] std::io::Error),
}

/// Shared store plus the transports every view draws on.
pub struct App {
    store: StoreHandle,
    api: Arc<BackendApi>,
    push: Option<Arc<PushClient>>,
    logs: Arc<LogStreamClient>,
}

impl App {
    pub fn new(config: &DashboardConfig) -> Result<Self, AppError> {
        let http = reqwest::Client::builder()
            .timeout(config.request_timeout())
            .build()?;

        Ok(Self {
            store: StoreHandle::new(),
            api: Arc::new(BackendApi::with_client(http, config.backend_url.clone())),
            push: config.pusher.clone().map(|p| Arc::new(PushClient::new(p))),
            // No overall timeout: the log stream stays open for the life
            // of the detail view.
            logs: Arc::new(LogStreamClient::new(config.backend_url.clone())),
        })
    }

    pub async fn run(&self, command: Command) -> Result<(), AppError> {
        match command {
            Command::List {
                tab,
                search,
                page,
                watch,
            } => {
                let filter = ViewFilter::new(tab, search);
                self.list(&filter, page.saturating_sub(1), watch).await
            }
            Command::Detail {
                action_id,
                tab,
                search,
                watch,
            } => {
                let filter = ViewFilter::new(tab, search);
                self.detail(&action_id, &filter, watch).await
            }
        }
    }

    /// One-shot mode reads through REST only; watch mode adds the live
    /// feeds.
    fn sources(&self, live: bool) -> Sources {
        let mut sources = Sources::new(self.api.clone());
        if live {
            if let Some(push) = &self.push {
                sources = sources.with_push(push.clone());
            }
            sources = sources.with_logs(self.logs.clone());
        }
        sources
    }

    // ---- list view ----

    async fn list(
        &self,
        filter: &ViewFilter<BulkActionStatus>,
        page: usize,
        watch: bool,
    ) -> Result<(), AppError> {
        let bridge = ListBridge::new(self.store.clone(), self.sources(watch));
        let active = bridge.activate();
        let state = active.load().await;

        // A failed initial fetch halts the view, watched or not.
        if !watch || state != ViewState::Loaded {
            self.draw_list(filter, page, &state, None, false).await?;
            active.shutdown().await;
            return match state {
                ViewState::Error(message) => Err(AppError::Load(message)),
                _ => Ok(()),
            };
        }

        let mut revisions = self.store.subscribe();
        let mut status = active.status();
        let mut status_open = true;
        loop {
            let feed = status.borrow_and_update().clone();
            self.draw_list(filter, page, &state, Some(&feed), true).await?;

            tokio::select! {
                _ = tokio::signal::ctrl_c() => break,
                changed = revisions.changed() => {
                    if changed.is_err() {
                        break;
                    }
                }
                changed = status.changed(), if status_open => {
                    status_open = changed.is_ok();
                }
            }
        }

        stop(active).await;
        Ok(())
    }

    async fn draw_list(
        &self,
        filter: &ViewFilter<BulkActionStatus>,
        page: usize,
        state: &ViewState,
        feed: Option<&FeedStatus>,
        clear: bool,
    ) -> Result<(), AppError> {
        let store = self.store.read().await;
        let text = render_list(&ListScreen {
            actions: store.all(),
            filter,
            page,
            state,
            feed,
        });
        drop(store);
        print_screen(&text, clear)
    }

    // ---- detail view ----

    async fn detail(
        &self,
        action_id: &str,
        filter: &ViewFilter<LogStatus>,
        watch: bool,
    ) -> Result<(), AppError> {
        let bridge = DetailBridge::new(self.store.clone(), self.sources(watch));
        let active = bridge.activate(action_id);
        let state = active.load().await;

        if !watch || state != ViewState::Loaded {
            self.draw_detail(action_id, filter, &state, None, None, false)
                .await?;
            active.shutdown().await;
            return match state {
                ViewState::Error(message) => Err(AppError::Load(message)),
                ViewState::NotFound => Err(AppError::NotFound(action_id.to_string())),
                _ => Ok(()),
            };
        }

        let logs = active.logs().cloned();
        let mut log_len = logs.as_ref().map(LogHandle::subscribe);
        let mut revisions = self.store.subscribe();
        let mut status = active.status();
        let mut status_open = true;
        loop {
            let feed = status.borrow_and_update().clone();
            self.draw_detail(action_id, filter, &state, Some(&feed), logs.as_ref(), true)
                .await?;

            tokio::select! {
                _ = tokio::signal::ctrl_c() => break,
                changed = revisions.changed() => {
                    if changed.is_err() {
                        break;
                    }
                }
                changed = status.changed(), if status_open => {
                    status_open = changed.is_ok();
                }
                Some(Ok(())) = async {
                    match log_len.as_mut() {
                        Some(rx) => Some(rx.changed().await),
                        None => None,
                    }
                } => {}
            }
        }

        stop(active).await;
        Ok(())
    }

    async fn draw_detail(
        &self,
        action_id: &str,
        filter: &ViewFilter<LogStatus>,
        state: &ViewState,
        feed: Option<&FeedStatus>,
        logs: Option<&LogHandle>,
        clear: bool,
    ) -> Result<(), AppError> {
        let action = self.store.find_by_external_id(action_id).await;
        let lines = match logs {
            Some(logs) => logs.snapshot().await,
            None => Vec::new(),
        };
        let text = render_detail(&DetailScreen {
            action: action.as_ref(),
            lines: &lines,
            filter,
            state,
            feed,
        });
        print_screen(&text, clear)
    }
}

async fn stop(active: ActiveBridge) {
    tracing::info!(view = %active.kind(), "Closing view");
    active.shutdown().await;
}

fn print_screen(text: &str, clear: bool) -> Result<(), AppError> {
    let mut stdout = std::io::stdout().lock();
    if clear {
        stdout.write_all(CLEAR_SCREEN.as_bytes())?;
    }
    stdout.write_all(text.as_bytes())?;
    stdout.flush()?;
    Ok(())
}
