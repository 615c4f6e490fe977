//! Scoped headless-browser acquisition with guaranteed cleanup.
//!
//! Grounded on `dashflow-playwright`'s `BrowserState` (context must
//! outlive page in Playwright's ownership model). Generalizes that
//! pattern into a guard whose `Drop` closes the browser context on every
//! exit path, per spec §5: "Browser contexts must be closed in a cleanup
//! path on every exit (including panic/exception) to avoid leaking
//! tracing buffers, the root cause of historical OOMs."

use playwright::api::{Browser, BrowserContext, Page, Playwright};
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::warn;

pub struct BrowserSession {
    // Held only to keep the browser process alive for the context's
    // lifetime; Playwright's ownership model requires the context to
    // outlive any page created from it.
    _browser: Browser,
    context: Arc<Mutex<BrowserContext>>,
    page: Arc<Mutex<Page>>,
    closed: bool,
}

impl BrowserSession {
    /// Launches headless Chromium. `pw_trace` toggles Playwright tracing,
    /// off by default per spec §5/§6 (`PW_TRACE`).
    pub async fn launch(pw_trace: bool, storage_state: Option<serde_json::Value>) -> anyhow::Result<Self> {
        let playwright = Playwright::initialize().await?;
        playwright.install_chromium()?;

        let chromium = playwright.chromium();
        let browser = chromium.launcher().headless(true).launch().await?;

        let mut context_builder = browser.context_builder();
        if let Some(state) = storage_state {
            let state = serde_json::from_value(state)?;
            context_builder = context_builder.storage_state(state);
        }
        let context = context_builder.build().await?;

        if pw_trace {
            warn!("PW_TRACE enabled; tracing buffers will accumulate for this run");
        }

        let page = context.new_page().await?;

        Ok(Self {
            _browser: browser,
            context: Arc::new(Mutex::new(context)),
            page: Arc::new(Mutex::new(page)),
            closed: false,
        })
    }

    pub async fn page(&self) -> tokio::sync::MutexGuard<'_, Page> {
        self.page.lock().await
    }

    /// Exports cookies + localStorage in the shape `SessionState`
    /// persists, for writing a new session blob after login.
    pub async fn storage_state(&self) -> anyhow::Result<serde_json::Value> {
        let context = self.context.lock().await;
        Ok(serde_json::to_value(context.storage_state().await?)?)
    }

    /// Explicit close. Safe to call once; idempotent no-op after the
    /// first call or after `Drop` has already run it.
    pub async fn close(mut self) -> anyhow::Result<()> {
        self.close_inner().await
    }

    async fn close_inner(&mut self) -> anyhow::Result<()> {
        if self.closed {
            return Ok(());
        }
        self.closed = true;
        let context = self.context.lock().await;
        context.close().await?;
        Ok(())
    }
}

impl Drop for BrowserSession {
    fn drop(&mut self) {
        if self.closed {
            return;
        }
        // Best-effort cleanup on a path that forgot (or panicked before
        // reaching) the explicit `close()` call. Spawned, since `Drop`
        // cannot be async; logged because a silently-leaked context is
        // exactly the historical-OOM failure mode this guards against.
        let context = self.context.clone();
        if let Ok(handle) = tokio::runtime::Handle::try_current() {
            handle.spawn(async move {
                let context = context.lock().await;
                if let Err(e) = context.close().await {
                    warn!(error = %e, "failed to close leaked browser context");
                }
            });
        } else {
            warn!("browser context dropped outside a tokio runtime; could not schedule cleanup");
        }
    }
}
