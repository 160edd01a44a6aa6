use std::{sync::Arc, time::Duration};

use shared::{
    domain::{CapabilitiesSummary, DescriptionId, DeviceDescription, StatusSnapshot},
    protocol::pretty_print,
};
use tokio::{
    sync::{broadcast, Mutex},
    task::JoinHandle,
};
use tracing::{debug, info, warn};

pub mod error;
pub mod notifier;
pub mod state;
pub mod transport;

pub use error::{normalize_failure, ClientError, NormalizedFailure, RequestFailure};
pub use notifier::{Confirmation, ErrorDialog, Notice, Notifier, RichText, Severity, TextSpan};
pub use state::{RepositoryEvent, RepositoryState};
pub use transport::{HttpRepositoryApi, RepositoryApi};

const DEFAULT_ALERT_TIMEOUT: Duration = Duration::from_millis(2000);
const EVENT_CHANNEL_CAPACITY: usize = 256;

const INSERTED_TEXT: &str = "The device description was successfully inserted into the repository.";
const DELETED_TEXT: &str = "The device description was successfully deleted.";
const CLEARED_TEXT: &str = "All device descriptions were deleted from the repository.";

#[derive(Debug, Clone)]
pub struct ClientOptions {
    /// How long success notices stay visible.
    pub alert_timeout: Duration,
}

impl Default for ClientOptions {
    fn default() -> Self {
        Self {
            alert_timeout: DEFAULT_ALERT_TIMEOUT,
        }
    }
}

/// Whether detail messages of a failed call feed the validation error list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DetailHandling {
    Ignore,
    Validation,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeleteOutcome {
    Deleted,
    Cancelled,
}

/// Controller for the device description repository page.
///
/// Keeps a local mirror of the server's list that is patched after each
/// successful create/delete instead of being re-fetched. Every failed call is
/// reported through the [`Notifier`] exactly once; the returned `Err` is for
/// programmatic callers and has already been shown to the user.
pub struct RepositoryClient {
    api: Arc<dyn RepositoryApi>,
    notifier: Arc<dyn Notifier>,
    options: ClientOptions,
    inner: Mutex<RepositoryState>,
    events: broadcast::Sender<RepositoryEvent>,
}

impl RepositoryClient {
    pub fn new(api: Arc<dyn RepositoryApi>, notifier: Arc<dyn Notifier>) -> Arc<Self> {
        Self::with_options(api, notifier, ClientOptions::default())
    }

    pub fn with_options(
        api: Arc<dyn RepositoryApi>,
        notifier: Arc<dyn Notifier>,
        options: ClientOptions,
    ) -> Arc<Self> {
        let (events, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);
        Arc::new(Self {
            api,
            notifier,
            options,
            inner: Mutex::new(RepositoryState::default()),
            events,
        })
    }

    pub fn subscribe_events(&self) -> broadcast::Receiver<RepositoryEvent> {
        self.events.subscribe()
    }

    pub async fn snapshot(&self) -> RepositoryState {
        self.inner.lock().await.clone()
    }

    pub async fn descriptions(&self) -> Vec<DeviceDescription> {
        self.inner.lock().await.descriptions.clone()
    }

    fn emit(&self, event: RepositoryEvent) {
        // No subscribers is fine.
        let _ = self.events.send(event);
    }

    /// Runs the three startup fetches concurrently. Failures are reported
    /// through the notifier and do not stop the other fetches.
    pub async fn initialize(&self) {
        let _ = tokio::join!(
            self.refresh_descriptions(),
            self.refresh_example(),
            self.refresh_status(),
        );
    }

    pub fn spawn_initialization(self: &Arc<Self>) -> JoinHandle<()> {
        let client = Arc::clone(self);
        tokio::spawn(async move { client.initialize().await })
    }

    /// Replaces the local list with the server's.
    pub async fn refresh_descriptions(&self) -> Result<usize, ClientError> {
        let descriptions = match self.api.list_descriptions().await {
            Ok(descriptions) => descriptions,
            Err(failure) => return Err(self.fail(failure, DetailHandling::Ignore).await),
        };

        let count = descriptions.len();
        {
            let mut guard = self.inner.lock().await;
            guard.descriptions = descriptions;
            guard.descriptions_loaded = true;
        }
        debug!(count, "device descriptions loaded");
        self.emit(RepositoryEvent::DescriptionsLoaded { count });
        Ok(count)
    }

    /// Fetches the example description and seeds the input buffer with it.
    pub async fn refresh_example(&self) -> Result<(), ClientError> {
        let example = match self.api.fetch_example().await {
            Ok(example) => example,
            Err(failure) => return Err(self.fail(failure, DetailHandling::Ignore).await),
        };
        let text = match pretty_print(&example) {
            Ok(text) => text,
            Err(err) => {
                let failure = RequestFailure::Decode(err.to_string());
                return Err(self.fail(failure, DetailHandling::Ignore).await);
            }
        };

        {
            let mut guard = self.inner.lock().await;
            guard.example = Some(example);
            guard.input = text;
        }
        self.emit(RepositoryEvent::ExampleLoaded);
        self.emit(RepositoryEvent::InputChanged);
        Ok(())
    }

    pub async fn refresh_status(&self) -> Result<StatusSnapshot, ClientError> {
        self.inner.lock().await.loading_status = true;
        self.emit(RepositoryEvent::StatusLoading(true));

        let result = self.api.fetch_status().await;

        {
            let mut guard = self.inner.lock().await;
            guard.loading_status = false;
            if let Ok(status) = &result {
                guard.status = status.clone();
            }
        }
        self.emit(RepositoryEvent::StatusLoading(false));

        match result {
            Ok(status) => {
                self.emit(RepositoryEvent::StatusUpdated(status.clone()));
                Ok(status)
            }
            Err(failure) => Err(self.fail(failure, DetailHandling::Ignore).await),
        }
    }

    pub async fn refresh_capabilities(&self) -> Result<CapabilitiesSummary, ClientError> {
        let capabilities = match self.api.fetch_capabilities().await {
            Ok(capabilities) => capabilities,
            Err(failure) => return Err(self.fail(failure, DetailHandling::Ignore).await),
        };
        self.inner.lock().await.capabilities = Some(capabilities.clone());
        self.emit(RepositoryEvent::CapabilitiesUpdated);
        Ok(capabilities)
    }

    pub async fn set_input(&self, text: impl Into<String>) {
        self.inner.lock().await.input = text.into();
        self.emit(RepositoryEvent::InputChanged);
    }

    /// Restores the input buffer to the pretty-printed example, if one was loaded.
    pub async fn reset_input(&self) {
        let changed = {
            let mut guard = self.inner.lock().await;
            let example = guard.example.as_ref().map(pretty_print);
            match example {
                Some(Ok(text)) => {
                    guard.input = text;
                    true
                }
                _ => false,
            }
        };
        if changed {
            self.emit(RepositoryEvent::InputChanged);
        }
    }

    pub async fn add_from_input(&self) -> Result<DeviceDescription, ClientError> {
        let input = self.inner.lock().await.input.clone();
        self.add_description(input).await
    }

    /// Submits `input_text` to the repository and appends the created record.
    pub async fn add_description(
        &self,
        input_text: impl Into<String>,
    ) -> Result<DeviceDescription, ClientError> {
        self.set_validation_errors(None).await;

        let created = match self.api.create_description(input_text.into()).await {
            Ok(created) => created,
            Err(failure) => return Err(self.fail(failure, DetailHandling::Validation).await),
        };

        self.inner.lock().await.descriptions.push(created.clone());
        info!(id = %created.id(), name = created.name(), "device description inserted");
        self.emit(RepositoryEvent::DescriptionAdded(created.clone()));
        self.notifier
            .notify(Notice::success(INSERTED_TEXT, self.options.alert_timeout));
        Ok(created)
    }

    /// Asks for confirmation, then deletes the description with `id`.
    ///
    /// `id` must be present in the local list; an unknown id is rejected
    /// before any prompt or request.
    pub async fn delete_description(&self, id: &DescriptionId) -> Result<DeleteOutcome, ClientError> {
        let name = {
            let guard = self.inner.lock().await;
            guard.find(id).map(|description| description.name().to_string())
        };
        let Some(name) = name else {
            warn!(%id, "delete requested for a device description that is not listed");
            return Err(ClientError::UnknownDescription(id.clone()));
        };

        if !self
            .notifier
            .confirm(Confirmation::delete_description(&name))
            .await
        {
            debug!(%id, "delete not confirmed");
            return Ok(DeleteOutcome::Cancelled);
        }

        if let Err(failure) = self.api.delete_description(id).await {
            return Err(self.fail(failure, DetailHandling::Ignore).await);
        }

        // A concurrent delete may already have spliced the entry.
        let removed = self.inner.lock().await.remove_first(id);
        if removed.is_some() {
            self.emit(RepositoryEvent::DescriptionRemoved(id.clone()));
        }
        info!(%id, name = %name, "device description deleted");
        self.notifier
            .notify(Notice::success(DELETED_TEXT, self.options.alert_timeout));
        Ok(DeleteOutcome::Deleted)
    }

    /// Asks for confirmation, then deletes every description in the repository.
    pub async fn clear_repository(&self) -> Result<DeleteOutcome, ClientError> {
        if !self.notifier.confirm(Confirmation::clear_repository()).await {
            debug!("clear repository not confirmed");
            return Ok(DeleteOutcome::Cancelled);
        }

        if let Err(failure) = self.api.clear_repository().await {
            return Err(self.fail(failure, DetailHandling::Ignore).await);
        }

        self.inner.lock().await.descriptions.clear();
        info!("repository cleared");
        self.emit(RepositoryEvent::RepositoryCleared);
        self.notifier
            .notify(Notice::success(CLEARED_TEXT, self.options.alert_timeout));
        Ok(DeleteOutcome::Deleted)
    }

    async fn set_validation_errors(&self, errors: Option<Vec<String>>) {
        self.inner.lock().await.validation_errors = errors.clone();
        self.emit(RepositoryEvent::ValidationErrorsChanged(errors));
    }

    /// Reports a failed call to the user and hands back the error for the caller.
    async fn fail(&self, failure: RequestFailure, details: DetailHandling) -> ClientError {
        let normalized = normalize_failure(&failure);
        warn!(error = %failure, shown = %normalized.message, "repository request failed");
        self.notifier.show_error(ErrorDialog::new(normalized.message));

        if let (DetailHandling::Validation, Some(detail_messages)) =
            (details, normalized.detail_messages)
        {
            self.set_validation_errors(Some(detail_messages)).await;
        }

        ClientError::Request(failure)
    }
}

#[cfg(test)]
#[path = "tests/lib_tests.rs"]
mod tests;
