pub mod buffer;
pub mod config;
pub mod error;
pub mod migrate;
pub mod sync;
pub mod validate;

pub use buffer::ConfigBuffer;
pub use config::EditorConfig;
pub use error::EngineError;
pub use migrate::migrate;
pub use sync::{ChangeSynchronizer, DraftPolicy, SyncOutcome};
pub use validate::{FieldError, RuleSet, ValidatedConfig, ValidationErrors};

use kbstep_core::{
    Action, ActionProfile, Catalog, FieldValue, NormalizedUpdate, RawConfig,
    SchemaRegistry, SessionId, StepId,
};
use kbstep_storage::ConfigStore;
use tracing::Span;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Editing,
    Validating,
    Committed,
}

impl SessionState {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Editing => "editing",
            Self::Validating => "validating",
            Self::Committed => "committed",
        }
    }
}

/// One operator editing one workflow step.
///
/// Every mutation runs validation and the change synchronizer before
/// returning, so the store never sees a half-applied edit. Dropping the
/// session discards the buffer without writing anything.
pub struct EditSession<'s, S: ConfigStore + ?Sized> {
    store: &'s mut S,
    step: StepId,
    session_id: SessionId,
    state: SessionState,
    buffer: ConfigBuffer,
    rules: RuleSet,
    sync: ChangeSynchronizer,
    span: Span,
}

impl<'s, S: ConfigStore + ?Sized> EditSession<'s, S> {
    /// Load the step's record, migrate it, and resolve its action.
    ///
    /// An unknown action in the stored record rejects the whole step.
    pub fn open(
        store: &'s mut S,
        step: StepId,
        config: &EditorConfig,
    ) -> Result<Self, EngineError> {
        let session_id = SessionId::new();
        let span = tracing::info_span!("edit_session", %step, session = %session_id);
        let guard = span.enter();

        let raw = store.load(step)?.unwrap_or_default();
        let stored = ConfigBuffer::from_record(raw.clone(), config.default_action);
        let buffer = migrate(raw, config.default_action);

        let profile = match buffer.profile() {
            Ok(profile) => profile,
            Err(e) => {
                tracing::warn!(discriminator = buffer.discriminator(), "rejecting step: {e}");
                return Err(e.into());
            }
        };
        let rules = RuleSet::resolve(profile, SchemaRegistry::global())?;
        let sync = ChangeSynchronizer::new(config.draft_policy, rules.normalize(&stored));
        tracing::info!(action = %rules.action(), fields = buffer.values().len(), "session opened");

        drop(guard);
        Ok(Self {
            store,
            step,
            session_id,
            state: SessionState::Editing,
            buffer,
            rules,
            sync,
            span,
        })
    }

    pub fn step(&self) -> StepId {
        self.step
    }

    pub fn session_id(&self) -> SessionId {
        self.session_id
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn action(&self) -> Action {
        self.rules.action()
    }

    pub fn profile(&self) -> &'static ActionProfile {
        self.rules.action().profile()
    }

    pub fn buffer(&self) -> &ConfigBuffer {
        &self.buffer
    }

    pub fn store(&self) -> &S {
        &*self.store
    }

    /// Normalized form of the buffer under the current action.
    pub fn normalized(&self) -> NormalizedUpdate {
        self.rules.normalize(&self.buffer)
    }

    pub fn last_emitted(&self) -> &NormalizedUpdate {
        self.sync.last_emitted()
    }

    /// Current validation result, without changing state.
    pub fn validate(&self) -> Result<ValidatedConfig, ValidationErrors> {
        self.rules.validate(&self.buffer)
    }

    /// Display label for the selected dataset, if the catalog knows it.
    pub fn dataset_label<'c>(&self, catalog: &'c Catalog) -> Option<&'c str> {
        self.buffer
            .get("dataset")
            .and_then(FieldValue::as_text)
            .and_then(|dataset| catalog.label_for(dataset))
    }

    /// Set a field. Inactive fields may be set too; they are kept in the
    /// buffer for when the action changes back.
    ///
    /// On a store error the edit stays in the buffer; call
    /// [`EditSession::resync`] to retry the write.
    pub fn set_field(
        &mut self,
        name: &str,
        value: impl Into<FieldValue>,
    ) -> Result<SyncOutcome, EngineError> {
        self.require_editing()?;
        SchemaRegistry::global().get(name)?;
        let span = self.span.clone();
        let _guard = span.enter();

        let value = value.into();
        tracing::debug!(field = name, kind = value.type_name(), "field edited");
        self.buffer.set(name, value);
        self.sync_now()
    }

    /// Remove a field's value so its default applies again.
    pub fn clear_field(&mut self, name: &str) -> Result<SyncOutcome, EngineError> {
        self.require_editing()?;
        SchemaRegistry::global().get(name)?;
        let span = self.span.clone();
        let _guard = span.enter();

        tracing::debug!(field = name, "field cleared");
        self.buffer.remove(name);
        self.sync_now()
    }

    /// Switch the action. Field values are kept whatever the new action.
    ///
    /// An unrecognized discriminator leaves the session unchanged.
    pub fn set_action(&mut self, discriminator: &str) -> Result<SyncOutcome, EngineError> {
        self.require_editing()?;
        let span = self.span.clone();
        let _guard = span.enter();

        let action = Action::parse(discriminator)?;
        let rules = RuleSet::for_action(action)?;
        tracing::debug!(from = %self.rules.action(), to = %action, "action changed");
        self.buffer.set_discriminator(action);
        self.rules = rules;
        self.sync_now()
    }

    /// Re-run the synchronizer on the current buffer, e.g. after a failed write.
    pub fn resync(&mut self) -> Result<SyncOutcome, EngineError> {
        self.require_editing()?;
        let span = self.span.clone();
        let _guard = span.enter();
        self.sync_now()
    }

    /// Validate and hand off the buffer.
    ///
    /// On success any pending change is written and the session becomes
    /// `Committed`. On failure the session returns to `Editing` with the
    /// buffer untouched and the errors in [`EngineError::Validation`].
    pub fn commit(&mut self) -> Result<ValidatedConfig, EngineError> {
        self.require_editing()?;
        let span = self.span.clone();
        let _guard = span.enter();

        self.state = SessionState::Validating;
        let validated = match self.rules.validate(&self.buffer) {
            Ok(validated) => validated,
            Err(errors) => {
                tracing::warn!(%errors, "commit rejected");
                self.state = SessionState::Editing;
                return Err(errors.into());
            }
        };

        let current = validated.clone().into_update();
        if let Err(e) = self.sync.on_edit(&mut *self.store, self.step, current, true) {
            self.state = SessionState::Editing;
            return Err(e.into());
        }

        self.state = SessionState::Committed;
        tracing::info!(action = %validated.action(), "session committed");
        Ok(validated)
    }

    /// The full buffer as a record, inactive values included.
    pub fn snapshot(&self) -> RawConfig {
        self.buffer.to_record()
    }

    fn require_editing(&self) -> Result<(), EngineError> {
        match self.state {
            SessionState::Editing => Ok(()),
            state => Err(EngineError::AlreadyCommitted(format!(
                "{} ({})",
                self.session_id,
                state.as_str()
            ))),
        }
    }

    fn sync_now(&mut self) -> Result<SyncOutcome, EngineError> {
        let current = self.rules.normalize(&self.buffer);
        let valid = self.rules.validate(&self.buffer).is_ok();
        Ok(self.sync.on_edit(&mut *self.store, self.step, current, valid)?)
    }
}

impl<S: ConfigStore + ?Sized> std::fmt::Debug for EditSession<'_, S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EditSession")
            .field("step", &self.step)
            .field("session_id", &self.session_id)
            .field("state", &self.state)
            .field("buffer", &self.buffer)
            .finish_non_exhaustive()
    }
}
