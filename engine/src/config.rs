//! Init configuration for wrapped components.
//!
//! An [`InitConfig`] is built once per wrapped component type and never
//! changes afterwards. The builder starts from [`InitDefaults`], which can be
//! loaded from the `[init]` table of a TOML file.

use std::fmt;
use std::fs;
use std::future::Future;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use futures_util::future::BoxFuture;
use serde::Deserialize;
use serde_json::Value;

use kindle_core::{InitSlice, InitState, Store, default_init_state};
use kindle_types::{ConfigError, GetPrepareKey, InitSelfPolicy, Props, derive_prepare_key};

use crate::error::InitError;

// ============================================================================
// Routines
// ============================================================================

/// The future an init routine hands back.
pub type InitFuture = BoxFuture<'static, anyhow::Result<Value>>;

/// What an init routine returned when invoked.
pub enum RoutineReturn {
    /// The normal case: a future that settles when initialization is done.
    Pending(InitFuture),
    /// The routine produced a value directly instead of a future. The
    /// orchestrator rejects this as an invalid return.
    Ready(Value),
}

impl From<InitFuture> for RoutineReturn {
    fn from(future: InitFuture) -> Self {
        RoutineReturn::Pending(future)
    }
}

impl fmt::Debug for RoutineReturn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RoutineReturn::Pending(_) => f.write_str("Pending(..)"),
            RoutineReturn::Ready(value) => f.debug_tuple("Ready").field(value).finish(),
        }
    }
}

/// Store access handed to init routines: the `(dispatch, get_state)` pair.
pub struct InitContext<St: Store> {
    store: Arc<St>,
}

impl<St: Store> InitContext<St> {
    pub fn new(store: Arc<St>) -> Self {
        Self { store }
    }

    pub fn dispatch(&self, action: impl Into<St::Action>) {
        self.store.dispatch(action.into());
    }

    pub fn with_state<R>(&self, read: impl FnOnce(&St::State) -> R) -> R {
        self.store.with_state(read)
    }

    #[must_use]
    pub fn store(&self) -> &Arc<St> {
        &self.store
    }
}

impl<St: Store> Clone for InitContext<St> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
        }
    }
}

type RoutineFn<St> = dyn Fn(Props, InitContext<St>) -> RoutineReturn + Send + Sync;

/// An async initialization capability supplied by feature code.
///
/// It receives the init props as an object (nested for dotted paths) and
/// store access.
pub struct InitRoutine<St: Store>(Arc<RoutineFn<St>>);

impl<St: Store> InitRoutine<St> {
    pub fn new(
        routine: impl Fn(Props, InitContext<St>) -> RoutineReturn + Send + Sync + 'static,
    ) -> Self {
        Self(Arc::new(routine))
    }

    /// Wrap an async closure.
    pub fn from_async<F, Fut>(routine: F) -> Self
    where
        F: Fn(Props, InitContext<St>) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = anyhow::Result<Value>> + Send + 'static,
    {
        Self::new(move |props, ctx| RoutineReturn::Pending(Box::pin(routine(props, ctx))))
    }

    pub(crate) fn call(&self, props: Props, ctx: InitContext<St>) -> RoutineReturn {
        (self.0)(props, ctx)
    }
}

impl<St: Store> Clone for InitRoutine<St> {
    fn clone(&self) -> Self {
        Self(Arc::clone(&self.0))
    }
}

impl<St: Store> fmt::Debug for InitRoutine<St> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("InitRoutine(..)")
    }
}

/// The init action(s) of a component.
pub enum InitActionSpec<St: Store> {
    /// One routine, valid during preparation and on the client.
    Single(InitRoutine<St>),
    /// A prepared routine and/or a routine that only ever runs on the client
    /// after mount.
    Split {
        prepared: Option<InitRoutine<St>>,
        client_only: Option<InitRoutine<St>>,
    },
}

/// Which routine slot a routine was configured in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RoutineSlot {
    Single,
    Prepared,
    ClientOnly,
}

impl fmt::Display for RoutineSlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            RoutineSlot::Single => "the init action",
            RoutineSlot::Prepared => "the `prepared` init action",
            RoutineSlot::ClientOnly => "the `client_only` init action",
        })
    }
}

/// Normalized form of [`InitActionSpec`], resolved once at configuration time.
struct Actions<St: Store> {
    prepared: Option<InitRoutine<St>>,
    client_only: Option<InitRoutine<St>>,
    split: bool,
}

impl<St: Store> Actions<St> {
    fn resolve(spec: Option<InitActionSpec<St>>, component_id: &str) -> Result<Self, ConfigError> {
        match spec {
            None => Ok(Self {
                prepared: None,
                client_only: None,
                split: false,
            }),
            Some(InitActionSpec::Single(routine)) => Ok(Self {
                prepared: Some(routine),
                client_only: None,
                split: false,
            }),
            Some(InitActionSpec::Split {
                prepared: None,
                client_only: None,
            }) => Err(ConfigError::MalformedInitAction {
                component_id: component_id.to_string(),
            }),
            Some(InitActionSpec::Split {
                prepared,
                client_only,
            }) => Ok(Self {
                prepared,
                client_only,
                split: true,
            }),
        }
    }
}

// ============================================================================
// Options
// ============================================================================

/// Handler for init errors. When configured, routine failures are swallowed
/// after being passed here.
pub type ErrorHandler = Arc<dyn Fn(&InitError) + Send + Sync>;

/// Locates the init slice inside the store's root state.
pub type GetInitState<S> = for<'a> fn(&'a S) -> Option<&'a InitState>;

/// The serializable subset of init options.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct InitDefaults {
    /// Run the init action(s) again when init props change after mount.
    pub reinitialize: bool,
    /// Allow mounting in prepare mode without preparation; initialize on mount instead.
    pub allow_lazy: bool,
    pub init_self: InitSelfPolicy,
}

impl Default for InitDefaults {
    fn default() -> Self {
        Self {
            reinitialize: true,
            allow_lazy: false,
            init_self: InitSelfPolicy::Async,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
struct DefaultsFile {
    #[serde(default)]
    init: InitDefaults,
}

#[derive(Debug, thiserror::Error)]
pub enum DefaultsError {
    #[error("failed to read {path:?}: {source}")]
    Read {
        path: PathBuf,
        source: io::Error,
    },
    #[error("failed to parse {path:?}: {source}")]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },
}

impl InitDefaults {
    /// Parse defaults from the `[init]` table of a TOML document.
    pub fn from_toml_str(content: &str) -> Result<Self, toml::de::Error> {
        toml::from_str::<DefaultsFile>(content).map(|file| file.init)
    }

    pub fn load(path: &Path) -> Result<Self, DefaultsError> {
        let content = match fs::read_to_string(path) {
            Ok(content) => content,
            Err(err) => {
                tracing::warn!("Failed to read init defaults at {:?}: {}", path, err);
                return Err(DefaultsError::Read {
                    path: path.to_path_buf(),
                    source: err,
                });
            }
        };

        match Self::from_toml_str(&content) {
            Ok(defaults) => Ok(defaults),
            Err(err) => {
                tracing::warn!("Failed to parse init defaults at {:?}: {}", path, err);
                Err(DefaultsError::Parse {
                    path: path.to_path_buf(),
                    source: err,
                })
            }
        }
    }
}

pub struct InitOptions<St: Store> {
    pub reinitialize: bool,
    pub allow_lazy: bool,
    pub init_self: InitSelfPolicy,
    pub on_error: Option<ErrorHandler>,
    pub get_init_state: GetInitState<St::State>,
    pub get_prepare_key: GetPrepareKey,
}

impl<St: Store> fmt::Debug for InitOptions<St> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("InitOptions")
            .field("reinitialize", &self.reinitialize)
            .field("allow_lazy", &self.allow_lazy)
            .field("init_self", &self.init_self)
            .field("on_error", &self.on_error.is_some())
            .finish_non_exhaustive()
    }
}

// ============================================================================
// InitConfig
// ============================================================================

pub struct InitConfig<St: Store> {
    component_id: String,
    init_props: Vec<String>,
    actions: Actions<St>,
    options: InitOptions<St>,
    custom_prepare_key: bool,
}

impl<St: Store> InitConfig<St> {
    #[must_use]
    pub fn component_id(&self) -> &str {
        &self.component_id
    }

    #[must_use]
    pub fn init_props(&self) -> &[String] {
        &self.init_props
    }

    #[must_use]
    pub fn prepared_action(&self) -> Option<&InitRoutine<St>> {
        self.actions.prepared.as_ref()
    }

    #[must_use]
    pub fn client_only_action(&self) -> Option<&InitRoutine<St>> {
        self.actions.client_only.as_ref()
    }

    /// The actions were given as a prepared/client-only split.
    #[must_use]
    pub fn is_split(&self) -> bool {
        self.actions.split
    }

    /// No init action at all: the component never initializes.
    #[must_use]
    pub fn is_inert(&self) -> bool {
        self.actions.prepared.is_none() && self.actions.client_only.is_none()
    }

    #[must_use]
    pub fn options(&self) -> &InitOptions<St> {
        &self.options
    }

    /// Prepare keys come from the default derivation.
    #[must_use]
    pub fn uses_default_keys(&self) -> bool {
        !self.custom_prepare_key
    }

    pub(crate) fn prepared_slot(&self) -> RoutineSlot {
        if self.actions.split {
            RoutineSlot::Prepared
        } else {
            RoutineSlot::Single
        }
    }
}

impl<St: Store> InitConfig<St>
where
    St::State: InitSlice,
{
    /// Start configuring a component whose store keeps the init state in the
    /// default slice.
    #[must_use]
    pub fn builder() -> InitConfigBuilder<St> {
        InitConfigBuilder::new()
    }
}

impl<St: Store> fmt::Debug for InitConfig<St> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("InitConfig")
            .field("component_id", &self.component_id)
            .field("init_props", &self.init_props)
            .field("prepared", &self.actions.prepared.is_some())
            .field("client_only", &self.actions.client_only.is_some())
            .field("options", &self.options)
            .finish()
    }
}

pub struct InitConfigBuilder<St: Store> {
    component_id: Option<String>,
    init_props: Vec<String>,
    action: Option<InitActionSpec<St>>,
    defaults: InitDefaults,
    on_error: Option<ErrorHandler>,
    get_init_state: GetInitState<St::State>,
    get_prepare_key: Option<GetPrepareKey>,
}

impl<St: Store> Default for InitConfigBuilder<St>
where
    St::State: InitSlice,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<St: Store> InitConfigBuilder<St>
where
    St::State: InitSlice,
{
    /// A builder reading the init state from the default slice.
    #[must_use]
    pub fn new() -> Self {
        Self::with_accessor(default_init_state::<St::State>)
    }
}

impl<St: Store> InitConfigBuilder<St> {
    /// A builder reading the init state through `get_init_state`.
    #[must_use]
    pub fn with_accessor(get_init_state: GetInitState<St::State>) -> Self {
        Self {
            component_id: None,
            init_props: Vec::new(),
            action: None,
            defaults: InitDefaults::default(),
            on_error: None,
            get_init_state,
            get_prepare_key: None,
        }
    }

    /// Use an explicit component id instead of the component's name.
    #[must_use]
    pub fn component_id(mut self, id: impl Into<String>) -> Self {
        self.component_id = Some(id.into());
        self
    }

    /// Prop paths relevant to initialization, dot-separated for nesting.
    #[must_use]
    pub fn init_props<I, S>(mut self, props: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.init_props = props.into_iter().map(Into::into).collect();
        self
    }

    #[must_use]
    pub fn action(mut self, spec: InitActionSpec<St>) -> Self {
        self.action = Some(spec);
        self
    }

    /// Shorthand for a single init routine.
    #[must_use]
    pub fn init_action(self, routine: InitRoutine<St>) -> Self {
        self.action(InitActionSpec::Single(routine))
    }

    #[must_use]
    pub fn defaults(mut self, defaults: InitDefaults) -> Self {
        self.defaults = defaults;
        self
    }

    #[must_use]
    pub fn reinitialize(mut self, reinitialize: bool) -> Self {
        self.defaults.reinitialize = reinitialize;
        self
    }

    #[must_use]
    pub fn allow_lazy(mut self, allow_lazy: bool) -> Self {
        self.defaults.allow_lazy = allow_lazy;
        self
    }

    #[must_use]
    pub fn init_self(mut self, policy: InitSelfPolicy) -> Self {
        self.defaults.init_self = policy;
        self
    }

    #[must_use]
    pub fn on_error(mut self, handler: impl Fn(&InitError) + Send + Sync + 'static) -> Self {
        self.on_error = Some(Arc::new(handler));
        self
    }

    #[must_use]
    pub fn get_prepare_key(mut self, derive: GetPrepareKey) -> Self {
        self.get_prepare_key = Some(derive);
        self
    }

    /// Resolve into an immutable config. `fallback_id` is used when no
    /// explicit component id was set.
    pub fn build(self, fallback_id: &str) -> Result<InitConfig<St>, ConfigError> {
        let component_id = self
            .component_id
            .unwrap_or_else(|| fallback_id.to_string());
        if component_id.trim().is_empty() {
            return Err(ConfigError::MissingComponentId);
        }

        let actions = Actions::resolve(self.action, &component_id)?;
        let custom_prepare_key = self.get_prepare_key.is_some();

        Ok(InitConfig {
            component_id,
            init_props: self.init_props,
            actions,
            options: InitOptions {
                reinitialize: self.defaults.reinitialize,
                allow_lazy: self.defaults.allow_lazy,
                init_self: self.defaults.init_self,
                on_error: self.on_error,
                get_init_state: self.get_init_state,
                get_prepare_key: self.get_prepare_key.unwrap_or(derive_prepare_key),
            },
            custom_prepare_key,
        })
    }
}
