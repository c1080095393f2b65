//! The component wrapper.
//!
//! [`attach_init`] wraps a component with an init config. Each mounted
//! instance runs through `never initialized -> initializing <-> initialized`:
//! it initializes on first render, re-initializes when its init props change,
//! and decides at render time whether the wrapped component renders at all.

use std::sync::Arc;

use serde_json::Value;

use kindle_core::{ComponentInitSelector, ComponentInitState, ComponentRegistry, InitState, Store};
use kindle_types::{Caller, ConfigError, InitMode, InitSelfPolicy, Props};

use crate::config::{InitConfig, InitConfigBuilder};
use crate::error::InitError;
use crate::orchestrator::{InitOutcome, InitTask, init_component, read_init_state};
use crate::prepare::Preparable;

/// Prop merged into the wrapped component's props on every render.
pub const IS_INITIALIZING_PROP: &str = "isInitializing";

/// A renderable component.
pub trait Component {
    type Output;

    /// Used as the component id unless the config sets one.
    fn name(&self) -> &str;

    fn render(&self, props: &Props) -> Self::Output;
}

/// A component with an init config attached.
pub struct WithInit<C, St: Store> {
    component: C,
    config: Arc<InitConfig<St>>,
    display_name: String,
}

/// Wrap `component` with the config described by `builder` and register its
/// id in `registry`.
pub fn attach_init<C: Component, St: Store>(
    builder: InitConfigBuilder<St>,
    component: C,
    registry: &mut ComponentRegistry,
) -> Result<WithInit<C, St>, ConfigError> {
    let config = builder.build(component.name())?;
    registry.register(config.component_id(), config.uses_default_keys())?;
    tracing::debug!(component_id = config.component_id(), "Attached init config");

    Ok(WithInit {
        display_name: format!("withInit({})", config.component_id()),
        component,
        config: Arc::new(config),
    })
}

impl<C: Component, St: Store> WithInit<C, St> {
    #[must_use]
    pub fn init_config(&self) -> &Arc<InitConfig<St>> {
        &self.config
    }

    #[must_use]
    pub fn wrapped(&self) -> &C {
        &self.component
    }

    #[must_use]
    pub fn display_name(&self) -> &str {
        &self.display_name
    }

    /// Create a mounted instance with the given props.
    pub fn instance(
        &self,
        store: &Arc<St>,
        props: Props,
    ) -> Result<InitInstance<'_, C, St>, InitError> {
        let mut selector = ComponentInitSelector::new(
            self.config.component_id(),
            self.config.init_props().to_vec(),
            self.config.options().get_prepare_key,
        );
        let (derived, mode) = observe(store.as_ref(), &self.config, &mut selector, &props)?;

        Ok(InitInstance {
            wrapper: self,
            store: Arc::clone(store),
            selector,
            props,
            initialized_once: mode != InitMode::SelfInit && derived.is_prepared,
            derived,
            mode,
        })
    }
}

impl<C, St: Store> Preparable<St> for WithInit<C, St> {
    fn init_config(&self) -> Option<&Arc<InitConfig<St>>> {
        Some(&self.config)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InstancePhase {
    NeverInitialized,
    Initializing,
    Initialized,
}

/// One mounted instance of a [`WithInit`] component.
pub struct InitInstance<'w, C, St: Store> {
    wrapper: &'w WithInit<C, St>,
    store: Arc<St>,
    selector: ComponentInitSelector,
    props: Props,
    derived: Arc<ComponentInitState>,
    mode: InitMode,
    initialized_once: bool,
}

impl<C: Component, St: Store> InitInstance<'_, C, St> {
    /// Initialize after the first render.
    ///
    /// A mount that was required to be prepared and was not fails here. The
    /// returned task passes routine errors to `on_error` when one is
    /// configured.
    pub fn on_first_render(&mut self) -> Result<InitTask, InitError> {
        let task = init_component(
            &self.store,
            self.config(),
            &self.derived.init_values,
            &self.derived.prepare_key,
            Caller::DidMount,
        )?;
        Ok(route_errors(self.config(), task))
    }

    pub fn on_first_render_complete(&mut self) -> Result<(), InitError> {
        self.refresh()
    }

    /// New props from the parent. Returns the re-initialization task when the
    /// init values changed and re-initialization is enabled.
    pub fn on_props_change(&mut self, props: Props) -> Result<Option<InitTask>, InitError> {
        let previous = Arc::clone(&self.derived.init_values);
        self.props = props;
        self.refresh()?;

        let config = self.config();
        if config.init_props().is_empty()
            || !config.options().reinitialize
            || Arc::ptr_eq(&previous, &self.derived.init_values)
        {
            return Ok(None);
        }

        tracing::debug!(
            component_id = config.component_id(),
            prepare_key = %self.derived.prepare_key,
            "Init props changed; reinitializing"
        );
        let task = init_component(
            &self.store,
            config,
            &self.derived.init_values,
            &self.derived.prepare_key,
            Caller::DidUpdate,
        )?;
        Ok(Some(route_errors(config, task)))
    }

    /// The store changed; re-derive the init state.
    pub fn on_store_change(&mut self) -> Result<(), InitError> {
        self.refresh()
    }

    /// Render the wrapped component, or nothing while the init policy hides it.
    pub fn render(&self) -> Option<C::Output> {
        if self.suppress_render() {
            return None;
        }

        let mut props = self.props.clone();
        props
            .entry(IS_INITIALIZING_PROP)
            .or_insert(Value::Bool(self.is_initializing()));
        Some(self.wrapper.component.render(&props))
    }

    #[must_use]
    pub fn is_initializing(&self) -> bool {
        let config = self.config();
        if config.is_inert() {
            return false;
        }

        match self.mode {
            InitMode::SelfInit => match self.derived.self_init_status {
                Some(complete) => !complete,
                None => !self.initialized_once,
            },
            InitMode::Prepare => config.options().allow_lazy && !self.derived.is_prepared,
        }
    }

    #[must_use]
    pub fn suppress_render(&self) -> bool {
        self.is_initializing()
            && match self.config().options().init_self {
                InitSelfPolicy::Unmount => true,
                InitSelfPolicy::Blocking => !self.initialized_once,
                InitSelfPolicy::Async | InitSelfPolicy::Never => false,
            }
    }

    #[must_use]
    pub fn phase(&self) -> InstancePhase {
        if self.is_initializing() {
            InstancePhase::Initializing
        } else if self.initialized_once
            || self.derived.is_prepared
            || self.derived.self_init_status == Some(true)
        {
            InstancePhase::Initialized
        } else {
            InstancePhase::NeverInitialized
        }
    }

    #[must_use]
    pub fn initialized_once(&self) -> bool {
        self.initialized_once
    }

    #[must_use]
    pub fn derived(&self) -> &Arc<ComponentInitState> {
        &self.derived
    }

    #[must_use]
    pub fn props(&self) -> &Props {
        &self.props
    }

    fn config(&self) -> &Arc<InitConfig<St>> {
        &self.wrapper.config
    }

    fn refresh(&mut self) -> Result<(), InitError> {
        let (derived, mode) = observe(
            self.store.as_ref(),
            &self.wrapper.config,
            &mut self.selector,
            &self.props,
        )?;
        if derived.self_init_status == Some(true) {
            self.initialized_once = true;
        }
        self.derived = derived;
        self.mode = mode;
        Ok(())
    }
}

fn observe<St: Store>(
    store: &St,
    config: &InitConfig<St>,
    selector: &mut ComponentInitSelector,
    props: &Props,
) -> Result<(Arc<ComponentInitState>, InitMode), InitError> {
    read_init_state(store, config, |state: &InitState| {
        (selector.select(state, props), state.mode())
    })
}

/// Pass task errors to `on_error` when configured, otherwise surface them.
fn route_errors<St: Store>(config: &Arc<InitConfig<St>>, task: InitTask) -> InitTask {
    let config = Arc::clone(config);
    Box::pin(async move {
        match task.await {
            Err(err) => match &config.options().on_error {
                Some(handler) => {
                    handler(&err);
                    Ok(InitOutcome::ErrorHandled)
                }
                None => Err(err),
            },
            outcome => outcome,
        }
    })
}
