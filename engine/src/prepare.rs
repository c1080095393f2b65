//! Server-side preparation helpers.

use std::sync::Arc;

use futures_util::future::{self, BoxFuture};

use kindle_core::Store;
use kindle_types::{Caller, InitMode, InitValues, PrepareKey, Props, extract_from_props};

use crate::config::InitConfig;
use crate::error::InitError;
use crate::orchestrator::{InitOutcome, InitTask, init_component, read_init_state};

/// Anything that may carry an init config.
///
/// Wrapped components return their config. Plain components return `None`;
/// other wrappers delegate to what they wrap.
pub trait Preparable<St: Store> {
    fn init_config(&self) -> Option<&Arc<InitConfig<St>>>;
}

/// Settles when every component of a [`prepare_components`] call is prepared.
pub type PrepareAll = BoxFuture<'static, Result<Vec<InitOutcome>, InitError>>;

/// Prepare one component for `props`.
///
/// Components without an init config, and calls made outside of
/// [`InitMode::Prepare`], resolve immediately. Every configured init prop must
/// be present in `props`.
pub fn prepare_component<St: Store>(
    store: &Arc<St>,
    component: &dyn Preparable<St>,
    props: &Props,
) -> Result<InitTask, InitError> {
    match resolve(store, component, props)? {
        Some(target) => target.start(store),
        None => Ok(skipped()),
    }
}

/// Prepare several components with the same props. The returned future
/// resolves with every outcome, in order, or with the first failure.
///
/// Every component is checked before any of them is started, so a missing
/// init prop leaves the store untouched.
pub fn prepare_components<St: Store>(
    store: &Arc<St>,
    components: &[&dyn Preparable<St>],
    props: &Props,
) -> Result<PrepareAll, InitError> {
    let targets = components
        .iter()
        .map(|component| resolve(store, *component, props))
        .collect::<Result<Vec<_>, _>>()?;

    let tasks = targets
        .into_iter()
        .map(|target| match target {
            Some(target) => target.start(store),
            None => Ok(skipped()),
        })
        .collect::<Result<Vec<_>, _>>()?;
    Ok(Box::pin(future::try_join_all(tasks)))
}

/// A component that passed the checks and is ready to start preparing.
struct Target<'c, St: Store> {
    config: &'c Arc<InitConfig<St>>,
    init_values: InitValues,
    prepare_key: PrepareKey,
}

impl<St: Store> Target<'_, St> {
    fn start(&self, store: &Arc<St>) -> Result<InitTask, InitError> {
        init_component(
            store,
            self.config,
            &self.init_values,
            &self.prepare_key,
            Caller::Prepare,
        )
    }
}

/// Check one component against the store without dispatching. `None` means
/// there is nothing to prepare.
fn resolve<'c, St: Store>(
    store: &Arc<St>,
    component: &'c dyn Preparable<St>,
    props: &Props,
) -> Result<Option<Target<'c, St>>, InitError> {
    let Some(config) = component.init_config() else {
        return Ok(None);
    };

    let mode = read_init_state(store.as_ref(), config, |state| state.mode())?;
    if mode != InitMode::Prepare {
        tracing::debug!(
            component_id = config.component_id(),
            %mode,
            "Not in prepare mode; skipping preparation"
        );
        return Ok(None);
    }

    let init_values = extract_from_props(props, config.init_props());
    if let Some(index) = init_values.iter().position(Option::is_none) {
        return Err(InitError::MissingInitProp {
            component_id: config.component_id().to_string(),
            prop: config.init_props()[index].clone(),
        });
    }

    let prepare_key = (config.options().get_prepare_key)(config.component_id(), &init_values);
    Ok(Some(Target {
        config,
        init_values,
        prepare_key,
    }))
}

fn skipped() -> InitTask {
    Box::pin(future::ready(Ok(InitOutcome::Skipped)))
}
