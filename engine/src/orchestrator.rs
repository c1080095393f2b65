//! The init state machine.
//!
//! [`init_component`] decides, for one component, one prepare key and one
//! lifecycle caller, whether the init routine(s) must run, whether the mount
//! is invalid because preparation never happened, or whether nothing needs to
//! be done. When routines run, the completion status for the key is flipped to
//! `false` before the first routine starts and to `true` after the last one
//! settles, on every path, including a task dropped before it settles.

use std::sync::Arc;

use futures_util::future::{self, BoxFuture};
use serde_json::Value;

use kindle_core::{InitState, Store, init_status};
use kindle_types::{
    Caller, InitMode, InitSelfPolicy, PrepareKey, PrepareValidationError, Props,
    build_values_object,
};

use crate::config::{InitConfig, InitContext, InitRoutine, RoutineReturn, RoutineSlot};
use crate::error::InitError;

/// Settles when initialization for one call is done.
pub type InitTask = BoxFuture<'static, Result<InitOutcome, InitError>>;

/// How an init call resolved.
#[derive(Debug, Clone, PartialEq)]
pub enum InitOutcome {
    /// Nothing had to run.
    Skipped,
    /// A routine failed and the failure was passed to `on_error`.
    ErrorHandled,
    Prepared(Value),
    ClientOnly(Value),
    Both { prepared: Value, client: Value },
}

impl InitOutcome {
    /// The resolved value of a single routine, if exactly one ran.
    #[must_use]
    pub fn value(&self) -> Option<&Value> {
        match self {
            InitOutcome::Prepared(value) | InitOutcome::ClientOnly(value) => Some(value),
            _ => None,
        }
    }
}

/// What a call must do, derived from the decision table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Plan {
    /// A missing or unfinished preparation is an error for this call.
    pub(crate) require_prepared: bool,
    pub(crate) run_prepared: bool,
    pub(crate) run_client: bool,
}

impl Plan {
    fn runs_anything(self) -> bool {
        self.run_prepared || self.run_client
    }
}

pub(crate) fn plan<St: Store>(
    config: &InitConfig<St>,
    mode: InitMode,
    is_prepared: bool,
    caller: Caller,
) -> Plan {
    let has_prepared = config.prepared_action().is_some();
    let has_client = config.client_only_action().is_some();
    let options = config.options();
    let allow_lazy = options.allow_lazy;

    match caller {
        Caller::Prepare => Plan {
            require_prepared: false,
            run_prepared: has_prepared && !is_prepared,
            run_client: false,
        },
        Caller::DidMount => Plan {
            require_prepared: has_prepared && mode == InitMode::Prepare && !allow_lazy,
            run_prepared: has_prepared
                && match mode {
                    // mounted on the client after the first render
                    InitMode::SelfInit => options.init_self != InitSelfPolicy::Never && !allow_lazy,
                    // first render, lazy components that were not prepared
                    InitMode::Prepare => !is_prepared && allow_lazy,
                },
            run_client: false,
        },
        // the reinitialize option is checked by the wrapper
        Caller::DidUpdate => Plan {
            require_prepared: false,
            run_prepared: has_prepared,
            run_client: has_client,
        },
    }
}

/// Read from the init slice of `store` as located by `config`.
pub(crate) fn read_init_state<St: Store, R>(
    store: &St,
    config: &InitConfig<St>,
    read: impl FnOnce(&InitState) -> R,
) -> Result<R, InitError> {
    let get_init_state = config.options().get_init_state;
    store
        .with_state(|state| get_init_state(state).map(read))
        .ok_or(InitError::MissingInitState)
}

/// Initialize one component for `init_values` / `prepare_key`.
///
/// Validation errors are returned synchronously. Otherwise the returned task
/// runs the selected routine(s); the `complete: false` status has already been
/// dispatched when this function returns. `complete: true` follows when the
/// task settles or is dropped, whichever comes first.
pub fn init_component<St: Store>(
    store: &Arc<St>,
    config: &Arc<InitConfig<St>>,
    init_values: &[Option<Value>],
    prepare_key: &PrepareKey,
    caller: Caller,
) -> Result<InitTask, InitError> {
    let (mode, prepared_status) = read_init_state(store.as_ref(), config, |state| {
        (state.mode(), state.prepared_status(prepare_key))
    })?;
    let plan = plan(config, mode, prepared_status.is_some(), caller);
    let component_id = config.component_id();

    if plan.require_prepared {
        match prepared_status {
            None => {
                let props = build_values_object(config.init_props(), init_values);
                return Err(PrepareValidationError::not_prepared(component_id, &props).into());
            }
            Some(false) => {
                let props = build_values_object(config.init_props(), init_values);
                return Err(PrepareValidationError::pending(component_id, &props).into());
            }
            Some(true) => {}
        }
    }

    if !plan.runs_anything() {
        tracing::trace!(component_id, %prepare_key, %caller, "Nothing to initialize");
        return Ok(Box::pin(future::ready(Ok(InitOutcome::Skipped))));
    }

    tracing::debug!(
        component_id,
        %prepare_key,
        %caller,
        %mode,
        run_prepared = plan.run_prepared,
        run_client = plan.run_client,
        "Initializing component"
    );

    let is_prepare = caller.is_prepare();
    store.dispatch(init_status(prepare_key.clone(), false, is_prepare).into());
    let mut completion = Completion {
        store: Arc::clone(store),
        prepare_key: prepare_key.clone(),
        is_prepare,
        done: false,
    };

    let props = build_values_object(config.init_props(), init_values);
    let store = Arc::clone(store);
    let config = Arc::clone(config);
    let prepare_key = prepare_key.clone();

    Ok(Box::pin(async move {
        let result = run_routines(&store, &config, props, plan).await;

        match result {
            Ok(outcome) => {
                completion.mark();
                Ok(outcome)
            }
            Err(err) if err.is_invalid_return() => {
                completion.mark();
                Err(err)
            }
            Err(err) => match &config.options().on_error {
                Some(handler) => {
                    tracing::warn!(
                        component_id = config.component_id(),
                        %prepare_key,
                        error = %err,
                        "Init action failed; passed to on_error"
                    );
                    handler(&err);
                    completion.mark();
                    Ok(InitOutcome::ErrorHandled)
                }
                None => {
                    completion.mark();
                    Err(err)
                }
            },
        }
    }))
}

/// The `complete: true` half of the status protocol.
///
/// Owned by the init task. Dropping the task before it settles, polled or
/// not, still marks the key complete.
struct Completion<St: Store> {
    store: Arc<St>,
    prepare_key: PrepareKey,
    is_prepare: bool,
    done: bool,
}

impl<St: Store> Completion<St> {
    fn mark(&mut self) {
        if !self.done {
            self.done = true;
            self.store
                .dispatch(init_status(self.prepare_key.clone(), true, self.is_prepare).into());
        }
    }
}

impl<St: Store> Drop for Completion<St> {
    fn drop(&mut self) {
        if !self.done {
            tracing::debug!(
                prepare_key = %self.prepare_key,
                is_prepare = self.is_prepare,
                "Init task dropped before settling; marking complete"
            );
            self.mark();
        }
    }
}

/// Run the selected routines strictly one after the other: the client-only
/// routine never starts before the prepared one has settled.
async fn run_routines<St: Store>(
    store: &Arc<St>,
    config: &InitConfig<St>,
    props: Props,
    plan: Plan,
) -> Result<InitOutcome, InitError> {
    let ctx = InitContext::new(Arc::clone(store));

    let prepared = match config.prepared_action() {
        Some(routine) if plan.run_prepared => Some(
            await_routine(routine, props.clone(), ctx.clone(), config, config.prepared_slot())
                .await?,
        ),
        _ => None,
    };

    let client = match config.client_only_action() {
        Some(routine) if plan.run_client => {
            Some(await_routine(routine, props, ctx, config, RoutineSlot::ClientOnly).await?)
        }
        _ => None,
    };

    Ok(match (prepared, client) {
        (Some(prepared), Some(client)) => InitOutcome::Both { prepared, client },
        (Some(prepared), None) => InitOutcome::Prepared(prepared),
        (None, Some(client)) => InitOutcome::ClientOnly(client),
        (None, None) => InitOutcome::Skipped,
    })
}

async fn await_routine<St: Store>(
    routine: &InitRoutine<St>,
    props: Props,
    ctx: InitContext<St>,
    config: &InitConfig<St>,
    slot: RoutineSlot,
) -> Result<Value, InitError> {
    match routine.call(props, ctx) {
        RoutineReturn::Pending(pending) => pending.await.map_err(|source| InitError::Routine {
            component_id: config.component_id().to_string(),
            source,
        }),
        RoutineReturn::Ready(value) => Err(InitError::InvalidReturn {
            component_id: config.component_id().to_string(),
            slot,
            returned: value_kind(&value),
        }),
    }
}

fn value_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
