//! A blog page prepared on the server and hydrated on the client.
//!
//! The page has three wrapped components:
//! - `PostPage` loads the post during preparation.
//! - `Comments` is lazy: it is never prepared and loads on the client.
//! - `Analytics` has a prepared routine and a client-only routine; the
//!   client-only one runs when the post changes after mount.

use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result, anyhow};
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

use kindle_engine::{
    Component, ComponentRegistry, InitActionSpec, InitConfig, InitContext, InitDefaults,
    InitInstance, InitMode, InitRoutine, MemoryStore, Preparable, Props, Reducer, RootAction,
    RootState, Store, WithInit, attach_init, prepare_components, set_mode,
};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Blog {
    posts: BTreeMap<u64, String>,
    comments: BTreeMap<u64, Vec<String>>,
    views: u64,
}

#[derive(Debug, Clone, PartialEq)]
pub enum BlogAction {
    PostLoaded { id: u64, title: String },
    CommentsLoaded { id: u64, comments: Vec<String> },
    Viewed,
}

impl Reducer<BlogAction> for Blog {
    fn reduce(&mut self, action: &BlogAction) {
        match action {
            BlogAction::PostLoaded { id, title } => {
                self.posts.insert(*id, title.clone());
            }
            BlogAction::CommentsLoaded { id, comments } => {
                self.comments.insert(*id, comments.clone());
            }
            BlogAction::Viewed => self.views += 1,
        }
    }
}

type BlogState = RootState<Blog>;
type BlogStore = MemoryStore<BlogState, RootAction<BlogAction>>;
type Ctx = InitContext<BlogStore>;

/// Renders its props as a tag.
struct View(&'static str);

impl Component for View {
    type Output = String;

    fn name(&self) -> &str {
        self.0
    }

    fn render(&self, props: &Props) -> String {
        format!("<{} {}>", self.0, Value::Object(props.clone()))
    }
}

fn post_id(props: &Props) -> Result<u64> {
    props
        .get("post")
        .and_then(|post| post.get("id"))
        .and_then(Value::as_u64)
        .ok_or_else(|| anyhow!("post.id missing from init props"))
}

async fn load_post(props: Props, ctx: Ctx) -> Result<Value> {
    let id = post_id(&props)?;
    tokio::time::sleep(Duration::from_millis(20)).await;
    let title = format!("Post #{id}");
    ctx.dispatch(RootAction::App(BlogAction::PostLoaded {
        id,
        title: title.clone(),
    }));
    Ok(json!(title))
}

async fn load_comments(props: Props, ctx: Ctx) -> Result<Value> {
    let id = post_id(&props)?;
    tokio::time::sleep(Duration::from_millis(10)).await;
    let comments = vec![format!("first on #{id}"), format!("nice post #{id}")];
    ctx.dispatch(RootAction::App(BlogAction::CommentsLoaded {
        id,
        comments: comments.clone(),
    }));
    Ok(json!(comments.len()))
}

async fn record_view(_props: Props, ctx: Ctx) -> Result<Value> {
    ctx.dispatch(RootAction::App(BlogAction::Viewed));
    Ok(json!(ctx.with_state(|state| state.app.views)))
}

struct Page {
    components: Vec<WithInit<View, BlogStore>>,
}

impl Page {
    fn new(defaults: InitDefaults) -> Result<Self> {
        let mut registry = ComponentRegistry::new();
        let builder = || {
            InitConfig::<BlogStore>::builder()
                .defaults(defaults)
                .init_props(["post.id"])
        };

        let post = attach_init(
            builder().init_action(InitRoutine::from_async(load_post)),
            View("PostPage"),
            &mut registry,
        )?;
        let comments = attach_init(
            builder()
                .init_action(InitRoutine::from_async(load_comments))
                .allow_lazy(true),
            View("Comments"),
            &mut registry,
        )?;
        let analytics = attach_init(
            builder().action(InitActionSpec::Split {
                prepared: Some(InitRoutine::from_async(|_, _| async { Ok(json!(null)) })),
                client_only: Some(InitRoutine::from_async(record_view)),
            }),
            View("Analytics"),
            &mut registry,
        )?;

        Ok(Self {
            components: vec![post, comments, analytics],
        })
    }

    fn mount(
        &self,
        store: &Arc<BlogStore>,
        props: &Props,
    ) -> Result<Vec<InitInstance<'_, View, BlogStore>>> {
        self.components
            .iter()
            .map(|component| component.instance(store, props.clone()))
            .collect::<Result<_, _>>()
            .context("mounting page")
    }
}

fn page_props(post: u64) -> Props {
    let mut props = Props::new();
    props.insert("post".to_string(), json!({ "id": post }));
    props.insert("theme".to_string(), json!("dark"));
    props
}

fn print_render(label: &str, instances: &[InitInstance<'_, View, BlogStore>]) {
    println!("{label}");
    for instance in instances {
        let html = instance
            .render()
            .unwrap_or_else(|| "<!-- hidden while initializing -->".to_string());
        println!("  {html}");
    }
}

/// Render on the server and return the serialized store state.
async fn server(page: &Page, props: &Props) -> Result<String> {
    let store = Arc::new(BlogStore::new(BlogState::default()));

    let components: Vec<&dyn Preparable<BlogStore>> = page
        .components
        .iter()
        .map(|c| c as &dyn Preparable<BlogStore>)
        .collect();
    let outcomes = prepare_components(&store, &components, props)?.await?;
    tracing::info!(?outcomes, "Server preparation done");

    print_render("server render:", &page.mount(&store, props)?);
    serde_json::to_string(&store.snapshot()).context("serializing server state")
}

async fn client(page: &Page, transfer: &str, props: &Props, next: &Props) -> Result<()> {
    let state: BlogState = serde_json::from_str(transfer).context("hydrating client state")?;
    let store = Arc::new(BlogStore::new(state));

    let mut instances = page.mount(&store, props)?;
    let mut pending = Vec::new();
    for instance in &mut instances {
        pending.push(instance.on_first_render()?);
    }
    store.dispatch(set_mode(InitMode::SelfInit).into());
    for instance in &mut instances {
        instance.on_store_change()?;
    }
    print_render("client first render:", &instances);

    for task in pending {
        task.await?;
    }
    for instance in &mut instances {
        instance.on_first_render_complete()?;
    }
    print_render("client after mount:", &instances);

    let mut pending = Vec::new();
    for instance in &mut instances {
        if let Some(task) = instance.on_props_change(next.clone())? {
            pending.push(task);
        }
    }
    for instance in &mut instances {
        instance.on_store_change()?;
    }
    print_render("client navigating:", &instances);

    for task in pending {
        task.await?;
    }
    for instance in &mut instances {
        instance.on_store_change()?;
    }
    print_render("client after navigation:", &instances);

    let blog = store.with_state(|state| state.app.clone());
    println!("client state: {}", serde_json::to_string(&blog)?);
    Ok(())
}

pub(crate) async fn run(defaults: InitDefaults, post: u64, next: u64) -> Result<()> {
    let page = Page::new(defaults)?;
    let props = page_props(post);

    let transfer = server(&page, &props).await?;
    println!("transferred state: {transfer}");

    client(&page, &transfer, &props, &page_props(next)).await
}
