//! The render call.

use std::collections::BTreeMap;
use std::sync::Arc;

use futures_util::future::{BoxFuture, FutureExt};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::composite::CompositeUrl;
use crate::route::LoadResult;
use crate::router::Router;
use crate::routing::same_location;
use crate::runtime::RuntimeInstance;
use crate::ssr::prime::preload_all_routers;
use crate::ssr::SsrError;
use crate::BoxError;

const HTML_MARKER: &str = "<!--ssr:html-->";
const HEAD_MARKER: &str = "<!--ssr:head-->";
const CSS_MARKER: &str = "<!--ssr:css-->";

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct Css {
    pub code: String,
    pub map: Option<String>,
}

/// What a renderer produces from a primed instance.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct Fragments {
    pub html: String,
    pub head: String,
    pub css: Css,
}

/// The component layer that turns primed routers into markup.
pub trait Renderer: Send + Sync {
    /// Page-level data for the primary URL, fetched before priming.
    fn load<'a>(&'a self, _primary_url: &'a str) -> BoxFuture<'a, Result<Value, BoxError>> {
        async { Ok(Value::Object(Default::default())) }.boxed()
    }

    fn render<'a>(
        &'a self,
        instance: &'a Arc<RuntimeInstance>,
    ) -> BoxFuture<'a, Result<Fragments, BoxError>>;
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct RenderOutput {
    pub html: String,
    pub head: String,
    pub css: Css,
    pub status: u16,
    pub props: BTreeMap<String, String>,
    pub redirect: Option<String>,
    pub maxage: u64,
    pub error: Option<String>,
    pub load: Value,
}

/// Prime every router named in `composite`, then render.
///
/// Hints come from the primary router. When its active Route sits at the
/// requested primary URL, the merged preload results provide `status`,
/// `props`, `redirect` and `maxage`. When the attempt at that URL was
/// rejected, `error` and its status are set instead.
pub async fn render_module(
    instance: &Arc<RuntimeInstance>,
    renderer: &dyn Renderer,
    composite: &str,
) -> Result<RenderOutput, SsrError> {
    let composite = CompositeUrl::decode(composite)?;
    let primary_url = composite.primary().unwrap_or("/");

    let load = renderer.load(primary_url).await.map_err(SsrError::Load)?;
    preload_all_routers(instance, &composite).await?;
    let fragments = renderer.render(instance).await.map_err(SsrError::Render)?;

    let (data, rejection) = match instance.router("") {
        Some(router) => primary_outcome(&router, composite.primary())?,
        None => (LoadResult::default(), None),
    };
    let (status, error) = match rejection {
        Some((status, message)) => (status, Some(message)),
        None => (data.status.unwrap_or(200), None),
    };
    let props = data
        .props
        .into_iter()
        .map(|(key, value)| match value {
            Value::String(s) => (key, s),
            other => (key, other.to_string()),
        })
        .collect();

    tracing::debug!(composite = %composite, status, "rendered module");
    Ok(RenderOutput {
        html: fragments.html,
        head: fragments.head,
        css: fragments.css,
        status,
        props,
        redirect: data.redirect,
        maxage: data.maxage.unwrap_or(0),
        error,
        load,
    })
}

/// Where the primary router landed for `target`: the active Route's load
/// result when it sits at the target, otherwise the status and message of
/// the rejected attempt at the target. Outcomes for other URLs are ignored.
fn primary_outcome(
    router: &Router,
    target: Option<&str>,
) -> Result<(LoadResult, Option<(u16, String)>), SsrError> {
    let active = router.active_route().get();
    let Some(target) = target else {
        return Ok((active.map(|route| route.load()).unwrap_or_default(), None));
    };

    let target = router.internal_url(target)?;
    if let Some(route) = active.filter(|route| same_location(route.url(), &target)) {
        return Ok((route.load(), None));
    }
    let rejection = router
        .last_rejected()
        .filter(|route| same_location(route.url(), &target))
        .and_then(|route| route.error().map(|err| (err.status(), err.to_string())));
    Ok((LoadResult::default(), rejection))
}

/// Substitute the rendered fragments into a base document.
///
/// A template without the html marker is returned with the other markers
/// filled, and a warning is logged.
pub fn fill_template(template: &str, output: &RenderOutput) -> String {
    if !template.contains(HTML_MARKER) {
        tracing::warn!("template is missing {HTML_MARKER}");
    }
    template
        .replacen(HTML_MARKER, &output.html, 1)
        .replacen(HEAD_MARKER, &output.head, 1)
        .replacen(CSS_MARKER, &format!("<style>{}</style>", output.css.code), 1)
}
