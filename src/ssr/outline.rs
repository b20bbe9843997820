//! A renderer that prints the routing outline instead of components.
//!
//! Every router becomes a `<section>`; its matched chain becomes nested
//! `<div data-segment>` elements, outer to inner. Useful for the CLI and
//! for checking what a composite URL primes without a component layer.

use std::fmt::Write;
use std::sync::Arc;

use futures_util::future::{BoxFuture, FutureExt};
use serde_json::Value;

use crate::runtime::RuntimeInstance;
use crate::ssr::render::{Css, Fragments, Renderer};
use crate::BoxError;

#[derive(Debug, Clone, Copy, Default)]
pub struct OutlineRenderer;

impl Renderer for OutlineRenderer {
    fn render<'a>(
        &'a self,
        instance: &'a Arc<RuntimeInstance>,
    ) -> BoxFuture<'a, Result<Fragments, BoxError>> {
        async move { outline(instance) }.boxed()
    }
}

fn outline(instance: &RuntimeInstance) -> Result<Fragments, BoxError> {
    let mut html = String::new();
    let mut title = None;

    for router in instance.routers() {
        let route = router.active_route().get();
        write!(
            html,
            r#"<section data-router="{}" data-url="{}">"#,
            escape(router.name()),
            escape(&router.url().unwrap_or_default())
        )?;

        if let Some(route) = &route {
            for (node, depth) in route.nodes().iter().zip(0..) {
                let segment = node.segment();
                write!(html, r#"<div data-segment="{}""#, escape(&segment.to_string()))?;
                if let Some(value) = segment.param().and_then(|name| route.param(name)) {
                    write!(html, r#" data-value="{}""#, escape(value))?;
                }
                if !node.decorators().is_empty() {
                    write!(html, r#" data-decorators="{}""#, escape(&node.decorators().join(" ")))?;
                }
                write!(html, r#" data-depth="{depth}">"#)?;
            }
            for _ in route.nodes() {
                html.push_str("</div>");
            }
            if router.is_primary() {
                title = match route.load().props.get("title") {
                    Some(Value::String(s)) => Some(s.clone()),
                    Some(other) => Some(other.to_string()),
                    None => None,
                };
            }
        }
        html.push_str("</section>");
    }

    let head = title
        .map(|title| format!("<title>{}</title>", escape(&title)))
        .unwrap_or_default();
    Ok(Fragments {
        html,
        head,
        css: Css {
            code: "section[data-router]{display:block}".to_string(),
            map: None,
        },
    })
}

fn escape(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for c in raw.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            c => out.push(c),
        }
    }
    out
}
