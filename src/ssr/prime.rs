//! Router priming from a composite URL.

use std::sync::Arc;
use std::time::Duration;

use futures_util::future::try_join_all;

use crate::composite::CompositeUrl;
use crate::router::Router;
use crate::routing::same_location;
use crate::runtime::RuntimeInstance;
use crate::ssr::SsrError;

/// Bring every router named in `composite` to its target URL.
///
/// Existing routers are reused and created otherwise. A router whose pending
/// or active URL already equals the target is not navigated again. Returns
/// once every involved router is ready, or its navigation was rejected
/// before it ever became active. `ssr.ready_timeout_ms` bounds each router.
pub async fn preload_all_routers(
    instance: &Arc<RuntimeInstance>,
    composite: &CompositeUrl,
) -> Result<Vec<Arc<Router>>, SsrError> {
    let timeout = match instance.config().ssr.ready_timeout_ms {
        0 => None,
        ms => Some(Duration::from_millis(ms)),
    };

    let primes = composite.iter().map(|(name, url)| {
        let router = instance.router_or_create(name);
        async move {
            match timeout {
                Some(limit) => tokio::time::timeout(limit, prime(&router, url))
                    .await
                    .map_err(|_| SsrError::Timeout {
                        router: router.name().to_string(),
                    })??,
                None => prime(&router, url).await?,
            }
            Ok::<_, SsrError>(router)
        }
    });
    try_join_all(primes).await
}

/// Decode `composite` and prime every router it names.
pub async fn preload_all_routers_from_str(
    instance: &Arc<RuntimeInstance>,
    composite: &str,
) -> Result<Vec<Arc<Router>>, SsrError> {
    let composite = CompositeUrl::decode(composite)?;
    preload_all_routers(instance, &composite).await
}

async fn prime(router: &Router, url: &str) -> Result<(), SsrError> {
    let target = router.internal_url(url)?;
    let current = router
        .pending_route()
        .get()
        .or_else(|| router.active_route().get());

    if !current.is_some_and(|route| same_location(route.url(), &target)) {
        tracing::debug!(router = %router.name(), url = %url, "priming router");
        router.replace(url).await?;
    }

    if router.active_route().get().is_none() && router.pending_route().get().is_none() {
        tracing::debug!(router = %router.name(), url = %url, "router never became active");
        return Ok(());
    }

    router.ready().await;
    Ok(())
}
