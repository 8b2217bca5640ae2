use std::{convert::Infallible, sync::Arc};

use axum::{extract::Request, response::IntoResponse, routing::Route, Router};
use tower::{Layer, Service};

type Transform = Arc<dyn Fn(Router) -> Router + Send + Sync>;

/// Ordered composition of middleware layers.
///
/// Layers wrap the router in onion order: the first layer added sees the
/// request first and the response last. [`Chain::apply`] only reads the chain,
/// so one chain can build any number of independent pipelines.
#[derive(Clone, Default)]
pub struct Chain {
    transforms: Vec<Transform>,
}

impl Chain {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a layer inside every layer added before it.
    pub fn add<L>(mut self, layer: L) -> Self
    where
        L: Layer<Route> + Clone + Send + Sync + 'static,
        L::Service: Service<Request> + Clone + Send + Sync + 'static,
        <L::Service as Service<Request>>::Response: IntoResponse + 'static,
        <L::Service as Service<Request>>::Error: Into<Infallible> + 'static,
        <L::Service as Service<Request>>::Future: Send + 'static,
    {
        self.transforms
            .push(Arc::new(move |router: Router| router.layer(layer.clone())));
        self
    }

    pub fn len(&self) -> usize {
        self.transforms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.transforms.is_empty()
    }

    /// Wraps `router` with every layer, the first added outermost.
    pub fn apply(&self, router: Router) -> Router {
        // `Router::layer` puts each new layer outside the previous ones,
        // so the innermost layer must be applied first.
        self.transforms
            .iter()
            .rev()
            .fold(router, |router, transform| transform(router))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{
        body::{to_bytes, Body},
        middleware::{from_fn, Next},
        response::Response,
        routing::get,
    };
    use std::sync::Mutex;
    use tower::ServiceExt;

    type Events = Arc<Mutex<Vec<String>>>;

    fn record(chain: Chain, name: &'static str, events: &Events) -> Chain {
        let events = events.clone();
        chain.add(from_fn(move |request: Request, next: Next| {
            let events = events.clone();
            async move {
                events.lock().unwrap().push(format!("{name} pre"));
                let response: Response = next.run(request).await;
                events.lock().unwrap().push(format!("{name} post"));
                response
            }
        }))
    }

    fn terminal(events: &Events, reply: &'static str) -> Router {
        let events = events.clone();
        Router::new().route(
            "/",
            get(move || {
                let events = events.clone();
                async move {
                    events.lock().unwrap().push("handler".to_string());
                    reply
                }
            }),
        )
    }

    async fn call(app: Router) -> String {
        let response = app
            .oneshot(Request::builder().uri("/").body(Body::empty()).unwrap())
            .await
            .unwrap();
        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        String::from_utf8(body.to_vec()).unwrap()
    }

    #[tokio::test]
    async fn first_added_layer_is_outermost() {
        let events = Events::default();
        let chain = record(record(record(Chain::new(), "A", &events), "B", &events), "C", &events);

        call(chain.apply(terminal(&events, "ok"))).await;

        assert_eq!(
            *events.lock().unwrap(),
            vec!["A pre", "B pre", "C pre", "handler", "C post", "B post", "A post"]
        );
    }

    #[tokio::test]
    async fn applying_twice_builds_independent_pipelines() {
        let events = Events::default();
        let chain = record(Chain::new(), "A", &events);

        let first = chain.apply(terminal(&events, "first"));
        let second = chain.apply(terminal(&events, "second"));

        assert_eq!(call(second).await, "second");
        assert_eq!(call(first).await, "first");
        assert_eq!(chain.len(), 1);
        assert_eq!(
            *events.lock().unwrap(),
            vec!["A pre", "handler", "A post", "A pre", "handler", "A post"]
        );
    }

    #[tokio::test]
    async fn empty_chain_returns_the_router_unchanged() {
        let events = Events::default();
        let chain = Chain::new();
        assert!(chain.is_empty());
        assert_eq!(call(chain.apply(terminal(&events, "plain"))).await, "plain");
    }
}
