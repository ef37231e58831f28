//! Transport layer that traces every JSON-RPC request sent on behalf of a
//! component, together with how long the node took to answer it.
use {
    alloy::{
        rpc::json_rpc::{RequestPacket, ResponsePacket},
        transports::TransportError,
    },
    std::{
        pin::Pin,
        sync::Arc,
        task::{Context, Poll},
        time::Instant,
    },
    tower::{Layer, Service},
};

pub(crate) struct InstrumentationLayer {
    label: Arc<str>,
}

impl InstrumentationLayer {
    pub(crate) fn new(label: &str) -> Self {
        Self {
            label: label.into(),
        }
    }
}

impl<S> Layer<S> for InstrumentationLayer {
    type Service = InstrumentedTransport<S>;

    fn layer(&self, inner: S) -> Self::Service {
        InstrumentedTransport {
            inner,
            label: self.label.clone(),
        }
    }
}

#[derive(Debug, Clone)]
pub(crate) struct InstrumentedTransport<S> {
    inner: S,
    label: Arc<str>,
}

impl<S> Service<RequestPacket> for InstrumentedTransport<S>
where
    S: Service<RequestPacket, Response = ResponsePacket, Error = TransportError>,
    S::Future: Send + 'static,
{
    type Error = S::Error;
    type Future = Pin<Box<dyn Future<Output = Result<Self::Response, Self::Error>> + Send>>;
    type Response = S::Response;

    fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, req: RequestPacket) -> Self::Future {
        let methods = methods(&req);
        let timer = on_request_start(self.label.clone(), methods);
        let fut = self.inner.call(req);
        Box::pin(async move {
            let res = fut.await;
            match &res {
                Ok(ResponsePacket::Single(response)) if response.is_error() => {
                    tracing::debug!(id = %response.id, "node answered with an error")
                }
                Err(err) => tracing::debug!(?err, "request failed"),
                _ => (),
            }
            drop(timer);
            res
        })
    }
}

/// Comma separated methods of all requests in the packet.
fn methods(req: &RequestPacket) -> String {
    req.method_names().collect::<Vec<_>>().join(",")
}

/// Returns a guard that logs the request duration once dropped.
#[must_use]
fn on_request_start(component: Arc<str>, method: String) -> impl Drop + Send {
    scopeguard::guard(Instant::now(), move |start| {
        tracing::debug!(
            %component,
            method,
            elapsed = ?start.elapsed(),
            "request completed"
        );
    })
}
