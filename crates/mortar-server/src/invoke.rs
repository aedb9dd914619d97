//! The invoker.
//!
//! Handlers and middleware are erased into [`TerminalStep`] and
//! [`MiddlewareStep`] closures at registration time. A request runs its
//! route's middleware snapshot in order, then the terminal step, inside a
//! single unwind boundary: exactly one response leaves [`run`].

use std::any::Any;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;

use futures_util::FutureExt;
use mortar_core::{ApiError, ErrorRegistry, RequestContext, StatefulError};
use mortar_extract::ParamList;
use mortar_telemetry::{ctx_debug, ctx_error};

use crate::handler::BoxFuture;
use crate::respond::{error_response, success_response, HttpResponse};
use crate::{Handler, Middleware};

/// What a middleware step decided.
pub(crate) enum Outcome {
    /// Proceed to the next step.
    Continue,
    /// Stop the chain and write this response.
    Reply(HttpResponse),
}

pub(crate) type TerminalStep =
    Arc<dyn Fn(RequestContext, Arc<ErrorRegistry>) -> BoxFuture<HttpResponse> + Send + Sync>;

pub(crate) type MiddlewareStep =
    Arc<dyn Fn(RequestContext, Arc<ErrorRegistry>) -> BoxFuture<Outcome> + Send + Sync>;

/// Erases a terminal handler: bind, call, map the result.
pub(crate) fn terminal<H, Args>(handler: H) -> TerminalStep
where
    H: Handler<Args>,
    Args: ParamList,
{
    Arc::new(move |ctx: RequestContext, registry: Arc<ErrorRegistry>| {
        let handler = handler.clone();
        Box::pin(async move {
            let args = match Args::bind_all(ctx.exchange(), &registry) {
                Ok(args) => args,
                Err(e) => return fail(&ctx, &e),
            };

            match handler.call(ctx.clone(), args).await {
                Ok(output) => match success_response(&output, &registry) {
                    Ok(response) => {
                        ctx_debug!(&ctx, elapsed = ?ctx.elapsed(), "request completed");
                        response
                    }
                    Err(e) => fail(&ctx, &e),
                },
                Err(e) => fail(&ctx, &e),
            }
        })
    })
}

/// Erases a middleware: bind, call, continue or reply with the error.
pub(crate) fn middleware<M, Args>(middleware: M) -> MiddlewareStep
where
    M: Middleware<Args>,
    Args: ParamList,
{
    Arc::new(move |ctx: RequestContext, registry: Arc<ErrorRegistry>| {
        let middleware = middleware.clone();
        Box::pin(async move {
            let args = match Args::bind_all(ctx.exchange(), &registry) {
                Ok(args) => args,
                Err(e) => return Outcome::Reply(fail(&ctx, &e)),
            };

            match middleware.call(ctx.clone(), args).await {
                Ok(()) => Outcome::Continue,
                Err(e) => Outcome::Reply(fail(&ctx, &e)),
            }
        })
    })
}

/// Runs one request through `chain` and `terminal`.
///
/// A panic anywhere in the pipeline is caught here. An [`ApiError`] or
/// `Box<dyn StatefulError>` payload becomes the response; any other payload
/// is logged and replaced by the unknown-error template.
pub(crate) async fn run(
    ctx: RequestContext,
    chain: &[MiddlewareStep],
    terminal: &TerminalStep,
    registry: &Arc<ErrorRegistry>,
) -> HttpResponse {
    let pipeline = async {
        for step in chain {
            if let Outcome::Reply(response) = step(ctx.clone(), Arc::clone(registry)).await {
                return response;
            }
        }
        terminal(ctx.clone(), Arc::clone(registry)).await
    };

    match AssertUnwindSafe(pipeline).catch_unwind().await {
        Ok(response) => response,
        Err(payload) => recover(&ctx, payload, registry),
    }
}

fn recover(ctx: &RequestContext, payload: Box<dyn Any + Send>, registry: &ErrorRegistry) -> HttpResponse {
    let payload = match payload.downcast::<ApiError>() {
        Ok(err) => return fail(ctx, err.as_ref()),
        Err(payload) => payload,
    };
    let payload = match payload.downcast::<Box<dyn StatefulError>>() {
        Ok(err) => return fail(ctx, &**err),
        Err(payload) => payload,
    };

    let raw = panic_message(payload.as_ref());
    ctx_error!(ctx, panic = %raw, "recovered from panic");
    fail(ctx, &registry.unknown())
}

fn panic_message(payload: &(dyn Any + Send)) -> &str {
    if let Some(s) = payload.downcast_ref::<&'static str>() {
        s
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.as_str()
    } else {
        "non-string panic payload"
    }
}

fn fail<E: StatefulError + ?Sized>(ctx: &RequestContext, err: &E) -> HttpResponse {
    ctx_error!(ctx, error = %err, code = err.code(), "request failed");
    error_response(err)
}
