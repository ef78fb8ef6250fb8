//! Executes `Request` values and delivers typed results.
//!
//! # Design
//! `Client` owns a `Transport`, the `Environment` requests are built against,
//! and a `ClientConfig`. `send` is the async form. `execute` spawns the same
//! work onto a tokio runtime and reports through a completion closure, which
//! runs exactly once: with the parsed result, with `ApiError::Cancelled` if
//! `Task::cancel` won the race, or with `ApiError::TaskFailed` if the request
//! task panicked. The client keeps no per-request state.

use std::sync::Arc;

use tokio::runtime::Handle;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use crate::environment::{ClientConfig, Environment};
use crate::error::ApiError;
use crate::request::Request;
use crate::transport::Transport;

pub struct Client<T> {
    inner: Arc<Inner<T>>,
    handle: Option<Handle>,
}

struct Inner<T> {
    transport: T,
    environment: Environment,
    config: ClientConfig,
}

impl<T> Clone for Client<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
            handle: self.handle.clone(),
        }
    }
}

impl<T: Transport + 'static> Client<T> {
    pub fn new(environment: Environment, transport: T) -> Self {
        Self::with_config(environment, transport, ClientConfig::default())
    }

    pub fn with_config(environment: Environment, transport: T, config: ClientConfig) -> Self {
        Self {
            inner: Arc::new(Inner {
                transport,
                environment,
                config,
            }),
            handle: None,
        }
    }

    /// Run `execute` work on `handle` instead of the caller's runtime. The
    /// runtime needs its time driver enabled for the request timeout; without
    /// it every request completes with `ApiError::TaskFailed`.
    pub fn with_handle(mut self, handle: Handle) -> Self {
        self.handle = Some(handle);
        self
    }

    pub fn environment(&self) -> &Environment {
        &self.inner.environment
    }

    pub fn transport(&self) -> &T {
        &self.inner.transport
    }

    /// Build, execute and parse `request`.
    pub async fn send<R: Request>(&self, request: &R) -> Result<R::Response, ApiError> {
        let http_request = request.build(&self.inner.environment)?;
        let method = http_request.method;
        let path = http_request.url.path().to_string();
        log::debug!("{} {}", method, path);

        let timeout = self.inner.config.timeout;
        let response = match tokio::time::timeout(timeout, self.inner.transport.send(http_request)).await {
            Ok(response) => response?,
            Err(_) => {
                log::warn!("{} {} timed out after {:?}", method, path, timeout);
                return Err(ApiError::Timeout(timeout));
            }
        };
        log::debug!("{} {} -> {}", method, path, response.status);

        request.parse(response)
    }

    /// Spawn `request` and call `completion` with its result.
    ///
    /// Fails with `ApiError::NoRuntime` when no handle was configured and the
    /// caller is not inside a tokio runtime.
    pub fn execute<R, F>(&self, request: R, completion: F) -> Result<Task, ApiError>
    where
        R: Request + Send + Sync + 'static,
        R::Response: Send + 'static,
        F: FnOnce(Result<R::Response, ApiError>) + Send + 'static,
    {
        let handle = match &self.handle {
            Some(handle) => handle.clone(),
            None => Handle::try_current().map_err(|_| ApiError::NoRuntime)?,
        };

        let token = CancellationToken::new();
        let cancelled = token.clone();
        let client = self.clone();
        let join = handle.spawn(async move {
            // The request runs in its own task so a panic there still reaches
            // the completion.
            let mut work = tokio::spawn(async move { client.send(&request).await });
            let outcome = tokio::select! {
                biased;
                _ = cancelled.cancelled() => {
                    work.abort();
                    Err(ApiError::Cancelled)
                }
                joined = &mut work => match joined {
                    Ok(result) => result,
                    Err(e) => {
                        log::error!("request task failed: {}", e);
                        Err(ApiError::TaskFailed(e.to_string()))
                    }
                },
            };
            completion(outcome);
        });

        Ok(Task { token, join })
    }
}

/// Handle onto a request started with `Client::execute`.
#[derive(Debug)]
pub struct Task {
    token: CancellationToken,
    join: JoinHandle<()>,
}

impl Task {
    /// Cancel the request. No effect once the completion has run.
    pub fn cancel(&self) {
        self.token.cancel();
    }

    pub fn is_cancelled(&self) -> bool {
        self.token.is_cancelled()
    }

    pub fn is_finished(&self) -> bool {
        self.join.is_finished()
    }

    /// Wait until the completion has run. A panic inside the completion is
    /// resumed here.
    pub async fn join(self) {
        if let Err(e) = self.join.await {
            if e.is_panic() {
                std::panic::resume_unwind(e.into_panic());
            }
        }
    }
}
