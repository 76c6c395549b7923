use crate::auth::AuthInfo;
use crate::error::{Error, Result};
use crate::session::Session;
use reqwest::{Client, ClientBuilder};
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context as TaskContext, Poll};
use std::time::Duration;
use tokio::task::JoinHandle;
use tracing::error;

/// Create the default HTTP client for REST API requests
/// with optimized settings for connection pooling and timeouts
pub fn create_rest_client(config: &Config) -> Client {
    ClientBuilder::new()
        .pool_max_idle_per_host(config.pool_max_idle_per_host)
        .timeout(config.request_timeout)
        .connect_timeout(config.connect_timeout)
        .build()
        .expect("Failed to create HTTP client")
}

/// Transport configuration for the shared HTTP client
#[derive(Debug, Clone)]
pub struct Config {
    /// Maximum time to wait for a complete reply
    pub request_timeout: Duration,
    /// Maximum time to wait for a connection to be established
    pub connect_timeout: Duration,
    /// Idle connections kept alive per host
    pub pool_max_idle_per_host: usize,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            request_timeout: Duration::from_secs(300), // 5 minutes
            connect_timeout: Duration::from_secs(10),
            pool_max_idle_per_host: 50,
        }
    }
}

impl Config {
    /// Set the reply timeout
    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    /// Set the connect timeout
    pub fn with_connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = timeout;
        self
    }

    /// Set the number of idle connections kept per host
    pub fn with_pool_max_idle_per_host(mut self, max: usize) -> Self {
        self.pool_max_idle_per_host = max;
        self
    }
}

/// Process-wide API client. Owns the pooled HTTP client every session runs
/// on; one instance per process is the intended use. Units of work are
/// started with [`Scg::connect`].
pub struct Scg {
    client: Client,
    config: Config,
}

impl Scg {
    /// Create a client with default transport configuration
    pub fn new() -> Self {
        Self::with_config(Config::default())
    }

    /// Create a client with custom transport configuration
    pub fn with_config(config: Config) -> Self {
        Scg {
            client: create_rest_client(&config),
            config,
        }
    }

    /// The underlying HTTP client
    pub fn http_client(&self) -> &Client {
        &self.client
    }

    /// The transport configuration this client was built with
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Open a session against the deployment at `url` and run `f` as one
    /// unit of work on its own task.
    ///
    /// Operations inside the closure run sequentially; concurrency comes
    /// from connecting several sessions, which all share this client's
    /// connection pool. The returned handle resolves to the closure's
    /// result.
    pub fn connect<F, Fut, R>(&self, url: &str, auth: Arc<AuthInfo>, f: F) -> UnitOfWork<R>
    where
        F: FnOnce(Session) -> Fut + Send + 'static,
        Fut: Future<Output = Result<R>> + Send + 'static,
        R: Send + 'static,
    {
        let session = Session::new(url, auth, self.client.clone());
        let handle = tokio::spawn(async move {
            let result = f(session).await;
            if let Err(ref err) = result {
                error!("session task failed: {}", err);
            }
            result
        });

        UnitOfWork { handle }
    }
}

impl Default for Scg {
    fn default() -> Self {
        Self::new()
    }
}

/// Handle to a running session task. Resolves to the result of the unit of
/// work closure; a panic inside the task surfaces as [`Error::Task`].
pub struct UnitOfWork<R> {
    handle: JoinHandle<Result<R>>,
}

impl<R> Future for UnitOfWork<R> {
    type Output = Result<R>;

    fn poll(self: Pin<&mut Self>, cx: &mut TaskContext<'_>) -> Poll<Self::Output> {
        let this = self.get_mut();
        match Pin::new(&mut this.handle).poll(cx) {
            Poll::Ready(Ok(result)) => Poll::Ready(result),
            Poll::Ready(Err(join_err)) => Poll::Ready(Err(Error::Task(join_err.to_string()))),
            Poll::Pending => Poll::Pending,
        }
    }
}
