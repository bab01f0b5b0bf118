//! Process-wide network lifecycle
//!
//! A [`NetworkRuntime`] owns the async runtime and the shared HTTP client. It
//! is created once when the process starts talking to the endpoint and torn
//! down once at the end; individual calls never set up or tear down network
//! state. At most one runtime is live at a time.

use crate::client::ChatClient;
use crate::config::ClientConfig;
use crate::error::{ChatError, ChatResult};
use crate::http::client::build_client;
use crate::http::{HttpTransport, ReqwestTransport};
use std::future::Future;
use std::sync::atomic::{AtomicBool, Ordering};
use tokio::runtime::{Builder, Runtime};
use tracing::info;

static ACTIVE: AtomicBool = AtomicBool::new(false);

/// Async runtime plus shared HTTP client for blocking callers
pub struct NetworkRuntime {
    runtime: Runtime,
    http: reqwest::Client,
    // Declared last so the flag is cleared after the runtime is gone
    _active: ActiveFlag,
}

/// Clears the process-wide flag when the owning runtime goes away
struct ActiveFlag;

impl Drop for ActiveFlag {
    fn drop(&mut self) {
        ACTIVE.store(false, Ordering::SeqCst);
        info!("network runtime shut down");
    }
}

impl NetworkRuntime {
    /// Initialize the process-wide runtime.
    ///
    /// Fails with [`ChatError::AlreadyInitialized`] while another runtime is live.
    pub fn init(config: &ClientConfig) -> ChatResult<Self> {
        if ACTIVE
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .is_err()
        {
            return Err(ChatError::AlreadyInitialized);
        }

        let active = ActiveFlag;
        let runtime = Builder::new_current_thread()
            .enable_all()
            .build()
            .map_err(|e| ChatError::Runtime(e.to_string()))?;
        let http = build_client(config.connect_timeout(), config.timeout())?;

        info!("network runtime initialized");
        Ok(Self {
            runtime,
            http,
            _active: active,
        })
    }

    /// Whether a runtime is currently live in this process
    pub fn is_active() -> bool {
        ACTIVE.load(Ordering::SeqCst)
    }

    /// Transport sharing this runtime's HTTP client
    pub fn transport(&self, config: &ClientConfig) -> ReqwestTransport {
        ReqwestTransport::from_client(self.http.clone(), config.max_response_bytes)
    }

    /// Chat client bound to this runtime's HTTP client
    pub fn client(&self, config: ClientConfig) -> ChatClient<ReqwestTransport> {
        let transport = self.transport(&config);
        ChatClient::with_transport(config, transport)
    }

    /// Run `future` to completion on the runtime, blocking the caller
    pub fn block_on<F: Future>(&self, future: F) -> F::Output {
        self.runtime.block_on(future)
    }

    /// Blocking form of [`ChatClient::chat`]
    pub fn chat_blocking<T: HttpTransport>(
        &self,
        client: &ChatClient<T>,
        prompt: &str,
        model: &str,
        tries: u32,
        temperature: f32,
    ) -> Option<String> {
        self.block_on(client.chat(prompt, model, tries, temperature))
    }

    /// Tear the runtime down without waiting on in-flight work.
    ///
    /// A new runtime may be initialized afterwards.
    pub fn shutdown(self) {
        let Self {
            runtime,
            _active: active,
            ..
        } = self;
        runtime.shutdown_background();
        drop(active);
    }
}
