//! ChatLLM Core Library
//!
//! A minimal chat-completion client: build a fixed-format JSON request, POST
//! it with a bounded number of attempts, and pull the first `"content"` string
//! out of the response.
//!
//! The crate also exports a small C ABI so that C programs can link it in
//! place of a hand-written libcurl helper:
//!
//! ```c
//! chatllm_global_init();
//! char *reply = chatllm_chat(prompt, "gpt-4o-mini", 3, 0.7f);
//! if (reply) { puts(reply); chatllm_free_string(reply); }
//! chatllm_global_cleanup();
//! ```

pub mod client;
pub mod config;
pub mod error;
pub mod escape;
pub mod extract;
pub mod http;
pub mod logging;
pub mod protocol;
pub mod retry;
pub mod runtime;

pub use client::{ChatClient, ChatOutcome};
pub use config::ClientConfig;
pub use error::{ChatError, ChatResult};
pub use extract::ExtractionMode;
pub use runtime::NetworkRuntime;

use std::ffi::{CStr, CString};
use std::os::raw::{c_char, c_float, c_int};
use std::sync::{Mutex, MutexGuard};
use tracing::{error, warn};

/// Returns the version of the ChatLLM Core library.
pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

/// Runtime and configuration shared by the C entry points
struct GlobalState {
    runtime: NetworkRuntime,
    client: ChatClient,
}

static GLOBAL: Mutex<Option<GlobalState>> = Mutex::new(None);

fn global() -> MutexGuard<'static, Option<GlobalState>> {
    GLOBAL.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

/// Initialize the process-wide network runtime for the C entry points.
///
/// Reads configuration (including the `KEY` credential) from the environment.
/// Returns 0 on success, 1 if a runtime is already live in this process
/// (from an earlier call or from Rust code), -1 on failure.
#[no_mangle]
pub extern "C" fn chatllm_global_init() -> c_int {
    logging::init_default();

    let mut state = global();
    if state.is_some() {
        return 1;
    }

    let config = match ClientConfig::from_env() {
        Ok(config) => config,
        Err(err) => {
            error!(error = %err, "invalid chatllm configuration");
            return -1;
        }
    };

    match NetworkRuntime::init(&config) {
        Ok(runtime) => {
            let client = runtime.client(config);
            *state = Some(GlobalState { runtime, client });
            0
        }
        Err(ChatError::AlreadyInitialized) => {
            warn!("a network runtime is already live in this process");
            1
        }
        Err(err) => {
            error!(error = %err, "failed to initialize network runtime");
            -1
        }
    }
}

/// Tear down the runtime created by [`chatllm_global_init`].
#[no_mangle]
pub extern "C" fn chatllm_global_cleanup() {
    if let Some(state) = global().take() {
        state.runtime.shutdown();
    }
}

/// Send `prompt` and return the extracted content as a newly allocated string.
///
/// A null `prompt` is sent as an empty prompt; a null `model` uses the
/// configured default. Returns null on any failure, including when
/// [`chatllm_global_init`] has not been called. The caller must release the
/// result with [`chatllm_free_string`].
///
/// # Safety
///
/// `prompt` and `model` must each be null or point to a valid NUL-terminated
/// string that stays alive for the duration of the call.
#[no_mangle]
pub unsafe extern "C" fn chatllm_chat(
    prompt: *const c_char,
    model: *const c_char,
    tries: c_int,
    temperature: c_float,
) -> *mut c_char {
    let prompt = c_str_or_empty(prompt);
    let model_override = if model.is_null() {
        None
    } else {
        Some(CStr::from_ptr(model).to_string_lossy())
    };

    let state = global();
    let Some(state) = state.as_ref() else {
        error!("chatllm_chat called before chatllm_global_init");
        return std::ptr::null_mut();
    };

    let model = model_override
        .as_deref()
        .unwrap_or(state.client.config().model.as_str());
    let tries = retry::RetryPolicy::from_signed(i64::from(tries)).attempts();

    let Some(content) = state
        .runtime
        .chat_blocking(&state.client, &prompt, model, tries, temperature)
    else {
        return std::ptr::null_mut();
    };

    match CString::new(content) {
        Ok(c_str) => c_str.into_raw(),
        Err(_) => {
            warn!("response content contains an interior NUL byte");
            std::ptr::null_mut()
        }
    }
}

/// Frees a string that was allocated by Rust.
/// This must be called on strings returned by `chatllm_chat`.
///
/// # Safety
///
/// The pointer must be null or have been returned by `chatllm_chat`, and must
/// not be freed twice.
#[no_mangle]
pub unsafe extern "C" fn chatllm_free_string(s: *mut c_char) {
    if s.is_null() {
        return;
    }
    let _ = CString::from_raw(s);
}

/// FFI-safe version of the version function.
#[no_mangle]
pub extern "C" fn chatllm_version() -> *const c_char {
    concat!(env!("CARGO_PKG_VERSION"), "\0").as_ptr() as *const c_char
}

unsafe fn c_str_or_empty<'a>(ptr: *const c_char) -> std::borrow::Cow<'a, str> {
    if ptr.is_null() {
        std::borrow::Cow::Borrowed("")
    } else {
        CStr::from_ptr(ptr).to_string_lossy()
    }
}
