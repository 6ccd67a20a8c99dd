//! Execution-context detection.

/// Whether code runs in a browser document
///
/// True only on `wasm32` with a global `window`. Web workers, server-side
/// rendering and native targets are not clients.
pub fn is_client() -> bool {
	#[cfg(target_arch = "wasm32")]
	{
		web_sys::window().is_some()
	}

	#[cfg(not(target_arch = "wasm32"))]
	{
		false
	}
}
