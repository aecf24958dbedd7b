//! Support for library configuration options

use std::sync::{Arc, Mutex};
use once_cell::sync::Lazy;

/// Base URL of the remote task store (the backend the original deployment reached through `NEXT_PUBLIC_BACKEND_URL`).
/// Feel free to override it when initing this library.
pub static BACKEND_URL: Lazy<Arc<Mutex<String>>> = Lazy::new(|| Arc::new(Mutex::new("http://localhost:3000".to_string())));

/// Key the local store persists its data under. It also names the backing file.
/// Feel free to override it when initing this library.
pub static STORAGE_KEY: Lazy<Arc<Mutex<String>>> = Lazy::new(|| Arc::new(Mutex::new("tasks".to_string())));
