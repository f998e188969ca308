// SPDX-License-Identifier: BSD-3-Clause
// Copyright (c) 2026 Aleksandr Ptakhin

use std::path::PathBuf;

/// Default request body limit for uploads (10 MiB).
pub const DEFAULT_MAX_UPLOAD_BYTES: usize = 10 * 1024 * 1024;

/// HTTP-facing settings shared by the router and handlers.
#[derive(Debug, Clone)]
pub struct AppSettings {
    /// Root directory for uploaded files, one subdirectory per user id
    pub upload_dir: PathBuf,
    pub max_upload_bytes: usize,
    /// Mark the session cookie `Secure`. Disable only for plain-HTTP development.
    pub secure_cookies: bool,
    /// Browser origin allowed to call the API with credentials. No CORS headers when unset.
    pub cors_allow_origin: Option<String>,
}

impl Default for AppSettings {
    fn default() -> Self {
        Self {
            upload_dir: PathBuf::from("uploads"),
            max_upload_bytes: DEFAULT_MAX_UPLOAD_BYTES,
            secure_cookies: true,
            cors_allow_origin: None,
        }
    }
}
