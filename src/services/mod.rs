// SPDX-License-Identifier: BSD-3-Clause
// Copyright (c) 2026 Aleksandr Ptakhin

pub mod auth;
pub mod auth_db;
pub mod auth_middleware;
pub mod cleanup;
pub mod db;
pub mod email;
pub mod extractor;
pub mod logging;
pub mod notifications;
pub mod storage;
pub mod teleprompter;
pub mod translator;
pub mod users;
