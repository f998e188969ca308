// SPDX-License-Identifier: BSD-3-Clause
// Copyright (c) 2026 Aleksandr Ptakhin

pub mod auth;
pub mod notification;
pub mod settings;
pub mod teleprompter;
pub mod translation;
pub mod user;
pub mod version;
