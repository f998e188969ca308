// SPDX-License-Identifier: BSD-3-Clause
// Copyright (c) 2026 Aleksandr Ptakhin

//! Route handlers for the HTTP API.

pub mod auth;
pub mod form;
pub mod notifications;
pub mod teleprompter;
pub mod translator;
pub mod users;

pub use auth::{auth_router, AuthApiDoc};
pub use notifications::{notifications_router, support_router, NotificationsApiDoc};
pub use teleprompter::{teleprompter_router, TeleprompterApiDoc};
pub use translator::{translator_router, TranslatorApiDoc};
pub use users::{users_router, UsersApiDoc};
