// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@kernel.org>

//! Data models for the application.

pub mod calendar;
pub mod dashboard;
pub mod owner;
pub mod token;

pub use calendar::CalendarEvent;
pub use dashboard::{Keyword, Todo};
pub use owner::Owner;
pub use token::TokenBundle;
