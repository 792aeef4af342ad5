//! Analysis Engine
//!
//! Classifies recognized text into a charging signal and decides whether a
//! cycle warrants a notification.

pub mod keywords;
pub mod policy;

pub use keywords::{classify, Classification, KeywordSet};
pub use policy::{AllowedHours, Decision, NotificationPolicy};
