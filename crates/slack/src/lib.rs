//! Slack surface of the kudos bot.
//!
//! - **Slash command** (`commands`) - `/kudos` opens the kudos form
//! - **Block Kit** (`blocks`) - the kudos modal and its builders
//! - **Submissions** (`submission`) - reads the modal state and validates it
//! - **Delivery** (`delivery`) - posts the kudos and logs the recognition
//! - **Events** (`events`) - routes incoming payloads to handlers
//! - **Web API** (`api`) and **request signing** (`signature`)
//!
//! # Architecture
//!
//! ```text
//! HTTP ingress → EventDispatcher → Handlers → kudos-core pipeline
//!                      ↓
//!              KudosDelivery → chat.postMessage + RecognitionLog
//! ```

pub mod api;
pub mod blocks;
pub mod commands;
pub mod delivery;
pub mod events;
pub mod signature;
pub mod submission;

#[cfg(test)]
mod testing;
