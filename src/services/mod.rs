//! Application services: credential handling, session tokens, and the
//! external collaborators (mail relay, image host) behind trait seams.

pub mod auth_service;
pub mod image_store;
pub mod mailer;
pub mod token_service;

pub use image_store::{ImageStore, LogImageStore};
pub use mailer::{LogMailer, Mailer};
