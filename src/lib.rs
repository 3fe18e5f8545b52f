//! # MCQ Solver Telegram Bot
//!
//! A Telegram bot that reads a photo of multiple-choice questions with OCR,
//! asks a language model for the answers and replies with them, keeping a
//! per-user subject and a short answer history.

pub mod answer;
pub mod bot;
pub mod config;
pub mod dialogue;
pub mod instance_manager;
pub mod localization;
pub mod ocr;
pub mod ocr_config;
pub mod ocr_errors;
pub mod pipeline;
pub mod session;
pub mod transport;
