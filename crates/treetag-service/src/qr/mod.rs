//! QR tag payloads.

pub mod payload;

pub use payload::QrPayload;
