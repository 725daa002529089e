//! Bot-side glue: the chat transport collaborator surface and the message
//! handler that feeds incoming text through the mention pipeline. The
//! binary in this crate wires configuration and the HTTP API; a transport
//! integration implements [`chat::ChatMessage`] and calls
//! [`handler::handle_text`] per incoming message.

pub mod chat;
pub mod handler;
