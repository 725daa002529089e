//! Chat transport collaborator surface.
//!
//! The bot never talks to the XMTP wire directly; an incoming message is
//! handed to the handler behind [`ChatMessage`], which exposes just the
//! pieces the mention pipeline needs: the text, the conversation kind,
//! the member list and a way to reply.

use anyhow::Result;
use async_trait::async_trait;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IdentifierKind {
    Ethereum,
    Passkey,
}

/// One account identifier attached to a group member.
#[derive(Debug, Clone)]
pub struct AccountIdentifier {
    pub kind: IdentifierKind,
    pub identifier: String,
}

#[derive(Debug, Clone)]
pub struct GroupMember {
    pub inbox_id: String,
    pub account_identifiers: Vec<AccountIdentifier>,
}

/// An incoming message plus the conversation it arrived on, as supplied by
/// the transport.
#[async_trait]
pub trait ChatMessage: Send + Sync {
    fn text(&self) -> &str;
    fn is_group(&self) -> bool;
    fn is_dm(&self) -> bool;
    /// Current participants; only meaningful for group conversations.
    async fn members(&self) -> Result<Vec<GroupMember>>;
    async fn send_text(&self, text: &str) -> Result<()>;
}

/// Keeps each member's Ethereum address, dropping members without one.
pub fn extract_member_addresses(members: &[GroupMember]) -> Vec<String> {
    members
        .iter()
        .filter_map(|member| {
            member
                .account_identifiers
                .iter()
                .find(|id| id.kind == IdentifierKind::Ethereum)
                .map(|id| id.identifier.clone())
        })
        .collect()
}
