//! Message handling: the glue between the chat transport and the mention
//! pipeline.

use anyhow::Result;
use mention_core::NameResolver;
use tracing::{debug, info};

use crate::chat::{ChatMessage, extract_member_addresses};

#[derive(Debug, Clone)]
pub struct HandlerConfig {
    /// Mention that addresses the agent in group chats, e.g. `@game`.
    pub agent_mention: String,
    /// Mini-app base URL linked in replies.
    pub frontend_url: String,
}

impl HandlerConfig {
    fn agent_handle(&self) -> &str {
        self.agent_mention.trim_start_matches('@')
    }
}

/// Handle one incoming text message.
///
/// Group messages addressed to the agent get their mentions extracted and
/// resolved against the member list, then a per-candidate summary and the
/// mini-app link. DMs get the `/start` onboarding flow. Everything else is
/// ignored.
pub async fn handle_text(
    message: &dyn ChatMessage,
    config: &HandlerConfig,
    resolver: &dyn NameResolver,
) -> Result<()> {
    let content = message.text();

    if message.is_group() && content.contains(&config.agent_mention) {
        // The agent's own handle always matches the handle pattern; it is
        // addressing, not a candidate.
        let mentions: Vec<String> = mention_core::extract_mentions(content)
            .into_iter()
            .filter(|mention| mention != config.agent_handle())
            .collect();
        if mentions.is_empty() {
            debug!("agent-directed message without candidates");
            return Ok(());
        }
        info!(count = mentions.len(), "extracted mentions");

        let members = message.members().await?;
        let member_addresses = extract_member_addresses(&members);
        let results =
            mention_core::resolve_identifiers(mentions, Some(&member_addresses), resolver).await;

        let summary: Vec<String> = results
            .iter()
            .map(|(candidate, address)| match address {
                Some(address) => format!("✅ {candidate} → {address}"),
                None => format!("❌ {candidate} → Not found"),
            })
            .collect();
        message.send_text(&summary.join("\n")).await?;

        let tags: Vec<&str> = results.iter().map(|(candidate, _)| candidate.as_str()).collect();
        message.send_text("🚀 View in Mini App:").await?;
        message
            .send_text(&format!("{}?tags={}", config.frontend_url, tags.join(",")))
            .await?;
    } else if message.is_dm() && content.contains("/start") {
        message.send_text("🔍 Start:\n\n").await?;
        message.send_text(&config.frontend_url).await?;
    } else if message.is_dm() {
        message.send_text("send /start to open the mini app").await?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chat::{AccountIdentifier, GroupMember, IdentifierKind};
    use async_trait::async_trait;
    use std::sync::Mutex;

    struct MockChat {
        text: String,
        group: bool,
        members: Vec<GroupMember>,
        sent: Mutex<Vec<String>>,
    }

    impl MockChat {
        fn group(text: &str, addresses: &[&str]) -> Self {
            let members = addresses
                .iter()
                .map(|address| GroupMember {
                    inbox_id: format!("inbox-{address}"),
                    account_identifiers: vec![AccountIdentifier {
                        kind: IdentifierKind::Ethereum,
                        identifier: (*address).to_owned(),
                    }],
                })
                .collect();
            Self {
                text: text.to_owned(),
                group: true,
                members,
                sent: Mutex::new(Vec::new()),
            }
        }

        fn dm(text: &str) -> Self {
            Self {
                text: text.to_owned(),
                group: false,
                members: Vec::new(),
                sent: Mutex::new(Vec::new()),
            }
        }

        fn sent(&self) -> Vec<String> {
            self.sent.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl ChatMessage for MockChat {
        fn text(&self) -> &str {
            &self.text
        }

        fn is_group(&self) -> bool {
            self.group
        }

        fn is_dm(&self) -> bool {
            !self.group
        }

        async fn members(&self) -> Result<Vec<GroupMember>> {
            Ok(self.members.clone())
        }

        async fn send_text(&self, text: &str) -> Result<()> {
            self.sent.lock().unwrap().push(text.to_owned());
            Ok(())
        }
    }

    struct NoResolver;

    #[async_trait]
    impl NameResolver for NoResolver {
        async fn resolve_name(&self, _name: &str) -> Option<String> {
            None
        }
    }

    fn config() -> HandlerConfig {
        HandlerConfig {
            agent_mention: "@game".to_owned(),
            frontend_url: "http://localhost:3000".to_owned(),
        }
    }

    const MEMBER: &str = "0xABCDEF0000000000000000000000000000001234";

    #[tokio::test]
    async fn group_mention_resolves_and_links_mini_app() {
        let chat = MockChat::group("@game tag @0xabcd…1234 and @nobody.eth", &[MEMBER]);
        handle_text(&chat, &config(), &NoResolver).await.unwrap();

        let sent = chat.sent();
        assert_eq!(sent.len(), 3);
        assert!(sent[0].contains(&format!("✅ 0xabcd…1234 → {MEMBER}")));
        assert!(sent[0].contains("❌ nobody.eth → Not found"));
        assert_eq!(sent[1], "🚀 View in Mini App:");
        assert_eq!(sent[2], "http://localhost:3000?tags=0xabcd…1234,nobody.eth");
    }

    #[tokio::test]
    async fn agent_handle_is_not_a_candidate() {
        let chat = MockChat::group("@game hello there", &[MEMBER]);
        handle_text(&chat, &config(), &NoResolver).await.unwrap();
        assert!(chat.sent().is_empty());
    }

    #[tokio::test]
    async fn group_message_without_agent_mention_is_ignored() {
        let chat = MockChat::group("just chatting about @alice.eth", &[]);
        handle_text(&chat, &config(), &NoResolver).await.unwrap();
        assert!(chat.sent().is_empty());
    }

    #[tokio::test]
    async fn dm_start_links_mini_app() {
        let chat = MockChat::dm("/start");
        handle_text(&chat, &config(), &NoResolver).await.unwrap();

        let sent = chat.sent();
        assert_eq!(sent.len(), 2);
        assert_eq!(sent[1], "http://localhost:3000");
    }

    #[tokio::test]
    async fn other_dm_gets_start_hint() {
        let chat = MockChat::dm("hello?");
        handle_text(&chat, &config(), &NoResolver).await.unwrap();
        assert_eq!(chat.sent(), vec!["send /start to open the mini app".to_owned()]);
    }
}
