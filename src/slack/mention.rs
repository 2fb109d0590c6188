//! Render user mentions for humans.
//!
//! Slack encodes a mention of a user inside message text as `<@U0123ABC>`.
//! For display we'd rather show `@alice`.

use super::{api::SlackClient, error::SlackError};
use crate::cache::Cache;
use once_cell::sync::Lazy;
use regex::{Captures, Regex};
use std::collections::HashMap;
use tracing::{debug, warn};

// This unwrap is exercised by the tests below.
static MENTION: Lazy<Regex> = Lazy::new(|| Regex::new(r"<@(U[A-Z0-9]+)>").unwrap());

/// Resolves user IDs to display names, remembering every name it has seen.
///
/// One resolver can be shared across concurrent resolutions, for example when
/// annotating a page of history. Names are assumed stable for the lifetime of
/// the resolver.
pub struct UserResolver<'a> {
    client: &'a SlackClient,
    cache: Cache<String, String>,
}

impl<'a> UserResolver<'a> {
    pub fn new(client: &'a SlackClient) -> Self {
        UserResolver {
            client,
            cache: Cache::new(),
        }
    }

    /// A display name for the given user ID. Resolution is best-effort: if
    /// the lookup fails the ID itself is returned, and isn't cached.
    pub async fn resolve(&self, id: &str) -> String {
        if id.is_empty() {
            return String::new();
        }

        let key = id.to_owned();
        let res = self
            .cache
            .get_or_try_compute(&key, || async {
                let user = self.client.get_user_info(id).await?;
                debug!(id, "Looked up user");

                Ok::<_, SlackError>(user.display_name().unwrap_or(id).to_owned())
            })
            .await;

        res.unwrap_or_else(|e| {
            match e.code() {
                Some("user_not_found") => debug!(id, "Unknown user, falling back to ID"),
                _ => warn!(id, error = %e, "Could not resolve user, falling back to ID"),
            }
            key
        })
    }

    /// Replace every `<@USERID>` in `text` with `@<display name>`.
    pub async fn resolve_mentions(&self, text: &str) -> String {
        let mut names: HashMap<&str, String> = HashMap::new();

        for id in MENTION
            .captures_iter(text)
            .filter_map(|cs| cs.get(1))
            .map(|m| m.as_str())
        {
            if !names.contains_key(id) {
                let name = self.resolve(id).await;
                names.insert(id, name);
            }
        }

        MENTION
            .replace_all(text, |cs: &Captures| {
                match cs.get(1).and_then(|m| names.get(m.as_str())) {
                    Some(name) => format!("@{}", name),
                    None => cs[0].to_owned(),
                }
            })
            .into_owned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::slack::auth::SlackAccessToken;
    use mockito::Matcher;

    async fn server() -> mockito::ServerGuard {
        mockito::Server::new_async().await
    }

    fn client(srv: &mockito::ServerGuard) -> SlackClient {
        SlackClient::new(srv.url(), SlackAccessToken("foobar".to_owned()))
    }

    fn user_res(id: &str, name: &str) -> String {
        format!(
            r#"{{
                "ok": true,
                "user": {{
                    "id": "{id}",
                    "name": "{name}",
                    "real_name": "{name}",
                    "profile": {{ "display_name": "{name}" }}
                }}
            }}"#
        )
    }

    async fn mock_user(
        srv: &mut mockito::ServerGuard,
        id: &str,
        name: &str,
        hits: usize,
    ) -> mockito::Mock {
        srv.mock("GET", "/users.info")
            .match_query(Matcher::UrlEncoded("user".into(), id.into()))
            .with_body(user_res(id, name))
            .expect(hits)
            .create_async()
            .await
    }

    async fn mock_unknown(srv: &mut mockito::ServerGuard, id: &str) -> mockito::Mock {
        srv.mock("GET", "/users.info")
            .match_query(Matcher::UrlEncoded("user".into(), id.into()))
            .with_body(r#"{ "ok": false, "error": "user_not_found" }"#)
            .create_async()
            .await
    }

    #[tokio::test]
    async fn test_resolve() {
        let mut srv = server().await;
        let alice = mock_user(&mut srv, "U001", "alice", 1).await;
        let bob = mock_user(&mut srv, "U002", "bob", 1).await;

        let c = client(&srv);
        let r = UserResolver::new(&c);

        assert_eq!(r.resolve("U001").await, "alice");
        assert_eq!(r.resolve("U002").await, "bob");

        alice.assert_async().await;
        bob.assert_async().await;
    }

    #[tokio::test]
    async fn test_resolve_caches() {
        let mut srv = server().await;
        let alice = mock_user(&mut srv, "U001", "alice", 1).await;

        let c = client(&srv);
        let r = UserResolver::new(&c);

        for _ in 0..3 {
            assert_eq!(r.resolve("U001").await, "alice");
        }

        alice.assert_async().await;
    }

    #[tokio::test]
    async fn test_resolve_empty() {
        let mut srv = server().await;
        let any = srv
            .mock("GET", "/users.info")
            .match_query(Matcher::Any)
            .expect(0)
            .create_async()
            .await;

        let c = client(&srv);
        assert_eq!(UserResolver::new(&c).resolve("").await, "");

        any.assert_async().await;
    }

    #[tokio::test]
    async fn test_resolve_unknown_falls_back() {
        let mut srv = server().await;
        let unknown = mock_unknown(&mut srv, "U999").await;

        let c = client(&srv);
        assert_eq!(UserResolver::new(&c).resolve("U999").await, "U999");

        unknown.assert_async().await;
    }

    #[tokio::test]
    async fn test_resolve_nameless_user_falls_back() {
        let mut srv = server().await;
        let nameless = srv
            .mock("GET", "/users.info")
            .match_query(Matcher::UrlEncoded("user".into(), "U003".into()))
            .with_body(r#"{ "ok": true, "user": { "id": "U003", "name": "", "profile": {} } }"#)
            .create_async()
            .await;

        let c = client(&srv);
        assert_eq!(UserResolver::new(&c).resolve("U003").await, "U003");

        nameless.assert_async().await;
    }

    #[tokio::test]
    async fn test_resolve_mentions() {
        let mut srv = server().await;
        let alice = mock_user(&mut srv, "U001", "alice", 1).await;
        let bob = mock_user(&mut srv, "U002", "bob", 1).await;

        let c = client(&srv);
        let r = UserResolver::new(&c);

        assert_eq!(
            r.resolve_mentions("<@U001> and <@U002>").await,
            "@alice and @bob"
        );
        // Served from the cache.
        assert_eq!(r.resolve_mentions("cc <@U001>").await, "cc @alice");

        alice.assert_async().await;
        bob.assert_async().await;
    }

    #[tokio::test]
    async fn test_resolve_mentions_unknown() {
        let mut srv = server().await;
        let _unknown = mock_unknown(&mut srv, "U999").await;

        let c = client(&srv);
        assert_eq!(
            UserResolver::new(&c).resolve_mentions("hi <@U999>").await,
            "hi @U999"
        );
    }

    #[tokio::test]
    async fn test_resolve_mentions_leaves_other_markup() {
        let srv = server().await;
        let c = client(&srv);
        let r = UserResolver::new(&c);

        for x in [
            "",
            "no mentions here",
            "<#C123|general>",
            "<@u001> lowercase",
            "<!subteam^SAWPVDSUW>",
            "<@W001> enterprise",
        ] {
            assert_eq!(r.resolve_mentions(x).await, x);
        }
    }

    #[tokio::test]
    async fn test_concurrent_resolution_shares_cache() {
        let mut srv = server().await;
        let alice = mock_user(&mut srv, "U001", "alice", 1).await;
        let bob = mock_user(&mut srv, "U002", "bob", 1).await;

        let c = client(&srv);
        let r = UserResolver::new(&c);

        let (a, b) = tokio::join!(r.resolve("U001"), r.resolve("U002"));
        assert_eq!((a.as_str(), b.as_str()), ("alice", "bob"));

        let (a, b) = tokio::join!(r.resolve("U001"), r.resolve("U002"));
        assert_eq!((a.as_str(), b.as_str()), ("alice", "bob"));

        alice.assert_async().await;
        bob.assert_async().await;
    }
}
