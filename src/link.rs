//! Share URLs: assemble `origin + path + ?param=token`, enforce the length
//! budget, and pull a token back out of a pasted link.

use thiserror::Error;
use tracing::warn;
use url::Url;

use crate::config::ShareCfg;

#[derive(Debug, Error)]
pub enum LinkError {
    #[error("invalid share origin {origin:?}: {source}")]
    InvalidOrigin {
        origin: String,
        #[source]
        source: url::ParseError,
    },
    #[error("share link is {len} chars, over the {max} char limit")]
    TooLong { len: usize, max: usize },
}

pub fn share_url(origin: &str, path: &str, param: &str, token: &str) -> Result<Url, LinkError> {
    let invalid = |source| LinkError::InvalidOrigin {
        origin: origin.to_string(),
        source,
    };
    let mut url = Url::parse(origin)
        .and_then(|base| base.join(path))
        .map_err(invalid)?;
    url.query_pairs_mut().clear().append_pair(param, token);
    Ok(url)
}

/// Full share link for `token`, rejected when longer than `cfg.max_url_len`.
pub fn build_share_link(cfg: &ShareCfg, token: &str) -> Result<String, LinkError> {
    let url = share_url(&cfg.origin, &cfg.path, &cfg.query_param, token)?;
    let len = url.as_str().len();
    if len > cfg.max_url_len {
        warn!("Share link too long: {} > {} chars", len, cfg.max_url_len);
        return Err(LinkError::TooLong {
            len,
            max: cfg.max_url_len,
        });
    }
    Ok(url.into())
}

/// Accepts a bare token, an absolute share URL or a relative `/share?...` link.
pub fn token_from_input(input: &str, param: &str) -> Option<String> {
    let input = input.trim();
    if input.is_empty() {
        return None;
    }
    let parsed = match Url::parse(input) {
        Ok(u) if !u.cannot_be_a_base() => Some(u),
        Err(url::ParseError::RelativeUrlWithoutBase) if input.contains('?') => {
            Url::parse("http://localhost/")
                .and_then(|base| base.join(input))
                .ok()
        }
        _ => None,
    };
    match parsed {
        Some(u) => u
            .query_pairs()
            .find(|(k, _)| k == param)
            .map(|(_, v)| v.into_owned())
            .filter(|v| !v.is_empty()),
        None => Some(input.to_string()),
    }
}

/// Environment tag for a link: the configured tag when set, otherwise
/// guessed from the host the app is served from.
pub fn detect_environment(configured: Option<&str>, host: Option<&str>) -> String {
    if let Some(env) = configured.map(str::trim).filter(|e| !e.is_empty()) {
        return env.to_string();
    }
    let host = host.unwrap_or_default().to_ascii_lowercase();
    let dev = ["localhost", "127.0.0.1", "dev", "staging"]
        .iter()
        .any(|needle| host.contains(needle));
    let env = if dev { "dev" } else { "prod" };
    env.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cfg(max: usize) -> ShareCfg {
        ShareCfg {
            max_url_len: max,
            ..ShareCfg::default()
        }
    }

    // ---------- urls ----------

    #[test]
    fn url_is_origin_path_and_param() {
        let u = share_url("https://journal.example.com", "/share", "data", "abc-_1").unwrap();
        assert_eq!(u.as_str(), "https://journal.example.com/share?data=abc-_1");

        let u = share_url("http://localhost:5173/app/", "/share", "data", "x").unwrap();
        assert_eq!(u.as_str(), "http://localhost:5173/share?data=x");
    }

    #[test]
    fn bad_origin_is_an_error() {
        let err = share_url("not a url", "/share", "data", "x").unwrap_err();
        assert!(matches!(err, LinkError::InvalidOrigin { .. }));
    }

    #[test]
    fn budget_is_enforced() {
        let token = "a".repeat(100);
        assert!(build_share_link(&cfg(2000), &token).is_ok());
        match build_share_link(&cfg(50), &token) {
            Err(LinkError::TooLong { len, max }) => {
                assert!(len > 100);
                assert_eq!(max, 50);
            }
            other => panic!("expected TooLong, got {other:?}"),
        }
    }

    // ---------- token extraction ----------

    #[test]
    fn token_from_url_or_bare() {
        assert_eq!(
            token_from_input("https://x.io/share?data=eyJ0Ijpb&utm=1", "data").as_deref(),
            Some("eyJ0Ijpb")
        );
        assert_eq!(
            token_from_input("/share?data=eyJ0Ijpb", "data").as_deref(),
            Some("eyJ0Ijpb")
        );
        assert_eq!(token_from_input("  eyJ0Ijpb \n", "data").as_deref(), Some("eyJ0Ijpb"));
        assert_eq!(token_from_input("https://x.io/share?other=1", "data"), None);
        assert_eq!(token_from_input("", "data"), None);
    }

    // ---------- environment ----------

    #[test]
    fn environment_guess() {
        assert_eq!(detect_environment(Some("qa"), Some("localhost")), "qa");
        assert_eq!(detect_environment(Some("  "), Some("LOCALHOST:5173")), "dev");
        assert_eq!(detect_environment(None, Some("staging.journal.io")), "dev");
        assert_eq!(detect_environment(None, Some("journal.io")), "prod");
        assert_eq!(detect_environment(None, None), "prod");
    }
}
