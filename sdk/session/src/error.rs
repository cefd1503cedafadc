//! Error taxonomy for the session layer.
//!
//! Every failure is a typed value the caller can pattern-match on; nothing
//! panics the hosting process. Wallet addresses are abbreviated before they
//! appear in any message.

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SessionError {
    /// The supplied wallet string is not a hex address.
    #[error("invalid wallet address {0}")]
    InvalidWallet(String),

    /// Malformed input to a create/update operation.
    #[error("{0}")]
    Validation(String),

    /// The referenced request or record no longer exists.
    #[error("no longer available")]
    NotFound,

    /// The identity provider or persistence layer failed.
    #[error("upstream unavailable: {reason}")]
    Upstream { reason: String, retryable: bool },

    /// The session identity changed while the operation was in flight; the
    /// result was discarded rather than applied.
    #[error("result discarded after an auth change")]
    Stale,
}

impl SessionError {
    /// Whether an immediate retry has any chance of succeeding.
    pub fn retryable(&self) -> bool {
        matches!(self, SessionError::Upstream { retryable: true, .. })
    }
}

/// Shorten a wallet address for display and logging: `0x1234…5678`.
/// Output never contains the full address.
pub fn abbreviate_wallet(wallet: &str) -> String {
    if wallet.len() <= 11 {
        return wallet.to_string();
    }
    format!("{}…{}", &wallet[..6], &wallet[wallet.len() - 4..])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn abbreviation_keeps_prefix_and_suffix() {
        let full = "0x52908400098527886e0f7030069857d2e4169ee7";
        let short = abbreviate_wallet(full);
        assert_eq!(short, "0x5290…9ee7");
        assert!(!short.contains("098527886e"));
    }

    #[test]
    fn short_strings_pass_through() {
        assert_eq!(abbreviate_wallet("0x1234"), "0x1234");
    }

    #[test]
    fn only_upstream_errors_are_retryable() {
        assert!(SessionError::Upstream {
            reason: "timeout".into(),
            retryable: true
        }
        .retryable());
        assert!(!SessionError::Upstream {
            reason: "forbidden".into(),
            retryable: false
        }
        .retryable());
        assert!(!SessionError::NotFound.retryable());
        assert!(!SessionError::Stale.retryable());
    }
}
