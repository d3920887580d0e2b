//! Credential verification hook for `auth` messages.

use super::UserId;

/// Verifies the token a client presents in an `auth` message.
#[cfg_attr(test, mockall::automock)]
pub trait TokenVerifier: Send + Sync {
    fn verify(&self, user_id: UserId, token: &str) -> bool;
}

/// Accepts any non-blank token.
///
/// Real deployments plug in a verifier backed by their account service.
#[derive(Debug, Clone, Copy, Default)]
pub struct NonEmptyTokenVerifier;

impl TokenVerifier for NonEmptyTokenVerifier {
    fn verify(&self, _user_id: UserId, token: &str) -> bool {
        !token.trim().is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_non_empty_token_verifier() {
        // テスト項目: 空白以外の文字を含むトークンのみ受け付ける
        // given (前提条件):
        let verifier = NonEmptyTokenVerifier;
        let uid = UserId::new(1).unwrap();

        // when (操作) / then (期待する結果):
        assert!(verifier.verify(uid, "secret"));
        assert!(!verifier.verify(uid, ""));
        assert!(!verifier.verify(uid, "  "));
    }
}
