//! UseCase: 認証

use std::sync::Arc;

use crate::domain::{TokenVerifier, UserId};

/// `auth` メッセージのトークン検証のユースケース
pub struct AuthUseCase {
    verifier: Arc<dyn TokenVerifier>,
}

impl AuthUseCase {
    /// 新しい AuthUseCase を作成
    pub fn new(verifier: Arc<dyn TokenVerifier>) -> Self {
        Self { verifier }
    }

    /// トークンを検証し、認証に成功したら `true`
    pub fn execute(&self, user_id: UserId, token: &str) -> bool {
        let verified = self.verifier.verify(user_id, token);
        if !verified {
            tracing::info!(%user_id, "authentication failed");
        }
        verified
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::MockTokenVerifier;

    #[test]
    fn test_auth_delegates_to_verifier() {
        // テスト項目: 検証はユーザー ID とトークンをそのまま TokenVerifier に委譲する
        // given (前提条件):
        let uid = UserId::new(1001).unwrap();
        let mut verifier = MockTokenVerifier::new();
        verifier
            .expect_verify()
            .withf(move |user_id, token| *user_id == uid && token == "good")
            .return_const(true);
        verifier
            .expect_verify()
            .withf(move |user_id, token| *user_id == uid && token != "good")
            .return_const(false);
        let usecase = AuthUseCase::new(Arc::new(verifier));

        // when (操作):
        let ok = usecase.execute(uid, "good");
        let ng = usecase.execute(uid, "bad");

        // then (期待する結果):
        assert!(ok);
        assert!(!ng);
    }
}
