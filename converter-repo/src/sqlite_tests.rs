//! SQLite store integration tests.

#[cfg(test)]
mod tests {
    use converter_types::{
        CurrencyCode, ProviderDescriptor, ProviderStatusStore, RateHistoryStore, StoreError,
    };

    use crate::{Repo, SqliteRepo, build_repo};

    async fn setup_repo() -> SqliteRepo {
        SqliteRepo::new("sqlite::memory:").await.unwrap()
    }

    fn code(c: &str) -> CurrencyCode {
        CurrencyCode::new(c).unwrap()
    }

    fn descriptor(name: &str, priority: i32) -> ProviderDescriptor {
        ProviderDescriptor::new(name, priority, true, "http://example.test", None, false)
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Rate history
    // ─────────────────────────────────────────────────────────────────────────

    #[tokio::test]
    async fn test_append_and_most_recent() {
        let repo = setup_repo().await;

        let saved = repo.append(code("USD"), code("EUR"), 0.85, "exchangerates").await.unwrap();
        assert!(saved.id > 0);
        assert_eq!(
            (saved.expires_at - saved.created_at).num_seconds(),
            300
        );

        let found = repo.most_recent(code("USD"), code("EUR")).await.unwrap().unwrap();
        assert_eq!(found.rate, 0.85);
        assert_eq!(found.source, "exchangerates");
        assert_eq!(found.from_currency, code("USD"));
    }

    #[tokio::test]
    async fn test_most_recent_returns_newest() {
        let repo = setup_repo().await;

        repo.append(code("USD"), code("EUR"), 0.80, "fixer").await.unwrap();
        repo.append(code("USD"), code("EUR"), 0.90, "currencyapi").await.unwrap();

        let found = repo.most_recent(code("USD"), code("EUR")).await.unwrap().unwrap();
        assert_eq!(found.rate, 0.90);
        assert_eq!(found.source, "currencyapi");
    }

    #[tokio::test]
    async fn test_most_recent_is_exact_pair_only() {
        let repo = setup_repo().await;
        repo.append(code("EUR"), code("USD"), 1.17, "fixer").await.unwrap();

        let found = repo.most_recent(code("USD"), code("EUR")).await.unwrap();
        assert!(found.is_none());
    }

    #[tokio::test]
    async fn test_recent_orders_and_limits() {
        let repo = setup_repo().await;
        for i in 0..5 {
            repo.append(code("USD"), code("GBP"), 0.7 + i as f64 / 100.0, "fixer")
                .await
                .unwrap();
        }
        repo.append(code("USD"), code("JPY"), 149.0, "fixer").await.unwrap();

        let rows = repo.recent(code("USD"), code("GBP"), 3).await.unwrap();
        assert_eq!(rows.len(), 3);
        assert!((rows[0].rate - 0.74).abs() < 1e-9);
        assert!(rows.windows(2).all(|w| w[0].created_at >= w[1].created_at));
        assert!(rows.iter().all(|r| r.to_currency == code("GBP")));
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Provider status
    // ─────────────────────────────────────────────────────────────────────────

    #[tokio::test]
    async fn test_register_and_list_by_priority() {
        let repo = setup_repo().await;
        repo.register(&descriptor("fixer", 3)).await.unwrap();
        repo.register(&descriptor("exchangerates", 1)).await.unwrap();
        repo.register(&descriptor("currencyapi", 2)).await.unwrap();

        let names: Vec<_> = repo
            .list_all()
            .await
            .unwrap()
            .into_iter()
            .map(|r| r.name)
            .collect();
        assert_eq!(names, vec!["exchangerates", "currencyapi", "fixer"]);
    }

    #[tokio::test]
    async fn test_failure_increments_and_success_resets() {
        let repo = setup_repo().await;
        repo.register(&descriptor("fixer", 3)).await.unwrap();

        repo.record_outcome("fixer", false).await.unwrap();
        repo.record_outcome("fixer", false).await.unwrap();
        let status = repo.get("fixer").await.unwrap().unwrap();
        assert_eq!(status.failure_count, 2);
        assert!(status.last_failure_at.is_some());
        assert!(status.last_success_at.is_none());

        repo.record_outcome("fixer", true).await.unwrap();
        let status = repo.get("fixer").await.unwrap().unwrap();
        assert_eq!(status.failure_count, 0);
        assert!(status.last_success_at.is_some());
        assert!(status.last_failure_at.is_some());
    }

    #[tokio::test]
    async fn test_reregister_keeps_counters() {
        let repo = setup_repo().await;
        repo.register(&descriptor("fixer", 3)).await.unwrap();
        repo.record_outcome("fixer", false).await.unwrap();

        let moved = ProviderDescriptor::new("fixer", 7, true, "http://other.test", None, true);
        repo.register(&moved).await.unwrap();

        let status = repo.get("fixer").await.unwrap().unwrap();
        assert_eq!(status.failure_count, 1);
        assert_eq!(status.priority, 7);
        assert_eq!(status.base_url, "http://other.test");
        assert!(!status.is_active);
        assert!(status.requires_credential);
    }

    #[tokio::test]
    async fn test_record_outcome_unknown_provider() {
        let repo = setup_repo().await;
        let err = repo.record_outcome("ghost", true).await.unwrap_err();
        assert!(matches!(err, StoreError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_get_missing_provider() {
        let repo = setup_repo().await;
        assert!(repo.get("ghost").await.unwrap().is_none());
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Wrapper & persistence
    // ─────────────────────────────────────────────────────────────────────────

    #[tokio::test]
    async fn test_build_repo_dispatches_on_scheme() {
        let repo = build_repo("sqlite::memory:").await.unwrap();
        assert!(matches!(repo, Repo::Sqlite(_)));

        repo.append(code("USD"), code("EUR"), 0.85, "fixer").await.unwrap();
        assert!(repo.most_recent(code("USD"), code("EUR")).await.unwrap().is_some());

        assert!(build_repo("mysql://nope").await.is_err());
    }

    #[tokio::test]
    async fn test_history_survives_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let url = format!("sqlite://{}/nested/rates.db", dir.path().display());

        {
            let repo = SqliteRepo::new(&url).await.unwrap();
            repo.append(code("USD"), code("EUR"), 0.85, "fixer").await.unwrap();
            repo.register(&descriptor("fixer", 3)).await.unwrap();
            repo.pool().close().await;
        }

        let reopened = SqliteRepo::new(&url).await.unwrap();
        let found = reopened.most_recent(code("USD"), code("EUR")).await.unwrap().unwrap();
        assert_eq!(found.source, "fixer");
        assert_eq!(reopened.list_all().await.unwrap().len(), 1);
    }
}
