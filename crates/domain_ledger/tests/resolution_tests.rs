//! Tests for trial balance source resolution

use std::sync::Arc;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use core_kernel::{AccountId, JournalEntryId, ReportWindow, TenantContext, TenantId};

use domain_ledger::account::{Account, AccountType};
use domain_ledger::journal::{LegacyLine, LineRecord, ModernLine};
use domain_ledger::ports::mock::{MockBalanceService, MockLedgerQuery, MockTrialBalanceRpc};
use domain_ledger::resolution::{
    AttemptOutcome, BalanceSource, EmptyResultPolicy, ResolutionNotice, ResolverConfig,
    TrialBalanceResolver,
};
use domain_ledger::trial_balance::TrialBalanceRow;

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn window() -> ReportWindow {
    ReportWindow::new(date(2024, 1, 1), date(2024, 6, 30)).unwrap()
}

fn precomputed_row(code: &str, closing_debit: Decimal) -> TrialBalanceRow {
    let account = Account::new(AccountId::new(), code, "Precomputed", AccountType::Asset);
    let mut row = TrialBalanceRow::for_account(&account);
    row.period_debit = closing_debit;
    row.close();
    row
}

fn modern(account_id: AccountId, debit: Decimal, credit: Decimal, on: NaiveDate) -> LineRecord {
    LineRecord::Modern(ModernLine {
        entry_id: Some(JournalEntryId::new()),
        account_id,
        debit: Some(debit),
        credit: Some(credit),
        entry_date: Some(on),
        posting_date: None,
    })
}

fn legacy(account_id: AccountId, debit: Decimal, credit: Decimal, on: NaiveDate) -> LineRecord {
    LineRecord::Legacy(LegacyLine {
        entry_id: Some(JournalEntryId::new()),
        account_id,
        debit_amount: Some(debit),
        credit_amount: Some(credit),
        entry_date: Some(on),
        posting_date: None,
    })
}

struct Harness {
    ctx: TenantContext,
    service: Arc<MockBalanceService>,
    rpc: Arc<MockTrialBalanceRpc>,
    ledger: Arc<MockLedgerQuery>,
}

impl Harness {
    fn new(service: MockBalanceService, rpc: MockTrialBalanceRpc, ledger: MockLedgerQuery, tenant: TenantId) -> Self {
        Self {
            ctx: TenantContext::new(tenant).initiated_by("tester"),
            service: Arc::new(service),
            rpc: Arc::new(rpc),
            ledger: Arc::new(ledger),
        }
    }

    fn resolver(&self, config: &ResolverConfig) -> TrialBalanceResolver {
        TrialBalanceResolver::standard(
            self.service.clone(),
            self.rpc.clone(),
            self.ledger.clone(),
            config,
        )
    }
}

/// Ledger with a cash and a sales account and one sale in each schema
async fn seeded_ledger(tenant: TenantId) -> (MockLedgerQuery, Account, Account) {
    let cash = Account::new(AccountId::new(), "1001", "Cash", AccountType::Asset);
    let sales = Account::new(AccountId::new(), "4001", "Sales", AccountType::Revenue);
    let header = Account::new(AccountId::new(), "1000", "Current Assets", AccountType::Asset).as_header();

    let ledger = MockLedgerQuery::new()
        .with_accounts(tenant, vec![sales.clone(), cash.clone(), header])
        .await
        .with_lines(
            tenant,
            vec![
                modern(cash.id, dec!(250), Decimal::ZERO, date(2024, 2, 1)),
                modern(sales.id, Decimal::ZERO, dec!(250), date(2024, 2, 1)),
                legacy(cash.id, dec!(90), Decimal::ZERO, date(2023, 12, 1)),
                legacy(sales.id, Decimal::ZERO, dec!(90), date(2023, 12, 1)),
            ],
        )
        .await;

    (ledger, cash, sales)
}

// ============================================================================
// Tier Order
// ============================================================================

mod tier_order_tests {
    use super::*;

    #[tokio::test]
    async fn test_service_answer_short_circuits() {
        let tenant = TenantId::new();
        let h = Harness::new(
            MockBalanceService::returning(vec![precomputed_row("1001", dec!(10))]),
            MockTrialBalanceRpc::returning(vec![precomputed_row("9999", dec!(1))]),
            MockLedgerQuery::new().failing_accounts("should not be called"),
            tenant,
        );

        let resolved = h.resolver(&ResolverConfig::default()).resolve(&h.ctx, &window()).await;

        assert_eq!(resolved.source, Some(BalanceSource::PrecomputedService));
        assert_eq!(resolved.rows.len(), 1);
        assert_eq!(resolved.rows[0].account_code, "1001");
        assert_eq!(resolved.attempts.len(), 1);
        assert_eq!(h.service.calls(), 1);
        assert!(h.rpc.calls().await.is_empty());
        assert_eq!(resolved.notice, None);
    }

    #[tokio::test]
    async fn test_service_failure_falls_through_to_rpc() {
        let tenant = TenantId::new();
        let h = Harness::new(
            MockBalanceService::failing("stack depth limit exceeded"),
            MockTrialBalanceRpc::returning(vec![precomputed_row("1001", dec!(42))]),
            MockLedgerQuery::new(),
            tenant,
        );

        let resolved = h.resolver(&ResolverConfig::default()).resolve(&h.ctx, &window()).await;

        assert_eq!(resolved.source, Some(BalanceSource::Rpc));
        assert_eq!(resolved.totals().closing_debit, dec!(42));
        assert!(matches!(
            &resolved.attempts[0].outcome,
            AttemptOutcome::Failed { message } if message.contains("stack depth")
        ));
        assert_eq!(resolved.attempts[1].outcome, AttemptOutcome::Accepted { rows: 1 });
    }

    #[tokio::test]
    async fn test_rpc_receives_function_and_as_of_date() {
        let tenant = TenantId::new();
        let h = Harness::new(
            MockBalanceService::returning(vec![]),
            MockTrialBalanceRpc::returning(vec![]),
            MockLedgerQuery::new(),
            tenant,
        );

        h.resolver(&ResolverConfig::default()).resolve(&h.ctx, &window()).await;

        assert_eq!(
            h.rpc.calls().await,
            vec![("rpc_get_trial_balance".to_string(), date(2024, 6, 30))]
        );
    }

    #[tokio::test]
    async fn test_each_tier_is_tried_once() {
        let tenant = TenantId::new();
        let h = Harness::new(
            MockBalanceService::failing("down"),
            MockTrialBalanceRpc::failing("function does not exist"),
            MockLedgerQuery::new().failing_accounts("connection reset"),
            tenant,
        );

        let resolved = h.resolver(&ResolverConfig::default()).resolve(&h.ctx, &window()).await;

        assert_eq!(h.service.calls(), 1);
        assert_eq!(h.rpc.calls().await.len(), 1);
        let sources: Vec<BalanceSource> = resolved.attempts.iter().map(|a| a.source).collect();
        assert_eq!(
            sources,
            vec![
                BalanceSource::PrecomputedService,
                BalanceSource::Rpc,
                BalanceSource::ManualAggregation
            ]
        );
    }
}

// ============================================================================
// Empty Results
// ============================================================================

mod empty_result_tests {
    use super::*;

    #[tokio::test]
    async fn test_empty_service_answer_falls_through_by_default() {
        let tenant = TenantId::new();
        let h = Harness::new(
            MockBalanceService::returning(vec![]),
            MockTrialBalanceRpc::returning(vec![precomputed_row("1001", dec!(5))]),
            MockLedgerQuery::new(),
            tenant,
        );

        let resolved = h.resolver(&ResolverConfig::default()).resolve(&h.ctx, &window()).await;

        assert_eq!(resolved.attempts[0].outcome, AttemptOutcome::Empty);
        assert_eq!(resolved.source, Some(BalanceSource::Rpc));
    }

    #[tokio::test]
    async fn test_empty_service_answer_accepted_when_configured() {
        let tenant = TenantId::new();
        let h = Harness::new(
            MockBalanceService::returning(vec![]),
            MockTrialBalanceRpc::returning(vec![precomputed_row("1001", dec!(5))]),
            MockLedgerQuery::new(),
            tenant,
        );
        let config = ResolverConfig {
            service_empty_result: EmptyResultPolicy::Accept,
            ..ResolverConfig::default()
        };

        let resolved = h.resolver(&config).resolve(&h.ctx, &window()).await;

        assert_eq!(resolved.source, Some(BalanceSource::PrecomputedService));
        assert!(resolved.rows.is_empty());
        assert!(h.rpc.calls().await.is_empty());
    }

    #[tokio::test]
    async fn test_empty_rpc_answer_falls_through_when_configured() {
        let tenant = TenantId::new();
        let (ledger, _, _) = seeded_ledger(tenant).await;
        let h = Harness::new(
            MockBalanceService::failing("down"),
            MockTrialBalanceRpc::returning(vec![]),
            ledger,
            tenant,
        );
        let config = ResolverConfig {
            rpc_empty_result: EmptyResultPolicy::FallThrough,
            ..ResolverConfig::default()
        };

        let resolved = h.resolver(&config).resolve(&h.ctx, &window()).await;

        assert_eq!(resolved.attempts[1].outcome, AttemptOutcome::Empty);
        assert_eq!(resolved.source, Some(BalanceSource::ManualAggregation));
    }

    #[tokio::test]
    async fn test_manual_aggregation_with_no_lines_is_a_valid_empty_report() {
        let tenant = TenantId::new();
        let cash = Account::new(AccountId::new(), "1001", "Cash", AccountType::Asset);
        let ledger = MockLedgerQuery::new().with_accounts(tenant, vec![cash]).await;
        let h = Harness::new(
            MockBalanceService::failing("down"),
            MockTrialBalanceRpc::failing("down"),
            ledger,
            tenant,
        );

        let resolved = h.resolver(&ResolverConfig::default()).resolve(&h.ctx, &window()).await;

        assert_eq!(resolved.source, Some(BalanceSource::ManualAggregation));
        assert!(resolved.rows.is_empty());
        assert_eq!(resolved.notice, None);
    }
}

// ============================================================================
// Manual Aggregation
// ============================================================================

mod manual_aggregation_tests {
    use super::*;

    fn failing_remotes(ledger: MockLedgerQuery, tenant: TenantId) -> Harness {
        Harness::new(
            MockBalanceService::failing("down"),
            MockTrialBalanceRpc::failing("down"),
            ledger,
            tenant,
        )
    }

    #[tokio::test]
    async fn test_modern_schema_is_preferred() {
        let tenant = TenantId::new();
        let (ledger, _, _) = seeded_ledger(tenant).await;
        let h = failing_remotes(ledger, tenant);

        let resolved = h.resolver(&ResolverConfig::default()).resolve(&h.ctx, &window()).await;

        assert_eq!(resolved.source, Some(BalanceSource::ManualAggregation));
        let codes: Vec<&str> = resolved.rows.iter().map(|r| r.account_code.as_str()).collect();
        assert_eq!(codes, vec!["1001", "4001"]);
        assert_eq!(resolved.rows[0].period_debit, dec!(250));
        assert!(resolved.rows[0].opening_debit.is_zero());
        assert!(resolved.totals().is_balanced());
    }

    #[tokio::test]
    async fn test_legacy_schema_used_when_modern_join_fails() {
        let tenant = TenantId::new();
        let (ledger, _, _) = seeded_ledger(tenant).await;
        let h = failing_remotes(ledger.without_modern_schema(), tenant);

        let resolved = h.resolver(&ResolverConfig::default()).resolve(&h.ctx, &window()).await;

        assert_eq!(resolved.source, Some(BalanceSource::ManualAggregation));
        assert_eq!(resolved.rows[0].opening_debit, dec!(90));
        assert!(resolved.rows[0].period_debit.is_zero());
        assert_eq!(resolved.rows[1].opening_credit, dec!(90));
    }

    #[tokio::test]
    async fn test_both_schemas_missing_raises_notice() {
        let tenant = TenantId::new();
        let (ledger, _, _) = seeded_ledger(tenant).await;
        let h = failing_remotes(ledger.without_modern_schema().without_legacy_schema(), tenant);

        let resolved = h.resolver(&ResolverConfig::default()).resolve(&h.ctx, &window()).await;

        assert!(!resolved.is_resolved());
        assert!(resolved.rows.is_empty());
        assert_eq!(resolved.notice, Some(ResolutionNotice::ManualAggregationFailed));
        assert!(matches!(
            &resolved.attempts[2].outcome,
            AttemptOutcome::Failed { message } if message.contains("journal_lines")
        ));
    }

    #[tokio::test]
    async fn test_other_tenants_lines_are_invisible() {
        let tenant = TenantId::new();
        let (ledger, _, _) = seeded_ledger(tenant).await;
        let h = failing_remotes(ledger, TenantId::new());

        let resolved = h.resolver(&ResolverConfig::default()).resolve(&h.ctx, &window()).await;

        assert_eq!(resolved.source, Some(BalanceSource::ManualAggregation));
        assert!(resolved.rows.is_empty());
    }
}

// ============================================================================
// RPC Function Name
// ============================================================================

mod function_name_tests {
    use super::*;

    #[tokio::test]
    async fn test_invalid_function_name_skips_rpc_tier() {
        let tenant = TenantId::new();
        let (ledger, _, _) = seeded_ledger(tenant).await;
        let h = Harness::new(
            MockBalanceService::failing("down"),
            MockTrialBalanceRpc::returning(vec![precomputed_row("1001", dec!(1))]),
            ledger,
            tenant,
        );
        let config = ResolverConfig {
            rpc_function: "tb(); DROP TABLE gl_accounts".to_string(),
            ..ResolverConfig::default()
        };

        let resolved = h.resolver(&config).resolve(&h.ctx, &window()).await;

        assert!(h.rpc.calls().await.is_empty());
        assert!(matches!(
            &resolved.attempts[1].outcome,
            AttemptOutcome::Failed { message } if message.contains("Invalid function name")
        ));
        assert_eq!(resolved.source, Some(BalanceSource::ManualAggregation));
    }

    #[tokio::test]
    async fn test_schema_qualified_function_is_called() {
        let tenant = TenantId::new();
        let h = Harness::new(
            MockBalanceService::failing("down"),
            MockTrialBalanceRpc::returning(vec![precomputed_row("1001", dec!(1))]),
            MockLedgerQuery::new(),
            tenant,
        );
        let config = ResolverConfig {
            rpc_function: "reporting.rpc_get_trial_balance".to_string(),
            ..ResolverConfig::default()
        };

        let resolved = h.resolver(&config).resolve(&h.ctx, &window()).await;

        assert_eq!(resolved.source, Some(BalanceSource::Rpc));
        assert_eq!(h.rpc.calls().await[0].0, "reporting.rpc_get_trial_balance");
    }
}

#[test]
fn test_resolver_config_deserializes_with_defaults() {
    let config: ResolverConfig =
        serde_json::from_str(r#"{"service_empty_result": "accept"}"#).unwrap();

    assert_eq!(config.service_empty_result, EmptyResultPolicy::Accept);
    assert_eq!(config.rpc_function, "rpc_get_trial_balance");
    assert_eq!(config.manual_empty_result, EmptyResultPolicy::Accept);
}
