//! End-to-end report workflow: resolve from mock ports, filter, export

use std::sync::Arc;

use proptest::prelude::*;
use rust_decimal_macros::dec;

use domain_ledger::{
    filter_by_type, search_rows, AccountType, AccountTypeFilter, AttemptOutcome, BalanceSource,
    MockBalanceService, MockLedgerQuery, MockTrialBalanceRpc, ResolverConfig, TrialBalanceResolver,
};
use report_export::{ExportFormat, Language, ReportDocument, ReportExporter};
use test_utils::{
    assert_balanced, assert_row_closed, assert_sorted_by_code, assert_totals_match,
    rows_strategy, window_strategy, worked_example_ledger, AccountFixtures, ContextFixtures,
    IdFixtures, TemporalFixtures, TestLedgerBuilder, TestLineBuilder, TestRowBuilder,
};

fn resolver_over(ledger: MockLedgerQuery) -> TrialBalanceResolver {
    TrialBalanceResolver::standard(
        Arc::new(MockBalanceService::failing("balance service offline")),
        Arc::new(MockTrialBalanceRpc::failing("function rpc_get_trial_balance does not exist")),
        Arc::new(ledger),
        &ResolverConfig::default(),
    )
}

// ============================================================================
// Manual Aggregation Workflow
// ============================================================================

mod manual_workflow_tests {
    use super::*;

    #[tokio::test]
    async fn test_worked_example_through_fallback_chain() {
        let resolver = resolver_over(worked_example_ledger().build().await);

        let resolved = resolver
            .resolve(&ContextFixtures::tenant(), &TemporalFixtures::report_window())
            .await;

        assert_eq!(resolved.source, Some(BalanceSource::ManualAggregation));
        assert_eq!(resolved.attempts.len(), 3);
        assert!(matches!(resolved.attempts[0].outcome, AttemptOutcome::Failed { .. }));
        assert!(matches!(resolved.attempts[1].outcome, AttemptOutcome::Failed { .. }));

        assert_sorted_by_code(&resolved.rows);
        resolved.rows.iter().for_each(assert_row_closed);

        let totals = resolved.totals();
        assert_totals_match(&resolved.rows, &totals);
        assert_eq!(totals.opening_debit, dec!(1000));
        assert_eq!(totals.opening_credit, dec!(2500));
        assert_eq!(totals.period_debit, dec!(600));
        assert_eq!(totals.period_credit, dec!(1500));
        assert_eq!(totals.closing_debit, dec!(1300));
        assert_eq!(totals.closing_credit, dec!(3700));
    }

    #[tokio::test]
    async fn test_balanced_legacy_books() {
        let cash = IdFixtures::cash_account_id();
        let capital = IdFixtures::capital_account_id();
        let rent = IdFixtures::rent_account_id();
        let sales = IdFixtures::sales_account_id();

        let ledger = TestLedgerBuilder::new()
            .with_fixture_chart()
            .with_account(AccountFixtures::header())
            .with_account(AccountFixtures::inactive())
            .without_modern_schema()
            .with_line(TestLineBuilder::new(cash).debit(dec!(10000)).on(TemporalFixtures::before_window()).legacy())
            .with_line(TestLineBuilder::new(capital).credit(dec!(10000)).on(TemporalFixtures::before_window()).legacy())
            .with_line(TestLineBuilder::new(rent).debit(dec!(1200)).legacy())
            .with_line(TestLineBuilder::new(cash).credit(dec!(1200)).legacy())
            .with_line(TestLineBuilder::new(cash).debit(dec!(800)).posted_on(TemporalFixtures::mid_window()).legacy())
            .with_line(TestLineBuilder::new(sales).credit(dec!(800)).legacy())
            .with_line(TestLineBuilder::new(cash).debit(dec!(99)).on(TemporalFixtures::after_window()).legacy())
            .build()
            .await;

        let resolved = resolver_over(ledger)
            .resolve(&ContextFixtures::tenant(), &TemporalFixtures::report_window())
            .await;

        assert_eq!(resolved.source, Some(BalanceSource::ManualAggregation));
        assert_balanced(&resolved.totals());

        let codes: Vec<&str> = resolved.rows.iter().map(|r| r.account_code.as_str()).collect();
        assert_eq!(codes, vec!["1001", "3001", "4001", "5001"]);

        let cash_row = &resolved.rows[0];
        assert_eq!(cash_row.opening_debit, dec!(10000));
        assert_eq!(cash_row.closing_debit, dec!(9600));
    }

    #[tokio::test]
    async fn test_other_tenant_sees_nothing() {
        let resolver = resolver_over(worked_example_ledger().build().await);

        let resolved = resolver
            .resolve(&ContextFixtures::other_tenant(), &TemporalFixtures::report_window())
            .await;

        assert_eq!(resolved.source, Some(BalanceSource::ManualAggregation));
        assert!(resolved.rows.is_empty());
    }
}

// ============================================================================
// Presentation Workflow
// ============================================================================

mod presentation_workflow_tests {
    use super::*;

    #[tokio::test]
    async fn test_filtered_report_exports_in_both_languages() {
        let resolved = resolver_over(worked_example_ledger().build().await)
            .resolve(&ContextFixtures::tenant(), &TemporalFixtures::report_window())
            .await;

        let assets = filter_by_type(&resolved.rows, AccountTypeFilter::Only(AccountType::Asset));
        let shown = search_rows(&assets, "النقدية");
        assert_eq!(shown.len(), 1);

        let document = ReportDocument::new(resolved.window, &shown);
        assert_eq!(document.totals.closing_debit, dec!(1300));

        let exporter = ReportExporter::new();
        for language in Language::ALL {
            let xlsx = exporter.export(&document, ExportFormat::Xlsx, language).unwrap();
            assert_eq!(&xlsx.bytes[..2], b"PK");
            assert_eq!(xlsx.language, language);
        }

        let pdf = exporter.export(&document, ExportFormat::Pdf, Language::English).unwrap();
        assert!(pdf.bytes.starts_with(b"%PDF"));
        assert_eq!(pdf.file_name, "trial-balance-2024-06-30.pdf");
    }

    #[tokio::test]
    async fn test_precomputed_rows_are_exported_as_returned() {
        let rows = vec![
            TestRowBuilder::for_account(&AccountFixtures::cash()).build_with_closing(dec!(10), dec!(0)),
            TestRowBuilder::for_account(&AccountFixtures::sales()).build_with_closing(dec!(0), dec!(7)),
        ];
        let resolver = TrialBalanceResolver::standard(
            Arc::new(MockBalanceService::returning(rows.clone())),
            Arc::new(MockTrialBalanceRpc::failing("unused")),
            Arc::new(MockLedgerQuery::new()),
            &ResolverConfig::default(),
        );

        let resolved = resolver
            .resolve(&ContextFixtures::tenant(), &TemporalFixtures::report_window())
            .await;

        assert_eq!(resolved.source, Some(BalanceSource::PrecomputedService));
        assert_eq!(resolved.rows, rows);
        assert!(!resolved.totals().is_balanced());

        let document = ReportDocument::new(resolved.window, &resolved.rows);
        assert!(ReportExporter::new()
            .export(&document, ExportFormat::Xlsx, Language::Arabic)
            .is_ok());
    }
}

// ============================================================================
// Property Tests
// ============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(16))]

    #[test]
    fn prop_any_rows_export_to_both_formats(rows in rows_strategy(40), window in window_strategy()) {
        let document = ReportDocument::new(window, &rows);
        let exporter = ReportExporter::new();

        let xlsx = exporter.export(&document, ExportFormat::Xlsx, Language::English).unwrap();
        let pdf = exporter.export(&document, ExportFormat::Pdf, Language::Arabic).unwrap();

        prop_assert_eq!(&xlsx.bytes[..2], b"PK");
        prop_assert!(pdf.bytes.starts_with(b"%PDF"));
    }
}
