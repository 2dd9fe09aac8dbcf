//! Command implementations.

use std::fs;
use std::path::Path;
use std::process::ExitCode;
use std::sync::Arc;

use anyhow::Context;
use chrono::NaiveDate;
use ledgerdesk_client::{EntryQuery, HttpJournalApi, JournalEditor, LedgerReports, list_cached};
use ledgerdesk_core::cache::QueryCache;
use ledgerdesk_core::journal::{EntryStatus, JournalEntryForm, field_messages};
use ledgerdesk_core::reports::ReportPeriod;
use ledgerdesk_shared::AppConfig;
use ledgerdesk_shared::types::{AccountId, JournalEntryId, PageRequest};
use tracing::info;
use validator::Validate;

use crate::Command;

/// Loads an entry in request format and reports its totals and problems.
///
/// Exits with failure when the entry could not be posted as it stands.
pub fn check(path: &Path) -> anyhow::Result<ExitCode> {
    let raw = fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    let form: JournalEntryForm = serde_json::from_str(&raw)
        .with_context(|| format!("{} is not a journal entry", path.display()))?;

    let mut problems = match form.validate() {
        Ok(()) => Vec::new(),
        Err(errors) => field_messages(&errors),
    };
    let totals = form.totals();
    if let Err(e) = totals.ensure_balanced() {
        problems.push(("balance".to_string(), e.to_string()));
    }

    println!("Reference:   {}", form.reference);
    println!("Date:        {}", form.entry_date);
    println!("Lines:       {}", form.lines.len());
    println!("Debit:       {}", totals.total_debit);
    println!("Credit:      {}", totals.total_credit);
    println!("Difference:  {}", totals.difference());
    println!(
        "Status:      {}",
        if totals.is_balanced { "balanced" } else { "NOT balanced" }
    );

    if problems.is_empty() {
        println!("Ready to post.");
        return Ok(ExitCode::SUCCESS);
    }

    println!();
    for (field, message) in &problems {
        println!("  {field}: {message}");
    }
    Ok(ExitCode::FAILURE)
}

/// Connection to the configured backend.
pub struct Backend {
    api: Arc<HttpJournalApi>,
    cache: QueryCache,
}

impl Backend {
    /// Builds the HTTP client and query cache from configuration.
    pub fn connect(config: &AppConfig) -> anyhow::Result<Self> {
        let api = HttpJournalApi::new(&config.api)?;
        info!(base_url = %api.base_url(), tenant_id = config.api.tenant_id, "Using backend");
        Ok(Self {
            api: Arc::new(api),
            cache: QueryCache::with_config(config.cache.max_capacity, config.cache.ttl_secs),
        })
    }

    /// Runs a command that needs the backend.
    pub async fn run(self, command: Command) -> anyhow::Result<ExitCode> {
        match command {
            Command::Check { file } => return check(&file),
            Command::List {
                page,
                per_page,
                status,
                search,
            } => self.list(PageRequest::new(page, per_page), status, search).await?,
            Command::Post { id, actor } => self.post(id, &actor).await?,
            Command::ForceDraft { id, actor, reason } => {
                self.force_to_draft(id, &actor, &reason).await?;
            }
            Command::Ledger {
                account_id,
                from,
                to,
            } => self.ledger(account_id, ReportPeriod::new(from, to)?).await?,
            Command::TrialBalance { as_of } => return self.trial_balance(as_of).await,
        }
        Ok(ExitCode::SUCCESS)
    }

    async fn list(
        &self,
        page: PageRequest,
        status: Option<EntryStatus>,
        search: Option<String>,
    ) -> anyhow::Result<()> {
        let query = EntryQuery {
            status,
            search,
            ..EntryQuery::default()
        }
        .with_page(page);
        let result = list_cached(self.api.as_ref(), &self.cache, &query).await?;

        println!(
            "{:>6}  {:<10}  {:<12}  {:<6}  {:>14}  Description",
            "Id", "Date", "Reference", "Status", "Amount"
        );
        for entry in &result.data {
            let id = entry.id().map(|id| id.to_string()).unwrap_or_default();
            println!(
                "{:>6}  {:<10}  {:<12}  {:<6}  {:>14}  {}",
                id,
                entry.entry_date().to_string(),
                entry.reference(),
                entry.status().as_str(),
                entry.balance().total_debit.to_string(),
                entry.description()
            );
        }
        println!(
            "Page {} of {} ({} entries)",
            result.meta.page, result.meta.total_pages, result.meta.total
        );
        Ok(())
    }

    async fn post(&self, id: JournalEntryId, actor: &str) -> anyhow::Result<()> {
        let mut editor =
            JournalEditor::open(Arc::clone(&self.api), self.cache.clone(), actor, id).await?;
        editor.post().await?;
        println!(
            "Posted {} ({})",
            editor.entry().reference(),
            editor.balance().total_debit
        );
        Ok(())
    }

    async fn force_to_draft(
        &self,
        id: JournalEntryId,
        actor: &str,
        reason: &str,
    ) -> anyhow::Result<()> {
        let mut editor =
            JournalEditor::open(Arc::clone(&self.api), self.cache.clone(), actor, id).await?;
        editor.force_to_draft(reason).await?;
        println!("Returned {} to draft", editor.entry().reference());
        Ok(())
    }

    async fn ledger(&self, account_id: AccountId, period: ReportPeriod) -> anyhow::Result<()> {
        let reports = LedgerReports::new(Arc::clone(&self.api), self.cache.clone());
        let ledger = reports.general_ledger(account_id, period).await?;

        println!(
            "{} {} ({})",
            ledger.account_code, ledger.account_name, ledger.account_type
        );
        println!("{:<10}  {:<12}  {:>14}", "", "Opening", ledger.opening_balance.to_string());
        for line in &ledger.lines {
            println!(
                "{:<10}  {:<12}  {:>14}  {:>14}  {:>14}  {}",
                line.entry_date.to_string(),
                line.reference,
                line.debit.to_string(),
                line.credit.to_string(),
                line.running_balance.to_string(),
                line.description
            );
        }
        println!(
            "{:<10}  {:<12}  {:>14}  {:>14}  {:>14}",
            "",
            "Closing",
            ledger.total_debit.to_string(),
            ledger.total_credit.to_string(),
            ledger.closing_balance.to_string()
        );
        Ok(())
    }

    async fn trial_balance(&self, as_of: Option<NaiveDate>) -> anyhow::Result<ExitCode> {
        let reports = LedgerReports::new(Arc::clone(&self.api), self.cache.clone());
        let report = reports.trial_balance(as_of).await?;

        for row in &report.rows {
            println!(
                "{:<8}  {:<30}  {:>14}  {:>14}",
                row.account_code,
                row.account_name,
                row.debit_balance.to_string(),
                row.credit_balance.to_string()
            );
        }
        println!(
            "{:<8}  {:<30}  {:>14}  {:>14}",
            "",
            "Total",
            report.totals.total_debit.to_string(),
            report.totals.total_credit.to_string()
        );

        if report.totals.is_balanced {
            Ok(ExitCode::SUCCESS)
        } else {
            println!("Trial balance does NOT agree");
            Ok(ExitCode::FAILURE)
        }
    }
}
