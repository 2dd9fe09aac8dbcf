//! Typed journal entry form.
//!
//! Field rules are declared once on [`JournalEntryForm`] and reused for the
//! create and the update path. The form is also the request body sent to
//! the backend, with line descriptions already resolved.

use chrono::NaiveDate;
use ledgerdesk_shared::types::{AccountId, Amount};
use serde::{Deserialize, Serialize};
use validator::{Validate, ValidationError, ValidationErrors, ValidationErrorsKind};

use super::balance::{BalanceSummary, BalanceValidator};
use super::entry::{EntryType, JournalEntry};
use super::error::JournalError;
use super::line::JournalEntryLine;

/// Maximum reference length.
pub const MAX_REFERENCE_LEN: u64 = 50;

/// Request body for creating or updating a journal entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct JournalEntryForm {
    /// Date of the economic event.
    pub entry_date: NaiveDate,
    /// Human-readable reference, unique per tenant.
    #[validate(length(
        min = 1,
        max = MAX_REFERENCE_LEN,
        message = "Reference is required (max 50 characters)"
    ))]
    pub reference: String,
    /// Category tag.
    pub entry_type: EntryType,
    /// Free-text description.
    #[validate(length(
        min = 1,
        max = 500,
        message = "Description is required (max 500 characters)"
    ))]
    pub description: String,
    /// Lines in display order.
    #[validate(length(min = 2, message = "At least two lines are required"), nested)]
    pub lines: Vec<LineForm>,
}

/// One line of the form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
#[validate(schema(function = "validate_one_side"))]
pub struct LineForm {
    /// Account posted to.
    #[validate(required(message = "Account is required"))]
    pub account_id: Option<AccountId>,
    /// Resolved description.
    #[validate(length(max = 255, message = "Line description is too long"))]
    pub description: String,
    /// Debit amount.
    pub debit_amount: Amount,
    /// Credit amount.
    pub credit_amount: Amount,
}

fn validate_one_side(line: &LineForm) -> Result<(), ValidationError> {
    if !line.debit_amount.is_zero() && !line.credit_amount.is_zero() {
        return Err(ValidationError::new("both_sides")
            .with_message("A line cannot carry both a debit and a credit".into()));
    }
    Ok(())
}

impl LineForm {
    fn to_line(&self) -> JournalEntryLine {
        let mut line = JournalEntryLine::empty();
        line.account_id = self.account_id;
        line.description.clone_from(&self.description);
        line.set_debit(self.debit_amount);
        line.set_credit(self.credit_amount);
        line
    }
}

impl JournalEntryForm {
    /// Builds the form from an entry, inheriting blank line descriptions.
    #[must_use]
    pub fn from_entry(entry: &JournalEntry) -> Self {
        let lines = entry
            .lines()
            .iter()
            .map(|line| LineForm {
                account_id: line.account_id,
                description: line.effective_description(entry.description()).trim().to_string(),
                debit_amount: line.debit_amount(),
                credit_amount: line.credit_amount(),
            })
            .collect();

        Self {
            entry_date: entry.entry_date(),
            reference: entry.reference().trim().to_string(),
            entry_type: entry.entry_type().clone(),
            description: entry.description().trim().to_string(),
            lines,
        }
    }

    /// Drops lines with neither an account nor an amount. The editor keeps
    /// such placeholder rows around; the backend never sees them.
    #[must_use]
    pub fn without_blank_lines(mut self) -> Self {
        self.lines.retain(|l| {
            l.account_id.is_some() || !l.debit_amount.is_zero() || !l.credit_amount.is_zero()
        });
        self
    }

    /// Runs the declared field rules.
    ///
    /// # Errors
    ///
    /// `InvalidForm` listing every failing field.
    pub fn check(&self) -> Result<(), JournalError> {
        self.validate().map_err(|errors| {
            let messages: Vec<String> = field_messages(&errors)
                .into_iter()
                .map(|(field, message)| format!("{field}: {message}"))
                .collect();
            JournalError::InvalidForm(messages.join("; "))
        })
    }

    /// Debit and credit totals of the form's lines.
    #[must_use]
    pub fn totals(&self) -> BalanceSummary {
        let lines: Vec<JournalEntryLine> = self.lines.iter().map(LineForm::to_line).collect();
        BalanceValidator::summarize(&lines)
    }

    /// Materializes a draft entry from the form.
    ///
    /// # Errors
    ///
    /// `InsufficientLines` for fewer than two lines.
    pub fn into_draft(self) -> Result<JournalEntry, JournalError> {
        let lines = self.lines.iter().map(LineForm::to_line).collect();

        JournalEntry::draft_with_lines(
            self.entry_date,
            self.reference,
            self.entry_type,
            self.description,
            lines,
        )
    }
}

/// Flattens validator errors into `(field path, message)` pairs, e.g.
/// `("lines[1].accountId", "Account is required")`, for inline display.
#[must_use]
pub fn field_messages(errors: &ValidationErrors) -> Vec<(String, String)> {
    let mut out = Vec::new();
    collect_messages(errors, "", &mut out);
    out.sort();
    out
}

fn collect_messages(errors: &ValidationErrors, prefix: &str, out: &mut Vec<(String, String)>) {
    for (field, kind) in errors.errors() {
        let name: &str = field.as_ref();
        let path = if name == "__all__" {
            prefix.trim_end_matches('.').to_string()
        } else {
            format!("{prefix}{}", camel_case(name))
        };
        match kind {
            ValidationErrorsKind::Field(list) => {
                for error in list {
                    let message = error
                        .message
                        .as_ref()
                        .map_or_else(|| error.code.to_string(), ToString::to_string);
                    out.push((path.clone(), message));
                }
            }
            ValidationErrorsKind::Struct(inner) => {
                collect_messages(inner, &format!("{path}."), out);
            }
            ValidationErrorsKind::List(items) => {
                for (index, inner) in items {
                    collect_messages(inner, &format!("{path}[{index}]."), out);
                }
            }
        }
    }
}

fn camel_case(field: &str) -> String {
    let mut out = String::with_capacity(field.len());
    let mut upper = false;
    for ch in field.chars() {
        if ch == '_' {
            upper = true;
        } else if upper {
            out.extend(ch.to_uppercase());
            upper = false;
        } else {
            out.push(ch);
        }
    }
    out
}
