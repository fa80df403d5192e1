//! Bilingual report labels
//!
//! Labels are kept in embedded Fluent resources, one per language. A
//! [`Labels`] value is formatted once per export and holds plain strings, so
//! writers never touch the Fluent bundle.

use fluent::{FluentArgs, FluentBundle, FluentResource};
use fluent_langneg::{accepted_languages, negotiate_languages, NegotiationStrategy};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use unic_langid::LanguageIdentifier;

use core_kernel::ReportWindow;
use domain_ledger::AccountType;

use crate::error::ExportError;

const EN_FTL: &str = include_str!("../locales/en.ftl");
const AR_FTL: &str = include_str!("../locales/ar.ftl");

/// Report language
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Language {
    #[default]
    #[serde(rename = "en")]
    English,
    #[serde(rename = "ar")]
    Arabic,
}

impl Language {
    pub const ALL: [Language; 2] = [Language::English, Language::Arabic];

    /// BCP 47 primary language subtag
    pub fn code(&self) -> &'static str {
        match self {
            Language::English => "en",
            Language::Arabic => "ar",
        }
    }

    pub fn is_rtl(&self) -> bool {
        matches!(self, Language::Arabic)
    }

    fn resource(&self) -> &'static str {
        match self {
            Language::English => EN_FTL,
            Language::Arabic => AR_FTL,
        }
    }

    fn identifier(&self) -> Result<LanguageIdentifier, ExportError> {
        self.code()
            .parse()
            .map_err(|e| ExportError::localization(format!("{}: {e}", self.code())))
    }

    /// Picks the best supported language for an `Accept-Language` header
    ///
    /// Anything unsupported or unparseable resolves to English.
    pub fn negotiate(accept_language: &str) -> Language {
        let requested = accepted_languages::parse(accept_language);
        let available: Vec<LanguageIdentifier> = Language::ALL
            .iter()
            .filter_map(|language| language.identifier().ok())
            .collect();
        let Some(default) = available.first() else {
            return Language::English;
        };

        negotiate_languages(&requested, &available, Some(default), NegotiationStrategy::Filtering)
            .first()
            .and_then(|chosen| {
                Language::ALL
                    .into_iter()
                    .find(|language| chosen.language.as_str() == language.code())
            })
            .unwrap_or_default()
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for Language {
    type Err = ExportError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let primary = s.trim().split(['-', '_']).next().unwrap_or_default();
        Language::ALL
            .into_iter()
            .find(|language| language.code().eq_ignore_ascii_case(primary))
            .ok_or_else(|| ExportError::unsupported("language", s))
    }
}

/// Localized strings for one report
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Labels {
    pub language: Language,
    pub title: String,
    pub sheet_name: String,
    /// Subheader naming the report window
    pub period: String,
    /// Column headers in table order
    pub columns: [String; 9],
    pub totals: String,
    /// Message shown when no source could produce the report
    pub load_failure: String,
    account_types: [String; 5],
}

impl Labels {
    /// Formats every label for a language and report window
    ///
    /// # Errors
    ///
    /// Returns `ExportError::Localization` if a resource fails to parse or a
    /// message is missing
    pub fn load(language: Language, window: &ReportWindow) -> Result<Self, ExportError> {
        let bundle = bundle_for(language)?;

        let mut period_args = FluentArgs::new();
        period_args.set("from", window.from_date().to_string());
        period_args.set("as_of", window.as_of_date().to_string());

        let text = |id: &str| format_message(&bundle, id, None);

        Ok(Self {
            language,
            title: text("report-title")?,
            sheet_name: text("sheet-name")?,
            period: format_message(&bundle, "report-period", Some(&period_args))?,
            columns: [
                text("column-code")?,
                text("column-name")?,
                text("column-type")?,
                text("column-opening-debit")?,
                text("column-opening-credit")?,
                text("column-period-debit")?,
                text("column-period-credit")?,
                text("column-closing-debit")?,
                text("column-closing-credit")?,
            ],
            totals: text("totals")?,
            load_failure: text("notice-manual-aggregation-failed")?,
            account_types: [
                text("account-type-asset")?,
                text("account-type-liability")?,
                text("account-type-equity")?,
                text("account-type-revenue")?,
                text("account-type-expense")?,
            ],
        })
    }

    /// Localized name of an account type
    pub fn account_type(&self, account_type: AccountType) -> &str {
        let slot = match account_type {
            AccountType::Asset => 0,
            AccountType::Liability => 1,
            AccountType::Equity => 2,
            AccountType::Revenue => 3,
            AccountType::Expense => 4,
        };
        &self.account_types[slot]
    }
}

fn bundle_for(language: Language) -> Result<FluentBundle<FluentResource>, ExportError> {
    let resource = FluentResource::try_new(language.resource().to_string()).map_err(|(_, errors)| {
        ExportError::localization(format!("{language} resource: {errors:?}"))
    })?;

    let mut bundle = FluentBundle::new(vec![language.identifier()?]);
    // Directional isolation marks would end up verbatim in cells
    bundle.set_use_isolating(false);
    bundle
        .add_resource(resource)
        .map_err(|errors| ExportError::localization(format!("{language} bundle: {errors:?}")))?;

    Ok(bundle)
}

fn format_message(
    bundle: &FluentBundle<FluentResource>,
    id: &str,
    args: Option<&FluentArgs>,
) -> Result<String, ExportError> {
    let pattern = bundle
        .get_message(id)
        .and_then(|message| message.value())
        .ok_or_else(|| ExportError::localization(format!("missing message {id}")))?;

    let mut errors = Vec::new();
    let value = bundle.format_pattern(pattern, args, &mut errors);
    if !errors.is_empty() {
        return Err(ExportError::localization(format!("{id}: {errors:?}")));
    }
    Ok(value.into_owned())
}
