// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Supported interface languages.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
#[cfg(feature = "binding-generation")]
use ts_rs::TS;

/// A language the interface can render in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub enum Language {
    #[default]
    En,
    Es,
}

impl Language {
    pub const SUPPORTED: [Language; 2] = [Language::En, Language::Es];

    /// Two-letter code as stored in every preference location.
    pub fn code(self) -> &'static str {
        match self {
            Language::En => "en",
            Language::Es => "es",
        }
    }

    /// Parse a stored code, returning `None` for anything outside the supported set.
    pub fn parse(raw: &str) -> Option<Self> {
        let raw = raw.trim();
        Self::SUPPORTED
            .into_iter()
            .find(|lang| lang.code().eq_ignore_ascii_case(raw))
    }

    /// Match a platform locale such as `es-MX` or `en_US` by its primary subtag.
    pub fn from_locale(locale: &str) -> Option<Self> {
        let primary = locale.trim().split(['-', '_']).next()?;
        Self::parse(primary)
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

#[derive(Debug, thiserror::Error)]
#[error("Unsupported language: {0}")]
pub struct UnsupportedLanguage(pub String);

impl FromStr for Language {
    type Err = UnsupportedLanguage;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s).ok_or_else(|| UnsupportedLanguage(s.to_string()))
    }
}
