// SPDX-FileCopyrightText: 2026 Formfact Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Pattern-based structured extraction from prose.
//!
//! The broad fallback stage lands on freeform content (essay chunks,
//! experience blurbs). Before answering a structured field from prose, the
//! cascade tries to pull a well-formed value out of it; high-stakes fields
//! refuse the prose when extraction fails.

use std::sync::LazyLock;

use regex::Regex;

use crate::cascade::FieldKind;
use crate::obvious::FieldClass;

static EMAIL_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"[A-Za-z0-9._%+-]+@[A-Za-z0-9.-]+\.[A-Za-z]{2,}").expect("valid email regex")
});

static PHONE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?:\+?1[-.\s]?)?\(?\d{3}\)?[-.\s]?\d{3}[-.\s]?\d{4}").expect("valid phone regex")
});

static GPA_RE: LazyLock<Regex> = LazyLock::new(|| {
    // 0.00-4.99 with one or two decimals; GPAs are quoted like "3.8" or "3.85".
    Regex::new(r"\b[0-4]\.\d{1,2}\b").expect("valid GPA regex")
});

/// Which structured pattern a field calls for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExtractionPattern {
    Email,
    Phone,
    Gpa,
}

/// Pick the extraction pattern for a field.
///
/// The label's class decides; the integrator-reported control kind breaks
/// ties for classes with no inherent pattern (an email-typed control under
/// a generic label still wants an email).
pub fn pattern_for(class: FieldClass, kind: FieldKind) -> Option<ExtractionPattern> {
    match class {
        FieldClass::Email => Some(ExtractionPattern::Email),
        FieldClass::Phone => Some(ExtractionPattern::Phone),
        FieldClass::Gpa => Some(ExtractionPattern::Gpa),
        _ => match kind {
            FieldKind::Email => Some(ExtractionPattern::Email),
            FieldKind::Phone => Some(ExtractionPattern::Phone),
            _ => None,
        },
    }
}

/// Extract the first match of `pattern` from `text`, trimmed.
pub fn extract(pattern: ExtractionPattern, text: &str) -> Option<String> {
    let regex = match pattern {
        ExtractionPattern::Email => &*EMAIL_RE,
        ExtractionPattern::Phone => &*PHONE_RE,
        ExtractionPattern::Gpa => &*GPA_RE,
    };
    regex.find(text).map(|m| m.as_str().trim().to_string())
}
