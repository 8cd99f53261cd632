// SPDX-FileCopyrightText: 2026 Formfact Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The obvious-field dictionary gating the resolution cascade.
//!
//! Only labels matching these common personal-data patterns enter the
//! cascade at all; everything else is left to generative assistance.
//! Matching is substring containment over normalized keys, so
//! "Email Address *" and "Your email" both land on the email class.

use serde::{Deserialize, Serialize};

/// Classification of an obvious personal-data field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FieldClass {
    FirstName,
    LastName,
    FullName,
    Email,
    Phone,
    Gpa,
    Major,
    School,
    GraduationYear,
    DateOfBirth,
    Address,
    City,
    State,
    Zip,
    Country,
    Gender,
    Citizenship,
}

impl FieldClass {
    /// High-stakes classes where a wrong raw-prose answer is worse than
    /// no answer. The broad fallback refuses unstructured text for these.
    pub fn high_stakes(&self) -> bool {
        matches!(
            self,
            FieldClass::FirstName
                | FieldClass::LastName
                | FieldClass::FullName
                | FieldClass::Email
                | FieldClass::Phone
                | FieldClass::Gpa
        )
    }

    /// Canonical group key for entries answering this class.
    pub fn canonical_key(&self) -> &'static str {
        match self {
            FieldClass::FirstName => "first_name",
            FieldClass::LastName => "last_name",
            FieldClass::FullName => "full_name",
            FieldClass::Email => "email",
            FieldClass::Phone => "phone",
            FieldClass::Gpa => "gpa",
            FieldClass::Major => "major",
            FieldClass::School => "school",
            FieldClass::GraduationYear => "graduation_year",
            FieldClass::DateOfBirth => "date_of_birth",
            FieldClass::Address => "address",
            FieldClass::City => "city",
            FieldClass::State => "state",
            FieldClass::Zip => "zip",
            FieldClass::Country => "country",
            FieldClass::Gender => "gender",
            FieldClass::Citizenship => "citizenship",
        }
    }
}

/// Dictionary of normalized-key patterns per class.
///
/// More specific patterns come first: "firstname" must win before the
/// bare "name" patterns of the full-name class.
const DICTIONARY: &[(FieldClass, &[&str])] = &[
    (FieldClass::FirstName, &["firstname", "givenname"]),
    (FieldClass::LastName, &["lastname", "surname", "familyname"]),
    (FieldClass::Email, &["email", "emailaddress"]),
    (FieldClass::Phone, &["phone", "phonenumber", "mobile", "cellphone"]),
    (FieldClass::Gpa, &["gpa", "gradepointaverage"]),
    (FieldClass::Major, &["major", "fieldofstudy", "areaofstudy"]),
    (
        FieldClass::School,
        &["school", "university", "college", "institution", "highschool"],
    ),
    (
        FieldClass::GraduationYear,
        &["graduationyear", "gradyear", "graduationdate", "expectedgraduation"],
    ),
    (FieldClass::DateOfBirth, &["dateofbirth", "birthdate", "dob"]),
    (FieldClass::Address, &["address", "streetaddress", "mailingaddress"]),
    (FieldClass::City, &["city"]),
    (FieldClass::State, &["state", "province"]),
    (FieldClass::Zip, &["zip", "zipcode", "postalcode"]),
    (FieldClass::Country, &["country", "nationality"]),
    (FieldClass::Gender, &["gender", "sex"]),
    (FieldClass::Citizenship, &["citizenship", "citizen"]),
    (FieldClass::FullName, &["fullname", "name", "yourname"]),
];

/// Match a normalized label key against the obvious-field dictionary.
///
/// Returns the first class owning a pattern contained in the key. Bare
/// substring containment over-matches on rare labels ("statement" contains
/// "state"); that is the accepted trade-off of approximate normalization.
pub fn match_obvious(label_key: &str) -> Option<FieldClass> {
    if label_key.is_empty() {
        return None;
    }
    for (class, patterns) in DICTIONARY {
        for pattern in *patterns {
            if label_key.contains(pattern) {
                return Some(*class);
            }
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::normalize::normalize_key;

    #[test]
    fn common_labels_match_expected_classes() {
        assert_eq!(match_obvious(&normalize_key("Email Address")), Some(FieldClass::Email));
        assert_eq!(match_obvious(&normalize_key("GPA")), Some(FieldClass::Gpa));
        assert_eq!(match_obvious(&normalize_key("First Name")), Some(FieldClass::FirstName));
        assert_eq!(match_obvious(&normalize_key("Phone Number")), Some(FieldClass::Phone));
        assert_eq!(match_obvious(&normalize_key("Zip Code")), Some(FieldClass::Zip));
        assert_eq!(
            match_obvious(&normalize_key("Expected Graduation")),
            Some(FieldClass::GraduationYear)
        );
    }

    #[test]
    fn suffixed_labels_still_match() {
        assert_eq!(
            match_obvious(&normalize_key("Major - please select from the list")),
            Some(FieldClass::Major)
        );
    }

    #[test]
    fn first_name_wins_over_bare_name() {
        assert_eq!(match_obvious("firstname"), Some(FieldClass::FirstName));
        assert_eq!(match_obvious("yourname"), Some(FieldClass::FullName));
    }

    #[test]
    fn non_obvious_labels_do_not_match() {
        assert_eq!(match_obvious(&normalize_key("Essay Prompt")), None);
        assert_eq!(match_obvious(&normalize_key("Why do you deserve this?")), None);
        assert_eq!(match_obvious(&normalize_key("Hometown")), None);
        assert_eq!(match_obvious(""), None);
    }

    #[test]
    fn high_stakes_classes() {
        assert!(FieldClass::Email.high_stakes());
        assert!(FieldClass::Gpa.high_stakes());
        assert!(FieldClass::FullName.high_stakes());
        assert!(!FieldClass::Major.high_stakes());
        assert!(!FieldClass::City.high_stakes());
    }

    #[test]
    fn canonical_keys_are_stable() {
        assert_eq!(FieldClass::Email.canonical_key(), "email");
        assert_eq!(FieldClass::GraduationYear.canonical_key(), "graduation_year");
    }
}
