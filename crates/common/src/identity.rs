use serde::{Deserialize, Serialize};
use std::borrow::Cow;

/// File token used when the employee number is empty
pub const FALLBACK_FILE_TOKEN: &str = "badge";

/// Identity fields printed on a badge
///
/// All fields are opaque text and may be empty. Missing fields in a JSON
/// payload deserialize as empty strings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct IdentityRecord {
    /// Full name, printed as the badge headline
    pub name: String,

    /// Employee number, printed as `#<number>` and used in the artifact name
    pub employee_number: String,

    /// Job title
    pub title: String,

    /// Phone number (QR only)
    pub phone: String,

    /// Email address (QR only)
    pub email: String,
}

impl IdentityRecord {
    /// Build the vCard text embedded in the badge QR code
    ///
    /// Every line is always present; empty fields produce empty values.
    pub fn vcard(&self, organization: &str) -> String {
        format!(
            "BEGIN:VCARD\n\
             VERSION:3.0\n\
             N:{}\n\
             TEL:{}\n\
             EMAIL:{}\n\
             ORG:{}\n\
             TITLE:{}\n\
             END:VCARD",
            self.name, self.phone, self.email, organization, self.title
        )
    }

    /// Label printed under the title
    pub fn employee_label(&self) -> String {
        format!("#{}", self.employee_number)
    }

    /// Filename-safe token derived from the employee number
    ///
    /// Bytes outside `[A-Za-z0-9._-]` are percent-encoded, so distinct
    /// employee numbers always map to distinct tokens and no token can
    /// contain a path separator.
    pub fn file_token(&self) -> Cow<'_, str> {
        if self.employee_number.is_empty() {
            return Cow::Borrowed(FALLBACK_FILE_TOKEN);
        }

        if self.employee_number.bytes().all(is_token_byte) {
            return Cow::Borrowed(&self.employee_number);
        }

        let mut token = String::with_capacity(self.employee_number.len() * 3);
        for byte in self.employee_number.bytes() {
            if is_token_byte(byte) {
                token.push(byte as char);
            } else {
                token.push_str(&format!("%{:02X}", byte));
            }
        }
        Cow::Owned(token)
    }

    /// Name of the PNG artifact written for this identity
    pub fn artifact_file_name(&self) -> String {
        format!("{}_badge.png", self.file_token())
    }
}

fn is_token_byte(byte: u8) -> bool {
    byte.is_ascii_alphanumeric() || matches!(byte, b'-' | b'_' | b'.')
}
