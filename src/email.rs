//! Collects email addresses from the command line, files and stdin into one
//! ordered, duplicate-free set.

use email_address::EmailAddress as EmailSyntax;
use lazy_static::lazy_static;
use regex::Regex;
use std::collections::HashSet;
use std::io::Read;
use std::path::Path;
use tracing::warn;

use crate::error::{AppError, AppResult};
use crate::models::EmailAddress;

/// Extensions accepted for `--emails-file`
pub const ALLOWED_FILE_EXTENSIONS: &[&str] = &["txt", "csv"];

lazy_static! {
    static ref SEPARATORS: Regex = Regex::new(r"[,;\s]+").unwrap();
}

#[derive(Debug, Clone, Default)]
pub struct EmailSet {
    addresses: Vec<EmailAddress>,
}

impl EmailSet {
    /// Split, trim and deduplicate raw inputs, keeping first-seen order across
    /// all sources. Lines may hold several addresses separated by commas,
    /// semicolons or whitespace; `#` starts a comment.
    pub fn from_sources<I, S>(sources: I) -> AppResult<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut seen = HashSet::new();
        let mut addresses = Vec::new();

        for source in sources {
            for line in source.as_ref().lines() {
                let content = match line.find('#') {
                    Some(pos) => &line[..pos],
                    None => line,
                };

                for token in SEPARATORS.split(content) {
                    let Some(email) = EmailAddress::parse(token) else {
                        continue;
                    };
                    if seen.insert(email.clone()) {
                        if !EmailSyntax::is_valid(email.as_str()) {
                            warn!("'{}' does not look like an email address", email);
                        }
                        addresses.push(email);
                    }
                }
            }
        }

        if addresses.is_empty() {
            return Err(AppError::Input(
                "no email addresses provided after filtering comments and blanks".to_string(),
            ));
        }

        Ok(EmailSet { addresses })
    }

    pub fn iter(&self) -> impl Iterator<Item = &EmailAddress> {
        self.addresses.iter()
    }

    pub fn len(&self) -> usize {
        self.addresses.len()
    }

    pub fn is_empty(&self) -> bool {
        self.addresses.is_empty()
    }
}

impl<'a> IntoIterator for &'a EmailSet {
    type Item = &'a EmailAddress;
    type IntoIter = std::slice::Iter<'a, EmailAddress>;

    fn into_iter(self) -> Self::IntoIter {
        self.addresses.iter()
    }
}

/// Read an email list file. Only `.txt` and `.csv` files holding UTF-8 text
/// are accepted.
pub fn read_email_file<P: AsRef<Path>>(path: P) -> AppResult<String> {
    let path = path.as_ref();

    let extension = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase());
    match extension {
        Some(ext) if ALLOWED_FILE_EXTENSIONS.contains(&ext.as_str()) => {}
        _ => {
            return Err(AppError::Input(format!(
                "emails file {} must have one of the extensions: {}",
                path.display(),
                ALLOWED_FILE_EXTENSIONS.join(", ")
            )));
        }
    }

    let bytes = std::fs::read(path).map_err(|e| {
        AppError::Input(format!("failed to read emails file {}: {}", path.display(), e))
    })?;

    String::from_utf8(bytes)
        .map_err(|_| AppError::Input(format!("emails file {} is not valid UTF-8", path.display())))
}

/// Read every address piped on standard input
pub fn read_stdin() -> AppResult<String> {
    let mut buffer = String::new();
    std::io::stdin()
        .read_to_string(&mut buffer)
        .map_err(|e| AppError::Input(format!("failed to read standard input: {}", e)))?;
    Ok(buffer)
}
