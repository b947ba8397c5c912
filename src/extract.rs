// src/extract.rs

use std::time::Duration;

use tracing::{debug, warn};

use crate::driver::{Element, ErrorKind, Session};
use crate::record::{CaseRecord, Field};

/// Bounded wait for any single declared field.
pub const FIELD_WAIT: Duration = Duration::from_secs(5);

/// Declarative binding of one page element to one record slot. A slice of
/// these is the whole statement of what a page yields.
#[derive(Debug, Clone, Copy)]
pub struct FieldLocator {
    pub selector: &'static str,
    pub field: Field,
    pub label: &'static str,
}

impl FieldLocator {
    pub const fn new(selector: &'static str, field: Field, label: &'static str) -> Self {
        Self {
            selector,
            field,
            label,
        }
    }
}

/// Resolve every locator independently against the current page. A timeout
/// writes the empty-string sentinel; any other failure is logged and the
/// remaining locators still run. Afterwards every declared slot is `Some(_)`.
pub async fn extract_fields<S: Session>(
    session: &S,
    locators: &[FieldLocator],
    record: &mut CaseRecord,
) {
    for locator in locators {
        let value = match session.find_one(locator.selector, FIELD_WAIT).await {
            Ok(mut element) => match element.text().await {
                Ok(text) => {
                    let text = text.trim().to_string();
                    debug!(field = locator.label, value = %text, "extracted");
                    text
                }
                Err(err) => {
                    warn!(field = locator.label, %err, "could not read element text");
                    String::new()
                }
            },
            Err(err) if err.kind() == ErrorKind::Timeout => {
                debug!(field = locator.label, "not present on page");
                String::new()
            }
            Err(err) => {
                warn!(field = locator.label, %err, "could not locate element");
                String::new()
            }
        };
        *locator.field.slot(record) = Some(value);
    }
}
