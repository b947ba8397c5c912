// src/pipeline/property.rs
//
// Cross-reference a case's decedent address against the county auditor's
// property search. The whole stage is retried on transient interface
// failures; attribute extraction builds a fresh `PropertyFacts` so a failed
// attempt never leaves partial property state on the record.

use std::time::Duration;

use tokio::time::sleep;
use tracing::{debug, info, warn};

use crate::driver::{DriverError, Element, ErrorKind, Session};
use crate::normalize::{self, ParsedAddress};
use crate::record::CaseRecord;
use crate::retry::RetryPolicy;

pub const PROPERTY_SEARCH_URL: &str =
    "https://property.franklincountyauditor.com/_web/search/commonsearch.aspx?mode=address";

const STREET_NO_INPUT: &str = r#"//input[@id="inpNumber"]"#;
const STREET_NAME_INPUT: &str = r#"//input[@id="inpStreet"]"#;
const SEARCH_BUTTON: &str = r#"//button[@id="btSearch"]"#;
const NO_RECORDS_BANNER: &str =
    r#"//large[contains(text(), "Your search did not find any records")]"#;
const FIRST_RESULT_ROW: &str = r#"(//table[@id="searchResults"]/tbody/tr)[1]"#;
const PARCEL_HEADER: &str = r#"//td[@class="DataletHeaderTopLeft"]"#;
const TRANSFER_DATE_CELL: &str =
    r#"//tr[td[contains(text(), "Transfer Date")]]/td[@class="DataletData"]"#;
const TRANSFER_PRICE_CELL: &str =
    r#"//tr[td[contains(text(), "Transfer Price")]]/td[@class="DataletData"]"#;

const INPUT_WAIT: Duration = Duration::from_secs(60);
const NO_RECORDS_WAIT: Duration = Duration::from_secs(11);
const RESULTS_WAIT: Duration = Duration::from_secs(5);
const FIELD_WAIT: Duration = Duration::from_secs(5);
const SETTLE_AFTER_SEARCH: Duration = Duration::from_secs(3);

/// Whole-stage retry; only interface hiccups are worth another pass.
const PROPERTY_RETRY: RetryPolicy = RetryPolicy::new(
    5,
    Duration::from_secs(1),
    &[ErrorKind::Timeout, ErrorKind::NotInteractable],
);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum DwellingField {
    YearBuilt,
    FinishedArea,
    Beds,
    Baths,
}

/// Positional layout of the auditor's "Dwelling Data" table (v1, observed
/// 2024), mapping each semantic field to its 1-based cell offset. A site
/// relayout means editing this table, nothing else.
const DWELLING_CELLS: &[(DwellingField, usize)] = &[
    (DwellingField::YearBuilt, 7),
    (DwellingField::FinishedArea, 8),
    (DwellingField::Beds, 10),
    (DwellingField::Baths, 11),
];

fn dwelling_cell_xpath(cell: usize) -> String {
    format!(r#"(//table[@id="Dwelling Data"]//td)[{cell}]"#)
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PropertyFacts {
    pub parcel_id: String,
    pub beds: String,
    pub baths: String,
    pub finished_area: String,
    pub year_built: String,
    pub transfer_date: String,
    pub transfer_price: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Lookup {
    NoMatch,
    Match(PropertyFacts),
}

/// Enrich `record` with property attributes for its decedent address.
/// Returns without touching the record when the address is unusable; merges
/// the fixed "N/A" placeholder set when the search finds no records.
pub async fn cross_reference<S: Session>(
    session: &S,
    record: &mut CaseRecord,
) -> Result<(), DriverError> {
    let address = record.decedent_address.clone().unwrap_or_default();
    let parsed = normalize::parse_address(&address);
    if parsed.is_unusable() {
        debug!(case = %record.caseno, "address too sparse for property lookup");
        return Ok(());
    }

    let lookup = PROPERTY_RETRY
        .run("property lookup", || search_once(session, &parsed))
        .await?;

    match lookup {
        Lookup::NoMatch => {
            info!(case = %record.caseno, "no property match");
            record.merge_no_property_match();
        }
        Lookup::Match(facts) => {
            debug!(case = %record.caseno, parcel = %facts.parcel_id, "property matched");
            record.parcel_id = Some(facts.parcel_id);
            record.beds = Some(facts.beds);
            record.baths = Some(facts.baths);
            record.finished_area = Some(facts.finished_area);
            record.year_built = Some(facts.year_built);
            record.transfer_date = Some(facts.transfer_date);
            record.transfer_price = Some(facts.transfer_price);
        }
    }
    Ok(())
}

/// One full search attempt: navigate, fill, submit, classify the result
/// page, and pull attributes off the first match.
async fn search_once<S: Session>(
    session: &S,
    address: &ParsedAddress,
) -> Result<Lookup, DriverError> {
    session.navigate(PROPERTY_SEARCH_URL).await?;

    fill_input(session, STREET_NO_INPUT, &address.street_no, "street number").await;
    fill_input(session, STREET_NAME_INPUT, &address.street_name, "street name").await;

    let mut button = session.find_one(SEARCH_BUTTON, INPUT_WAIT).await?;
    button.click().await?;
    sleep(SETTLE_AFTER_SEARCH).await;

    match session.find_one(NO_RECORDS_BANNER, NO_RECORDS_WAIT).await {
        Ok(_) => return Ok(Lookup::NoMatch),
        Err(err) if err.kind() == ErrorKind::Timeout => {
            debug!("results present, selecting first match")
        }
        Err(err) => return Err(err),
    }

    match session.find_one(FIRST_RESULT_ROW, RESULTS_WAIT).await {
        Ok(mut row) => row.click().await?,
        Err(err) => warn!(%err, "results table never appeared"),
    }

    let mut facts = PropertyFacts::default();
    // Header reads "Parcel ID: NNN-NNNNNN"; keep the part after the colon.
    let header = grab(session, PARCEL_HEADER, "parcel id").await;
    facts.parcel_id = header
        .split_once(':')
        .map(|(_, id)| id.trim().to_string())
        .unwrap_or_default();

    for (field, cell) in DWELLING_CELLS {
        let value = grab(session, &dwelling_cell_xpath(*cell), "dwelling cell").await;
        match field {
            DwellingField::YearBuilt => facts.year_built = value,
            DwellingField::FinishedArea => facts.finished_area = value,
            DwellingField::Beds => facts.beds = value,
            DwellingField::Baths => facts.baths = value,
        }
    }

    facts.transfer_date = grab(session, TRANSFER_DATE_CELL, "transfer date").await;
    facts.transfer_price = grab(session, TRANSFER_PRICE_CELL, "transfer price").await;

    Ok(Lookup::Match(facts))
}

async fn fill_input<S: Session>(session: &S, selector: &str, value: &str, what: &str) {
    match session.find_one(selector, INPUT_WAIT).await {
        Ok(mut input) => match input.send_keys(value).await {
            Ok(()) => debug!(field = what, %value, "filled search input"),
            Err(err) => warn!(field = what, %err, "could not type into search input"),
        },
        Err(err) => warn!(field = what, %err, "search input not found"),
    }
}

/// Timeout-tolerant single-element read: empty string plus a log line on a
/// miss, mirroring the field-extractor semantics.
async fn grab<S: Session>(session: &S, selector: &str, what: &str) -> String {
    match session.find_one(selector, FIELD_WAIT).await {
        Ok(mut element) => match element.text().await {
            Ok(text) => text.trim().to_string(),
            Err(err) => {
                warn!(field = what, %err, "could not read element text");
                String::new()
            }
        },
        Err(err) => {
            debug!(field = what, %err, "not found");
            String::new()
        }
    }
}
