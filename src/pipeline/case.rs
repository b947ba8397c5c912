// src/pipeline/case.rs
//
// Per-identifier traversal of the probate search site, from the date-index
// listing through the case detail and fiduciary index pages down to each
// fiduciary/attorney detail page. Navigation failures are fatal for the
// current identifier only; field misses degrade to empty values and the run
// keeps going.

use std::time::Duration;

use tokio::time::sleep;
use tracing::{info, warn};

use crate::driver::{DriverError, Element, ErrorKind, Session};
use crate::extract::{extract_fields, FieldLocator};
use crate::normalize;
use crate::record::{CaseRecord, Field};

const PROBATE_BASE: &str = "https://probatesearch.franklincountyohio.gov/netdata";

/// Case links on the date-index page, limited to full administrations.
const CASE_LIST_ROWS: &str = "//table[@bgcolor='black']//tr[td/font[normalize-space(text()) = 'FULL ADMINISTRATION WITH WILL' or normalize-space(text()) = 'FULL ADMINISTRATION WITHOUT WILL']]/td[1]/a";

/// Fiduciary rows on the index page; the header row carries the highlight
/// color and is excluded.
const FIDUCIARY_ROWS: &str = r##"//table[@bgcolor="black"]/tbody/tr[@bgcolor != "#07528B"]"##;

const LISTING_WAIT: Duration = Duration::from_secs(10);
const FIDUCIARY_WAIT: Duration = Duration::from_secs(10);

pub fn listing_url(date: &str) -> String {
    format!("{PROBATE_BASE}/PBODateInx.ndm/input?string={date}")
}

pub fn case_url(caseno: &str) -> String {
    format!("http://probatesearch.franklincountyohio.gov/netdata/PBCaseTypeE.ndm/ESTATE_DETAIL?caseno={caseno};;")
}

pub fn fiduciary_index_url(caseno: &str) -> String {
    format!("{PROBATE_BASE}/PBFidy.ndm/input?caseno={caseno};;")
}

pub fn fiduciary_url(caseno: &str, index: usize) -> String {
    format!("{PROBATE_BASE}/PBFidDetail.ndm/FID_DETAIL?caseno={caseno};;{index}")
}

pub fn attorney_url(caseno: &str, index: usize) -> String {
    format!("{PROBATE_BASE}/PBAttyDetail.ndm/ATTY_DETAIL?caseno={caseno};;{index}")
}

const CASE_FIELDS: &[FieldLocator] = &[
    FieldLocator::new(
        "//tr[th/font[normalize-space(text()) = 'Case Name']]/td/font",
        Field::CaseName,
        "Case Name",
    ),
    FieldLocator::new(
        "//tr[th/font[normalize-space(text()) = 'Case Subtype']]/td/font",
        Field::CaseSubtype,
        "Case Subtype",
    ),
    FieldLocator::new(
        "//tr[th/font[normalize-space(text()) = 'Decedent Street']]/td/font",
        Field::DecedentAddress,
        "Decedent Address",
    ),
    FieldLocator::new(
        "//tr[th/font[normalize-space(text()) = 'City']]/td/font",
        Field::DecedentCity,
        "Decedent City",
    ),
    FieldLocator::new(
        "//tr[th/font[normalize-space(text()) = 'State']]/td/font",
        Field::DecedentState,
        "Decedent State",
    ),
    FieldLocator::new(
        "//tr[th/font[normalize-space(text()) = 'Zip']]/td/font",
        Field::DecedentZip,
        "Decedent Zip",
    ),
];

const ADMIN_FIELDS: &[FieldLocator] = &[
    FieldLocator::new(
        "//tr[th/font[normalize-space(text()) = 'Estate Fiduciaries Name']]/td/font",
        Field::AdminName,
        "Admin Name",
    ),
    FieldLocator::new(
        "//tr[th/font[normalize-space(text()) = 'Street']]/td/font",
        Field::AdminAddress,
        "Admin Address",
    ),
    FieldLocator::new(
        "//tr[th/font[normalize-space(text()) = 'City']]/td/font",
        Field::AdminCity,
        "Admin City",
    ),
    FieldLocator::new(
        "//tr[th/font[normalize-space(text()) = 'State']]/td/font",
        Field::AdminState,
        "Admin State",
    ),
    FieldLocator::new(
        "//tr[th/font[normalize-space(text()) = 'Zip']]/td/font",
        Field::AdminZip,
        "Admin Zip",
    ),
    FieldLocator::new(
        "//tr[th/font[normalize-space(text()) = 'Phone Number']]/td/font",
        Field::AdminPhone,
        "Admin Phone",
    ),
];

const ATTORNEY_FIELDS: &[FieldLocator] = &[
    FieldLocator::new(
        "//tr[th/font[normalize-space(text()) = 'Attorney Name']]/td/font",
        Field::AttorneyName,
        "Attorney Name",
    ),
    FieldLocator::new(
        "//tr[th/font[normalize-space(text()) = 'Phone Number']]/td/font",
        Field::AttorneyPhone,
        "Attorney Phone",
    ),
    FieldLocator::new(
        "//tr[th/font[normalize-space(text()) = 'E-mail Address']]/td/font",
        Field::AttorneyEmail,
        "Attorney Email",
    ),
];

/// Scrape the case numbers filed on `date` (YYYYMMDD) from the date-index
/// listing. An empty page degrades to an empty set, not an error.
pub async fn discover_cases<S: Session>(
    session: &S,
    date: &str,
) -> Result<Vec<String>, DriverError> {
    let url = listing_url(date);
    session.navigate(&url).await?;

    let rows = match session.find_all(CASE_LIST_ROWS, LISTING_WAIT).await {
        Ok(rows) => rows,
        Err(err) if err.kind() == ErrorKind::Timeout => {
            warn!(%date, "no case rows found on the date index");
            return Ok(Vec::new());
        }
        Err(err) => return Err(err),
    };

    let mut cases = Vec::with_capacity(rows.len());
    for mut row in rows {
        match row.text().await {
            Ok(text) if !text.trim().is_empty() => cases.push(text.trim().to_string()),
            Ok(_) => {}
            Err(err) => warn!(%err, "unreadable case link"),
        }
    }
    info!(date, count = cases.len(), "discovered cases");
    Ok(cases)
}

/// Run the full per-identifier traversal. Never fails: whatever was
/// accumulated by the first unrecoverable navigation error is the result,
/// and `caseno` is always set.
pub async fn process_case<S: Session>(session: &S, caseno: &str) -> CaseRecord {
    let caseno = caseno.trim();
    info!(case = caseno, "processing case");
    let mut record = CaseRecord::new(caseno);

    let detail_url = case_url(caseno);
    record.case_url = Some(detail_url.clone());
    if let Err(err) = session.navigate(&detail_url).await {
        warn!(case = caseno, %err, "case detail unreachable");
        return record;
    }
    // The detail page renders fields lazily after load.
    sleep(Duration::from_secs(1)).await;

    extract_fields(session, CASE_FIELDS, &mut record).await;
    normalize::parse_decedent_name(&mut record);

    let index_url = fiduciary_index_url(caseno);
    if let Err(err) = session.navigate(&index_url).await {
        warn!(case = caseno, %err, "fiduciary index unreachable");
        return record;
    }
    record.view_state_link = Some(index_url);

    let rows = match session.find_all(FIDUCIARY_ROWS, FIDUCIARY_WAIT).await {
        Ok(rows) => rows,
        Err(err) => {
            warn!(case = caseno, %err, "no fiduciary rows");
            return record;
        }
    };

    // Sequential by index; each pass overwrites the admin/attorney slots, so
    // the last fiduciary in the list is the one the output row carries.
    for index in 0..rows.len() {
        if let Err(err) = session.navigate(&fiduciary_url(caseno, index)).await {
            warn!(case = caseno, index, %err, "fiduciary detail unreachable");
            continue;
        }
        extract_fields(session, ADMIN_FIELDS, &mut record).await;
        normalize::parse_admin_name(&mut record);

        if let Err(err) = session.navigate(&attorney_url(caseno, index)).await {
            warn!(case = caseno, index, %err, "attorney detail unreachable");
            continue;
        }
        extract_fields(session, ATTORNEY_FIELDS, &mut record).await;
        normalize::parse_attorney_name(&mut record);
    }

    record
}

/// Process every identifier in order over the one shared session. One
/// identifier's failure never affects another's.
pub async fn process_all_cases<S: Session>(session: &S, cases: &[String]) -> Vec<CaseRecord> {
    let mut records = Vec::with_capacity(cases.len());
    for caseno in cases {
        records.push(process_case(session, caseno).await);
    }
    records
}
