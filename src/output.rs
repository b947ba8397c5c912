// src/output.rs
//
// Projection of the accumulator onto the fixed output schema, CSV writing,
// and one-generation snapshot rotation. The header spellings (including
// "decendent") are the consumer's contract; do not correct them.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use serde::Serialize;
use tracing::info;

use crate::record::CaseRecord;

/// Filename the previous output generation is rotated to.
pub const PREVIOUS_SNAPSHOT: &str = "Previous_data.csv";

/// Output columns in contract order; used when a run produced no rows and
/// the header still has to be written.
const COLUMNS: [&str; 31] = [
    "case_num",
    "parcel number",
    "decendent_first_name",
    "decendent_middle_name",
    "decendent_last_name",
    "sub_type",
    "case_link",
    "d_property_address",
    "d_property_city",
    "d_property_state",
    "d_property_zip",
    "view_state_link",
    "admin_first_name",
    "admin_middle_name",
    "admin_last_name",
    "admin_address",
    "admin_city",
    "admin_state",
    "admin_zip",
    "admin_phone",
    "att_first_name",
    "att_middle_name",
    "att_last_name",
    "att_phone",
    "att_email",
    "beds",
    "bathrooms",
    "Tot Fin Area",
    "Yr Built",
    "transfer date",
    "transfer price",
];

/// One output row. Field order is column order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct OutputRow {
    pub case_num: String,
    #[serde(rename = "parcel number")]
    pub parcel_number: String,
    pub decendent_first_name: String,
    pub decendent_middle_name: String,
    pub decendent_last_name: String,
    pub sub_type: String,
    pub case_link: String,
    pub d_property_address: String,
    pub d_property_city: String,
    pub d_property_state: String,
    pub d_property_zip: String,
    pub view_state_link: String,
    pub admin_first_name: String,
    pub admin_middle_name: String,
    pub admin_last_name: String,
    pub admin_address: String,
    pub admin_city: String,
    pub admin_state: String,
    pub admin_zip: String,
    pub admin_phone: String,
    pub att_first_name: String,
    pub att_middle_name: String,
    pub att_last_name: String,
    pub att_phone: String,
    pub att_email: String,
    pub beds: String,
    pub bathrooms: String,
    #[serde(rename = "Tot Fin Area")]
    pub tot_fin_area: String,
    #[serde(rename = "Yr Built")]
    pub yr_built: String,
    #[serde(rename = "transfer date")]
    pub transfer_date: String,
    #[serde(rename = "transfer price")]
    pub transfer_price: String,
}

fn or_empty(slot: &Option<String>) -> String {
    slot.clone().unwrap_or_default()
}

/// Total projection: any unset slot becomes the empty string, every column
/// is always produced.
pub fn project(record: &CaseRecord) -> OutputRow {
    OutputRow {
        case_num: record.caseno.clone(),
        parcel_number: or_empty(&record.parcel_id),
        decendent_first_name: or_empty(&record.decedent_first),
        decendent_middle_name: or_empty(&record.decedent_middle),
        decendent_last_name: or_empty(&record.decedent_last),
        sub_type: or_empty(&record.case_subtype),
        case_link: or_empty(&record.case_url),
        d_property_address: or_empty(&record.decedent_address),
        d_property_city: or_empty(&record.decedent_city),
        d_property_state: or_empty(&record.decedent_state),
        d_property_zip: or_empty(&record.decedent_zip),
        view_state_link: or_empty(&record.view_state_link),
        admin_first_name: or_empty(&record.admin_first),
        admin_middle_name: or_empty(&record.admin_middle),
        admin_last_name: or_empty(&record.admin_last),
        admin_address: or_empty(&record.admin_address),
        admin_city: or_empty(&record.admin_city),
        admin_state: or_empty(&record.admin_state),
        admin_zip: or_empty(&record.admin_zip),
        admin_phone: or_empty(&record.admin_phone),
        att_first_name: or_empty(&record.attorney_first),
        att_middle_name: or_empty(&record.attorney_middle),
        att_last_name: or_empty(&record.attorney_last),
        att_phone: or_empty(&record.attorney_phone),
        att_email: or_empty(&record.attorney_email),
        beds: or_empty(&record.beds),
        bathrooms: or_empty(&record.baths),
        tot_fin_area: or_empty(&record.finished_area),
        yr_built: or_empty(&record.year_built),
        transfer_date: or_empty(&record.transfer_date),
        transfer_price: or_empty(&record.transfer_price),
    }
}

/// Keep one previous generation: an existing `path` is renamed to
/// `Previous_data.csv` next to it, replacing any older snapshot.
pub fn rotate_previous(path: &Path) -> Result<()> {
    if !path.exists() {
        return Ok(());
    }
    let previous = path.with_file_name(PREVIOUS_SNAPSHOT);
    if previous.exists() {
        fs::remove_file(&previous)
            .with_context(|| format!("removing old snapshot {}", previous.display()))?;
    }
    fs::rename(path, &previous).with_context(|| {
        format!("rotating {} to {}", path.display(), previous.display())
    })?;
    info!(snapshot = %previous.display(), "rotated previous output");
    Ok(())
}

/// Rotate any prior output, then write `rows` (header always included).
pub fn write_rows(path: &Path, rows: &[OutputRow]) -> Result<()> {
    rotate_previous(path)?;
    let mut writer = csv::Writer::from_path(path)
        .with_context(|| format!("creating output file {}", path.display()))?;
    for row in rows {
        writer.serialize(row).context("serializing output row")?;
    }
    // serialize() only emits a header alongside a row
    if rows.is_empty() {
        writer
            .write_record(COLUMNS)
            .context("writing header for empty output")?;
    }
    writer.flush().context("flushing output file")?;
    info!(rows = rows.len(), path = %path.display(), "wrote output");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    const EXPECTED_HEADER: &str = "case_num,parcel number,decendent_first_name,decendent_middle_name,decendent_last_name,sub_type,case_link,d_property_address,d_property_city,d_property_state,d_property_zip,view_state_link,admin_first_name,admin_middle_name,admin_last_name,admin_address,admin_city,admin_state,admin_zip,admin_phone,att_first_name,att_middle_name,att_last_name,att_phone,att_email,beds,bathrooms,Tot Fin Area,Yr Built,transfer date,transfer price";

    #[test]
    fn sparse_record_projects_to_full_width_row() {
        let mut record = CaseRecord::new("2024ES42");
        record.case_subtype = Some("FULL ADMINISTRATION WITH WILL".to_string());
        record.decedent_last = Some("DOE".to_string());

        let row = project(&record);
        assert_eq!(row.case_num, "2024ES42");
        assert_eq!(row.sub_type, "FULL ADMINISTRATION WITH WILL");
        assert_eq!(row.decendent_last_name, "DOE");
        assert_eq!(row.decendent_first_name, "");
        assert_eq!(row.parcel_number, "");
        assert_eq!(row.transfer_price, "");
    }

    #[test]
    fn header_order_matches_the_consumer_contract() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("case_data.csv");

        let row = project(&CaseRecord::new("2024ES1"));
        write_rows(&path, &[row]).unwrap();

        let contents = fs::read_to_string(&path).unwrap();
        let header = contents.lines().next().unwrap();
        assert_eq!(header, EXPECTED_HEADER);
        assert_eq!(contents.lines().count(), 2);
    }

    #[test]
    fn empty_run_still_writes_a_header() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("case_data.csv");
        write_rows(&path, &[]).unwrap();
        let contents = fs::read_to_string(&path).unwrap();
        assert_eq!(contents.lines().next().unwrap(), EXPECTED_HEADER);
    }

    #[test]
    fn rotation_keeps_one_previous_generation() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("case_data.csv");

        let first = project(&CaseRecord::new("GEN1"));
        write_rows(&path, &[first]).unwrap();
        let second = project(&CaseRecord::new("GEN2"));
        write_rows(&path, &[second]).unwrap();

        let previous = dir.path().join(PREVIOUS_SNAPSHOT);
        assert!(fs::read_to_string(&previous).unwrap().contains("GEN1"));
        assert!(fs::read_to_string(&path).unwrap().contains("GEN2"));

        let third = project(&CaseRecord::new("GEN3"));
        write_rows(&path, &[third]).unwrap();
        assert!(fs::read_to_string(&previous).unwrap().contains("GEN2"));
    }
}
