// src/record.rs

/// The per-case accumulator. `caseno` is the record's identity and always
/// present; everything else is `None` until the stage that extracts it has
/// run. `Some("")` means the stage ran and the page had nothing, which is a
/// different statement than `None`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CaseRecord {
    pub caseno: String,
    pub case_url: Option<String>,
    pub view_state_link: Option<String>,

    // Case detail page
    pub case_name: Option<String>,
    pub case_subtype: Option<String>,
    pub decedent_address: Option<String>,
    pub decedent_city: Option<String>,
    pub decedent_state: Option<String>,
    pub decedent_zip: Option<String>,
    pub decedent_first: Option<String>,
    pub decedent_middle: Option<String>,
    pub decedent_last: Option<String>,

    // Fiduciary detail page (the last fiduciary listed wins)
    pub admin_name: Option<String>,
    pub admin_address: Option<String>,
    pub admin_city: Option<String>,
    pub admin_state: Option<String>,
    pub admin_zip: Option<String>,
    pub admin_phone: Option<String>,
    pub admin_first: Option<String>,
    pub admin_middle: Option<String>,
    pub admin_last: Option<String>,

    // Attorney detail page
    pub attorney_name: Option<String>,
    pub attorney_phone: Option<String>,
    pub attorney_email: Option<String>,
    pub attorney_first: Option<String>,
    pub attorney_middle: Option<String>,
    pub attorney_last: Option<String>,

    // Property cross-reference
    pub parcel_id: Option<String>,
    pub beds: Option<String>,
    pub baths: Option<String>,
    pub finished_area: Option<String>,
    pub year_built: Option<String>,
    pub transfer_date: Option<String>,
    pub transfer_price: Option<String>,
}

impl CaseRecord {
    pub fn new(caseno: impl Into<String>) -> Self {
        Self {
            caseno: caseno.into(),
            ..Self::default()
        }
    }

    /// Placeholder merge for a property search that legitimately found
    /// nothing. Parcel id stays unset; the projector turns that into "".
    pub fn merge_no_property_match(&mut self) {
        for slot in [
            &mut self.beds,
            &mut self.baths,
            &mut self.finished_area,
            &mut self.year_built,
            &mut self.transfer_date,
            &mut self.transfer_price,
        ] {
            *slot = Some("N/A".to_string());
        }
    }
}

/// Record slot a page locator writes into. Keeps the locator tables
/// declarative while the accumulator stays a closed struct.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    CaseName,
    CaseSubtype,
    DecedentAddress,
    DecedentCity,
    DecedentState,
    DecedentZip,
    AdminName,
    AdminAddress,
    AdminCity,
    AdminState,
    AdminZip,
    AdminPhone,
    AttorneyName,
    AttorneyPhone,
    AttorneyEmail,
}

impl Field {
    pub fn slot<'r>(&self, record: &'r mut CaseRecord) -> &'r mut Option<String> {
        match self {
            Field::CaseName => &mut record.case_name,
            Field::CaseSubtype => &mut record.case_subtype,
            Field::DecedentAddress => &mut record.decedent_address,
            Field::DecedentCity => &mut record.decedent_city,
            Field::DecedentState => &mut record.decedent_state,
            Field::DecedentZip => &mut record.decedent_zip,
            Field::AdminName => &mut record.admin_name,
            Field::AdminAddress => &mut record.admin_address,
            Field::AdminCity => &mut record.admin_city,
            Field::AdminState => &mut record.admin_state,
            Field::AdminZip => &mut record.admin_zip,
            Field::AdminPhone => &mut record.admin_phone,
            Field::AttorneyName => &mut record.attorney_name,
            Field::AttorneyPhone => &mut record.attorney_phone,
            Field::AttorneyEmail => &mut record.attorney_email,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn no_match_placeholders_leave_parcel_unset() {
        let mut record = CaseRecord::new("2024ES123");
        record.merge_no_property_match();
        assert_eq!(record.beds.as_deref(), Some("N/A"));
        assert_eq!(record.transfer_price.as_deref(), Some("N/A"));
        assert_eq!(record.parcel_id, None);
        assert_eq!(record.caseno, "2024ES123");
    }
}
