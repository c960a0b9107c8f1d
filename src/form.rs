// Form model: the raw fields collected from the lookup form and the query derived from them

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use serde::{Deserialize, Serialize};
use std::fmt;

// Wire format of the combined pickup/return instants (ISO-8601, no offset)
pub const QUERY_DATE_TIME_FORMAT: &str = "%Y-%m-%dT%H:%M:%S";

const DATE_FORMAT: &str = "%Y-%m-%d";
const TIME_FORMATS: [&str; 2] = ["%H:%M", "%H:%M:%S"];

// Identifies one of the six form fields, used for error reporting and logging
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormField {
    PickupDate,
    PickupTime,
    PickupBranch,
    ReturnDate,
    ReturnTime,
    ReturnBranch,
}

impl FormField {
    pub const ALL: [FormField; 6] = [
        FormField::PickupDate,
        FormField::PickupTime,
        FormField::PickupBranch,
        FormField::ReturnDate,
        FormField::ReturnTime,
        FormField::ReturnBranch,
    ];

    // Element id of the field on the host page
    pub fn id(&self) -> &'static str {
        match self {
            FormField::PickupDate => "pickupDate",
            FormField::PickupTime => "pickupTime",
            FormField::PickupBranch => "pickupBranch",
            FormField::ReturnDate => "returnDate",
            FormField::ReturnTime => "returnTime",
            FormField::ReturnBranch => "returnBranch",
        }
    }
}

impl fmt::Display for FormField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

// Values captured from the form on submission, exactly as the user entered them
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FormInput {
    pub pickup_date: String,
    pub pickup_time: String,
    pub pickup_branch: String,
    pub return_date: String,
    pub return_time: String,
    pub return_branch: String,
}

impl FormInput {
    pub fn field(&self, field: FormField) -> &str {
        match field {
            FormField::PickupDate => &self.pickup_date,
            FormField::PickupTime => &self.pickup_time,
            FormField::PickupBranch => &self.pickup_branch,
            FormField::ReturnDate => &self.return_date,
            FormField::ReturnTime => &self.return_time,
            FormField::ReturnBranch => &self.return_branch,
        }
    }

    /// First field (in form order) that is empty or whitespace only.
    pub fn first_missing(&self) -> Option<FormField> {
        FormField::ALL
            .into_iter()
            .find(|field| self.field(*field).trim().is_empty())
    }

    pub fn pickup_date_time(&self) -> Result<NaiveDateTime, FormField> {
        combine(
            &self.pickup_date,
            &self.pickup_time,
            FormField::PickupDate,
            FormField::PickupTime,
        )
    }

    pub fn return_date_time(&self) -> Result<NaiveDateTime, FormField> {
        combine(
            &self.return_date,
            &self.return_time,
            FormField::ReturnDate,
            FormField::ReturnTime,
        )
    }
}

pub fn parse_date(value: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(value.trim(), DATE_FORMAT).ok()
}

pub fn parse_time(value: &str) -> Option<NaiveTime> {
    let value = value.trim();
    TIME_FORMATS
        .iter()
        .find_map(|format| NaiveTime::parse_from_str(value, format).ok())
}

fn combine(
    date: &str,
    time: &str,
    date_field: FormField,
    time_field: FormField,
) -> Result<NaiveDateTime, FormField> {
    let date = parse_date(date).ok_or(date_field)?;
    let time = parse_time(time).ok_or(time_field)?;
    Ok(date.and_time(time))
}

// Query sent to the availability service for one request/response cycle
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AvailabilityQuery {
    pub pickup_branch: String,
    pub return_branch: String,
    pub pickup_date_time: NaiveDateTime,
    pub return_date_time: NaiveDateTime,
}

impl AvailabilityQuery {
    pub fn pickup_date_time_param(&self) -> String {
        self.pickup_date_time
            .format(QUERY_DATE_TIME_FORMAT)
            .to_string()
    }

    pub fn return_date_time_param(&self) -> String {
        self.return_date_time
            .format(QUERY_DATE_TIME_FORMAT)
            .to_string()
    }
}

#[cfg(test)]
pub(crate) fn sample_input() -> FormInput {
    FormInput {
        pickup_date: "2030-06-01".to_string(),
        pickup_time: "09:00".to_string(),
        pickup_branch: "奄美空港店".to_string(),
        return_date: "2030-06-03".to_string(),
        return_time: "18:30".to_string(),
        return_branch: "名瀬店".to_string(),
    }
}
