// Validation of the lookup form before any request is made

use crate::form::{AvailabilityQuery, FormField, FormInput};
use chrono::{Local, NaiveDateTime};
use thiserror::Error;

// Display strings are the messages shown to the user
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("すべての項目を入力してください。")]
    MissingField(FormField),

    #[error("日付と時刻を正しい形式で入力してください。")]
    InvalidDateTime(FormField),

    #[error("返却日時は貸出日時より後に設定してください。")]
    ReturnBeforePickup,

    #[error("貸出日時は現在より後に設定してください。")]
    PickupInPast,
}

/// Checks the form against the current local time.
pub fn validate(input: &FormInput) -> Result<(), ValidationError> {
    validate_at(input, Local::now().naive_local())
}

/// Checks the form against an explicit instant. Rules short-circuit in order:
/// every field present, return strictly after pickup, pickup not before `now`.
pub fn validate_at(input: &FormInput, now: NaiveDateTime) -> Result<(), ValidationError> {
    validate_and_build(input, now).map(|_| ())
}

// Same rules as `validate_at`, handing back the query on success
pub fn validate_and_build(
    input: &FormInput,
    now: NaiveDateTime,
) -> Result<AvailabilityQuery, ValidationError> {
    if let Some(field) = input.first_missing() {
        return Err(ValidationError::MissingField(field));
    }

    let pickup = input
        .pickup_date_time()
        .map_err(ValidationError::InvalidDateTime)?;
    let ret = input
        .return_date_time()
        .map_err(ValidationError::InvalidDateTime)?;

    if ret <= pickup {
        return Err(ValidationError::ReturnBeforePickup);
    }

    if pickup < now {
        return Err(ValidationError::PickupInPast);
    }

    Ok(AvailabilityQuery {
        pickup_branch: input.pickup_branch.trim().to_string(),
        return_branch: input.return_branch.trim().to_string(),
        pickup_date_time: pickup,
        return_date_time: ret,
    })
}
