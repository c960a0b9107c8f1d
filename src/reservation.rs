// Prefilled link to the external reservation form

use crate::config::{ConfigError, ReservationConfig};
use crate::form::FormInput;
use reqwest::Url;

/// Drops one `0` from the start of a time value: "09:00" -> "9:00", "00:30" -> "0:30".
pub fn strip_leading_zero(time: &str) -> &str {
    time.strip_prefix('0').unwrap_or(time)
}

#[derive(Debug, Clone)]
pub struct ReservationForm {
    base_url: Url,
    config: ReservationConfig,
}

impl ReservationForm {
    pub fn new(config: ReservationConfig) -> Result<Self, ConfigError> {
        let base_url = Url::parse(&config.base_url).map_err(|e| ConfigError::InvalidUrl {
            key: "reservation.base_url",
            reason: e.to_string(),
        })?;
        Ok(Self { base_url, config })
    }

    pub fn url_for(&self, input: &FormInput) -> Url {
        let fields = &self.config.fields;
        let mut url = self.base_url.clone();
        url.query_pairs_mut()
            .append_pair(&self.config.prefill_key, &self.config.prefill_value)
            .append_pair(&fields.pickup_date, &input.pickup_date)
            .append_pair(&fields.pickup_time, strip_leading_zero(&input.pickup_time))
            .append_pair(&fields.pickup_branch, &input.pickup_branch)
            .append_pair(&fields.return_date, &input.return_date)
            .append_pair(&fields.return_time, strip_leading_zero(&input.return_time))
            .append_pair(&fields.return_branch, &input.return_branch);
        url
    }
}
