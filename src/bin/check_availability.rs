// Command-line front end for the availability lookup
// Usage: check_availability <pickup-date> <pickup-time> <pickup-branch> <return-date> <return-time> <return-branch> [--html]

use anyhow::{bail, Context};
use chrono::NaiveDate;
use rental_availability::controller::{
    Alert, DateRangeInputs, LoadingIndicator, ResultRegion, SubmitControl,
};
use rental_availability::{
    AppConfig, FormController, FormInput, HttpAvailabilityClient, PageHandles, ReservationForm,
    ResultView,
};
use std::env;
use std::io::{self, Write};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

struct ConsoleSubmit;

impl SubmitControl for ConsoleSubmit {
    fn set_disabled(&mut self, disabled: bool) {
        tracing::trace!(disabled, "submit control");
    }
}

struct ConsoleLoading;

impl LoadingIndicator for ConsoleLoading {
    fn show(&mut self) {
        eprint!("在庫を確認しています...");
        let _ = io::stderr().flush();
    }

    fn hide(&mut self) {
        eprintln!();
    }
}

struct ConsoleResult {
    html: bool,
}

impl ResultRegion for ConsoleResult {
    fn hide(&mut self) {}

    fn replace(&mut self, view: &ResultView) {
        if self.html {
            println!("{}", view.to_html());
        } else {
            println!("{}", view.to_text());
        }
    }

    fn scroll_into_view(&mut self) {}
}

struct ConsoleDates;

impl DateRangeInputs for ConsoleDates {
    fn set_pickup_min(&mut self, date: NaiveDate) {
        tracing::debug!(%date, "pickup minimum date");
    }

    fn set_return_min(&mut self, date: NaiveDate) {
        tracing::debug!(%date, "return minimum date");
    }
}

struct ConsoleAlert;

impl Alert for ConsoleAlert {
    fn alert(&mut self, message: &str) {
        eprintln!("{}", message);
    }
}

fn parse_args() -> anyhow::Result<(FormInput, bool)> {
    let mut html = false;
    let mut fields = Vec::new();
    for arg in env::args().skip(1) {
        if arg == "--html" {
            html = true;
        } else {
            fields.push(arg);
        }
    }
    if fields.len() != 6 {
        bail!(
            "expected 6 arguments: <pickup-date> <pickup-time> <pickup-branch> \
             <return-date> <return-time> <return-branch> [--html]"
        );
    }

    let mut fields = fields.into_iter();
    let mut next = || fields.next().unwrap_or_default();
    let input = FormInput {
        pickup_date: next(),
        pickup_time: next(),
        pickup_branch: next(),
        return_date: next(),
        return_time: next(),
        return_branch: next(),
    };
    Ok((input, html))
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "rental_availability=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
        .init();

    let (input, html) = parse_args()?;
    let config = AppConfig::load().context("failed to load configuration")?;
    tracing::info!(endpoint = %config.api.endpoint, "using availability service");

    let client = HttpAvailabilityClient::new(&config.api)?;
    let reservation = ReservationForm::new(config.reservation.clone())?;
    let handles = PageHandles {
        submit: Box::new(ConsoleSubmit),
        loading: Some(Box::new(ConsoleLoading)),
        result: Some(Box::new(ConsoleResult { html })),
        dates: Box::new(ConsoleDates),
        alert: Box::new(ConsoleAlert),
    };

    let mut controller = FormController::new(client, handles, reservation);
    controller.initialize();
    controller.pickup_date_changed(&input.pickup_date);
    controller.submit(input).await;
    Ok(())
}
