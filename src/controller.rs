// Form controller
// Wires submission and date-change events to validation, the availability call and rendering.
// Page elements are injected as handles so any host (DOM adapter, terminal, test fake) can drive it.

use crate::api::{ApiError, AvailabilityApi, GENERIC_API_ERROR_MESSAGE};
use crate::form::{parse_date, FormInput};
use crate::render::{render, render_error, DisplayState, Outcome, ResultView};
use crate::reservation::ReservationForm;
use crate::validation::validate_and_build;
use chrono::{Local, NaiveDate, NaiveDateTime};
use futures::FutureExt;
use std::any::Any;
use std::panic::{self, AssertUnwindSafe};

pub trait SubmitControl: Send {
    fn set_disabled(&mut self, disabled: bool);
}

pub trait LoadingIndicator: Send {
    fn show(&mut self);
    fn hide(&mut self);
}

pub trait ResultRegion: Send {
    fn hide(&mut self);
    // Replaces the region's entire content and makes it visible
    fn replace(&mut self, view: &ResultView);
    fn scroll_into_view(&mut self);
}

pub trait DateRangeInputs: Send {
    fn set_pickup_min(&mut self, date: NaiveDate);
    fn set_return_min(&mut self, date: NaiveDate);
}

pub trait Alert: Send {
    fn alert(&mut self, message: &str);
}

// Handles to the host page elements the controller drives
pub struct PageHandles {
    pub submit: Box<dyn SubmitControl>,
    pub loading: Option<Box<dyn LoadingIndicator>>,
    pub result: Option<Box<dyn ResultRegion>>,
    pub dates: Box<dyn DateRangeInputs>,
    pub alert: Box<dyn Alert>,
}

// Loading state for one availability cycle; restored on drop, including during unwinding
struct InFlight<'a> {
    submit: &'a mut Box<dyn SubmitControl>,
    loading: &'a mut Option<Box<dyn LoadingIndicator>>,
}

impl<'a> InFlight<'a> {
    fn begin(
        submit: &'a mut Box<dyn SubmitControl>,
        loading: &'a mut Option<Box<dyn LoadingIndicator>>,
        result: &mut Option<Box<dyn ResultRegion>>,
    ) -> Self {
        if let Some(loading) = loading.as_mut() {
            loading.show();
        }
        if let Some(result) = result.as_mut() {
            result.hide();
        }
        submit.set_disabled(true);
        Self { submit, loading }
    }
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        if let Some(loading) = self.loading.as_mut() {
            loading.hide();
        }
        self.submit.set_disabled(false);
    }
}

pub struct FormController<A: AvailabilityApi> {
    api: A,
    handles: PageHandles,
    reservation: ReservationForm,
    last_submitted: Option<FormInput>,
}

impl<A: AvailabilityApi> FormController<A> {
    pub fn new(api: A, handles: PageHandles, reservation: ReservationForm) -> Self {
        Self {
            api,
            handles,
            reservation,
            last_submitted: None,
        }
    }

    /// Input of the most recent submission that reached the availability call.
    pub fn last_submitted(&self) -> Option<&FormInput> {
        self.last_submitted.as_ref()
    }

    pub fn initialize(&mut self) {
        self.initialize_on(Local::now().date_naive());
    }

    // Neither date can be picked before today
    pub fn initialize_on(&mut self, today: NaiveDate) {
        self.handles.dates.set_pickup_min(today);
        self.handles.dates.set_return_min(today);
    }

    pub fn pickup_date_changed(&mut self, value: &str) {
        match parse_date(value) {
            Some(date) => self.handles.dates.set_return_min(date),
            None => tracing::debug!(value, "ignoring pickup date change"),
        }
    }

    pub async fn submit(&mut self, input: FormInput) -> ResultView {
        self.submit_at(input, Local::now().naive_local()).await
    }

    /// Runs one submission with `now` as the reference for the past-pickup check.
    pub async fn submit_at(&mut self, input: FormInput, now: NaiveDateTime) -> ResultView {
        tracing::debug!(
            pickup_branch = %input.pickup_branch,
            return_branch = %input.return_branch,
            "availability form submitted"
        );

        let query = match validate_and_build(&input, now) {
            Ok(query) => query,
            Err(error) => {
                tracing::warn!(?error, "availability form rejected");
                let view = render(
                    &Outcome::Validation(error),
                    self.last_submitted.as_ref(),
                    &self.reservation,
                );
                present(&mut self.handles.result, &mut self.handles.alert, &view);
                return view;
            }
        };

        let _in_flight = InFlight::begin(
            &mut self.handles.submit,
            &mut self.handles.loading,
            &mut self.handles.result,
        );
        self.last_submitted = Some(input);

        let call = AssertUnwindSafe(self.api.check_availability(&query))
            .catch_unwind()
            .await;
        let outcome = match call {
            Ok(Ok(result)) => Outcome::Response(result),
            Ok(Err(error)) => Outcome::Api(error),
            Err(panic) => Outcome::Api(ApiError::Unexpected(panic_message(panic))),
        };
        if let Outcome::Api(error) = &outcome {
            tracing::error!(%error, "availability check failed");
        }

        let rendered = panic::catch_unwind(AssertUnwindSafe(|| {
            let view = render(&outcome, self.last_submitted.as_ref(), &self.reservation);
            present(&mut self.handles.result, &mut self.handles.alert, &view);
            view
        }));
        match rendered {
            Ok(view) => {
                tracing::info!(state = ?view.state, "availability result rendered");
                view
            }
            Err(panic) => {
                tracing::error!(
                    panic = %panic_message(panic),
                    "rendering availability result failed"
                );
                let view = render_error(GENERIC_API_ERROR_MESSAGE);
                let shown = panic::catch_unwind(AssertUnwindSafe(|| {
                    present(&mut self.handles.result, &mut self.handles.alert, &view)
                }));
                if shown.is_err() {
                    self.handles.alert.alert(view.primary_message());
                }
                view
            }
        }
    }
}

fn present(
    region: &mut Option<Box<dyn ResultRegion>>,
    alert: &mut Box<dyn Alert>,
    view: &ResultView,
) {
    match region {
        Some(region) => {
            region.replace(view);
            if view.scroll_into_view {
                region.scroll_into_view();
            }
        }
        None if view.state == DisplayState::Error => alert.alert(view.primary_message()),
        None => tracing::warn!(state = ?view.state, "no result region to render into"),
    }
}

fn panic_message(panic: Box<dyn Any + Send>) -> String {
    if let Some(message) = panic.downcast_ref::<&str>() {
        message.to_string()
    } else if let Some(message) = panic.downcast_ref::<String>() {
        message.clone()
    } else {
        "panic with non-string payload".to_string()
    }
}
