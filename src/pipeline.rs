//! Run orchestration.
//!
//! `Init → Authenticated → (DiscoverDevices → ExpandObjects → ExpandIndicators | LoadFixedList)
//! → FetchSamples → Format&Emit → Done`
//!
//! The whole run, sign-in included, is bounded by `total_timeout`. Lines are
//! written as soon as their sample arrives, so a run that times out keeps what
//! it already printed.

use crate::{
    fixed,
    format::format_line,
    hierarchy::{
        ExpandedIndicator,
        Expander,
    },
    report::{
        BranchFailure,
        RunReport,
        Stage,
    },
    sample::{
        fetch_latest,
        Sample,
        SampleWindow,
    },
};
use eyre::{
    eyre,
    Context as _,
    Result,
};
use futures::{
    stream,
    Stream,
    StreamExt,
};
use sevone_client::{
    ClientError,
    Device,
    Pager,
    Session,
    SevOneApi,
    Throttled,
};
use sevone_exporter_config::{
    load_indicators,
    IndicatorRef,
    Mode,
    Settings,
};
use std::{
    future::Future,
    io::Write,
    time::Duration,
};
use tracing::{
    debug,
    error,
    info,
    instrument,
};

/// Where the indicators to sample come from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Plan {
    Discover,
    Fixed(Vec<IndicatorRef>),
}

impl Plan {
    pub fn from_settings(settings: &Settings) -> Result<Self> {
        match settings.mode {
            Mode::Discover => Ok(Self::Discover),
            Mode::Fixed => Ok(Self::Fixed(load_indicators(&settings.indicators_file)?)),
        }
    }
}

/// Outcome of sampling one indicator.
enum Outcome {
    Sampled(ExpandedIndicator, Result<Option<Sample>, ClientError>),
    Unresolved(IndicatorRef, ClientError),
}

pub struct Exporter {
    settings: Settings,
    plan: Plan,
}

impl Exporter {
    pub fn new(settings: Settings, plan: Plan) -> Self {
        Self { settings, plan }
    }

    /// Sign in, collect and write one line per sampled indicator to `out`.
    pub async fn run<W: Write>(&self, out: &mut W) -> Result<RunReport> {
        let window = SampleWindow::ending_now(self.settings.window_length());
        info!(
            url = %self.settings.url,
            mode = %self.settings.mode,
            start_ms = window.start_ms,
            end_ms = window.end_ms,
            "starting run"
        );

        within_budget(self.settings.total_budget(), async {
            let mut session = Session::new(&self.settings.session_options())?;
            session.login(&self.settings.credential()).await.map_err(|err| {
                if err.is_auth() {
                    error!("sign-in rejected, nothing will be exported");
                }
                err
            })?;
            let report = self.collect(&session, window, out).await?;
            out.flush().context("Failed to flush output")?;
            Ok::<_, eyre::Report>(report)
        })
        .await
    }

    /// Everything after sign-in, against an already authenticated `api`.
    pub async fn collect<A, W>(&self, api: &A, window: SampleWindow, out: &mut W) -> Result<RunReport>
    where
        A: SevOneApi + ?Sized,
        W: Write,
    {
        let api = Throttled::new(api, self.settings.max_concurrency);
        let mut report = RunReport::default();
        match &self.plan {
            Plan::Discover => self.discover(&api, window, out, &mut report).await?,
            Plan::Fixed(targets) => self.fixed(&api, targets, window, out, &mut report).await?,
        }
        report.log_summary();
        Ok(report)
    }

    fn pager<'a, A: SevOneApi + ?Sized>(&self, api: &'a A) -> Pager<'a, A> {
        Pager::new(
            api,
            self.settings.page_size,
            self.settings.page_failure,
            self.settings.max_concurrency,
        )
    }

    #[instrument(level = "debug", skip_all)]
    async fn discover<A, W>(&self, api: &A, window: SampleWindow, out: &mut W, report: &mut RunReport) -> Result<()>
    where
        A: SevOneApi + ?Sized,
        W: Write,
    {
        let pager = self.pager(api);
        let devices = pager
            .fetch_all::<Device>(Device::COLLECTION)
            .await
            .wrap_err("Failed to list devices")?;
        report.absorb(devices.failed_pages.iter().map(|failed| {
            BranchFailure::new(
                Stage::Devices,
                format!("{} (page {})", Device::COLLECTION, failed.page),
                &failed.error,
            )
        }));
        report.devices = devices.items.len();
        debug!(devices = report.devices, "listed devices");

        let expander = Expander::new(pager, self.settings.max_concurrency);
        let objects = expander.objects(devices.items).await;
        report.objects = objects.children.len();
        report.absorb(objects.failures);
        debug!(objects = report.objects, "expanded objects");

        let indicators = expander.indicators(objects.children).await;
        report.indicators = indicators.children.len();
        report.absorb(indicators.failures);
        debug!(indicators = report.indicators, "expanded indicators");

        let outcomes = stream::iter(indicators.children.into_iter().map(move |indicator| async move {
            let sample = fetch_latest(api, &indicator.indicator, window).await;
            Outcome::Sampled(indicator, sample)
        }))
        .buffer_unordered(self.settings.max_concurrency);

        emit(outcomes, window, out, report).await
    }

    #[instrument(level = "debug", skip_all, fields(targets = targets.len()))]
    async fn fixed<A, W>(
        &self,
        api: &A,
        targets: &[IndicatorRef],
        window: SampleWindow,
        out: &mut W,
        report: &mut RunReport,
    ) -> Result<()>
    where
        A: SevOneApi + ?Sized,
        W: Write,
    {
        report.indicators = targets.len();
        let outcomes = stream::iter(targets.iter().copied().map(move |target| async move {
            match fixed::resolve(api, target).await {
                Ok(indicator) => {
                    let sample = fetch_latest(api, &indicator.indicator, window).await;
                    Outcome::Sampled(indicator, sample)
                }
                Err(error) => Outcome::Unresolved(target, error),
            }
        }))
        .buffer_unordered(self.settings.max_concurrency);

        emit(outcomes, window, out, report).await
    }
}

/// Write a line for every outcome with a sample, as outcomes arrive.
async fn emit<W: Write>(
    outcomes: impl Stream<Item = Outcome>,
    window: SampleWindow,
    out: &mut W,
    report: &mut RunReport,
) -> Result<()> {
    let mut outcomes = std::pin::pin!(outcomes);
    while let Some(outcome) = outcomes.next().await {
        match outcome {
            Outcome::Sampled(indicator, Ok(sample)) => match format_line(&indicator, sample.as_ref(), window) {
                Some(line) => {
                    writeln!(out, "{line}").context("Failed to write metric line")?;
                    report.lines_emitted += 1;
                }
                None => report.skipped_no_data += 1,
            },
            Outcome::Sampled(indicator, Err(error)) => {
                report
                    .failures
                    .push(BranchFailure::new(Stage::Sample, indicator.indicator.data_path(), &error));
            }
            Outcome::Unresolved(target, error) => {
                let coordinates = format!(
                    "device {} / object {} / indicator {}",
                    target.device_id, target.object_id, target.indicator_id
                );
                report
                    .failures
                    .push(BranchFailure::new(Stage::Detail, coordinates, &error));
            }
        }
    }
    Ok(())
}

/// Abandon `run` once `budget` has elapsed.
pub async fn within_budget<T>(budget: Duration, run: impl Future<Output = Result<T>>) -> Result<T> {
    tokio::time::timeout(budget, run)
        .await
        .map_err(|_| eyre!("Run exceeded the total timeout of {}s", budget.as_secs()))?
}
