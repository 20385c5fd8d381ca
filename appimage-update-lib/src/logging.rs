use anyhow::Result;
use std::fmt::Write as _;
use tracing::field::{Field, Visit};
use tracing::level_filters::LevelFilter;
use tracing::{Event, Subscriber};
use tracing_indicatif::IndicatifLayer;
use tracing_indicatif::style::ProgressStyle;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::fmt::format::Writer;
use tracing_subscriber::fmt::{self, FmtContext, FormatEvent, FormatFields, MakeWriter};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::registry::LookupSpan;
use tracing_subscriber::util::SubscriberInitExt;

/// Environment variable that overrides the default log filter, e.g. `appimage_update_lib=debug`.
pub const LOG_ENV_VAR: &str = "APPIMAGE_UPDATE_LOG";

const TICK_STRINGS: &[&str] = &["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏", "⠿"];

/// Style for transfers whose size the server declared.
pub fn progress_bar_style() -> Result<ProgressStyle> {
    let style = ProgressStyle::with_template(
        "{spinner:.green} {msg} [{wide_bar:.cyan/blue}] {bytes}/{total_bytes} ({bytes_per_sec}, {eta})",
    )?;
    Ok(style.progress_chars("#>-").tick_strings(TICK_STRINGS))
}

/// Style for transfers without a declared length: counts bytes instead of drawing a bar.
pub fn byte_counter_style() -> Result<ProgressStyle> {
    spinner_style("{msg} {bytes} ({bytes_per_sec})")
}

pub fn spinner_style(template: &str) -> Result<ProgressStyle> {
    let style = ProgressStyle::with_template(&format!("{{spinner:.green}} {template}"))?;
    Ok(style.tick_strings(TICK_STRINGS))
}

/// Installs the global subscriber: plain messages on stderr plus progress bars
/// for instrumented transfers. Leaving it uninstalled silences progress output.
pub fn initialize_logging(default_level: LevelFilter) -> Result<()> {
    let progress_bar_layer = IndicatifLayer::new();
    let writer = progress_bar_layer.get_stderr_writer();

    message_subscriber(default_level, writer)
        .with(progress_bar_layer)
        .try_init()?;
    Ok(())
}

/// Registry with the level filter and the message-only output layer writing to `writer`.
fn message_subscriber<W>(
    default_level: LevelFilter,
    writer: W,
) -> impl Subscriber + for<'a> LookupSpan<'a> + Send + Sync
where
    W: for<'w> MakeWriter<'w> + Send + Sync + 'static,
{
    let filter = EnvFilter::builder()
        .with_default_directive(default_level.into())
        .with_env_var(LOG_ENV_VAR)
        .from_env_lossy();
    let fmt_layer = fmt::layer().event_format(MessageOnly).with_writer(writer);

    tracing_subscriber::registry().with(filter).with(fmt_layer)
}

/// Writes just the event message, one per line, without level, target, span context or fields.
#[derive(Clone, Debug, Default)]
pub struct MessageOnly;

impl<S, N> FormatEvent<S, N> for MessageOnly
where
    S: Subscriber + for<'a> LookupSpan<'a>,
    N: for<'a> FormatFields<'a> + 'static,
{
    fn format_event(
        &self,
        _ctx: &FmtContext<'_, S, N>,
        mut writer: Writer<'_>,
        event: &Event<'_>,
    ) -> std::fmt::Result {
        let mut visitor = MessageVisitor {
            writer: &mut writer,
            result: Ok(()),
        };
        event.record(&mut visitor);
        visitor.result?;
        writeln!(writer)
    }
}

struct MessageVisitor<'a, 'w> {
    writer: &'a mut Writer<'w>,
    result: std::fmt::Result,
}

impl Visit for MessageVisitor<'_, '_> {
    fn record_debug(&mut self, field: &Field, value: &dyn std::fmt::Debug) {
        if field.name() == "message" {
            self.result = write!(self.writer, "{value:?}");
        }
    }
}
