//! Play one lesson unit from a directory of grade/category folders.
//!
//! Run with:
//! `cargo run -p core-service --example lesson_player -- <asset-root> [grade] [category] [unit]`
//!
//! e.g. `... -- ./assets 1 textbook 2`

use anyhow::{bail, Context};
use core_runtime::logging::{init_logging, LoggingConfig};
use core_service::{format_time, Category, CoreEvent, Grade, PlaybackState};

#[core_async::main]
async fn main() -> anyhow::Result<()> {
    init_logging(LoggingConfig::default()).context("logging setup")?;

    let mut args = std::env::args().skip(1);
    let Some(root) = args.next() else {
        bail!("usage: lesson_player <asset-root> [grade] [category] [unit]");
    };
    let grade: Grade = args.next().as_deref().unwrap_or("1").parse()?;
    let category: Category = args.next().as_deref().unwrap_or("textbook").parse()?;
    let unit: u32 = args.next().as_deref().unwrap_or("1").parse()?;

    let core = core_service::bootstrap_desktop(root).await?;

    for grade in core.list_grades().await? {
        for category in core.list_categories(grade).await? {
            let units = core.list_units(grade, category).await?;
            println!("{} {}: {} units", grade.display_name(), category.display_name(), units.len());
        }
    }

    let mut events = core
        .subscribe_events()
        .filter(|event| matches!(event, CoreEvent::Playback(_)));
    let mut states = core.subscribe_playback();

    core.play_unit(grade, category, unit).await?;

    loop {
        core_async::select! {
            changed = states.changed() => {
                if changed.is_err() {
                    break;
                }
                match &*states.borrow_and_update() {
                    PlaybackState::Playing { file, position_ms, duration_ms } => {
                        println!(
                            "{}  {} / {}",
                            file.short_display_name(),
                            format_time(*position_ms),
                            format_time(*duration_ms)
                        );
                    }
                    PlaybackState::Error { message } => bail!("{message}"),
                    PlaybackState::Idle => break,
                    PlaybackState::Paused { .. } => {}
                }
            }
            Ok(event) = events.recv() => println!("event: {event}"),
        }
    }

    core.release().await;
    Ok(())
}
