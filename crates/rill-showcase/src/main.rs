#![forbid(unsafe_code)]

//! Demo binary: runs the dashboard against the canned [`StaticFeed`] and
//! prints each panel's emissions.

use std::cell::RefCell;
use std::rc::Rc;

use tracing_subscriber::EnvFilter;

use rill_core::Broadcast;
use rill_showcase::{Dashboard, FormValue, StaticFeed, cli};

fn main() {
    let opts = cli::parse();

    let default_level = if opts.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .init();

    let dashboard = Dashboard::new(Rc::new(StaticFeed::default()));

    if matches!(opts.section.as_str(), "numbers" | "all") {
        let _sub = dashboard.numbers().subscribe_values(|numbers: Vec<i64>| {
            println!("numbers: {numbers:?}");
        });
    }

    if matches!(opts.section.as_str(), "list" | "all") {
        let _sub = dashboard.list().subscribe_values(|list: Vec<String>| {
            println!("list: {list:?}");
        });
    }

    if opts.section == "all" {
        run_interactive_panels(&dashboard);
    }

    dashboard.teardown();
    tracing::info!("dashboard torn down");
}

/// Drive the form binding and quiet latch with scripted events.
fn run_interactive_panels(dashboard: &Dashboard<StaticFeed>) {
    let changes: Broadcast<FormValue> = Broadcast::new();
    let seen = Rc::new(RefCell::new(Vec::new()));
    let sink = Rc::clone(&seen);
    let form = changes.stream();
    let _sub = form.subscribe_values(move |value: FormValue| {
        sink.borrow_mut().push(value.name);
    });
    dashboard.bind_form(&form);

    for name in ["a", "ab", "abc"] {
        changes.emit(FormValue { name: name.into() });
    }
    changes.close();
    println!("form history: {:?}", seen.borrow());

    let signals: Broadcast<bool> = Broadcast::new();
    dashboard.watch_quiet(&signals.stream());
    signals.emit(false);
    signals.emit(false);
    signals.close();
    println!("quiet flag: {}", dashboard.quiet_flag());
}
