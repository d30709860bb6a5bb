//! Wires engine, dispatcher, watcher and display together

use std::path::PathBuf;
use std::thread::{self, JoinHandle};
use std::time::Duration;

use crossbeam_channel::{bounded, never, select, unbounded, Receiver};
use tracing::info;
use wanderer_services::{
    format_event, pane_for_channel, Activity, DisplayLine, Dispatcher, Engine, MarkupRenderer,
    RawMessage, SourceWatcher, Style,
};

use crate::config::HostConfig;

const POLL_INTERVAL: Duration = Duration::from_millis(1);

pub(crate) fn run(config: HostConfig, config_path: PathBuf) -> anyhow::Result<()> {
    let engine = Engine::new(config.engine.clone())?;
    let renderer = MarkupRenderer::new(config.display.color)?;

    let (in_tx, in_rx) = bounded::<RawMessage>(1024);
    let (out_tx, out_rx) = unbounded::<Vec<u8>>();
    let (activity_tx, activity_rx) = bounded::<Activity>(256);
    let (notice_tx, notice_rx) = unbounded::<DisplayLine>();

    let display = spawn_display(activity_rx, notice_rx, renderer, config.display.panes);

    let mut watch_paths = config.watch.paths.clone();
    if !watch_paths.contains(&config_path) {
        watch_paths.push(config_path);
    }
    let mut watcher = {
        let engine = engine.clone();
        let notice_tx = notice_tx.clone();
        SourceWatcher::new(watch_paths).spawn(
            Duration::from_millis(config.watch.poll_interval_ms),
            move |path| {
                engine.reset();
                let name = path.file_name().unwrap_or(path.as_os_str()).to_string_lossy();
                let _ = notice_tx.send(DisplayLine::new(format!("{name} modified, engine reset"), Style::Info));
            },
        )
    };
    drop(notice_tx);

    let mut dispatcher =
        Dispatcher::start(engine.clone(), in_rx, out_tx, Some(activity_tx), POLL_INTERVAL);

    run_transport(&config, in_tx, out_rx, &mut dispatcher)?;

    watcher.stop()?;
    let _ = display.join();
    info!("Shutdown complete");
    Ok(())
}

#[cfg(all(feature = "midi-io", unix))]
fn run_transport(
    config: &HostConfig,
    in_tx: crossbeam_channel::Sender<RawMessage>,
    out_rx: Receiver<Vec<u8>>,
    dispatcher: &mut Dispatcher,
) -> anyhow::Result<()> {
    use wanderer_services::VirtualPorts;

    let mut ports =
        VirtualPorts::open(&config.ports.input_name, &config.ports.output_name, in_tx, out_rx)?;
    println!(
        "Virtual ports: '{}' (input), '{}' (output)",
        config.ports.input_name, config.ports.output_name
    );
    println!("Press Enter to exit...");
    let mut line = String::new();
    std::io::stdin().read_line(&mut line)?;

    ports.close_input();
    dispatcher.stop()?;
    ports.finish();
    Ok(())
}

#[cfg(not(all(feature = "midi-io", unix)))]
fn run_transport(
    _config: &HostConfig,
    in_tx: crossbeam_channel::Sender<RawMessage>,
    out_rx: Receiver<Vec<u8>>,
    dispatcher: &mut Dispatcher,
) -> anyhow::Result<()> {
    println!("Built without MIDI ports, playing demo phrase");

    let sink = thread::spawn(move || {
        for bytes in out_rx.iter() {
            tracing::debug!(?bytes, "Out");
        }
    });

    for message in crate::demo::phrase() {
        in_tx.send(message)?;
        thread::sleep(Duration::from_millis(120));
    }
    drop(in_tx);

    dispatcher.stop()?;
    let _ = sink.join();
    Ok(())
}

/// Prints activity and notices until the dispatcher goes away
fn spawn_display(
    activity_rx: Receiver<Activity>,
    notice_rx: Receiver<DisplayLine>,
    renderer: MarkupRenderer,
    panes: usize,
) -> JoinHandle<()> {
    thread::spawn(move || {
        let print = |pane: usize, line: &DisplayLine| {
            println!("[{pane}] {}", renderer.render(&line.to_markup()));
        };

        let mut notices_open = true;
        loop {
            // A closed notice channel would win every select, park it instead
            let notices = if notices_open { notice_rx.clone() } else { never() };
            select! {
                recv(activity_rx) -> msg => match msg {
                    Ok(activity) => {
                        let pane = pane_for_channel(activity.input.channel, panes);
                        print(pane, &format_event(&activity));
                    }
                    Err(_) => break,
                },
                recv(notices) -> msg => match msg {
                    Ok(line) => print(0, &line),
                    Err(_) => notices_open = false,
                },
            }
        }

        for line in notice_rx.try_iter() {
            print(0, &line);
        }
    })
}
