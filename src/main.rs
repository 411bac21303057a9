use std::io;
use std::panic::{self, AssertUnwindSafe};

use chrono::Local;
use clap::Parser;
use ratatui::layout::Rect;
use tracing::Level;

use term_desk::drivers::OutputDriver;
use term_desk::drivers::console::{ConsoleInputDriver, ConsoleOutputDriver};
use term_desk::event_loop::{ControlFlow, EventLoop};
use term_desk::log_buffer::{LogHandle, install_panic_hook, set_global_log};
use term_desk::tracing_sub;
use term_desk::{Cli, Desktop, DesktopConfig};

fn main() -> io::Result<()> {
    let cli = Cli::parse();
    let config = DesktopConfig::try_from(&cli)
        .map_err(|msg| io::Error::new(io::ErrorKind::InvalidInput, msg))?;

    let log = LogHandle::new(config.log_lines);
    set_global_log(log.clone());
    install_panic_hook();
    tracing_sub::init_default(Level::DEBUG);
    tracing::info!(content = ?config.content, edge_maximize = config.edge_maximize, "starting desktop");

    let outcome = panic::catch_unwind(AssertUnwindSafe(|| run(&config, log.clone())));
    match outcome {
        Ok(result) => result,
        Err(_) => {
            // The terminal has been restored by the output driver's Drop.
            for line in log.tail(20) {
                eprintln!("{line}");
            }
            Err(io::Error::other("desktop panicked"))
        }
    }
}

fn run(config: &DesktopConfig, log: LogHandle) -> io::Result<()> {
    let (width, height) = crossterm::terminal::size()?;
    let mut desktop = Desktop::new(
        config,
        config.content_source(),
        Some(log),
        Rect::new(0, 0, width, height),
    );

    let mut output = ConsoleOutputDriver::new()?;
    output.enter()?;
    let mut event_loop = EventLoop::new(ConsoleInputDriver::new(), config.tick);
    let result = event_loop.run(|_, event| {
        let redraw = match event {
            Some(event) => desktop.handle_event(&event),
            None => desktop.tick(Local::now()),
        };
        if desktop.should_quit() {
            return Ok(ControlFlow::Quit);
        }
        if redraw {
            output.draw(|mut frame| desktop.render(&mut frame))?;
        }
        Ok(ControlFlow::Continue)
    });
    output.exit()?;
    tracing::info!("desktop closed");
    result
}
