//! xshim - smoke-test driver
//!
//! Opens a connection on one of the in-crate hosts, runs a short client
//! session against it and prints the events the session produced.

use std::env;
use std::process;

use xshim::backend::recording::{CallLog, RecordingBackend};
use xshim::backend::{self, Backend};
use xshim::gc::{GcValueMask, XGcValues};
use xshim::protocol::*;
use xshim::{Display, DisplayConfig, VERSION};

fn print_usage() {
    println!("xshim v{}", VERSION);
    println!("Xlib client API on a host windowing toolkit");
    println!();
    println!("Usage: xshim [OPTIONS]");
    println!();
    println!("Options:");
    println!("  -display <name>       Display name to report (default: $DISPLAY or :0)");
    println!("  -backend <type>       Host backend (null, recording)");
    println!("  -geometry <WxH>       Override the screen size");
    println!("  -sync                 Sync with the host after every request");
    println!("  -security <level>     Policy: permissive, default, strict");
    println!("  -trace                Print every host call (recording backend)");
    println!("  -list-backends        List available backends");
    println!("  -h, --help            Show this help message");
    println!();
    println!("Examples:");
    println!("  xshim -backend recording -trace");
    println!("  xshim -geometry 800x600 -security strict");
    println!();
}

fn list_backends() {
    println!("Available backends:");
    for backend in backend::available_backends() {
        println!("  - {}", backend);
    }
    println!();
}

#[derive(Debug)]
struct Config {
    display: DisplayConfig,
    backend_type: String,
    trace: bool,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            display: DisplayConfig::from_env(),
            backend_type: "recording".to_string(),
            trace: false,
        }
    }
}

fn parse_geometry(value: &str) -> Option<(u16, u16)> {
    let (w, h) = value.split_once(['x', 'X'])?;
    let width = w.parse().ok().filter(|w| *w > 0)?;
    let height = h.parse().ok().filter(|h| *h > 0)?;
    Some((width, height))
}

fn parse_args() -> Result<Config, String> {
    let mut config = Config::default();
    let args: Vec<String> = env::args().collect();
    let mut i = 1;

    while i < args.len() {
        match args[i].as_str() {
            "-h" | "--help" => {
                print_usage();
                process::exit(0);
            }
            "-list-backends" => {
                list_backends();
                process::exit(0);
            }
            "-display" => {
                i += 1;
                if i >= args.len() {
                    return Err("Missing value for -display".to_string());
                }
                config.display = config.display.with_display_name(&args[i]);
            }
            "-backend" => {
                i += 1;
                if i >= args.len() {
                    return Err("Missing value for -backend".to_string());
                }
                config.backend_type = args[i].clone();
            }
            "-geometry" => {
                i += 1;
                if i >= args.len() {
                    return Err("Missing value for -geometry".to_string());
                }
                let (width, height) = parse_geometry(&args[i])
                    .ok_or_else(|| format!("Invalid geometry: {}", args[i]))?;
                config.display = config.display.with_screen_size(width, height);
            }
            "-sync" => {
                config.display = config.display.with_synchronous(true);
            }
            "-security" => {
                i += 1;
                if i >= args.len() {
                    return Err("Missing value for -security".to_string());
                }
                let name = config.display.display_name.clone();
                let base = match args[i].as_str() {
                    "permissive" => DisplayConfig::permissive(),
                    "default" => DisplayConfig::default(),
                    "strict" => DisplayConfig::strict(),
                    _ => return Err(format!("Invalid security level: {}", args[i])),
                };
                config.display = DisplayConfig {
                    display_name: name,
                    screen_size: config.display.screen_size,
                    synchronous: config.display.synchronous,
                    ..base
                };
            }
            "-trace" => {
                config.trace = true;
            }
            arg => {
                return Err(format!("Unknown option: {}", arg));
            }
        }
        i += 1;
    }

    Ok(config)
}

/// A window with a border drawn in red, a label and a filled pie
fn run_session(display: &mut Display) -> X11Result<()> {
    let root = display.root_window();
    let black = display.black_pixel();
    let white = display.white_pixel();
    let window = display.create_simple_window(root, 10, 10, 200, 150, 1, black, white)?;
    display.store_name(window, "xshim")?;
    display.select_input(
        window,
        event_mask::EXPOSURE | event_mask::STRUCTURE_NOTIFY | event_mask::BUTTON_PRESS,
    )?;
    display.map_window(window)?;

    let colormap = display.default_colormap();
    let red = display.alloc_named_color(colormap, "red")?.0;
    let values = XGcValues {
        foreground: red.pixel,
        line_width: 2,
        ..Default::default()
    };
    let gc = display.create_gc(window.id(), GcValueMask::FOREGROUND | GcValueMask::LINE_WIDTH, &values)?;
    display.draw_rectangle(window.id(), gc, 5, 5, 190, 140)?;
    display.set_foreground(gc, black)?;
    display.draw_string(window.id(), gc, 20, 30, "hello from xshim")?;
    display.fill_arc(window.id(), gc, 60, 50, 80, 80, 0, 270 * 64)?;
    display.free_gc(gc)?;

    display.resize_window(window, 240, 180)?;
    display.flush()?;

    while display.pending() > 0 {
        if let Some(event) = display.next_event() {
            println!("{:>4}  {:?}", event.serial(), event);
        }
    }

    display.destroy_window(window)?;
    while let Some(event) = display.check_mask_event(event_mask::ALL_EVENTS) {
        println!("{:>4}  {:?}", event.serial(), event);
    }
    Ok(())
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let config = match parse_args() {
        Ok(config) => config,
        Err(err) => {
            eprintln!("Error: {}", err);
            eprintln!();
            print_usage();
            process::exit(1);
        }
    };

    let (host, calls): (Box<dyn Backend>, Option<CallLog>) = match config.backend_type.as_str() {
        "recording" => {
            let recording = RecordingBackend::new();
            let log = recording.log();
            (Box::new(recording), Some(log))
        }
        name => match backend::create_backend(name) {
            Some(host) => (host, None),
            None => {
                eprintln!("Error: Backend '{}' is not available", name);
                eprintln!();
                list_backends();
                process::exit(1);
            }
        },
    };

    log::info!("xshim v{}", VERSION);
    log::info!("Display: {}", config.display.display_name);
    log::info!("Backend: {}", config.backend_type);

    let mut display = match Display::open(config.display, host) {
        Ok(display) => display,
        Err(e) => {
            eprintln!("Error: Failed to open display: {}", e);
            process::exit(1);
        }
    };

    if let Err(e) = run_session(&mut display) {
        eprintln!("Error: session failed: {}", e);
        process::exit(1);
    }
    display.close();

    match calls {
        Some(calls) if config.trace => {
            for call in calls.calls() {
                println!("host: {:?}", call);
            }
        }
        Some(calls) => log::info!("{} host calls", calls.calls().len()),
        None => {}
    }
}
