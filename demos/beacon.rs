#![allow(unused_crate_dependencies)]
#![allow(clippy::print_stdout)]

use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;
use tracing::info;

use puck::gatt::CharProps;
use puck::sim::SimStack;
use puck::*;

#[derive(Clone, Debug, clap::Parser)]
struct Args {
    /// Minor value identifying this puck.
    #[arg(short, long, value_parser=hex16, default_value = "C0FE")]
    minor: u16,

    /// JSON configuration file.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Number of simulated main loop iterations.
    #[arg(short, long, default_value_t = 8)]
    iterations: usize,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt::init();
    let args = Args::parse();
    let cfg = match args.config {
        Some(ref path) => Config::load(path)?.unwrap_or_default(),
        None => Config::default(),
    };

    let svc = Uuid::from_ascii("bftj light      ").expect("invalid service UUID");
    let color = Uuid::from_ascii("bftj light color").expect("invalid characteristic UUID");
    let level = Uuid::from_ascii("bftj light level").expect("invalid characteristic UUID");

    let mut puck = Puck::new(SimStack::new(), cfg);
    puck.add_default_characteristic(svc, color, 3);
    puck.add_characteristic(svc, level, 1, CharProps::READ | CharProps::NOTIFY);
    puck.on_characteristic_write(color, move |p: &mut Puck<SimStack>, v: &[u8]| {
        info!("New color: {v:02X?}");
        let max = v.iter().copied().max().unwrap_or_default();
        if let Err(e) = p.update_characteristic_value(level, &[max]) {
            tracing::error!("Failed to update level: {e}");
        }
    });
    puck.init(args.minor)?;

    // Script a central that connects, sets a color, and leaves
    let hdl = (puck.characteristics().find(color))
        .and_then(|id| puck.characteristics().get(id).handle())
        .expect("color characteristic not attached");
    puck.stack_mut()
        .push_event(Event::Connected)
        .write(hdl, [0xFF, 0x80, 0x00])
        .push_event(Event::Disconnected(
            DisconnectReason::RemoteUserTerminatedConnection,
        ));

    for _ in 0..args.iterations {
        puck.drive()?;
        println!("{:?}", puck.state());
    }
    println!(
        "Level: {:02X?}",
        puck.characteristic_value(level).unwrap_or_default()
    );
    Ok(())
}

pub fn hex16(mut s: &str) -> Result<u16, String> {
    if s.starts_with("0x") || s.starts_with("0X") {
        s = &s[2..];
    }
    u16::from_str_radix(s, 16).map_err(|e| format!("{e}"))
}
