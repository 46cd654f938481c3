use std::fs::File;
use std::io::{self, Read};
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use log::info;

use gnss::{Config, FixType, Handler, Location, Mode, Receiver, SatelliteSet, Transport};

/// Replay a raw NMEA capture through the receiver driver and print every
/// decoded snapshot.
#[derive(Parser)]
#[command(version, about)]
struct Cli {
    /// Capture file; stdin when omitted
    input: Option<PathBuf>,

    /// Print the satellite constellation as well
    #[arg(short, long)]
    satellites: bool,
}

/// Captures are replayed, not driven: nothing to transmit, no timer.
struct NullTransport;

impl Transport for NullTransport {
    fn send(&mut self, _data: &[u8]) {}
    fn start_timer(&mut self, _ms: u32) {}
    fn stop_timer(&mut self) {}
}

struct Printer {
    satellites: bool,
    fixes: u64,
}

impl Handler for Printer {
    fn location(&mut self, location: &Location) {
        self.fixes += 1;
        let fix = match location.fix {
            FixType::None => "none",
            FixType::TimeOnly => "time",
            FixType::Fix2D => "2D",
            FixType::Fix3D => "3D",
        };
        let t = &location.time;
        println!(
            "{:04}-{:02}-{:02}T{:02}:{:02}:{:02}.{:03}Z fix={} sats={} \
             lat={:.7} lon={:.7} alt={:.3}m speed={:.3}m/s hdop={:.2}",
            t.calendar_year(),
            t.month,
            t.day,
            t.hour,
            t.minute,
            t.second,
            t.millis,
            fix,
            location.numsv,
            f64::from(location.latitude) * 1e-7,
            f64::from(location.longitude) * 1e-7,
            f64::from(location.altitude) * 1e-3,
            f64::from(location.speed) * 1e-3,
            f64::from(location.hdop) * 1e-2,
        );
    }

    fn satellites(&mut self, satellites: &SatelliteSet) {
        if !self.satellites {
            return;
        }
        for satellite in satellites {
            println!(
                "  prn {:3} snr {:2} elev {:2} azim {:3} {}{}",
                satellite.prn,
                satellite.snr,
                satellite.elevation,
                satellite.azimuth,
                if satellite.state.is_tracking() { "T" } else { "-" },
                if satellite.state.is_navigating() { "N" } else { "-" },
            );
        }
    }
}

fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    let mut reader: Box<dyn Read> = match &cli.input {
        Some(path) => {
            Box::new(File::open(path).with_context(|| format!("opening {}", path.display()))?)
        },
        None => Box::new(io::stdin()),
    };

    let mut receiver = Receiver::new(
        Config {
            mode: Mode::Nmea,
            ..Config::default()
        },
        NullTransport,
        Printer {
            satellites: cli.satellites,
            fixes: 0,
        },
    );

    let mut buffer = [0u8; 4096];
    loop {
        let count = reader.read(&mut buffer).context("reading capture")?;
        if count == 0 {
            break;
        }
        receiver.receive(&buffer[..count]);
    }

    let stats = receiver.stats();
    info!(
        "{} fixes, {} sentences discarded",
        receiver.handler().fixes,
        stats.nmea_discarded
    );
    Ok(())
}
