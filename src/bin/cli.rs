//! trackwire device simulator
//!
//! Sends one device frame to a server and prints the reply.

use std::net::TcpStream;
use std::time::Duration;

use chrono::{Local, Utc};
use clap::{Parser, Subcommand};
use trackwire::gps::{encode_payload, GpsFix};
use trackwire::protocol::{
    encode_login, encode_status, to_hex, write_frame, Frame, FrameReader, ProtocolKind,
    StatusReport,
};
use trackwire::Result;

/// trackwire device simulator
#[derive(Parser, Debug)]
#[command(name = "trackwire-sim")]
#[command(about = "Simulates a GPS tracker talking to a trackwire server")]
struct Args {
    /// Server address
    #[arg(short, long, default_value = "127.0.0.1:60000")]
    server: String,

    /// IMEI sent in the login frame that precedes every command
    #[arg(short, long, default_value = "639355201084827")]
    imei: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Log in only
    Login,

    /// Send a heartbeat
    Heartbeat,

    /// Send a GPS position
    Gps {
        /// Latitude in degrees, negative south
        #[arg(long, allow_hyphen_values = true)]
        lat: f64,

        /// Longitude in degrees, negative west
        #[arg(long, allow_hyphen_values = true)]
        lon: f64,

        #[arg(long, default_value = "0")]
        speed: u8,

        #[arg(long, default_value = "0")]
        heading: u16,

        #[arg(long, default_value = "8")]
        satellites: u8,
    },

    /// Send a status report
    Status {
        #[arg(long, default_value = "100")]
        battery: u8,

        /// Include a signal strength byte
        #[arg(long)]
        signal: Option<u8>,
    },

    /// Ask for the server time
    Time,

    /// Ask for the setup block
    Setup,

    /// Announce hibernation (server hangs up)
    Hibernate,
}

fn main() {
    let args = Args::parse();

    if let Err(e) = run(&args) {
        eprintln!("error: {}", e);
        std::process::exit(1);
    }
}

fn run(args: &Args) -> Result<()> {
    let stream = TcpStream::connect(&args.server)?;
    stream.set_read_timeout(Some(Duration::from_secs(5)))?;
    let mut reader = FrameReader::new(stream.try_clone()?);
    let mut writer = stream;

    let login = Frame::new(ProtocolKind::Login.code(), encode_login(&args.imei, 1)?)?;
    exchange(&mut writer, &mut reader, &login)?;

    let frame = match &args.command {
        Commands::Login => return Ok(()),
        Commands::Heartbeat => Frame::generic(ProtocolKind::Heartbeat.code()),
        Commands::Gps {
            lat,
            lon,
            speed,
            heading,
            satellites,
        } => {
            let now = Utc::now();
            let fix = GpsFix {
                timestamp_utc: now,
                timestamp_local: now.with_timezone(&Local),
                time_from_device: true,
                valid: true,
                satellites: *satellites,
                latitude: *lat,
                longitude: *lon,
                speed: *speed,
                heading: *heading,
                accuracy: 0.0,
            };
            Frame::new(
                ProtocolKind::GpsPositioning.code(),
                encode_payload(&fix).to_vec(),
            )?
        }
        Commands::Status { battery, signal } => {
            let report = StatusReport {
                battery: *battery,
                software_version: 1,
                upload_interval: 5,
                signal_strength: *signal,
            };
            Frame::new(ProtocolKind::Status.code(), encode_status(&report))?
        }
        Commands::Time => Frame::generic(ProtocolKind::Time.code()),
        Commands::Setup => Frame::generic(ProtocolKind::Setup.code()),
        Commands::Hibernate => Frame::generic(ProtocolKind::Hibernation.code()),
    };

    exchange(&mut writer, &mut reader, &frame)
}

fn exchange(
    writer: &mut TcpStream,
    reader: &mut FrameReader<TcpStream>,
    frame: &Frame,
) -> Result<()> {
    println!("OUT {}", to_hex(&frame.to_bytes()));
    write_frame(writer, frame)?;

    match reader.read_frame()? {
        Some(reply) => println!("IN  {}", to_hex(&reply.to_bytes())),
        None => println!("server closed the connection"),
    }
    Ok(())
}
