use std::env;

use inquire::Select;
use pcm60x::clock::StdClock;
use pcm60x::config::MonitorConfig;
use pcm60x::monitor::Pcm60x;
use pcm60x::registers::Field;
use pcm60x::scheduler::PollScheduler;
use pcm60x::sink::{SensorSink, Value};
use serialport::SerialPort;

// Configuration constants - adjust these for your setup
const BAUD_RATE: u32 = 2400;
// The controller answers slowly at 2400 baud; the port read timeout just
// bounds one read call, the poll deadline lives in MonitorConfig.
const SERIAL_TIMEOUT_MS: u64 = 50;
const IDLE_SLEEP_MS: u64 = 100;

pub struct PortWrapper(Box<dyn SerialPort>);

#[derive(Debug)]
pub struct IoError(std::io::Error);

impl core::fmt::Display for IoError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::error::Error for IoError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(&self.0)
    }
}

impl embedded_io::Error for IoError {
    fn kind(&self) -> embedded_io::ErrorKind {
        match self.0.kind() {
            std::io::ErrorKind::NotFound => embedded_io::ErrorKind::NotFound,
            std::io::ErrorKind::PermissionDenied => embedded_io::ErrorKind::PermissionDenied,
            std::io::ErrorKind::ConnectionRefused => embedded_io::ErrorKind::ConnectionRefused,
            std::io::ErrorKind::ConnectionReset => embedded_io::ErrorKind::ConnectionReset,
            std::io::ErrorKind::ConnectionAborted => embedded_io::ErrorKind::ConnectionAborted,
            std::io::ErrorKind::NotConnected => embedded_io::ErrorKind::NotConnected,
            std::io::ErrorKind::BrokenPipe => embedded_io::ErrorKind::BrokenPipe,
            std::io::ErrorKind::InvalidInput => embedded_io::ErrorKind::InvalidInput,
            std::io::ErrorKind::InvalidData => embedded_io::ErrorKind::InvalidData,
            std::io::ErrorKind::TimedOut => embedded_io::ErrorKind::TimedOut,
            std::io::ErrorKind::Interrupted => embedded_io::ErrorKind::Interrupted,
            std::io::ErrorKind::Unsupported => embedded_io::ErrorKind::Unsupported,
            std::io::ErrorKind::OutOfMemory => embedded_io::ErrorKind::OutOfMemory,
            _ => embedded_io::ErrorKind::Other,
        }
    }
}

impl embedded_io::ErrorType for PortWrapper {
    type Error = IoError;
}

impl embedded_io::Read for PortWrapper {
    fn read(&mut self, buf: &mut [u8]) -> Result<usize, Self::Error> {
        std::io::Read::read(&mut self.0, buf).map_err(IoError)
    }
}

impl embedded_io::Write for PortWrapper {
    fn write(&mut self, buf: &[u8]) -> Result<usize, Self::Error> {
        std::io::Write::write(&mut self.0, buf).map_err(IoError)
    }

    fn flush(&mut self) -> Result<(), Self::Error> {
        std::io::Write::flush(&mut self.0).map_err(IoError)
    }
}

/// Prints every published value to stdout.
struct PrintSink;

impl SensorSink for PrintSink {
    fn publish(&mut self, field: Field, value: Value) {
        let descriptor = field.descriptor();
        match value {
            Value::Number(number) => println!(
                "{:>28}: {:.*}",
                field.name(),
                descriptor.decimals as usize,
                number
            ),
            other => println!("{:>28}: {}", field.name(), other),
        }
    }

    fn publish_warning_bit(&mut self, index: usize, raised: bool) {
        if raised {
            println!("{:>28}: warning bit {} raised", "warning_status", index);
        }
    }

    fn link_state(&mut self, online: bool) {
        println!("controller is {}", if online { "online" } else { "offline" });
    }
}

fn main() {
    env_logger::init();

    // Get serial port from command line arg or interactive selection
    let port_name = env::args().nth(1).unwrap_or_else(|| {
        let ports = serialport::available_ports().expect("Failed to enumerate serial ports");

        if ports.is_empty() {
            eprintln!("No serial ports found!");
            std::process::exit(1);
        }

        let port_names: Vec<String> = ports.iter().map(|p| p.port_name.clone()).collect();

        Select::new("Select a serial port:", port_names)
            .prompt()
            .expect("Failed to select port")
    });

    println!("Using port: {}", port_name);

    let port = serialport::new(&port_name, BAUD_RATE)
        .timeout(std::time::Duration::from_millis(SERIAL_TIMEOUT_MS))
        .open()
        .expect("Failed to open serial port");

    let port = PortWrapper(port);

    let mut monitor: Pcm60x<PortWrapper, StdClock> =
        Pcm60x::new(port, StdClock::new(), MonitorConfig::default());
    let mut scheduler = PollScheduler::new(monitor.config().poll_interval);
    let mut sink = PrintSink;

    println!("Polling every {} ...", monitor.config().poll_interval);

    loop {
        match scheduler.run(&mut monitor, &mut sink) {
            Some(Ok(())) => println!("--- poll complete ---"),
            Some(Err(e)) => eprintln!("poll failed: {e}"),
            None => std::thread::sleep(std::time::Duration::from_millis(IDLE_SLEEP_MS)),
        }
    }
}
