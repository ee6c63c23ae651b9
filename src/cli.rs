//! Command line interface for the `packetlink` demo binary.
//!
//! The binary runs a loopback simulation: a device transport talks to a
//! companion transport over a channel that periodically refuses sends.

use clap::Parser;

/// Command line arguments for the `packetlink` binary.
#[derive(Debug, Parser)]
#[command(
    name = "packetlink",
    version,
    about = "Loopback simulation of a packetlink device and companion"
)]
pub struct Cli {
    /// Application records the companion sends to the device.
    #[arg(short, long, default_value_t = 8)]
    pub messages: usize,
    /// Payload size of each application record in bytes.
    #[arg(short, long, default_value_t = 1500)]
    pub payload_size: usize,
    /// Refuse every Nth send on the loopback channel; 0 never refuses.
    #[arg(short, long, default_value_t = 3)]
    pub busy_every: usize,
    /// Largest transmission the channel accepts, in bytes.
    #[arg(long, default_value_t = 1024)]
    pub outbound_capacity: usize,
    /// Retry checks during which a simulated overlay blocks scrolling.
    #[arg(long, default_value_t = 2)]
    pub overlay_checks: u32,
}

#[cfg(test)]
mod tests {
    use clap::Parser;

    use super::Cli;

    #[test]
    fn defaults_apply() {
        let cli = Cli::parse_from(["packetlink"]);
        assert_eq!(cli.messages, 8);
        assert_eq!(cli.busy_every, 3);
        assert_eq!(cli.outbound_capacity, 1024);
    }

    #[test]
    fn parses_overrides() {
        let cli = Cli::parse_from(["packetlink", "-m", "2", "--payload-size", "16", "-b", "0"]);
        assert_eq!((cli.messages, cli.payload_size, cli.busy_every), (2, 16, 0));
    }
}
