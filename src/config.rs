//! Configuration and CLI argument handling

use clap::Parser;

/// CLI argument parsing structure
#[derive(Parser)]
#[command(name = "box-breathing")]
#[command(about = "A state-managed HTTP server hosting box-breathing exercise timers")]
#[command(version)]
pub struct Config {
    /// Port to bind the server to
    #[arg(short, long, default_value = "20554")]
    pub port: u16,

    /// Host address to bind to
    #[arg(long, default_value = "127.0.0.1")]
    pub host: String,

    /// Maximum number of breathing sessions open at once
    #[arg(short, long, default_value = "64")]
    pub max_sessions: usize,

    /// Start every new breathing session immediately instead of waiting for a toggle
    #[arg(short, long)]
    pub autostart: bool,

    /// Enable verbose logging
    #[arg(short, long)]
    pub verbose: bool,
}

impl Config {
    /// Parse configuration from command line arguments
    pub fn parse() -> Self {
        Parser::parse()
    }

    /// Get the server address as a formatted string
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Get the appropriate log level based on verbose flag
    pub fn log_level(&self) -> &'static str {
        if self.verbose { "debug" } else { "info" }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let config = Config::parse_from(["box-breathing"]);
        assert_eq!(config.address(), "127.0.0.1:20554");
        assert_eq!(config.max_sessions, 64);
        assert_eq!(config.log_level(), "info");
        assert!(!config.autostart);
    }

    #[test]
    fn overrides() {
        let config = Config::parse_from([
            "box-breathing", "--port", "8080", "--host", "0.0.0.0", "-m", "2", "--autostart", "--verbose",
        ]);
        assert_eq!(config.address(), "0.0.0.0:8080");
        assert_eq!(config.max_sessions, 2);
        assert_eq!(config.log_level(), "debug");
        assert!(config.autostart);
    }
}
