//! Line commands accepted by the daemon on stdin
//!
//! ```text
//! start http|socks5|both
//! stop http|socks5|both
//! enable http|socks5
//! disable http|socks5
//! port http|socks5 <port>
//! select <ip>
//! status
//! quit
//! ```

use crate::proxy::Protocol;
use crate::settings::validate_port;
use crate::state::AppState;

/// Which proxies a start/stop command addresses
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Scope {
    One(Protocol),
    Both,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConsoleCommand {
    Start(Scope),
    Stop(Scope),
    Enable(Protocol, bool),
    Port(Protocol, u16),
    Select(String),
    Status,
    Quit,
}

impl ConsoleCommand {
    pub fn parse(line: &str) -> Result<Self, String> {
        let mut words = line.split_whitespace();
        let verb = words.next().ok_or("Empty command")?.to_lowercase();
        let args: Vec<&str> = words.collect();

        let command = match (verb.as_str(), args.as_slice()) {
            ("start", [scope]) => ConsoleCommand::Start(parse_scope(scope)?),
            ("stop", [scope]) => ConsoleCommand::Stop(parse_scope(scope)?),
            ("enable", [protocol]) => ConsoleCommand::Enable(protocol.parse()?, true),
            ("disable", [protocol]) => ConsoleCommand::Enable(protocol.parse()?, false),
            ("port", [protocol, port]) => {
                let protocol: Protocol = protocol.parse()?;
                let port: u16 = port.parse().map_err(|_| format!("Invalid port: {}", port))?;
                validate_port(protocol, port).map_err(|e| e.to_string())?;
                ConsoleCommand::Port(protocol, port)
            }
            ("select", [ip]) => ConsoleCommand::Select(ip.to_string()),
            ("status", []) => ConsoleCommand::Status,
            ("quit" | "exit", []) => ConsoleCommand::Quit,
            _ => return Err(format!("Unrecognized command: {}", line.trim())),
        };

        Ok(command)
    }

    /// Run the command and describe the outcome
    pub async fn execute(&self, state: &AppState) -> String {
        let controller = &state.controller;

        match self {
            ConsoleCommand::Start(Scope::One(Protocol::Http)) => controller.start_http().await,
            ConsoleCommand::Start(Scope::One(Protocol::Socks5)) => controller.start_socks5().await,
            ConsoleCommand::Start(Scope::Both) => controller.start_both().await,
            ConsoleCommand::Stop(Scope::One(Protocol::Http)) => controller.stop_http().await,
            ConsoleCommand::Stop(Scope::One(Protocol::Socks5)) => controller.stop_socks5().await,
            ConsoleCommand::Stop(Scope::Both) => controller.stop_both().await,
            ConsoleCommand::Enable(protocol, enabled) => controller.set_enabled(*protocol, *enabled).await,
            ConsoleCommand::Port(protocol, port) => {
                let outcome = controller.update_port(*protocol, *port).await;
                if outcome.restart_required {
                    return format!(
                        "{} port set to {}; restart the proxy to apply it",
                        protocol.label(),
                        port
                    );
                }
            }
            ConsoleCommand::Select(ip) => controller.select_ip_address(ip).await,
            ConsoleCommand::Status | ConsoleCommand::Quit => {}
        }

        describe(state)
    }
}

fn parse_scope(word: &str) -> Result<Scope, String> {
    if word.eq_ignore_ascii_case("both") || word.eq_ignore_ascii_case("all") {
        Ok(Scope::Both)
    } else {
        word.parse().map(Scope::One)
    }
}

/// One-line summary of the current snapshot
pub fn describe(state: &AppState) -> String {
    let ui = state.snapshot();
    let flag = |on: bool| if on { "on" } else { "off" };

    let mut line = format!(
        "http={} (:{}) socks5={} (:{}) vpn={} hotspot={} ip={}",
        flag(ui.http_active),
        ui.http_port,
        flag(ui.socks5_active),
        ui.socks5_port,
        flag(ui.vpn_connected),
        flag(ui.hotspot_enabled),
        if ui.selected_ip_address.is_empty() { "-" } else { ui.selected_ip_address.as_str() },
    );
    if let Some(error) = &ui.error_message {
        line.push_str(&format!(" error=\"{}\"", error));
    }
    line
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_lifecycle_commands() {
        assert_eq!(
            ConsoleCommand::parse("start http"),
            Ok(ConsoleCommand::Start(Scope::One(Protocol::Http)))
        );
        assert_eq!(ConsoleCommand::parse("STOP both"), Ok(ConsoleCommand::Stop(Scope::Both)));
        assert_eq!(
            ConsoleCommand::parse("disable socks5"),
            Ok(ConsoleCommand::Enable(Protocol::Socks5, false))
        );
        assert_eq!(ConsoleCommand::parse("  status "), Ok(ConsoleCommand::Status));
    }

    #[test]
    fn test_parse_port_validates_range() {
        assert_eq!(
            ConsoleCommand::parse("port http 9090"),
            Ok(ConsoleCommand::Port(Protocol::Http, 9090))
        );
        assert!(ConsoleCommand::parse("port http 80").is_err());
        assert!(ConsoleCommand::parse("port http abc").is_err());
    }

    #[test]
    fn test_parse_rejects_unknown_input() {
        assert!(ConsoleCommand::parse("").is_err());
        assert!(ConsoleCommand::parse("start ftp").is_err());
        assert!(ConsoleCommand::parse("select").is_err());
    }
}
