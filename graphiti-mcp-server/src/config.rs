use std::{net::SocketAddr, str::FromStr};

pub const MCP_TRANSPORT: &str = "MCP_TRANSPORT";
pub const BIND_ADDR: &str = "BIND_ADDR";
pub const DEFAULT_BIND_ADDR: &str = "0.0.0.0:8080";

/// How MCP messages reach the server.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Transport {
    /// Line-delimited JSON-RPC on stdin/stdout.
    #[default]
    Stdio,
    /// Streamable HTTP on `/mcp`, with `/health` and `/ready` probes.
    Http,
}

impl FromStr for Transport {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> anyhow::Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "stdio" => Ok(Transport::Stdio),
            "http" => Ok(Transport::Http),
            other => anyhow::bail!("Invalid {MCP_TRANSPORT} '{other}': expected 'stdio' or 'http'"),
        }
    }
}

/// Server settings loaded from environment variables. Graph connection settings
/// live in [`graphiti_bridge::GraphitiConfig`].
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Env: `MCP_TRANSPORT`, default `stdio`.
    pub transport: Transport,
    /// Address for the HTTP transport. Env: `BIND_ADDR`, default `0.0.0.0:8080`.
    pub bind_addr: SocketAddr,
}

impl ServerConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// # Errors
    /// Returns an error if `MCP_TRANSPORT` names an unknown transport or `BIND_ADDR`
    /// is not a valid socket address.
    pub fn from_lookup<F>(lookup: F) -> anyhow::Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let transport = match lookup(MCP_TRANSPORT).filter(|v| !v.is_empty()) {
            Some(v) => v.parse()?,
            None => Transport::default(),
        };

        let bind_addr = lookup(BIND_ADDR)
            .filter(|v| !v.is_empty())
            .unwrap_or_else(|| DEFAULT_BIND_ADDR.to_string());
        let bind_addr = SocketAddr::from_str(&bind_addr)
            .map_err(|e| anyhow::anyhow!("Invalid {BIND_ADDR} '{}': {}", bind_addr, e))?;

        Ok(ServerConfig {
            transport,
            bind_addr,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn none(_: &str) -> Option<String> {
        None
    }

    #[test]
    fn defaults() {
        let config = ServerConfig::from_lookup(none).unwrap();
        assert_eq!(config.transport, Transport::Stdio);
        assert_eq!(config.bind_addr.to_string(), DEFAULT_BIND_ADDR);
    }

    #[test]
    fn http_transport_and_custom_addr() {
        let config = ServerConfig::from_lookup(|name| match name {
            MCP_TRANSPORT => Some("HTTP".to_string()),
            BIND_ADDR => Some("127.0.0.1:9000".to_string()),
            _ => None,
        })
        .unwrap();
        assert_eq!(config.transport, Transport::Http);
        assert_eq!(config.bind_addr.port(), 9000);
    }

    #[test]
    fn invalid_values_are_errors() {
        let bad_transport = ServerConfig::from_lookup(|name| {
            (name == MCP_TRANSPORT).then(|| "websocket".to_string())
        });
        assert!(bad_transport.unwrap_err().to_string().contains("websocket"));

        let bad_addr =
            ServerConfig::from_lookup(|name| (name == BIND_ADDR).then(|| "nowhere".to_string()));
        assert!(bad_addr.unwrap_err().to_string().contains("BIND_ADDR"));
    }
}
