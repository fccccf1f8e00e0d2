use std::net::SocketAddr;

use anyhow::Context;

const DEFAULT_ADDR: &str = "0.0.0.0:3000";
const ADDR_VAR: &str = "TICTACTOE_ADDR";
const SEED_VAR: &str = "TICTACTOE_SEED";

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ServerConfig {
    pub addr: SocketAddr,
    /// Seed for the shared random generator; OS entropy when unset.
    pub seed: Option<u64>,
}

impl ServerConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> anyhow::Result<Self> {
        let raw_addr = lookup(ADDR_VAR).unwrap_or_else(|| DEFAULT_ADDR.to_string());
        let addr = raw_addr
            .parse::<SocketAddr>()
            .with_context(|| format!("{ADDR_VAR}={raw_addr} is not a socket address"))?;
        let seed = lookup(SEED_VAR)
            .map(|raw| {
                raw.parse::<u64>()
                    .with_context(|| format!("{SEED_VAR}={raw} is not an unsigned integer"))
            })
            .transpose()?;
        Ok(Self { addr, seed })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config(vars: &[(&str, &str)]) -> anyhow::Result<ServerConfig> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        ServerConfig::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn defaults() {
        let cfg = config(&[]).unwrap();
        assert_eq!(cfg.addr, "0.0.0.0:3000".parse().unwrap());
        assert_eq!(cfg.seed, None);
    }

    #[test]
    fn overrides() {
        let cfg = config(&[(ADDR_VAR, "127.0.0.1:8080"), (SEED_VAR, "42")]).unwrap();
        assert_eq!(cfg.addr.port(), 8080);
        assert_eq!(cfg.seed, Some(42));
    }

    #[test]
    fn rejects_garbage() {
        assert!(config(&[(ADDR_VAR, "nowhere")]).is_err());
        assert!(config(&[(SEED_VAR, "-1")]).is_err());
    }
}
