//! Round-robin proxy pool with per-attempt jitter (spec §4.1).
//!
//! Not `governor` (which throttles a single egress): this rotates
//! *across* egress endpoints, which is a distinct concern from rate
//! limiting a single one. See DESIGN.md's scraper entry.

use newsdesk_core::config::ProxyConfig;
use rand::Rng;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

pub struct ProxyPool {
    endpoints: Vec<(String, u16)>,
    username: String,
    password: String,
    cursor: AtomicUsize,
    pub rotation_enabled: bool,
}

impl ProxyPool {
    pub fn new(cfg: &ProxyConfig) -> Self {
        let endpoints = cfg.ports.iter().map(|p| (cfg.host.clone(), *p)).collect();
        Self {
            endpoints,
            username: cfg.username.clone(),
            password: cfg.password.clone(),
            cursor: AtomicUsize::new(0),
            rotation_enabled: cfg.rotation_enabled,
        }
    }

    /// Picks the next endpoint round-robin and returns a configured
    /// `reqwest::Proxy`.
    pub fn next_proxy(&self) -> anyhow::Result<reqwest::Proxy> {
        let idx = if self.rotation_enabled {
            self.cursor.fetch_add(1, Ordering::Relaxed) % self.endpoints.len()
        } else {
            0
        };
        let (host, port) = &self.endpoints[idx];
        let url = format!("http://{host}:{port}");
        let proxy = reqwest::Proxy::all(&url)?.basic_auth(&self.username, &self.password);
        Ok(proxy)
    }

    /// Jitter applied between rotation attempts, per spec §4.1.
    pub fn jitter(&self) -> Duration {
        Duration::from_millis(rand::thread_rng().gen_range(50..=400))
    }

    pub fn len(&self) -> usize {
        self.endpoints.len()
    }

    pub fn is_empty(&self) -> bool {
        self.endpoints.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cfg() -> ProxyConfig {
        ProxyConfig {
            username: "u".into(),
            password: "p".into(),
            host: "proxy.example.com".into(),
            ports: vec![1000, 1001, 1002],
            rotation_enabled: true,
        }
    }

    #[test]
    fn rotates_round_robin() {
        let pool = ProxyPool::new(&cfg());
        let urls: Vec<_> = (0..6)
            .map(|_| pool.next_proxy().unwrap())
            .map(|p| format!("{p:?}"))
            .collect();
        // Every third call should repeat the same underlying endpoint index.
        assert_eq!(urls[0], urls[3]);
        assert_eq!(urls[1], urls[4]);
    }

    #[test]
    fn disabled_rotation_stays_on_first_endpoint() {
        let mut c = cfg();
        c.rotation_enabled = false;
        let pool = ProxyPool::new(&c);
        let a = format!("{:?}", pool.next_proxy().unwrap());
        let b = format!("{:?}", pool.next_proxy().unwrap());
        assert_eq!(a, b);
    }
}
