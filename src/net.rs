//! Small helpers for rate-limit friendly networking.
//! PokeAPI is a free service with fair-use limits; back off on 429.

use anyhow::{anyhow, Result};
use rand::{thread_rng, Rng};
use std::time::Duration;

pub async fn send_with_backoff(
    rb: reqwest::RequestBuilder,
    label: &str,
    max_retries: u8,
) -> Result<reqwest::Response> {
    let mut attempt = 0u8;
    loop {
        let req = rb
            .try_clone()
            .ok_or_else(|| anyhow!("request for {label} cannot be retried"))?;
        match req.send().await {
            Ok(r) => {
                if r.status().as_u16() == 429 && attempt < max_retries {
                    attempt += 1;
                    let back_ms = backoff_delay_ms(attempt);
                    log::warn!("[net] 429 {label} retry={attempt} backoff={back_ms}ms");
                    tokio::time::sleep(Duration::from_millis(back_ms)).await;
                    continue;
                }
                return Ok(r);
            }
            Err(e) => {
                if attempt < max_retries {
                    attempt += 1;
                    let back_ms = backoff_delay_ms(attempt);
                    log::warn!("[net] err {label} retry={attempt} backoff={back_ms}ms : {e}");
                    tokio::time::sleep(Duration::from_millis(back_ms)).await;
                    continue;
                }
                return Err(anyhow!("{label}: {e}"));
            }
        }
    }
}

fn backoff_base_ms(attempt: u8) -> u64 {
    300u64.saturating_mul(1u64 << (attempt.clamp(1, 5) - 1)) // 300,600,1200,2400,4800
}

fn backoff_delay_ms(attempt: u8) -> u64 {
    let jitter: u64 = thread_rng().gen_range(0..=250);
    backoff_base_ms(attempt) + jitter
}


#[cfg(test)]
mod tests {
    use super::test_server::serve;
    use super::*;
    use std::sync::atomic::Ordering;

    #[test]
    fn backoff_doubles_then_caps() {
        assert_eq!(backoff_base_ms(1), 300);
        assert_eq!(backoff_base_ms(2), 600);
        assert_eq!(backoff_base_ms(5), 4800);
        assert_eq!(backoff_base_ms(9), 4800);
    }

    #[test]
    fn jitter_stays_within_window() {
        for _ in 0..50 {
            let d = backoff_delay_ms(1);
            assert!((300..=550).contains(&d));
        }
    }

    #[tokio::test]
    async fn retries_429_until_success() {
        let (url, hits) = serve(vec![(429, "{}"), (429, "{}"), (200, "{\"ok\":true}")]).await;
        let client = reqwest::Client::new();

        let r = send_with_backoff(client.get(&url), "limited", 2).await.unwrap();
        assert_eq!(r.status().as_u16(), 200);
        assert_eq!(hits.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn returns_429_once_retries_run_out() {
        let (url, hits) = serve(vec![(429, "{}"), (429, "{}"), (200, "{}")]).await;
        let client = reqwest::Client::new();

        let r = send_with_backoff(client.get(&url), "limited", 1).await.unwrap();
        assert_eq!(r.status().as_u16(), 429);
        assert_eq!(hits.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn server_errors_are_not_retried() {
        let (url, hits) = serve(vec![(500, "boom"), (200, "{}")]).await;
        let client = reqwest::Client::new();

        let r = send_with_backoff(client.get(&url), "broken", 3).await.unwrap();
        assert_eq!(r.status().as_u16(), 500);
        assert_eq!(hits.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn transport_error_after_retries_names_the_request() {
        // Bind then drop to get a port nobody listens on
        let addr = {
            let l = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
            l.local_addr().unwrap()
        };
        let client = reqwest::Client::new();

        let err = send_with_backoff(client.get(format!("http://{addr}")), "pokemon list", 1)
            .await
            .unwrap_err();
        assert!(err.to_string().starts_with("pokemon list:"), "{err}");
    }
}
