use crate::domain::model::Connectivity;
use crate::utils::error::Result;
use reqwest::Client;
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;

pub const DEFAULT_HEALTH_PATH: &str = "/health";
pub const DEFAULT_INITIAL_DELAY: Duration = Duration::from_millis(300);

/// 探測伺服器的 health 端點並提供線上/離線訊號
#[derive(Debug, Clone)]
pub struct ConnectivityMonitor {
    client: Client,
    health_url: String,
}

impl ConnectivityMonitor {
    pub fn new(base_url: &str, health_path: &str, timeout: Duration) -> Result<Self> {
        let client = Client::builder().timeout(timeout).build()?;
        let health_url = format!(
            "{}/{}",
            base_url.trim_end_matches('/'),
            health_path.trim_start_matches('/')
        );
        Ok(Self { client, health_url })
    }

    pub fn health_url(&self) -> &str {
        &self.health_url
    }

    /// 2xx 視為線上；其他狀態碼或連線錯誤都是離線
    pub async fn check(&self) -> Connectivity {
        match self.client.get(&self.health_url).send().await {
            Ok(response) if response.status().is_success() => Connectivity::Online,
            Ok(response) => {
                tracing::debug!("Health probe returned {}", response.status());
                Connectivity::Offline
            }
            Err(e) => {
                tracing::debug!("Health probe failed: {}", e);
                Connectivity::Offline
            }
        }
    }

    /// 背景定期探測；訊號透過 watch channel 發佈，第一次探測完成前為 `None`
    pub fn spawn(self, initial_delay: Duration, interval: Duration) -> MonitorHandle {
        let (tx, rx) = watch::channel(None::<Connectivity>);

        let task = tokio::spawn(async move {
            tokio::time::sleep(initial_delay).await;
            let mut ticker = tokio::time::interval(interval.max(Duration::from_millis(10)));
            let mut last: Option<Connectivity> = None;

            loop {
                ticker.tick().await;
                let state = self.check().await;
                if last != Some(state) {
                    match state {
                        Connectivity::Online => tracing::info!("🌐 Server reachable: online"),
                        Connectivity::Offline => tracing::warn!("📴 Server unreachable: offline"),
                    }
                    last = Some(state);
                }
                if tx.send(Some(state)).is_err() {
                    // 所有接收端都已關閉
                    break;
                }
            }
        });

        MonitorHandle { rx, task }
    }
}

pub struct MonitorHandle {
    rx: watch::Receiver<Option<Connectivity>>,
    task: JoinHandle<()>,
}

impl MonitorHandle {
    /// 尚未完成任何探測時為 `None`
    pub fn current(&self) -> Option<Connectivity> {
        *self.rx.borrow()
    }

    pub fn subscribe(&self) -> watch::Receiver<Option<Connectivity>> {
        self.rx.clone()
    }

    pub fn shutdown(self) {
        self.task.abort();
    }
}
