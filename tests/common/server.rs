//! Test exporter management.

use std::path::PathBuf;
use std::process::{Child, Command};
use std::time::Duration;
use tokio::time::sleep;

/// A running exporter process.
pub struct TestExporter {
    child: Child,
    port: u16,
    data_dir: PathBuf,
}

impl TestExporter {
    /// Spawn an exporter pointed at `dsn`, serving metrics on `telemetry_path`.
    pub async fn spawn(dsn: &str, telemetry_path: &str) -> anyhow::Result<Self> {
        let port = free_port()?;
        let data_dir = std::env::temp_dir().join(format!("pgbouncer-exporter-test-{port}"));
        std::fs::create_dir_all(&data_dir)?;

        let config_path = data_dir.join("config.toml");
        let config_content = format!(
            r#"
[exporter]
data_source_name = "{dsn}"
connect_timeout_secs = 1

[web]
listen_address = "127.0.0.1:{port}"
telemetry_path = "{telemetry_path}"
"#
        );
        std::fs::write(&config_path, config_content)?;

        let child = Command::new(env!("CARGO_BIN_EXE_pgbouncer_exporter"))
            .arg(&config_path)
            .env_remove("DATA_SOURCE_NAME")
            .env_remove("PGB_EXPORTER_WEB_LISTEN_ADDRESS")
            .env_remove("PGB_EXPORTER_WEB_TELEMETRY_PATH")
            .env("RUST_LOG", "warn")
            .spawn()?;

        let exporter = Self {
            child,
            port,
            data_dir,
        };
        exporter.wait_until_ready().await?;
        Ok(exporter)
    }

    /// Wait until the HTTP listener accepts connections.
    async fn wait_until_ready(&self) -> anyhow::Result<()> {
        for _ in 0..100 {
            if tokio::net::TcpStream::connect(("127.0.0.1", self.port))
                .await
                .is_ok()
            {
                return Ok(());
            }
            sleep(Duration::from_millis(100)).await;
        }
        anyhow::bail!("Exporter failed to start within 10 seconds")
    }

    pub fn url(&self, path: &str) -> String {
        format!("http://127.0.0.1:{}{}", self.port, path)
    }
}

impl Drop for TestExporter {
    fn drop(&mut self) {
        let _ = self.child.kill();
        let _ = self.child.wait();
        let _ = std::fs::remove_dir_all(&self.data_dir);
    }
}

fn free_port() -> std::io::Result<u16> {
    let listener = std::net::TcpListener::bind("127.0.0.1:0")?;
    Ok(listener.local_addr()?.port())
}
