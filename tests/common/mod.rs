use std::fs;
use std::path::PathBuf;
use std::sync::Arc;

use securedoc::config::GatewayConfig;
use securedoc::gateway::{DocumentGateway, HttpGateway};
use tempfile::TempDir;

pub const TOKEN: &str = "test-token";

/// Gateway pointing at a mock server, authenticated with [`TOKEN`]
#[allow(dead_code)]
pub fn gateway_for(base_url: &str) -> HttpGateway {
    let config = GatewayConfig {
        base_url: base_url.to_string(),
        timeout_seconds: 5,
    };
    HttpGateway::new(&config, Some(TOKEN.to_string())).expect("valid gateway config")
}

#[allow(dead_code)]
pub fn shared_gateway(base_url: &str) -> Arc<dyn DocumentGateway> {
    Arc::new(gateway_for(base_url))
}

#[allow(dead_code)]
pub fn documents_json(docs: &[(&str, &str, bool)]) -> serde_json::Value {
    let documents: Vec<_> = docs
        .iter()
        .map(|(id, name, encrypted)| {
            serde_json::json!({
                "_id": id,
                "fileName": name,
                "encrypted": encrypted,
                "path": format!("https://bucket.example.com/{}", name),
            })
        })
        .collect();
    serde_json::json!({ "documents": documents })
}

#[allow(dead_code)]
pub fn temp_file(dir: &TempDir, name: &str, contents: &[u8]) -> PathBuf {
    let path = dir.path().join(name);
    fs::write(&path, contents).expect("failed to write test file");
    path
}

#[allow(dead_code)]
pub fn temp_config_file(contents: &str) -> (TempDir, PathBuf) {
    let temp_dir = TempDir::new().expect("failed to create tempdir");
    let config_path = temp_dir.path().join("config.yaml");
    fs::write(&config_path, contents).expect("failed to write config file");
    (temp_dir, config_path)
}
