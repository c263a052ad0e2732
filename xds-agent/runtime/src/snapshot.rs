use crate::{api::discovery::DiscoveryResponse, core::SharedPolicyStore, lds};
use anyhow::{Context, Result};
use prost::Message;
use std::path::Path;
use tracing::info;

/// Resolves the listener policy carried by an encoded `DiscoveryResponse`
/// file into `store`.
pub(crate) async fn apply_file(path: &Path, store: &SharedPolicyStore) -> Result<()> {
    let bytes = tokio::fs::read(path)
        .await
        .with_context(|| format!("failed to read {}", path.display()))?;
    let rsp = DiscoveryResponse::decode(bytes.as_slice())
        .with_context(|| format!("invalid discovery response in {}", path.display()))?;

    let listeners = lds::apply(&rsp, store);
    let routes = lds::route_config_names(&listeners);
    let store = store.read();
    info!(
        version = %rsp.version_info,
        listeners = listeners.len(),
        ?routes,
        identities = store.identities.len(),
        ip_blocks = store.ip_blocks.len(),
        jwt_auths = store.jwt_auths.len(),
        targets = store.targets.len(),
        headers = store.headers.len(),
        jwt_providers = store.jwt_providers.len(),
        "Applied listener snapshot"
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        api::{listener::Listener, pack, Resource},
        core::PolicyStore,
    };
    use std::io::Write;

    #[tokio::test]
    async fn applies_snapshot_file() {
        let rsp = DiscoveryResponse {
            version_info: "1".to_string(),
            resources: vec![pack(&Listener {
                name: lds::VIRTUAL_INBOUND.to_string(),
                filter_chains: vec![],
            })],
            type_url: Listener::TYPE_URL.to_string(),
            nonce: String::new(),
        };
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(&rsp.encode_to_vec()).unwrap();

        let store = PolicyStore::shared();
        apply_file(file.path(), &store).await.expect("must apply");
        assert!(store.read().is_empty());
    }

    #[tokio::test]
    async fn rejects_garbage() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(&[0xff, 0xff, 0xff]).unwrap();
        let store = PolicyStore::shared();
        assert!(apply_file(file.path(), &store).await.is_err());
    }
}
