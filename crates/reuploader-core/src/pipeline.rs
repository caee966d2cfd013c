//! Per-asset reupload: fetch, publish, resolve the new identifier.
//!
//! # Design
//! - Exactly one fetch per valid id, and exactly one publish per successful fetch.
//! - The new identifier is resolved through [`NEW_ID_LOOKUPS`], evaluated in order.
//! - A fixed [`SUCCESS_PAUSE`] follows each success to stay under platform rate limits.

use std::time::Duration;

use serde_json::Value;
use tracing::{info, warn};

use crate::asset::{AssetId, UploadMetadata};
use crate::error::{PipelineError, PipelineResult};
use crate::transport::AssetTransport;

/// Pause after every successful reupload.
pub const SUCCESS_PAUSE: Duration = Duration::from_secs(1);

/// One place the upload response may carry the new asset id.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IdLookup {
    /// Label used in logs.
    pub label: &'static str,
    /// JSON pointer into the response body.
    pub pointer: &'static str,
}

/// Lookup order for the new identifier; the first usable value wins.
pub const NEW_ID_LOOKUPS: [IdLookup; 3] = [
    IdLookup {
        label: "assetId",
        pointer: "/assetId",
    },
    IdLookup {
        label: "id",
        pointer: "/id",
    },
    IdLookup {
        label: "data.assetId",
        pointer: "/data/assetId",
    },
];

impl IdLookup {
    /// Read a positive integer (JSON number or digit string) at this lookup's pointer.
    #[must_use]
    pub fn extract(&self, response: &Value) -> Option<AssetId> {
        match response.pointer(self.pointer)? {
            Value::Number(number) => number.as_u64().and_then(|raw| AssetId::try_from(raw).ok()),
            Value::String(text) => text.parse().ok(),
            _ => None,
        }
    }
}

/// Resolve the new identifier of a reupload of `old_id`, returning it with
/// the lookup that matched.
///
/// A lookup yielding `old_id` is treated like an unusable value and the next
/// lookup is tried.
#[must_use]
pub fn resolve_new_id(response: &Value, old_id: AssetId) -> Option<(AssetId, IdLookup)> {
    NEW_ID_LOOKUPS.iter().find_map(|lookup| {
        lookup
            .extract(response)
            .filter(|new_id| *new_id != old_id)
            .map(|new_id| (new_id, *lookup))
    })
}

/// Drives a transport through the reupload sequence for one asset at a time.
#[derive(Debug, Clone)]
pub struct ReuploadPipeline<T> {
    transport: T,
}

impl<T: AssetTransport> ReuploadPipeline<T> {
    /// Wrap a transport.
    #[must_use]
    pub const fn new(transport: T) -> Self {
        Self { transport }
    }

    /// Borrow the underlying transport.
    #[must_use]
    pub const fn transport(&self) -> &T {
        &self.transport
    }

    /// Reupload the asset named by the raw identifier `input`.
    ///
    /// # Errors
    ///
    /// Returns [`PipelineError::InvalidIdentifier`] without contacting the
    /// transport when `input` is not a positive integer; otherwise see
    /// [`Self::reupload_asset`].
    pub async fn reupload(
        &self,
        input: &str,
        metadata: &UploadMetadata,
    ) -> PipelineResult<AssetId> {
        let asset_id = input.parse::<AssetId>()?;
        self.reupload_asset(asset_id, metadata).await
    }

    /// Download `asset_id`, publish it with `metadata` and return the new id.
    ///
    /// # Errors
    ///
    /// Returns [`PipelineError::DownloadFailed`] or [`PipelineError::UploadFailed`]
    /// when the corresponding transport call fails, and
    /// [`PipelineError::IdentifierNotFound`] when the upload response carries no
    /// usable identifier distinct from `asset_id`.
    pub async fn reupload_asset(
        &self,
        asset_id: AssetId,
        metadata: &UploadMetadata,
    ) -> PipelineResult<AssetId> {
        info!(%asset_id, "downloading asset");
        let asset = self
            .transport
            .fetch(asset_id)
            .await
            .map_err(|source| PipelineError::DownloadFailed { asset_id, source })?;

        info!(
            %asset_id,
            filename = %asset.filename,
            display_name = %metadata.display_name,
            asset_type = %metadata.asset_type,
            "uploading asset"
        );
        let response = self
            .transport
            .publish(asset, metadata)
            .await
            .map_err(|source| PipelineError::UploadFailed { asset_id, source })?;

        let new_id = match resolve_new_id(&response, asset_id) {
            Some((new_id, lookup)) => {
                info!(
                    %asset_id,
                    new_asset_id = %new_id,
                    lookup = lookup.label,
                    "asset reuploaded"
                );
                new_id
            }
            None => {
                warn!(%asset_id, %response, "upload response has no new asset id");
                return Err(PipelineError::IdentifierNotFound {
                    asset_id,
                    response: response.to_string(),
                });
            }
        };

        tokio::time::sleep(SUCCESS_PAUSE).await;
        Ok(new_id)
    }
}

#[cfg(test)]
mod tests {
    use std::collections::VecDeque;
    use std::sync::Mutex;

    use async_trait::async_trait;
    use serde_json::json;
    use tokio::time::Instant;

    use super::*;
    use crate::asset::DownloadedAsset;
    use crate::error::{TransportError, TransportResult};

    #[derive(Default)]
    struct ScriptedTransport {
        fetches: Mutex<Vec<AssetId>>,
        publishes: Mutex<Vec<(String, UploadMetadata)>>,
        fetch_results: Mutex<VecDeque<TransportResult<DownloadedAsset>>>,
        publish_results: Mutex<VecDeque<TransportResult<Value>>>,
    }

    impl ScriptedTransport {
        fn succeeding(response: Value) -> Self {
            let transport = Self::default();
            transport.push_fetch(Ok(DownloadedAsset {
                bytes: b"<roblox/>".to_vec(),
                filename: "asset_1.rbxm".into(),
            }));
            transport.push_publish(Ok(response));
            transport
        }

        fn push_fetch(&self, result: TransportResult<DownloadedAsset>) {
            self.fetch_results.lock().expect("lock").push_back(result);
        }

        fn push_publish(&self, result: TransportResult<Value>) {
            self.publish_results.lock().expect("lock").push_back(result);
        }

        fn fetch_count(&self) -> usize {
            self.fetches.lock().expect("lock").len()
        }

        fn publish_count(&self) -> usize {
            self.publishes.lock().expect("lock").len()
        }
    }

    #[async_trait]
    impl AssetTransport for ScriptedTransport {
        async fn fetch(&self, asset_id: AssetId) -> TransportResult<DownloadedAsset> {
            self.fetches.lock().expect("lock").push(asset_id);
            self.fetch_results
                .lock()
                .expect("lock")
                .pop_front()
                .expect("unexpected fetch")
        }

        async fn publish(
            &self,
            asset: DownloadedAsset,
            metadata: &UploadMetadata,
        ) -> TransportResult<Value> {
            self.publishes
                .lock()
                .expect("lock")
                .push((asset.filename, metadata.clone()));
            self.publish_results
                .lock()
                .expect("lock")
                .pop_front()
                .expect("unexpected publish")
        }
    }

    fn metadata() -> UploadMetadata {
        UploadMetadata::new("Reupload_1", "", "Model")
    }

    fn id(value: u64) -> AssetId {
        AssetId::try_from(value).expect("non-zero id")
    }

    #[test]
    fn lookup_precedence_is_asset_id_then_id_then_nested() {
        let resolve = |value: Value| {
            resolve_new_id(&value, id(1_000)).map(|(id, lookup)| (id.get(), lookup.label))
        };

        assert_eq!(resolve(json!({"assetId": 999})), Some((999, "assetId")));
        assert_eq!(resolve(json!({"id": 5})), Some((5, "id")));
        assert_eq!(resolve(json!({"data": {"assetId": 7}})), Some((7, "data.assetId")));
        assert_eq!(
            resolve(json!({"assetId": 1, "id": 2, "data": {"assetId": 3}})),
            Some((1, "assetId"))
        );
        assert_eq!(resolve(json!({"id": 2, "data": {"assetId": 3}})), Some((2, "id")));
        assert_eq!(resolve(json!({"foo": "bar"})), None);
    }

    #[test]
    fn lookup_accepts_digit_strings_and_skips_unusable_values() {
        let resolve = |value: Value| resolve_new_id(&value, id(1_000)).map(|(id, _)| id.get());

        assert_eq!(resolve(json!({"assetId": "123"})), Some(123));
        assert_eq!(resolve(json!({"assetId": 0, "id": 5})), Some(5));
        assert_eq!(resolve(json!({"assetId": null, "id": 6})), Some(6));
        assert_eq!(resolve(json!({"assetId": "abc", "data": {"assetId": 8}})), Some(8));
        assert_eq!(resolve(json!({"assetId": -4})), None);
        assert_eq!(resolve(json!({"assetId": 1.5})), None);
        assert_eq!(resolve(json!([1, 2, 3])), None);
    }

    #[tokio::test(start_paused = true)]
    async fn successful_reupload_fetches_and_publishes_once() {
        let transport = ScriptedTransport::succeeding(json!({"assetId": 999}));
        let pipeline = ReuploadPipeline::new(transport);

        let started = Instant::now();
        let new_id = pipeline
            .reupload("123", &metadata())
            .await
            .expect("reupload succeeds");

        assert_eq!(new_id.get(), 999);
        assert_eq!(pipeline.transport().fetch_count(), 1);
        assert_eq!(pipeline.transport().publish_count(), 1);
        assert!(started.elapsed() >= SUCCESS_PAUSE);

        let publishes = pipeline.transport().publishes.lock().expect("lock");
        assert_eq!(publishes[0].0, "asset_1.rbxm");
        assert_eq!(publishes[0].1, metadata());
    }

    #[tokio::test(start_paused = true)]
    async fn invalid_identifiers_never_reach_the_transport() {
        let pipeline = ReuploadPipeline::new(ScriptedTransport::default());
        for input in ["abc", "0", "-12", "", "12.5"] {
            let err = pipeline
                .reupload(input, &metadata())
                .await
                .expect_err("invalid id");
            assert!(matches!(err, PipelineError::InvalidIdentifier(_)), "{input}");
        }
        assert_eq!(pipeline.transport().fetch_count(), 0);
        assert_eq!(pipeline.transport().publish_count(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn download_failure_skips_publish_and_pause() {
        let transport = ScriptedTransport::default();
        transport.push_fetch(Err(TransportError::download(
            Some(404),
            "status 404 Not Found: missing",
        )));
        let pipeline = ReuploadPipeline::new(transport);

        let started = Instant::now();
        let err = pipeline
            .reupload("123", &metadata())
            .await
            .expect_err("download fails");

        assert!(matches!(
            err,
            PipelineError::DownloadFailed { asset_id, ref source } if asset_id == id(123) && source.status == Some(404)
        ));
        assert_eq!(pipeline.transport().publish_count(), 0);
        assert!(started.elapsed() < SUCCESS_PAUSE);
    }

    #[tokio::test(start_paused = true)]
    async fn upload_failure_is_reported_once() {
        let transport = ScriptedTransport::default();
        transport.push_fetch(Ok(DownloadedAsset {
            bytes: vec![1, 2, 3],
            filename: "asset_5.bin".into(),
        }));
        transport.push_publish(Err(TransportError::upload(Some(403), "status 403 Forbidden: no")));
        let pipeline = ReuploadPipeline::new(transport);

        let err = pipeline
            .reupload("5", &metadata())
            .await
            .expect_err("upload fails");

        assert!(matches!(err, PipelineError::UploadFailed { .. }));
        assert_eq!(pipeline.transport().fetch_count(), 1);
        assert_eq!(pipeline.transport().publish_count(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn unrecognised_response_shape_is_identifier_not_found() {
        let pipeline = ReuploadPipeline::new(ScriptedTransport::succeeding(json!({"foo": "bar"})));

        let err = pipeline
            .reupload("123", &metadata())
            .await
            .expect_err("no id in response");

        match err {
            PipelineError::IdentifierNotFound { asset_id, response } => {
                assert_eq!(asset_id, id(123));
                assert_eq!(response, r#"{"foo":"bar"}"#);
            }
            other => panic!("unexpected error {other:?}"),
        }
    }

    #[tokio::test(start_paused = true)]
    async fn same_identifier_in_response_is_rejected() {
        let pipeline = ReuploadPipeline::new(ScriptedTransport::succeeding(json!({"assetId": 123})));

        let err = pipeline
            .reupload("123", &metadata())
            .await
            .expect_err("new id must differ");

        assert!(matches!(err, PipelineError::IdentifierNotFound { .. }));
    }

    #[test]
    fn lookup_equal_to_source_falls_through_to_next() {
        let resolve = |value: Value| {
            resolve_new_id(&value, id(123)).map(|(id, lookup)| (id.get(), lookup.label))
        };

        assert_eq!(resolve(json!({"assetId": 123, "id": 456})), Some((456, "id")));
        assert_eq!(
            resolve(json!({"assetId": "123", "id": 123, "data": {"assetId": 789}})),
            Some((789, "data.assetId"))
        );
        assert_eq!(resolve(json!({"id": 123})), None);
    }

    #[tokio::test(start_paused = true)]
    async fn source_id_in_first_lookup_still_resolves_later_lookup() {
        let pipeline = ReuploadPipeline::new(ScriptedTransport::succeeding(
            json!({"assetId": 123, "id": 456}),
        ));

        let new_id = pipeline
            .reupload("123", &metadata())
            .await
            .expect("id lookup supplies a distinct identifier");

        assert_eq!(new_id, id(456));
    }
}
