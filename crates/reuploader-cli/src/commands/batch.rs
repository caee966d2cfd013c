use std::collections::BTreeSet;
use std::io::Write;

use reuploader_core::{AssetId, AssetTransport, ReferenceScanner, ReuploadPipeline, UploadMetadata};

use crate::cli::{BatchArgs, OutputFormat};
use crate::client::{AppContext, CliResult, output_error};
use crate::commands::scan::scan_scene;
use crate::commands::session::{SessionLog, finish_one_shot};

/// Metadata shared by every asset of a scene batch.
#[derive(Debug, Clone)]
pub(crate) struct BatchRequest {
    pub(crate) prefix: String,
    pub(crate) description: String,
    pub(crate) asset_type: String,
}

impl BatchRequest {
    /// Display name is `<prefix><id>`.
    pub(crate) fn metadata_for(&self, asset_id: AssetId) -> UploadMetadata {
        UploadMetadata::new(
            format!("{}{asset_id}", self.prefix),
            self.description.clone(),
            self.asset_type.clone(),
        )
    }
}

/// Reupload `ids` in ascending order, one at a time.
pub(crate) async fn run_batch<T, W>(
    pipeline: &ReuploadPipeline<T>,
    ids: &BTreeSet<AssetId>,
    request: &BatchRequest,
    log: &mut SessionLog,
    out: &mut W,
) -> CliResult<()>
where
    T: AssetTransport,
    W: Write + Send,
{
    for &asset_id in ids {
        log.reupload(pipeline, asset_id, &request.metadata_for(asset_id), out)
            .await?;
    }
    Ok(())
}

pub(crate) async fn handle_batch<T, W>(
    ctx: &AppContext<T>,
    args: BatchArgs,
    out: &mut W,
) -> CliResult<()>
where
    T: AssetTransport,
    W: Write + Send,
{
    let echo = ctx.format == OutputFormat::Table;
    let scan = scan_scene(&ReferenceScanner::new(args.marker), &args.scene)?;
    if echo {
        writeln!(
            out,
            "found {} {} reference(s) in {}",
            scan.ids.len(),
            scan.marker,
            scan.scene.display()
        )
        .map_err(output_error)?;
    }

    let request = BatchRequest {
        prefix: args.prefix,
        description: args.description,
        asset_type: args.asset_type,
    };
    let mut log = SessionLog::new("batch", echo);
    if let Some(reason) = &scan.parse_error {
        log.scene_unparsed(reason);
    }
    run_batch(&ctx.pipeline, &scan.ids, &request, &mut log, out).await?;
    finish_one_shot(&log.finish(&ctx.map_path), ctx.format, out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::context_for;
    use anyhow::{Result, anyhow};
    use httpmock::prelude::*;
    use reuploader_test_support::TestWorkspace;
    use reuploader_test_support::fixtures::{
        MALFORMED_SCENE, SCENE_WITH_ANIMATIONS, SCENE_WITHOUT_REFERENCES,
    };
    use serde_json::{Value, json};
    use std::path::PathBuf;

    fn args(scene: PathBuf) -> BatchArgs {
        BatchArgs {
            scene,
            prefix: "Anim_".into(),
            description: String::new(),
            asset_type: "Animation".into(),
            marker: "AnimationId".into(),
        }
    }

    #[test]
    fn metadata_uses_prefix_and_keeps_type() {
        let request = BatchRequest {
            prefix: "Anim_".into(),
            description: "walk cycle".into(),
            asset_type: "Animation".into(),
        };
        let metadata = request.metadata_for(AssetId::try_from(42).expect("non-zero"));
        assert_eq!(metadata.display_name, "Anim_42");
        assert_eq!(metadata.description, "walk cycle");
        assert_eq!(metadata.asset_type, "Animation");
    }

    #[tokio::test]
    async fn scene_batch_processes_ids_in_ascending_order() -> Result<()> {
        let server = MockServer::start_async().await;
        let mut uploads = Vec::new();
        for (old_id, new_id) in [(12_345_u64, 500_001_u64), (4_827_491, 500_002)] {
            server.mock(move |when, then| {
                when.method(GET)
                    .path(format!("/asset-delivery-api/v1/assetId/{old_id}"));
                then.status(200)
                    .header("content-type", "application/xml")
                    .body("<roblox/>");
            });
            uploads.push(server.mock(move |when, then| {
                when.method(POST)
                    .path("/assets/v1/assets")
                    .body_includes(format!(r#""displayName":"Anim_{old_id}""#))
                    .body_includes(r#""assetType":"Animation""#)
                    .body_includes(format!(r#"filename="asset_{old_id}.rbxm""#));
                then.status(200).json_body(json!({"assetId": new_id}));
            }));
        }

        let workspace = TestWorkspace::new()?;
        let scene = workspace.write("rig.rbxmx", SCENE_WITH_ANIMATIONS)?;
        let ctx = context_for(
            &server.base_url(),
            workspace.join("reupload_map.json"),
            OutputFormat::Table,
        );
        let mut out = Vec::new();
        handle_batch(&ctx, args(scene), &mut out)
            .await
            .map_err(|err| anyhow!(err.display_message()))?;

        for upload in &uploads {
            upload.assert();
        }
        let text = String::from_utf8(out)?;
        assert!(text.contains("found 2 AnimationId reference(s)"));
        let first = text.find("reuploaded 12345 -> 500001");
        let second = text.find("reuploaded 4827491 -> 500002");
        assert!(first.is_some() && second.is_some() && first < second);

        let artifact: Value = serde_json::from_str(&workspace.read("reupload_map.json")?)?;
        assert_eq!(
            artifact,
            json!([
                {"oldId": 12_345, "newId": 500_001},
                {"oldId": 4_827_491, "newId": 500_002}
            ])
        );
        Ok(())
    }

    #[tokio::test]
    async fn scene_without_references_makes_no_requests() -> Result<()> {
        let server = MockServer::start_async().await;
        let workspace = TestWorkspace::new()?;
        let scene = workspace.write("empty.rbxmx", SCENE_WITHOUT_REFERENCES)?;
        let ctx = context_for(
            &server.base_url(),
            workspace.join("reupload_map.json"),
            OutputFormat::Json,
        );
        let mut out = Vec::new();
        handle_batch(&ctx, args(scene), &mut out)
            .await
            .map_err(|err| anyhow!(err.display_message()))?;

        let summary: Value = serde_json::from_slice(&out)?;
        assert_eq!(summary["mappings"], json!([]));
        assert_eq!(summary["failures"], json!([]));
        assert!(summary.get("mapFile").is_none());
        Ok(())
    }

    #[tokio::test]
    async fn unparsable_scene_is_reported_in_json_summary() -> Result<()> {
        let server = MockServer::start_async().await;
        let workspace = TestWorkspace::new()?;
        let scene = workspace.write("broken.rbxmx", MALFORMED_SCENE)?;
        let ctx = context_for(
            &server.base_url(),
            workspace.join("reupload_map.json"),
            OutputFormat::Json,
        );
        let mut out = Vec::new();
        handle_batch(&ctx, args(scene.clone()), &mut out)
            .await
            .map_err(|err| anyhow!(err.display_message()))?;

        let summary: Value = serde_json::from_slice(&out)?;
        assert_eq!(summary["mappings"], json!([]));
        assert!(summary["parseError"].is_string());

        let ctx = context_for(
            &server.base_url(),
            workspace.join("reupload_map.json"),
            OutputFormat::Table,
        );
        let mut out = Vec::new();
        handle_batch(&ctx, args(scene), &mut out)
            .await
            .map_err(|err| anyhow!(err.display_message()))?;
        let text = String::from_utf8(out)?;
        assert!(text.contains("found 0 AnimationId reference(s)"));
        assert!(text.contains("scene not parsed:"));
        Ok(())
    }
}
