use std::io::Write;

use reuploader_core::{AssetTransport, UploadMetadata};

use crate::cli::{OutputFormat, ReuploadArgs};
use crate::client::{AppContext, CliResult};
use crate::commands::session::{SessionLog, finish_one_shot};

/// Name used when the operator does not supply one.
pub(crate) fn default_display_name(asset: &str) -> String {
    format!("Reupload_{}", asset.trim())
}

pub(crate) async fn handle_reupload<T, W>(
    ctx: &AppContext<T>,
    args: ReuploadArgs,
    out: &mut W,
) -> CliResult<()>
where
    T: AssetTransport,
    W: Write + Send,
{
    let mut log = SessionLog::new("reupload", ctx.format == OutputFormat::Table);
    for input in &args.ids {
        let display_name = args
            .name
            .clone()
            .unwrap_or_else(|| default_display_name(input));
        let metadata =
            UploadMetadata::new(display_name, args.description.clone(), args.asset_type.clone());
        log.reupload_input(&ctx.pipeline, input, &metadata, out)
            .await?;
    }
    finish_one_shot(&log.finish(&ctx.map_path), ctx.format, out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::context_for;
    use anyhow::{Result, anyhow};
    use httpmock::prelude::*;
    use reuploader_test_support::TestWorkspace;
    use serde_json::{Value, json};

    fn args(ids: &[&str]) -> ReuploadArgs {
        ReuploadArgs {
            ids: ids.iter().map(ToString::to_string).collect(),
            name: None,
            description: String::new(),
            asset_type: "Model".into(),
        }
    }

    #[test]
    fn default_name_uses_trimmed_id() {
        assert_eq!(default_display_name(" 123 "), "Reupload_123");
    }

    #[tokio::test]
    async fn reupload_records_successes_and_skips_invalid_ids() -> Result<()> {
        let server = MockServer::start_async().await;
        let download = server.mock(|when, then| {
            when.method(GET).path("/asset-delivery-api/v1/assetId/123");
            then.status(200)
                .header("content-disposition", "attachment; filename=\"sword.rbxm\"")
                .body("<roblox/>");
        });
        let upload = server.mock(|when, then| {
            when.method(POST)
                .path("/assets/v1/assets")
                .body_includes(r#""displayName":"Reupload_123""#)
                .body_includes(r#""assetType":"Model""#);
            then.status(200).json_body(json!({"assetId": 999}));
        });

        let workspace = TestWorkspace::new()?;
        let ctx = context_for(
            &server.base_url(),
            workspace.join("reupload_map.json"),
            OutputFormat::Json,
        );
        let mut out = Vec::new();
        handle_reupload(&ctx, args(&["123", "abc"]), &mut out)
            .await
            .map_err(|err| anyhow!(err.display_message()))?;

        download.assert();
        upload.assert();
        let summary: Value = serde_json::from_slice(&out)?;
        assert_eq!(summary["mode"], "reupload");
        assert_eq!(summary["mappings"], json!([{"oldId": 123, "newId": 999}]));
        assert_eq!(summary["failures"][0]["asset"], "abc");
        assert_eq!(summary["failures"][0]["kind"], "invalid_identifier");

        let artifact: Value = serde_json::from_str(&workspace.read("reupload_map.json")?)?;
        assert_eq!(artifact, json!([{"oldId": 123, "newId": 999}]));
        Ok(())
    }

    #[tokio::test]
    async fn failed_downloads_are_reported_without_writing_a_map() -> Result<()> {
        let server = MockServer::start_async().await;
        server.mock(|when, then| {
            when.method(GET).path("/asset-delivery-api/v1/assetId/5");
            then.status(404).body("asset not found");
        });
        let upload = server.mock(|when, then| {
            when.method(POST).path("/assets/v1/assets");
            then.status(200).json_body(json!({"assetId": 6}));
        });

        let workspace = TestWorkspace::new()?;
        let ctx = context_for(
            &server.base_url(),
            workspace.join("reupload_map.json"),
            OutputFormat::Table,
        );
        let mut out = Vec::new();
        handle_reupload(&ctx, args(&["5"]), &mut out)
            .await
            .map_err(|err| anyhow!(err.display_message()))?;

        upload.assert_calls(0);
        let text = String::from_utf8(out)?;
        assert!(text.contains("failed 5: download failed for asset 5"));
        assert!(text.contains("asset not found"));
        assert!(text.contains("map not written"));
        assert!(!workspace.join("reupload_map.json").exists());
        Ok(())
    }
}
