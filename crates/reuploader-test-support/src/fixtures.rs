//! Canned scene documents and configuration bodies.

use serde_json::{Value, json};

/// Scene with two animation references (one prefixed, one bare), a duplicate,
/// a non-numeric value and an unrelated sound reference.
pub const SCENE_WITH_ANIMATIONS: &str = r#"<roblox version="4">
  <Item class="Model" referent="RBX0">
    <Properties>
      <string name="Name">Rig</string>
    </Properties>
    <Item class="Animation" referent="RBX1">
      <Properties>
        <Content name="AnimationId"><url>rbxassetid://4827491</url></Content>
        <string name="Name">Walk</string>
      </Properties>
    </Item>
    <Item class="Animation" referent="RBX2">
      <Properties>
        <Content name="AnimationId">12345</Content>
      </Properties>
    </Item>
    <Item class="Animation" referent="RBX3">
      <Properties>
        <Content name="AnimationId"><url>rbxassetid://4827491</url></Content>
      </Properties>
    </Item>
    <Item class="Animation" referent="RBX4">
      <Properties>
        <Content name="AnimationId">notanumber</Content>
      </Properties>
    </Item>
    <Item class="Sound" referent="RBX5">
      <Properties>
        <Content name="SoundId"><url>rbxassetid://777</url></Content>
      </Properties>
    </Item>
  </Item>
</roblox>
"#;

/// Scene with no asset references at all.
pub const SCENE_WITHOUT_REFERENCES: &str = r#"<roblox version="4">
  <Item class="Part" referent="RBX0">
    <Properties>
      <string name="Name">Baseplate</string>
    </Properties>
  </Item>
</roblox>
"#;

/// Document whose tags do not balance.
pub const MALFORMED_SCENE: &str = r#"<roblox><Item class="Animation"><Properties>
<Content name="AnimationId">123</string></Properties></Item></roblox>"#;

/// Configuration body pointing both endpoints at a mock server.
#[must_use]
pub fn config_for_server(base_url: &str) -> Value {
    json!({
        "x_api_key": "test-key",
        "roblosecurity": null,
        "download_endpoint": format!("{base_url}/asset-delivery-api/v1/assetId/{{assetId}}"),
        "upload_endpoint": format!("{base_url}/assets/v1/assets"),
        "download_timeout_secs": 5,
        "upload_timeout_secs": 5
    })
}
