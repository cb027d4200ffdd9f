use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// Presentation bundle bound to a state.
///
/// The binder hands this to the presentation service on every committed
/// transition; the core never interprets the identifiers beyond the layout
/// availability check.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StateDescriptor {
    /// Layout identifier resolved by the presentation service.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub layout: Option<String>,
    /// View slot receiving the title text.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title_view_id: Option<String>,
    /// View slot receiving the subtitle text.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub subtitle_view_id: Option<String>,
    /// View slot receiving the elapsed-time readout.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timer_view_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub subtitle: Option<String>,
    #[serde(default)]
    pub location_enabled: bool,
    #[serde(default)]
    pub sounds_enabled: bool,
    /// Free-form text bindings, keyed by view slot.
    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    pub view_data: HashMap<String, String>,
    /// Action buttons, in display order.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub buttons: Vec<DescriptorButton>,
}

/// One actionable button inside a descriptor.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DescriptorButton {
    /// View slot the button is rendered into.
    pub view_id: String,
    /// Action identifier delivered back when the button is pressed.
    pub action: String,
    /// Extra key/value pairs forwarded with the action.
    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    pub extras: HashMap<String, String>,
}

impl StateDescriptor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_layout(mut self, layout: impl Into<String>) -> Self {
        self.layout = Some(layout.into());
        self
    }

    pub fn with_title_view_id(mut self, id: impl Into<String>) -> Self {
        self.title_view_id = Some(id.into());
        self
    }

    pub fn with_subtitle_view_id(mut self, id: impl Into<String>) -> Self {
        self.subtitle_view_id = Some(id.into());
        self
    }

    pub fn with_timer_view_id(mut self, id: impl Into<String>) -> Self {
        self.timer_view_id = Some(id.into());
        self
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn with_subtitle(mut self, subtitle: impl Into<String>) -> Self {
        self.subtitle = Some(subtitle.into());
        self
    }

    pub fn with_location_enabled(mut self, enabled: bool) -> Self {
        self.location_enabled = enabled;
        self
    }

    pub fn with_sounds_enabled(mut self, enabled: bool) -> Self {
        self.sounds_enabled = enabled;
        self
    }

    pub fn with_view_data(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.view_data.insert(key.into(), value.into());
        self
    }

    pub fn with_button(mut self, button: DescriptorButton) -> Self {
        self.buttons.push(button);
        self
    }
}

impl DescriptorButton {
    pub fn new(view_id: impl Into<String>, action: impl Into<String>) -> Self {
        Self {
            view_id: view_id.into(),
            action: action.into(),
            extras: HashMap::new(),
        }
    }

    pub fn with_extra(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.extras.insert(key.into(), value.into());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builder_fills_all_fields() {
        let desc = StateDescriptor::new()
            .with_layout("presence_online")
            .with_title_view_id("txt_status")
            .with_subtitle_view_id("txt_detail")
            .with_timer_view_id("txt_timer")
            .with_title("Available")
            .with_subtitle("Waiting for assignments")
            .with_location_enabled(true)
            .with_sounds_enabled(false)
            .with_view_data("txt_zone", "downtown")
            .with_button(DescriptorButton::new("btn_stop", "presence.stop"));

        assert_eq!(desc.layout.as_deref(), Some("presence_online"));
        assert_eq!(desc.title.as_deref(), Some("Available"));
        assert!(desc.location_enabled);
        assert!(!desc.sounds_enabled);
        assert_eq!(desc.view_data.get("txt_zone").map(String::as_str), Some("downtown"));
        assert_eq!(desc.buttons.len(), 1);
    }

    #[test]
    fn serde_skips_empty_fields() {
        let desc = StateDescriptor::new().with_title("Busy");
        let json = serde_json::to_string(&desc).unwrap();

        assert!(json.contains("title"));
        assert!(!json.contains("layout"));
        assert!(!json.contains("viewData"));
        assert!(!json.contains("buttons"));
    }

    #[test]
    fn serde_roundtrip_with_buttons() {
        let desc = StateDescriptor::new()
            .with_layout("presence_arrived")
            .with_button(
                DescriptorButton::new("btn_complete", "presence.complete")
                    .with_extra("assignment", "a-42"),
            );

        let json = serde_json::to_string(&desc).unwrap();
        let back: StateDescriptor = serde_json::from_str(&json).unwrap();
        assert_eq!(back, desc);
    }
}
