//! Connection configuration
//!
//! Settings are fixed when the display is opened. They come from code,
//! from the environment, or both.

use std::env;

/// Per-connection settings
#[derive(Debug, Clone)]
pub struct DisplayConfig {
    /// Name reported by `display_string`
    pub display_name: String,

    /// Override the host screen size (testing, headless hosts)
    pub screen_size: Option<(u16, u16)>,

    /// Sync with the host after every request
    pub synchronous: bool,

    /// Drop an Expose already covered by a queued one for the same window
    pub coalesce_expose: bool,

    /// Allow pointer grabs. When off, `grab_pointer` answers
    /// `GrabStatus::Frozen`, the closest X status to a refused grab.
    pub allow_pointer_grabs: bool,

    /// Allow keyboard grabs; refused ones answer `GrabStatus::Frozen` too
    pub allow_keyboard_grabs: bool,

    /// Allow `send_event`
    pub allow_synthetic_events: bool,

    /// Maximum live windows (0 = unlimited)
    pub max_windows: usize,

    /// Maximum live pixmaps (0 = unlimited)
    pub max_pixmaps: usize,
}

impl Default for DisplayConfig {
    fn default() -> Self {
        DisplayConfig {
            display_name: ":0".to_string(),
            screen_size: None,
            synchronous: false,
            coalesce_expose: true,
            allow_pointer_grabs: true,
            allow_keyboard_grabs: true,
            allow_synthetic_events: true,
            max_windows: 0,
            max_pixmaps: 0,
        }
    }
}

fn env_flag(name: &str) -> Option<bool> {
    let value = env::var(name).ok()?;
    match value.trim().to_ascii_lowercase().as_str() {
        "" | "0" | "false" | "no" | "off" => Some(false),
        _ => Some(true),
    }
}

impl DisplayConfig {
    /// Defaults overridden by `DISPLAY`, `XSHIM_SYNC` and `XSHIM_NO_GRABS`
    pub fn from_env() -> Self {
        let mut config = DisplayConfig::default();
        if let Ok(name) = env::var("DISPLAY") {
            if !name.is_empty() {
                config.display_name = name;
            }
        }
        if let Some(sync) = env_flag("XSHIM_SYNC") {
            config.synchronous = sync;
        }
        if let Some(true) = env_flag("XSHIM_NO_GRABS") {
            config.allow_pointer_grabs = false;
            config.allow_keyboard_grabs = false;
        }
        config
    }

    /// Nothing refused, no limits
    pub fn permissive() -> Self {
        DisplayConfig::default()
    }

    /// No grabs, no synthetic events, bounded resources
    pub fn strict() -> Self {
        DisplayConfig {
            allow_pointer_grabs: false,
            allow_keyboard_grabs: false,
            allow_synthetic_events: false,
            max_windows: 1000,
            max_pixmaps: 1000,
            ..DisplayConfig::default()
        }
    }

    pub fn with_display_name(mut self, name: &str) -> Self {
        self.display_name = name.to_string();
        self
    }

    pub fn with_screen_size(mut self, width: u16, height: u16) -> Self {
        self.screen_size = Some((width, height));
        self
    }

    pub fn with_synchronous(mut self, synchronous: bool) -> Self {
        self.synchronous = synchronous;
        self
    }

    pub fn with_expose_coalescing(mut self, enabled: bool) -> Self {
        self.coalesce_expose = enabled;
        self
    }

    pub fn with_grabs(mut self, allowed: bool) -> Self {
        self.allow_pointer_grabs = allowed;
        self.allow_keyboard_grabs = allowed;
        self
    }

    pub fn with_limits(mut self, max_windows: usize, max_pixmaps: usize) -> Self {
        self.max_windows = max_windows;
        self.max_pixmaps = max_pixmaps;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builders() {
        let config = DisplayConfig::default()
            .with_display_name(":3")
            .with_screen_size(640, 480)
            .with_grabs(false);
        assert_eq!(config.display_name, ":3");
        assert_eq!(config.screen_size, Some((640, 480)));
        assert!(!config.allow_pointer_grabs);
        assert!(!config.allow_keyboard_grabs);
        assert!(config.coalesce_expose);
    }

    #[test]
    fn test_strict_preset() {
        let config = DisplayConfig::strict();
        assert!(!config.allow_synthetic_events);
        assert_eq!(config.max_windows, 1000);
    }
}
