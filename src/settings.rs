//! Game settings and preferences
//!
//! Populated once by the outer UI layer and handed to the simulation, which
//! reads it but never queries UI state mid-frame.

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Quality preset levels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub enum QualityPreset {
    Low,
    #[default]
    Medium,
    High,
}

impl QualityPreset {
    pub fn as_str(&self) -> &'static str {
        match self {
            QualityPreset::Low => "Low",
            QualityPreset::Medium => "Medium",
            QualityPreset::High => "High",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "low" => Some(QualityPreset::Low),
            "medium" | "med" => Some(QualityPreset::Medium),
            "high" => Some(QualityPreset::High),
            _ => None,
        }
    }

    /// Maximum particles for this preset
    pub fn max_particles(&self) -> usize {
        match self {
            QualityPreset::Low => 100,
            QualityPreset::Medium => 500,
            QualityPreset::High => 1000,
        }
    }
}

/// Game settings/preferences
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Settings {
    /// Graphics quality preset
    pub quality: QualityPreset,
    /// Particle effects (explosions, sparks, trails)
    pub particles: bool,
    /// Fire continuously without holding the attack input
    pub auto_fire: bool,
    /// Debug: skills ignore their cooldown
    pub remove_skill_cooldown: bool,
    /// Damage dealt to the player per contact with an enemy body
    pub contact_damage: f32,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            quality: QualityPreset::Medium,
            particles: true,
            auto_fire: true,
            remove_skill_cooldown: false,
            contact_damage: 1.0,
        }
    }
}

impl Settings {
    /// Create settings from a quality preset
    pub fn from_preset(preset: QualityPreset) -> Self {
        Self {
            quality: preset,
            ..Self::default()
        }
    }

    /// Effective particle count cap
    pub fn max_particles(&self) -> usize {
        if !self.particles {
            0
        } else {
            self.quality.max_particles()
        }
    }

    /// Parse settings from JSON, filling missing fields with defaults
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let settings: Settings = serde_json::from_str(json)?;
        if !settings.contact_damage.is_finite() || settings.contact_damage < 0.0 {
            return Err(ConfigError::invalid(
                "contactDamage",
                "must be a finite, non-negative number",
            ));
        }
        log::info!(
            "Loaded settings (quality {}, auto fire {})",
            settings.quality.as_str(),
            settings.auto_fire
        );
        Ok(settings)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_particles_disabled_caps_to_zero() {
        let settings = Settings {
            particles: false,
            ..Settings::default()
        };
        assert_eq!(settings.max_particles(), 0);
        assert_eq!(Settings::from_preset(QualityPreset::High).max_particles(), 1000);
    }

    #[test]
    fn test_from_json_partial() {
        let settings = Settings::from_json(r#"{"quality":"low","removeSkillCooldown":true}"#)
            .expect("valid settings");
        assert_eq!(settings.quality, QualityPreset::Low);
        assert!(settings.remove_skill_cooldown);
        assert!(settings.auto_fire);
    }

    #[test]
    fn test_from_json_rejects_unknown_preset() {
        assert!(matches!(
            Settings::from_json(r#"{"quality":"ultra"}"#),
            Err(ConfigError::Parse(_))
        ));
        assert!(matches!(
            Settings::from_json(r#"{"contactDamage":-2}"#),
            Err(ConfigError::Invalid { .. })
        ));
    }

    #[test]
    fn test_preset_round_trip_names() {
        assert_eq!(QualityPreset::from_str("MED"), Some(QualityPreset::Medium));
        assert_eq!(QualityPreset::from_str("nope"), None);
    }
}
