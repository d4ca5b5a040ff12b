use serde::{Deserialize, Serialize};

// API: GET/PUT /tracking/settings/{id}
#[derive(Clone, PartialEq, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct TrackingSettings {
    pub tmc_measurement_mode: i64,
    pub tmc_inclination_mode: i64,
    pub edm_measurement_mode: i64,
    pub prism_type: i64,
    pub fine_adjust_position_mode: i64,
    pub fine_adjust_horizontal_search_range: f64, // In radians
    pub fine_adjust_vertical_search_range: f64,   // In radians
    pub power_search_area_dcenterhz: f64,
    pub power_search_area_dcenterv: f64,
    pub power_search_area_drangehz: f64,
    pub power_search_area_drangev: f64,
    pub power_search_area_enabled: i64,
    pub power_search_min_range: i64, // In meters
    pub power_search_max_range: i64, // In meters
    pub power_search: bool,
}

impl Default for TrackingSettings {
    fn default() -> Self {
        TrackingSettings {
            tmc_measurement_mode: 1,
            tmc_inclination_mode: 1,
            edm_measurement_mode: 9,
            prism_type: 3,
            fine_adjust_position_mode: 1,
            fine_adjust_horizontal_search_range: 0.0872,
            fine_adjust_vertical_search_range: 0.0872,
            power_search_area_dcenterhz: 0.0,
            power_search_area_dcenterv: 1.5708,
            power_search_area_drangehz: 6.283,
            power_search_area_drangev: 0.6,
            power_search_area_enabled: 1,
            power_search_min_range: 1,
            power_search_max_range: 50,
            power_search: true,
        }
    }
}

#[derive(Clone, Copy, PartialEq, Eq, Debug, Serialize)]
pub struct SettingOption {
    pub label: &'static str,
    pub value: i64,
}

const fn option(label: &'static str, value: i64) -> SettingOption {
    SettingOption { label, value }
}

pub const MEASUREMENT_MODE_OPTIONS: &[SettingOption] = &[option("Default Distance", 1), option("Distance Tracking", 2)];

pub const INCLINATION_MODE_OPTIONS: &[SettingOption] = &[option("Use Sensor", 0), option("Automatic", 1), option("Use Plane", 2)];

pub const EDM_MEASUREMENT_MODE_OPTIONS: &[SettingOption] = &[
    option("Continuous Standard", 6),
    option("Continuous Dynamic", 7),
    option("Continuous Reflectorless", 8),
    option("Continuous Fast", 9),
];

pub const PRISM_TYPE_OPTIONS: &[SettingOption] = &[
    option("Leica Round", 0),
    option("Leica Mini", 1),
    option("Leica Tape", 2),
    option("Leica 360", 3),
    option("Leica 360 Mini", 7),
    option("Leica Mini Zero", 8),
    option("Leica NDS Tape", 10),
    option("Leica GRZ121 Round", 11),
    option("Leica MPR122", 12),
    option("User Defined 1", 4),
    option("User Defined 2", 5),
    option("User Defined 3", 6),
    option("User Defined", 9),
];

pub fn is_option(options: &[SettingOption], value: i64) -> bool {
    options.iter().any(|option| option.value == value)
}

/// The choices for every enumerated field of the form, for building dropdowns.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Serialize)]
pub struct SettingOptions {
    pub measurement_mode: &'static [SettingOption],
    pub inclination_mode: &'static [SettingOption],
    pub edm_mode: &'static [SettingOption],
    pub prism_type: &'static [SettingOption],
}

impl Default for SettingOptions {
    fn default() -> Self {
        SettingOptions {
            measurement_mode: MEASUREMENT_MODE_OPTIONS,
            inclination_mode: INCLINATION_MODE_OPTIONS,
            edm_mode: EDM_MEASUREMENT_MODE_OPTIONS,
            prism_type: PRISM_TYPE_OPTIONS,
        }
    }
}

/// The subset of tracking settings an operator can edit.
#[derive(Clone, PartialEq, Debug, Deserialize)]
pub struct TrackingSettingsForm {
    pub measurement_mode: i64,
    pub inclination_mode: i64,
    pub edm_mode: i64,
    pub prism_type: i64,
    pub fine_adjust_horizontal_search_range: f64,
    pub fine_adjust_vertical_search_range: f64,
    pub power_search_range: i64,
    pub power_search_enabled: bool,
}

impl TrackingSettingsForm {
    /// Every field the form does not cover is sent with its default value.
    pub fn into_settings(self) -> TrackingSettings {
        TrackingSettings {
            tmc_measurement_mode: self.measurement_mode,
            tmc_inclination_mode: self.inclination_mode,
            edm_measurement_mode: self.edm_mode,
            prism_type: self.prism_type,
            fine_adjust_horizontal_search_range: self.fine_adjust_horizontal_search_range,
            fine_adjust_vertical_search_range: self.fine_adjust_vertical_search_range,
            power_search_max_range: self.power_search_range,
            power_search: self.power_search_enabled,
            ..TrackingSettings::default()
        }
    }
}

impl From<&TrackingSettings> for TrackingSettingsForm {
    fn from(settings: &TrackingSettings) -> Self {
        TrackingSettingsForm {
            measurement_mode: settings.tmc_measurement_mode,
            inclination_mode: settings.tmc_inclination_mode,
            edm_mode: settings.edm_measurement_mode,
            prism_type: settings.prism_type,
            fine_adjust_horizontal_search_range: settings.fine_adjust_horizontal_search_range,
            fine_adjust_vertical_search_range: settings.fine_adjust_vertical_search_range,
            power_search_range: settings.power_search_max_range,
            power_search_enabled: settings.power_search,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn missing_fields_fall_back_to_defaults() -> Result<(), serde_json::Error> {
        let settings: TrackingSettings = serde_json::from_str(r#"{"prism_type": 7, "power_search": false}"#)?;

        assert_eq!(
            settings,
            TrackingSettings {
                prism_type: 7,
                power_search: false,
                ..TrackingSettings::default()
            }
        );
        Ok(())
    }

    #[test]
    fn setting_options_serialize_with_labels() -> Result<(), serde_json::Error> {
        let options = serde_json::to_value(SettingOptions::default())?;

        assert_eq!(
            options["measurement_mode"],
            serde_json::json!([{"label": "Default Distance", "value": 1}, {"label": "Distance Tracking", "value": 2}])
        );
        assert_eq!(options["prism_type"].as_array().map(Vec::len), Some(PRISM_TYPE_OPTIONS.len()));
        Ok(())
    }

    #[test]
    fn defaults_are_valid_options() {
        let settings = TrackingSettings::default();

        assert!(is_option(MEASUREMENT_MODE_OPTIONS, settings.tmc_measurement_mode));
        assert!(is_option(INCLINATION_MODE_OPTIONS, settings.tmc_inclination_mode));
        assert!(is_option(EDM_MEASUREMENT_MODE_OPTIONS, settings.edm_measurement_mode));
        assert!(is_option(PRISM_TYPE_OPTIONS, settings.prism_type));
    }

    #[test]
    fn form_resets_unexposed_fields_to_defaults() {
        let fetched = TrackingSettings {
            prism_type: 1,
            power_search_min_range: 5,
            power_search_area_drangev: 1.2,
            ..TrackingSettings::default()
        };

        let mut form = TrackingSettingsForm::from(&fetched);
        form.power_search_range = 120;
        let settings = form.into_settings();

        assert_eq!(settings.prism_type, 1);
        assert_eq!(settings.power_search_max_range, 120);
        assert_eq!(settings.power_search_min_range, 1);
        assert_eq!(settings.power_search_area_drangev, 0.6);
    }
}
