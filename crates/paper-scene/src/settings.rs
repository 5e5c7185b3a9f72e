/// Scope-wide engine settings.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Settings {
    /// Newly constructed items are inserted into the active layer.
    pub insert_items: bool,
    /// When `false`, `scaling` updates set the item's absolute scale instead of
    /// scaling by the ratio to the previous value.
    pub apply_matrix: bool,
    /// Size of selection handles, in view units. Stored for hosts that draw
    /// handles; the engine does not read it.
    pub handle_size: f64,
    /// Extra slack for hit testing, in view units. Stored for hosts that hit
    /// test; the engine does not read it.
    pub hit_tolerance: f64,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            insert_items: true,
            apply_matrix: true,
            handle_size: 4.0,
            hit_tolerance: 0.0,
        }
    }
}

/// Partial settings supplied by a caller; unset fields keep their current value.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct SettingsPatch {
    pub insert_items: Option<bool>,
    pub apply_matrix: Option<bool>,
    pub handle_size: Option<f64>,
    pub hit_tolerance: Option<f64>,
}

impl SettingsPatch {
    pub fn apply_to(&self, settings: &mut Settings) {
        if let Some(insert_items) = self.insert_items {
            settings.insert_items = insert_items;
        }
        if let Some(apply_matrix) = self.apply_matrix {
            settings.apply_matrix = apply_matrix;
        }
        if let Some(handle_size) = self.handle_size {
            settings.handle_size = handle_size;
        }
        if let Some(hit_tolerance) = self.hit_tolerance {
            settings.hit_tolerance = hit_tolerance;
        }
    }

    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}
