use crate::errors::*;

/// The setup parameters of the render system.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderSystemParams {
    /// Flips the winding of every culled or stencilled polygon, used when
    /// rendering mirrored geometry.
    pub invert_vertex_winding: bool,
    /// Splits fixed-function passes that use more texture units than the
    /// hardware has.
    pub auto_manage_texture_units: bool,
    /// Creates a constant slot for every unknown parameter name on first use.
    pub auto_add_param_name: bool,
    /// Overrides the probed number of fixed-function texture units.
    pub fixed_function_texture_units: Option<usize>,
    /// Size of the checkerboard texture bound in place of missing textures.
    pub warning_texture_size: u32,
    /// Number of multisample samples of the main window, 0 disables.
    pub fsaa: u32,
    /// Provisions pooled depth/stencil buffers for render textures.
    pub depth_buffer_pool: bool,
}

impl Default for RenderSystemParams {
    fn default() -> Self {
        RenderSystemParams {
            invert_vertex_winding: false,
            auto_manage_texture_units: true,
            auto_add_param_name: true,
            fixed_function_texture_units: None,
            warning_texture_size: 8,
            fsaa: 0,
            depth_buffer_pool: true,
        }
    }
}

impl RenderSystemParams {
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn json() {
        let params = RenderSystemParams::from_json(r#"{ "fsaa": 4 }"#).unwrap();
        assert_eq!(params.fsaa, 4);
        assert!(params.auto_manage_texture_units);

        let json = params.to_json().unwrap();
        assert_eq!(RenderSystemParams::from_json(&json).unwrap(), params);

        match RenderSystemParams::from_json("{ fsaa }") {
            Err(Error::Config(_)) => {}
            _ => panic!(),
        }
    }
}
