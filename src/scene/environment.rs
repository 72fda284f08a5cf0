use crate::renderer::backend::TextureId;

/// Image-based lighting inputs for the lighting resolve.
///
/// Configured on the pipeline before frames execute. Every map is optional:
/// an unset map is published as unbound and contributes zero lighting.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EnvironmentMaps {
    /// Diffuse irradiance cubemap.
    pub diffuse: Option<TextureId>,
    /// Prefiltered specular cubemap.
    pub specular: Option<TextureId>,
    /// BRDF integration lookup table (2D).
    pub brdf_lut: Option<TextureId>,
}

impl EnvironmentMaps {
    #[must_use]
    pub fn new(diffuse: TextureId, specular: TextureId, brdf_lut: TextureId) -> Self {
        Self {
            diffuse: Some(diffuse),
            specular: Some(specular),
            brdf_lut: Some(brdf_lut),
        }
    }

    #[inline]
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.diffuse.is_some() && self.specular.is_some() && self.brdf_lut.is_some()
    }
}
