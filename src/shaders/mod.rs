//! Embedded WGSL shaders

/// Lit mug surfaces, print band and shadow catcher
pub const MOCKUP_SHADER: &str = include_str!("mockup.wgsl");

/// Depth-only shadow map pass
pub const SHADOW_SHADER: &str = include_str!("shadow.wgsl");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_embedded_shaders_have_entry_points() {
        assert!(MOCKUP_SHADER.contains("fn vs_main"));
        assert!(MOCKUP_SHADER.contains("fn fs_main"));
        assert!(SHADOW_SHADER.contains("fn vs_shadow"));
    }

    #[test]
    fn test_uniform_layout_matches_bindings() {
        // Group 0 holds frame data, group 1 the per-part material.
        assert!(MOCKUP_SHADER.contains("@group(0) @binding(2) var shadow_sampler: sampler_comparison"));
        assert!(MOCKUP_SHADER.contains("@group(1) @binding(1) var surface_texture"));
    }
}
