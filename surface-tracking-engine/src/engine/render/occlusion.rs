use bevy::core_pipeline::core_3d::Camera3dDepthLoadOp;
use bevy::prelude::*;
use bevy::render::camera::ClearColorConfig;
use bevy::render::view::RenderLayers;
use constants::render_layers::{
    BACKGROUND_CAMERA_ORDER, BACKGROUND_LAYER, CONTENT_CAMERA_ORDER, CONTENT_LAYER,
    OVERLAY_CAMERA_ORDER, OVERLAY_LAYER,
};
use constants::render_settings::VIRTUAL_BACKGROUND_COLOUR;

/// Session mode the three layer cameras are configured for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OcclusionMode {
    /// Camera passthrough visible behind everything, occluders hide content.
    Augmented,
    /// Fully virtual scene on an opaque background.
    Virtual,
    /// No session. Same policy as `Virtual`.
    #[default]
    Reset,
}

/// Draw-order buckets. Each is rendered by its own camera.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RenderLayer {
    Background,
    Content,
    Overlay,
}

impl RenderLayer {
    pub const ALL: [RenderLayer; 3] = [
        RenderLayer::Background,
        RenderLayer::Content,
        RenderLayer::Overlay,
    ];

    pub fn index(self) -> usize {
        match self {
            RenderLayer::Background => BACKGROUND_LAYER,
            RenderLayer::Content => CONTENT_LAYER,
            RenderLayer::Overlay => OVERLAY_LAYER,
        }
    }

    pub fn camera_order(self) -> isize {
        match self {
            RenderLayer::Background => BACKGROUND_CAMERA_ORDER,
            RenderLayer::Content => CONTENT_CAMERA_ORDER,
            RenderLayer::Overlay => OVERLAY_CAMERA_ORDER,
        }
    }

    pub fn render_layers(self) -> RenderLayers {
        RenderLayers::layer(self.index())
    }
}

/// How a layer camera treats the colour attachment before drawing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColorClear {
    /// Clear to fully transparent so the passthrough shows through.
    Transparent,
    /// Clear to the virtual scene background.
    Background,
    /// Draw over whatever earlier layers produced.
    Keep,
}

impl ColorClear {
    pub fn to_config(self) -> ClearColorConfig {
        match self {
            ColorClear::Transparent => ClearColorConfig::Custom(Color::NONE),
            ColorClear::Background => ClearColorConfig::Custom(VIRTUAL_BACKGROUND_COLOUR),
            ColorClear::Keep => ClearColorConfig::None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LayerClearPolicy {
    pub color: ColorClear,
    pub clear_depth: bool,
}

/// Clear/depth behaviour of one layer in one mode.
///
/// In `Augmented` the Content layer keeps the depth written by Background
/// occluders, so placed content behind a real surface fails the depth test.
/// The Overlay layer always clears depth so the reticle is never occluded.
pub fn layer_policy(mode: OcclusionMode, layer: RenderLayer) -> LayerClearPolicy {
    match (mode, layer) {
        (OcclusionMode::Augmented, RenderLayer::Background) => LayerClearPolicy {
            color: ColorClear::Transparent,
            clear_depth: true,
        },
        (OcclusionMode::Augmented, RenderLayer::Content) => LayerClearPolicy {
            color: ColorClear::Keep,
            clear_depth: false,
        },
        (OcclusionMode::Virtual | OcclusionMode::Reset, RenderLayer::Background) => {
            LayerClearPolicy {
                color: ColorClear::Background,
                clear_depth: true,
            }
        }
        (_, RenderLayer::Content | RenderLayer::Overlay) => LayerClearPolicy {
            color: ColorClear::Keep,
            clear_depth: true,
        },
    }
}

/// Marks one of the three layer cameras.
#[derive(Component, Debug, Clone, Copy, PartialEq, Eq)]
pub struct LayerCamera(pub RenderLayer);

/// Holds the active occlusion mode. Changing it reconfigures the layer cameras
/// once; per-frame surface churn never touches it.
#[derive(Resource, Debug, Default, PartialEq, Eq)]
pub struct OcclusionRenderConfigurator {
    mode: OcclusionMode,
}

impl OcclusionRenderConfigurator {
    pub fn new(mode: OcclusionMode) -> Self {
        Self { mode }
    }

    pub fn mode(&self) -> OcclusionMode {
        self.mode
    }

    pub fn policy(&self, layer: RenderLayer) -> LayerClearPolicy {
        layer_policy(self.mode, layer)
    }
}

/// Switch mode without tripping change detection when the mode is already
/// active. Returns whether the mode changed.
pub fn set_occlusion_mode<T>(configurator: &mut T, mode: OcclusionMode) -> bool
where
    T: DetectChangesMut<Inner = OcclusionRenderConfigurator>,
{
    let changed = configurator.set_if_neq(OcclusionRenderConfigurator::new(mode));
    if changed {
        info!("[OCCLUSION] Mode set to {:?}", mode);
    }
    changed
}

pub fn apply_layer_policy(policy: &LayerClearPolicy, camera: &mut Camera, camera_3d: &mut Camera3d) {
    camera.clear_color = policy.color.to_config();
    camera_3d.depth_load_op = if policy.clear_depth {
        Camera3dDepthLoadOp::Clear(0.0)
    } else {
        Camera3dDepthLoadOp::Load
    };
}

/// Pushes the active policy onto the layer cameras when the mode changes or a
/// layer camera is spawned.
pub fn apply_occlusion_layers(
    configurator: Res<OcclusionRenderConfigurator>,
    mut cameras: Query<(Ref<LayerCamera>, &mut Camera, &mut Camera3d)>,
) {
    let mode_changed = configurator.is_changed();
    for (layer, mut camera, mut camera_3d) in &mut cameras {
        if !mode_changed && !layer.is_added() {
            continue;
        }
        let policy = configurator.policy(layer.0);
        apply_layer_policy(&policy, &mut camera, &mut camera_3d);
    }
}

/// Bundle for one layer camera, ordered and masked for its layer.
pub fn layer_camera_bundle(layer: RenderLayer, mode: OcclusionMode) -> impl Bundle {
    let mut camera = Camera {
        order: layer.camera_order(),
        ..default()
    };
    let mut camera_3d = Camera3d::default();
    apply_layer_policy(&layer_policy(mode, layer), &mut camera, &mut camera_3d);

    (
        camera_3d,
        camera,
        layer.render_layers(),
        LayerCamera(layer),
        Name::new(format!("{layer:?}Camera")),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn configured(mode: OcclusionMode, layer: RenderLayer) -> (Camera, Camera3d) {
        let mut camera = Camera::default();
        let mut camera_3d = Camera3d::default();
        apply_layer_policy(&layer_policy(mode, layer), &mut camera, &mut camera_3d);
        (camera, camera_3d)
    }

    #[test]
    fn augmented_content_loads_occluder_depth() {
        let (camera, camera_3d) = configured(OcclusionMode::Augmented, RenderLayer::Content);
        assert!(matches!(camera.clear_color, ClearColorConfig::None));
        assert!(matches!(camera_3d.depth_load_op, Camera3dDepthLoadOp::Load));
    }

    #[test]
    fn augmented_background_clears_to_transparent() {
        let (camera, camera_3d) = configured(OcclusionMode::Augmented, RenderLayer::Background);
        match camera.clear_color {
            ClearColorConfig::Custom(colour) => assert_eq!(colour.alpha(), 0.0),
            other => panic!("unexpected clear colour {other:?}"),
        }
        assert!(matches!(camera_3d.depth_load_op, Camera3dDepthLoadOp::Clear(_)));
    }

    #[test]
    fn overlay_always_clears_depth() {
        for mode in [OcclusionMode::Augmented, OcclusionMode::Virtual, OcclusionMode::Reset] {
            let (camera, camera_3d) = configured(mode, RenderLayer::Overlay);
            assert!(matches!(camera.clear_color, ClearColorConfig::None));
            assert!(matches!(camera_3d.depth_load_op, Camera3dDepthLoadOp::Clear(_)));
        }
    }

    #[test]
    fn virtual_and_reset_share_policy() {
        for layer in RenderLayer::ALL {
            assert_eq!(
                layer_policy(OcclusionMode::Virtual, layer),
                layer_policy(OcclusionMode::Reset, layer)
            );
        }
        let policy = layer_policy(OcclusionMode::Virtual, RenderLayer::Background);
        assert_eq!(policy.color, ColorClear::Background);
        assert!(layer_policy(OcclusionMode::Virtual, RenderLayer::Content).clear_depth);
    }

    #[test]
    fn layers_draw_in_ascending_order() {
        let orders: Vec<isize> = RenderLayer::ALL.iter().map(|l| l.camera_order()).collect();
        assert!(orders.windows(2).all(|pair| pair[0] < pair[1]));
    }

    #[test]
    fn set_mode_is_idempotent() {
        let mut world = World::new();
        world.init_resource::<OcclusionRenderConfigurator>();
        world.clear_trackers();

        let mut configurator = world.resource_mut::<OcclusionRenderConfigurator>();
        assert!(!set_occlusion_mode(&mut configurator, OcclusionMode::Reset));
        assert!(!configurator.is_changed());

        assert!(set_occlusion_mode(&mut configurator, OcclusionMode::Augmented));
        assert!(configurator.is_changed());
        assert_eq!(configurator.mode(), OcclusionMode::Augmented);
    }
}
