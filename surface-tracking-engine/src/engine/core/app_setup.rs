use bevy::asset::AssetMetaCheck;
use bevy::diagnostic::FrameTimeDiagnosticsPlugin;
use bevy::prelude::*;
use bevy::render::view::RenderLayers;
use constants::render_layers::CONTENT_LAYER;

use crate::engine::core::plugin::SurfaceTrackingPlugin;
use crate::engine::core::window_config::create_window_config;
use crate::engine::render::materials::OccluderMaterial;
use crate::engine::render::occlusion::{OcclusionMode, RenderLayer, layer_camera_bundle};
use crate::engine::session::config::SurfaceTrackingConfig;
use crate::tools::placement::reticle::spawn_reticle;
use crate::tools::placement::systems::{PlacementTemplate, TrackedContentRoot};

#[cfg(not(target_arch = "wasm32"))]
use bevy::diagnostic::DiagnosticsStore;
#[cfg(not(target_arch = "wasm32"))]
use crate::engine::core::plugin::TrackingSet;
#[cfg(not(target_arch = "wasm32"))]
use crate::engine::session::replay::ReplayPlugin;
#[cfg(not(target_arch = "wasm32"))]
use crate::engine::surfaces::systems::SurfaceStatus;
#[cfg(not(target_arch = "wasm32"))]
use crate::tools::hit_test::emulate_hit_test;
#[cfg(not(target_arch = "wasm32"))]
use crate::tools::placement::systems::handle_native_placement_input;

#[cfg(not(target_arch = "wasm32"))]
#[derive(Component)]
pub struct StatusText;

pub fn create_app() -> App {
    let mut app = App::new();

    app.add_plugins(create_default_plugins())
        .add_plugins(MaterialPlugin::<OccluderMaterial>::default())
        .add_plugins(FrameTimeDiagnosticsPlugin::default())
        .add_plugins(SurfaceTrackingPlugin {
            config: SurfaceTrackingConfig::default(),
        })
        .add_systems(Startup, setup);

    // Desktop stand-ins for the host: recorded session, mouse taps, cursor hit-test.
    #[cfg(not(target_arch = "wasm32"))]
    {
        app.add_plugins(ReplayPlugin).add_systems(
            Update,
            (handle_native_placement_input, emulate_hit_test).in_set(TrackingSet::Ingest),
        );
        app.add_systems(Update, status_text_update_system.after(TrackingSet::Publish));
    }

    app
}

fn spawn_layer_cameras(commands: &mut Commands) {
    let viewer = Transform::from_xyz(0.0, 1.6, 2.5).looking_at(Vec3::new(0.0, 0.8, 0.0), Vec3::Y);
    for layer in RenderLayer::ALL {
        commands.spawn((layer_camera_bundle(layer, OcclusionMode::Reset), viewer));
    }
}

fn spawn_lighting(commands: &mut Commands) {
    commands.spawn((
        DirectionalLight {
            shadows_enabled: false,
            ..default()
        },
        Transform::from_rotation(Quat::from_euler(
            EulerRot::ZYX,
            0.0,
            1.0,
            -std::f32::consts::FRAC_PI_4,
        )),
        RenderLayers::layer(CONTENT_LAYER),
    ));
}

/// Placeholder content used until the host supplies a model: the tracked
/// root for single-object mode and the template for multi-instance mode.
fn spawn_placeholder_content(
    commands: &mut Commands,
    meshes: &mut Assets<Mesh>,
    materials: &mut Assets<StandardMaterial>,
) {
    let mesh = meshes.add(Cuboid::new(0.3, 0.3, 0.3));
    let material = materials.add(StandardMaterial {
        base_color: Color::srgb(0.9, 0.35, 0.3),
        perceptual_roughness: 0.6,
        ..default()
    });

    commands.spawn((
        Mesh3d(mesh.clone()),
        MeshMaterial3d(material.clone()),
        Transform::default(),
        Visibility::Hidden,
        RenderLayers::layer(CONTENT_LAYER),
        TrackedContentRoot,
        Name::new("TrackedContentRoot"),
    ));
    commands.insert_resource(PlacementTemplate { mesh, material });
}

fn setup(
    mut commands: Commands,
    mut meshes: ResMut<Assets<Mesh>>,
    mut materials: ResMut<Assets<StandardMaterial>>,
) {
    spawn_layer_cameras(&mut commands);
    spawn_lighting(&mut commands);
    spawn_reticle(&mut commands, &mut meshes, &mut materials);
    spawn_placeholder_content(&mut commands, &mut meshes, &mut materials);

    #[cfg(not(target_arch = "wasm32"))]
    {
        create_native_overlays(&mut commands);
    }
}

#[cfg(not(target_arch = "wasm32"))]
fn create_native_overlays(commands: &mut Commands) {
    commands
        .spawn(Node {
            width: Val::Percent(100.0),
            height: Val::Percent(100.0),
            ..default()
        })
        .with_children(|parent| {
            parent.spawn((
                Text::new("Surfaces: 0"),
                TextFont {
                    font_size: 16.0,
                    ..default()
                },
                TextColor(Color::srgb(1., 1., 1.)),
                Node {
                    position_type: PositionType::Absolute,
                    bottom: Val::Px(12.0),
                    right: Val::Px(12.0),
                    ..default()
                },
                StatusText,
            ));
        });
}

#[cfg(not(target_arch = "wasm32"))]
fn status_text_update_system(
    diagnostics: Res<DiagnosticsStore>,
    status: Res<SurfaceStatus>,
    mut query: Query<&mut Text, With<StatusText>>,
) {
    let fps = diagnostics
        .get(&FrameTimeDiagnosticsPlugin::FPS)
        .and_then(|fps| fps.smoothed())
        .unwrap_or(0.0);

    for mut text in &mut query {
        **text = format!("FPS: {:.0}  Surfaces: {}", fps, status.materialized);
    }
}

fn create_default_plugins() -> impl PluginGroup {
    let window_config = WindowPlugin {
        primary_window: Some(create_window_config()),
        ..default()
    };

    let asset_config = AssetPlugin {
        meta_check: AssetMetaCheck::Never,
        ..default()
    };

    DefaultPlugins.set(window_config).set(asset_config)
}
