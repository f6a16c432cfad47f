use bevy::pbr::{MaterialPipeline, MaterialPipelineKey};
use bevy::prelude::*;
use bevy::reflect::TypePath;
use bevy::render::mesh::MeshVertexBufferLayoutRef;
use bevy::render::render_resource::{
    AsBindGroup, ColorWrites, RenderPipelineDescriptor, SpecializedMeshPipelineError,
};
use constants::render_settings::{
    HORIZONTAL_SURFACE_TINT, SURFACE_OUTLINE_COLOUR, UNKNOWN_SURFACE_TINT, VERTICAL_SURFACE_TINT,
};

use crate::engine::surfaces::record::SurfaceOrientation;

/// Writes depth only. Colour writes are masked off so the passthrough stays
/// visible while later layers are depth-tested against the real surface.
#[derive(Asset, TypePath, AsBindGroup, Debug, Clone, Default)]
pub struct OccluderMaterial {}

impl Material for OccluderMaterial {
    fn specialize(
        _pipeline: &MaterialPipeline<Self>,
        descriptor: &mut RenderPipelineDescriptor,
        _layout: &MeshVertexBufferLayoutRef,
        _key: MaterialPipelineKey<Self>,
    ) -> Result<(), SpecializedMeshPipelineError> {
        if let Some(fragment) = descriptor.fragment.as_mut() {
            for target in fragment.targets.iter_mut().flatten() {
                target.write_mask = ColorWrites::empty();
            }
        }
        if let Some(depth_stencil) = descriptor.depth_stencil.as_mut() {
            depth_stencil.depth_write_enabled = true;
        }
        descriptor.primitive.cull_mode = None;
        Ok(())
    }
}

/// Shared material handles for every surface renderable.
#[derive(Resource, Clone)]
pub struct SurfaceMaterials {
    pub horizontal: Handle<StandardMaterial>,
    pub vertical: Handle<StandardMaterial>,
    pub unknown: Handle<StandardMaterial>,
    pub outline: Handle<StandardMaterial>,
    pub occluder: Handle<OccluderMaterial>,
}

impl SurfaceMaterials {
    pub fn new(
        standard: &mut Assets<StandardMaterial>,
        occluders: &mut Assets<OccluderMaterial>,
    ) -> Self {
        Self {
            horizontal: standard.add(surface_fill(HORIZONTAL_SURFACE_TINT)),
            vertical: standard.add(surface_fill(VERTICAL_SURFACE_TINT)),
            unknown: standard.add(surface_fill(UNKNOWN_SURFACE_TINT)),
            outline: standard.add(StandardMaterial {
                base_color: SURFACE_OUTLINE_COLOUR,
                alpha_mode: AlphaMode::Blend,
                unlit: true,
                ..default()
            }),
            occluder: occluders.add(OccluderMaterial::default()),
        }
    }

    pub fn tint(&self, orientation: SurfaceOrientation) -> Handle<StandardMaterial> {
        match orientation {
            SurfaceOrientation::Horizontal => self.horizontal.clone(),
            SurfaceOrientation::Vertical => self.vertical.clone(),
            SurfaceOrientation::Unknown => self.unknown.clone(),
        }
    }
}

fn surface_fill(tint: Color) -> StandardMaterial {
    StandardMaterial {
        base_color: tint,
        alpha_mode: AlphaMode::Blend,
        unlit: true,
        cull_mode: None,
        double_sided: true,
        ..default()
    }
}

pub fn setup_surface_materials(
    mut commands: Commands,
    mut standard: ResMut<Assets<StandardMaterial>>,
    mut occluders: ResMut<Assets<OccluderMaterial>>,
) {
    commands.insert_resource(SurfaceMaterials::new(&mut standard, &mut occluders));
}
