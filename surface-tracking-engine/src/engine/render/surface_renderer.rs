use bevy::pbr::NotShadowCaster;
use bevy::picking::Pickable;
use bevy::prelude::*;
use bevy::render::view::RenderLayers;
use constants::render_layers::{BACKGROUND_LAYER, CONTENT_LAYER};

use super::materials::SurfaceMaterials;
use crate::engine::error::SurfaceTrackingError;
use crate::engine::geometry::mesh::{OutlineMesh, SurfaceMesh};
use crate::engine::surfaces::record::{SurfaceId, SurfaceOrientation};

/// An engine renderable: the entity drawing it and the mesh asset it draws.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderableHandle {
    pub entity: Entity,
    pub mesh: Handle<Mesh>,
}

/// The three renderables of one surface.
#[derive(Debug, Clone, PartialEq)]
pub struct SurfaceHandles {
    pub visible: RenderableHandle,
    pub outline: RenderableHandle,
    pub occluder: RenderableHandle,
}

/// Marks the translucent fill of a surface.
#[derive(Component, Debug, Clone, Copy)]
pub struct SurfaceVisual {
    pub surface: SurfaceId,
}

#[derive(Component, Debug, Clone, Copy)]
pub struct SurfaceOutline {
    pub surface: SurfaceId,
}

#[derive(Component, Debug, Clone, Copy)]
pub struct SurfaceOccluder {
    pub surface: SurfaceId,
}

/// What the surface pipeline needs from the rendering engine.
pub trait SurfaceRenderer {
    fn spawn_visible(
        &mut self,
        surface: SurfaceId,
        mesh: &SurfaceMesh,
        orientation: SurfaceOrientation,
        transform: Transform,
    ) -> RenderableHandle;

    fn spawn_outline(
        &mut self,
        surface: SurfaceId,
        outline: &OutlineMesh,
        transform: Transform,
    ) -> RenderableHandle;

    fn spawn_occluder(
        &mut self,
        surface: SurfaceId,
        mesh: &SurfaceMesh,
        transform: Transform,
    ) -> RenderableHandle;

    /// Rewrite the fill in place: same entity, same mesh asset.
    fn update_visible(
        &mut self,
        handle: &RenderableHandle,
        mesh: &SurfaceMesh,
        orientation: SurfaceOrientation,
        transform: Transform,
    );

    /// Rewrite the occluder in place: same entity, same mesh asset.
    fn update_occluder(&mut self, handle: &RenderableHandle, mesh: &SurfaceMesh, transform: Transform);

    fn dispose(&mut self, handle: &RenderableHandle) -> Result<(), SurfaceTrackingError>;
}

/// Dispose all three renderables of a surface. A failure on one sibling is
/// logged and never stops the others from being disposed.
pub fn dispose_surface_handles<R: SurfaceRenderer>(
    renderer: &mut R,
    surface: SurfaceId,
    handles: &SurfaceHandles,
) {
    for (role, handle) in [
        ("visible", &handles.visible),
        ("outline", &handles.outline),
        ("occluder", &handles.occluder),
    ] {
        if let Err(err) = renderer.dispose(handle) {
            warn!("[SURFACE] {} {} dispose failed: {}", surface, role, err);
        }
    }
}

/// Bevy implementation: renderables are entities with `Mesh3d` on the
/// Content (fill, outline) or Background (occluder) render layer.
pub struct BevySurfaceRenderer<'a, 'w, 's> {
    pub commands: &'a mut Commands<'w, 's>,
    pub meshes: &'a mut Assets<Mesh>,
    pub materials: &'a SurfaceMaterials,
}

impl SurfaceRenderer for BevySurfaceRenderer<'_, '_, '_> {
    fn spawn_visible(
        &mut self,
        surface: SurfaceId,
        mesh: &SurfaceMesh,
        orientation: SurfaceOrientation,
        transform: Transform,
    ) -> RenderableHandle {
        let mesh = self.meshes.add(mesh.to_mesh());
        let entity = self
            .commands
            .spawn((
                Mesh3d(mesh.clone()),
                MeshMaterial3d(self.materials.tint(orientation)),
                transform,
                RenderLayers::layer(CONTENT_LAYER),
                NotShadowCaster,
                SurfaceVisual { surface },
                Name::new(format!("{surface}_visible")),
            ))
            .id();

        RenderableHandle { entity, mesh }
    }

    fn spawn_outline(
        &mut self,
        surface: SurfaceId,
        outline: &OutlineMesh,
        transform: Transform,
    ) -> RenderableHandle {
        let mesh = self.meshes.add(outline.to_mesh());
        let entity = self
            .commands
            .spawn((
                Mesh3d(mesh.clone()),
                MeshMaterial3d(self.materials.outline.clone()),
                transform,
                RenderLayers::layer(CONTENT_LAYER),
                NotShadowCaster,
                Pickable::IGNORE,
                SurfaceOutline { surface },
                Name::new(format!("{surface}_outline")),
            ))
            .id();

        RenderableHandle { entity, mesh }
    }

    fn spawn_occluder(
        &mut self,
        surface: SurfaceId,
        mesh: &SurfaceMesh,
        transform: Transform,
    ) -> RenderableHandle {
        let mesh = self.meshes.add(mesh.to_mesh());
        let entity = self
            .commands
            .spawn((
                Mesh3d(mesh.clone()),
                MeshMaterial3d(self.materials.occluder.clone()),
                transform,
                RenderLayers::layer(BACKGROUND_LAYER),
                NotShadowCaster,
                Pickable::IGNORE,
                SurfaceOccluder { surface },
                Name::new(format!("{surface}_occluder")),
            ))
            .id();

        RenderableHandle { entity, mesh }
    }

    fn update_visible(
        &mut self,
        handle: &RenderableHandle,
        mesh: &SurfaceMesh,
        orientation: SurfaceOrientation,
        transform: Transform,
    ) {
        rewrite_mesh(self.meshes, handle, mesh);
        if let Ok(mut entity) = self.commands.get_entity(handle.entity) {
            entity.insert((transform, MeshMaterial3d(self.materials.tint(orientation))));
        }
    }

    fn update_occluder(&mut self, handle: &RenderableHandle, mesh: &SurfaceMesh, transform: Transform) {
        rewrite_mesh(self.meshes, handle, mesh);
        if let Ok(mut entity) = self.commands.get_entity(handle.entity) {
            entity.insert(transform);
        }
    }

    fn dispose(&mut self, handle: &RenderableHandle) -> Result<(), SurfaceTrackingError> {
        let mut entity = self
            .commands
            .get_entity(handle.entity)
            .map_err(|_| SurfaceTrackingError::Dispose(handle.entity))?;
        entity.despawn();
        Ok(())
    }
}

fn rewrite_mesh(meshes: &mut Assets<Mesh>, handle: &RenderableHandle, data: &SurfaceMesh) {
    match meshes.get_mut(&handle.mesh) {
        Some(mesh) => data.write_into(mesh),
        None => warn!("[SURFACE] mesh for {:?} missing during rebuild", handle.entity),
    }
}
