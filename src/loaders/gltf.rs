use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use futures::channel::oneshot;
use glam::{Mat4, Vec3};
use thiserror::Error;

use crate::geometry::{Geometry, TriangleMesh};
use crate::math::Color;
use crate::scene::{Material, Node, NodeId, SceneError, SceneGraph};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AssetError {
    #[error("failed to import {path}: {reason}")]
    Import { path: String, reason: String },

    #[error("{0} contains no triangle geometry")]
    NoGeometry(String),

    #[error("loading {0} was abandoned before it finished")]
    Canceled(String),
}

/// One primitive of an imported model, already in model space
#[derive(Debug, Clone)]
pub struct ModelMesh {
    pub name: String,
    pub mesh: Arc<TriangleMesh>,
    pub color: Color,
}

/// Flattened triangle geometry of a glTF file
#[derive(Debug, Clone, Default)]
pub struct ModelData {
    pub meshes: Vec<ModelMesh>,
    /// Model-space origin of every named node (bones included)
    pub anchors: HashMap<String, Vec3>,
}

impl ModelData {
    pub fn triangle_count(&self) -> usize {
        self.meshes.iter().map(|m| m.mesh.triangle_count()).sum()
    }

    /// First anchor found among `names`
    pub fn anchor(&self, names: &[&str]) -> Option<Vec3> {
        names.iter().find_map(|n| self.anchors.get(*n).copied())
    }
}

/// Import a glTF file and flatten its meshes, applying node transforms
pub fn load_model(path: impl AsRef<Path>) -> Result<ModelData> {
    let path = path.as_ref();
    log::info!("loading glTF file {:?}", path);

    let (document, buffers, _images) =
        gltf::import(path).with_context(|| format!("failed to load glTF file {:?}", path))?;

    log::debug!(
        "glTF {:?}: {} scenes, {} nodes, {} meshes",
        path,
        document.scenes().count(),
        document.nodes().count(),
        document.meshes().count()
    );

    let mut model = ModelData::default();
    for scene in document.scenes() {
        for node in scene.nodes() {
            process_node(&node, &buffers, &Mat4::IDENTITY, &mut model)?;
        }
    }

    log::info!(
        "loaded {:?}: {} meshes, {} triangles",
        path,
        model.meshes.len(),
        model.triangle_count()
    );
    Ok(model)
}

fn process_node(
    node: &gltf::Node,
    buffers: &[gltf::buffer::Data],
    parent_transform: &Mat4,
    model: &mut ModelData,
) -> Result<()> {
    let local_transform = Mat4::from_cols_array_2d(&node.transform().matrix());
    let global_transform = *parent_transform * local_transform;

    if let Some(name) = node.name() {
        model
            .anchors
            .entry(name.to_string())
            .or_insert_with(|| global_transform.transform_point3(Vec3::ZERO));
    }

    if let Some(mesh) = node.mesh() {
        process_mesh(&mesh, buffers, &global_transform, model)?;
    }

    for child in node.children() {
        process_node(&child, buffers, &global_transform, model)?;
    }
    Ok(())
}

fn process_mesh(
    mesh: &gltf::Mesh,
    buffers: &[gltf::buffer::Data],
    transform: &Mat4,
    model: &mut ModelData,
) -> Result<()> {
    let mesh_name = mesh.name().unwrap_or("mesh");

    for (i, primitive) in mesh.primitives().enumerate() {
        if primitive.mode() != gltf::mesh::Mode::Triangles {
            log::debug!("skipping non-triangle primitive {} of {}", i, mesh_name);
            continue;
        }
        let reader = primitive.reader(|buffer| buffers.get(buffer.index()).map(|d| &d.0[..]));

        let positions: Vec<Vec3> = reader
            .read_positions()
            .with_context(|| format!("primitive {} of {} has no positions", i, mesh_name))?
            .map(|p| transform.transform_point3(Vec3::from_array(p)))
            .collect();
        if positions.is_empty() {
            continue;
        }

        let indices: Vec<u32> = match reader.read_indices() {
            Some(indices) => indices.into_u32().collect(),
            None => (0..positions.len() as u32).collect(),
        };
        let usable = indices.len() - indices.len() % 3;
        if indices[..usable].iter().any(|&i| i as usize >= positions.len()) {
            anyhow::bail!("primitive {} of {} indexes past its vertices", i, mesh_name);
        }

        let base = primitive.material().pbr_metallic_roughness().base_color_factor();
        model.meshes.push(ModelMesh {
            name: format!("{}.{}", mesh_name, i),
            mesh: Arc::new(TriangleMesh {
                positions,
                indices: indices[..usable].to_vec(),
            }),
            color: Color::new(base[0], base[1], base[2]),
        });
    }
    Ok(())
}

/// Progress of a background load
#[derive(Debug)]
pub enum AssetState<T> {
    Pending,
    Ready(T),
    Failed(AssetError),
}

/// Sending half of an asset handle; completes it exactly once
#[derive(Debug)]
pub struct Completer<T> {
    sender: oneshot::Sender<Result<T, AssetError>>,
}

impl<T> Completer<T> {
    pub fn complete(self, result: Result<T, AssetError>) {
        // the handle may already be gone; nothing is waiting then
        let _ = self.sender.send(result);
    }
}

/// A value that arrives later.
///
/// Starts `Pending`; `poll` moves it to `Ready` or `Failed` once the producer
/// finishes. A producer dropped without completing counts as a failure.
#[derive(Debug)]
pub struct AssetHandle<T> {
    path: String,
    state: AssetState<T>,
    receiver: Option<oneshot::Receiver<Result<T, AssetError>>>,
}

impl<T> AssetHandle<T> {
    /// A pending handle plus the means to complete it
    pub fn pair(path: &str) -> (Completer<T>, Self) {
        let (sender, receiver) = oneshot::channel();
        let handle = Self {
            path: path.to_string(),
            state: AssetState::Pending,
            receiver: Some(receiver),
        };
        (Completer { sender }, handle)
    }

    pub fn from_value(path: &str, value: T) -> Self {
        Self {
            path: path.to_string(),
            state: AssetState::Ready(value),
            receiver: None,
        }
    }

    pub fn from_error(path: &str, error: AssetError) -> Self {
        Self {
            path: path.to_string(),
            state: AssetState::Failed(error),
            receiver: None,
        }
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    /// Pick up a finished load, if any. Never blocks.
    pub fn poll(&mut self) -> &AssetState<T> {
        if let Some(receiver) = self.receiver.as_mut() {
            let finished = match receiver.try_recv() {
                Ok(None) => None,
                Ok(Some(result)) => Some(result),
                Err(oneshot::Canceled) => Some(Err(AssetError::Canceled(self.path.clone()))),
            };
            if let Some(result) = finished {
                self.receiver = None;
                self.state = match result {
                    Ok(value) => AssetState::Ready(value),
                    Err(e) => {
                        log::error!("asset load failed: {}", e);
                        AssetState::Failed(e)
                    }
                };
            }
        }
        &self.state
    }

    pub fn state(&self) -> &AssetState<T> {
        &self.state
    }

    pub fn is_pending(&self) -> bool {
        matches!(self.state, AssetState::Pending)
    }

    pub fn value(&self) -> Option<&T> {
        match &self.state {
            AssetState::Ready(value) => Some(value),
            _ => None,
        }
    }

    pub fn error(&self) -> Option<&AssetError> {
        match &self.state {
            AssetState::Failed(e) => Some(e),
            _ => None,
        }
    }

    /// Block until the load finishes
    pub fn wait(mut self) -> Result<T, AssetError> {
        if let Some(receiver) = self.receiver.take() {
            let path = self.path.clone();
            return pollster::block_on(receiver).unwrap_or(Err(AssetError::Canceled(path)));
        }
        match self.state {
            AssetState::Ready(value) => Ok(value),
            AssetState::Failed(e) => Err(e),
            AssetState::Pending => Err(AssetError::Canceled(self.path)),
        }
    }
}

/// Starts model imports off the frame loop
#[derive(Debug, Default, Clone, Copy)]
pub struct AssetLoader;

impl AssetLoader {
    pub fn new() -> Self {
        Self
    }

    pub fn load(&self, path: impl Into<PathBuf>) -> AssetHandle<ModelData> {
        let path = path.into();
        let display = path.display().to_string();
        let (completer, handle) = AssetHandle::pair(&display);

        let spawned = std::thread::Builder::new()
            .name("asset-loader".to_string())
            .spawn(move || completer.complete(import(&path)));

        match spawned {
            Ok(_) => handle,
            Err(e) => AssetHandle::from_error(
                &display,
                AssetError::Import {
                    path: display.clone(),
                    reason: e.to_string(),
                },
            ),
        }
    }
}

fn import(path: &Path) -> Result<ModelData, AssetError> {
    let display = path.display().to_string();
    let model = load_model(path).map_err(|e| AssetError::Import {
        path: display.clone(),
        reason: format!("{:#}", e),
    })?;
    if model.meshes.is_empty() {
        return Err(AssetError::NoGeometry(display));
    }
    Ok(model)
}

/// A model that may not have arrived yet, and the scene node built from it
#[derive(Debug)]
pub struct ModelSlot {
    handle: AssetHandle<ModelData>,
    node: Option<NodeId>,
}

impl ModelSlot {
    pub fn new(handle: AssetHandle<ModelData>) -> Self {
        Self { handle, node: None }
    }

    pub fn node(&self) -> Option<NodeId> {
        self.node
    }

    pub fn is_loaded(&self) -> bool {
        self.node.is_some()
    }

    pub fn handle(&self) -> &AssetHandle<ModelData> {
        &self.handle
    }

    /// Attach the model to `graph` once it is ready. Returns the new group
    /// node on the call that attached it, `None` otherwise.
    pub fn poll_into(&mut self, graph: &mut SceneGraph, name: &str, tint: Color) -> Option<NodeId> {
        if self.node.is_some() {
            return None;
        }
        let AssetState::Ready(model) = self.handle.poll() else {
            return None;
        };

        let group = graph.add(Node::group(name));
        for part in &model.meshes {
            let node = Node::mesh(
                &part.name,
                Geometry::Triangles(part.mesh.clone()),
                Material::standard(part.color * tint),
            );
            if let Err(e) = graph.add_child(group, node) {
                log::error!("could not attach {} to {}: {}", part.name, name, e);
            }
        }
        log::info!("model '{}' attached as {}", name, group);
        self.node = Some(group);
        Some(group)
    }

    /// Run `f` against the model node; a no-op while the model is not loaded
    pub fn with_node<R>(
        &self,
        graph: &mut SceneGraph,
        f: impl FnOnce(&mut SceneGraph, NodeId) -> Result<R, SceneError>,
    ) -> Result<Option<R>, SceneError> {
        match self.node {
            Some(id) => f(graph, id).map(Some),
            None => Ok(None),
        }
    }

    /// Model-space anchor of the loaded model, see `ModelData::anchor`
    pub fn anchor(&self, names: &[&str]) -> Option<Vec3> {
        self.handle.value().and_then(|m| m.anchor(names))
    }
}
