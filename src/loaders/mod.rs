pub mod gltf;

pub use gltf::{
    load_model, AssetError, AssetHandle, AssetLoader, AssetState, Completer, ModelData, ModelMesh,
    ModelSlot,
};
