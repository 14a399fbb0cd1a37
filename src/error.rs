use thiserror::Error;

/// Errors raised while bootstrapping the demo host.
///
/// The per-frame core (input, camera motion, highlighting) never fails; everything here
/// happens before the first frame or at the GPU surface boundary.
#[derive(Debug, Error)]
pub enum DemoError {
    #[error("failed to create surface: {0}")]
    Surface(#[from] wgpu::CreateSurfaceError),

    #[error("no suitable GPU adapter: {0}")]
    Adapter(#[from] wgpu::RequestAdapterError),

    #[error("failed to request device: {0}")]
    Device(#[from] wgpu::RequestDeviceError),

    #[error("dom: {0}")]
    Dom(String),

    #[error("config: {0}")]
    Config(#[from] ConfigError),
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("unknown key `{0}`")]
    UnknownKey(String),

    #[error("invalid value `{value}` for `{key}`")]
    InvalidValue { key: String, value: String },
}

#[cfg(target_arch = "wasm32")]
impl From<DemoError> for wasm_bindgen::JsValue {
    fn from(err: DemoError) -> Self {
        wasm_bindgen::JsValue::from_str(&err.to_string())
    }
}

#[cfg(target_arch = "wasm32")]
impl From<wasm_bindgen::JsValue> for DemoError {
    fn from(value: wasm_bindgen::JsValue) -> Self {
        DemoError::Dom(value.as_string().unwrap_or_else(|| format!("{value:?}")))
    }
}

pub type Result<T, E = DemoError> = std::result::Result<T, E>;
