//! Cross-validated first- and second-layer models.
mod model_kind;
mod params;
mod trained_booster;
mod handle;
mod first_layer;
mod second_layer;

pub use model_kind::{BaseLearner, ModelKind};
pub use params::{
    BoosterParams,
    ModelConfig,
    DEFAULT_EARLY_STOPPING_ROUNDS,
    DEFAULT_N_ROUNDS,
};
pub use trained_booster::TrainedBooster;
pub use handle::{ModelHandle, ModelState};
pub use first_layer::FirstLayerModel;
pub use second_layer::SecondLayerModel;
