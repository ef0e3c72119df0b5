use std::path::Path;

use crate::error::Result;
use crate::model::ModelBundle;

pub fn save_bundle<P: AsRef<Path>>(path: P, bundle: &ModelBundle) -> Result<()> {
    let model_data = bincode::serialize(bundle)?;
    std::fs::write(path, model_data)?;
    Ok(())
}

pub fn load_bundle<P: AsRef<Path>>(path: P) -> Result<ModelBundle> {
    let model_data = std::fs::read(path)?;
    let bundle = bincode::deserialize(&model_data)?;
    Ok(bundle)
}
