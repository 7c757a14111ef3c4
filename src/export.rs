use log::{info, warn};
use serde::{Deserialize, Serialize};

use crate::transform::View;

// Public interface

pub fn export(view: &View) -> Result<String, String> {
    let view0 = View0::from_view(view);
    // Refuse what `import` would refuse, e.g. NaN which serializes as `null`.
    view0.to_view()?;
    match serde_json::to_string(&view0) {
        Ok(json) => {
            info!("Exported view ({} bytes)", json.len());
            Ok(json)
        }
        Err(err) => {
            warn!("Could not export view: {}", err);
            Err(err.to_string())
        }
    }
}

pub fn import(json: &str) -> Result<View, String> {
    let view0: View0 = serde_json::from_str(json).map_err(|e| e.to_string())?;
    let view = view0.to_view()?;
    info!("Imported view {:?}", view);
    Ok(view)
}

// Versions

#[derive(Serialize, Deserialize, PartialEq, Debug, Clone)]
struct View0 {
    version: u32,
    offset_x: f64,
    offset_y: f64,
    scale_x: f64,
    scale_y: f64,
    rotation: f64,
}

impl View0 {
    const VERSION: u32 = 0;

    fn from_view(view: &View) -> Self {
        Self {
            version: Self::VERSION,
            offset_x: view.offset_x,
            offset_y: view.offset_y,
            scale_x: view.scale_x,
            scale_y: view.scale_y,
            rotation: view.rotation,
        }
    }

    fn to_view(&self) -> Result<View, String> {
        if self.version != Self::VERSION {
            return Err(format!("Unsupported view version {}", self.version));
        }
        let values = [
            self.offset_x,
            self.offset_y,
            self.scale_x,
            self.scale_y,
            self.rotation,
        ];
        if values.iter().any(|v| !v.is_finite()) {
            return Err("View contains non-finite numbers".to_string());
        }
        if self.scale_x <= 0.0 || self.scale_y <= 0.0 {
            return Err(format!(
                "Scale must be positive, got ({}, {})",
                self.scale_x, self.scale_y
            ));
        }
        Ok(View {
            offset_x: self.offset_x,
            offset_y: self.offset_y,
            scale_x: self.scale_x,
            scale_y: self.scale_y,
            rotation: self.rotation,
        })
    }
}
