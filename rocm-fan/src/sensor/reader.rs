use std::sync::Arc;

use super::SensorSnapshot;
use crate::error::Result;
use crate::smi::SmiTool;
use crate::tracing::prelude::*;

/// Queries the tool for one device and turns its output into snapshots.
#[derive(Clone)]
pub struct SensorReader {
    tool: Arc<dyn SmiTool>,
    device_id: String,
    default_fan_level: u8,
}

impl SensorReader {
    /// `default_fan_level` stands in when the tool's output has no usable
    /// fan level; pass the curve's maximum so the controller errs hot.
    pub fn new(tool: Arc<dyn SmiTool>, device_id: impl Into<String>, default_fan_level: u8) -> Self {
        Self {
            tool,
            device_id: device_id.into(),
            default_fan_level,
        }
    }

    pub fn device_id(&self) -> &str {
        &self.device_id
    }

    /// Read a fresh snapshot.
    ///
    /// Only a failure to run the tool is an error. Problems with individual
    /// fields are logged and defaulted inside the snapshot.
    pub async fn read(&self) -> Result<SensorSnapshot> {
        let text = self.tool.read_telemetry(&self.device_id).await?;
        let snapshot = SensorSnapshot::from_output(&text, self.default_fan_level);

        debug!(
            device = %self.device_id,
            edge = %snapshot.edge,
            junction = %snapshot.junction,
            memory = %snapshot.memory,
            fan_level = snapshot.fan_level,
            "Sensor snapshot"
        );

        Ok(snapshot)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use crate::sensor::Temperature;
    use crate::smi::mock::{Read, ScriptedSmi};

    #[tokio::test]
    async fn should_read_snapshot_from_tool() {
        let tool = Arc::new(ScriptedSmi::with_text(
            "Temperature (Sensor edge) (C): 61.0\n\
             Temperature (Sensor junction) (C): 66.0\n\
             Temperature (Sensor memory) (C): 58.0\n\
             Fan Level: 130 (50%)",
        ));
        let reader = SensorReader::new(tool.clone(), "0", 255);

        let snapshot = reader.read().await.unwrap();

        assert_eq!(snapshot.junction, Temperature::Celsius(66));
        assert_eq!(snapshot.fan_level, 130);
        assert_eq!(tool.reads(), 1);
    }

    #[tokio::test]
    async fn should_propagate_tool_failure() {
        let tool = Arc::new(ScriptedSmi::new(vec![Read::Fail]));
        let reader = SensorReader::new(tool, "0", 255);

        let result = reader.read().await;

        assert!(matches!(result, Err(Error::Other(_))));
    }

    #[tokio::test]
    async fn should_default_fields_for_unexpected_output() {
        let tool = Arc::new(ScriptedSmi::with_text("WARNING: No AMD GPUs specified"));
        let reader = SensorReader::new(tool, "0", 255);

        let snapshot = reader.read().await.unwrap();

        assert_eq!(snapshot.temperatures(), [Temperature::Unreadable; 3]);
        assert_eq!(snapshot.fan_level, 255);
    }
}
