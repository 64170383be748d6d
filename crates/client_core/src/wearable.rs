use std::time::Duration;

use async_trait::async_trait;
use shared::domain::BiometricProfile;

/// Source of a full biometric profile read from an external device.
#[async_trait]
pub trait WearableDevice: Send + Sync {
    async fn read_profile(&self) -> BiometricProfile;
}

/// Stand-in for a real wearable: waits a fixed delay, then reports the
/// canonical synthetic profile. It never fails.
#[derive(Debug, Clone, Copy)]
pub struct SimulatedWearable {
    delay: Duration,
}

impl SimulatedWearable {
    pub const DEFAULT_DELAY: Duration = Duration::from_millis(1500);

    pub fn new(delay: Duration) -> Self {
        Self { delay }
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }
}

impl Default for SimulatedWearable {
    fn default() -> Self {
        Self::new(Self::DEFAULT_DELAY)
    }
}

#[async_trait]
impl WearableDevice for SimulatedWearable {
    async fn read_profile(&self) -> BiometricProfile {
        tokio::time::sleep(self.delay).await;
        BiometricProfile::canonical_wearable()
    }
}
